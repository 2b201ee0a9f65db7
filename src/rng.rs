//! Injectable randomness. Every roll in the engine goes through [`RandomSource`]
//! with a short label naming what is being rolled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::trace;

pub trait RandomSource {
    /// Uniform integer in `[low, high]`, inclusive on both ends.
    fn int_in(&mut self, low: u32, high: u32, reason: &str) -> u32;

    /// True with probability `percent` out of 100, rolled on `[1, 100]`.
    /// 100 or more succeeds without consuming a roll.
    fn chance(&mut self, percent: u8, reason: &str) -> bool {
        if percent >= 100 {
            return true;
        }
        self.int_in(1, 100, reason) <= percent as u32
    }
}

/// Seedable source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn int_in(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        let value = if high <= low {
            low
        } else {
            self.rng.random_range(low..=high)
        };
        trace!(target: "battle::rng", reason, low, high, value, "roll");
        value
    }
}

/// Replays a fixed sequence of outcomes, for tests and replays.
///
/// Each value is clamped into the requested range. Once the queue is empty the
/// repeat value is used if one was set.
///
/// # Panics
///
/// Panics when the queue is exhausted and no repeat value was set.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    outcomes: VecDeque<u32>,
    repeat: Option<u32>,
}

impl ScriptedRandom {
    pub fn new(outcomes: Vec<u32>) -> Self {
        Self {
            outcomes: outcomes.into(),
            repeat: None,
        }
    }

    /// Returns the same value for every roll.
    pub fn constant(value: u32) -> Self {
        Self {
            outcomes: VecDeque::new(),
            repeat: Some(value),
        }
    }

    pub fn then_repeat(mut self, value: u32) -> Self {
        self.repeat = Some(value);
        self
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn int_in(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        let raw = match self.outcomes.pop_front().or(self.repeat) {
            Some(value) => value,
            None => panic!("ScriptedRandom exhausted while rolling for '{}'", reason),
        };
        let value = raw.clamp(low, high.max(low));
        trace!(target: "battle::rng", reason, low, high, value, "scripted roll");
        value
    }
}
