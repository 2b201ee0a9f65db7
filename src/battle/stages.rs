use schema::StageAxis;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// One side's stat stages. Every write is clamped to `[-6, 6]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatStages {
    stages: [i8; StageAxis::COUNT],
}

impl StatStages {
    pub fn get(&self, axis: StageAxis) -> i8 {
        self.stages[axis.index()]
    }

    /// Sets a stage, clamped. Returns the stored value.
    pub fn set(&mut self, axis: StageAxis, stage: i8) -> i8 {
        let clamped = stage.clamp(MIN_STAGE, MAX_STAGE);
        self.stages[axis.index()] = clamped;
        clamped
    }

    /// Shifts a stage by `delta`. Returns `(old, new)`; they are equal when already at the limit.
    pub fn modify(&mut self, axis: StageAxis, delta: i8) -> (i8, i8) {
        let old = self.get(axis);
        let new = self.set(axis, old.saturating_add(delta));
        (old, new)
    }

    /// Non-zero stages, in axis order.
    pub fn non_neutral(&self) -> Vec<(StageAxis, i8)> {
        StageAxis::iter()
            .map(|axis| (axis, self.get(axis)))
            .filter(|(_, stage)| *stage != 0)
            .collect()
    }

    pub fn positive(&self) -> Vec<(StageAxis, i8)> {
        self.non_neutral()
            .into_iter()
            .filter(|(_, stage)| *stage > 0)
            .collect()
    }

    pub fn clear(&mut self) {
        self.stages = [0; StageAxis::COUNT];
    }
}
