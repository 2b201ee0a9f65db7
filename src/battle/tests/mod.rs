pub(crate) mod common;



#[cfg(test)]
mod test_skill_pipeline;


#[cfg(test)]
mod test_switch;
