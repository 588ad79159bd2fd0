//! Runs a lake column through a series of atmospheric states

use crate::interface::{Atmosphere, LakeColumn};
use log::{debug, info};
use rflake_core::driver::StepOutput;
use rflake_core::errors::FlakeResult;
use rflake_core::state::LakeState;

/// Threads the lake state through consecutive steps.
#[derive(Debug)]
pub struct Simulation {
    column: LakeColumn,
}

impl Simulation {
    pub fn new(column: LakeColumn) -> Self {
        Self { column }
    }

    pub fn column(&self) -> &LakeColumn {
        &self.column
    }

    /// Advance `initial` once per entry of `atmosphere`.
    ///
    /// The output of each step is the input of the next. The first failing
    /// step aborts the run.
    pub fn run(
        &self,
        initial: LakeState,
        atmosphere: &[Atmosphere],
    ) -> FlakeResult<Vec<StepOutput>> {
        info!("running lake column for {} steps", atmosphere.len());
        let mut outputs = Vec::with_capacity(atmosphere.len());
        let mut state = initial;
        for (index, atmosphere) in atmosphere.iter().enumerate() {
            let output = self.column.step(&state, atmosphere)?;
            if !output.diagnostics.clamps.is_empty() {
                debug!(
                    "step {}: {} clamps applied",
                    index,
                    output.diagnostics.clamps.len()
                );
            }
            state = output.state;
            outputs.push(output);
        }
        Ok(outputs)
    }
}
