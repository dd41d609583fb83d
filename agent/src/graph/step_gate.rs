/// Name handed back as `prev_agent` when a node gives control up without
/// consulting the model.
pub const SUPERVISOR: &str = "supervisor";

/// At or below this many remaining steps a node stops before querying.
pub const STEP_FLOOR: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDecision {
    Continue,
    /// Append nothing and hand control to [`SUPERVISOR`].
    Halt,
}

/// Guards the shared step budget so a node can't ping-pong between the
/// model and its tools past what the whole conversation is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepGate;

impl StepGate {
    pub fn evaluate(remaining_steps: u32) -> StepDecision {
        if remaining_steps <= STEP_FLOOR {
            StepDecision::Halt
        } else {
            StepDecision::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halts_at_or_below_floor() {
        for steps in 0..=STEP_FLOOR {
            assert_eq!(StepGate::evaluate(steps), StepDecision::Halt, "steps = {steps}");
        }
    }

    #[test]
    fn continues_above_floor() {
        for steps in [STEP_FLOOR + 1, 10, 25, u32::MAX] {
            assert_eq!(StepGate::evaluate(steps), StepDecision::Continue, "steps = {steps}");
        }
    }
}
