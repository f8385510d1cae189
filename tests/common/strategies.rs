use proptest::prelude::*;

/// One user action on the step list
#[derive(Debug, Clone)]
pub enum StepAction {
    Add { mandatory: bool },
    MoveUp(usize),
    MoveDown(usize),
    Delete(usize),
}

/// Operation names as typed into the step form
pub fn operation_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,11}"
}

/// Adds and moves only; indexes may fall outside the list
pub fn add_and_move_strategy() -> impl Strategy<Value = Vec<StepAction>> {
    prop::collection::vec(
        prop_oneof![
            any::<bool>().prop_map(|mandatory| StepAction::Add { mandatory }),
            (0usize..8).prop_map(StepAction::MoveUp),
            (0usize..8).prop_map(StepAction::MoveDown),
        ],
        1..24,
    )
}

/// Adds, moves and deletes
pub fn step_action_strategy() -> impl Strategy<Value = Vec<StepAction>> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<bool>().prop_map(|mandatory| StepAction::Add { mandatory }),
            1 => (0usize..8).prop_map(StepAction::MoveUp),
            1 => (0usize..8).prop_map(StepAction::MoveDown),
            1 => (0usize..8).prop_map(StepAction::Delete),
        ],
        1..24,
    )
}
