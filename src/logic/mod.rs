//! Tournament business logic: pure operations over one event's record.

mod advance;
mod bracket;
mod gate;
mod match_state;
mod projection;
mod validation;

pub use advance::{advance_winner, reconcile_advancement, Advancement};
pub use bracket::{bracket_size, build_skeleton, generate_bracket, round_count, GenerationReport};
pub use gate::prepare_field;
pub use match_state::{cancel_match, start_match, submit_result, update_score};
pub use projection::project_bracket;
pub use validation::{record_validation, ValidationStep};
