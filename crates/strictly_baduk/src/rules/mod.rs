//! Go rules as pure functions over a board and its history.
//!
//! Rules are kept apart from game-state storage so the typestate layer and
//! the contracts can compose them.

pub mod ko;
pub mod legality;
pub mod scoring;

pub use ko::check_repetition;
pub use legality::{Evaluation, evaluate_move};
pub use scoring::{ColorScore, Score, score};
