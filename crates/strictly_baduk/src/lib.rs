//! Strictly Baduk - a Go rules engine with typestate game phases.
//!
//! # Architecture
//!
//! - **Board**: stone storage plus flood-fill group and liberty queries
//! - **Rules**: legality (turn, occupancy, suicide, ko) and counting
//! - **Ledger**: move history with one position digest per move
//! - **Typestate**: `GameSetup` → `GameInProgress` → `GameFinished`
//! - **Contracts**: pre/postconditions checked on every move
//!
//! # Example
//!
//! ```
//! use strictly_baduk::{BoardSize, Coord, GameSetup, Ruleset, Stone};
//!
//! # fn example() -> Result<(), strictly_baduk::EngineError> {
//! let game = GameSetup::new(Ruleset::with_size(BoardSize::Nine))?.start()?;
//! let game = game.play(Stone::Black, Coord::new(2, 2))?;
//! assert_eq!(game.to_move(), Stone::White);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod contracts;
mod error;
pub mod invariants;
mod ledger;
mod phases;
pub mod rules;
mod ruleset;
mod typestate;
mod types;

pub use action::{Move, MoveKind};
pub use board::{Board, Group, Placement, Region};
pub use contracts::{Attempt, Contract, LegalAttempt, MoveContract, PlayersTurn, TargetIsOpen};
pub use error::{EngineError, ErrorCategory, InvariantViolation, RuleViolation, ValidationError};
pub use ledger::{MoveHistory, PositionDigest, digest};
pub use phases::{EndReason, MatchResult, Outcome};
pub use rules::{ColorScore, Score};
pub use ruleset::{KoRule, Ruleset, ScoringMethod};
pub use typestate::{GameFinished, GameInProgress, GameResult, GameSetup, PASSES_TO_END};
pub use types::{BoardSize, Captures, Coord, Intersection, Stone};
