//! End-of-game counting.
//!
//! All stones on the board are counted as alive; dead-stone removal is left
//! to the players (capture them before passing).

use crate::board::Board;
use crate::phases::Outcome;
use crate::ruleset::{Ruleset, ScoringMethod};
use crate::types::{Captures, Stone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{info, instrument};

/// One color's count.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorScore {
    /// Stones on the board.
    pub stones: u32,
    /// Empty intersections enclosed only by this color.
    pub territory: u32,
    /// Prisoners taken (counted under territory scoring only).
    pub captures: u32,
    /// Komi received.
    pub komi: f64,
    /// Final total.
    pub total: f64,
}

/// Full count for both colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Method used.
    pub method: ScoringMethod,
    /// Black's count.
    pub black: ColorScore,
    /// White's count.
    pub white: ColorScore,
    /// Empty intersections owned by nobody.
    pub neutral: u32,
}

impl Score {
    /// Count for `stone`.
    pub fn of(&self, stone: Stone) -> &ColorScore {
        match stone {
            Stone::Black => &self.black,
            Stone::White => &self.white,
        }
    }

    /// Winner by total, or a draw on equal totals.
    pub fn outcome(&self) -> Outcome {
        match self.black.total.partial_cmp(&self.white.total) {
            Some(Ordering::Greater) => Outcome::Winner(Stone::Black),
            Some(Ordering::Less) => Outcome::Winner(Stone::White),
            _ => Outcome::Draw,
        }
    }

    /// Absolute point difference.
    pub fn margin(&self) -> f64 {
        (self.black.total - self.white.total).abs()
    }
}

/// Counts `board` under `ruleset`, crediting `captures` as prisoners.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn score(board: &Board, captures: Captures, ruleset: &Ruleset) -> Score {
    let mut territory = Captures::default();
    let mut neutral = 0u32;
    for region in board.empty_regions() {
        match region.owner() {
            Some(owner) => territory.credit(owner, region.points().len()),
            None => neutral += u32::try_from(region.points().len()).unwrap_or(u32::MAX),
        }
    }

    let count = |stone: Stone| {
        let stones = u32::try_from(board.stone_count(stone)).unwrap_or(u32::MAX);
        let prisoners = match ruleset.scoring {
            ScoringMethod::Territory => captures.of(stone),
            ScoringMethod::Area => 0,
        };
        let komi = match stone {
            Stone::Black => 0.0,
            Stone::White => ruleset.komi,
        };
        let territory = territory.of(stone);
        ColorScore {
            stones,
            territory,
            captures: prisoners,
            komi,
            total: f64::from(stones) + f64::from(territory) + f64::from(prisoners) + komi,
        }
    };

    let score = Score {
        method: ruleset.scoring,
        black: count(Stone::Black),
        white: count(Stone::White),
        neutral,
    };
    info!(
        black = score.black.total,
        white = score.white.total,
        method = %score.method,
        "Game counted"
    );
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardSize, Coord, Intersection};

    /// Black wall on column 2, white wall on column 4 of a 9x9 board.
    fn split_board() -> Board {
        let mut board = Board::new(BoardSize::Nine);
        for row in 0..9 {
            board.set(Coord::new(row, 2), Intersection::Occupied(Stone::Black));
            board.set(Coord::new(row, 4), Intersection::Occupied(Stone::White));
        }
        board
    }

    #[test]
    fn test_empty_board_is_all_neutral() {
        let board = Board::new(BoardSize::Nine);
        let rules = Ruleset {
            komi: 0.0,
            ..Ruleset::with_size(BoardSize::Nine)
        };
        let score = score(&board, Captures::default(), &rules);
        assert_eq!(score.neutral, 81);
        assert_eq!(score.outcome(), Outcome::Draw);
        assert_eq!(score.margin(), 0.0);
    }

    #[test]
    fn test_territory_counting() {
        let board = split_board();
        let rules = Ruleset {
            komi: 6.5,
            ..Ruleset::with_size(BoardSize::Nine)
        };
        let captures = Captures { black: 2, white: 1 };
        let score = score(&board, captures, &rules);

        // Columns 0-1 are black's, columns 5-8 white's, column 3 is shared.
        assert_eq!(score.black.territory, 18);
        assert_eq!(score.white.territory, 36);
        assert_eq!(score.neutral, 9);
        assert_eq!(score.black.total, 9.0 + 18.0 + 2.0);
        assert_eq!(score.white.total, 9.0 + 36.0 + 1.0 + 6.5);
        assert_eq!(score.outcome(), Outcome::Winner(Stone::White));
        assert_eq!(score.margin(), 52.5 - 29.0);
    }

    #[test]
    fn test_area_counting_ignores_prisoners() {
        let board = split_board();
        let rules = Ruleset {
            komi: 0.0,
            scoring: ScoringMethod::Area,
            ..Ruleset::with_size(BoardSize::Nine)
        };
        let score = score(&board, Captures { black: 50, white: 0 }, &rules);
        assert_eq!(score.black.captures, 0);
        assert_eq!(score.black.total, 27.0);
        assert_eq!(score.white.total, 45.0);
    }
}
