//! Board storage and group/liberty queries.
//!
//! Groups and liberties are never cached: every query flood-fills the
//! current stone layout, so captures can never leave stale liberty counts
//! behind.

use crate::error::{EngineError, RuleViolation, ValidationError};
use crate::types::{BoardSize, Coord, Intersection, Stone};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// A maximal 4-connected set of same-colored stones.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Group {
    /// Color of every stone in the group.
    color: Stone,
    /// Member stones.
    stones: BTreeSet<Coord>,
    /// Distinct empty intersections adjacent to the group.
    liberties: BTreeSet<Coord>,
}

impl Group {
    /// Number of distinct liberties.
    pub fn liberty_count(&self) -> usize {
        self.liberties.len()
    }

    /// Number of stones.
    pub fn len(&self) -> usize {
        self.stones.len()
    }

    /// Groups always hold at least one stone.
    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }
}

/// A maximal 4-connected set of empty intersections.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Region {
    /// Member intersections.
    points: BTreeSet<Coord>,
    /// Colors of stones touching the region.
    borders: BTreeSet<Stone>,
}

impl Region {
    /// The color that owns the region, if exactly one color borders it.
    pub fn owner(&self) -> Option<Stone> {
        match (self.borders.len(), self.borders.first()) {
            (1, Some(stone)) => Some(*stone),
            _ => None,
        }
    }
}

/// Result of placing a stone.
#[derive(Debug, Clone, Getters)]
pub struct Placement {
    /// Board after captures are resolved.
    board: Board,
    /// Opposing stones removed by the placement.
    captured: BTreeSet<Coord>,
    /// The placed stone's group after captures.
    group: Group,
}

impl Placement {
    /// Splits the placement into its parts.
    pub fn into_parts(self) -> (Board, BTreeSet<Coord>, Group) {
        (self.board, self.captured, self.group)
    }
}

/// Square Go board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: BoardSize,
    /// Intersections in row-major order.
    cells: Vec<Intersection>,
}

impl Board {
    /// Creates an empty board.
    #[instrument]
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![Intersection::Empty; size.area()],
        }
    }

    /// Creates a board with `stones` black handicap stones on the star points.
    ///
    /// Placement follows the fixed pattern: opposite corners first, then the
    /// remaining corners, then side midpoints, with the center added for odd
    /// counts of five or more.
    #[instrument]
    pub fn with_handicap(size: BoardSize, stones: u8) -> Result<Self, ValidationError> {
        if stones == 1 || stones > 9 {
            return Err(ValidationError::InvalidHandicap { stones });
        }
        let mut board = Self::new(size);
        for coord in handicap_points(size, stones) {
            board.set(coord, Intersection::Occupied(Stone::Black));
        }
        debug!(stones, "Placed handicap stones");
        Ok(board)
    }

    /// Board size.
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// All intersections in row-major order.
    pub fn cells(&self) -> &[Intersection] {
        &self.cells
    }

    /// Whether `coord` lies on this board.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.is_on(self.size)
    }

    /// Returns the intersection at `coord`, or `None` off the board.
    pub fn get(&self, coord: Coord) -> Option<Intersection> {
        self.contains(coord).then(|| self.cell(coord))
    }

    /// Whether `coord` is on the board and empty.
    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.get(coord) == Some(Intersection::Empty)
    }

    /// Every coordinate on the board in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let side = self.size.side();
        (0..side).flat_map(move |row| (0..side).map(move |col| Coord::new(row, col)))
    }

    /// Number of stones of the given color.
    pub fn stone_count(&self, stone: Stone) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Intersection::Occupied(stone))
            .count()
    }

    fn index(&self, coord: Coord) -> usize {
        usize::from(coord.row) * usize::from(self.size.side()) + usize::from(coord.col)
    }

    fn cell(&self, coord: Coord) -> Intersection {
        self.cells[self.index(coord)]
    }

    pub(crate) fn set(&mut self, coord: Coord, value: Intersection) {
        let idx = self.index(coord);
        self.cells[idx] = value;
    }

    /// Removes every stone in `stones` from the board.
    pub(crate) fn clear<'a>(&mut self, stones: impl IntoIterator<Item = &'a Coord>) {
        for coord in stones {
            self.set(*coord, Intersection::Empty);
        }
    }

    /// Returns the group containing `coord`, or `None` if it is empty or off the board.
    #[instrument(skip(self))]
    pub fn group_at(&self, coord: Coord) -> Option<Group> {
        let stone = self.get(coord)?.stone()?;
        Some(self.flood_group(coord, stone))
    }

    fn flood_group(&self, start: Coord, color: Stone) -> Group {
        let side = self.size.side();
        let mut stones = BTreeSet::new();
        let mut liberties = BTreeSet::new();
        let mut stack = vec![start];

        while let Some(coord) = stack.pop() {
            if !stones.insert(coord) {
                continue;
            }
            for next in coord.neighbors(side) {
                match self.cell(next) {
                    Intersection::Empty => {
                        liberties.insert(next);
                    }
                    Intersection::Occupied(s) if s == color && !stones.contains(&next) => {
                        stack.push(next);
                    }
                    Intersection::Occupied(_) => {}
                }
            }
        }

        Group {
            color,
            stones,
            liberties,
        }
    }

    /// Every maximal group on the board.
    pub fn groups(&self) -> Vec<Group> {
        let mut seen = BTreeSet::new();
        let mut groups = Vec::new();
        for coord in self.coords() {
            if seen.contains(&coord) {
                continue;
            }
            if let Intersection::Occupied(stone) = self.cell(coord) {
                let group = self.flood_group(coord, stone);
                seen.extend(group.stones.iter().copied());
                groups.push(group);
            }
        }
        groups
    }

    /// Every maximal empty region with the colors bordering it.
    pub fn empty_regions(&self) -> Vec<Region> {
        let side = self.size.side();
        let mut seen = BTreeSet::new();
        let mut regions = Vec::new();

        for start in self.coords() {
            if seen.contains(&start) || self.cell(start) != Intersection::Empty {
                continue;
            }
            let mut points = BTreeSet::new();
            let mut borders = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(coord) = stack.pop() {
                if !points.insert(coord) {
                    continue;
                }
                for next in coord.neighbors(side) {
                    match self.cell(next) {
                        Intersection::Empty if !points.contains(&next) => stack.push(next),
                        Intersection::Empty => {}
                        Intersection::Occupied(stone) => {
                            borders.insert(stone);
                        }
                    }
                }
            }
            seen.extend(points.iter().copied());
            regions.push(Region { points, borders });
        }
        regions
    }

    /// Places a stone and resolves captures, leaving `self` untouched.
    ///
    /// Every opposing group touching the new stone is evaluated before the
    /// placed stone's own group, since removing captured stones can give
    /// the new stone its liberties back.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if `coord` is off the board, `Occupied` if it holds a stone.
    #[instrument(skip(self), fields(size = %self.size))]
    pub fn place(&self, stone: Stone, coord: Coord) -> Result<Placement, EngineError> {
        if !self.contains(coord) {
            return Err(ValidationError::OutOfBounds {
                coord,
                size: self.size.side(),
            }
            .into());
        }
        if self.cell(coord) != Intersection::Empty {
            return Err(RuleViolation::Occupied { coord }.into());
        }

        let mut board = self.clone();
        board.set(coord, Intersection::Occupied(stone));

        let opponent = stone.opponent();
        let mut captured = BTreeSet::new();
        for next in coord.neighbors(self.size.side()) {
            if captured.contains(&next) || board.cell(next) != Intersection::Occupied(opponent) {
                continue;
            }
            let group = board.flood_group(next, opponent);
            if group.liberty_count() == 0 {
                captured.extend(group.stones);
            }
        }
        board.clear(&captured);

        let group = board.flood_group(coord, stone);
        debug!(
            captured = captured.len(),
            liberties = group.liberty_count(),
            "Stone placed"
        );

        Ok(Placement {
            board,
            captured,
            group,
        })
    }

    /// Formats the board as text: `X` black, `O` white, `.` empty.
    pub fn display(&self) -> String {
        let side = self.size.side();
        let mut out = String::new();
        for row in 0..side {
            out.push_str(&format!("{:>2} ", side - row));
            for col in 0..side {
                let symbol = match self.cell(Coord::new(row, col)) {
                    Intersection::Empty => '.',
                    Intersection::Occupied(Stone::Black) => 'X',
                    Intersection::Occupied(Stone::White) => 'O',
                };
                out.push(symbol);
                if col + 1 < side {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("   ");
        let letters: Vec<String> = (0..side)
            .map(|col| {
                Coord::new(0, col)
                    .to_text(self.size)
                    .chars()
                    .take(1)
                    .collect()
            })
            .collect();
        out.push_str(&letters.join(" "));
        out
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn handicap_points(size: BoardSize, stones: u8) -> Vec<Coord> {
    if stones < 2 {
        return Vec::new();
    }
    let (low, mid, high) = size.star_lines();
    let ordered = [
        Coord::new(high, low),
        Coord::new(low, high),
        Coord::new(low, low),
        Coord::new(high, high),
        Coord::new(mid, low),
        Coord::new(mid, high),
        Coord::new(high, mid),
        Coord::new(low, mid),
    ];
    let with_center = stones >= 5 && stones % 2 == 1;
    let edge_count = usize::from(if with_center { stones - 1 } else { stones });
    let mut points: Vec<Coord> = ordered.into_iter().take(edge_count).collect();
    if with_center {
        points.push(Coord::new(mid, mid));
    }
    points
}
