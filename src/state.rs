//! Game state and rules: move generation, line clearing and terminal detection.
//!
//! A move is legal if all four cells of the placement are empty and (after a
//! player's first piece) at least one of them is orthogonally adjacent, with
//! wraparound, to a cell the player already owns. Generation works from the
//! *frontier*: every empty neighbour of the player's cells, or the whole board
//! on their first move. Each frontier cell is pinned under every offset of every
//! rotation of every shape, so the same four cells can be produced more than
//! once through different pins. Those duplicates are kept.

use fastrand::Rng;

use crate::board::{Board, Color, Coord};
use crate::constants::{CELLS, N};
use crate::shapes::{Placement, Shape, ShapeKind};

/// A candidate move: an anchored shape plus the frontier cell it was pinned to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub shape: Shape,
    pub frontier: Coord,
    placement: Placement,
}

impl Move {
    fn new(shape: Shape, frontier: Coord) -> Self {
        Self {
            shape,
            frontier,
            placement: shape.placement(),
        }
    }

    #[inline]
    pub fn placement(&self) -> Placement {
        self.placement
    }
}

/// Rows and columns that are completely occupied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FullLines {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl FullLines {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }
}

/// Board, side to move and ply counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Color,
    pub turn_count: usize,
}

impl GameState {
    pub fn new(board: Board, current_player: Color, turn_count: usize) -> Self {
        Self {
            board,
            current_player,
            turn_count,
        }
    }

    /// Cells from which `color` may grow this turn.
    ///
    /// With no pieces of `color` on the board this is all 121 cells.
    pub fn frontier(&self, color: Color) -> Vec<Coord> {
        if !self.board.has_color(color) {
            return Coord::all().collect();
        }

        let mut seen = [false; CELLS];
        for (coord, owner) in self.board.occupied() {
            if owner != color {
                continue;
            }
            for n in coord.neighbors() {
                if !self.board.is_occupied(n) {
                    seen[n.index()] = true;
                }
            }
        }

        (0..CELLS)
            .filter(|&i| seen[i])
            .map(Coord::from_index)
            .collect()
    }

    #[inline]
    fn fits(&self, placement: &Placement) -> bool {
        placement
            .coords()
            .iter()
            .all(|&coord| !self.board.is_occupied(coord))
    }

    /// Visit every legal move of `color` in generation order.
    /// Stops early when `visit` returns `false`.
    fn for_each_move(&self, color: Color, mut visit: impl FnMut(Move) -> bool) {
        for frontier in self.frontier(color) {
            for kind in ShapeKind::ALL {
                for (rotation, offsets) in kind.rotations().iter().enumerate() {
                    for &offset in offsets {
                        let shape = Shape::new(kind, rotation, frontier.untranslate(offset));
                        let mv = Move::new(shape, frontier);
                        if self.fits(&mv.placement) && !visit(mv) {
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Every legal move of `color`, in generation order.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        self.for_each_move(color, |mv| {
            moves.push(mv);
            true
        });
        moves
    }

    /// Whether `color` has at least one legal move.
    pub fn has_any_move(&self, color: Color) -> bool {
        let mut found = false;
        self.for_each_move(color, |_| {
            found = true;
            false
        });
        found
    }

    /// Every legal move of `color`, shuffled and then stable-sorted by
    /// descending clearance score so that equal scores stay in random order.
    pub fn find_all_valid_moves(&self, color: Color, rng: &mut Rng) -> Vec<Move> {
        let fill = LineFill::of(&self.board);
        let mut scored: Vec<(f64, Move)> = self
            .legal_moves(color)
            .into_iter()
            .map(|mv| (fill.score(&self.board, &mv.placement), mv))
            .collect();

        rng.shuffle(&mut scored);
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().map(|(_, mv)| mv).collect()
    }

    /// Sum, over every row and column the placement touches, of the fraction
    /// of that line occupied once the placement is on the board.
    /// Lines are not cleared while scoring.
    pub fn clearance_score(&self, placement: &Placement) -> f64 {
        LineFill::of(&self.board).score(&self.board, placement)
    }

    /// Rows and columns touched by `placement` that are now fully occupied.
    pub fn is_line_full(&self, placement: &Placement) -> FullLines {
        FullLines {
            rows: placement
                .rows()
                .iter()
                .filter(|&r| self.board.row_count(r) == N)
                .collect(),
            cols: placement
                .cols()
                .iter()
                .filter(|&c| self.board.col_count(c) == N)
                .collect(),
        }
    }

    /// Empty every listed row, then every listed column.
    pub fn clear_lines(&mut self, rows: &[usize], cols: &[usize]) {
        for &r in rows {
            self.board.clear_row(r);
        }
        for &c in cols {
            self.board.clear_col(c);
        }
    }

    /// Write `placement` for `color` and clear the lines it completes.
    /// The side to move is left unchanged.
    pub fn commit(&mut self, placement: &Placement, color: Color) -> FullLines {
        debug_assert!(self.fits(placement), "placement {placement} overlaps");
        self.board.place(placement.coords(), color);
        let full = self.is_line_full(placement);
        self.clear_lines(&full.rows, &full.cols);
        full
    }

    /// Play `placement` for the side to move, clear completed lines and pass
    /// the turn.
    pub fn apply(&mut self, placement: &Placement) -> FullLines {
        let full = self.commit(placement, self.current_player);
        self.current_player = self.current_player.opponent();
        self.turn_count += 1;
        full
    }

    /// True iff the opponent of `color` has no legal move.
    ///
    /// This signals game over; it does not by itself say who moved last.
    pub fn has_won(&self, color: Color) -> bool {
        !self.has_any_move(color.opponent())
    }
}

/// Occupied-cell counts per row and column, computed once per position.
struct LineFill {
    rows: [usize; N],
    cols: [usize; N],
}

impl LineFill {
    fn of(board: &Board) -> Self {
        Self {
            rows: std::array::from_fn(|r| board.row_count(r)),
            cols: std::array::from_fn(|c| board.col_count(c)),
        }
    }

    fn score(&self, board: &Board, placement: &Placement) -> f64 {
        let added = placement
            .coords()
            .iter()
            .filter(|&&coord| !board.is_occupied(coord));

        let mut rows = self.rows;
        let mut cols = self.cols;
        for coord in added {
            rows[coord.row()] += 1;
            cols[coord.col()] += 1;
        }

        let row_fill: usize = placement.rows().iter().map(|r| rows[r]).sum();
        let col_fill: usize = placement.cols().iter().map(|c| cols[c]).sum();
        (row_fill + col_fill) as f64 / N as f64
    }
}
