//! The seven tetromino kinds and their rotation tables.
//!
//! Offsets are stored already reduced modulo `N`: a component of 10 means one
//! step back, 9 means two. Applying an offset to an anchor therefore always
//! goes through the toroidal [`Coord::translate`].

use std::fmt;

use crate::board::Coord;
use crate::constants::PIECE_CELLS;
use crate::error::MoveError;

const fn o(r: usize, c: usize) -> Coord {
    Coord::new(r, c)
}

/// Offsets of one rotation, relative to the anchor.
pub type Rotation = [Coord; PIECE_CELLS];

const I_ROTATIONS: &[Rotation] = &[
    [o(0, 0), o(0, 1), o(0, 2), o(0, 3)],
    [o(0, 0), o(1, 0), o(2, 0), o(3, 0)],
];

const O_ROTATIONS: &[Rotation] = &[[o(0, 0), o(0, 1), o(1, 0), o(1, 1)]];

const T_ROTATIONS: &[Rotation] = &[
    [o(0, 0), o(0, 1), o(0, 2), o(1, 1)],    // down
    [o(0, 0), o(1, 0), o(2, 0), o(1, 10)],   // left
    [o(0, 0), o(0, 10), o(0, 9), o(10, 10)], // up
    [o(0, 0), o(10, 0), o(9, 0), o(10, 1)],  // right
];

const J_ROTATIONS: &[Rotation] = &[
    [o(0, 0), o(0, 1), o(10, 1), o(9, 1)],    // up
    [o(0, 0), o(1, 0), o(1, 1), o(1, 2)],     // right
    [o(0, 0), o(0, 10), o(1, 10), o(2, 10)],  // down
    [o(0, 0), o(10, 0), o(10, 10), o(10, 9)], // left
];

const L_ROTATIONS: &[Rotation] = &[
    [o(0, 0), o(0, 10), o(10, 10), o(9, 10)], // up
    [o(0, 0), o(10, 0), o(10, 1), o(10, 2)],  // right
    [o(0, 0), o(0, 1), o(1, 1), o(2, 1)],     // down
    [o(0, 0), o(1, 0), o(1, 10), o(1, 9)],    // left
];

const Z_ROTATIONS: &[Rotation] = &[
    [o(0, 0), o(1, 0), o(1, 1), o(0, 10)],
    [o(0, 0), o(0, 10), o(1, 10), o(10, 0)],
];

const S_ROTATIONS: &[Rotation] = &[
    [o(0, 0), o(1, 0), o(1, 10), o(0, 1)],
    [o(0, 0), o(1, 0), o(0, 10), o(10, 10)],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    O,
    T,
    J,
    L,
    Z,
    S,
}

impl ShapeKind {
    /// Every kind, in enumeration order.
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::Z,
        ShapeKind::S,
    ];

    /// Offset table, one entry per rotation.
    pub fn rotations(self) -> &'static [Rotation] {
        match self {
            ShapeKind::I => I_ROTATIONS,
            ShapeKind::O => O_ROTATIONS,
            ShapeKind::T => T_ROTATIONS,
            ShapeKind::J => J_ROTATIONS,
            ShapeKind::L => L_ROTATIONS,
            ShapeKind::Z => Z_ROTATIONS,
            ShapeKind::S => S_ROTATIONS,
        }
    }
}

/// A shape kind with a chosen rotation, anchored at a board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    pub kind: ShapeKind,
    pub rotation: usize,
    pub anchor: Coord,
}

impl Shape {
    /// # Panics
    /// If `rotation` is not a valid index into the kind's rotation table.
    pub fn new(kind: ShapeKind, rotation: usize, anchor: Coord) -> Self {
        assert!(
            rotation < kind.rotations().len(),
            "{kind:?} has no rotation {rotation}"
        );
        Self {
            kind,
            rotation,
            anchor,
        }
    }

    /// Like [`Shape::new`], but `None` when `kind` has no such rotation.
    pub fn checked(kind: ShapeKind, rotation: usize, anchor: Coord) -> Option<Self> {
        (rotation < kind.rotations().len()).then(|| Self::new(kind, rotation, anchor))
    }

    /// The 4 relative offsets of this rotation.
    #[inline]
    pub fn offsets(&self) -> &'static Rotation {
        &self.kind.rotations()[self.rotation]
    }

    /// Absolute cells covered: anchor + each offset, wrapping around.
    pub fn placement(&self) -> Placement {
        let offsets = *self.offsets();
        Placement(offsets.map(|offset| self.anchor.translate(offset)))
    }
}

/// Four pairwise-distinct board cells written in one turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement([Coord; PIECE_CELLS]);

impl Placement {
    /// Validate that the four cells are pairwise distinct.
    pub fn new(coords: [Coord; PIECE_CELLS]) -> Result<Self, MoveError> {
        for (i, a) in coords.iter().enumerate() {
            if coords[i + 1..].contains(a) {
                return Err(MoveError::DuplicateCoord(*a));
            }
        }
        Ok(Placement(coords))
    }

    #[inline]
    pub fn coords(&self) -> &[Coord; PIECE_CELLS] {
        &self.0
    }

    /// Rows touched by this placement.
    pub fn rows(&self) -> Lines {
        Lines::from_indices(self.0.iter().map(|c| c.row()))
    }

    /// Columns touched by this placement.
    pub fn cols(&self) -> Lines {
        Lines::from_indices(self.0.iter().map(|c| c.col()))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a} {b} {c} {d}")
    }
}

/// A set of row or column indices, stored as a bitmask.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Lines(u16);

impl Lines {
    fn from_indices(indices: impl Iterator<Item = usize>) -> Self {
        Lines(indices.fold(0, |mask, i| mask | (1u16 << i)))
    }

    pub fn contains(self, i: usize) -> bool {
        self.0 & (1u16 << i) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..u16::BITS as usize).filter(move |&i| self.contains(i))
    }
}
