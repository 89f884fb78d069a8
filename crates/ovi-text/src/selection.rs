//! Selection: a start/end pair plus a shape.
//!
//! The selection stores plain [`Position`] copies, not references to
//! cursors. The engine sets the start when a selection begins and refreshes
//! the end from the primary cursor after every handled event.

use crate::buffer::Buffer;
use crate::position::Position;

/// How the span between start and end is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    /// Character-wise, flowing across lines like running text.
    #[default]
    Fluid,
    /// Whole lines from the start line through the end line.
    Lines,
    /// The rectangle between the two columns on every line in range.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    start: Position,
    end: Position,
    shape: Shape,
    enabled: bool,
}

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: Position::ZERO,
            end: Position::ZERO,
            shape: Shape::Fluid,
            enabled: false,
        }
    }

    /// Begin selecting at `at` with the given shape. Start and end coincide.
    pub const fn begin(&mut self, at: Position, shape: Shape) {
        self.start = at;
        self.end = at;
        self.shape = shape;
        self.enabled = true;
    }

    pub const fn enable(&mut self) {
        self.enabled = true;
    }

    pub const fn disable(&mut self) {
        self.enabled = false;
    }

    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> Position {
        self.end
    }

    #[inline]
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    pub const fn set_start(&mut self, pos: Position) {
        self.start = pos;
    }

    pub const fn set_end(&mut self, pos: Position) {
        self.end = pos;
    }

    pub const fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    /// `true` switches to block shape, `false` back to fluid.
    pub const fn set_block(&mut self, block: bool) {
        self.shape = if block { Shape::Block } else { Shape::Fluid };
    }

    /// Whether `pos` lies inside the selection, bounds inclusive.
    ///
    /// A disabled selection contains nothing. Start and end are normalized
    /// first, so the order they were set in does not matter.
    #[must_use]
    pub fn in_selection(&self, buf: &Buffer, pos: Position) -> bool {
        if !self.enabled {
            return false;
        }
        let (mut lo, mut hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        match self.shape {
            Shape::Fluid => lo <= pos && pos <= hi,
            Shape::Lines => {
                lo.col = 0;
                hi.col = buf.line_len(hi.line).unwrap_or(0);
                lo <= pos && pos <= hi
            }
            // Columns come from the normalized bounds as they are: a block
            // whose lower bound sits right of its upper one holds nothing.
            Shape::Block => {
                (lo.line..=hi.line).contains(&pos.line) && (lo.col..=hi.col).contains(&pos.col)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
