//! Span types for source location tracking.
//!
//! An expression is parsed out of a larger template document. Offsets inside
//! the expression text are tracked as [`ParseSpan`]s; adding the absolute
//! offset at which the expression starts yields an [`AbsoluteSourceSpan`]
//! into the enclosing document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A position in expression text, measured in characters from the start.
pub type TextPos = u32;

/// A span relative to the expression text being parsed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct ParseSpan {
    /// Inclusive start offset.
    pub start: TextPos,
    /// Exclusive end offset.
    pub end: TextPos,
}

impl ParseSpan {
    #[inline]
    pub fn new(start: TextPos, end: TextPos) -> Self {
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { start: pos, end: pos }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely within this span.
    #[inline]
    pub fn contains_span(&self, other: &ParseSpan) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Translate this span into document coordinates.
    #[inline]
    pub fn to_absolute(&self, absolute_offset: TextPos) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }

    /// Convert to a character range.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for ParseSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for ParseSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A span relative to the start of the enclosing document.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: TextPos,
    pub end: TextPos,
}

impl AbsoluteSourceSpan {
    #[inline]
    pub fn new(start: TextPos, end: TextPos) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely within this span.
    #[inline]
    pub fn contains_span(&self, other: &AbsoluteSourceSpan) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

impl fmt::Debug for AbsoluteSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}..{}", self.start, self.end)
    }
}

impl fmt::Display for AbsoluteSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
