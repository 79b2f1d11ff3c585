//! Arena allocation for parsed expressions.
//!
//! Every AST node, node list, and decoded string produced by a parse is
//! allocated from one bump arena. Nodes are never freed one by one; dropping
//! or resetting the arena releases a whole tree at once.

use bumpalo::Bump;

/// The arena that owns every tree produced by the parser.
pub struct ExpressionArena {
    bump: Bump,
}

impl ExpressionArena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena with the specified initial capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Get a reference to the underlying bump allocator.
    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Move the items of an iterator into a slice owned by the arena.
    #[inline]
    pub fn alloc_slice<T, I>(&self, items: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
    {
        let mut list = bumpalo::collections::Vec::new_in(&self.bump);
        list.extend(items);
        list.into_bump_slice()
    }

    /// Returns the total bytes allocated in this arena.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Reset the arena, deallocating all trees but keeping the memory.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for ExpressionArena {
    fn default() -> Self {
        Self::new()
    }
}
