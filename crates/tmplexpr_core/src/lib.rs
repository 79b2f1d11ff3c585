//! tmplexpr_core: Core utilities shared by the template expression front end.
//!
//! Provides source span types and the arena that owns every parsed tree.

pub mod arena;
pub mod text;

// Re-export commonly used types
pub use arena::ExpressionArena;
pub use text::{AbsoluteSourceSpan, ParseSpan, TextPos};
