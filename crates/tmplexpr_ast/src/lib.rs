//! tmplexpr_ast: Abstract Syntax Tree definitions for template expressions.
//!
//! This module defines the closed set of expression nodes, the operator and
//! literal types they carry, the template-binding results, and the visitor
//! traits used to walk a tree.

pub mod node;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use types::*;
pub use visitor::{walk_ast, AstVisitor, RecursiveAstVisitor};
