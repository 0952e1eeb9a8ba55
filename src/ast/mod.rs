//! Abstract Syntax Tree (AST) representation
//!
//! The tree is built once by the parser and only read afterwards. Every
//! analysis walks it through [`AstVisitor`]; no phase dispatches on node
//! kinds by hand.

mod nodes;
mod printer;
mod visitor;

pub use nodes::*;
pub use printer::*;
pub use visitor::*;

pub use crate::parser::span::{LocatedText, Location};

/// AST node trait that all AST nodes implement
pub trait AstNode {
    /// Get the source location of this node
    fn location(&self) -> Location;

    /// Accept a visitor
    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V);
}
