//! Category subtree traversals.
//!
//! # Responsibility
//! - Deep and shallow copy of a category into another category.
//! - Guarded and recursive removal of a category.
//!
//! # Invariants
//! - Traversals only talk to the domain store through its repository
//!   contracts.
//! - Every traversal runs in one atomic scope: a failure halfway leaves the
//!   tree exactly as it was.

mod copy;
mod removal;

pub use copy::CopyTraverser;
pub use removal::RemovalTraverser;
