//! Branch-and-bound search tree management.

mod active;
mod arena;
mod branching;
mod delta;
mod driver;
mod node;
mod prune;
mod selection;
mod tree;

pub use branching::BranchDecision;
pub use delta::{DeltaSet, Snapshot};
pub use driver::{BranchAndBound, SearchExit};
pub use node::{NodeRef, SearchNode};
pub use tree::SearchTree;
