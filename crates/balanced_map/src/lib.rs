//! Ordered key-value map on a pointer-linked binary search tree, kept balanced
//! by either the AVL (height) or the red-black (color) strategy.

mod avl;
mod balance;
mod comparator;
mod error;
mod node;
mod rb;
mod tree;

pub mod raw;

pub use avl::{Avl, Height};
pub use balance::Balance;
pub use comparator::{Comparator, NaturalOrder, Reversed};
pub use error::{Result, TreeError};
pub use node::{NodeId, Side};
pub use rb::{Color, RedBlack};
pub use tree::{AvlTree, BalancedTree, RbTree};
