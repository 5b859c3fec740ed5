use std::fmt::Debug;

use crate::node::NodeId;
use crate::raw::{RawTree, SpliceSite};

/// A rebalancing strategy plugged into [`BalancedTree`](crate::BalancedTree).
///
/// The core performs the raw BST mutation and then hands the affected position
/// to the strategy, which restores its invariant with rotations and metadata
/// updates only. Fixups never create or drop nodes.
pub trait Balance {
    /// Per-node balancing state.
    type Meta: Copy + Debug + PartialEq;

    const NAME: &'static str;

    /// Metadata a freshly attached leaf starts with.
    fn leaf_meta() -> Self::Meta;

    fn fixup_after_insert<K, V>(tree: &mut RawTree<K, V, Self::Meta>, leaf: NodeId);

    fn fixup_after_delete<K, V>(
        tree: &mut RawTree<K, V, Self::Meta>,
        site: &SpliceSite<Self::Meta>,
    );

    /// Whether the strategy's own invariant holds for the whole tree.
    fn is_valid<K, V>(tree: &RawTree<K, V, Self::Meta>) -> bool;
}
