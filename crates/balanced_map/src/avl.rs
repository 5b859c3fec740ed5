//! Height-balanced strategy.
//!
//! Each node stores the height of its subtree (a leaf is 1, an absent child 0).
//! After a mutation the heights are recomputed on the path to the root and any
//! node whose children differ in height by more than one is rotated back into
//! shape.

use crate::balance::Balance;
use crate::node::{NodeId, Side};
use crate::raw::{RawTree, SpliceSite};

pub type Height = u32;

/// AVL balancing: `|height(left) - height(right)| <= 1` at every node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Avl;

#[inline]
fn height<K, V>(tree: &RawTree<K, V, Height>, x: NodeId) -> Height {
    if x.is_nil() { 0 } else { *tree.meta(x) }
}

#[inline]
fn child_height<K, V>(tree: &RawTree<K, V, Height>, x: NodeId, side: Side) -> Height {
    height(tree, tree.child(x, side))
}

fn recalc<K, V>(tree: &mut RawTree<K, V, Height>, x: NodeId) {
    let h = 1 + child_height(tree, x, Side::Left).max(child_height(tree, x, Side::Right));
    tree.set_meta(x, h);
}

/// `height(right) - height(left)`.
fn balance_factor<K, V>(tree: &RawTree<K, V, Height>, x: NodeId) -> i64 {
    child_height(tree, x, Side::Right) as i64 - child_height(tree, x, Side::Left) as i64
}

/// Rotates `x` towards `side` and refreshes the two heights that changed,
/// lower node first.
fn rotate<K, V>(tree: &mut RawTree<K, V, Height>, x: NodeId, side: Side) -> NodeId {
    let y = tree.rotate(x, side);
    recalc(tree, x);
    recalc(tree, y);
    y
}

/// Restores balance at `x`, whose factor is outside `[-1, 1]`. Returns the new
/// root of the subtree.
fn rebalance<K, V>(tree: &mut RawTree<K, V, Height>, x: NodeId) -> NodeId {
    let heavy = if balance_factor(tree, x) < 0 {
        Side::Left
    } else {
        Side::Right
    };
    let child = tree.child(x, heavy);
    let outer = child_height(tree, child, heavy);
    let inner = child_height(tree, child, heavy.opposite());
    if outer < inner {
        tracing::trace!(node = x.idx(), ?heavy, "avl double rotation");
        rotate(tree, child, heavy);
    } else {
        tracing::trace!(node = x.idx(), ?heavy, "avl single rotation");
    }
    rotate(tree, x, heavy.opposite())
}

/// Walks from `start` to the root refreshing heights and rebalancing wherever
/// the factor leaves `[-1, 1]`.
fn retrace<K, V>(tree: &mut RawTree<K, V, Height>, start: NodeId) {
    let mut cur = start;
    while !cur.is_nil() {
        recalc(tree, cur);
        if balance_factor(tree, cur).abs() > 1 {
            cur = rebalance(tree, cur);
        }
        cur = tree.parent(cur);
    }
}

/// Verified height of the subtree at `x`, or `None` if a stored height is stale
/// or a node is out of balance.
fn checked_height<K, V>(tree: &RawTree<K, V, Height>, x: NodeId) -> Option<Height> {
    if x.is_nil() {
        return Some(0);
    }
    let l = checked_height(tree, tree.left(x))?;
    let r = checked_height(tree, tree.right(x))?;
    let h = 1 + l.max(r);
    (l.abs_diff(r) <= 1 && *tree.meta(x) == h).then_some(h)
}

impl Balance for Avl {
    type Meta = Height;

    const NAME: &'static str = "avl";

    fn leaf_meta() -> Height {
        1
    }

    fn fixup_after_insert<K, V>(tree: &mut RawTree<K, V, Height>, leaf: NodeId) {
        retrace(tree, tree.parent(leaf));
    }

    fn fixup_after_delete<K, V>(tree: &mut RawTree<K, V, Height>, site: &SpliceSite<Height>) {
        retrace(tree, site.parent);
    }

    fn is_valid<K, V>(tree: &RawTree<K, V, Height>) -> bool {
        checked_height(tree, tree.root()).is_some()
    }
}
