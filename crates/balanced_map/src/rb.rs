//! Color-balanced strategy.
//!
//! Invariants kept after every public operation:
//! - the root and every absent child are black;
//! - a red node has two black children;
//! - every path from a node down to an absent child meets the same number of
//!   black nodes.
//!
//! Both fixups are written once against a [`Side`] parameter, so the mirrored
//! cases share one code path.

use crate::balance::Balance;
use crate::node::{NodeId, Side};
use crate::raw::{RawTree, SpliceSite};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Red-black balancing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedBlack;

/// Situation of a red node whose parent is also red.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InsertCase {
    /// Uncle red: push the grandparent's blackness down and continue above.
    UncleRed,
    /// Uncle black, node is an inner grandchild: rotate at the parent.
    Triangle,
    /// Uncle black, node is an outer grandchild: rotate at the grandparent.
    Line,
}

/// Situation of a doubly-black position, named after its sibling `w`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeleteCase {
    SiblingRed,
    NephewsBlack,
    /// Near nephew red, far nephew black.
    NearNephewRed,
    FarNephewRed,
}

#[inline]
fn color<K, V>(tree: &RawTree<K, V, Color>, x: NodeId) -> Color {
    if x.is_nil() { Color::Black } else { *tree.meta(x) }
}

#[inline]
fn is_red<K, V>(tree: &RawTree<K, V, Color>, x: NodeId) -> bool {
    color(tree, x) == Color::Red
}

#[inline]
fn paint<K, V>(tree: &mut RawTree<K, V, Color>, x: NodeId, c: Color) {
    if !x.is_nil() {
        tree.set_meta(x, c);
    }
}

fn classify_insert<K, V>(
    tree: &RawTree<K, V, Color>,
    node: NodeId,
    parent_side: Side,
    uncle: NodeId,
) -> InsertCase {
    if is_red(tree, uncle) {
        InsertCase::UncleRed
    } else if tree.side_of(node) != Some(parent_side) {
        InsertCase::Triangle
    } else {
        InsertCase::Line
    }
}

fn insert_fixup<K, V>(tree: &mut RawTree<K, V, Color>, leaf: NodeId) {
    let mut node = leaf;
    loop {
        let parent = tree.parent(node);
        if parent.is_nil() || !is_red(tree, parent) {
            break;
        }
        // A red parent is never the root, so the grandparent exists.
        let Some(parent_side) = tree.side_of(parent) else {
            break;
        };
        let grand = tree.parent(parent);
        let uncle = tree.child(grand, parent_side.opposite());

        let case = classify_insert(tree, node, parent_side, uncle);
        tracing::trace!(node = node.idx(), ?case, ?parent_side, "rb insert fixup");
        match case {
            InsertCase::UncleRed => {
                paint(tree, parent, Color::Black);
                paint(tree, uncle, Color::Black);
                paint(tree, grand, Color::Red);
                node = grand;
            }
            InsertCase::Triangle => {
                tree.rotate(parent, parent_side);
                node = parent;
            }
            InsertCase::Line => {
                paint(tree, parent, Color::Black);
                paint(tree, grand, Color::Red);
                tree.rotate(grand, parent_side.opposite());
                break;
            }
        }
    }
    let root = tree.root();
    paint(tree, root, Color::Black);
}

fn classify_delete<K, V>(tree: &RawTree<K, V, Color>, sibling: NodeId, side: Side) -> DeleteCase {
    if is_red(tree, sibling) {
        return DeleteCase::SiblingRed;
    }
    debug_assert!(!sibling.is_nil(), "a doubly-black position has a sibling");
    let near = tree.child(sibling, side);
    let far = tree.child(sibling, side.opposite());
    if is_red(tree, far) {
        DeleteCase::FarNephewRed
    } else if is_red(tree, near) {
        DeleteCase::NearNephewRed
    } else {
        DeleteCase::NephewsBlack
    }
}

/// `x` carries one extra black. It may be `NodeId::NIL`, which is why its
/// parent and side travel with it.
fn delete_fixup<K, V>(tree: &mut RawTree<K, V, Color>, site: &SpliceSite<Color>) {
    let mut x = site.child;
    let mut parent = site.parent;
    let mut side = site.side;

    while x != tree.root() && !is_red(tree, x) {
        let sibling = tree.child(parent, side.opposite());
        let case = classify_delete(tree, sibling, side);
        tracing::trace!(parent = parent.idx(), ?case, ?side, "rb delete fixup");
        match case {
            DeleteCase::SiblingRed => {
                paint(tree, sibling, Color::Black);
                paint(tree, parent, Color::Red);
                tree.rotate(parent, side);
            }
            DeleteCase::NephewsBlack => {
                paint(tree, sibling, Color::Red);
                x = parent;
                parent = tree.parent(x);
                match tree.side_of(x) {
                    Some(s) => side = s,
                    None => break,
                }
            }
            DeleteCase::NearNephewRed => {
                let near = tree.child(sibling, side);
                paint(tree, near, Color::Black);
                paint(tree, sibling, Color::Red);
                tree.rotate(sibling, side.opposite());
            }
            DeleteCase::FarNephewRed => {
                let far = tree.child(sibling, side.opposite());
                let parent_color = color(tree, parent);
                paint(tree, sibling, parent_color);
                paint(tree, parent, Color::Black);
                paint(tree, far, Color::Black);
                tree.rotate(parent, side);
                x = tree.root();
            }
        }
    }
    paint(tree, x, Color::Black);
}

/// Black nodes (counting the absent child as one) strictly below `x` on every
/// path, plus `x` itself if black; `None` if paths disagree or a red node has
/// a red child.
fn checked_black_height<K, V>(tree: &RawTree<K, V, Color>, x: NodeId) -> Option<u32> {
    if x.is_nil() {
        return Some(1);
    }
    let (l, r) = (tree.left(x), tree.right(x));
    if is_red(tree, x) && (is_red(tree, l) || is_red(tree, r)) {
        return None;
    }
    let bl = checked_black_height(tree, l)?;
    let br = checked_black_height(tree, r)?;
    if bl != br {
        return None;
    }
    Some(bl + u32::from(!is_red(tree, x)))
}

/// Black nodes on the path from below the root down to an absent child,
/// counting that absent child. 0 for an empty tree.
pub(crate) fn black_height<K, V>(tree: &RawTree<K, V, Color>) -> u32 {
    let root = tree.root();
    if root.is_nil() {
        return 0;
    }
    let mut h = 0;
    let mut cur = tree.left(root);
    loop {
        if !is_red(tree, cur) {
            h += 1;
        }
        if cur.is_nil() {
            return h;
        }
        cur = tree.left(cur);
    }
}

impl Balance for RedBlack {
    type Meta = Color;

    const NAME: &'static str = "red-black";

    fn leaf_meta() -> Color {
        Color::Red
    }

    fn fixup_after_insert<K, V>(tree: &mut RawTree<K, V, Color>, leaf: NodeId) {
        insert_fixup(tree, leaf);
    }

    fn fixup_after_delete<K, V>(tree: &mut RawTree<K, V, Color>, site: &SpliceSite<Color>) {
        // Unlinking a red node changes no black-height.
        if site.removed_meta == Color::Black {
            delete_fixup(tree, site);
        }
    }

    fn is_valid<K, V>(tree: &RawTree<K, V, Color>) -> bool {
        !is_red(tree, tree.root()) && checked_black_height(tree, tree.root()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{black_height, Color, RedBlack};
    use crate::balance::Balance;
    use crate::comparator::{Comparator, NaturalOrder, Reversed};
    use crate::raw::RawTree;

    fn insert<C: Comparator<i32>>(tree: &mut RawTree<i32, (), Color>, key: i32, cmp: &C) {
        let leaf = tree
            .insert_leaf(key, (), RedBlack::leaf_meta(), cmp)
            .unwrap();
        RedBlack::fixup_after_insert(tree, leaf);
        assert!(RedBlack::is_valid(tree), "after inserting {key}");
        assert!(tree.check_structure(cmp));
    }

    fn delete<C: Comparator<i32>>(tree: &mut RawTree<i32, (), Color>, key: i32, cmp: &C) {
        let x = tree.find(&key, cmp).unwrap();
        let spliced = tree.delete_node(x);
        RedBlack::fixup_after_delete(tree, &spliced.site);
        assert!(RedBlack::is_valid(tree), "after deleting {key}");
        assert!(tree.check_structure(cmp));
    }

    fn build<C: Comparator<i32>>(keys: &[i32], cmp: &C) -> RawTree<i32, (), Color> {
        let mut tree = RawTree::new();
        for &k in keys {
            insert(&mut tree, k, cmp);
        }
        tree
    }

    fn shape(tree: &RawTree<i32, (), Color>) -> Vec<(i32, Color)> {
        let mut out = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(x) = stack.pop() {
            if x.is_nil() {
                continue;
            }
            out.push((*tree.key(x), *tree.meta(x)));
            stack.push(tree.right(x));
            stack.push(tree.left(x));
        }
        out
    }

    use Color::{Black as B, Red as R};

    #[test]
    fn full_seven_node_tree_colors() {
        let tree = build(&[50, 30, 70, 20, 40, 60, 80], &NaturalOrder);
        assert_eq!(
            shape(&tree),
            vec![(50, B), (30, B), (20, R), (40, R), (70, B), (60, R), (80, R)]
        );
        assert_eq!(black_height(&tree), 2);
    }

    #[test]
    fn insert_cases_in_both_orientations() {
        // Line: 3, 2, 1 straight down one side.
        assert_eq!(shape(&build(&[3, 2, 1], &NaturalOrder)), vec![(2, B), (1, R), (3, R)]);
        assert_eq!(shape(&build(&[1, 2, 3], &NaturalOrder)), vec![(2, B), (1, R), (3, R)]);
        // Triangle then line.
        assert_eq!(shape(&build(&[3, 1, 2], &NaturalOrder)), vec![(2, B), (1, R), (3, R)]);
        assert_eq!(shape(&build(&[1, 3, 2], &NaturalOrder)), vec![(2, B), (1, R), (3, R)]);
        // Mirror orientation keeps the same colors, reflected.
        assert_eq!(
            shape(&build(&[3, 1, 2], &Reversed(NaturalOrder))),
            vec![(2, B), (3, R), (1, R)]
        );
        // Uncle red: recolor only.
        assert_eq!(
            shape(&build(&[2, 1, 3, 4], &NaturalOrder)),
            vec![(2, B), (1, B), (3, B), (4, R)]
        );
    }

    #[test]
    fn deleting_red_leaf_needs_no_fixup() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80], &NaturalOrder);
        delete(&mut tree, 20, &NaturalOrder);
        assert_eq!(
            shape(&tree),
            vec![(50, B), (30, B), (40, R), (70, B), (60, R), (80, R)]
        );
        assert_eq!(black_height(&tree), 2);
    }

    #[test]
    fn delete_black_leaf_with_black_nephews_pushes_deficit_up() {
        let mut tree = build(&[2, 1, 3, 4], &NaturalOrder);
        delete(&mut tree, 4, &NaturalOrder);
        delete(&mut tree, 1, &NaturalOrder);
        assert_eq!(shape(&tree), vec![(2, B), (3, R)]);
    }

    #[test]
    fn delete_with_far_nephew_red() {
        let mut tree = build(&[2, 1, 3, 4], &NaturalOrder);
        delete(&mut tree, 1, &NaturalOrder);
        assert_eq!(shape(&tree), vec![(3, B), (2, B), (4, B)]);
    }

    #[test]
    fn delete_with_near_nephew_red() {
        let mut tree = build(&[2, 1, 4, 3], &NaturalOrder);
        delete(&mut tree, 1, &NaturalOrder);
        assert_eq!(shape(&tree), vec![(3, B), (2, B), (4, B)]);

        let mut mirrored = build(&[2, 1, 4, 3], &Reversed(NaturalOrder));
        delete(&mut mirrored, 1, &Reversed(NaturalOrder));
        assert_eq!(shape(&mirrored), vec![(3, B), (4, B), (2, B)]);
    }

    #[test]
    fn delete_with_red_sibling_rotates_first() {
        let mut tree = build(&[10, 5, 20, 15, 30, 40], &NaturalOrder);
        // 20 is red with black children 15 and 30.
        assert_eq!(
            shape(&tree),
            vec![(10, B), (5, B), (20, R), (15, B), (30, B), (40, R)]
        );
        delete(&mut tree, 5, &NaturalOrder);
        assert_eq!(
            shape(&tree),
            vec![(20, B), (10, B), (15, R), (30, B), (40, R)]
        );
    }

    #[test]
    fn delete_root_with_two_children() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80], &NaturalOrder);
        delete(&mut tree, 50, &NaturalOrder);
        assert_eq!(*tree.key(tree.root()), 60);
        delete(&mut tree, 60, &NaturalOrder);
        delete(&mut tree, 70, &NaturalOrder);
        delete(&mut tree, 80, &NaturalOrder);
        assert_eq!(black_height(&tree), 2);
        for k in [20, 30, 40] {
            delete(&mut tree, k, &NaturalOrder);
        }
        assert!(tree.is_empty());
        assert_eq!(black_height(&tree), 0);
    }

    #[test]
    fn red_root_or_red_chain_is_rejected() {
        let mut tree = build(&[2, 1, 3], &NaturalOrder);
        let root = tree.root();
        tree.set_meta(root, Color::Red);
        assert!(!RedBlack::is_valid(&tree));

        let mut tree = build(&[2, 1, 3, 4], &NaturalOrder);
        let three = tree.find(&3, &NaturalOrder).unwrap();
        tree.set_meta(three, Color::Red);
        assert!(!RedBlack::is_valid(&tree));
    }
}
