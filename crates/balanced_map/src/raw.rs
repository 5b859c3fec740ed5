//! Unbalanced binary search tree core shared by every balancing strategy.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Child links own
//! their targets; the parent link is a plain back-reference kept in sync with the
//! child links by every primitive in this module. Nothing here restores a
//! balance invariant: callers run a strategy fixup after each mutation.

use std::cmp::Ordering;

use crate::comparator::Comparator;
use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId, Side};

/// Where a key sits, or would sit, in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Found(NodeId),
    /// `parent` is `NodeId::NIL` when the tree is empty.
    Vacant { parent: NodeId, side: Side },
}

/// Structural facts about a splice, handed to the strategy fixup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpliceSite<M> {
    /// Metadata of the node that was physically unlinked.
    pub removed_meta: M,
    /// Node now occupying the removed position; may be `NodeId::NIL`.
    pub child: NodeId,
    /// Parent of that position; `NodeId::NIL` if it was the root.
    pub parent: NodeId,
    /// Side of `parent` the position hangs from.
    pub side: Side,
}

/// Entry removed by [`RawTree::delete_node`] plus the site it left behind.
pub struct Spliced<K, V, M> {
    pub key: K,
    pub value: V,
    pub site: SpliceSite<M>,
}

/// Arena-backed binary search tree without any balancing policy.
///
/// `M` is the per-node balancing metadata (a height, a color, ...).
pub struct RawTree<K, V, M> {
    nodes: Vec<Option<Node<K, V, M>>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
}

impl<K, V, M> Default for RawTree<K, V, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, M> RawTree<K, V, M> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: NodeId::NIL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline(always)]
    fn node(&self, x: NodeId) -> &Node<K, V, M> {
        debug_assert!(!x.is_nil());
        self.nodes[x.idx()].as_ref().expect("live node")
    }

    #[inline(always)]
    fn node_mut(&mut self, x: NodeId) -> &mut Node<K, V, M> {
        debug_assert!(!x.is_nil());
        self.nodes[x.idx()].as_mut().expect("live node")
    }

    fn alloc(&mut self, node: Node<K, V, M>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.idx()] = Some(node);
            id
        } else {
            let id = NodeId::from_index(self.nodes.len());
            self.nodes.push(Some(node));
            id
        }
    }

    fn release(&mut self, x: NodeId) -> Node<K, V, M> {
        let node = self.nodes[x.idx()].take().expect("live node");
        self.free.push(x);
        node
    }

    #[inline]
    pub fn child(&self, x: NodeId, side: Side) -> NodeId {
        self.node(x).ch[side.idx()]
    }

    #[inline]
    pub fn left(&self, x: NodeId) -> NodeId {
        self.child(x, Side::Left)
    }

    #[inline]
    pub fn right(&self, x: NodeId) -> NodeId {
        self.child(x, Side::Right)
    }

    #[inline]
    pub fn parent(&self, x: NodeId) -> NodeId {
        self.node(x).p
    }

    /// Side of its parent that `x` hangs from, or `None` for the root.
    pub fn side_of(&self, x: NodeId) -> Option<Side> {
        let p = self.parent(x);
        if p.is_nil() {
            return None;
        }
        if self.node(p).ch[0] == x {
            Some(Side::Left)
        } else {
            debug_assert_eq!(self.node(p).ch[1], x);
            Some(Side::Right)
        }
    }

    pub fn key(&self, x: NodeId) -> &K {
        &self.node(x).key
    }

    pub fn value(&self, x: NodeId) -> &V {
        &self.node(x).value
    }

    pub fn value_mut(&mut self, x: NodeId) -> &mut V {
        &mut self.node_mut(x).value
    }

    pub fn entry(&self, x: NodeId) -> (&K, &V) {
        let node = self.node(x);
        (&node.key, &node.value)
    }

    pub fn meta(&self, x: NodeId) -> &M {
        &self.node(x).meta
    }

    pub fn set_meta(&mut self, x: NodeId, meta: M) {
        self.node_mut(x).meta = meta;
    }

    /// Walks from the root comparing against `key`.
    pub fn locate<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Location {
        let mut parent = NodeId::NIL;
        let mut side = Side::Left;
        let mut cur = self.root;
        while !cur.is_nil() {
            let node = self.node(cur);
            side = match cmp.compare(key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Location::Found(cur),
            };
            parent = cur;
            cur = node.ch[side.idx()];
        }
        Location::Vacant { parent, side }
    }

    pub fn find<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Result<NodeId> {
        match self.locate(key, cmp) {
            Location::Found(x) => Ok(x),
            Location::Vacant { .. } => Err(TreeError::NotFound),
        }
    }

    /// Attaches a new leaf carrying `meta` at the position `key` belongs to.
    ///
    /// The tree is left untouched when the key is already present.
    pub fn insert_leaf<C: Comparator<K>>(
        &mut self,
        key: K,
        value: V,
        meta: M,
        cmp: &C,
    ) -> Result<NodeId> {
        let (parent, side) = match self.locate(&key, cmp) {
            Location::Found(_) => return Err(TreeError::DuplicateKey),
            Location::Vacant { parent, side } => (parent, side),
        };
        let x = self.alloc(Node::new(key, value, meta, parent));
        if parent.is_nil() {
            self.root = x;
        } else {
            self.node_mut(parent).ch[side.idx()] = x;
        }
        self.len += 1;
        Ok(x)
    }

    /// Removes the entry stored at `x`.
    ///
    /// A node with two children takes over the key and value of its in-order
    /// successor, and the successor (which has no left child) is unlinked in its
    /// place. Handles other than the unlinked one stay valid, but `x` may now
    /// carry a different entry.
    pub fn delete_node(&mut self, x: NodeId) -> Spliced<K, V, M> {
        let target = if !self.left(x).is_nil() && !self.right(x).is_nil() {
            let succ = self.subtree_min(self.right(x));
            self.swap_entries(x, succ);
            succ
        } else {
            x
        };

        let (l, r, parent) = {
            let node = self.node(target);
            (node.ch[0], node.ch[1], node.p)
        };
        let child = if l.is_nil() { r } else { l };
        let side = self.side_of(target).unwrap_or(Side::Left);
        self.replace_child(parent, target, child);
        if !child.is_nil() {
            self.node_mut(child).p = parent;
        }

        let node = self.release(target);
        self.len -= 1;
        debug_assert!(self.len > 0 || self.root.is_nil());

        Spliced {
            key: node.key,
            value: node.value,
            site: SpliceSite {
                removed_meta: node.meta,
                child,
                parent,
                side,
            },
        }
    }

    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let mut taken = self.nodes[b.idx()].take().expect("live node");
        {
            let other = self.node_mut(a);
            std::mem::swap(&mut other.key, &mut taken.key);
            std::mem::swap(&mut other.value, &mut taken.value);
        }
        self.nodes[b.idx()] = Some(taken);
    }

    /// Points the slot of `parent` that holds `old` (or the root) at `new`.
    /// The parent link of `new` is left to the caller.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.is_nil() {
            self.root = new;
            return;
        }
        let p = self.node_mut(parent);
        if p.ch[0] == old {
            p.ch[0] = new;
        } else {
            debug_assert_eq!(p.ch[1], old);
            p.ch[1] = new;
        }
    }

    /// Rotates `x` down towards `side`; its child on the opposite side takes its
    /// place and is returned.
    ///
    /// Requires that child to exist. Keys keep their in-order sequence; metadata
    /// is not touched.
    pub fn rotate(&mut self, x: NodeId, side: Side) -> NodeId {
        let up = side.opposite();
        let y = self.child(x, up);
        debug_assert!(!y.is_nil(), "rotation needs a child to pivot on");
        let b = self.child(y, side);
        let p = self.parent(x);

        self.node_mut(x).ch[up.idx()] = b;
        if !b.is_nil() {
            self.node_mut(b).p = x;
        }

        self.replace_child(p, x, y);
        self.node_mut(y).p = p;

        self.node_mut(y).ch[side.idx()] = x;
        self.node_mut(x).p = y;

        tracing::trace!(pivot = x.idx(), raised = y.idx(), ?side, "rotate");
        y
    }

    pub fn rotate_left(&mut self, x: NodeId) -> NodeId {
        self.rotate(x, Side::Left)
    }

    pub fn rotate_right(&mut self, x: NodeId) -> NodeId {
        self.rotate(x, Side::Right)
    }

    fn subtree_extreme(&self, mut x: NodeId, side: Side) -> NodeId {
        loop {
            let next = self.child(x, side);
            if next.is_nil() {
                return x;
            }
            x = next;
        }
    }

    pub fn subtree_min(&self, x: NodeId) -> NodeId {
        self.subtree_extreme(x, Side::Left)
    }

    pub fn subtree_max(&self, x: NodeId) -> NodeId {
        self.subtree_extreme(x, Side::Right)
    }

    pub fn first(&self) -> NodeId {
        if self.root.is_nil() {
            NodeId::NIL
        } else {
            self.subtree_min(self.root)
        }
    }

    pub fn last(&self) -> NodeId {
        if self.root.is_nil() {
            NodeId::NIL
        } else {
            self.subtree_max(self.root)
        }
    }

    /// In-order neighbor of `x` towards `side`: the nearest subtree extreme if
    /// that subtree exists, otherwise the first ancestor reached from the other
    /// side.
    fn neighbor(&self, x: NodeId, side: Side) -> NodeId {
        let sub = self.child(x, side);
        if !sub.is_nil() {
            return self.subtree_extreme(sub, side.opposite());
        }
        let mut cur = x;
        let mut p = self.parent(cur);
        while !p.is_nil() && self.child(p, side) == cur {
            cur = p;
            p = self.parent(cur);
        }
        p
    }

    pub fn successor(&self, x: NodeId) -> NodeId {
        self.neighbor(x, Side::Right)
    }

    pub fn predecessor(&self, x: NodeId) -> NodeId {
        self.neighbor(x, Side::Left)
    }

    /// Height in nodes of the whole tree; 0 when empty.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }
        while let Some((x, depth)) = stack.pop() {
            best = best.max(depth);
            for &c in &self.node(x).ch {
                if !c.is_nil() {
                    stack.push((c, depth + 1));
                }
            }
        }
        best
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NodeId::NIL;
        self.len = 0;
    }

    pub fn preorder(&self) -> Preorder<'_, K, V, M> {
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push(self.root);
        }
        Preorder { tree: self, stack }
    }

    pub fn inorder(&self) -> Inorder<'_, K, V, M> {
        Inorder {
            tree: self,
            next: self.first(),
            remaining: self.len,
        }
    }

    /// Checks key order, parent/child link symmetry and the node count.
    pub fn check_structure<C: Comparator<K>>(&self, cmp: &C) -> bool {
        if self.nodes.len() - self.free.len() != self.len {
            return false;
        }
        if self.root.is_nil() {
            return self.len == 0;
        }
        if !self.parent(self.root).is_nil() {
            return false;
        }

        let mut seen = 0;
        let mut stack = vec![self.root];
        while let Some(x) = stack.pop() {
            seen += 1;
            let node = self.node(x);
            for &c in &node.ch {
                if c.is_nil() {
                    continue;
                }
                if self.nodes.get(c.idx()).is_none_or(|slot| slot.is_none()) {
                    return false;
                }
                if self.parent(c) != x {
                    return false;
                }
                stack.push(c);
            }
            if seen > self.len {
                return false;
            }
        }
        if seen != self.len {
            return false;
        }

        let mut prev: Option<&K> = None;
        for (key, _) in self.inorder() {
            if let Some(p) = prev {
                if cmp.compare(p, key) != Ordering::Less {
                    return false;
                }
            }
            prev = Some(key);
        }
        true
    }
}

/// Root, then left subtree, then right subtree.
pub struct Preorder<'a, K, V, M> {
    tree: &'a RawTree<K, V, M>,
    stack: Vec<NodeId>,
}

impl<'a, K, V, M> Iterator for Preorder<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        let node = self.tree.node(x);
        if !node.ch[1].is_nil() {
            self.stack.push(node.ch[1]);
        }
        if !node.ch[0].is_nil() {
            self.stack.push(node.ch[0]);
        }
        Some((&node.key, &node.value))
    }
}

/// Ascending key order, driven by parent links.
pub struct Inorder<'a, K, V, M> {
    tree: &'a RawTree<K, V, M>,
    next: NodeId,
    remaining: usize,
}

impl<'a, K, V, M> Iterator for Inorder<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_nil() {
            return None;
        }
        let x = self.next;
        self.next = self.tree.successor(x);
        self.remaining -= 1;
        Some(self.tree.entry(x))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, M> ExactSizeIterator for Inorder<'_, K, V, M> {}
