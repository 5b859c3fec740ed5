/// Handle of a node inside a tree's arena.
///
/// Handles are only meaningful for the tree that produced them and become stale
/// once the node is spliced out or the tree is cleared.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    pub fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub(crate) fn from_index(v: usize) -> Self {
        debug_assert!(v < u32::MAX as usize);
        Self(v as u32)
    }
}

/// Child slot of a node. Used as an index into `Node::ch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline(always)]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }
}

pub(crate) struct Node<K, V, M> {
    pub(crate) ch: [NodeId; 2],
    pub(crate) p: NodeId,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) meta: M,
}

impl<K, V, M> Node<K, V, M> {
    pub(crate) fn new(key: K, value: V, meta: M, p: NodeId) -> Self {
        Self {
            ch: [NodeId::NIL, NodeId::NIL],
            p,
            key,
            value,
            meta,
        }
    }
}
