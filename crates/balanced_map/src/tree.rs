use std::fmt;
use std::marker::PhantomData;

use crate::avl::Avl;
use crate::balance::Balance;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::node::NodeId;
use crate::raw::{Inorder, Preorder, RawTree};
use crate::rb::{self, Color, RedBlack};

/// Ordered map over a self-balancing binary search tree.
///
/// - Keys are unique; inserting a present key fails with
///   [`TreeError::DuplicateKey`](crate::TreeError::DuplicateKey), and
///   [`update`](Self::update) replaces values.
/// - `B` selects the balancing strategy ([`Avl`] or [`RedBlack`]).
/// - `C` orders the keys; it defaults to the keys' `Ord`.
pub struct BalancedTree<K, V, B: Balance, C = NaturalOrder> {
    raw: RawTree<K, V, B::Meta>,
    cmp: C,
    _balance: PhantomData<B>,
}

pub type AvlTree<K, V, C = NaturalOrder> = BalancedTree<K, V, Avl, C>;

pub type RbTree<K, V, C = NaturalOrder> = BalancedTree<K, V, RedBlack, C>;

impl<K: Ord, V, B: Balance> BalancedTree<K, V, B> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<K, V, B: Balance, C: Comparator<K> + Default> Default for BalancedTree<K, V, B, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, B: Balance, C: Comparator<K>> BalancedTree<K, V, B, C> {
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(0, cmp)
    }

    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
            cmp,
            _balance: PhantomData,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn size(&self) -> usize {
        self.raw.len()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Inserts a new entry and returns a reference to its key.
    pub fn insert(&mut self, key: K, value: V) -> Result<&K> {
        let leaf = match self.raw.insert_leaf(key, value, B::leaf_meta(), &self.cmp) {
            Ok(leaf) => leaf,
            Err(err) => {
                tracing::debug!(strategy = B::NAME, "insert rejected: duplicate key");
                return Err(err);
            }
        };
        B::fixup_after_insert(&mut self.raw, leaf);
        tracing::trace!(strategy = B::NAME, len = self.raw.len(), "inserted");
        Ok(self.raw.key(leaf))
    }

    /// Removes `key` and returns the stored key.
    pub fn delete(&mut self, key: &K) -> Result<K> {
        self.remove_entry(key).map(|(k, _)| k)
    }

    /// Removes `key` and returns the stored entry.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        let x = self.lookup(key, "delete")?;
        let spliced = self.raw.delete_node(x);
        B::fixup_after_delete(&mut self.raw, &spliced.site);
        tracing::trace!(strategy = B::NAME, len = self.raw.len(), "deleted");
        Ok((spliced.key, spliced.value))
    }

    pub fn search(&self, key: &K) -> bool {
        self.raw.find(key, &self.cmp).is_ok()
    }

    /// Replaces the value stored under `key` and returns the stored value.
    pub fn update(&mut self, key: &K, value: V) -> Result<&V> {
        let x = self.lookup(key, "update")?;
        let slot = self.raw.value_mut(x);
        *slot = value;
        Ok(&*slot)
    }

    pub fn get(&self, key: &K) -> Result<&V> {
        let x = self.raw.find(key, &self.cmp)?;
        Ok(self.raw.value(x))
    }

    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        let x = self.raw.find(key, &self.cmp)?;
        Ok(self.raw.value_mut(x))
    }

    fn lookup(&self, key: &K, op: &'static str) -> Result<NodeId> {
        self.raw.find(key, &self.cmp).inspect_err(|_| {
            tracing::debug!(strategy = B::NAME, op, "key not found");
        })
    }

    pub fn clear(&mut self) {
        tracing::debug!(strategy = B::NAME, dropped = self.raw.len(), "clear");
        self.raw.clear();
    }

    fn entry_at(&self, x: NodeId) -> Option<(&K, &V)> {
        (!x.is_nil()).then(|| self.raw.entry(x))
    }

    pub fn root(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.root())
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.first())
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.last())
    }

    /// Entry that follows `key` in comparator order, `None` if `key` is the last.
    pub fn successor(&self, key: &K) -> Result<Option<(&K, &V)>> {
        let x = self.raw.find(key, &self.cmp)?;
        Ok(self.entry_at(self.raw.successor(x)))
    }

    /// Entry that precedes `key` in comparator order, `None` if `key` is the first.
    pub fn predecessor(&self, key: &K) -> Result<Option<(&K, &V)>> {
        let x = self.raw.find(key, &self.cmp)?;
        Ok(self.entry_at(self.raw.predecessor(x)))
    }

    /// Height in nodes of the tree; 0 when empty.
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Root, then left subtree, then right subtree.
    pub fn traverse_preorder(&self) -> Preorder<'_, K, V, B::Meta> {
        self.raw.preorder()
    }

    /// Entries in ascending comparator order.
    pub fn traverse_inorder(&self) -> Inorder<'_, K, V, B::Meta> {
        self.raw.inorder()
    }

    pub fn iter(&self) -> Inorder<'_, K, V, B::Meta> {
        self.raw.inorder()
    }

    /// Checks ordering, link symmetry, size and the strategy's invariant.
    pub fn is_valid(&self) -> bool {
        self.raw.check_structure(&self.cmp) && B::is_valid(&self.raw)
    }
}

impl<K, V, C: Comparator<K>> BalancedTree<K, V, Avl, C> {
    pub fn is_height_balanced(&self) -> bool {
        Avl::is_valid(&self.raw)
    }
}

impl<K, V, C: Comparator<K>> BalancedTree<K, V, RedBlack, C> {
    pub fn is_color_valid(&self) -> bool {
        RedBlack::is_valid(&self.raw)
    }

    /// Black nodes on any path below the root, counting the absent child.
    pub fn black_height(&self) -> u32 {
        rb::black_height(&self.raw)
    }

    pub fn color_of(&self, key: &K) -> Result<Color> {
        let x = self.raw.find(key, &self.cmp)?;
        Ok(*self.raw.meta(x))
    }
}

impl<'a, K, V, B: Balance, C: Comparator<K>> IntoIterator for &'a BalancedTree<K, V, B, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Inorder<'a, K, V, B::Meta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance, C: Comparator<K>> fmt::Debug
    for BalancedTree<K, V, B, C>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
