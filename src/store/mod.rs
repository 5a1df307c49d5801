//! Sparse indexed store
//!
//! One balanced index tree per logical array. Only non-zero entries are
//! materialized: a `set` whose encoded components all equal the zero
//! template deletes the entry instead of storing it, and reads of absent
//! indices decode the zero template. A single per-store mutex guards the
//! tree and the scratch buffer for every specialization; rotations touch
//! several nodes at once, so no finer-grained locking is safe.

use parking_lot::Mutex;

use tracing::trace;

use crate::coder::{Coder, Component};
use crate::tree::{Payload, RbTree, NIL};
use crate::StoreError;

/// Object-safe surface implemented by every elementary-kind specialization.
pub trait IndexedStore<V>: Send + Sync {
    /// Read the value at `index` into `out`; absent entries read as zero.
    fn get(&self, index: i64, out: &mut V) -> Result<(), StoreError>;

    /// Write `value` at `index`, eliding entries that encode to zero.
    fn set(&self, index: i64, value: &V) -> Result<(), StoreError>;

    /// Fixed logical length of the array.
    fn size(&self) -> i64;

    /// Independent deep copy with identical contents.
    fn duplicate(&self) -> Box<dyn IndexedStore<V>>;

    /// Empty store of the same value type and length.
    fn allocate(&self) -> Box<dyn IndexedStore<V>>;
}

impl<V> std::fmt::Debug for dyn IndexedStore<V> + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedStore")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

/// Sparse indexed store, generic over the member type `V` and the component
/// kind `C` its coder operates over.
#[derive(Debug)]
pub struct SparseStore<V, C: Component> {
    /// Logical length, fixed at construction.
    length: i64,
    /// Prototype member; decode scratch and the source of fresh copies.
    template: V,
    /// All-components-zero template, computed once from the member type.
    zero: Vec<C>,
    inner: Mutex<Inner<C>>,
}

#[derive(Debug)]
struct Inner<C> {
    tree: RbTree<C>,
    /// Reusable encode buffer, one payload wide.
    scratch: Vec<C>,
}

impl<V, C> SparseStore<V, C>
where
    V: Coder<C> + Clone,
    C: Component,
{
    /// Create an empty store of `length` logical slots.
    pub fn new(template: V, length: i64) -> Result<Self, StoreError> {
        if length < 0 {
            return Err(StoreError::InvalidSize(length));
        }
        Ok(Self::with_length(template, length))
    }

    fn with_length(template: V, length: i64) -> Self {
        let zero = vec![C::default(); template.component_count()];
        let scratch = zero.clone();
        Self {
            length,
            template,
            zero,
            inner: Mutex::new(Inner {
                tree: RbTree::new(),
                scratch,
            }),
        }
    }

    /// Fixed logical length.
    #[inline]
    pub fn size(&self) -> i64 {
        self.length
    }

    /// Count of materialized (non-zero) entries.
    pub fn entry_count(&self) -> usize {
        self.inner.lock().tree.len()
    }

    /// Run the tree's red-black invariant checker. Test support.
    pub fn check_invariants(&self) -> Result<usize, String> {
        self.inner.lock().tree.check_invariants()
    }

    #[inline]
    fn check_bounds(&self, index: i64) -> Result<(), StoreError> {
        if index < 0 || index >= self.length {
            return Err(StoreError::IndexOutOfRange {
                index,
                length: self.length,
            });
        }
        Ok(())
    }

    /// Read the value at `index` into `out`.
    ///
    /// Absent indices decode the zero template; they are semantically zero
    /// without any stored node.
    pub fn get(&self, index: i64, out: &mut V) -> Result<(), StoreError> {
        self.check_bounds(index)?;
        let inner = self.inner.lock();
        let id = inner.tree.find(index);
        if id == NIL {
            out.decode(&self.zero);
        } else {
            out.decode(inner.tree.payload(id));
        }
        Ok(())
    }

    /// Write `value` at `index`.
    ///
    /// A value that encodes component-wise equal to zero removes the entry;
    /// a non-zero value overwrites the payload in place when the entry
    /// already exists (no structural change) and inserts a node otherwise.
    /// Fails before any mutation on a bounds violation.
    pub fn set(&self, index: i64, value: &V) -> Result<(), StoreError> {
        self.check_bounds(index)?;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        value.encode(&mut inner.scratch);

        let id = inner.tree.find(index);
        if inner.scratch == self.zero {
            if id != NIL {
                inner.tree.remove(id);
                trace!(index, "elided zero entry");
            }
        } else if id != NIL {
            // Hot path: repeated updates to an already-nonzero slot.
            inner.tree.payload_mut(id).clone_from_slice(&inner.scratch);
        } else {
            let payload: Payload<C> = inner.scratch.iter().cloned().collect();
            inner.tree.insert(index, payload);
            trace!(index, "materialized entry");
        }
        Ok(())
    }

    /// Independent deep copy; mutating either store never affects the other.
    ///
    /// The source tree is walked with an explicit stack and every visited
    /// node's value is decoded and re-set into the copy, so the copy holds
    /// its own nodes and its own payload buffers throughout.
    pub fn deep_copy(&self) -> Self {
        let copy = Self::with_length(self.template.clone(), self.length);
        let mut cursor = self.template.clone();
        let source = self.inner.lock();
        {
            let mut target = copy.inner.lock();
            source.tree.for_each(|key, components| {
                cursor.decode(components);
                let inner = &mut *target;
                cursor.encode(&mut inner.scratch);
                // Stored payloads are never zero, but re-setting through the
                // coder keeps the elision check authoritative.
                if inner.scratch != self.zero {
                    let payload: Payload<C> = inner.scratch.iter().cloned().collect();
                    inner.tree.insert(key, payload);
                }
            });
        }
        copy
    }

    /// Empty store of the same member type and length.
    pub fn fresh(&self) -> Self {
        Self::with_length(self.template.clone(), self.length)
    }
}

impl<V, C> IndexedStore<V> for SparseStore<V, C>
where
    V: Coder<C> + Clone + Send + Sync + 'static,
    C: Component,
{
    fn get(&self, index: i64, out: &mut V) -> Result<(), StoreError> {
        SparseStore::get(self, index, out)
    }

    fn set(&self, index: i64, value: &V) -> Result<(), StoreError> {
        SparseStore::set(self, index, value)
    }

    fn size(&self) -> i64 {
        self.length
    }

    fn duplicate(&self) -> Box<dyn IndexedStore<V>> {
        Box::new(self.deep_copy())
    }

    fn allocate(&self) -> Box<dyn IndexedStore<V>> {
        Box::new(self.fresh())
    }
}
