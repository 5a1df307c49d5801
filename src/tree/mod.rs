//! Balanced index tree
//!
//! Red-black tree keyed by a 64-bit logical index, one fixed-width payload
//! slot per node. Lookup, insert, and delete are O(log n) worst case; every
//! operation leaves all four balance invariants intact before returning.
//!
//! Nodes live in an arena and link to each other by index. Slot 0 holds the
//! shared sentinel, so rotations and fixups never branch on "no child":
//! the sentinel stands in everywhere a child or parent is absent, exactly
//! as in the textbook formulation. Freed slots are recycled through a free
//! list.

mod node;

pub use node::{Color, Node, NodeId, Payload, NIL, PAYLOAD_INLINE};

use std::cmp::Ordering;

/// Red-black tree over fixed-width component payloads.
#[derive(Debug, Clone)]
pub struct RbTree<C> {
    nodes: Vec<Node<C>>,
    root: NodeId,
    free: Vec<NodeId>,
    len: usize,
}

impl<C: Clone> RbTree<C> {
    /// Create an empty tree (root is the sentinel).
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            root: NIL,
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn left(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].left
    }

    #[inline]
    fn right(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].right
    }

    #[inline]
    fn parent(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].parent
    }

    #[inline]
    fn color(&self, id: NodeId) -> Color {
        self.nodes[id as usize].color
    }

    /// Exact lookup: standard BST descent, [`NIL`] when absent.
    pub fn find(&self, key: i64) -> NodeId {
        let mut cur = self.root;
        while cur != NIL {
            let node = &self.nodes[cur as usize];
            cur = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return cur,
            };
        }
        NIL
    }

    /// Payload slot of a live node.
    pub fn payload(&self, id: NodeId) -> &[C] {
        debug_assert_ne!(id, NIL, "sentinel has no payload");
        &self.nodes[id as usize].payload
    }

    /// Mutable payload slot of a live node (in-place overwrite path).
    pub fn payload_mut(&mut self, id: NodeId) -> &mut [C] {
        debug_assert_ne!(id, NIL, "sentinel has no payload");
        &mut self.nodes[id as usize].payload
    }

    /// Insert a new key. Caller guarantees `key` is not already present.
    pub fn insert(&mut self, key: i64, payload: Payload<C>) -> NodeId {
        let mut parent = NIL;
        let mut cur = self.root;
        while cur != NIL {
            parent = cur;
            let node = &self.nodes[cur as usize];
            debug_assert_ne!(key, node.key, "duplicate key insert");
            cur = if key < node.key { node.left } else { node.right };
        }

        let id = self.acquire(key, payload);
        self.nodes[id as usize].parent = parent;
        if parent == NIL {
            self.root = id;
        } else if key < self.nodes[parent as usize].key {
            self.nodes[parent as usize].left = id;
        } else {
            self.nodes[parent as usize].right = id;
        }

        // New nodes always enter red; fixup restores the invariants.
        self.nodes[id as usize].color = Color::Red;
        self.insert_fixup(id);
        self.len += 1;
        id
    }

    /// Remove a live node, rebalancing if a black node left its path.
    pub fn remove(&mut self, z: NodeId) {
        debug_assert_ne!(z, NIL, "cannot remove the sentinel");

        let mut y = z;
        let mut removed_color = self.color(y);
        let x;
        if self.left(z) == NIL {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z) == NIL {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            // Two children: splice in the in-order successor.
            y = self.minimum(self.right(z));
            removed_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                // x may be the sentinel; fixup still needs its parent link.
                self.nodes[x as usize].parent = y;
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.nodes[y as usize].right = zr;
                self.nodes[zr as usize].parent = y;
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.nodes[y as usize].left = zl;
            self.nodes[zl as usize].parent = y;
            self.nodes[y as usize].color = self.color(z);
        }

        if removed_color == Color::Black {
            self.delete_fixup(x);
        }
        self.release(z);
        self.len -= 1;
    }

    /// In-order traversal with an explicit stack (no recursion, so the
    /// auxiliary memory stays bounded by the tree height).
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(i64, &[C]),
    {
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cur = self.root;
        while cur != NIL || !stack.is_empty() {
            while cur != NIL {
                stack.push(cur);
                cur = self.left(cur);
            }
            if let Some(id) = stack.pop() {
                let node = &self.nodes[id as usize];
                f(node.key, &node.payload);
                cur = node.right;
            }
        }
    }

    /// Verify all four red-black invariants and BST order; returns the
    /// tree's black-height. Test support, not used on any hot path.
    pub fn check_invariants(&self) -> Result<usize, String> {
        if self.nodes[NIL as usize].color != Color::Black {
            return Err("sentinel is not black".to_string());
        }
        if self.color(self.root) != Color::Black {
            return Err("root is not black".to_string());
        }
        self.check_subtree(self.root, None, None)
    }

    fn check_subtree(
        &self,
        id: NodeId,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<usize, String> {
        if id == NIL {
            return Ok(0);
        }
        let node = &self.nodes[id as usize];
        if let Some(lo) = min {
            if node.key <= lo {
                return Err(format!("BST order violated at key {}", node.key));
            }
        }
        if let Some(hi) = max {
            if node.key >= hi {
                return Err(format!("BST order violated at key {}", node.key));
            }
        }
        if node.color == Color::Red
            && (self.color(node.left) == Color::Red || self.color(node.right) == Color::Red)
        {
            return Err(format!("red node {} has a red child", node.key));
        }
        let lh = self.check_subtree(node.left, min, Some(node.key))?;
        let rh = self.check_subtree(node.right, Some(node.key), max)?;
        if lh != rh {
            return Err(format!(
                "black-height mismatch at key {}: left {} vs right {}",
                node.key, lh, rh
            ));
        }
        Ok(lh + usize::from(node.color == Color::Black))
    }

    fn acquire(&mut self, key: i64, payload: Payload<C>) -> NodeId {
        let node = Node {
            key,
            color: Color::Red,
            left: NIL,
            right: NIL,
            parent: NIL,
            payload,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = node;
                id
            }
            None => {
                self.nodes.push(node);
                (self.nodes.len() - 1) as NodeId
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id as usize];
        node.left = NIL;
        node.right = NIL;
        node.parent = NIL;
        node.payload = Payload::new();
        self.free.push(id);
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while self.left(id) != NIL {
            id = self.left(id);
        }
        id
    }

    /// Replace the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let up = self.parent(u);
        if up == NIL {
            self.root = v;
        } else if self.left(up) == u {
            self.nodes[up as usize].left = v;
        } else {
            self.nodes[up as usize].right = v;
        }
        // Writing the sentinel's parent here is deliberate: delete-fixup
        // starts from v and walks upward through this link.
        self.nodes[v as usize].parent = up;
    }

    /// Left rotation around `x`; O(1) pointer surgery, no-op on the sentinel.
    fn rotate_left(&mut self, x: NodeId) {
        if x == NIL {
            return;
        }
        let y = self.right(x);
        if y == NIL {
            return;
        }
        let yl = self.left(y);
        self.nodes[x as usize].right = yl;
        if yl != NIL {
            self.nodes[yl as usize].parent = x;
        }
        let xp = self.parent(x);
        self.nodes[y as usize].parent = xp;
        if xp == NIL {
            self.root = y;
        } else if self.left(xp) == x {
            self.nodes[xp as usize].left = y;
        } else {
            self.nodes[xp as usize].right = y;
        }
        self.nodes[y as usize].left = x;
        self.nodes[x as usize].parent = y;
    }

    /// Mirror of [`RbTree::rotate_left`].
    fn rotate_right(&mut self, x: NodeId) {
        if x == NIL {
            return;
        }
        let y = self.left(x);
        if y == NIL {
            return;
        }
        let yr = self.right(y);
        self.nodes[x as usize].left = yr;
        if yr != NIL {
            self.nodes[yr as usize].parent = x;
        }
        let xp = self.parent(x);
        self.nodes[y as usize].parent = xp;
        if xp == NIL {
            self.root = y;
        } else if self.right(xp) == x {
            self.nodes[xp as usize].right = y;
        } else {
            self.nodes[xp as usize].left = y;
        }
        self.nodes[y as usize].right = x;
        self.nodes[x as usize].parent = y;
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.color(uncle) == Color::Red {
                    // Case 1: recolor and continue from the grandparent.
                    self.nodes[p as usize].color = Color::Black;
                    self.nodes[uncle as usize].color = Color::Black;
                    self.nodes[g as usize].color = Color::Red;
                    z = g;
                } else {
                    if z == self.right(p) {
                        // Case 2: straighten the zig-zag.
                        z = p;
                        self.rotate_left(z);
                    }
                    // Case 3: rotate the grandparent.
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.nodes[p as usize].color = Color::Black;
                    self.nodes[g as usize].color = Color::Red;
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.color(uncle) == Color::Red {
                    self.nodes[p as usize].color = Color::Black;
                    self.nodes[uncle as usize].color = Color::Black;
                    self.nodes[g as usize].color = Color::Red;
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.nodes[p as usize].color = Color::Black;
                    self.nodes[g as usize].color = Color::Red;
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.nodes[root as usize].color = Color::Black;
    }

    /// Resolve the double-black introduced when a black node leaves a path.
    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);
            if x == self.left(p) {
                let mut w = self.right(p);
                if self.color(w) == Color::Red {
                    // Red sibling: rotate it into the parent position.
                    self.nodes[w as usize].color = Color::Black;
                    self.nodes[p as usize].color = Color::Red;
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    // Black sibling, black nephews: push the deficit up.
                    self.nodes[w as usize].color = Color::Red;
                    x = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        // Near nephew red: rotate it outward first.
                        let wl = self.left(w);
                        self.nodes[wl as usize].color = Color::Black;
                        self.nodes[w as usize].color = Color::Red;
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    // Far nephew red: one rotation absorbs the deficit.
                    let p = self.parent(x);
                    self.nodes[w as usize].color = self.color(p);
                    self.nodes[p as usize].color = Color::Black;
                    let wr = self.right(w);
                    self.nodes[wr as usize].color = Color::Black;
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.color(w) == Color::Red {
                    self.nodes[w as usize].color = Color::Black;
                    self.nodes[p as usize].color = Color::Red;
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }
                if self.color(self.right(w)) == Color::Black
                    && self.color(self.left(w)) == Color::Black
                {
                    self.nodes[w as usize].color = Color::Red;
                    x = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        let wr = self.right(w);
                        self.nodes[wr as usize].color = Color::Black;
                        self.nodes[w as usize].color = Color::Red;
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    self.nodes[w as usize].color = self.color(p);
                    self.nodes[p as usize].color = Color::Black;
                    let wl = self.left(w);
                    self.nodes[wl as usize].color = Color::Black;
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.nodes[x as usize].color = Color::Black;
    }
}

impl<C: Clone> Default for RbTree<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn payload(v: i64) -> Payload<i64> {
        smallvec![v]
    }

    fn tree_with_keys(keys: &[i64]) -> RbTree<i64> {
        let mut tree = RbTree::new();
        for &k in keys {
            tree.insert(k, payload(k * 10));
            tree.check_invariants().expect("invariants after insert");
        }
        tree
    }

    #[test]
    fn find_on_empty_tree_returns_sentinel() {
        let tree: RbTree<i64> = RbTree::new();
        assert_eq!(tree.find(42), NIL);
        assert!(tree.is_empty());
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let tree = tree_with_keys(&(0..256).collect::<Vec<_>>());
        assert_eq!(tree.len(), 256);
        for k in 0..256 {
            let id = tree.find(k);
            assert_ne!(id, NIL);
            assert_eq!(tree.payload(id), &[k * 10]);
        }
    }

    #[test]
    fn descending_inserts_stay_balanced() {
        let tree = tree_with_keys(&(0..256).rev().collect::<Vec<_>>());
        assert_eq!(tree.len(), 256);
        assert_ne!(tree.find(255), NIL);
    }

    #[test]
    fn interleaved_inserts_stay_balanced() {
        // Deterministic scatter over a wide key range.
        let keys: Vec<i64> = (0..512).map(|i| (i * 2654435761_i64) % 100_000).collect();
        let mut unique = keys.clone();
        unique.sort_unstable();
        unique.dedup();
        let tree = tree_with_keys(&unique);
        assert_eq!(tree.len(), unique.len());
    }

    #[test]
    fn remove_preserves_invariants() {
        let keys: Vec<i64> = (0..200).collect();
        let mut tree = tree_with_keys(&keys);

        // Remove every third key, checking balance at each step.
        for k in keys.iter().step_by(3) {
            let id = tree.find(*k);
            assert_ne!(id, NIL);
            tree.remove(id);
            tree.check_invariants().expect("invariants after remove");
            assert_eq!(tree.find(*k), NIL);
        }
        assert_eq!(tree.len(), 200 - keys.iter().step_by(3).count());
    }

    #[test]
    fn remove_all_then_reinsert_reuses_slots() {
        let mut tree = tree_with_keys(&[5, 3, 8, 1, 4, 7, 9]);
        for k in [5, 3, 8, 1, 4, 7, 9] {
            tree.remove(tree.find(k));
            tree.check_invariants().expect("invariants during teardown");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root, NIL);

        let before = tree.nodes.len();
        tree.insert(2, payload(20));
        assert_eq!(tree.nodes.len(), before, "freed slot should be reused");
        assert_ne!(tree.find(2), NIL);
    }

    #[test]
    fn traversal_visits_keys_in_order() {
        let tree = tree_with_keys(&[50, 20, 80, 10, 30, 70, 90, 60]);
        let mut seen = Vec::new();
        tree.for_each(|key, components| {
            assert_eq!(components, &[key * 10]);
            seen.push(key);
        });
        assert_eq!(seen, vec![10, 20, 30, 50, 60, 70, 80, 90]);
    }

    #[test]
    fn two_children_delete_splices_successor() {
        let mut tree = tree_with_keys(&[40, 20, 60, 10, 30, 50, 70]);
        tree.remove(tree.find(40));
        tree.check_invariants().expect("invariants after root delete");

        let mut seen = Vec::new();
        tree.for_each(|key, _| seen.push(key));
        assert_eq!(seen, vec![10, 20, 30, 50, 60, 70]);
    }

    #[test]
    fn checker_reports_black_height() {
        let tree = tree_with_keys(&(0..63).collect::<Vec<_>>());
        let height = tree.check_invariants().expect("balanced tree");
        assert!(height >= 2, "63 nodes need black-height >= 2, got {height}");
    }
}
