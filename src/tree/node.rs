//! Arena-backed tree nodes
//!
//! Nodes are addressed by plain indices into the tree's arena. Slot 0 is
//! reserved for the shared sentinel, so every structural link is always a
//! valid index and the balancing code needs no null checks.

use smallvec::SmallVec;

/// Index of a node inside the tree arena.
pub type NodeId = u32;

/// Arena slot of the shared sentinel ("nil") node.
pub const NIL: NodeId = 0;

/// Inline payload capacity; single-component members dominate in practice.
pub const PAYLOAD_INLINE: usize = 2;

/// Fixed-length component buffer owned by a node.
pub type Payload<C> = SmallVec<[C; PAYLOAD_INLINE]>;

/// Node color for red-black balancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node; may not have a red child.
    Red,
    /// Black node; counted in black-heights.
    Black,
}

/// Tree node: one 64-bit key plus one fixed-width payload slot.
#[derive(Debug, Clone)]
pub struct Node<C> {
    /// Logical index stored in this node, unique across the tree.
    pub key: i64,
    pub(crate) color: Color,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) parent: NodeId,
    /// Encoded components; length equals the member type's component count.
    pub payload: Payload<C>,
}

impl<C> Node<C> {
    /// The shared sentinel: black, self-linked through slot 0, no payload.
    pub(crate) fn sentinel() -> Self {
        Self {
            key: 0,
            color: Color::Black,
            left: NIL,
            right: NIL,
            parent: NIL,
            payload: Payload::new(),
        }
    }
}
