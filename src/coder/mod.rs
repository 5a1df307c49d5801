//! Coder contract and elementary kinds
//!
//! A coder moves one structured member value into and out of a flat buffer
//! of a single elementary component kind. The store never interprets the
//! components themselves; it only compares them component-wise against a
//! zero template when deciding whether an entry can be elided.

mod members;

pub use members::{BitFlags, FixedText};

use std::fmt;

use crate::store::IndexedStore;
use crate::StoreError;

/// Elementary component kinds a coder can operate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 64-bit float components.
    F64,
    /// 32-bit float components.
    F32,
    /// 64-bit integer components.
    I64,
    /// 32-bit integer components.
    I32,
    /// 16-bit integer components.
    I16,
    /// 8-bit integer components (the common byte-level fallback).
    I8,
    /// Boolean components.
    Bool,
    /// Character components.
    Char,
    /// Arbitrary-precision integer components.
    BigInt,
    /// Arbitrary-precision decimal components.
    BigDecimal,
    /// Text stored as per-character components.
    Text,
    /// Packed sub-byte bit-fields stored as byte components.
    Bits,
}

/// Component type of one elementary kind.
///
/// `Default::default()` is the kind's zero component; zero-elision compares
/// freshly encoded buffers against a template of defaults, never through a
/// numeric shortcut.
pub trait Component: Clone + PartialEq + Default + fmt::Debug + Send + Sync + 'static {}

impl Component for f64 {}
impl Component for f32 {}
impl Component for i64 {}
impl Component for i32 {}
impl Component for i16 {}
impl Component for i8 {}
impl Component for bool {}
impl Component for char {}
impl Component for u8 {}
impl Component for num_bigint::BigInt {}
impl Component for bigdecimal::BigDecimal {}

/// Moves a member value into and out of a flat component buffer.
///
/// Buffers handed to `encode`/`decode` are always exactly
/// [`component_count`](Coder::component_count) long; the store slices the
/// node payload before calling in.
pub trait Coder<C: Component> {
    /// Number of components one value of this type occupies.
    fn component_count(&self) -> usize;

    /// Write this value's components into `buf`.
    fn encode(&self, buf: &mut [C]);

    /// Rebuild this value from the components in `buf`.
    fn decode(&mut self, buf: &[C]);
}

/// Capability descriptor consumed by the allocation dispatcher.
///
/// A type lists the elementary kinds it can encode through and knows how to
/// construct the store specialization for each of them. The dispatcher picks
/// which kind to use; see [`crate::dispatch::KIND_PRIORITY`].
pub trait Codable: Clone + 'static {
    /// Elementary kinds this type declares, in no particular order.
    const CAPABILITIES: &'static [ElementKind];

    /// Construct the store specialization matching `kind`.
    ///
    /// Implementations cover exactly the kinds in
    /// [`CAPABILITIES`](Codable::CAPABILITIES) and answer
    /// [`StoreError::UnsupportedType`] for anything else.
    fn new_store(
        &self,
        kind: ElementKind,
        length: i64,
    ) -> Result<Box<dyn IndexedStore<Self>>, StoreError>;
}
