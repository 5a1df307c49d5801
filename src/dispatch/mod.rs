//! Allocation dispatcher
//!
//! Inspects which coder capabilities a member type declares and instantiates
//! the matching sparse store specialization. Selection happens once, at
//! construction time; all later get/set traffic flows through the chosen
//! store.

use tracing::debug;

use crate::coder::{Codable, ElementKind};
use crate::store::IndexedStore;
use crate::StoreError;

/// Probe order for capability selection.
///
/// Many member types fall back to byte-level encoding, so `I8` sits last:
/// probing it earlier would mask every more specific capability. `Text` and
/// `Bits` sit just above it for the same reason, being catch-all encodings
/// next to the dedicated scalar kinds.
pub const KIND_PRIORITY: [ElementKind; 12] = [
    ElementKind::F64,
    ElementKind::F32,
    ElementKind::I64,
    ElementKind::I32,
    ElementKind::I16,
    ElementKind::Bool,
    ElementKind::BigInt,
    ElementKind::BigDecimal,
    ElementKind::Char,
    ElementKind::Text,
    ElementKind::Bits,
    ElementKind::I8,
];

/// Allocate a store of `size` logical slots for `sample`'s type.
///
/// Fails with [`StoreError::InvalidSize`] for a negative `size` and with
/// [`StoreError::UnsupportedType`] when the type declares no recognized
/// capability.
pub fn allocate<V: Codable>(
    sample: &V,
    size: i64,
) -> Result<Box<dyn IndexedStore<V>>, StoreError> {
    if size < 0 {
        return Err(StoreError::InvalidSize(size));
    }
    for kind in KIND_PRIORITY {
        if V::CAPABILITIES.contains(&kind) {
            debug!(
                ?kind,
                size,
                member = std::any::type_name::<V>(),
                "allocating sparse store"
            );
            return sample.new_store(kind, size);
        }
    }
    Err(StoreError::UnsupportedType(std::any::type_name::<V>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::Coder;
    use crate::store::SparseStore;

    #[test]
    fn scalar_types_allocate_their_own_kind() {
        let store = allocate(&0.0_f64, 10).expect("f64 store");
        store.set(3, &5.0).expect("write");
        let mut out = 0.0;
        store.get(3, &mut out).expect("read");
        assert_eq!(out, 5.0);
    }

    #[test]
    fn negative_size_fails_before_capability_probing() {
        let err = allocate(&0_i32, -1).unwrap_err();
        assert_eq!(err, StoreError::InvalidSize(-1));
    }

    /// Declares both a byte-level fallback and a dedicated i32 encoding;
    /// the dispatcher must pick i32.
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Sample(i32);

    impl Coder<i32> for Sample {
        fn component_count(&self) -> usize {
            1
        }

        fn encode(&self, buf: &mut [i32]) {
            buf[0] = self.0;
        }

        fn decode(&mut self, buf: &[i32]) {
            self.0 = buf[0];
        }
    }

    impl Codable for Sample {
        const CAPABILITIES: &'static [ElementKind] = &[ElementKind::I8, ElementKind::I32];

        fn new_store(
            &self,
            kind: ElementKind,
            length: i64,
        ) -> Result<Box<dyn IndexedStore<Self>>, StoreError> {
            match kind {
                ElementKind::I32 => Ok(Box::new(SparseStore::<Self, i32>::new(
                    self.clone(),
                    length,
                )?)),
                // Choosing the byte fallback over the dedicated i32 encoding
                // is a dispatcher bug; fail the allocation so tests see it.
                _ => Err(StoreError::UnsupportedType(std::any::type_name::<Self>())),
            }
        }
    }

    #[test]
    fn byte_fallback_never_masks_a_specific_capability() {
        // Sample declares I8 first in its capability list, but the
        // dispatcher probes by kind priority, and only the I32 arm of
        // new_store succeeds.
        let store = allocate(&Sample::default(), 5).expect("sample store");
        store.set(1, &Sample(-7)).expect("write");
        let mut out = Sample::default();
        store.get(1, &mut out).expect("read");
        assert_eq!(out, Sample(-7));
    }

    #[derive(Debug, Clone, Default)]
    struct Opaque;

    impl Codable for Opaque {
        const CAPABILITIES: &'static [ElementKind] = &[];

        fn new_store(
            &self,
            _kind: ElementKind,
            _length: i64,
        ) -> Result<Box<dyn IndexedStore<Self>>, StoreError> {
            Err(StoreError::UnsupportedType(std::any::type_name::<Self>()))
        }
    }

    #[test]
    fn capability_free_types_are_unsupported() {
        let err = allocate(&Opaque, 10).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedType(_)));
    }
}
