//! Reference member implementations
//!
//! Primitive scalars encode as single components of their own kind;
//! [`FixedText`] and [`BitFlags`] exercise the multi-component and
//! sub-byte-packing paths.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::{Codable, Coder, ElementKind};
use crate::store::{IndexedStore, SparseStore};
use crate::StoreError;

macro_rules! scalar_member {
    ($ty:ty, $kind:ident) => {
        impl Coder<$ty> for $ty {
            fn component_count(&self) -> usize {
                1
            }

            fn encode(&self, buf: &mut [$ty]) {
                buf[0] = self.clone();
            }

            fn decode(&mut self, buf: &[$ty]) {
                *self = buf[0].clone();
            }
        }

        impl Codable for $ty {
            const CAPABILITIES: &'static [ElementKind] = &[ElementKind::$kind];

            fn new_store(
                &self,
                kind: ElementKind,
                length: i64,
            ) -> Result<Box<dyn IndexedStore<Self>>, StoreError> {
                match kind {
                    ElementKind::$kind => {
                        Ok(Box::new(SparseStore::<$ty, $ty>::new(self.clone(), length)?))
                    }
                    _ => Err(StoreError::UnsupportedType(std::any::type_name::<Self>())),
                }
            }
        }
    };
}

scalar_member!(f64, F64);
scalar_member!(f32, F32);
scalar_member!(i64, I64);
scalar_member!(i32, I32);
scalar_member!(i16, I16);
scalar_member!(i8, I8);
scalar_member!(bool, Bool);
scalar_member!(char, Char);
scalar_member!(BigInt, BigInt);
scalar_member!(BigDecimal, BigDecimal);

/// Fixed-width text member: exactly `N` characters, NUL-padded.
///
/// The zero value is all NULs, so an empty label elides its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedText<const N: usize>([char; N]);

impl<const N: usize> FixedText<N> {
    /// Build from a string, truncating or NUL-padding to `N` characters.
    pub fn new(text: &str) -> Self {
        let mut chars = ['\0'; N];
        for (slot, ch) in chars.iter_mut().zip(text.chars()) {
            *slot = ch;
        }
        Self(chars)
    }

    /// The stored text with trailing padding stripped.
    pub fn as_string(&self) -> String {
        self.0.iter().take_while(|&&c| c != '\0').collect()
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self(['\0'; N])
    }
}

impl<const N: usize> Coder<char> for FixedText<N> {
    fn component_count(&self) -> usize {
        N
    }

    fn encode(&self, buf: &mut [char]) {
        buf.copy_from_slice(&self.0);
    }

    fn decode(&mut self, buf: &[char]) {
        self.0.copy_from_slice(buf);
    }
}

impl<const N: usize> Codable for FixedText<N> {
    const CAPABILITIES: &'static [ElementKind] = &[ElementKind::Text];

    fn new_store(
        &self,
        kind: ElementKind,
        length: i64,
    ) -> Result<Box<dyn IndexedStore<Self>>, StoreError> {
        match kind {
            ElementKind::Text => Ok(Box::new(SparseStore::<Self, char>::new(
                self.clone(),
                length,
            )?)),
            _ => Err(StoreError::UnsupportedType(std::any::type_name::<Self>())),
        }
    }
}

/// `N` boolean flags packed into ⌈N/8⌉ byte components, LSB first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFlags<const N: usize>([bool; N]);

impl<const N: usize> BitFlags<N> {
    /// Wrap an explicit flag array.
    pub fn new(flags: [bool; N]) -> Self {
        Self(flags)
    }

    /// Read one flag.
    pub fn flag(&self, index: usize) -> bool {
        self.0[index]
    }

    /// Write one flag.
    pub fn set_flag(&mut self, index: usize, on: bool) {
        self.0[index] = on;
    }
}

impl<const N: usize> Default for BitFlags<N> {
    fn default() -> Self {
        Self([false; N])
    }
}

impl<const N: usize> Coder<u8> for BitFlags<N> {
    fn component_count(&self) -> usize {
        (N + 7) / 8
    }

    fn encode(&self, buf: &mut [u8]) {
        buf.fill(0);
        for (i, &flag) in self.0.iter().enumerate() {
            if flag {
                buf[i / 8] |= 1 << (i % 8);
            }
        }
    }

    fn decode(&mut self, buf: &[u8]) {
        for (i, flag) in self.0.iter_mut().enumerate() {
            *flag = buf[i / 8] & (1 << (i % 8)) != 0;
        }
    }
}

impl<const N: usize> Codable for BitFlags<N> {
    const CAPABILITIES: &'static [ElementKind] = &[ElementKind::Bits];

    fn new_store(
        &self,
        kind: ElementKind,
        length: i64,
    ) -> Result<Box<dyn IndexedStore<Self>>, StoreError> {
        match kind {
            ElementKind::Bits => Ok(Box::new(SparseStore::<Self, u8>::new(
                self.clone(),
                length,
            )?)),
            _ => Err(StoreError::UnsupportedType(std::any::type_name::<Self>())),
        }
    }
}
