//! Stable function identities.
//!
//! [`FunctionHash`] is computed from a function's internal name with XXHash64,
//! so the same catalog entry hashes identically across runs and processes.
//! Variant hashes mix in the parameter types, position by position.
//!
//! ```
//! use mathscribe_core::{FunctionHash, ValueType};
//!
//! let sin = FunctionHash::from_name("sin");
//! assert_eq!(sin, FunctionHash::from_name("sin"));
//!
//! let real = FunctionHash::from_variant("sin", &[ValueType::Real]);
//! let complex = FunctionHash::from_variant("sin", &[ValueType::Complex]);
//! assert_ne!(real, complex);
//! ```

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use crate::ValueType;

/// Domain mixing constants.
mod mix {
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
    pub const PARAM: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit function identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FunctionHash(pub u64);

impl FunctionHash {
    /// Empty/invalid hash.
    pub const EMPTY: FunctionHash = FunctionHash(0);

    /// Hash of a function's internal name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        FunctionHash(mix::FUNCTION ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of one call signature of a function. Parameter order matters.
    pub fn from_variant(name: &str, parameters: &[ValueType]) -> Self {
        let mut hash = Self::from_name(name).0;
        for (i, param) in parameters.iter().enumerate() {
            let marker = mix::PARAM.wrapping_add(i as u64);
            hash = hash
                .wrapping_mul(mix::SEP)
                .wrapping_add(marker ^ u64::from(u8::from(*param)));
        }
        FunctionHash(hash)
    }

    /// Check if this is the empty hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The raw value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FunctionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionHash({:#018x})", self.0)
    }
}

impl fmt::Display for FunctionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(FunctionHash::from_name("gcd"), FunctionHash::from_name("gcd"));
        assert_ne!(FunctionHash::from_name("gcd"), FunctionHash::from_name("lcm"));
        assert!(!FunctionHash::from_name("gcd").is_empty());
    }

    #[test]
    fn parameter_order_matters() {
        let a = FunctionHash::from_variant("log", &[ValueType::Integer, ValueType::Real]);
        let b = FunctionHash::from_variant("log", &[ValueType::Real, ValueType::Integer]);
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_hex() {
        let shown = FunctionHash(0xff).to_string();
        assert_eq!(shown, "0x00000000000000ff");
    }
}
