//! Value types and the upcast lattice.
//!
//! [`ValueType`] is the closed set of types a named quantity or expression can
//! carry. Scalars form the total preorder `Boolean < Integer < Real < Complex`;
//! matrices follow the same order on their element type. `Set` and `Tuple`
//! never mix with anything but themselves, and `Variant` absorbs everything.
//!
//! # Example
//!
//! ```
//! use mathscribe_core::ValueType;
//!
//! assert_eq!(ValueType::best_upcast([ValueType::Integer, ValueType::Real]), ValueType::Real);
//! assert_eq!(
//!     ValueType::best_upcast([ValueType::MatrixReal, ValueType::Real]),
//!     ValueType::None
//! );
//! ```

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The type of a value.
///
/// `None` means undetermined or invalid; `Variant` means decided at run time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum ValueType {
    None = 0,
    Variant = 1,
    Boolean = 2,
    Integer = 3,
    Real = 4,
    Complex = 5,
    Set = 6,
    Tuple = 7,
    MatrixBoolean = 8,
    MatrixInteger = 9,
    MatrixReal = 10,
    MatrixComplex = 11,
}

/// Whether a value of one type can be converted to another at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicConversion {
    /// The conversion can never succeed.
    Never,
    /// The conversion depends on the run-time value and needs a check.
    Sometimes,
    /// The conversion always succeeds without a check.
    Always,
}

impl ValueType {
    /// Every value type, in tag order.
    pub const ALL: [ValueType; 12] = [
        ValueType::None,
        ValueType::Variant,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Real,
        ValueType::Complex,
        ValueType::Set,
        ValueType::Tuple,
        ValueType::MatrixBoolean,
        ValueType::MatrixInteger,
        ValueType::MatrixReal,
        ValueType::MatrixComplex,
    ];

    /// The scalar chain, lowest first.
    pub const SCALARS: [ValueType; 4] = [
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Real,
        ValueType::Complex,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Variant => "variant",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Real => "real",
            ValueType::Complex => "complex",
            ValueType::Set => "set",
            ValueType::Tuple => "tuple",
            ValueType::MatrixBoolean => "boolean matrix",
            ValueType::MatrixInteger => "integer matrix",
            ValueType::MatrixReal => "real matrix",
            ValueType::MatrixComplex => "complex matrix",
        }
    }

    /// Check if this is one of the four scalar types.
    #[inline]
    pub fn is_scalar(self) -> bool {
        self.scalar_rank().is_some()
    }

    /// Check if this is a matrix type.
    #[inline]
    pub fn is_matrix(self) -> bool {
        matches!(
            self,
            ValueType::MatrixBoolean
                | ValueType::MatrixInteger
                | ValueType::MatrixReal
                | ValueType::MatrixComplex
        )
    }

    /// Check if this is a `Set` or `Tuple`.
    #[inline]
    pub fn is_collection(self) -> bool {
        matches!(self, ValueType::Set | ValueType::Tuple)
    }

    /// Check if this type is concrete, i.e. neither `None` nor `Variant`.
    #[inline]
    pub fn is_concrete(self) -> bool {
        !matches!(self, ValueType::None | ValueType::Variant)
    }

    /// Position on the scalar chain, `None` for non-scalars.
    pub fn scalar_rank(self) -> Option<u32> {
        match self {
            ValueType::Boolean => Some(0),
            ValueType::Integer => Some(1),
            ValueType::Real => Some(2),
            ValueType::Complex => Some(3),
            _ => None,
        }
    }

    fn from_scalar_rank(rank: u32) -> ValueType {
        match rank {
            0 => ValueType::Boolean,
            1 => ValueType::Integer,
            2 => ValueType::Real,
            _ => ValueType::Complex,
        }
    }

    /// The element type of a matrix type.
    pub fn element_type(self) -> Option<ValueType> {
        match self {
            ValueType::MatrixBoolean => Some(ValueType::Boolean),
            ValueType::MatrixInteger => Some(ValueType::Integer),
            ValueType::MatrixReal => Some(ValueType::Real),
            ValueType::MatrixComplex => Some(ValueType::Complex),
            _ => None,
        }
    }

    /// The matrix type whose elements are `scalar`.
    pub fn matrix_of(scalar: ValueType) -> Option<ValueType> {
        match scalar {
            ValueType::Boolean => Some(ValueType::MatrixBoolean),
            ValueType::Integer => Some(ValueType::MatrixInteger),
            ValueType::Real => Some(ValueType::MatrixReal),
            ValueType::Complex => Some(ValueType::MatrixComplex),
            _ => None,
        }
    }

    /// The smallest type every input can be losslessly promoted to.
    ///
    /// Returns `None` for an empty input, if any input is `None`, or if the
    /// inputs are mutually incompatible. Any `Variant` input (and no `None`)
    /// yields `Variant`. The result does not depend on input order.
    pub fn best_upcast<I>(types: I) -> ValueType
    where
        I: IntoIterator<Item = ValueType>,
    {
        let mut saw_variant = false;
        let mut acc: Option<ValueType> = None;
        let mut incompatible = false;
        let mut any = false;

        for ty in types {
            any = true;
            match ty {
                ValueType::None => return ValueType::None,
                ValueType::Variant => saw_variant = true,
                _ if incompatible => {}
                _ => {
                    acc = match acc {
                        None => Some(ty),
                        Some(current) => match Self::upcast_concrete(current, ty) {
                            Some(joined) => Some(joined),
                            None => {
                                incompatible = true;
                                None
                            }
                        },
                    };
                }
            }
        }

        if !any {
            return ValueType::None;
        }
        if saw_variant {
            return ValueType::Variant;
        }
        if incompatible {
            return ValueType::None;
        }
        acc.unwrap_or(ValueType::None)
    }

    /// Join two concrete types, `None` if they do not mix.
    fn upcast_concrete(a: ValueType, b: ValueType) -> Option<ValueType> {
        if a == b {
            return Some(a);
        }
        match (a.scalar_rank(), b.scalar_rank()) {
            (Some(ra), Some(rb)) => return Some(Self::from_scalar_rank(ra.max(rb))),
            (Some(_), None) | (None, Some(_)) => return None,
            (None, None) => {}
        }
        let ea = a.element_type()?;
        let eb = b.element_type()?;
        Self::upcast_concrete(ea, eb).and_then(Self::matrix_of)
    }

    /// Number of chain steps needed to promote `from` to `to` losslessly.
    ///
    /// `Some(0)` for identical types, `None` if `to` is not reachable.
    /// `Variant` is not handled here; callers price it separately.
    pub fn upcast_distance(from: ValueType, to: ValueType) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        if let (Some(rf), Some(rt)) = (from.scalar_rank(), to.scalar_rank()) {
            return (rt >= rf).then(|| rt - rf);
        }
        let ef = from.element_type()?;
        let et = to.element_type()?;
        Self::upcast_distance(ef, et)
    }

    /// Decide whether a run-time check is needed to move a value across a
    /// boundary typed `to`.
    pub fn can_dynamically_convert(from: ValueType, to: ValueType) -> DynamicConversion {
        if from == ValueType::None || to == ValueType::None {
            return DynamicConversion::Never;
        }
        if from == to || to == ValueType::Variant {
            return DynamicConversion::Always;
        }
        if from == ValueType::Variant {
            return DynamicConversion::Sometimes;
        }
        if Self::upcast_distance(from, to).is_some() {
            return DynamicConversion::Always;
        }
        let both_scalar = from.is_scalar() && to.is_scalar();
        let both_matrix = from.is_matrix() && to.is_matrix();
        if both_scalar || both_matrix {
            DynamicConversion::Sometimes
        } else {
            DynamicConversion::Never
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueType::*;

    #[test]
    fn scalar_upcast_is_max() {
        for a in ValueType::SCALARS {
            for b in ValueType::SCALARS {
                let expected = if a.scalar_rank() >= b.scalar_rank() { a } else { b };
                assert_eq!(ValueType::best_upcast([a, b]), expected);
                assert_eq!(ValueType::best_upcast([b, a]), expected);
            }
        }
    }

    #[test]
    fn scalar_upcast_is_associative() {
        for a in ValueType::SCALARS {
            for b in ValueType::SCALARS {
                for c in ValueType::SCALARS {
                    let left = ValueType::best_upcast([ValueType::best_upcast([a, b]), c]);
                    let right = ValueType::best_upcast([a, ValueType::best_upcast([b, c])]);
                    assert_eq!(left, right);
                    assert_eq!(left, ValueType::best_upcast([a, b, c]));
                }
            }
        }
    }

    #[test]
    fn matrix_never_mixes_with_scalar() {
        for m in [MatrixBoolean, MatrixInteger, MatrixReal, MatrixComplex] {
            for s in ValueType::SCALARS {
                assert_eq!(ValueType::best_upcast([m, s]), None);
                assert_eq!(ValueType::best_upcast([s, m]), None);
            }
        }
    }

    #[test]
    fn matrices_upcast_on_element_type() {
        assert_eq!(
            ValueType::best_upcast([MatrixInteger, MatrixReal]),
            MatrixReal
        );
        assert_eq!(
            ValueType::best_upcast([MatrixComplex, MatrixBoolean]),
            MatrixComplex
        );
    }

    #[test]
    fn collections_only_join_themselves() {
        assert_eq!(ValueType::best_upcast([Set, Set]), Set);
        assert_eq!(ValueType::best_upcast([Set, Tuple]), None);
        assert_eq!(ValueType::best_upcast([Tuple, Integer]), None);
    }

    #[test]
    fn variant_absorbs() {
        assert_eq!(ValueType::best_upcast([Variant, Integer]), Variant);
        assert_eq!(ValueType::best_upcast([Set, Variant]), Variant);
        assert_eq!(ValueType::best_upcast([Variant, ValueType::None]), None);
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(ValueType::best_upcast(std::iter::empty()), None);
    }

    #[test]
    fn upcast_distance_counts_steps() {
        assert_eq!(ValueType::upcast_distance(Boolean, Complex), Some(3));
        assert_eq!(ValueType::upcast_distance(Integer, Real), Some(1));
        assert_eq!(ValueType::upcast_distance(Real, Integer), Option::None);
        assert_eq!(ValueType::upcast_distance(MatrixInteger, MatrixReal), Some(1));
        assert_eq!(ValueType::upcast_distance(Integer, MatrixReal), Option::None);
    }

    #[test]
    fn dynamic_conversion_table() {
        use DynamicConversion::*;
        assert_eq!(ValueType::can_dynamically_convert(Integer, Real), Always);
        assert_eq!(ValueType::can_dynamically_convert(Real, Integer), Sometimes);
        assert_eq!(ValueType::can_dynamically_convert(Variant, Real), Sometimes);
        assert_eq!(ValueType::can_dynamically_convert(Set, Variant), Always);
        assert_eq!(ValueType::can_dynamically_convert(Real, MatrixReal), Never);
        assert_eq!(ValueType::can_dynamically_convert(Tuple, Set), Never);
        assert_eq!(ValueType::can_dynamically_convert(ValueType::None, Real), Never);
    }

    #[test]
    fn tag_round_trips_through_u8() {
        let raw: u8 = MatrixReal.into();
        assert_eq!(ValueType::try_from(raw).ok(), Some(MatrixReal));
        assert!(ValueType::try_from(200u8).is_err());
    }
}
