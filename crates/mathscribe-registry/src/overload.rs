//! Best-fit variant selection.
//!
//! ## Algorithm
//!
//! 1. Filter variants by argument count (variadic variants take any count
//!    at or above their declared parameters)
//! 2. Price each argument against its formal; an argument with no admissible
//!    conversion rejects the variant
//! 3. Reject variants whose return type lacks the required capabilities
//! 4. Pick the lowest total cost; ties go to the variant registered first
//!
//! ## Costs
//!
//! | Match                              | Cost                        |
//! |------------------------------------|-----------------------------|
//! | identical types                    | [`COST_EXACT`]              |
//! | lossless upcast along the chain    | [`COST_UPCAST_STEP`] / step |
//! | formal is `Variant`                | [`COST_VARIANT_PARAMETER`]  |
//! | actual is `Variant`, formal is not | [`COST_DYNAMIC`]            |

use mathscribe_core::{FunctionHash, ResolveError, TypeProperties, ValueType};

use crate::TypeRegistry;
use crate::catalog::{FunctionData, FunctionVariant};

pub const COST_EXACT: u32 = 0;
pub const COST_UPCAST_STEP: u32 = 1;
pub const COST_VARIANT_PARAMETER: u32 = 8;
pub const COST_DYNAMIC: u32 = 16;

/// How one argument reaches its formal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgConversion {
    /// Same type.
    Exact,
    /// Lossless promotion by `steps` along the scalar chain.
    Upcast { steps: u32 },
    /// The formal accepts any value.
    ToVariant,
    /// The argument is a run-time typed value; it is converted with a check.
    Dynamic { to: ValueType },
}

impl ArgConversion {
    /// Price an argument of type `actual` against a formal of type `formal`.
    ///
    /// Returns `None` if the argument is not admissible.
    pub fn find(actual: ValueType, formal: ValueType) -> Option<ArgConversion> {
        if actual == ValueType::None || formal == ValueType::None {
            return None;
        }
        if actual == formal {
            return Some(ArgConversion::Exact);
        }
        if formal == ValueType::Variant {
            return Some(ArgConversion::ToVariant);
        }
        if actual == ValueType::Variant {
            return Some(ArgConversion::Dynamic { to: formal });
        }
        ValueType::upcast_distance(actual, formal).map(|steps| ArgConversion::Upcast { steps })
    }

    pub fn cost(self) -> u32 {
        match self {
            ArgConversion::Exact => COST_EXACT,
            ArgConversion::Upcast { steps } => steps * COST_UPCAST_STEP,
            ArgConversion::ToVariant => COST_VARIANT_PARAMETER,
            ArgConversion::Dynamic { .. } => COST_DYNAMIC,
        }
    }

    /// Check if emission must wrap the argument in a checked conversion.
    pub fn needs_runtime_check(self) -> bool {
        matches!(self, ArgConversion::Dynamic { .. })
    }
}

/// The outcome of resolving a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Identity of the function.
    pub function: FunctionHash,
    /// Internal name, as emitted.
    pub internal_name: String,
    /// Index of the selected variant.
    pub variant: usize,
    /// Identity of the selected variant.
    pub variant_hash: FunctionHash,
    pub return_type: ValueType,
    /// One entry per argument.
    pub conversions: Vec<ArgConversion>,
    pub total_cost: u32,
}

impl ResolvedCall {
    /// Check if any argument needs a run-time checked conversion.
    pub fn has_dynamic_arguments(&self) -> bool {
        self.conversions.iter().any(|c| c.needs_runtime_check())
    }
}

/// Resolve the best-fit variant of `function` for `arguments`.
pub fn resolve(
    function: &FunctionData,
    required: TypeProperties,
    arguments: &[ValueType],
    types: &TypeRegistry,
) -> Result<ResolvedCall, ResolveError> {
    let best = function
        .variants
        .iter()
        .enumerate()
        .filter(|(_, variant)| returns_capabilities(variant, required, types))
        .filter_map(|(index, variant)| {
            let conversions = match_arguments(variant, arguments)?;
            let total_cost = conversions
                .iter()
                .fold(0u32, |acc, c| acc.saturating_add(c.cost()));
            tracing::trace!(
                function = %function.internal_name,
                variant = index,
                cost = total_cost,
                "admissible variant"
            );
            Some((index, conversions, total_cost))
        })
        .min_by_key(|(index, _, cost)| (*cost, *index));

    let Some((index, conversions, total_cost)) = best else {
        return Err(ResolveError::NoMatchingVariant {
            name: function.user_visible_name.to_string(),
            arguments: arguments.to_vec(),
        });
    };

    let variant = &function.variants[index];
    Ok(ResolvedCall {
        function: function.hash(),
        internal_name: function.internal_name.clone(),
        variant: index,
        variant_hash: FunctionHash::from_variant(
            &function.internal_name,
            &variant.parameter_types(),
        ),
        return_type: variant.return_type,
        conversions,
        total_cost,
    })
}

fn returns_capabilities(
    variant: &FunctionVariant,
    required: TypeProperties,
    types: &TypeRegistry,
) -> bool {
    let provided = types.properties(variant.return_type);
    provided.contains(required) || provided.contains(TypeProperties::VARIANT)
}

/// Price every argument; `None` if the count or any type does not fit.
fn match_arguments(variant: &FunctionVariant, arguments: &[ValueType]) -> Option<Vec<ArgConversion>> {
    if !variant.accepts_count(arguments.len()) {
        return None;
    }
    let rest = variant
        .parameters
        .last()
        .map_or(ValueType::Variant, |p| p.value_type);

    arguments
        .iter()
        .enumerate()
        .map(|(i, &actual)| {
            let formal = variant.parameters.get(i).map_or(rest, |p| p.value_type);
            ArgConversion::find(actual, formal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FunctionCatalog;

    fn catalog_with(function: FunctionData) -> FunctionCatalog {
        let mut catalog = FunctionCatalog::new();
        catalog.register(function).unwrap();
        catalog
    }

    fn resolve_in(
        catalog: &FunctionCatalog,
        name: &str,
        arguments: &[ValueType],
    ) -> Result<ResolvedCall, ResolveError> {
        let types = TypeRegistry::with_defaults();
        catalog.resolve(&name.into(), TypeProperties::empty(), arguments, &types)
    }

    #[test]
    fn exact_match_beats_upcast() {
        let f = FunctionData::builtin("f", "f", "test", "")
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "x")]))
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Integer, "x")]));
        let catalog = catalog_with(f);

        let call = resolve_in(&catalog, "f", &[ValueType::Integer]).unwrap();
        assert_eq!(call.variant, 1);
        assert_eq!(call.total_cost, COST_EXACT);

        let call = resolve_in(&catalog, "f", &[ValueType::Boolean]).unwrap();
        assert_eq!(call.variant, 1);
        assert_eq!(call.conversions, vec![ArgConversion::Upcast { steps: 1 }]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let f = FunctionData::builtin("g", "g", "test", "")
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "x")]))
            .variant(FunctionVariant::new(ValueType::Complex, [(ValueType::Complex, "x")]));
        let catalog = catalog_with(f);

        let first = resolve_in(&catalog, "g", &[ValueType::Integer]).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve_in(&catalog, "g", &[ValueType::Integer]).unwrap(), first);
        }
        assert_eq!(first.variant, 0);
    }

    #[test]
    fn ties_go_to_first_registered() {
        let f = FunctionData::builtin("h", "h", "test", "")
            .variant(FunctionVariant::new(ValueType::Integer, [(ValueType::Variant, "x")]))
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Variant, "x")]));
        let catalog = catalog_with(f);

        let call = resolve_in(&catalog, "h", &[ValueType::Set]).unwrap();
        assert_eq!(call.variant, 0);
        assert_eq!(call.total_cost, COST_VARIANT_PARAMETER);
    }

    #[test]
    fn no_matching_variant() {
        let f = FunctionData::builtin("gcd", "gcd", "test", "").variant(FunctionVariant::new(
            ValueType::Integer,
            [(ValueType::Integer, "a"), (ValueType::Integer, "b")],
        ));
        let catalog = catalog_with(f);

        let err = resolve_in(&catalog, "gcd", &[ValueType::Real, ValueType::Integer]).unwrap_err();
        assert_eq!(err.code(), mathscribe_core::ErrorCode::NoMatchingVariant);

        let err = resolve_in(&catalog, "gcd", &[ValueType::Integer]).unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingVariant { .. }));
    }

    #[test]
    fn variadic_extras_match_last_parameter() {
        let max = FunctionData::builtin("max", "max", "test", "")
            .variant(FunctionVariant::new(ValueType::Integer, [(ValueType::Integer, "a")]).variadic())
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "a")]).variadic());
        let catalog = catalog_with(max);

        let ints = [ValueType::Integer, ValueType::Integer, ValueType::Boolean];
        let call = resolve_in(&catalog, "max", &ints).unwrap();
        assert_eq!(call.return_type, ValueType::Integer);
        assert_eq!(call.conversions.len(), 3);

        let mixed = [ValueType::Integer, ValueType::Real];
        assert_eq!(resolve_in(&catalog, "max", &mixed).unwrap().return_type, ValueType::Real);
    }

    #[test]
    fn variant_argument_needs_runtime_check() {
        let f = FunctionData::builtin("floor", "floor", "test", "")
            .variant(FunctionVariant::new(ValueType::Integer, [(ValueType::Real, "x")]));
        let catalog = catalog_with(f);

        let call = resolve_in(&catalog, "floor", &[ValueType::Variant]).unwrap();
        assert!(call.has_dynamic_arguments());
        assert_eq!(call.total_cost, COST_DYNAMIC);
    }

    #[test]
    fn required_capabilities_filter_return_type() {
        let f = FunctionData::builtin("pick", "pick", "test", "")
            .variant(FunctionVariant::new(ValueType::Integer, [(ValueType::Set, "s")]))
            .variant(FunctionVariant::new(ValueType::Set, [(ValueType::Set, "s")]));
        let catalog = catalog_with(f);
        let types = TypeRegistry::with_defaults();

        let call = catalog
            .resolve(&"pick".into(), TypeProperties::CONTAINER, &[ValueType::Set], &types)
            .unwrap();
        assert_eq!(call.return_type, ValueType::Set);
    }

    #[test]
    fn none_argument_is_never_admissible() {
        assert_eq!(ArgConversion::find(ValueType::None, ValueType::Variant), None);
        assert_eq!(
            ArgConversion::find(ValueType::Real, ValueType::Integer),
            None
        );
    }
}
