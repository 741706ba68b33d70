//! FunctionCatalog - callable built-ins and plug-ins.
//!
//! Each [`FunctionData`] has one or more typed call signatures
//! ([`FunctionVariant`]s). Functions are kept in registration order and are
//! indexed by internal name, by user-visible name and by [`FunctionHash`].
//! [`FunctionCatalog::resolve`] picks the best-fit variant for a call site;
//! see [`crate::overload`] for the ranking rules.

use rustc_hash::FxHashMap;

use mathscribe_core::{
    FunctionHash, RegistrationError, ResolveError, TypeProperties, ValueType, VariableName,
};

use crate::TypeRegistry;
use crate::overload::{self, ResolvedCall};

/// Where a function comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    BuiltIn,
    PlugIn,
}

/// One formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub value_type: ValueType,
    pub description: String,
}

/// One typed call signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionVariant {
    pub return_type: ValueType,
    pub parameters: Vec<Parameter>,
    /// Extra arguments beyond `parameters` are accepted and typed like the last one.
    pub variadic: bool,
}

impl FunctionVariant {
    /// Create a fixed-arity variant.
    pub fn new<'a>(
        return_type: ValueType,
        parameters: impl IntoIterator<Item = (ValueType, &'a str)>,
    ) -> Self {
        Self {
            return_type,
            parameters: parameters
                .into_iter()
                .map(|(value_type, description)| Parameter {
                    value_type,
                    description: description.to_string(),
                })
                .collect(),
            variadic: false,
        }
    }

    /// A variant taking no arguments.
    pub fn constant(return_type: ValueType) -> Self {
        Self {
            return_type,
            parameters: Vec::new(),
            variadic: false,
        }
    }

    /// Mark the variant as variadic.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Parameter types in order.
    pub fn parameter_types(&self) -> Vec<ValueType> {
        self.parameters.iter().map(|p| p.value_type).collect()
    }

    /// Check if `count` arguments fit this variant's arity.
    pub fn accepts_count(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.parameters.len()
        } else {
            count == self.parameters.len()
        }
    }
}

/// A catalog function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionData {
    pub internal_name: String,
    pub user_visible_name: VariableName,
    pub category: String,
    pub description: String,
    pub variants: Vec<FunctionVariant>,
    pub kind: FunctionKind,
}

impl FunctionData {
    /// Start a built-in function with no variants.
    pub fn builtin(
        internal_name: impl Into<String>,
        user_visible_name: impl Into<VariableName>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            user_visible_name: user_visible_name.into(),
            category: category.into(),
            description: description.into(),
            variants: Vec::new(),
            kind: FunctionKind::BuiltIn,
        }
    }

    /// Start a plug-in function with no variants.
    pub fn plugin(
        internal_name: impl Into<String>,
        user_visible_name: impl Into<VariableName>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: FunctionKind::PlugIn,
            ..Self::builtin(internal_name, user_visible_name, category, description)
        }
    }

    /// Add a call signature.
    pub fn variant(mut self, variant: FunctionVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Stable identity derived from the internal name.
    pub fn hash(&self) -> FunctionHash {
        FunctionHash::from_name(&self.internal_name)
    }

    /// Check if the function takes no arguments in any variant, i.e. is a constant.
    pub fn is_constant(&self) -> bool {
        self.variants
            .iter()
            .all(|v| v.parameters.is_empty() && !v.variadic)
    }
}

/// The catalog of callable functions.
#[derive(Debug, Default)]
pub struct FunctionCatalog {
    functions: Vec<FunctionData>,
    by_internal: FxHashMap<String, usize>,
    by_visible: FxHashMap<VariableName, usize>,
    by_hash: FxHashMap<FunctionHash, usize>,
}

impl FunctionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function.
    pub fn register(&mut self, function: FunctionData) -> Result<FunctionHash, RegistrationError> {
        if function.variants.is_empty() {
            return Err(RegistrationError::EmptyVariants(function.internal_name));
        }
        if self.by_internal.contains_key(&function.internal_name) {
            return Err(RegistrationError::DuplicateFunction(function.internal_name));
        }
        if self.by_visible.contains_key(&function.user_visible_name) {
            return Err(RegistrationError::DuplicateFunction(
                function.user_visible_name.to_string(),
            ));
        }

        let hash = function.hash();
        let index = self.functions.len();
        self.by_internal.insert(function.internal_name.clone(), index);
        self.by_visible.insert(function.user_visible_name.clone(), index);
        self.by_hash.insert(hash, index);
        tracing::debug!(
            name = %function.internal_name,
            variants = function.variants.len(),
            "registered function"
        );
        self.functions.push(function);
        Ok(hash)
    }

    /// Find a function by user-visible name, falling back to its internal name.
    pub fn find(&self, name: &VariableName) -> Option<&FunctionData> {
        let index = self.by_visible.get(name).or_else(|| {
            if name.has_subscript() {
                None
            } else {
                self.by_internal.get(&name.text)
            }
        })?;
        self.functions.get(*index)
    }

    /// Find a function by internal name.
    pub fn get_by_internal(&self, internal_name: &str) -> Option<&FunctionData> {
        self.by_internal
            .get(internal_name)
            .and_then(|&i| self.functions.get(i))
    }

    /// Find a function by hash.
    pub fn get(&self, hash: FunctionHash) -> Option<&FunctionData> {
        self.by_hash.get(&hash).and_then(|&i| self.functions.get(i))
    }

    /// Check if a name refers to a catalog function.
    pub fn contains(&self, name: &VariableName) -> bool {
        self.find(name).is_some()
    }

    /// Functions in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionData> {
        self.functions.iter()
    }

    /// Functions in one category, in registration order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a FunctionData> {
        self.functions.iter().filter(move |f| f.category == category)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Resolve the best-fit variant of `name` for a call site.
    ///
    /// `required` is the capability set the return type must provide.
    pub fn resolve(
        &self,
        name: &VariableName,
        required: TypeProperties,
        arguments: &[ValueType],
        types: &TypeRegistry,
    ) -> Result<ResolvedCall, ResolveError> {
        let function = self
            .find(name)
            .ok_or_else(|| ResolveError::UnknownFunction(name.to_string()))?;
        overload::resolve(function, required, arguments, types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt() -> FunctionData {
        FunctionData::builtin("sqrt", "√", "math", "square root")
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "x")]))
    }

    #[test]
    fn register_and_find_by_either_name() {
        let mut catalog = FunctionCatalog::new();
        let hash = catalog.register(sqrt()).unwrap();

        assert_eq!(catalog.find(&"√".into()).unwrap().internal_name, "sqrt");
        assert_eq!(catalog.find(&"sqrt".into()).unwrap().internal_name, "sqrt");
        assert_eq!(catalog.get(hash).unwrap().internal_name, "sqrt");
        assert!(catalog.find(&VariableName::with_subscript("sqrt", "2")).is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut catalog = FunctionCatalog::new();
        catalog.register(sqrt()).unwrap();

        let same_internal = FunctionData::builtin("sqrt", "root", "math", "")
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "x")]));
        assert!(matches!(
            catalog.register(same_internal),
            Err(RegistrationError::DuplicateFunction(_))
        ));

        let same_visible = FunctionData::builtin("root", "√", "math", "")
            .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "x")]));
        assert!(catalog.register(same_visible).is_err());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn empty_variants_rejected() {
        let mut catalog = FunctionCatalog::new();
        let err = catalog
            .register(FunctionData::builtin("nothing", "nothing", "misc", ""))
            .unwrap_err();
        assert_eq!(err, RegistrationError::EmptyVariants("nothing".into()));
    }

    #[test]
    fn variadic_arity() {
        let v = FunctionVariant::new(ValueType::Integer, [(ValueType::Integer, "a")]).variadic();
        assert!(!v.accepts_count(0));
        assert!(v.accepts_count(1));
        assert!(v.accepts_count(5));
    }

    #[test]
    fn unknown_function() {
        let catalog = FunctionCatalog::new();
        let types = TypeRegistry::with_defaults();
        let err = catalog
            .resolve(&"nope".into(), TypeProperties::empty(), &[], &types)
            .unwrap_err();
        assert_eq!(err, ResolveError::UnknownFunction("nope".into()));
    }
}
