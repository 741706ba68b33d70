//! Installable bundles of catalog functions.

use mathscribe_core::RegistrationError;

use crate::catalog::{FunctionCatalog, FunctionData};

/// A named group of functions installed into a [`FunctionCatalog`] together.
///
/// ```
/// use mathscribe_core::ValueType;
/// use mathscribe_registry::{FunctionCatalog, FunctionData, FunctionVariant, Module};
///
/// let module = Module::new("demo").function(
///     FunctionData::builtin("twice", "twice", "demo", "double a number")
///         .variant(FunctionVariant::new(ValueType::Real, [(ValueType::Real, "x")])),
/// );
///
/// let mut catalog = FunctionCatalog::new();
/// module.install_into(&mut catalog).unwrap();
/// assert!(catalog.contains(&"twice".into()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    functions: Vec<FunctionData>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Add a function.
    pub fn function(mut self, function: FunctionData) -> Self {
        self.functions.push(function);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[FunctionData] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Register every function, stopping at the first failure.
    ///
    /// Functions registered before the failure stay registered.
    pub fn install_into(&self, catalog: &mut FunctionCatalog) -> Result<(), RegistrationError> {
        tracing::debug!(module = %self.name, functions = self.functions.len(), "installing module");
        for function in &self.functions {
            catalog.register(function.clone())?;
        }
        Ok(())
    }
}
