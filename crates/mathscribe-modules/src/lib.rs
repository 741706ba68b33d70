//! Built-in function modules for mathscribe.
//!
//! - **math** - constants, elementary functions, rounding, `min`/`max`, `gcd`
//! - **linalg** - determinant, trace, transpose, inverse, dimensions
//! - **collections** - set cardinality, tuple length, union, intersection
//!
//! # Usage
//!
//! ```
//! use mathscribe_registry::FunctionCatalog;
//!
//! let mut catalog = FunctionCatalog::new();
//! for module in mathscribe_modules::default_modules() {
//!     module.install_into(&mut catalog).unwrap();
//! }
//! assert!(catalog.contains(&"det".into()));
//! ```

pub mod collections;
pub mod linalg;
pub mod math;

use mathscribe_registry::Module;

/// Every built-in module, in installation order.
pub fn default_modules() -> Vec<Module> {
    vec![math::module(), linalg::module(), collections::module()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscribe_registry::{FunctionCatalog, FunctionKind};

    #[test]
    fn default_modules_install_without_conflicts() {
        let mut catalog = FunctionCatalog::new();
        for module in default_modules() {
            module.install_into(&mut catalog).unwrap();
        }
        assert!(catalog.functions().all(|f| f.kind == FunctionKind::BuiltIn));
        assert_eq!(catalog.in_category("collections").count(), 4);
    }
}
