//! Functions over sets and tuples.

use mathscribe_core::ValueType::{Integer, Set, Tuple};
use mathscribe_registry::{FunctionData, FunctionVariant, Module};

const CATEGORY: &str = "collections";

pub fn module() -> Module {
    Module::new(CATEGORY)
        .function(
            FunctionData::builtin("card", "card", CATEGORY, "number of elements of a set")
                .variant(FunctionVariant::new(Integer, [(Set, "s")])),
        )
        .function(
            FunctionData::builtin("length", "length", CATEGORY, "number of tuple entries")
                .variant(FunctionVariant::new(Integer, [(Tuple, "t")])),
        )
        .function(
            FunctionData::builtin("set_union", "union", CATEGORY, "union of two sets")
                .variant(FunctionVariant::new(Set, [(Set, "a"), (Set, "b")])),
        )
        .function(
            FunctionData::builtin("set_intersection", "intersection", CATEGORY, "intersection of two sets")
                .variant(FunctionVariant::new(Set, [(Set, "a"), (Set, "b")])),
        )
}
