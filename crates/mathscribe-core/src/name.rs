//! Names of quantities as they appear in a document.

use std::fmt;

/// A variable name: base text plus an optional subscript.
///
/// Ordered lexicographically on `(text, subscript)`, with a missing
/// subscript sorting before any present one.
///
/// # Example
///
/// ```
/// use mathscribe_core::VariableName;
///
/// let x1 = VariableName::with_subscript("x", "1");
/// assert_eq!(x1.to_string(), "x_1");
/// assert!(VariableName::new("x") < x1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableName {
    /// Base text.
    pub text: String,
    /// Optional subscript.
    pub subscript: Option<String>,
}

impl VariableName {
    /// Create a name without a subscript.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subscript: None,
        }
    }

    /// Create a subscripted name.
    pub fn with_subscript(text: impl Into<String>, subscript: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subscript: Some(subscript.into()),
        }
    }

    /// Check if the name has a subscript.
    #[inline]
    pub fn has_subscript(&self) -> bool {
        self.subscript.is_some()
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subscript {
            Some(sub) => write!(f, "{}_{}", self.text, sub),
            None => f.write_str(&self.text),
        }
    }
}

impl From<&str> for VariableName {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        let mut names = vec![
            VariableName::with_subscript("y", "0"),
            VariableName::with_subscript("x", "2"),
            VariableName::new("x"),
            VariableName::with_subscript("x", "10"),
        ];
        names.sort();
        let shown: Vec<String> = names.iter().map(ToString::to_string).collect();
        assert_eq!(shown, ["x", "x_10", "x_2", "y_0"]);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(VariableName::new("a"), VariableName::from("a"));
        assert_ne!(VariableName::new("a"), VariableName::with_subscript("a", ""));
    }
}
