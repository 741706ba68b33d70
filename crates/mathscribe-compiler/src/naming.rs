//! Mapping user-visible names to identifiers of the native target.
//!
//! Names typed in a document may contain Greek letters, primes, subscripts
//! and other characters a C-family compiler rejects. [`spell`] turns a
//! [`VariableName`] into a valid identifier; collisions between different
//! names that spell the same are resolved by the symbol table.

use mathscribe_core::VariableName;

/// Words that cannot be used as identifiers in the emitted source.
const RESERVED: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char",
    "class", "const", "constexpr", "continue", "default", "delete", "do", "double", "else",
    "enum", "evaluate", "explicit", "export", "extern", "false", "float", "for", "friend",
    "goto", "if", "inline", "int", "long", "main", "mutable", "namespace", "new", "not",
    "nullptr", "operator", "or", "private", "protected", "public", "register", "return", "rt",
    "short", "signed", "sizeof", "static", "std", "struct", "switch", "template", "this",
    "throw", "true", "try", "typedef", "typename", "union", "unsigned", "using", "virtual",
    "void", "volatile", "while", "xor",
];

const GREEK: &[(char, &str)] = &[
    ('α', "alpha"), ('β', "beta"), ('γ', "gamma"), ('δ', "delta"), ('ε', "epsilon"),
    ('ζ', "zeta"), ('η', "eta"), ('θ', "theta"), ('ι', "iota"), ('κ', "kappa"),
    ('λ', "lambda"), ('μ', "mu"), ('ν', "nu"), ('ξ', "xi"), ('ο', "omicron"), ('π', "pi"),
    ('ρ', "rho"), ('σ', "sigma"), ('ς', "sigma"), ('τ', "tau"), ('υ', "upsilon"),
    ('φ', "phi"), ('χ', "chi"), ('ψ', "psi"), ('ω', "omega"),
    ('Α', "Alpha"), ('Β', "Beta"), ('Γ', "Gamma"), ('Δ', "Delta"), ('Ε', "Epsilon"),
    ('Ζ', "Zeta"), ('Η', "Eta"), ('Θ', "Theta"), ('Ι', "Iota"), ('Κ', "Kappa"),
    ('Λ', "Lambda"), ('Μ', "Mu"), ('Ν', "Nu"), ('Ξ', "Xi"), ('Ο', "Omicron"), ('Π', "Pi"),
    ('Ρ', "Rho"), ('Σ', "Sigma"), ('Τ', "Tau"), ('Υ', "Upsilon"), ('Φ', "Phi"),
    ('Χ', "Chi"), ('Ψ', "Psi"), ('Ω', "Omega"),
];

fn greek_name(c: char) -> Option<&'static str> {
    GREEK.iter().find(|(g, _)| *g == c).map(|(_, name)| *name)
}

/// Append the identifier-safe form of `text` to `out`.
fn push_sanitized(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if let Some(name) = greek_name(c) {
            out.push_str(name);
        } else if c == '\'' || c == '′' {
            out.push_str("_prime");
        } else {
            out.push_str(&format!("_u{:04x}", c as u32));
        }
    }
}

/// Check if a spelling is reserved in the emitted source.
pub fn is_reserved(spelling: &str) -> bool {
    RESERVED.contains(&spelling)
}

/// Spell a user-visible name as a target identifier.
///
/// The result is always non-empty, never starts with a digit, never starts
/// with `__` (reserved for temporaries) and never equals a reserved word.
pub fn spell(name: &VariableName) -> String {
    let mut out = String::with_capacity(name.text.len() + 4);
    push_sanitized(&mut out, &name.text);
    if let Some(subscript) = &name.subscript {
        out.push('_');
        push_sanitized(&mut out, subscript);
    }

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.starts_with("__") {
        out.insert(0, 'v');
    }
    if is_reserved(&out) {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_unchanged() {
        assert_eq!(spell(&"x".into()), "x");
        assert_eq!(spell(&"total_2".into()), "total_2");
    }

    #[test]
    fn subscript_joined() {
        assert_eq!(spell(&VariableName::with_subscript("x", "1")), "x_1");
        assert_eq!(spell(&VariableName::with_subscript("v", "max")), "v_max");
    }

    #[test]
    fn greek_spelled_out() {
        assert_eq!(spell(&"θ".into()), "theta");
        assert_eq!(spell(&VariableName::with_subscript("Δ", "t")), "Delta_t");
    }

    #[test]
    fn other_characters_escaped() {
        assert_eq!(spell(&"f'".into()), "f_prime");
        assert_eq!(spell(&"∂".into()), "_u2202");
        assert_eq!(spell(&"2x".into()), "_2x");
    }

    #[test]
    fn reserved_words_suffixed() {
        assert_eq!(spell(&"for".into()), "for_");
        assert_eq!(spell(&"evaluate".into()), "evaluate_");
        assert_eq!(spell(&"__k0".into()), "v__k0");
    }
}
