//! JavaScript reserved words and identifier helpers

use crate::finalisers::quote;

/// Words that cannot be used as bare property keys in ES3 engines, nor as
/// binding identifiers anywhere.
const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "arguments",
    "await",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "function",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "let",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
    "yield",
];

/// Check whether `name` is a reserved word
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Check whether `name` can be written as a bare identifier
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || first == '$' || first.is_alphabetic()) {
        return false;
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric()) && !is_reserved_word(name)
}

/// Render `name` as an object-literal key.
///
/// In legacy mode reserved words must be quoted; names that are not valid
/// identifiers are always quoted.
pub fn property_key(name: &str, legacy: bool) -> String {
    if !is_valid_es5_property(name) || (legacy && is_reserved_word(name)) {
        quote(name)
    } else {
        name.to_owned()
    }
}

/// Render a member access on `object`, falling back to bracket syntax when
/// `property` is not a bare identifier.
pub fn property_access(object: &str, property: &str, legacy: bool) -> String {
    if is_valid_identifier(property) || (!legacy && is_valid_es5_property(property)) {
        format!("{object}.{property}")
    } else {
        format!("{object}[{}]", quote(property))
    }
}

/// Reserved words are fine as property names from ES5 on
fn is_valid_es5_property(name: &str) -> bool {
    name.chars().next().is_some_and(|c| !c.is_ascii_digit())
        && name.chars().all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}
