//! Java naming conventions: identifier validation, camelCase variable names
//! derived from types, and best-effort English pluralisation for collection
//! variables.
//!
//! Pluralisation is a heuristic. It knows common irregular and uncountable
//! nouns and the usual suffix rules; anything else gets an `s`.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Collection types whose variables are conventionally plural.
pub const COLLECTION_TYPES: [&str; 8] = [
    "List",
    "Set",
    "ArrayList",
    "LinkedList",
    "HashSet",
    "LinkedHashSet",
    "TreeSet",
    "Collection",
];

/// Reserved words and literals that cannot be identifiers.
pub const JAVA_KEYWORDS: [&str; 53] = [
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
];

const IRREGULAR: [(&str, &str); 12] = [
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("criterion", "criteria"),
    ("index", "indices"),
    ("matrix", "matrices"),
];

const UNCOUNTABLE: [&str; 12] = [
    "sheep",
    "fish",
    "series",
    "species",
    "data",
    "information",
    "equipment",
    "news",
    "money",
    "rice",
    "metadata",
    "feedback",
];

const F_TO_VES: [&str; 9] = [
    "knife", "wife", "life", "leaf", "half", "wolf", "shelf", "calf", "thief",
];

const O_TO_OES: [&str; 5] = ["hero", "potato", "tomato", "echo", "veto"];

static CAMEL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Lu}?[^\p{Lu}]*").expect("camel-case word pattern is valid"));

/// Why a name is not a legal Java identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("identifier is empty")]
    Empty,

    #[error("'{name}' cannot start with '{ch}'")]
    InvalidStart { name: String, ch: char },

    #[error("'{name}' contains invalid character '{ch}'")]
    InvalidChar { name: String, ch: char },

    #[error("'{name}' is a reserved keyword")]
    Keyword { name: String },
}

/// Check that `name` is a legal Java identifier.
pub fn validate_identifier(name: &str) -> Result<(), NamingError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(NamingError::Empty);
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return Err(NamingError::InvalidStart {
            name: name.to_string(),
            ch: first,
        });
    }
    if let Some(ch) = chars.find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '$')) {
        return Err(NamingError::InvalidChar {
            name: name.to_string(),
            ch,
        });
    }
    if JAVA_KEYWORDS.contains(&name) || name == "_" {
        return Err(NamingError::Keyword {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Lower-case the first character: `OrderItem` becomes `orderItem`.
pub fn to_camel_case(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Plural of a single English word, keeping its leading capital.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    let capitalised = word.starts_with(|c: char| c.is_uppercase());
    let recase = |plural: &str| {
        if capitalised {
            let mut chars = plural.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        } else {
            plural.to_string()
        }
    };

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return recase(plural);
    }
    if F_TO_VES.contains(&lower.as_str()) {
        let stem = word.trim_end_matches('e');
        return format!("{}ves", &stem[..stem.len() - 1]);
    }
    if O_TO_OES.contains(&lower.as_str()) {
        return format!("{word}es");
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{word}s")
}

/// Split a camelCase or PascalCase name into words.
pub fn split_camel_case(name: &str) -> Vec<&str> {
    CAMEL_WORD
        .find_iter(name)
        .map(|m| m.as_str())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Pluralise the last word of a camelCase or PascalCase name.
pub fn pluralize_camel_case(name: &str) -> String {
    let mut words = split_camel_case(name);
    let Some(last) = words.pop() else {
        return name.to_string();
    };
    let mut result: String = words.concat();
    result.push_str(&pluralize(last));
    result
}

/// True for `List<T>`, `Set<T>` and friends, generic or raw.
pub fn is_collection_type(type_text: &str) -> bool {
    let base = type_text.split('<').next().unwrap_or_default().trim();
    COLLECTION_TYPES.contains(&base)
}

/// `User` in `List<User>`; `None` for non-collections and raw collections.
pub fn element_type(type_text: &str) -> Option<&str> {
    if !is_collection_type(type_text) {
        return None;
    }
    let open = type_text.find('<')?;
    let close = type_text.rfind('>')?;
    let inner = type_text.get(open + 1..close)?.trim();
    (!inner.is_empty()).then_some(inner)
}

/// Conventional variable name for a type: `user` or, for collections, `users`.
pub fn derive_variable_name(type_name: &str, is_collection: bool) -> String {
    if is_collection {
        to_camel_case(&pluralize_camel_case(type_name))
    } else {
        to_camel_case(type_name)
    }
}

/// True if `variable` is the conventional name for `type_name`.
pub fn should_rename_variable(variable: &str, type_name: &str, is_collection: bool) -> bool {
    variable == derive_variable_name(type_name, is_collection)
}

/// New name for `variable` after `old_type` is renamed to `new_type`, or
/// `None` if the variable does not follow the convention.
pub fn cascaded_name(
    variable: &str,
    old_type: &str,
    new_type: &str,
    is_collection: bool,
) -> Option<String> {
    should_rename_variable(variable, old_type, is_collection)
        .then(|| derive_variable_name(new_type, is_collection))
}
