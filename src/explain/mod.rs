//! Failure classification: the fixed table of runtime failure kinds and
//! their one-line explanations.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

/// Shown for any failure type that has no entry in the table.
pub const FALLBACK_EXPLANATION: &str = "😕 This error type is currently not explained.";

/// Explanation table in declaration order.
const EXPLANATIONS: &[(&str, &str)] = &[
    ("SyntaxError", "🧠 This usually happens due to missing colons, wrong indentation, or incorrect syntax."),
    ("IndentationError", "🔧 Check your indentation. Python is sensitive to spaces and tabs!"),
    ("NameError", "🔍 You're using a variable or function that hasn't been defined yet."),
    ("TypeError", "🛠 You're using a function or operator on the wrong data type."),
    ("ZeroDivisionError", "⚠ You tried to divide by zero – which is undefined."),
    ("IndexError", "📦 You're trying to access an index that doesn't exist in a list or string."),
    ("ValueError", "❗ You're passing a value to a function that is of the correct type but inappropriate."),
    ("AttributeError", "🔑 You're trying to access an attribute or method that doesn't exist for that object."),
    ("KeyError", "🗝 You're trying to access a dictionary key that doesn't exist."),
    ("ImportError", "📦 Python can't find the module you're trying to import."),
    ("ModuleNotFoundError", "📦 Python can't find the module you're trying to import."),
    ("FileNotFoundError", "📁 The file you're trying to access does not exist."),
    ("OSError", "💾 An operating system error occurred (file, directory, permissions, etc)."),
    ("RuntimeError", "🏃‍♂️ An error that doesn't fall into other categories. Check your logic."),
    ("RecursionError", "🔁 Your function called itself too many times (infinite recursion?)."),
    ("MemoryError", "💾 Your code tried to use more memory than is available."),
    ("OverflowError", "🔢 A number is too large to be represented."),
    ("StopIteration", "🛑 An iterator has no more items."),
    ("AssertionError", "❗ An assert statement failed."),
    ("PermissionError", "🚫 You don't have permission to perform this action."),
    ("EOFError", "📚 End Of File reached unexpectedly (e.g., input() got no data)."),
    ("FloatingPointError", "⚠ A floating point calculation failed."),
    ("NotImplementedError", "🚧 This feature isn't implemented yet."),
    ("SystemExit", "🚪 The code tried to exit Python."),
];

static INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| EXPLANATIONS.iter().copied().collect());

/// All `(type name, explanation)` pairs, in table order.
pub fn entries() -> &'static [(&'static str, &'static str)] {
    EXPLANATIONS
}

/// Explanation for a runtime type name, or the fallback string.
pub fn explain(type_name: &str) -> &'static str {
    INDEX.get(type_name).copied().unwrap_or(FALLBACK_EXPLANATION)
}

/// Category of a caught failure, keyed by its runtime type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// The type name is a key of the explanation table.
    Known(&'static str),
    /// Any other type name; explained by [`FALLBACK_EXPLANATION`].
    Unexplained(String),
}

impl FailureCategory {
    pub fn classify(type_name: &str) -> Self {
        match INDEX.get_key_value(type_name) {
            Some((key, _)) => Self::Known(key),
            None => Self::Unexplained(type_name.to_string()),
        }
    }

    /// Runtime type name of the failure, for both known and unexplained kinds.
    pub fn name(&self) -> &str {
        match self {
            Self::Known(name) => name,
            Self::Unexplained(name) => name,
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Self::Known(name) => explain(name),
            Self::Unexplained(_) => FALLBACK_EXPLANATION,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FailureCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
