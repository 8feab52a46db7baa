//! Line-number recovery from a formatted Python trace.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::process::python::SOURCE_LABEL;

static LINE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"File "{}", line (\d+)"#,
        regex::escape(SOURCE_LABEL)
    ))
    .expect("line marker pattern is valid")
});

/// Where in the analyzed text a failure happened, if it could be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceLine {
    Line(u32),
    #[default]
    Unknown,
}

impl SourceLine {
    pub fn number(self) -> Option<u32> {
        match self {
            Self::Line(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u32>> for SourceLine {
    fn from(n: Option<u32>) -> Self {
        n.map(Self::Line).unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(n) => write!(f, "{}", n),
            Self::Unknown => f.write_str("?"),
        }
    }
}

impl Serialize for SourceLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Line(n) => serializer.serialize_u32(*n),
            Self::Unknown => serializer.serialize_none(),
        }
    }
}

/// First `File "<string>", line N` in `trace`.
pub fn scrape_line(trace: &str) -> SourceLine {
    LINE_MARKER
        .captures(trace)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .into()
}

/// Scraped line, else the interpreter's structured line number, else unknown.
pub fn locate(trace: &str, structured: Option<u32>) -> SourceLine {
    match scrape_line(trace) {
        SourceLine::Unknown => structured.into(),
        found => found,
    }
}
