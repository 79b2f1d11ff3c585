//! Parser configuration supplied by the host.

use serde::{Deserialize, Serialize};

/// Options that change how expressions are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserOptions {
    /// Tag pipes whose name starts with `_` or an uppercase letter as
    /// referenced directly (a class symbol) instead of by registered name.
    pub supports_direct_pipe_references: bool,
    /// Delimiters of text interpolations.
    pub interpolation: InterpolationConfig,
}

impl ParserOptions {
    /// Load options from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The markers that open and close an interpolation, `{{` and `}}` by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    pub start: String,
    pub end: String,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            start: "{{".to_string(),
            end: "}}".to_string(),
        }
    }
}
