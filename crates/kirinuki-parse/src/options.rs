use serde::{Deserialize, Serialize};

/// Delimiters used when the configuration does not say otherwise.
pub const DEFAULT_DELIMITERS: &str = " _.&+,|";

/// Tokenizer and parser settings.
///
/// Only `allowed_delimiters` affects tokenization; the rest is carried
/// through for element extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Characters that may split a span. Alphanumerics here are ignored.
    pub allowed_delimiters: String,
    /// Strings element extraction should skip.
    pub ignored_strings: Vec<String>,
    pub parse_episode_number: bool,
    pub parse_episode_title: bool,
    pub parse_file_extension: bool,
    pub parse_release_group: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allowed_delimiters: DEFAULT_DELIMITERS.to_string(),
            ignored_strings: Vec::new(),
            parse_episode_number: true,
            parse_episode_title: true,
            parse_file_extension: true,
            parse_release_group: true,
        }
    }
}

impl Options {
    /// Parse options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    pub fn is_allowed_delimiter(&self, c: char) -> bool {
        self.allowed_delimiters.contains(c)
    }
}
