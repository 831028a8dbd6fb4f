//! Release filename tokenizer.
//!
//! Splits a filename such as `[Group] Title - 01 (1080p).mkv` into
//! bracket, delimiter, identifier and unknown tokens, recording literal
//! phrases it recognizes on the way. Element extraction works on the
//! resulting [`TokenStream`].

pub mod elements;
pub mod keyword;
pub mod options;
pub mod token;
pub mod tokenizer;

use serde::Serialize;

pub use elements::{Element, ElementCategory, Elements};
pub use keyword::{KeywordDictionary, KeywordEntry, KeywordOptions};
pub use options::Options;
pub use token::{Direction, Token, TokenCategory, TokenFilter, TokenRange, TokenStream};
pub use tokenizer::Tokenizer;

/// Tokens and pre-identified elements for one filename.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tokenized {
    pub tokens: TokenStream,
    pub elements: Elements,
}

/// Tokenize `filename` with the shared built-in dictionary.
///
/// Returns `None` when the filename yields no tokens.
pub fn tokenize(filename: &str, options: &Options) -> Option<Tokenized> {
    let mut tokenizer = Tokenizer::new(KeywordDictionary::shared(), options);
    let mut result = Tokenized {
        tokens: TokenStream::with_capacity(crate::tokenizer::TOKEN_CAPACITY),
        elements: Elements::new(),
    };
    tokenizer
        .tokenize(filename, &mut result.elements, &mut result.tokens)
        .then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_with_shared_dictionary() {
        let result = tokenize("[Thora] Toradora! - 01 [Dual Audio].mkv", &Options::default()).unwrap();
        assert_eq!(result.tokens.content(), "[Thora] Toradora! - 01 [Dual Audio].mkv");
        assert_eq!(result.elements.get(ElementCategory::ReleaseGroup), "Thora");
        assert_eq!(result.elements.get(ElementCategory::AudioTerm), "Dual Audio");
    }

    #[test]
    fn test_tokenize_empty_is_none() {
        assert!(tokenize("", &Options::default()).is_none());
    }

    #[test]
    fn test_find_enclosed_identifiers() {
        let result = tokenize("[Thora] Title (1080p)", &Options::default()).unwrap();
        let tokens = &result.tokens;
        let filter = TokenFilter::is(TokenCategory::Identifier).enclosed();
        let first = tokens.find_token(0, tokens.len(), Direction::Forward, filter).unwrap();
        assert_eq!(tokens[first].content, "Thora");
        let last = tokens.find_token(0, tokens.len(), Direction::Backward, filter).unwrap();
        assert_eq!(tokens[last].content, "1080p");
    }
}
