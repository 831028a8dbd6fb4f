use phf::phf_ordered_map;

use crate::elements::Elements;
use crate::keyword::KeywordDictionary;
use crate::options::Options;
use crate::token::{Token, TokenCategory, TokenFilter, TokenRange, TokenStream};

/// Opening/closing bracket pairs, including CJK and fullwidth brackets.
static BRACKETS: phf::OrderedMap<char, char> = phf_ordered_map! {
    '(' => ')',
    '[' => ']',
    '{' => '}',
    '\u{300C}' => '\u{300D}', // 「」
    '\u{300E}' => '\u{300F}', // 『』
    '\u{3010}' => '\u{3011}', // 【】
    '\u{FF08}' => '\u{FF09}', // （）
};

/// Most filenames split into fewer than 20 tokens.
pub(crate) const TOKEN_CAPACITY: usize = 32;

/// Splits a filename into classified tokens.
///
/// One instance may tokenize many filenames in turn, but must not be shared
/// between threads while doing so: it keeps a scratch buffer for the
/// delimiter set of the span being split.
pub struct Tokenizer<'a> {
    dictionary: &'a KeywordDictionary,
    options: &'a Options,
    delimiters: Vec<char>,
}

/// Per-call state: the filename being split and the outputs being filled.
struct Context<'c> {
    filename: &'c [char],
    tokens: &'c mut TokenStream,
    elements: &'c mut Elements,
}

impl<'a> Tokenizer<'a> {
    pub fn new(dictionary: &'a KeywordDictionary, options: &'a Options) -> Self {
        Self {
            dictionary,
            options,
            delimiters: Vec::new(),
        }
    }

    /// Tokenize `filename` into `tokens`, recording pre-identified phrases in
    /// `elements`.
    ///
    /// Handles:
    /// - Bracket pairs `()`, `[]`, `{}` plus CJK and fullwidth variants,
    ///   without nesting: the first matching closer ends the enclosure
    /// - Literal phrases (`Dual Audio`, `1080p`, ...) carved out before splitting
    /// - Splitting on configured delimiters that actually occur in a span
    /// - Re-joining fragments around single characters, so `A.B` or
    ///   `H.264`-like tokens survive
    ///
    /// Returns false only when no token was produced, i.e. for empty input.
    #[tracing::instrument(name = "tokenize", skip_all, fields(filename = %filename))]
    pub fn tokenize(
        &mut self,
        filename: &str,
        elements: &mut Elements,
        tokens: &mut TokenStream,
    ) -> bool {
        let chars: Vec<char> = filename.chars().collect();
        let mut cx = Context {
            filename: &chars,
            tokens,
            elements,
        };
        self.tokenize_by_brackets(&mut cx);

        tracing::debug!(
            tokens = cx.tokens.len(),
            elements = cx.elements.len(),
            "Tokenized filename"
        );
        !cx.tokens.is_empty()
    }

    /// Pass A: cut the filename at bracket characters.
    fn tokenize_by_brackets(&mut self, cx: &mut Context<'_>) {
        let filename = cx.filename;
        let mut begin = 0;
        // Closing character of the open bracket, if any.
        let mut closing: Option<char> = None;

        while begin < filename.len() {
            let found = match closing {
                None => filename[begin..]
                    .iter()
                    .position(|c| BRACKETS.contains_key(c)),
                Some(close) => filename[begin..].iter().position(|&c| c == close),
            }
            .map(|p| begin + p);

            let end = found.unwrap_or(filename.len());
            if end > begin {
                self.tokenize_by_preidentified(cx, closing.is_some(), TokenRange::new(begin, end - begin));
            }

            let Some(position) = found else {
                break;
            };
            let bracket = filename[position];
            tracing::trace!(%bracket, position, "Found bracket");
            cx.tokens.push(Token::new(
                TokenCategory::Bracket,
                bracket.to_string(),
                closing.is_some(),
            ));
            closing = match closing {
                None => BRACKETS.get(&bracket).copied(),
                Some(_) => None,
            };
            begin = position + 1;
        }
    }

    /// Pass B: emit pre-identified phrases as identifiers and split the gaps.
    fn tokenize_by_preidentified(&mut self, cx: &mut Context<'_>, enclosed: bool, range: TokenRange) {
        let mut preidentified = Vec::new();
        self.dictionary
            .peek(cx.filename, range, cx.elements, &mut preidentified);
        preidentified.sort_by_key(|r| r.offset);

        let mut cursor = range.offset;
        for hit in preidentified {
            // Overlaps a phrase already carved out.
            if hit.offset < cursor {
                continue;
            }
            if hit.offset > cursor {
                self.tokenize_by_delimiters(cx, enclosed, TokenRange::new(cursor, hit.offset - cursor));
            }
            cx.tokens
                .push(Token::new(TokenCategory::Identifier, slice(cx.filename, hit), enclosed));
            cursor = hit.end();
        }

        if cursor < range.end() {
            self.tokenize_by_delimiters(cx, enclosed, TokenRange::new(cursor, range.end() - cursor));
        }
    }

    /// Split `range` on the delimiters it contains, then run the merge pass
    /// over the new tokens.
    fn tokenize_by_delimiters(&mut self, cx: &mut Context<'_>, enclosed: bool, range: TokenRange) {
        let text = &cx.filename[range.offset..range.end()];
        self.collect_delimiters(text);

        if self.delimiters.is_empty() {
            cx.tokens
                .push(Token::new(TokenCategory::Unknown, slice(cx.filename, range), enclosed));
            return;
        }
        tracing::trace!(delimiters = ?self.delimiters, offset = range.offset, "Splitting span");

        let first = cx.tokens.len();
        let mut begin = range.offset;
        for (i, &c) in text.iter().enumerate() {
            if !self.delimiters.contains(&c) {
                continue;
            }
            let position = range.offset + i;
            if position > begin {
                let unknown = TokenRange::new(begin, position - begin);
                cx.tokens
                    .push(Token::new(TokenCategory::Unknown, slice(cx.filename, unknown), enclosed));
            }
            cx.tokens
                .push(Token::new(TokenCategory::Delimiter, c.to_string(), enclosed));
            begin = position + 1;
        }
        if begin < range.end() {
            let unknown = TokenRange::new(begin, range.end() - begin);
            cx.tokens
                .push(Token::new(TokenCategory::Unknown, slice(cx.filename, unknown), enclosed));
        }

        validate_delimiter_tokens(cx.tokens, first);
    }

    /// Fill the scratch buffer with the allowed, non-alphanumeric characters
    /// present in `text`, each once, in order of first appearance.
    fn collect_delimiters(&mut self, text: &[char]) -> &[char] {
        self.delimiters.clear();
        for &c in text {
            if !c.is_alphanumeric()
                && self.options.is_allowed_delimiter(c)
                && !self.delimiters.contains(&c)
            {
                self.delimiters.push(c);
            }
        }
        &self.delimiters
    }
}

/// Pass C: re-join fragments around the delimiters at or after `start`,
/// then compact the stream.
///
/// 1. A delimiter other than space or underscore next to a one-character
///    unknown token is glued to its neighbors. With the short token on the
///    left, the glue keeps going over following unknown tokens and repeats
///    of the same delimiter (`A.B.C`). With it on the right, only the
///    delimiter and that token are appended to the preceding token.
/// 2. A delimiter sitting between an unknown token and a space or
///    underscore of a different character is appended to the unknown token,
///    unless it is a comma.
pub(crate) fn validate_delimiter_tokens(tokens: &mut TokenStream, start: usize) {
    let valid = TokenFilter::valid();

    for index in start..tokens.len() {
        if tokens[index].category != TokenCategory::Delimiter {
            continue;
        }
        let Some(delimiter) = tokens[index].first_char() else {
            continue;
        };
        let prev = tokens.find_previous_token(index, valid);
        let mut next = tokens.find_next_token(index, valid);

        if delimiter != ' ' && delimiter != '_' {
            if let Some(prev) = prev.filter(|&p| tokens[p].is_single_character()) {
                tracing::trace!(%delimiter, into = %tokens[prev].content, "Joining after single character");
                tokens.absorb(index, prev);
                while let Some(unknown) = next.filter(|&n| is_category(tokens, n, TokenCategory::Unknown)) {
                    tokens.absorb(unknown, prev);
                    next = tokens.find_next_token(unknown, valid);
                    if let Some(repeat) = next.filter(|&n| is_delimiter(tokens, n, delimiter)) {
                        tokens.absorb(repeat, prev);
                        next = tokens.find_next_token(repeat, valid);
                    }
                }
                continue;
            }
            if let (Some(prev), Some(single)) = (prev, next.filter(|&n| tokens[n].is_single_character())) {
                tracing::trace!(%delimiter, into = %tokens[prev].content, "Joining before single character");
                tokens.absorb(index, prev);
                tokens.absorb(single, prev);
                continue;
            }
        }

        // Adjacent delimiters
        if let (Some(prev), Some(next)) = (prev, next) {
            if is_category(tokens, prev, TokenCategory::Unknown)
                && is_category(tokens, next, TokenCategory::Delimiter)
            {
                let next_delimiter = tokens[next].first_char();
                if next_delimiter != Some(delimiter)
                    && delimiter != ','
                    && matches!(next_delimiter, Some(' ' | '_'))
                {
                    tracing::trace!(%delimiter, into = %tokens[prev].content, "Joining adjacent delimiter");
                    tokens.absorb(index, prev);
                }
            }
        }
    }

    tokens.compact();
}

fn is_category(tokens: &TokenStream, index: usize, category: TokenCategory) -> bool {
    tokens[index].category == category
}

fn is_delimiter(tokens: &TokenStream, index: usize, delimiter: char) -> bool {
    is_category(tokens, index, TokenCategory::Delimiter) && tokens[index].first_char() == Some(delimiter)
}

fn slice(filename: &[char], range: TokenRange) -> String {
    filename[range.offset..range.end()].iter().collect()
}
