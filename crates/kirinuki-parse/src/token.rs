use serde::Serialize;

/// Half-open span over the filename's characters (not bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenRange {
    pub offset: usize,
    pub size: usize,
}

impl TokenRange {
    pub const fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Token categories produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    /// A single opening or closing bracket character.
    Bracket,
    /// A single delimiter character (space, underscore, dot, ...).
    Delimiter,
    /// A pre-identified phrase such as `Dual Audio`.
    Identifier,
    /// Text not yet classified.
    Unknown,
    /// Tombstone: the content was absorbed by a neighbor and the token is
    /// waiting to be compacted away.
    Invalid,
}

/// A single classified piece of a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub category: TokenCategory,
    pub content: String,
    /// Whether this token lies inside an open bracket pair.
    pub enclosed: bool,
}

impl Token {
    pub fn new(category: TokenCategory, content: impl Into<String>, enclosed: bool) -> Self {
        Self {
            category,
            content: content.into(),
            enclosed,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.category != TokenCategory::Invalid
    }

    /// An unknown token of exactly one character.
    pub fn is_single_character(&self) -> bool {
        self.category == TokenCategory::Unknown && self.content.chars().count() == 1
    }

    pub fn first_char(&self) -> Option<char> {
        self.content.chars().next()
    }
}

/// Category half of a [`TokenFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    Is(TokenCategory),
    IsNot(TokenCategory),
}

/// Predicate used by the token search functions.
///
/// `None` fields match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenFilter {
    pub enclosed: Option<bool>,
    pub category: Option<CategoryFilter>,
}

impl TokenFilter {
    pub const fn any() -> Self {
        Self {
            enclosed: None,
            category: None,
        }
    }

    /// Anything that is not a tombstone.
    pub const fn valid() -> Self {
        Self::is_not(TokenCategory::Invalid)
    }

    pub const fn is(category: TokenCategory) -> Self {
        Self {
            enclosed: None,
            category: Some(CategoryFilter::Is(category)),
        }
    }

    pub const fn is_not(category: TokenCategory) -> Self {
        Self {
            enclosed: None,
            category: Some(CategoryFilter::IsNot(category)),
        }
    }

    pub const fn enclosed(self) -> Self {
        Self {
            enclosed: Some(true),
            ..self
        }
    }

    pub const fn not_enclosed(self) -> Self {
        Self {
            enclosed: Some(false),
            ..self
        }
    }

    pub fn matches(&self, token: &Token) -> bool {
        if let Some(enclosed) = self.enclosed {
            if token.enclosed != enclosed {
                return false;
            }
        }
        match self.category {
            Some(CategoryFilter::Is(category)) => token.category == category,
            Some(CategoryFilter::IsNot(category)) => token.category != category,
            None => true,
        }
    }
}

/// Scan direction for [`TokenStream::find_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Ordered, index-addressed token sequence for one filename.
///
/// The merge pass absorbs tokens by index and tombstones them; a single
/// [`compact`](Self::compact) afterwards drops the tombstones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, token: Token) -> usize {
        self.tokens.push(token);
        self.tokens.len() - 1
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// First index in `start..end` whose token passes `filter`, scanning in
    /// `direction`. `None` is the "not found" sentinel.
    pub fn find_token(
        &self,
        start: usize,
        end: usize,
        direction: Direction,
        filter: TokenFilter,
    ) -> Option<usize> {
        let end = end.min(self.tokens.len());
        if start >= end {
            return None;
        }
        let matches = |&i: &usize| filter.matches(&self.tokens[i]);
        match direction {
            Direction::Forward => (start..end).find(matches),
            Direction::Backward => (start..end).rev().find(matches),
        }
    }

    /// Nearest token before `position` that passes `filter`. Tombstones are
    /// always skipped.
    pub fn find_previous_token(&self, position: usize, filter: TokenFilter) -> Option<usize> {
        let index = self.find_token(0, position, Direction::Backward, filter)?;
        self.skip_invalid(index, filter, Direction::Backward)
    }

    /// Nearest token after `position` that passes `filter`. Tombstones are
    /// always skipped.
    pub fn find_next_token(&self, position: usize, filter: TokenFilter) -> Option<usize> {
        let index = self.find_token(position + 1, self.tokens.len(), Direction::Forward, filter)?;
        self.skip_invalid(index, filter, Direction::Forward)
    }

    fn skip_invalid(&self, index: usize, filter: TokenFilter, direction: Direction) -> Option<usize> {
        if self.tokens[index].is_valid() {
            return Some(index);
        }
        // Only reachable when `filter` itself accepts tombstones.
        match direction {
            Direction::Forward => self.find_next_token(index, filter),
            Direction::Backward => self.find_previous_token(index, filter),
        }
    }

    /// Append the content of token `from` to token `into` and tombstone
    /// `from`. `into` must precede `from` so contents stay in filename order.
    pub fn absorb(&mut self, from: usize, into: usize) {
        debug_assert!(into < from, "tokens are absorbed into an earlier token");
        let content = std::mem::take(&mut self.tokens[from].content);
        self.tokens[into].content.push_str(&content);
        self.tokens[from].category = TokenCategory::Invalid;
    }

    /// Drop every tombstone, keeping the survivors in order.
    pub fn compact(&mut self) {
        self.tokens.retain(Token::is_valid);
    }

    /// Concatenated content of every live token.
    pub fn content(&self) -> String {
        self.tokens
            .iter()
            .filter(|t| t.is_valid())
            .map(|t| t.content.as_str())
            .collect()
    }
}

impl std::ops::Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
