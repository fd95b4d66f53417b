//! Ordered token sequences with their declared query kind.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::tokens::Token;

/// The declared kind of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Find,
    Save,
    Delete,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            QueryKind::Find => write!(f, "find"),
            QueryKind::Save => write!(f, "save"),
            QueryKind::Delete => write!(f, "delete"),
        }
    }
}

/// Options attached to a query by the builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Force a save of an entity with a non auto generated key into an
    /// UPDATE. Without it such saves compile to INSERT.
    pub save_type: Option<SaveType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveType {
    Insert,
    Update,
}

/// An ordered token sequence describing one query.
///
/// Tokens are consumed exactly once, front to back, by a single
/// interpretation; a sequence cannot be replayed.
#[derive(Debug)]
pub struct TokenSequence {
    kind: QueryKind,
    entity: String,
    tokens: VecDeque<Token>,
    includes: IndexMap<String, String>,
    options: QueryOptions,
}

impl TokenSequence {
    pub fn new(kind: QueryKind, entity: impl Into<String>) -> Self {
        TokenSequence {
            kind,
            entity: entity.into(),
            tokens: VecDeque::new(),
            includes: IndexMap::new(),
            options: QueryOptions::default(),
        }
    }

    /// Append a token to the sequence.
    pub fn push(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.push(token);
        self
    }

    /// Declare a joined relationship: `alias` names the column prefix, the
    /// value the related entity.
    pub fn include(mut self, alias: impl Into<String>, entity: impl Into<String>) -> Self {
        self.includes.insert(alias.into(), entity.into());
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn includes(&self) -> &IndexMap<String, String> {
        &self.includes
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Pull the next token off the front of the sequence.
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }
}
