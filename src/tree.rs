//! Token, sentence and node types for loaded dependency trees
//!
//! A sentence stores its tokens in document order at offsets 1, 2, ...;
//! in well-formed input the token with CoNLL-U ID *k* sits at offset *k*.
//! Offset 0 is the synthetic root, which is not a token and is represented
//! by [`Node::Root`].

/// Placeholder used by CoNLL-U for an empty column
pub const NO_VALUE: &str = "_";

/// Position of a token within its sentence (1-based; 0 is the root)
pub type TokenId = usize;

/// One token line of a CoNLL-U file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    /// FEATS split on `|`. An unannotated column yields `["_"]`.
    pub feats: Vec<String>,
    /// HEAD column: ID of the governor, 0 for the root
    pub head: TokenId,
    pub deprel: String,
    /// DEPS split on `|`, same placeholder rule as `feats`
    pub deps: Vec<String>,
    pub misc: String,
    pub sent_id: String,
    /// Slot of the owning sentence in the treebank
    pub(crate) sentence: usize,
    /// Position within the owning sentence. Equals `id` unless lines of
    /// the sentence were dropped while parsing.
    pub(crate) offset: usize,
}

impl Token {
    /// True unless FEATS is the `_` placeholder
    pub fn has_features(&self) -> bool {
        !(self.feats.len() == 1 && self.feats[0] == NO_VALUE)
    }

    /// Value of a `Key=Value` feature
    pub fn feature(&self, key: &str) -> Option<&str> {
        lookup_pair(self.feats.iter().map(String::as_str), key)
    }

    /// Value of a `Key=Value` entry in the MISC column
    pub fn misc_value(&self, key: &str) -> Option<&str> {
        lookup_pair(self.misc.split('|'), key)
    }

    /// True if this token attaches directly to the root
    pub fn is_root_child(&self) -> bool {
        self.head == 0
    }

    /// Slot of the owning sentence in the treebank
    pub fn sentence_slot(&self) -> usize {
        self.sentence
    }

    /// Position within the owning sentence (1-based)
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Identity within a treebank: sentence slot and offset
    #[inline]
    pub(crate) fn key(&self) -> (usize, usize) {
        (self.sentence, self.offset)
    }
}

fn lookup_pair<'a>(mut pairs: impl Iterator<Item = &'a str>, key: &str) -> Option<&'a str> {
    pairs.find_map(|pair| match pair.split_once('=') {
        Some((k, v)) if k == key => Some(v),
        _ => None,
    })
}

/// A position in a sentence: either the synthetic root or a real token
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Root,
    Token(&'a Token),
}

impl<'a> Node<'a> {
    pub fn is_root(&self) -> bool {
        matches!(self, Node::Root)
    }

    pub fn token(&self) -> Option<&'a Token> {
        match self {
            Node::Root => None,
            Node::Token(t) => Some(t),
        }
    }

    /// CoNLL-U ID (0 for the root)
    pub fn id(&self) -> TokenId {
        match self {
            Node::Root => 0,
            Node::Token(t) => t.id,
        }
    }

    /// Position within the sentence (0 for the root)
    pub fn offset(&self) -> usize {
        match self {
            Node::Root => 0,
            Node::Token(t) => t.offset,
        }
    }
}

// Two tokens are the same node when they occupy the same slot and
// offset, regardless of annotation content.
impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Root, Node::Root) => true,
            (Node::Token(a), Node::Token(b)) => a.key() == b.key(),
            _ => false,
        }
    }
}

impl Eq for Node<'_> {}

/// The tokens sharing one sentence identifier
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pub sent_id: String,
    tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(sent_id: &str) -> Self {
        Self {
            sent_id: sent_id.to_string(),
            tokens: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Number of real tokens (the root is not counted)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Node at a position: 0 is the root, `1..=len()` are tokens
    pub fn get(&self, position: usize) -> Option<Node<'_>> {
        match position {
            0 => Some(Node::Root),
            p => self.tokens.get(p - 1).map(Node::Token),
        }
    }

    /// Token at a position, `None` for the root or out of range
    pub fn token(&self, position: usize) -> Option<&Token> {
        position
            .checked_sub(1)
            .and_then(|offset| self.tokens.get(offset))
    }

    /// Tokens in positional order, without the root
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
