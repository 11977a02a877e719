//! Navigation over loaded dependency trees
//!
//! All queries borrow the [`Treebank`] and never modify it. Structural
//! faults in the data (a HEAD pointing past the end of its sentence, a
//! governor cycle) come back as [`QueryError`] so that a batch search can
//! skip the offending token and carry on; see [`Treebank::search`].

use crate::tree::{Node, Sentence, Token, TokenId};
use crate::treebank::Treebank;
use thiserror::Error;
use tracing::debug;

/// Structural fault found while navigating a tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(
        "Query error: governor {head} of token {id} in sentence {sent_id:?} is out of range ({len} tokens)"
    )]
    GovernorOutOfRange {
        sent_id: String,
        id: TokenId,
        head: TokenId,
        len: usize,
    },

    #[error("Query error: root of sentence {sent_id:?} has no governor")]
    RootHasNoGovernor { sent_id: String },

    #[error("Query error: governor chain of token {id} in sentence {sent_id:?} has a cycle")]
    Cycle { sent_id: String, id: TokenId },

    #[error("Query error: token {id} of sentence {sent_id:?} is not in this treebank")]
    UnknownToken { sent_id: String, id: TokenId },
}

impl Treebank {
    /// The sentence a token belongs to, `None` for a token that did not
    /// come from this treebank
    pub fn sentence_of(&self, t: &Token) -> Option<&Sentence> {
        let sentence = self.sentences().get(t.sentence)?;
        let home = sentence.token(t.offset)?;
        (std::ptr::eq(home, t) || home == t).then_some(sentence)
    }

    fn home_of(&self, t: &Token) -> Result<&Sentence, QueryError> {
        self.sentence_of(t).ok_or_else(|| QueryError::UnknownToken {
            sent_id: t.sent_id.clone(),
            id: t.id,
        })
    }

    /// The governor of a token: the node at position `t.head`
    pub fn governor_of(&self, t: &Token) -> Result<Node<'_>, QueryError> {
        let sentence = self.home_of(t)?;
        sentence
            .get(t.head)
            .ok_or_else(|| QueryError::GovernorOutOfRange {
                sent_id: t.sent_id.clone(),
                id: t.id,
                head: t.head,
                len: sentence.len(),
            })
    }

    /// The governor of the governor of a token
    pub fn grandgovernor_of(&self, t: &Token) -> Result<Node<'_>, QueryError> {
        match self.governor_of(t)? {
            Node::Root => Err(QueryError::RootHasNoGovernor {
                sent_id: t.sent_id.clone(),
            }),
            Node::Token(gov) => self.governor_of(gov),
        }
    }

    /// The token immediately to the right
    pub fn right_of(&self, t: &Token) -> Option<&Token> {
        self.right_of_by(t, 1)
    }

    /// The token `n` positions to the right, if inside the sentence
    pub fn right_of_by(&self, t: &Token, n: usize) -> Option<&Token> {
        let position = t.id.checked_add(n)?;
        self.sentence_of(t)?.token(position)
    }

    /// The token immediately to the left
    pub fn left_of(&self, t: &Token) -> Option<&Token> {
        self.left_of_by(t, 1)
    }

    /// The token `n` positions to the left. Position 0 (the root) counts
    /// as outside the sentence.
    pub fn left_of_by(&self, t: &Token, n: usize) -> Option<&Token> {
        let position = t.id.checked_sub(n).filter(|&p| p > 0)?;
        self.sentence_of(t)?.token(position)
    }

    /// True if `governor_of(c)` is the token at `t`'s offset. A faulty
    /// HEAD on `c` is simply not a match.
    fn is_governed_by(&self, c: &Token, t: &Token) -> bool {
        matches!(self.governor_of(c), Ok(Node::Token(g)) if g.key() == t.key())
    }

    /// Direct dependents of a token, in positional order
    pub fn children_of(&self, t: &Token) -> Vec<&Token> {
        let Some(sentence) = self.sentence_of(t) else {
            return Vec::new();
        };
        sentence
            .tokens()
            .iter()
            .filter(|c| self.is_governed_by(c, t))
            .collect()
    }

    /// Other dependents of the same governor, in positional order
    pub fn siblings_of(&self, t: &Token) -> Vec<&Token> {
        let (Some(sentence), Ok(gov)) = (self.sentence_of(t), self.governor_of(t)) else {
            return Vec::new();
        };
        sentence
            .tokens()
            .iter()
            .filter(|s| s.key() != t.key() && self.governor_of(s).is_ok_and(|g| g == gov))
            .collect()
    }

    /// All tokens dominated by `t`, in positional order, `t` excluded
    pub fn descendants_of(&self, t: &Token) -> Vec<&Token> {
        let Some(sentence) = self.sentence_of(t) else {
            return Vec::new();
        };
        // indexed by offset
        let mut seen = vec![false; sentence.len() + 1];
        seen[t.offset] = true;
        let mut stack = vec![t];

        while let Some(current) = stack.pop() {
            for child in sentence.tokens() {
                if !seen[child.offset] && self.is_governed_by(child, current) {
                    seen[child.offset] = true;
                    stack.push(child);
                }
            }
        }

        sentence
            .tokens()
            .iter()
            .filter(|d| d.offset != t.offset && seen[d.offset])
            .collect()
    }

    /// `[t, governor, governor of governor, ..., Root]`
    ///
    /// Fails with [`QueryError::Cycle`] instead of looping when the
    /// governor chain never reaches the root.
    pub fn ancestor_chain_of<'a>(&'a self, t: &'a Token) -> Result<Vec<Node<'a>>, QueryError> {
        let limit = self.home_of(t)?.len();
        let mut chain = vec![Node::Token(t)];
        let mut current = t;

        // an acyclic chain visits at most every token once before the root
        for _ in 0..=limit {
            match self.governor_of(current)? {
                Node::Root => {
                    chain.push(Node::Root);
                    return Ok(chain);
                }
                Node::Token(gov) => {
                    chain.push(Node::Token(gov));
                    current = gov;
                }
            }
        }

        Err(QueryError::Cycle {
            sent_id: t.sent_id.clone(),
            id: t.id,
        })
    }

    /// Number of edges between `t` and the root
    pub fn depth_of(&self, t: &Token) -> Result<usize, QueryError> {
        Ok(self.ancestor_chain_of(t)?.len() - 1)
    }

    /// Token forms of a sentence in order
    pub fn surface_text_of(&self, sent_id: &str) -> Option<Vec<&str>> {
        self.sentence(sent_id)
            .map(|s| s.tokens().iter().map(|t| t.form.as_str()).collect())
    }

    /// Sentence text rebuilt from forms, honouring `SpaceAfter=No`
    pub fn sentence_text_of(&self, sent_id: &str) -> Option<String> {
        let sentence = self.sentence(sent_id)?;
        let mut text = String::new();
        let mut tokens = sentence.tokens().iter().peekable();
        while let Some(t) = tokens.next() {
            text.push_str(&t.form);
            if tokens.peek().is_some() && t.misc_value("SpaceAfter") != Some("No") {
                text.push(' ');
            }
        }
        Some(text)
    }

    /// Tokens satisfying a predicate, in corpus order
    pub fn find<'a, F>(&'a self, pred: F) -> impl Iterator<Item = &'a Token> + 'a
    where
        F: Fn(&Token) -> bool + 'a,
    {
        self.tokens().filter(move |t| pred(*t))
    }

    /// Tokens satisfying a fallible predicate, in corpus order.
    ///
    /// A predicate that fails for a token (say, because its governor is
    /// out of range) counts as no match; the search moves on.
    ///
    /// ```no_run
    /// use udexplore::Treebank;
    ///
    /// let treebank = Treebank::from_dir("conllu").unwrap();
    /// let objects: Vec<_> = treebank
    ///     .search(|tb, t| {
    ///         Ok(t.deprel == "obj"
    ///             && tb.governor_of(t)?.token().is_some_and(|g| g.lemma == "ⲉⲓⲣⲉ"))
    ///     })
    ///     .collect();
    /// ```
    pub fn search<'a, F>(&'a self, pred: F) -> impl Iterator<Item = &'a Token> + 'a
    where
        F: Fn(&Treebank, &Token) -> Result<bool, QueryError> + 'a,
    {
        self.tokens().filter(move |t| match pred(self, *t) {
            Ok(matched) => matched,
            Err(e) => {
                debug!(sent_id = %t.sent_id, id = t.id, error = %e, "skipping token");
                false
            }
        })
    }
}
