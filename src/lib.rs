//! udexplore: load Universal Dependencies treebanks and walk their trees
//!
//! A corpus of CoNLL-U files is read into an immutable [`Treebank`];
//! queries (governor, children, ancestors, linear neighbours, filtered
//! search) are methods on the treebank.

pub mod bytes; // Tab splitting and strict integer coercion
pub mod conllu; // sent_id stamping and token line parsing
pub mod corpus; // File discovery and document assembly
pub mod query; // Tree navigation
pub mod tree; // Token, Sentence and Node types
pub mod treebank; // Load pipeline and the Treebank container

// Re-exports for convenience
pub use conllu::{ParseError, ParseStats};
pub use corpus::LoadOptions;
pub use query::QueryError;
pub use tree::{Node, Sentence, Token, TokenId};
pub use treebank::{LoadStats, Treebank, TreebankError};
