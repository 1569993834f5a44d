// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # graphmaster
//!
//! A pattern-matching engine for conversational rule corpora. Each rule
//! (a [`Category`](category::Category)) is keyed on the user's input, the
//! bot's previous utterance (`that`) and the current topic. The engine
//! finds the single best rule for a live triple in one walk of a shared
//! word trie.
//!
//! ## Architecture
//!
//! - **Paths** (`path`): the tokenized `input <THAT> that <TOPIC> topic` form
//! - **Graph** (`graph`): the trie, its insertion, and its priority-ordered
//!   backtracking search
//! - **Sets and properties** (`sets`, `properties`): the named phrase sets and
//!   bot properties a pattern may reference
//! - **Engine** (`engine`): a main graph plus learned-rule graphs sharing one
//!   context
//!
//! ## Library usage
//!
//! ```
//! use graphmaster::category::Category;
//! use graphmaster::config::GraphConfig;
//! use graphmaster::engine::Engine;
//!
//! let engine = Engine::new(GraphConfig::default()).unwrap();
//! engine.add_category(Category::new("I LIKE *", "Why do you like <star/>?")).unwrap();
//! let m = engine.respond("I like pizza", "unknown", "unknown").unwrap();
//! assert_eq!(m.bindings.input, vec!["pizza"]);
//! ```

pub mod bindings;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod path;
pub mod properties;
pub mod sets;

pub use bindings::{Segment, StarBindings};
pub use category::Category;
pub use config::GraphConfig;
pub use engine::Engine;
pub use error::{GmResult, GraphmasterError};
pub use graph::{Graphmaster, Match, SharedGraphmaster};
