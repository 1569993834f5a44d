//! Rich diagnostic error types for the graphmaster engine.
//!
//! Matching and insertion never fail: a missing match is an ordinary
//! `None`, and duplicate insertion overwrites. What can fail is the ambient
//! plumbing around the trie: loading configuration and validating categories
//! before they are handed to a graph.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the graphmaster crate.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphmasterError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Category(#[from] CategoryError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read graph config: {path}")]
    #[diagnostic(
        code(graphmaster::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph config {path}: {message}")]
    #[diagnostic(
        code(graphmaster::config::parse),
        help("Check the TOML syntax. Unknown keys are ignored; missing keys take their defaults.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write graph config: {path}")]
    #[diagnostic(
        code(graphmaster::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph configuration: {message}")]
    #[diagnostic(code(graphmaster::config::invalid), help("Check the GraphConfig fields. {message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Category errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CategoryError {
    #[error("badly formatted <{segment}>: zero length")]
    #[diagnostic(
        code(graphmaster::category::empty_segment),
        help(
            "Every category needs a non-empty pattern, that and topic. \
             Use `*` for a segment that should match anything."
        )
    )]
    EmptySegment { segment: &'static str },

    #[error("category source \"{source_label}\" should end in .aiml")]
    #[diagnostic(
        code(graphmaster::category::source_suffix),
        help("Source labels identify the rule file a category was loaded from, e.g. `greetings.aiml`.")
    )]
    SourceSuffix { source_label: String },
}

/// Convenience result type for the crate.
pub type GmResult<T> = std::result::Result<T, GraphmasterError>;
