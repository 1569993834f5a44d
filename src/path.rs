//! Token paths: the word sequence a pattern or a query is matched as.
//!
//! A rule and a live query are both flattened into one sentence of the form
//! `input <THAT> that <TOPIC> topic` and split on single spaces. Every
//! position of a [`Path`] knows how many tokens remain from it onwards, which
//! is what the search compares against a node's height when pruning.

use std::fmt;

/// Segment marker separating the input from the previous bot utterance.
pub const THAT: &str = "<THAT>";
/// Segment marker separating the previous bot utterance from the topic.
pub const TOPIC: &str = "<TOPIC>";

/// Zero-or-more wildcard, high priority tier.
pub const SHARP: &str = "#";
/// One-or-more wildcard, high priority tier.
pub const UNDERSCORE: &str = "_";
/// Zero-or-more wildcard, low priority tier.
pub const CARET: &str = "^";
/// One-or-more wildcard, low priority tier. The universal catch-all.
pub const STAR: &str = "*";

const SET_OPEN: &str = "<SET>";
const SET_CLOSE: &str = "</SET>";

/// The tail a shortcut terminal stands in for.
pub(crate) const SHORTCUT_TAIL: [&str; 4] = [THAT, STAR, TOPIC, STAR];

/// What a single token means to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// A plain word, matched case-insensitively.
    Word,
    /// `$WORD`: a literal that outranks every wildcard.
    PriorityWord,
    /// `#`
    ZeroOrMoreHigh,
    /// `_`
    OneOrMoreHigh,
    /// `^`
    ZeroOrMoreLow,
    /// `*`
    OneOrMoreLow,
    /// `<THAT>` or `<TOPIC>`.
    SegmentMarker,
    /// `<SET>name</SET>`
    SetRef,
}

impl TokenClass {
    /// Classify a pattern token.
    pub fn of(token: &str) -> Self {
        match token {
            SHARP => TokenClass::ZeroOrMoreHigh,
            UNDERSCORE => TokenClass::OneOrMoreHigh,
            CARET => TokenClass::ZeroOrMoreLow,
            STAR => TokenClass::OneOrMoreLow,
            THAT | TOPIC => TokenClass::SegmentMarker,
            t if set_name(t).is_some() => TokenClass::SetRef,
            t if t.len() > 1 && t.starts_with('$') => TokenClass::PriorityWord,
            _ => TokenClass::Word,
        }
    }

    /// Wildcards of any tier.
    pub fn is_wildcard(self) -> bool {
        matches!(
            self,
            TokenClass::ZeroOrMoreHigh
                | TokenClass::OneOrMoreHigh
                | TokenClass::ZeroOrMoreLow
                | TokenClass::OneOrMoreLow
        )
    }

    /// Cost this token's edge contributes to a node's height.
    pub fn edge_cost(self) -> usize {
        match self {
            TokenClass::ZeroOrMoreHigh | TokenClass::ZeroOrMoreLow => 0,
            _ => 1,
        }
    }
}

/// `true` for `<THAT>` and `<TOPIC>`.
pub fn is_segment_marker(token: &str) -> bool {
    token == THAT || token == TOPIC
}

/// Extract the set name from a `<SET>name</SET>` token (tags matched
/// case-insensitively). The returned name keeps the token's casing.
pub fn set_name(token: &str) -> Option<&str> {
    let open = token.get(..SET_OPEN.len())?;
    let close_at = token.len().checked_sub(SET_CLOSE.len())?;
    let close = token.get(close_at..)?;
    if close_at < SET_OPEN.len()
        || !open.eq_ignore_ascii_case(SET_OPEN)
        || !close.eq_ignore_ascii_case(SET_CLOSE)
    {
        return None;
    }
    let name = &token[SET_OPEN.len()..close_at];
    if name.is_empty() { None } else { Some(name) }
}

/// Edge key under which a set reference is stored in the graph.
pub fn set_key(name: &str) -> String {
    format!("{SET_OPEN}{}{SET_CLOSE}", name.to_uppercase())
}

/// Flatten the three segments into `input <THAT> that <TOPIC> topic`.
pub fn input_that_topic(input: &str, that: &str, topic: &str) -> String {
    format!("{} {THAT} {} {TOPIC} {}", input.trim(), that.trim(), topic.trim())
}

/// Space-join a run of tokens back into a sentence.
pub fn sentence(tokens: &[String]) -> String {
    tokens.join(" ").trim().to_string()
}

/// An immutable tokenized sentence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    words: Vec<String>,
}

impl Path {
    /// Split a sentence on single spaces after trimming it.
    ///
    /// An empty sentence yields a path holding one empty token rather than
    /// an error; callers that care must trim and check upstream.
    pub fn from_sentence(sentence: &str) -> Self {
        Self {
            words: sentence.trim().split(' ').map(str::to_string).collect(),
        }
    }

    /// Build the combined three-segment path.
    ///
    /// An empty `that` or `topic` still contributes one empty token after
    /// its marker. An empty input contributes nothing, so the path starts at
    /// `<THAT>` and no one-or-more wildcard can match it.
    pub fn from_segments(input: &str, that: &str, topic: &str) -> Self {
        let mut words = Vec::new();
        let input = input.trim();
        if !input.is_empty() {
            words.extend(input.split(' ').map(str::to_string));
        }
        for (marker, segment) in [(THAT, that), (TOPIC, topic)] {
            words.push(marker.to_string());
            words.extend(segment.trim().split(' ').map(str::to_string));
        }
        Self { words }
    }

    /// The inverse of [`Path::from_sentence`].
    pub fn to_sentence(&self) -> String {
        sentence(&self.words)
    }

    /// All tokens in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Tokens from `at` to the end.
    pub fn suffix(&self, at: usize) -> &[String] {
        self.words.get(at..).unwrap_or(&[])
    }

    /// Number of tokens remaining from position `at`, inclusive.
    pub fn remaining(&self, at: usize) -> usize {
        self.words.len().saturating_sub(at)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sentence())
    }
}

/// `true` if `tail` is exactly `<THAT> * <TOPIC> *`.
pub(crate) fn is_shortcut_tail(tail: &[String]) -> bool {
    tail.len() == SHORTCUT_TAIL.len() && tail.iter().zip(SHORTCUT_TAIL).all(|(a, b)| a == b)
}
