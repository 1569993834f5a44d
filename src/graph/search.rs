//! Priority-ordered backtracking search.
//!
//! At every (remaining path, node) pair the alternatives are tried in a
//! fixed order and the first success wins:
//!
//! 1. end of path at a terminal
//! 2. prune when fewer tokens remain than the node's height
//! 3. `$WORD` priority literal
//! 4. `#` zero-or-more, empty span first
//! 5. `_` one-or-more
//! 6. literal word (this is where `<THAT>`/`<TOPIC>` switch segments)
//! 7. `<SET>` membership, longest phrase wins
//! 8. shortcut terminal standing in for `<THAT> * <TOPIC> *`
//! 9. `^` zero-or-more, empty span first
//! 10. `*` one-or-more
//!
//! Non-empty wildcard expansion takes the shortest span that lets the rest
//! of the pattern match, and never crosses a segment marker. Set matching is
//! the exception: every candidate length up to the set's longest phrase is
//! tried and the longest success is kept.

use crate::bindings::{Segment, StarBindings};
use crate::config::GraphConfig;
use crate::path::{self, CARET, SHARP, STAR, THAT, TOPIC, UNDERSCORE, is_segment_marker};
use crate::sets::SetRegistry;

use super::node::Node;

/// Position in the query plus the wildcard slot the next capture fills.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    pos: usize,
    segment: Segment,
    star: usize,
}

impl Cursor {
    /// Continue at `pos` with the next capture slot of the same segment.
    fn after_capture(self, pos: usize) -> Self {
        Self {
            pos,
            segment: self.segment,
            star: self.star + 1,
        }
    }
}

#[derive(Debug)]
struct Capture {
    segment: Segment,
    index: usize,
    words: String,
}

/// A terminal reached by the search, with the captures made on the way.
/// Captures are added while the recursion unwinds, so only frames on the
/// successful path contribute.
#[derive(Debug)]
struct Found<'a> {
    node: &'a Node,
    captures: Vec<Capture>,
}

impl<'a> Found<'a> {
    fn at(node: &'a Node) -> Self {
        Self {
            node,
            captures: Vec::new(),
        }
    }

    fn into_bindings(self) -> StarBindings {
        let mut slots: [Vec<Option<String>>; 3] = Default::default();
        for capture in self.captures {
            let slot = &mut slots[match capture.segment {
                Segment::Input => 0,
                Segment::That => 1,
                Segment::Topic => 2,
            }];
            if slot.len() <= capture.index {
                slot.resize(capture.index + 1, None);
            }
            slot[capture.index] = Some(capture.words);
        }
        StarBindings::from_slots(slots)
    }
}

/// One search over one query path.
pub(crate) struct Search<'a> {
    tokens: &'a [String],
    sets: &'a dyn SetRegistry,
    max_stars: usize,
    null_star: &'a str,
    steps: u64,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        tokens: &'a [String],
        sets: &'a dyn SetRegistry,
        config: &'a GraphConfig,
    ) -> Self {
        Self {
            tokens,
            sets,
            max_stars: config.max_stars,
            null_star: &config.null_star,
            steps: 0,
        }
    }

    /// Search from `root`. Returns the terminal found (if any) with its
    /// bindings, and the number of search steps taken.
    pub(crate) fn run(mut self, root: &'a Node) -> (Option<(&'a Node, StarBindings)>, u64) {
        let start = Cursor {
            pos: 0,
            segment: Segment::Input,
            star: 0,
        };
        let found = self
            .search(root, start)
            .map(|found| (found.node, found.into_bindings()));
        (found, self.steps)
    }

    fn bind(&self, found: &mut Found<'a>, segment: Segment, index: usize, words: String) {
        if index < self.max_stars {
            found.captures.push(Capture {
                segment,
                index,
                words: words.trim().to_string(),
            });
        }
    }

    fn search(&mut self, node: &'a Node, at: Cursor) -> Option<Found<'a>> {
        self.steps += 1;
        let remaining = self.tokens.len() - at.pos;
        if remaining == 0 && node.is_terminal() {
            return Some(Found::at(node));
        }
        if remaining < node.height {
            return None;
        }
        if let Some(found) = self.priority_word(node, at) {
            return Some(found);
        }
        if let Some(found) = self.zero_or_more(node, at, SHARP) {
            return Some(found);
        }
        if let Some(found) = self.one_or_more(node, at, UNDERSCORE) {
            return Some(found);
        }
        if let Some(found) = self.word(node, at) {
            return Some(found);
        }
        if let Some(found) = self.set(node, at) {
            return Some(found);
        }
        if let Some(found) = self.shortcut(node, at) {
            return Some(found);
        }
        if let Some(found) = self.zero_or_more(node, at, CARET) {
            return Some(found);
        }
        if let Some(found) = self.one_or_more(node, at, STAR) {
            return Some(found);
        }
        tracing::trace!(pos = at.pos, segment = %at.segment, "match failed");
        None
    }

    fn priority_word(&mut self, node: &'a Node, at: Cursor) -> Option<Found<'a>> {
        let word = self.tokens.get(at.pos)?;
        let child = node.get(&format!("${}", word.to_uppercase()))?;
        self.search(child, Cursor { pos: at.pos + 1, ..at })
    }

    fn word(&mut self, node: &'a Node, at: Cursor) -> Option<Found<'a>> {
        let word = self.tokens.get(at.pos)?.to_uppercase();
        let child = node.get(&word)?;
        let next = match word.as_str() {
            THAT => Cursor {
                pos: at.pos + 1,
                segment: Segment::That,
                star: 0,
            },
            TOPIC => Cursor {
                pos: at.pos + 1,
                segment: Segment::Topic,
                star: 0,
            },
            _ => Cursor { pos: at.pos + 1, ..at },
        };
        self.search(child, next)
    }

    /// `#` or `^`: bind the empty span first, then fall back to a non-empty one.
    fn zero_or_more(&mut self, node: &'a Node, at: Cursor, wildcard: &str) -> Option<Found<'a>> {
        let child = node.get(wildcard)?;
        if let Some(mut found) = self.search(child, at.after_capture(at.pos)) {
            self.bind(&mut found, at.segment, at.star, self.null_star.to_string());
            return Some(found);
        }
        self.one_or_more(node, at, wildcard)
    }

    /// Shortest non-empty span that lets the rest of the path match.
    fn one_or_more(&mut self, node: &'a Node, at: Cursor, wildcard: &str) -> Option<Found<'a>> {
        let word = self.tokens.get(at.pos)?;
        if is_segment_marker(word) {
            return None;
        }
        let child = node.get(wildcard)?;
        let tail = &self.tokens[at.pos..];

        // A bare terminal below the wildcard takes the whole remainder.
        if child.is_terminal()
            && !child.shortcut
            && child.child_count() == 0
            && !tail.iter().any(|t| is_segment_marker(t))
        {
            let mut found = Found::at(child);
            self.bind(&mut found, at.segment, at.star, path::sentence(tail));
            return Some(found);
        }

        for end in at.pos + 1..=self.tokens.len() {
            if let Some(mut found) = self.search(child, at.after_capture(end)) {
                self.bind(
                    &mut found,
                    at.segment,
                    at.star,
                    path::sentence(&self.tokens[at.pos..end]),
                );
                return Some(found);
            }
            if self.tokens.get(end).is_some_and(|t| is_segment_marker(t)) {
                break;
            }
        }
        None
    }

    /// Longest phrase, up to each set's maximum length, that is a member and
    /// lets the rest of the path match.
    fn set(&mut self, node: &'a Node, at: Cursor) -> Option<Found<'a>> {
        if node.sets.is_empty() {
            return None;
        }
        let word = self.tokens.get(at.pos)?;
        if is_segment_marker(word) {
            return None;
        }
        for name in &node.sets {
            let Some(child) = node.get(&path::set_key(name)) else {
                continue;
            };
            let Some(max_length) = self.sets.max_length(name) else {
                continue;
            };
            let mut best = None;
            for length in 1..=max_length {
                let end = at.pos + length;
                if end > self.tokens.len() || is_segment_marker(&self.tokens[end - 1]) {
                    break;
                }
                let words = path::sentence(&self.tokens[at.pos..end]);
                if !self.sets.contains(name, &words.to_uppercase()) {
                    continue;
                }
                if let Some(mut found) = self.search(child, at.after_capture(end)) {
                    self.bind(&mut found, at.segment, at.star, words);
                    best = Some(found);
                }
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }

    /// A shortcut terminal swallows `<THAT> that <TOPIC> topic` whole.
    fn shortcut(&mut self, node: &'a Node, at: Cursor) -> Option<Found<'a>> {
        if !node.shortcut || !node.is_terminal() || self.tokens.get(at.pos)? != THAT {
            return None;
        }
        let tail = &self.tokens[at.pos + 1..];
        let (that, topic) = match tail.iter().position(|t| t == TOPIC) {
            Some(i) => (path::sentence(&tail[..i]), path::sentence(&tail[i + 1..])),
            None => (path::sentence(tail), String::new()),
        };
        let mut found = Found::at(node);
        self.bind(&mut found, Segment::That, 0, that);
        self.bind(&mut found, Segment::Topic, 0, topic);
        Some(found)
    }
}
