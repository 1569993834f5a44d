//! Wildcard captures produced by a successful match.

use serde::{Deserialize, Serialize};

/// Which of the three segments of a path a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Input,
    That,
    Topic,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Input => write!(f, "input"),
            Segment::That => write!(f, "that"),
            Segment::Topic => write!(f, "topic"),
        }
    }
}

/// The word spans each wildcard (or set reference) consumed, per segment.
///
/// Index 0 of each list is the first wildcard of that segment, as the
/// template evaluator's `<star index="1"/>`, `<thatstar/>` and
/// `<topicstar/>` placeholders expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarBindings {
    pub input: Vec<String>,
    pub that: Vec<String>,
    pub topic: Vec<String>,
}

impl StarBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures of one segment.
    pub fn segment(&self, segment: Segment) -> &[String] {
        match segment {
            Segment::Input => &self.input,
            Segment::That => &self.that,
            Segment::Topic => &self.topic,
        }
    }

    /// 0-indexed capture lookup.
    pub fn get(&self, segment: Segment, index: usize) -> Option<&str> {
        self.segment(segment).get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.that.is_empty() && self.topic.is_empty()
    }

    /// Assemble bindings from slot arrays, stopping each list at its first
    /// unfilled slot.
    pub(crate) fn from_slots(slots: [Vec<Option<String>>; 3]) -> Self {
        let [input, that, topic] = slots.map(|s| s.into_iter().map_while(|w| w).collect());
        Self { input, that, topic }
    }
}
