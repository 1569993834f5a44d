//! Categories: the pattern → template rules stored at graph terminals.
//!
//! A [`Category`] is created by a loader, inserted into one or more graphs
//! behind an `Arc`, and shared by every graph that holds it. The activation
//! counter and example-input set are the only state touched after
//! construction, and both are safe to update from concurrent matches.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::error::CategoryError;
use crate::path::{STAR, input_that_topic};

/// Source label used when a category does not say where it came from.
pub const UNKNOWN_SOURCE: &str = "unknown.aiml";

static CATEGORY_COUNT: AtomicU64 = AtomicU64::new(0);

/// A (pattern, that, topic) → template rule.
#[derive(Debug)]
pub struct Category {
    pattern: String,
    that: String,
    topic: String,
    template: String,
    source: String,
    /// Load order, unique across the process.
    number: u64,
    activations: AtomicU64,
    examples: Mutex<BTreeSet<String>>,
}

fn normalize(segment: &str) -> String {
    segment.trim().to_uppercase()
}

impl Category {
    /// A category matching `pattern` under any `that` and `topic`.
    pub fn new(pattern: &str, template: impl Into<String>) -> Self {
        Self {
            pattern: normalize(pattern),
            that: STAR.to_string(),
            topic: STAR.to_string(),
            template: template.into(),
            source: UNKNOWN_SOURCE.to_string(),
            number: CATEGORY_COUNT.fetch_add(1, AtomicOrdering::Relaxed) + 1,
            activations: AtomicU64::new(0),
            examples: Mutex::new(BTreeSet::new()),
        }
    }

    /// Restrict to a previous bot utterance.
    pub fn with_that(mut self, that: &str) -> Self {
        self.that = normalize(that);
        self
    }

    /// Restrict to a topic.
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = normalize(topic);
        self
    }

    /// Record which rule file this category was loaded from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Resume an activation count carried over from an earlier run.
    pub fn with_activations(self, count: u64) -> Self {
        self.activations.store(count, AtomicOrdering::Relaxed);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn that(&self) -> &str {
        &self.that
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Monotonic load-order number, for stable sorting.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// `pattern <THAT> that <TOPIC> topic`
    pub fn input_that_topic(&self) -> String {
        input_that_topic(&self.pattern, &self.that, &self.topic)
    }

    pub fn activation_count(&self) -> u64 {
        self.activations.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn record_activation(&self) {
        self.activations.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Remember an input that matched this category. Once `bound` distinct
    /// inputs are held, new ones are ignored.
    pub(crate) fn record_example(&self, input: &str, bound: usize) {
        let mut examples = self.examples.lock().expect("example set lock poisoned");
        if examples.len() < bound || examples.contains(input) {
            examples.insert(input.to_string());
        }
    }

    /// Distinct inputs that matched this category, in sorted order.
    pub fn examples(&self) -> Vec<String> {
        self.examples
            .lock()
            .expect("example set lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Structural checks a loader runs before inserting.
    pub fn validate(&self) -> Result<(), CategoryError> {
        for (segment, value) in [
            ("pattern", &self.pattern),
            ("that", &self.that),
            ("topic", &self.topic),
        ] {
            if value.is_empty() {
                return Err(CategoryError::EmptySegment { segment });
            }
        }
        if !self.source.ends_with(".aiml") {
            return Err(CategoryError::SourceSuffix {
                source_label: self.source.clone(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for Category {}

/// Most-activated first.
pub fn by_activation(a: &Category, b: &Category) -> Ordering {
    b.activation_count().cmp(&a.activation_count())
}

/// Alphabetical on the full path, ignoring case.
pub fn by_pattern(a: &Category, b: &Category) -> Ordering {
    a.input_that_topic()
        .to_lowercase()
        .cmp(&b.input_that_topic().to_lowercase())
}

/// Load order.
pub fn by_number(a: &Category, b: &Category) -> Ordering {
    a.number.cmp(&b.number)
}
