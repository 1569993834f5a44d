//! The pattern graph ("Graphmaster").
//!
//! Every category is flattened into `pattern <THAT> that <TOPIC> topic` and
//! stored as a path of word-keyed edges from a shared root. Matching walks
//! the same structure with a priority-ordered backtracking search (see
//! [`search`]), pruning any branch whose cached height exceeds the tokens
//! left in the query.
//!
//! A `Graphmaster` is single-writer: insertion and deletion take
//! `&mut self`, matching takes `&self`. Wrap it in
//! [`SharedGraphmaster`](shared::SharedGraphmaster) to learn rules while
//! serving matches.

pub mod analytics;
pub mod node;
pub mod search;
pub mod shared;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bindings::StarBindings;
use crate::category::Category;
use crate::config::GraphConfig;
use crate::path::{self, Path, SHORTCUT_TAIL, TokenClass, is_shortcut_tail};
use crate::properties::{self, Properties, PropertySource};
use crate::sets::{SetCollection, SetRegistry};

pub use analytics::{GraphStats, Shadow};
pub use node::Node;
pub use shared::SharedGraphmaster;

/// The outcome of a successful match.
#[derive(Debug, Clone)]
pub struct Match {
    pub category: Arc<Category>,
    pub bindings: StarBindings,
}

/// Priority-ordered pattern trie over input/that/topic paths.
pub struct Graphmaster {
    name: String,
    config: GraphConfig,
    root: Node,
    properties: Arc<dyn PropertySource>,
    sets: Arc<dyn SetRegistry>,
    insertions: usize,
    upgrades: usize,
    /// Search steps taken across all matches.
    steps: AtomicU64,
}

impl std::fmt::Debug for Graphmaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graphmaster")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("insertions", &self.insertions)
            .field("upgrades", &self.upgrades)
            .finish_non_exhaustive()
    }
}

/// Read-only state threaded through a recursive insertion.
struct Insertion<'a> {
    category: &'a Arc<Category>,
    sets: &'a dyn SetRegistry,
    shortcuts: bool,
    fresh_height: usize,
}

impl Graphmaster {
    /// A graph with no bot properties and only the built-in sets.
    pub fn new(name: impl Into<String>, config: GraphConfig) -> Self {
        Self::with_context(
            name,
            config,
            Arc::new(Properties::new()),
            Arc::new(SetCollection::with_builtins()),
        )
    }

    /// A graph resolving `<bot name=".."/>` against `properties` and
    /// `<SET>` references against `sets`.
    pub fn with_context(
        name: impl Into<String>,
        config: GraphConfig,
        properties: Arc<dyn PropertySource>,
        sets: Arc<dyn SetRegistry>,
    ) -> Self {
        let name = name.into();
        tracing::info!(
            graph = %name,
            shortcuts = config.enable_shortcuts,
            max_stars = config.max_stars,
            "initializing pattern graph"
        );
        Self {
            root: Node::new(config.max_graph_height),
            name,
            config,
            properties,
            sets,
            insertions: 0,
            upgrades: 0,
            steps: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The set registry this graph matches `<SET>` edges against.
    pub fn set_registry(&self) -> &dyn SetRegistry {
        self.sets.as_ref()
    }

    /// Number of `insert` calls, duplicates included.
    pub fn insertions(&self) -> usize {
        self.insertions
    }

    /// Number of nodes upgraded from an inline child to a map.
    pub fn upgrades(&self) -> usize {
        self.upgrades
    }

    /// Search steps taken by all matches so far.
    pub fn match_steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }

    /// Flatten a rule's segments into its graph path, substituting bot
    /// properties.
    fn rule_path(&self, pattern: &str, that: &str, topic: &str) -> Path {
        let sentence = path::input_that_topic(pattern, that, topic);
        let sentence = properties::substitute(
            &sentence,
            self.properties.as_ref(),
            &self.config.default_property,
        );
        Path::from_sentence(&sentence)
    }

    /// Rule path for a caller-supplied triple, normalized like a category.
    fn lookup_path(&self, pattern: &str, that: &str, topic: &str) -> Path {
        self.rule_path(&pattern.to_uppercase(), &that.to_uppercase(), &topic.to_uppercase())
    }

    /// Add a category. A category already stored at the same path is
    /// replaced.
    pub fn insert(&mut self, category: Arc<Category>) {
        let path = self.rule_path(category.pattern(), category.that(), category.topic());
        let cx = Insertion {
            category: &category,
            sets: self.sets.as_ref(),
            shortcuts: self.config.enable_shortcuts,
            fresh_height: self.config.max_graph_height,
        };
        let upgrades = insert_path(&mut self.root, path.words(), &cx);
        self.upgrades += upgrades;
        self.insertions += 1;
        tracing::debug!(
            graph = %self.name,
            path = %path,
            number = category.number(),
            "inserted category"
        );
    }

    /// Convenience for building a category in place.
    pub fn add(&mut self, category: Category) -> Arc<Category> {
        let category = Arc::new(category);
        self.insert(Arc::clone(&category));
        category
    }

    /// Follow the literal path for a rule without expanding wildcards.
    fn find_node(&self, words: &[String]) -> Option<&Node> {
        let mut node = &self.root;
        for (pos, word) in words.iter().enumerate() {
            if node.shortcut && is_shortcut_tail(&words[pos..]) {
                return Some(node);
            }
            node = node.get(word)?;
        }
        Some(node)
    }

    fn find_node_mut(&mut self, words: &[String]) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for (pos, word) in words.iter().enumerate() {
            if node.shortcut && is_shortcut_tail(&words[pos..]) {
                return Some(node);
            }
            node = node.get_mut(word)?;
        }
        Some(node)
    }

    /// The category stored at exactly this (pattern, that, topic), with
    /// wildcards and set references treated as literal keys.
    pub fn find_exact(&self, pattern: &str, that: &str, topic: &str) -> Option<Arc<Category>> {
        let path = self.lookup_path(pattern, that, topic);
        let found = self.find_node(path.words()).and_then(|n| n.category.clone());
        tracing::trace!(graph = %self.name, path = %path, found = found.is_some(), "find_exact");
        found
    }

    /// Whether a live category occupies this exact path.
    pub fn exists(&self, pattern: &str, that: &str, topic: &str) -> bool {
        self.find_exact(pattern, that, topic).is_some()
    }

    /// Whether `category`'s own path holds a live category.
    pub fn contains(&self, category: &Category) -> bool {
        self.exists(category.pattern(), category.that(), category.topic())
    }

    /// Logically delete the category at this path. The nodes stay in place.
    pub fn delete(&mut self, pattern: &str, that: &str, topic: &str) -> Option<Arc<Category>> {
        let path = self.lookup_path(pattern, that, topic);
        let removed = self.find_node_mut(path.words()).and_then(|n| n.category.take());
        if let Some(ref c) = removed {
            tracing::debug!(
                graph = %self.name,
                path = %path,
                number = c.number(),
                "deleted category"
            );
        }
        removed
    }

    /// Delete the path of each given category; returns how many were live.
    pub fn delete_categories<'c>(
        &mut self,
        categories: impl IntoIterator<Item = &'c Arc<Category>>,
    ) -> usize {
        categories
            .into_iter()
            .filter(|c| self.delete(c.pattern(), c.that(), c.topic()).is_some())
            .count()
    }

    /// Find the best category for a live (input, that, topic) triple.
    ///
    /// On success the category's activation count is bumped and the full
    /// query is remembered among its example inputs. `None` means nothing
    /// matched, which callers handle with their own fallback.
    pub fn match_input(&self, input: &str, that: &str, topic: &str) -> Option<Match> {
        let path = Path::from_segments(input, that, topic);
        let found = self.search(&path);
        match &found {
            Some(m) => {
                m.category.record_activation();
                m.category
                    .record_example(&path.to_sentence(), self.config.max_example_inputs);
                tracing::trace!(
                    graph = %self.name,
                    query = %path,
                    matched = %m.category.input_that_topic(),
                    source = m.category.source(),
                    "matched"
                );
            }
            None => tracing::trace!(graph = %self.name, query = %path, "no match"),
        }
        found
    }

    /// Run the search without touching any category bookkeeping.
    pub(crate) fn search(&self, path: &Path) -> Option<Match> {
        let (found, steps) = search::Search::new(path.words(), self.sets.as_ref(), &self.config)
            .run(&self.root);
        self.steps.fetch_add(steps, Ordering::Relaxed);
        found.and_then(|(node, bindings)| {
            node.category.clone().map(|category| Match { category, bindings })
        })
    }
}

/// Recursive insertion. Returns the number of map upgrades performed.
fn insert_path(node: &mut Node, tail: &[String], cx: &Insertion<'_>) -> usize {
    let Some((word, rest)) = tail.split_first() else {
        node.category = Some(Arc::clone(cx.category));
        node.height = 0;
        return 0;
    };
    if cx.shortcuts && is_shortcut_tail(tail) {
        node.category = Some(Arc::clone(cx.category));
        node.height = node.height.min(SHORTCUT_TAIL.len());
        node.shortcut = true;
        return 0;
    }
    if let Some(name) = path::set_name(word) {
        if cx.sets.has_set(name) {
            node.register_set(&name.to_lowercase());
        } else {
            tracing::warn!(
                set = %name.to_lowercase(),
                source = cx.category.source(),
                "no set found for <set> reference"
            );
        }
    }
    let (child, upgraded) = node.child_or_insert(word, cx.fresh_height);
    let upgrades = insert_path(child, rest, cx) + usize::from(upgraded);
    let child_height = child.height;
    node.height = node
        .height
        .min(TokenClass::of(word).edge_cost() + child_height);
    upgrades
}
