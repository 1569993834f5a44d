//! Engine facade: the graphs a bot matches against, and runtime learning.
//!
//! The `Engine` owns the main rule graph (`brain`) plus two learned-rule
//! graphs. Rules learned at runtime go into the brain, so they take part in
//! matching at once, and are also tracked in `learn` (session rules) or
//! `learnf` (rules meant to outlive the session) so they can be forgotten
//! as a group. All three graphs share one property table and one set
//! registry.

use std::sync::Arc;

use serde::Serialize;

use crate::category::Category;
use crate::config::GraphConfig;
use crate::error::GmResult;
use crate::graph::{GraphStats, Graphmaster, Match, Shadow, SharedGraphmaster};
use crate::properties::Properties;
use crate::sets::SetCollection;

/// Source label given to rules learned for the session.
pub const LEARN_SOURCE: &str = "learn.aiml";
/// Source label given to rules learned persistently.
pub const LEARNF_SOURCE: &str = "learnf.aiml";

/// Main graph plus learned-rule graphs over shared properties and sets.
pub struct Engine {
    config: GraphConfig,
    properties: Arc<Properties>,
    sets: Arc<SetCollection>,
    brain: SharedGraphmaster,
    learn: SharedGraphmaster,
    learnf: SharedGraphmaster,
}

impl Engine {
    /// An engine with empty properties and only the built-in sets.
    pub fn new(config: GraphConfig) -> GmResult<Self> {
        Self::with_context(
            config,
            Arc::new(Properties::new()),
            Arc::new(SetCollection::with_builtins()),
        )
    }

    pub fn with_context(
        config: GraphConfig,
        properties: Arc<Properties>,
        sets: Arc<SetCollection>,
    ) -> GmResult<Self> {
        config.validate()?;
        tracing::info!(
            shortcuts = config.enable_shortcuts,
            sets = sets.len(),
            properties = properties.len(),
            "initializing graphmaster engine"
        );
        let graph = |name: &str| -> SharedGraphmaster {
            Graphmaster::with_context(name, config.clone(), properties.clone(), sets.clone()).into()
        };
        let (brain, learn, learnf) = (graph("brain"), graph("learn"), graph("learnf"));
        Ok(Self {
            brain,
            learn,
            learnf,
            config,
            properties,
            sets,
        })
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Bot properties substituted into patterns at insertion time.
    pub fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    pub fn sets(&self) -> &Arc<SetCollection> {
        &self.sets
    }

    pub fn brain(&self) -> &SharedGraphmaster {
        &self.brain
    }

    pub fn learned(&self) -> &SharedGraphmaster {
        &self.learn
    }

    pub fn learned_persistent(&self) -> &SharedGraphmaster {
        &self.learnf
    }

    /// Validate a loaded category and add it to the brain.
    pub fn add_category(&self, category: Category) -> GmResult<Arc<Category>> {
        category.validate()?;
        Ok(self.brain.add(category))
    }

    /// Validate and add a batch under a single write lock.
    pub fn add_categories(
        &self,
        categories: impl IntoIterator<Item = Category>,
    ) -> GmResult<Vec<Arc<Category>>> {
        let categories: Vec<Category> = categories.into_iter().collect();
        for category in &categories {
            category.validate()?;
        }
        let mut brain = self.brain.write();
        let added: Vec<_> = categories.into_iter().map(|c| brain.add(c)).collect();
        tracing::debug!(count = added.len(), "added categories to brain");
        Ok(added)
    }

    /// Learn a rule for this session.
    pub fn learn(&self, category: Category) -> GmResult<Arc<Category>> {
        self.learn_into(&self.learn, category.with_source(LEARN_SOURCE))
    }

    /// Learn a rule meant to be kept beyond this session.
    pub fn learnf(&self, category: Category) -> GmResult<Arc<Category>> {
        self.learn_into(&self.learnf, category.with_source(LEARNF_SOURCE))
    }

    fn learn_into(&self, graph: &SharedGraphmaster, category: Category) -> GmResult<Arc<Category>> {
        category.validate()?;
        let category = Arc::new(category);
        self.brain.insert(Arc::clone(&category));
        graph.insert(Arc::clone(&category));
        tracing::debug!(
            path = %category.input_that_topic(),
            source = category.source(),
            "learned category"
        );
        Ok(category)
    }

    /// Forget every session-learned rule. Returns how many were removed from
    /// the brain.
    pub fn forget_learned(&self) -> usize {
        self.forget(&self.learn)
    }

    /// Forget every persistently learned rule.
    pub fn forget_learnf(&self) -> usize {
        self.forget(&self.learnf)
    }

    /// Empty `graph` and delete its rules from the brain. A brain path that
    /// has since been taken over by another rule is left alone.
    fn forget(&self, graph: &SharedGraphmaster) -> usize {
        let learned = graph.reset();
        let mut brain = self.brain.write();
        let still_held: Vec<_> = learned
            .into_iter()
            .filter(|c| brain.find_exact(c.pattern(), c.that(), c.topic()).as_ref() == Some(c))
            .collect();
        let removed = brain.delete_categories(&still_held);
        tracing::debug!(graph = %brain.name(), removed, "forgot learned categories");
        removed
    }

    /// Match a live (input, that, topic) against the brain.
    pub fn respond(&self, input: &str, that: &str, topic: &str) -> Option<Match> {
        self.brain.match_input(input, that, topic)
    }

    /// Brain rules that never win their own instantiated pattern.
    pub fn shadow_check(&self) -> Vec<Shadow> {
        self.brain.read().shadow_check()
    }

    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            shortcuts: self.config.enable_shortcuts,
            max_stars: self.config.max_stars,
            set_count: self.sets.len(),
            property_count: self.properties.len(),
            brain: self.brain.stats(),
            learn: self.learn.stats(),
            learnf: self.learnf.stats(),
        }
    }
}

/// Summary of an engine's graphs.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub shortcuts: bool,
    pub max_stars: usize,
    pub set_count: usize,
    pub property_count: usize,
    pub brain: GraphStats,
    pub learn: GraphStats,
    pub learnf: GraphStats,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "graphmaster engine info")?;
        writeln!(f, "  shortcuts:    {}", self.shortcuts)?;
        writeln!(f, "  max stars:    {}", self.max_stars)?;
        writeln!(f, "  sets:         {}", self.set_count)?;
        writeln!(f, "  properties:   {}", self.property_count)?;
        writeln!(f, "  brain:        {}", self.brain)?;
        writeln!(f, "  learn:        {}", self.learn)?;
        writeln!(f, "  learnf:       {}", self.learnf)?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("brain", &self.brain)
            .field("learn", &self.learn)
            .field("learnf", &self.learnf)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CategoryError, GraphmasterError};
    use crate::sets::WordSet;

    fn engine() -> Engine {
        Engine::new(GraphConfig::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = GraphConfig {
            max_stars: 0,
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(GraphmasterError::Config(_))
        ));
    }

    #[test]
    fn add_category_validates() {
        let engine = engine();
        let bad = Category::new("HELLO", "").with_source("notes.txt");
        assert!(matches!(
            engine.add_category(bad),
            Err(GraphmasterError::Category(CategoryError::SourceSuffix { .. }))
        ));
        let c = engine.add_category(Category::new("HELLO", "Hi")).unwrap();
        assert_eq!(engine.respond("hello", "x", "y").unwrap().category, c);
    }

    #[test]
    fn batch_rejected_as_a_whole() {
        let engine = engine();
        let batch = vec![Category::new("A", ""), Category::new("", "")];
        assert!(engine.add_categories(batch).is_err());
        assert!(engine.brain().categories().is_empty());
        let added = engine
            .add_categories(vec![Category::new("A", ""), Category::new("B", "")])
            .unwrap();
        assert_eq!(added.len(), 2);
    }

    #[test]
    fn learned_rules_match_and_can_be_forgotten() {
        let engine = engine();
        engine.add_category(Category::new("*", "default")).unwrap();
        let learned = engine.learn(Category::new("MY NAME IS *", "Nice to meet you")).unwrap();
        assert_eq!(learned.source(), LEARN_SOURCE);
        assert_eq!(engine.respond("my name is ann", "x", "y").unwrap().category, learned);
        assert_eq!(engine.learned().categories(), vec![Arc::clone(&learned)]);

        assert_eq!(engine.forget_learned(), 1);
        assert!(engine.learned().categories().is_empty());
        let m = engine.respond("my name is ann", "x", "y").unwrap();
        assert_eq!(m.category.template(), "default");
    }

    #[test]
    fn forget_leaves_newer_brain_rules() {
        let engine = engine();
        engine.learn(Category::new("HELLO", "learned")).unwrap();
        let loaded = engine.add_category(Category::new("HELLO", "loaded")).unwrap();
        assert_eq!(engine.forget_learned(), 0);
        assert_eq!(engine.respond("hello", "x", "y").unwrap().category, loaded);
    }

    #[test]
    fn learn_and_learnf_are_independent() {
        let engine = engine();
        engine.learn(Category::new("A", "")).unwrap();
        let kept = engine.learnf(Category::new("B", "")).unwrap();
        assert_eq!(kept.source(), LEARNF_SOURCE);
        assert_eq!(engine.forget_learned(), 1);
        assert!(engine.respond("b", "x", "y").is_some());
        assert!(engine.respond("a", "x", "y").is_none());
        assert_eq!(engine.forget_learnf(), 1);
        assert!(engine.respond("b", "x", "y").is_none());
    }

    #[test]
    fn shared_context_reaches_every_graph() {
        let properties: Arc<Properties> = Arc::new([("name", "Alice")].into_iter().collect());
        let sets = Arc::new(SetCollection::with_builtins());
        sets.insert(WordSet::new("color", ["red", "green"]));
        let engine =
            Engine::with_context(GraphConfig::default(), properties, Arc::clone(&sets)).unwrap();
        engine
            .learn(Category::new(r#"IS <bot name="name"/> <set>color</set>"#, ""))
            .unwrap();
        let m = engine.respond("is alice green", "x", "y").unwrap();
        assert_eq!(m.bindings.input, vec!["green"]);
        let m = engine.learned().match_input("is alice red", "x", "y").unwrap();
        assert_eq!(m.bindings.input, vec!["red"]);
    }

    #[test]
    fn info_summarizes_graphs() {
        let engine = engine();
        engine.add_category(Category::new("HELLO", "")).unwrap();
        engine.learn(Category::new("BYE", "")).unwrap();
        let info = engine.info();
        assert_eq!(info.brain.categories, 2);
        assert_eq!(info.learn.categories, 1);
        assert_eq!(info.learnf.categories, 0);
        assert_eq!(info.set_count, 1);
        let text = info.to_string();
        assert!(text.contains("brain:        2 categories"));
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["learn"]["categories"], 1);
    }
}
