//! Aggregate operations over a whole graph: enumeration, statistics,
//! vocabulary, shadow checking, and a textual dump.
//!
//! None of these are used by matching itself; they exist for loaders,
//! authoring tools and diagnostics.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::category::{self, Category};
use crate::path::{self, CARET, Path, SHARP, STAR, UNDERSCORE};

use super::Graphmaster;
use super::node::Node;

/// Structural counts for one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub categories: usize,
    pub nodes: usize,
    /// Nodes with exactly one branch.
    pub singletons: usize,
    /// Terminals that are not shortcuts.
    pub leaves: usize,
    pub shortcuts: usize,
    /// Nodes with more than one branch.
    pub n_ary: usize,
    /// Sum of all branching factors.
    pub branches: usize,
    /// Nodes upgraded from an inline child to a map.
    pub upgrades: usize,
}

impl GraphStats {
    pub fn average_branching(&self) -> f64 {
        if self.nodes == 0 {
            0.0
        } else {
            self.branches as f64 / self.nodes as f64
        }
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} categories {} nodes {} singletons {} leaves {} shortcuts ",
            self.categories, self.nodes, self.singletons, self.leaves, self.shortcuts,
        )?;
        write!(
            f,
            "{} n-ary {} branches {:.3} average branching",
            self.n_ary,
            self.branches,
            self.average_branching()
        )
    }
}

/// A rule whose own pattern, instantiated, is won by another rule (or by
/// none at all).
#[derive(Debug, Clone)]
pub struct Shadow {
    pub category: Arc<Category>,
    /// The instantiated `input <THAT> that <TOPIC> topic` query.
    pub query: String,
    pub matched: Option<Arc<Category>>,
}

impl fmt::Display for Shadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matched = self
            .matched
            .as_ref()
            .map_or_else(|| "nothing".to_string(), |c| c.input_that_topic());
        write!(
            f,
            "{} matched {} instead of {}",
            self.query,
            matched,
            self.category.input_that_topic()
        )
    }
}

fn walk<'a>(node: &'a Node, visit: &mut impl FnMut(&'a Node)) {
    visit(node);
    for (_, child) in node.children() {
        walk(child, visit);
    }
}

impl Graphmaster {
    /// Every live category, in load order.
    pub fn categories(&self) -> Vec<Arc<Category>> {
        let mut found = Vec::new();
        walk(&self.root, &mut |node| {
            if let Some(c) = node.category() {
                found.push(Arc::clone(c));
            }
        });
        found.sort_by(|a, b| category::by_number(a, b));
        found
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            upgrades: self.upgrades,
            ..Default::default()
        };
        walk(&self.root, &mut |node| {
            let size = node.size();
            stats.nodes += 1;
            stats.branches += size;
            match size {
                0 => {}
                1 => stats.singletons += 1,
                _ => stats.n_ary += 1,
            }
            if node.is_shortcut() {
                stats.shortcuts += 1;
            }
            if node.is_terminal() {
                stats.categories += 1;
                if !node.is_shortcut() {
                    stats.leaves += 1;
                }
            }
        });
        tracing::trace!(graph = %self.name, %stats, "graph statistics");
        stats
    }

    /// Every edge key in the graph plus every enumerable set member.
    pub fn vocabulary(&self) -> HashSet<String> {
        let mut words = HashSet::new();
        walk(&self.root, &mut |node| {
            words.extend(node.children().map(|(key, _)| key.to_string()));
        });
        words.extend(self.sets.all_members());
        words
    }

    /// Replace wildcards and set references so the pattern can be fed back
    /// in as a query.
    fn instantiate(&self, segment: &str) -> String {
        let words: Vec<String> = segment
            .split_whitespace()
            .filter(|w| *w != SHARP && *w != CARET)
            .map(|w| match w {
                STAR | UNDERSCORE => "XXX".to_string(),
                w => match path::set_name(w) {
                    Some(name) if self.sets.has_set(name) => "FOUNDITEM".to_string(),
                    Some(_) => "NOTFOUND".to_string(),
                    None => w.to_string(),
                },
            })
            .collect();
        words.join(" ")
    }

    /// Feed each rule's instantiated pattern back through the matcher and
    /// report the rules that do not win their own query. Activation counts
    /// and example inputs are left untouched.
    pub fn shadow_check(&self) -> Vec<Shadow> {
        let mut shadows: Vec<Shadow> = self
            .categories()
            .into_par_iter()
            .filter_map(|category| {
                let query = path::input_that_topic(
                    &self.instantiate(category.pattern()),
                    &self.instantiate(category.that()),
                    &self.instantiate(category.topic()),
                );
                let matched = self
                    .search(&Path::from_sentence(&query))
                    .map(|m| m.category);
                if matched.as_ref() == Some(&category) {
                    return None;
                }
                tracing::debug!(
                    graph = %self.name,
                    query = %query,
                    expected = %category.input_that_topic(),
                    "shadowed category"
                );
                Some(Shadow {
                    category,
                    query,
                    matched,
                })
            })
            .collect();
        shadows.sort_by(|a, b| category::by_number(&a.category, &b.category));
        shadows
    }

    /// One line per terminal: the edge chain leading to it, each node shown
    /// as `(size[height])`, followed by the start of the template.
    pub fn dump(&self) -> Vec<String> {
        let mut lines = Vec::new();
        dump_node(&self.root, String::new(), &mut lines);
        lines
    }
}

fn dump_node(node: &Node, partial: String, lines: &mut Vec<String>) {
    let label = format!("({}[{}])", node.size(), node.height());
    if let Some(category) = node.category() {
        let template: String = category.template().chars().take(16).collect();
        if node.is_shortcut() {
            lines.push(format!(
                "{partial}{label}--<THAT>-->X(1)--*-->X(1)--<TOPIC>-->X(1)--*-->{template}..."
            ));
        } else {
            lines.push(format!("{partial}{label} {template}..."));
        }
    }
    let mut children: Vec<_> = node.children().collect();
    children.sort_by_key(|(key, _)| *key);
    for (key, child) in children {
        dump_node(child, format!("{partial}{label}--{key}-->"), lines);
    }
}
