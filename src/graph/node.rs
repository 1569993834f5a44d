//! Graph nodes.
//!
//! Most nodes in a real rule corpus have exactly one child, so a node keeps
//! its first edge inline and only allocates a map once a second distinct
//! key arrives. The upgrade is one-way.

use std::collections::HashMap;
use std::sync::Arc;

use crate::category::Category;
use crate::path::THAT;

#[derive(Debug, Default)]
pub(crate) enum Branches {
    #[default]
    Empty,
    Single {
        key: String,
        child: Box<Node>,
    },
    Map(HashMap<String, Node>),
}

/// A branch point in the pattern graph.
#[derive(Debug)]
pub struct Node {
    pub(crate) category: Option<Arc<Category>>,
    /// Lowercase names of sets referenced by this node's `<SET>` edges, in
    /// first-registered order.
    pub(crate) sets: Vec<String>,
    pub(crate) shortcut: bool,
    /// Lower bound on the tokens needed to reach a terminal from here.
    pub(crate) height: usize,
    pub(crate) branches: Branches,
}

impl Node {
    pub(crate) fn new(height: usize) -> Self {
        Self {
            category: None,
            sets: Vec::new(),
            shortcut: false,
            height,
            branches: Branches::Empty,
        }
    }

    /// The category stored here, if this node is a live terminal.
    pub fn category(&self) -> Option<&Arc<Category>> {
        self.category.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.category.is_some()
    }

    /// Whether this terminal stands in for a collapsed `<THAT> * <TOPIC> *` tail.
    pub fn is_shortcut(&self) -> bool {
        self.shortcut
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Names of the sets registered on this node.
    pub fn sets(&self) -> &[String] {
        &self.sets
    }

    /// Whether the node has upgraded to a full map.
    pub fn is_map(&self) -> bool {
        matches!(self.branches, Branches::Map(_))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        match &self.branches {
            Branches::Empty => None,
            Branches::Single { key: k, child } => (k == key).then_some(child.as_ref()),
            Branches::Map(map) => map.get(key),
        }
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match &mut self.branches {
            Branches::Empty => None,
            Branches::Single { key: k, child } => (k == key).then_some(child.as_mut()),
            Branches::Map(map) => map.get_mut(key),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Child edges in unspecified but stable order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        let (single, map) = match &self.branches {
            Branches::Empty => (None, None),
            Branches::Single { key, child } => (Some((key.as_str(), child.as_ref())), None),
            Branches::Map(map) => (None, Some(map)),
        };
        single.into_iter().chain(
            map.into_iter()
                .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v))),
        )
    }

    pub fn child_count(&self) -> usize {
        match &self.branches {
            Branches::Empty => 0,
            Branches::Single { .. } => 1,
            Branches::Map(map) => map.len(),
        }
    }

    /// Branching factor, counting a shortcut as an implicit `<THAT>` edge.
    pub fn size(&self) -> usize {
        let implicit = usize::from(self.shortcut && !self.contains_key(THAT));
        self.child_count() + implicit
    }

    /// Return the child under `key`, creating it with `height` if absent.
    /// The flag reports whether this call upgraded the node to a map.
    pub(crate) fn child_or_insert(&mut self, key: &str, height: usize) -> (&mut Node, bool) {
        enum Slot {
            Vacant,
            Present,
            Upgrade,
        }
        let slot = match &self.branches {
            Branches::Empty => Slot::Vacant,
            Branches::Single { key: k, .. } if k == key => Slot::Present,
            Branches::Single { .. } => Slot::Upgrade,
            Branches::Map(_) => Slot::Present,
        };
        let upgraded = match slot {
            Slot::Vacant => {
                self.branches = Branches::Single {
                    key: key.to_string(),
                    child: Box::new(Node::new(height)),
                };
                false
            }
            Slot::Upgrade => {
                self.upgrade();
                true
            }
            Slot::Present => false,
        };
        let child = match &mut self.branches {
            Branches::Single { child, .. } => child.as_mut(),
            Branches::Map(map) => map
                .entry(key.to_string())
                .or_insert_with(|| Node::new(height)),
            Branches::Empty => unreachable!("branch slot filled above"),
        };
        (child, upgraded)
    }

    fn upgrade(&mut self) {
        if let Branches::Single { key, child } = std::mem::take(&mut self.branches) {
            let mut map = HashMap::with_capacity(2);
            map.insert(key, *child);
            self.branches = Branches::Map(map);
        }
    }

    /// Register a set name (idempotent).
    pub(crate) fn register_set(&mut self, name: &str) {
        if !self.sets.iter().any(|s| s == name) {
            self.sets.push(name.to_string());
        }
    }
}
