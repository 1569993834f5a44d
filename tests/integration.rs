//! End-to-end integration tests for the graphmaster engine.
//!
//! These exercise the public API only: building graphs from categories,
//! matching live triples, and the engine's learn/forget cycle.

use std::sync::Arc;

use graphmaster::bindings::Segment;
use graphmaster::category::Category;
use graphmaster::config::GraphConfig;
use graphmaster::engine::Engine;
use graphmaster::graph::{Graphmaster, SharedGraphmaster};
use graphmaster::properties::Properties;
use graphmaster::sets::{SetCollection, WordSet};

fn graph() -> Graphmaster {
    Graphmaster::new("integration", GraphConfig::default())
}

fn graph_without_shortcuts() -> Graphmaster {
    Graphmaster::new("integration", GraphConfig::without_shortcuts())
}

fn greeting_graph() -> Graphmaster {
    let sets = SetCollection::with_builtins();
    sets.insert(WordSet::new("greeting", ["good morning", "morning"]));
    Graphmaster::with_context(
        "integration",
        GraphConfig::default(),
        Arc::new(Properties::new()),
        Arc::new(sets),
    )
}

#[test]
fn end_to_end_literal_wildcard_and_fallback() {
    let engine = Engine::new(GraphConfig::default()).unwrap();
    let r1 = engine.add_category(Category::new("I LIKE *", "R1")).unwrap();
    let r2 = engine.add_category(Category::new("I LIKE PIZZA", "R2")).unwrap();
    let r3 = engine.add_category(Category::new("*", "R3")).unwrap();

    let m = engine.respond("I LIKE PIZZA", "unknown", "unknown").unwrap();
    assert_eq!(m.category, r2);

    let m = engine.respond("I LIKE SUSHI", "unknown", "unknown").unwrap();
    assert_eq!(m.category, r1);
    assert_eq!(m.bindings.get(Segment::Input, 0), Some("SUSHI"));

    let m = engine.respond("HELLO", "unknown", "unknown").unwrap();
    assert_eq!(m.category, r3);
    assert_eq!(m.bindings.get(Segment::Input, 0), Some("HELLO"));

    assert_eq!(r2.activation_count(), 1);
    assert_eq!(engine.info().brain.categories, 3);
}

#[test]
fn insertion_lookup_round_trip() {
    let mut g = graph();
    let rules = [
        Category::new("HELLO", "a"),
        Category::new("I LIKE *", "b"),
        Category::new("WHAT IS _", "c").with_that("I AM A ROBOT"),
        Category::new("# BYE", "d").with_topic("FAREWELL *"),
        Category::new("$WHO ^", "e"),
        Category::new("<SET>number</SET>", "f"),
    ];
    let inserted: Vec<_> = rules.into_iter().map(|c| g.add(c)).collect();
    for c in &inserted {
        let found = g.find_exact(c.pattern(), c.that(), c.topic());
        assert_eq!(found.as_ref(), Some(c), "lost {}", c.input_that_topic());
    }
    assert_eq!(g.categories(), inserted);
}

#[test]
fn literal_beats_wildcard_for_same_context() {
    for mut g in [graph(), graph_without_shortcuts()] {
        g.add(Category::new("*", "").with_that("HOW ARE YOU"));
        let literal = g.add(Category::new("FINE", "").with_that("HOW ARE YOU"));
        let m = g.match_input("fine", "how are you", "health").unwrap();
        assert_eq!(m.category, literal);
    }
}

#[test]
fn underscore_needs_words_sharp_does_not() {
    for mut g in [graph(), graph_without_shortcuts()] {
        g.add(Category::new("_", ""));
        assert!(g.match_input("", "x", "y").is_none());
        assert!(g.match_input("something", "x", "y").is_some());
    }
    for mut g in [graph(), graph_without_shortcuts()] {
        g.add(Category::new("#", ""));
        assert!(g.match_input("", "x", "y").is_some());
        assert!(g.match_input("something", "x", "y").is_some());
    }
}

#[test]
fn segment_isolation() {
    for mut g in [graph(), graph_without_shortcuts()] {
        g.add(Category::new("*", ""));
        let m = g.match_input("A B", "C", "D").unwrap();
        assert_eq!(m.bindings.input, vec!["A B"]);
        assert_eq!(m.bindings.that, vec!["C"]);
        assert_eq!(m.bindings.topic, vec!["D"]);
    }
}

#[test]
fn shortcut_equivalence() {
    let mut short = graph();
    let mut full = graph_without_shortcuts();
    let a = short.add(Category::new("HELLO", ""));
    let b = full.add(Category::new("HELLO", ""));
    for (that, topic) in [
        ("what is your name", "names"),
        ("x", "y"),
        ("one two three", "four five"),
    ] {
        let ms = short.match_input("hello", that, topic).unwrap();
        let mf = full.match_input("hello", that, topic).unwrap();
        assert_eq!(ms.category, a);
        assert_eq!(mf.category, b);
        assert_eq!(ms.bindings, mf.bindings);
        assert_eq!(ms.bindings.get(Segment::That, 0), Some(that));
        assert_eq!(ms.bindings.get(Segment::Topic, 0), Some(topic));
    }
    assert!(short.stats().nodes < full.stats().nodes);
}

#[test]
fn set_longest_match() {
    let mut g = greeting_graph();
    let c = g.add(Category::new("<SET>greeting</SET>", ""));
    let m = g.match_input("good morning", "x", "y").unwrap();
    assert_eq!(m.category, c);
    assert_eq!(m.bindings.get(Segment::Input, 0), Some("good morning"));
    let m = g.match_input("morning", "x", "y").unwrap();
    assert_eq!(m.bindings.get(Segment::Input, 0), Some("morning"));
}

#[test]
fn idempotent_reinsertion() {
    let mut g = graph();
    g.add(Category::new("HELLO", "first").with_that("HI"));
    let second = g.add(Category::new("HELLO", "second").with_that("HI"));
    assert_eq!(g.categories().len(), 1);
    assert_eq!(g.stats().categories, 1);
    assert_eq!(g.find_exact("HELLO", "HI", "*"), Some(Arc::clone(&second)));
    assert_eq!(g.match_input("hello", "hi", "t").unwrap().category, second);
}

#[test]
fn logical_deletion_falls_back() {
    let mut g = graph();
    let fallback = g.add(Category::new("*", ""));
    g.add(Category::new("I LIKE PIZZA", ""));
    assert!(g.delete("I LIKE PIZZA", "*", "*").is_some());
    assert!(g.find_exact("I LIKE PIZZA", "*", "*").is_none());
    assert_eq!(g.match_input("i like pizza", "x", "y").unwrap().category, fallback);

    g.delete("*", "*", "*");
    assert!(g.match_input("i like pizza", "x", "y").is_none());
}

#[test]
fn learning_while_serving() {
    let engine = Arc::new(Engine::new(GraphConfig::default()).unwrap());
    engine.add_category(Category::new("*", "default")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for i in 0..50 {
                    engine
                        .learn(Category::new(&format!("FACT {t} {i}"), "learned"))
                        .unwrap();
                    let m = engine.respond(&format!("fact {t} {i}"), "x", "y").unwrap();
                    assert_eq!(m.category.template(), "learned");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(engine.learned().categories().len(), 200);
    assert_eq!(engine.forget_learned(), 200);
    let m = engine.respond("fact 0 0", "x", "y").unwrap();
    assert_eq!(m.category.template(), "default");
}

#[test]
fn shared_graph_from_loaded_corpus() {
    let mut g = graph();
    for word in ["RED", "GREEN", "BLUE"] {
        g.add(Category::new(&format!("I LIKE {word}"), word));
    }
    let shared = SharedGraphmaster::from(g);
    assert!(shared.exists("I LIKE GREEN", "*", "*"));
    assert_eq!(
        shared.match_input("i like blue", "x", "y").unwrap().category.template(),
        "BLUE"
    );
    assert_eq!(shared.stats().categories, 3);
}
