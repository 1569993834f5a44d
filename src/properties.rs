//! Bot properties and their substitution into patterns.
//!
//! Patterns may embed `<bot name="X"/>`; the reference is replaced by the
//! uppercased property value once, when the category is inserted.

use std::borrow::Cow;
use std::sync::LazyLock;

use dashmap::DashMap;
use regex::{Captures, Regex};

static BOT_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<bot name="(.*?)"/>"#).unwrap());

/// Read access to bot property values.
pub trait PropertySource: Send + Sync {
    /// Value of the property named `name` (lowercase), if set.
    fn property(&self, name: &str) -> Option<String>;
}

/// Concurrent in-memory property table. Names are stored lowercase.
#[derive(Debug, Default)]
pub struct Properties {
    values: DashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get(&name.to_lowercase()).map(|v| v.value().clone())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let props = Properties::new();
        for (k, v) in iter {
            props.set(k.as_ref(), v);
        }
        props
    }
}

impl PropertySource for Properties {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name)
    }
}

/// Replace every `<bot name="X"/>` in `pattern` with the uppercased value of
/// property `x`, or with `default` when it is unset.
pub fn substitute<'a>(
    pattern: &'a str,
    source: &dyn PropertySource,
    default: &str,
) -> Cow<'a, str> {
    if !pattern.contains("<B") && !pattern.contains("<b") {
        return Cow::Borrowed(pattern);
    }
    BOT_PROPERTY.replace_all(pattern, |caps: &Captures<'_>| {
        let name = caps[1].to_lowercase();
        let value = source.property(&name).unwrap_or_else(|| {
            tracing::warn!(property = %name, "bot property not set, using default");
            default.to_string()
        });
        value.to_uppercase()
    })
}
