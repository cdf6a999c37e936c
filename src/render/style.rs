//! Per-widget stylesheet registry.

use tracing::trace;

const NODE_CSS: &str = ".nodeBase {
  cursor: zoom-out;
  fill: lightgray;
  stroke: #000;
  stroke-width: 2;
}

.collapsed {
  cursor: zoom-in;
}

.leafNodeBase {
  fill: white;
  stroke: #000;
  stroke-width: 2;
}
";

const LABEL_CSS: &str = ".nodeNameBase {
  font-size: 0.9rem;
  stroke-width: 0.25;
  fill: black;
}

.nodeNameLink {
  cursor: pointer;
  fill: #2a97d2;
  stroke: #2a97d2;
  stroke-width: 1;
}

.longNodeName {
  font-size: smaller;
}

.nodeAttributesBase {
  fill: #777;
  stroke: #777;
  stroke-width: 0.25;
  font-size: smaller;
}
";

const LINK_CSS: &str = ".linkBase {
  fill: none;
  stroke: #000;
}
";

/// CSS blocks keyed by scope, kept in registration order.
///
/// Owned by one widget instance; nothing is shared between instances.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    entries: Vec<(String, String)>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the base node, label and link styles.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("node", NODE_CSS);
        registry.register("label", LABEL_CSS);
        registry.register("link", LINK_CSS);
        registry
    }

    /// Add `css` under `key`. Returns `false` if the key was already taken;
    /// the first registration wins.
    pub fn register(&mut self, key: impl Into<String>, css: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            trace!(%key, "style already registered");
            return false;
        }
        self.entries.push((key, css.into()));
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered blocks concatenated.
    pub fn stylesheet(&self) -> String {
        self.entries
            .iter()
            .map(|(_, css)| css.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
