use serde::{Deserialize, Serialize};

/// What a snippet produces once its trigger matched.
///
/// Persisted flat as `{"type": "literal", "value": "..."}` alongside the
/// other snippet fields; the two tags `literal` and `dynamic-code` are the
/// current schema (the startup normalizer migrates the legacy `plain`/`js`
/// tags, see [`crate::storage`]).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum SnippetBody {
    /// Fixed replacement text.
    Literal(String),
    /// Lua source evaluating to a function of the matched text.
    DynamicCode(String),
}

impl SnippetBody {
    pub fn type_name(&self) -> &'static str {
        match self {
            SnippetBody::Literal(_) => "literal",
            SnippetBody::DynamicCode(_) => "dynamic-code",
        }
    }
}

/// One configured trigger/replacement pair.
///
/// Owned by the store; the engine only reads these, except for the one-shot
/// normalization pass at startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: u64,
    pub active: bool,
    /// The trigger: literal text, or a regex pattern when `regex` is set.
    pub key: String,
    pub regex: bool,
    #[serde(flatten)]
    pub body: SnippetBody,
}

impl Snippet {
    pub fn literal(id: u64, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            active: true,
            key: key.into(),
            regex: false,
            body: SnippetBody::Literal(value.into()),
        }
    }

    pub fn dynamic(id: u64, key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            active: true,
            key: key.into(),
            regex: false,
            body: SnippetBody::DynamicCode(code.into()),
        }
    }
}

/// The whole persisted store, camelCase on disk as the original data files
/// were written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
    #[serde(default = "default_buffer_length")]
    pub buffer_length: usize,
}

fn default_buffer_length() -> usize {
    crate::config::DEFAULT_BUFFER_LENGTH
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            user: String::new(),
            snippets: Vec::new(),
            buffer_length: default_buffer_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_round_trips_flat_json() {
        let snippet = Snippet::literal(1, "btw", "by the way");
        let json = serde_json::to_value(&snippet).unwrap();
        assert_eq!(json["type"], "literal");
        assert_eq!(json["value"], "by the way");
        assert_eq!(json["key"], "btw");

        let back: Snippet = serde_json::from_value(json).unwrap();
        assert_eq!(back, snippet);
    }

    #[test]
    fn dynamic_snippet_uses_kebab_tag() {
        let snippet = Snippet::dynamic(2, ";date", "function(m) return m end");
        let json = serde_json::to_value(&snippet).unwrap();
        assert_eq!(json["type"], "dynamic-code");
    }

    #[test]
    fn store_defaults_apply() {
        let data: StoreData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.buffer_length, crate::config::DEFAULT_BUFFER_LENGTH);
        assert!(data.snippets.is_empty());
        assert!(data.user.is_empty());
    }
}
