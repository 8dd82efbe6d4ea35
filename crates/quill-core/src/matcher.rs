//! Suffix matching of snippet triggers against the input buffer.

use crate::models::Snippet;
use regex::Regex;
use tracing::warn;

/// A trigger found at the end of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Index into the snippet collection passed to [`find_match`].
    pub index: usize,
    /// The exact matched text; its character count is how much to delete.
    pub matched: String,
}

impl TriggerMatch {
    pub fn matched_len(&self) -> usize {
        self.matched.chars().count()
    }
}

/// Find the first active snippet whose trigger matches a suffix of the
/// buffer.
///
/// Iteration follows the collection's persisted order and stops at the first
/// hit; no longest-match search across candidates. Literal triggers are
/// escaped, pattern triggers compile as written (an invalid pattern is
/// skipped, not fatal).
pub fn find_match(buffer: &str, snippets: &[Snippet]) -> Option<TriggerMatch> {
    if buffer.is_empty() {
        return None;
    }

    for (index, snippet) in snippets.iter().enumerate() {
        if !snippet.active {
            continue;
        }

        let key = if snippet.regex {
            snippet.key.clone()
        } else {
            regex::escape(&snippet.key)
        };

        // Greedy prefix keeps the capture at the shortest suffix that still
        // satisfies the trigger, anchored at the buffer's end.
        let pattern = match Regex::new(&format!("(?s).*({key})$")) {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!(snippet_id = snippet.id, %err, "skipping invalid trigger pattern");
                continue;
            }
        };

        if let Some(matched) = pattern
            .captures(buffer)
            .and_then(|captures| captures.get(1))
        {
            return Some(TriggerMatch {
                index,
                matched: matched.as_str().to_string(),
            });
        }
    }

    None
}
