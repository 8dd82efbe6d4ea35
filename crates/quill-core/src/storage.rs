use crate::config::{ensure_config_dir, get_db_file_path};
use crate::error::{QuillError, Result};
use crate::models::{Snippet, StoreData};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Read access the engine needs over the persisted store.
///
/// The engine never writes through this except for [`normalize`], the
/// one-shot schema migration it runs before hooking the keyboard.
///
/// [`normalize`]: SnippetStore::normalize
pub trait SnippetStore: Send + Sync {
    fn user(&self) -> String;
    fn buffer_length(&self) -> usize;
    fn snippets(&self) -> Vec<Snippet>;
    fn normalize(&self) -> Result<()>;
}

/// JSON-file-backed store at `~/.quill/quill.json`.
pub struct JsonStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(QuillError::DatabaseNotFound(
                path.to_string_lossy().to_string(),
            ));
        }
        let data = read_store(&path)?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Open the store at the default location, creating an empty one first
    /// if needed.
    pub fn open_default() -> Result<Self> {
        ensure_config_dir()?;
        Self::open(get_db_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, picking up external edits.
    pub fn reload(&self) -> Result<()> {
        let data = read_store(&self.path)?;
        *self.data.lock().unwrap() = data;
        Ok(())
    }

    pub fn add_snippet(&self, mut snippet: Snippet) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        if snippet.id == 0 {
            snippet.id = data.snippets.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        }
        data.snippets.push(snippet);
        write_store(&self.path, &data)
    }

    pub fn update_snippet(&self, snippet: Snippet) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        match data.snippets.iter_mut().find(|s| s.id == snippet.id) {
            Some(slot) => *slot = snippet,
            None => return Err(QuillError::SnippetNotFound(snippet.id.to_string())),
        }
        write_store(&self.path, &data)
    }

    pub fn delete_snippet(&self, id: u64) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        let before = data.snippets.len();
        data.snippets.retain(|s| s.id != id);
        if data.snippets.len() == before {
            return Err(QuillError::SnippetNotFound(id.to_string()));
        }
        write_store(&self.path, &data)
    }

    pub fn set_snippet_active(&self, id: u64, active: bool) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        match data.snippets.iter_mut().find(|s| s.id == id) {
            Some(s) => s.active = active,
            None => return Err(QuillError::SnippetNotFound(id.to_string())),
        }
        write_store(&self.path, &data)
    }
}

impl SnippetStore for JsonStore {
    fn user(&self) -> String {
        self.data.lock().unwrap().user.clone()
    }

    fn buffer_length(&self) -> usize {
        self.data.lock().unwrap().buffer_length
    }

    fn snippets(&self) -> Vec<Snippet> {
        self.data.lock().unwrap().snippets.clone()
    }

    fn normalize(&self) -> Result<()> {
        let data = normalize_store_file(&self.path)?;
        *self.data.lock().unwrap() = data;
        Ok(())
    }
}

fn read_store(path: &Path) -> Result<StoreData> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(StoreData::default());
    }
    let mut value: Value = serde_json::from_str(&content)?;
    normalize_store_value(&mut value);
    Ok(serde_json::from_value(value)?)
}

fn write_store(path: &Path, data: &StoreData) -> Result<()> {
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)?;
    Ok(())
}

/// Migrate the persisted store to the current schema and write it back.
///
/// Fills `active=true`, `regex=false`, `type=literal` wherever a record
/// predates those fields, and rewrites the legacy `plain`/`js` type tags.
/// Running it again on already-normalized data rewrites identical content.
pub fn normalize_store_file(path: &Path) -> Result<StoreData> {
    let data = read_store(path)?;
    write_store(path, &data)?;
    debug!(snippets = data.snippets.len(), "normalized snippet store");
    Ok(data)
}

fn normalize_store_value(value: &mut Value) {
    let Some(snippets) = value.get_mut("snippets").and_then(Value::as_array_mut) else {
        return;
    };
    for record in snippets {
        let Some(obj) = record.as_object_mut() else {
            continue;
        };
        if !obj.get("active").map_or(false, Value::is_boolean) {
            obj.insert("active".into(), Value::Bool(true));
        }
        if !obj.get("regex").map_or(false, Value::is_boolean) {
            obj.insert("regex".into(), Value::Bool(false));
        }
        let kind = match obj.get("type").and_then(Value::as_str) {
            Some("dynamic-code") | Some("js") => "dynamic-code",
            // Missing, null, "plain" and anything unknown fall back to the
            // literal kind rather than dropping the record.
            _ => "literal",
        };
        obj.insert("type".into(), Value::String(kind.into()));
        if !obj.get("value").map_or(false, Value::is_string) {
            obj.insert("value".into(), Value::String(String::new()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnippetBody;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_with(content: &str) -> (NamedTempFile, JsonStore) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        let store = JsonStore::open(file.path()).unwrap();
        (file, store)
    }

    #[test]
    fn missing_fields_get_defaults() {
        let (_file, store) = store_with(
            r#"{"snippets": [{"id": 1, "key": "btw", "value": "by the way"}]}"#,
        );
        let snippets = store.snippets();
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].active);
        assert!(!snippets[0].regex);
        assert_eq!(snippets[0].body, SnippetBody::Literal("by the way".into()));
    }

    #[test]
    fn legacy_type_tags_are_migrated() {
        let (_file, store) = store_with(
            r#"{"snippets": [
                {"id": 1, "key": "a", "value": "x", "type": "plain"},
                {"id": 2, "key": "b", "value": "return 1", "type": "js"}
            ]}"#,
        );
        let snippets = store.snippets();
        assert_eq!(snippets[0].body, SnippetBody::Literal("x".into()));
        assert_eq!(snippets[1].body, SnippetBody::DynamicCode("return 1".into()));
    }

    #[test]
    fn normalize_is_idempotent() {
        let (file, store) = store_with(
            r#"{"user": "u", "snippets": [{"id": 1, "key": "k", "value": "v"}]}"#,
        );
        store.normalize().unwrap();
        let first = fs::read_to_string(file.path()).unwrap();
        store.normalize().unwrap();
        let second = fs::read_to_string(file.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_file_reads_as_default_store() {
        let (_file, store) = store_with("");
        assert!(store.snippets().is_empty());
        assert_eq!(store.buffer_length(), crate::config::DEFAULT_BUFFER_LENGTH);
    }

    #[test]
    fn crud_round_trip() {
        let (file, store) = store_with("{}");
        store.add_snippet(Snippet::literal(0, "sig", "regards")).unwrap();
        store.add_snippet(Snippet::literal(0, "brb", "be right back")).unwrap();
        assert_eq!(store.snippets().len(), 2);
        // Auto-assigned ids are sequential
        assert_eq!(store.snippets()[1].id, 2);

        store.set_snippet_active(1, false).unwrap();
        assert!(!store.snippets()[0].active);

        store.delete_snippet(1).unwrap();
        assert_eq!(store.snippets().len(), 1);

        // Edits survive a reopen
        let reopened = JsonStore::open(file.path()).unwrap();
        assert_eq!(reopened.snippets(), store.snippets());
    }

    #[test]
    fn delete_unknown_id_errors() {
        let (_file, store) = store_with("{}");
        assert!(store.delete_snippet(42).is_err());
    }
}
