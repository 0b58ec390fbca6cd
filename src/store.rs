use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::models::Conversation;
use crate::summary;

pub const CONVERSATION_PREFIX: &str = "aura:conversation:";

/// Blocking key-value persistence
///
/// No atomicity beyond what the backing store offers; concurrent writers from
/// separate processes are not coordinated and the last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| anyhow!("store lock poisoned"))
}

/// In-process store, mainly for tests and the mock-only CLI
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(lock(&self.entries)?.keys().cloned().collect())
    }
}

/// Key-value pairs kept in a single JSON object file, rewritten on every change
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open `path`. A missing file starts empty. A file that does not parse
    /// is moved to `<path>.corrupt` so later writes cannot clobber it.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                let aside = sidecar(&path, "corrupt");
                warn!(
                    "Corrupt store file {}: {}; moving it to {}",
                    path.display(),
                    e,
                    aside.display()
                );
                if let Err(e) = fs::rename(&path, &aside) {
                    warn!("Could not move {} aside: {}", path.display(), e);
                }
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read store file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(entries).context("Failed to encode store")?;

        // Atomic write: temp file + rename
        let temp_path = sidecar(&self.path, "tmp");
        if let Err(e) = fs::write(&temp_path, raw) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to write {}", temp_path.display()));
        }
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to replace {}", self.path.display()));
        }
        Ok(())
    }
}

/// `aura.json` -> `aura.json.<suffix>` in the same directory
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(lock(&self.entries)?.keys().cloned().collect())
    }
}

/// Conversation records stored as JSON under a namespaced key
pub struct ConversationStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ConversationStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    fn key(id: &str) -> String {
        format!("{CONVERSATION_PREFIX}{id}")
    }

    /// Recompute title and metadata from history, then persist.
    pub fn save(&self, conversation: &mut Conversation) -> Result<()> {
        conversation.title = summary::derive_title(&conversation.history);
        conversation.metadata = summary::derive_metadata(&conversation.history);

        let raw = serde_json::to_string(conversation).context("Failed to encode conversation")?;
        self.backend.set(&Self::key(&conversation.id), &raw)
    }

    /// Load one conversation. Corrupt records read as absent.
    pub fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let key = Self::key(id);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(conversation) => Ok(Some(conversation)),
            Err(e) => {
                warn!("Skipping corrupt record {}: {}", key, e);
                Ok(None)
            }
        }
    }

    /// All readable conversations, most recently active first.
    pub fn list(&self) -> Result<Vec<Conversation>> {
        let mut conversations = Vec::new();
        for key in self.backend.keys()? {
            let Some(id) = key.strip_prefix(CONVERSATION_PREFIX) else {
                continue;
            };
            if let Some(conversation) = self.get(id)? {
                conversations.push(conversation);
            }
        }
        conversations.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(conversations)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.backend.delete(&Self::key(id))
    }

    /// Delete every conversation record; returns how many keys were removed.
    pub fn clear_all(&self) -> Result<usize> {
        let keys: Vec<String> = self
            .backend
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(CONVERSATION_PREFIX))
            .collect();
        for key in &keys {
            self.backend.delete(key)?;
        }
        info!("Cleared {} conversations", keys.len());
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Emotion, Message, Topic};
    use chrono::Duration;

    fn conversation_with(content: &str) -> Conversation {
        let mut conversation = Conversation::new();
        conversation.history.push(
            Message::user(content).with_labels(Emotion::Anxious, Topic::Finances, 0.125),
        );
        conversation.history.push(Message::assistant("Let's make a plan."));
        conversation
    }

    #[test]
    fn save_recomputes_derived_fields() {
        let store = ConversationStore::new(MemoryStore::new());
        let mut conversation = conversation_with("Rent is due");
        conversation.title = "stale".into();
        conversation.metadata.tags = vec!["stale".into()];

        store.save(&mut conversation).unwrap();

        let loaded = store.get(&conversation.id).unwrap().unwrap();
        assert_eq!(loaded, conversation);
        assert_eq!(loaded.title, "Money Worries: \"Rent is due\"");
        assert_eq!(loaded.metadata, summary::derive_metadata(&loaded.history));
    }

    #[test]
    fn list_is_most_recent_first() {
        let store = ConversationStore::new(MemoryStore::new());
        let mut older = conversation_with("a");
        older.last_active = older.last_active - Duration::minutes(5);
        let mut newer = conversation_with("b");
        store.save(&mut older).unwrap();
        store.save(&mut newer).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn corrupt_records_read_as_absent() {
        let backend = MemoryStore::new();
        backend
            .set(&format!("{CONVERSATION_PREFIX}broken"), "{not json")
            .unwrap();
        let store = ConversationStore::new(backend);
        assert!(store.get("broken").unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn clear_all_only_touches_namespace() {
        let backend = MemoryStore::new();
        backend.set("settings:theme", "dark").unwrap();
        let store = ConversationStore::new(backend);
        store.save(&mut conversation_with("a")).unwrap();
        store.save(&mut conversation_with("b")).unwrap();

        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(
            store.backend.get("settings:theme").unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn delete_removes_one() {
        let store = ConversationStore::new(MemoryStore::new());
        let mut keep = conversation_with("a");
        let mut gone = conversation_with("b");
        store.save(&mut keep).unwrap();
        store.save(&mut gone).unwrap();

        store.delete(&gone.id).unwrap();
        assert!(store.get(&gone.id).unwrap().is_none());
        assert!(store.get(&keep.id).unwrap().is_some());
    }
}
