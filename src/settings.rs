// ABOUTME: Key-value settings for the two ssh command templates with get/set/reset and change notification
// ABOUTME: Backed either by the TOML config file or by memory; a cached template pair serves queries

use crate::config::Config;
use crate::template::{DEFAULT_LOCAL_TEMPLATE, DEFAULT_REMOTE_TEMPLATE, TemplatePair};
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    /// Outer command run by the terminal.
    Local,
    /// Command run on the remote host.
    Remote,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 2] = [TemplateKey::Local, TemplateKey::Remote];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Local => "ssh_commandline",
            TemplateKey::Remote => "ssh_remote_commandline",
        }
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            TemplateKey::Local => DEFAULT_LOCAL_TEMPLATE,
            TemplateKey::Remote => DEFAULT_REMOTE_TEMPLATE,
        }
    }
}

impl FromStr for TemplateKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local" | "ssh_commandline" => Ok(TemplateKey::Local),
            "remote" | "ssh_remote_commandline" => Ok(TemplateKey::Remote),
            other => bail!("Unknown template key: {other} (expected local or remote)"),
        }
    }
}

/// Persistence for template overrides. A missing value means "use the default".
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: TemplateKey) -> Option<String>;
    fn set(&self, key: TemplateKey, value: &str) -> Result<()>;
    fn remove(&self, key: TemplateKey) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<TemplateKey, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: TemplateKey) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn set(&self, key: TemplateKey, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: TemplateKey) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}

/// Stores overrides in the `[templates]` section of the config file.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    config: RwLock<Config>,
}

impl FileSettings {
    pub fn new(path: PathBuf, config: Config) -> Self {
        Self {
            path,
            config: RwLock::new(config),
        }
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        let config = Config::load_or_default(&path)?;
        Ok(Self::new(path, config))
    }

    /// Saves first; the in-memory config only changes once the file is written.
    fn update(&self, key: TemplateKey, value: Option<String>) -> Result<()> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = config.clone();
        let slot = match key {
            TemplateKey::Local => &mut next.templates.ssh_commandline,
            TemplateKey::Remote => &mut next.templates.ssh_remote_commandline,
        };
        *slot = value;
        next.save_to_file(&self.path)?;
        *config = next;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: TemplateKey) -> Option<String> {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);
        match key {
            TemplateKey::Local => config.templates.ssh_commandline.clone(),
            TemplateKey::Remote => config.templates.ssh_remote_commandline.clone(),
        }
    }

    fn set(&self, key: TemplateKey, value: &str) -> Result<()> {
        self.update(key, Some(value.to_string()))
    }

    fn remove(&self, key: TemplateKey) -> Result<()> {
        self.update(key, None)
    }
}

/// Cached template pair in front of a [`SettingsStore`].
///
/// Queries read a snapshot through [`Templates::pair`]; writers go through
/// [`Templates::set`] or [`Templates::reset`], which persist, refresh the
/// cache and notify every subscriber with the changed key.
pub struct Templates {
    store: Arc<dyn SettingsStore>,
    current: RwLock<TemplatePair>,
    subscribers: Mutex<Vec<Sender<TemplateKey>>>,
}

impl Templates {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        let current = load_pair(store.as_ref());
        Self {
            store,
            current: RwLock::new(current),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettings::new()))
    }

    pub fn pair(&self) -> TemplatePair {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, key: TemplateKey) -> String {
        let pair = self.current.read().unwrap_or_else(PoisonError::into_inner);
        match key {
            TemplateKey::Local => pair.local.clone(),
            TemplateKey::Remote => pair.remote.clone(),
        }
    }

    /// An empty `value` resets the key to its built-in default.
    pub fn set(&self, key: TemplateKey, value: &str) -> Result<()> {
        let mut pair = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let slot = match key {
            TemplateKey::Local => &mut pair.local,
            TemplateKey::Remote => &mut pair.remote,
        };

        if value.is_empty() {
            self.store.remove(key)?;
            *slot = key.default_value().to_string();
            info!("Reset {} to default", key.as_str());
        } else if *slot != value {
            self.store.set(key, value)?;
            *slot = value.to_string();
            info!("Updated {}", key.as_str());
        } else {
            return Ok(());
        }
        drop(pair);

        self.notify(key);
        Ok(())
    }

    pub fn reset(&self, key: TemplateKey) -> Result<()> {
        self.set(key, "")
    }

    /// Receive the key of every template that changes from now on.
    pub fn subscribe(&self) -> Receiver<TemplateKey> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    /// Re-read both values from the store, e.g. after an external edit.
    pub fn reload(&self) {
        let fresh = load_pair(self.store.as_ref());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        debug!("Reloaded command templates");
    }

    fn notify(&self, key: TemplateKey) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sender| sender.send(key).is_ok());
    }
}

fn load_pair(store: &dyn SettingsStore) -> TemplatePair {
    let value = |key: TemplateKey| {
        store
            .get(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| key.default_value().to_string())
    };
    TemplatePair {
        local: value(TemplateKey::Local),
        remote: value(TemplateKey::Remote),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_store_is_empty() {
        let templates = Templates::in_memory();

        assert_eq!(templates.pair(), TemplatePair::default());
        assert_eq!(templates.get(TemplateKey::Local), DEFAULT_LOCAL_TEMPLATE);
        assert_eq!(templates.get(TemplateKey::Remote), DEFAULT_REMOTE_TEMPLATE);
    }

    #[test]
    fn test_set_persists_new_value() {
        let store = Arc::new(MemorySettings::new());
        let templates = Templates::new(store.clone());

        templates.set(TemplateKey::Local, "mosh %1 -- %2").unwrap();

        assert_eq!(templates.get(TemplateKey::Local), "mosh %1 -- %2");
        assert_eq!(store.get(TemplateKey::Local).as_deref(), Some("mosh %1 -- %2"));
        assert_eq!(store.get(TemplateKey::Remote), None);
    }

    #[test]
    fn test_reset_restores_exact_default() {
        let store = Arc::new(MemorySettings::new());
        let templates = Templates::new(store.clone());

        templates.set(TemplateKey::Remote, "bash -lc '%1'").unwrap();
        templates.set(TemplateKey::Remote, "").unwrap();

        assert_eq!(templates.get(TemplateKey::Remote), DEFAULT_REMOTE_TEMPLATE);
        assert_eq!(store.get(TemplateKey::Remote), None);

        templates.set(TemplateKey::Local, "x %1 %2").unwrap();
        templates.reset(TemplateKey::Local).unwrap();
        assert_eq!(templates.get(TemplateKey::Local), DEFAULT_LOCAL_TEMPLATE);
    }

    #[test]
    fn test_subscribers_skip_identical_values() {
        let templates = Templates::in_memory();
        let changes = templates.subscribe();

        templates.set(TemplateKey::Local, "a %1 %2").unwrap();
        templates.set(TemplateKey::Local, "a %1 %2").unwrap();
        templates.reset(TemplateKey::Remote).unwrap();

        assert_eq!(changes.try_recv(), Ok(TemplateKey::Local));
        assert_eq!(changes.try_recv(), Ok(TemplateKey::Remote));
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let templates = Templates::in_memory();
        drop(templates.subscribe());

        templates.set(TemplateKey::Local, "b %1 %2").unwrap();

        assert!(templates.subscribers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_store_values_are_loaded_and_reloaded() {
        let store = Arc::new(MemorySettings::new());
        store.set(TemplateKey::Remote, "zsh -ic '%1'").unwrap();
        let templates = Templates::new(store.clone());
        assert_eq!(templates.get(TemplateKey::Remote), "zsh -ic '%1'");

        store.remove(TemplateKey::Remote).unwrap();
        templates.reload();
        assert_eq!(templates.get(TemplateKey::Remote), DEFAULT_REMOTE_TEMPLATE);
    }

    #[test]
    fn test_file_settings_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let store = FileSettings::open(path.clone()).unwrap();
        store.set(TemplateKey::Local, "ssh %1 %2").unwrap();

        let reopened = Config::load_from_file(&path).unwrap();
        assert_eq!(reopened.templates.ssh_commandline.as_deref(), Some("ssh %1 %2"));

        store.remove(TemplateKey::Local).unwrap();
        let reopened = Config::load_from_file(&path).unwrap();
        assert_eq!(reopened.templates.ssh_commandline, None);
    }

    #[test]
    fn test_failed_save_keeps_previous_value() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = Arc::new(FileSettings::new(blocker.join("config.toml"), Config::default()));
        let templates = Templates::new(store.clone());

        assert!(templates.set(TemplateKey::Local, "mosh %1 -- %2").is_err());

        assert_eq!(store.get(TemplateKey::Local), None);
        templates.reload();
        assert_eq!(templates.get(TemplateKey::Local), DEFAULT_LOCAL_TEMPLATE);
    }

    #[test]
    fn test_template_key_parsing() {
        assert_eq!("local".parse::<TemplateKey>().unwrap(), TemplateKey::Local);
        assert_eq!(
            "ssh_remote_commandline".parse::<TemplateKey>().unwrap(),
            TemplateKey::Remote
        );
        assert!("other".parse::<TemplateKey>().is_err());
    }
}
