use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::models::Rule;
use crate::error::{Error, Result};

fn first_id() -> u64 {
    1
}

/// On-disk shape of the rule store. Rules are never hard-deleted, so ids are
/// a simple monotonic counter.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "first_id")]
    next_rule_id: u64,
    #[serde(default = "first_id")]
    next_activity_id: u64,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            next_rule_id: 1,
            next_activity_id: 1,
            rules: Vec::new(),
        }
    }
}

/// TOML-file-backed record store for rules. Each mutating call loads the
/// file, applies the change, and commits through a temp-file rename, so a
/// failed write never leaves a half-applied store behind.
pub struct RuleStore {
    path: PathBuf,
}

impl RuleStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("failed to read {}: {}", self.path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Storage(format!("failed to parse {}: {}", self.path.display(), e)))
    }

    fn commit(&self, store: &StoreFile) -> Result<()> {
        let content = toml::to_string_pretty(store)
            .map_err(|e| Error::Storage(format!("failed to serialize rule store: {}", e)))?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)
            .map_err(|e| Error::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("failed to commit {}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "rule store committed");
        Ok(())
    }

    /// Persist a newly constructed rule, assigning its id and the ids of its
    /// seeded activity entries. Returns the rule as stored.
    pub fn create(&self, mut rule: Rule) -> Result<Rule> {
        let mut store = self.load()?;

        rule.id = store.next_rule_id;
        store.next_rule_id += 1;
        for activity in &mut rule.activity {
            activity.id = store.next_activity_id;
            store.next_activity_id += 1;
            activity.rule_id = rule.id;
        }

        store.rules.push(rule.clone());
        self.commit(&store)?;
        Ok(rule)
    }

    pub fn get(&self, id: u64) -> Result<Rule> {
        let store = self.load()?;
        store
            .rules
            .into_iter()
            .find(|rule| rule.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// All rules whose active flag falls in the requested set. Both flags
    /// false yields an empty list.
    pub fn list(&self, include_active: bool, include_inactive: bool) -> Result<Vec<Rule>> {
        let store = self.load()?;
        Ok(store
            .rules
            .into_iter()
            .filter(|rule| {
                if rule.active {
                    include_active
                } else {
                    include_inactive
                }
            })
            .collect())
    }

    /// Replace a stored rule by id, assigning ids to any activity entries
    /// appended since it was loaded. State change and activity land in the
    /// same commit.
    pub fn update(&self, rule: &Rule) -> Result<Rule> {
        let mut store = self.load()?;
        let idx = store
            .rules
            .iter()
            .position(|r| r.id == rule.id)
            .ok_or(Error::NotFound(rule.id))?;

        let mut rule = rule.clone();
        for activity in &mut rule.activity {
            if activity.id == 0 {
                activity.id = store.next_activity_id;
                store.next_activity_id += 1;
                activity.rule_id = rule.id;
            }
        }

        store.rules[idx] = rule.clone();
        self.commit(&store)?;
        Ok(rule)
    }
}
