//! File-backed keyed JSON persistence: one value per key, one file per key.
//!
//! Whole-file read-modify-write with no locking; concurrent writers to the
//! same key lose updates (last write wins).

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ServiceError;

pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonDirStore { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Age of the stored entry, if it exists and the filesystem reports a
    /// modification time.
    pub fn age(&self, key: &str) -> Option<Duration> {
        let modified = fs::metadata(self.path_for(key)).ok()?.modified().ok()?;
        SystemTime::now().duration_since(modified).ok()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ServiceError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ServiceError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }

    /// Keys of every stored entry, in directory order.
    pub fn keys(&self) -> Result<Vec<String>, ServiceError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        name: String,
        count: u32,
    }

    #[test]
    fn round_trips_a_value() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::open(tmp.path().join("entries")).unwrap();

        let entry = Entry {
            name: "biology".to_string(),
            count: 3,
        };
        store.put("s1", &entry).unwrap();

        assert!(store.contains("s1"));
        assert_eq!(store.get::<Entry>("s1").unwrap(), Some(entry));
    }

    #[test]
    fn missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();
        assert!(!store.contains("ghost"));
        assert_eq!(store.get::<Entry>("ghost").unwrap(), None);
    }

    #[test]
    fn overwrite_is_last_writer_wins() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();

        store.put("s1", &Entry { name: "a".into(), count: 1 }).unwrap();
        store.put("s1", &Entry { name: "b".into(), count: 2 }).unwrap();

        let entry = store.get::<Entry>("s1").unwrap().unwrap();
        assert_eq!(entry.name, "b");
    }

    #[test]
    fn keys_lists_only_json_entries() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();
        store.put("one", &Entry { name: "x".into(), count: 1 }).unwrap();
        store.put("two", &Entry { name: "y".into(), count: 2 }).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not a record").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn age_reports_for_existing_entries_only() {
        let tmp = TempDir::new().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();
        assert!(store.age("ghost").is_none());

        store.put("s1", &Entry { name: "a".into(), count: 1 }).unwrap();
        assert!(store.age("s1").is_some());
    }
}
