use crate::error::Result;
use crate::state::{StateKey, CELLS};
use chrono::offset::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{prelude::*, BufReader, BufWriter};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Estimated return of playing each of the nine cells.
pub type Values = [f32; CELLS];

/// Sparse state-action value table shared by both sides of self-play.
///
/// Entries are created on first read and never evicted.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct QTable {
    qtable: HashMap<StateKey, Values>,
}

impl Deref for QTable {
    type Target = HashMap<StateKey, Values>;
    fn deref(&self) -> &<Self as Deref>::Target {
        &self.qtable
    }
}

impl QTable {
    pub fn new() -> Self {
        QTable {
            qtable: HashMap::with_capacity(6_000),
        }
    }

    /// Values stored for `key`, inserting a zero vector for unseen keys.
    pub fn get(&mut self, key: &StateKey) -> Values {
        if let Some(values) = self.qtable.get(key) {
            return *values;
        }
        *self.qtable.entry(key.clone()).or_insert([0.0; CELLS])
    }

    pub fn put(&mut self, key: StateKey, values: Values) {
        self.qtable.insert(key, values);
    }

    /// Read without allocating an entry.
    pub fn peek(&self, key: &StateKey) -> Option<&Values> {
        self.qtable.get(key)
    }
}

/// Writes the table as a date-stamped JSON and pickle pair under `path`.
pub fn q_table_to_disk(path: &Path, q: &QTable) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(path)?;
    let today = Local::now().date_naive();
    let q_json: PathBuf = path.join(format!("qtable-{today}.json"));
    let q_pickle: PathBuf = path.join(format!("qtable-{today}.pickle"));

    let mut file_json = BufWriter::new(File::create(&q_json)?);
    serde_json::to_writer(&mut file_json, q)?;
    file_json.flush()?;

    let mut file = BufWriter::new(File::create(&q_pickle)?);
    serde_pickle::to_writer(&mut file, q, serde_pickle::SerOptions::new())?;
    file.flush()?;

    log::info!(
        "saved {} states to {} and {}",
        q.len(),
        q_json.display(),
        q_pickle.display()
    );
    Ok((q_json, q_pickle))
}

pub fn q_table_from_disk_pickle(file: &Path) -> Result<QTable> {
    let mut reader = BufReader::new(File::open(file)?);
    let mut buf: Vec<u8> = vec![];
    reader.read_to_end(&mut buf)?;
    let decoded: QTable = serde_pickle::from_slice(&buf, serde_pickle::DeOptions::new())?;
    Ok(decoded)
}

pub fn q_table_from_disk_json(file: &Path) -> Result<QTable> {
    let reader = BufReader::new(File::open(file)?);
    let decoded: QTable = serde_json::from_reader(reader)?;
    Ok(decoded)
}

/// Loads JSON when the extension says so, pickle otherwise.
pub fn q_table_from_disk(file: &Path) -> Result<QTable> {
    let q = match file.extension().and_then(|ext| ext.to_str()) {
        Some("json") => q_table_from_disk_json(file)?,
        _ => q_table_from_disk_pickle(file)?,
    };
    log::info!("loaded {} states from {}", q.len(), file.display());
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StateKey {
        s.parse().unwrap()
    }

    #[test]
    fn unseen_key_defaults_to_zero() {
        let mut q = QTable::new();
        let k = key("000010000");
        assert!(q.peek(&k).is_none());
        assert_eq!(q.get(&k), [0.0; CELLS]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.get(&k), [0.0; CELLS]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn put_overwrites() {
        let mut q = QTable::new();
        let k = key("120000000");
        let mut values = q.get(&k);
        values[4] = 0.75;
        q.put(k.clone(), values);
        assert_eq!(q.get(&k)[4], 0.75);
        values[4] = -0.25;
        q.put(k.clone(), values);
        assert_eq!(q.peek(&k).unwrap()[4], -0.25);
    }

    #[test]
    fn disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut q = QTable::new();
        q.put(key("000000000"), [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]);
        q.put(key("120000000"), [0.0, 0.0, -1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 1.0]);

        let (json, pickle) = q_table_to_disk(dir.path(), &q).unwrap();
        assert!(json.to_string_lossy().ends_with(".json"));
        assert_eq!(q_table_from_disk_json(&json).unwrap(), q);
        assert_eq!(q_table_from_disk_pickle(&pickle).unwrap(), q);
        assert_eq!(q_table_from_disk(&pickle).unwrap(), q);
    }

    #[test]
    fn loading_rejects_malformed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"0120": [0,0,0,0,0,0,0,0,0]}"#).unwrap();
        assert!(q_table_from_disk_json(&path).is_err());
    }
}
