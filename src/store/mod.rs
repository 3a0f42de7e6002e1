pub mod config;
pub mod lock;

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::model::{Actor, Event, Snapshot};

/// Error type for workspace persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a clarity workspace: {0} has no db.json")]
    NotFound(PathBuf),
    #[error("corrupt {what}: {detail}")]
    Corrupt { what: String, detail: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence for one workspace directory.
///
/// Layout under `dir`:
///   config.toml        optional workspace config
///   db.json            snapshot, replaced atomically on save
///   events/log.jsonl   append-only event log, one record per line
///   attachments/<id>   attachment blobs
///   .lock              advisory flock held by the TUI
#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    /// Next event seq to assign; derived from the log tail on open
    next_seq: u64,
}

impl Store {
    /// Bind an existing workspace directory.
    pub fn open(dir: &Path) -> Result<Store, StoreError> {
        if !dir.join("db.json").exists() {
            return Err(StoreError::NotFound(dir.to_path_buf()));
        }
        let next_seq = last_seq(&events_path(dir))? + 1;
        Ok(Store {
            dir: dir.to_path_buf(),
            next_seq,
        })
    }

    /// Create the workspace layout with an empty snapshot owned by `owner`.
    /// Fails if a snapshot already exists.
    pub fn init(dir: &Path, owner: Actor) -> Result<Store, StoreError> {
        let db = dir.join("db.json");
        if db.exists() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", db.display()),
            )));
        }
        fs::create_dir_all(dir.join("events"))?;
        fs::create_dir_all(dir.join("attachments"))?;

        let mut snapshot = Snapshot::default();
        snapshot.actors.insert(owner.id.clone(), owner);

        let store = Store {
            dir: dir.to_path_buf(),
            next_seq: 1,
        };
        store.save(&snapshot)?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.dir.join("attachments")
    }

    /// Load the snapshot from disk.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let path = self.dir.join("db.json");
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.dir.clone()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
            what: "db.json".into(),
            detail: e.to_string(),
        })
    }

    /// Atomically replace the snapshot: write to a temp file in the same
    /// directory, fsync, then rename over db.json. Readers observe either
    /// the old snapshot or the new one in full.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(snapshot).map_err(|e| StoreError::Corrupt {
            what: "snapshot".into(),
            detail: e.to_string(),
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.dir.join("db.json"))
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    /// Append events to the log, assigning monotonically increasing seq.
    /// Durable (fsynced) before return.
    pub fn append_events(&mut self, events: &mut [Event]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }
        let path = events_path(&self.dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        for event in events.iter_mut() {
            event.seq = self.next_seq;
            self.next_seq += 1;
            let line = serde_json::to_string(event).map_err(|e| StoreError::Corrupt {
                what: "event".into(),
                detail: e.to_string(),
            })?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
        Ok(())
    }

    /// Read events with `seq >= from_seq`, in strictly increasing order.
    pub fn read_events(&self, from_seq: u64) -> Result<Vec<Event>, StoreError> {
        let path = events_path(&self.dir);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                what: format!("events/log.jsonl line {}", idx + 1),
                detail: e.to_string(),
            })?;
            if event.seq >= from_seq {
                events.push(event);
            }
        }
        Ok(events)
    }
}

fn events_path(dir: &Path) -> PathBuf {
    dir.join("events").join("log.jsonl")
}

/// Highest seq in the log, 0 when the log is absent or empty
fn last_seq(path: &Path) -> Result<u64, StoreError> {
    if !path.exists() {
        return Ok(0);
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut last = 0u64;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
            what: format!("events/log.jsonl line {}", idx + 1),
            detail: e.to_string(),
        })?;
        last = last.max(event.seq);
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use chrono::Utc;
    use tempfile::TempDir;

    fn owner() -> Actor {
        Actor::human("h1", "Ada", Utc::now())
    }

    #[test]
    fn init_then_open_and_load() {
        let tmp = TempDir::new().unwrap();
        Store::init(tmp.path(), owner()).unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let snap = store.load().unwrap();
        assert!(snap.actors.contains_key("h1"));
        assert!(tmp.path().join("events").is_dir());
        assert!(tmp.path().join("attachments").is_dir());
    }

    #[test]
    fn open_missing_workspace_is_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Store::open(tmp.path()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_snapshot_surfaces() {
        let tmp = TempDir::new().unwrap();
        Store::init(tmp.path(), owner()).unwrap();
        fs::write(tmp.path().join("db.json"), "{not json").unwrap();
        let store = Store::open(tmp.path()).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn append_assigns_monotonic_seq_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut store = Store::init(tmp.path(), owner()).unwrap();
        let mut batch = vec![
            Event::new(
                EventKind::ItemCreate,
                "i1",
                "h1",
                Utc::now(),
                serde_json::json!({}),
            ),
            Event::new(
                EventKind::ItemUpdate,
                "i1",
                "h1",
                Utc::now(),
                serde_json::json!({}),
            ),
        ];
        store.append_events(&mut batch).unwrap();
        assert_eq!(batch[0].seq, 1);
        assert_eq!(batch[1].seq, 2);

        // Reopen derives next_seq from the tail
        let mut store = Store::open(tmp.path()).unwrap();
        let mut more = vec![Event::new(
            EventKind::ItemArchive,
            "i1",
            "h1",
            Utc::now(),
            serde_json::json!({}),
        )];
        store.append_events(&mut more).unwrap();
        assert_eq!(more[0].seq, 3);

        let tail = store.read_events(2).unwrap();
        let seqs: Vec<u64> = tail.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 3]);
    }
}
