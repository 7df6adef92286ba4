//! Single-file JSON document store.
//!
//! The whole [`Database`] lives in memory behind a mutex. Every mutation is
//! applied to a copy, written to `<path>.tmp`, renamed over the data file and
//! only then made visible, so a failed write leaves both the file and the
//! in-memory state untouched.

use crate::{models::Database, StoreError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct Store {
    path: PathBuf,
    db: Mutex<Database>,
}

impl Store {
    /// Open the data file, creating it (and its parent directory) when missing.
    /// An empty file is treated as an empty database.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => None,
            Ok(contents) => Some(serde_json::from_str::<Database>(&contents)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(error) => return Err(error.into()),
        };

        let db = match db {
            Some(db) => db,
            None => {
                let db = Database::default();
                persist(&path, &db).await?;
                tracing::info!(path = %path.display(), "initialized empty data file");
                db
            }
        };

        Ok(Self {
            path,
            db: Mutex::new(db),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        let db = self.db.lock().await;
        f(&db)
    }

    /// Apply `f` to the database and persist the result. Nothing is written
    /// when `f` fails.
    pub async fn update<R, E>(
        &self,
        f: impl FnOnce(&mut Database) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut db = self.db.lock().await;
        let mut next = db.clone();
        let result = f(&mut next)?;
        persist(&self.path, &next).await.map_err(E::from)?;
        *db = next;
        Ok(result)
    }
}

async fn persist(path: &Path, db: &Database) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(db)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
