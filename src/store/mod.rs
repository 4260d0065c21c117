pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub submissions: sled::Tree,
    pub workers: sled::Tree,
    pub stores: sled::Tree,
    pub products: sled::Tree,
    pub questions: sled::Tree,
    pub admins: sled::Tree,
    pub meta: sled::Tree,
    // Secondary index trees
    pub submission_identity: sled::Tree,
    pub submissions_by_date: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let submissions = db.open_tree(trees::SUBMISSIONS)?;
        let workers = db.open_tree(trees::WORKERS)?;
        let stores = db.open_tree(trees::STORES)?;
        let products = db.open_tree(trees::PRODUCTS)?;
        let questions = db.open_tree(trees::QUESTIONS)?;
        let admins = db.open_tree(trees::ADMINS)?;
        let meta = db.open_tree(trees::META)?;
        // Secondary index trees
        let submission_identity = db.open_tree(trees::SUBMISSION_IDENTITY)?;
        let submissions_by_date = db.open_tree(trees::SUBMISSIONS_BY_DATE)?;

        Ok(Self {
            db,
            submissions,
            workers,
            stores,
            products,
            questions,
            admins,
            meta,
            submission_identity,
            submissions_by_date,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
