use crate::store::keys;
use crate::store::operations::submissions::Submission;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_submission_indexes", m002_submission_indexes),
    ]
}

/// Applies every migration newer than the persisted schema version.
///
/// Each migration must be idempotent: the process can die after a migration
/// ran but before its version was recorded, in which case it runs again on the
/// next start. Versions only move forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().unwrap_or([0; 4]);
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Rebuilds the identity and date indexes from the primary submissions tree.
fn m002_submission_indexes(store: &Store) -> Result<(), StoreError> {
    for item in store.submissions.iter() {
        let (_, value) = item?;
        let submission: Submission = Store::deserialize(&value)?;

        let identity_key = submission.identity_key();
        if let Some(existing) = store.submission_identity.get(identity_key.as_bytes())? {
            if existing.as_ref() != submission.id.as_bytes() {
                return Err(StoreError::Migration {
                    version: 2,
                    message: format!("duplicate submission identity {identity_key}"),
                });
            }
        }
        store
            .submission_identity
            .insert(identity_key.as_bytes(), submission.id.as_bytes())?;

        let date_key = keys::submission_date_key(&submission.date, &submission.id);
        store
            .submissions_by_date
            .insert(date_key.as_bytes(), submission.id.as_bytes())?;
    }

    Ok(())
}
