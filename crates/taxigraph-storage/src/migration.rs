//! Schema versioning shared by the on-disk backends

use crate::{StorageError, StorageResult};

/// Schema version written by this build
pub const CURRENT_VERSION: u32 = 1;

/// One step in the schema history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
}

/// Every schema version in ascending order; the last entry is `CURRENT_VERSION`
pub const HISTORY: &[SchemaVersion] = &[SchemaVersion {
    version: 1,
    description: "Nodes keyed by id with a (label, id) index, CONNECTS edges in creation order",
}];

/// Versions still to apply to a store currently at `stored`
pub fn pending(stored: u32, target: u32) -> impl Iterator<Item = &'static SchemaVersion> {
    HISTORY
        .iter()
        .filter(move |step| step.version > stored && step.version <= target)
}

/// Version bookkeeping plus the per-backend schema step for each version
pub trait Migratable {
    /// Stored version, 0 for a fresh store
    fn get_schema_version(&self) -> StorageResult<u32>;

    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    /// Apply the schema changes introduced by `version`
    fn run_migration(&self, version: u32) -> StorageResult<()>;

    /// Bring the store up to `target`. A store written by a newer build is refused.
    fn migrate_to(&self, target: u32) -> StorageResult<()> {
        let stored = self.get_schema_version()?;

        if stored > target {
            return Err(StorageError::Migration(format!(
                "Store is at schema version {} but this build only knows up to {}",
                stored, target
            )));
        }

        for step in pending(stored, target) {
            tracing::info!("Applying schema v{}: {}", step.version, step.description);
            self.run_migration(step.version)?;
            self.set_schema_version(step.version)?;
        }

        tracing::debug!("Schema at version {}", target);
        Ok(())
    }

    fn migrate_to_latest(&self) -> StorageResult<()> {
        self.migrate_to(CURRENT_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recorder {
        version: Cell<u32>,
        applied: RefCell<Vec<u32>>,
    }

    impl Migratable for Recorder {
        fn get_schema_version(&self) -> StorageResult<u32> {
            Ok(self.version.get())
        }

        fn set_schema_version(&self, version: u32) -> StorageResult<()> {
            self.version.set(version);
            Ok(())
        }

        fn run_migration(&self, version: u32) -> StorageResult<()> {
            self.applied.borrow_mut().push(version);
            Ok(())
        }
    }

    #[test]
    fn test_history_ends_at_current() {
        assert_eq!(HISTORY.last().map(|s| s.version), Some(CURRENT_VERSION));
        assert!(HISTORY.windows(2).all(|w| w[0].version < w[1].version));
    }

    #[test]
    fn test_fresh_store_migrates_once() {
        let store = Recorder::default();
        store.migrate_to_latest().unwrap();
        store.migrate_to_latest().unwrap();

        assert_eq!(store.version.get(), CURRENT_VERSION);
        assert_eq!(*store.applied.borrow(), vec![1]);
    }

    #[test]
    fn test_newer_store_refused() {
        let store = Recorder::default();
        store.version.set(CURRENT_VERSION + 1);

        let err = store.migrate_to_latest().unwrap_err();
        assert!(matches!(err, StorageError::Migration(_)));
        assert!(store.applied.borrow().is_empty());
    }
}
