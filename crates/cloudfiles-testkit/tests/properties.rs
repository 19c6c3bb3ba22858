//! All-or-nothing properties of batch ingestion.

use proptest::prelude::*;

use cloudfiles::ingest_in_transaction;
use cloudfiles::store::{FileRepository, MemoryStore, SqliteStore};
use cloudfiles::{Checksum, File, IngestionError, OwnerId};
use cloudfiles_testkit::faults::{Fault, FaultyRepository};
use cloudfiles_testkit::generators::{batch_with_duplicate, owner, unique_batch};

/// Owner-stamped copies of `files`, committed directly.
fn seed(store: &SqliteStore, owner: &OwnerId, files: &[File]) {
    let mut tx = store.begin().unwrap();
    for file in files {
        let mut file = file.clone();
        file.stamp_owner(owner.clone());
        file.refresh_checksum();
        tx.insert(&file).unwrap();
    }
    tx.commit().unwrap();
}

fn names(store: &MemoryStore, owner: &OwnerId) -> Vec<String> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    rt.block_on(store.list_by_owner(owner))
        .unwrap()
        .into_iter()
        .map(|f| f.metadata.name)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unique_batches_commit_in_order(owner in owner(), batch in unique_batch(12)) {
        let store = MemoryStore::new();
        let expected: Vec<String> = batch.iter().map(|f| f.name().to_string()).collect();

        let stored = ingest_in_transaction(&store, &owner, batch.clone(), None).unwrap();

        prop_assert_eq!(stored.len(), batch.len());
        for (info, file) in stored.iter().zip(&batch) {
            prop_assert_eq!(info.checksum, Checksum::compute(&file.data));
        }
        prop_assert_eq!(names(&store, &owner), expected);
    }

    #[test]
    fn duplicate_anywhere_keeps_nothing((batch, conflict) in batch_with_duplicate(8)) {
        let store = MemoryStore::new();
        let owner = OwnerId::new("alice");

        let err = ingest_in_transaction(&store, &owner, batch, None).unwrap_err();

        match err {
            IngestionError::Item { index, .. } => prop_assert_eq!(index, conflict),
            other => prop_assert!(false, "unexpected error: {}", other),
        }
        prop_assert!(store.is_empty());
    }

    #[test]
    fn injected_failure_keeps_nothing(batch in unique_batch(8), at in 0usize..8) {
        prop_assume!(at < batch.len());
        let repo = FaultyRepository::new(MemoryStore::new(), Fault::FailInsert(at));

        let err = ingest_in_transaction(&repo, &OwnerId::new("alice"), batch, None).unwrap_err();

        let is_item_at = matches!(err, IngestionError::Item { index, .. } if index == at);
        prop_assert!(is_item_at);
        prop_assert!(repo.inner().is_empty());
    }

    #[test]
    fn failed_batch_preserves_existing_files(
        existing in unique_batch(6),
        (batch, _) in batch_with_duplicate(6),
    ) {
        let store = SqliteStore::open_memory().unwrap();
        let owner = OwnerId::new("alice");
        seed(&store, &owner, &existing);

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let list = |store: &SqliteStore| {
            rt.block_on(store.list_by_owner(&owner))
                .unwrap()
        };
        let before = list(&store);

        prop_assert!(ingest_in_transaction(&store, &owner, batch, None).is_err());
        prop_assert_eq!(list(&store), before);
    }
}
