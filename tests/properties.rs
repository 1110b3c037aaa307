//! Property tests for folder path resolution.
//!
//! Run with: `cargo test --test properties`

use proptest::prelude::*;
use proptest::sample::Index;

use content_deployer::hierarchy::resolve;
use content_deployer::models::FolderRecord;

/// Acyclic folder lists in shuffled order, each paired with its expected path.
///
/// Folder `i` may only point at a folder `j < i`, so every chain ends at a root.
fn acyclic_folders() -> impl Strategy<Value = Vec<(FolderRecord, String)>> {
    prop::collection::vec(("[A-Za-z0-9 &%_-]{1,8}", any::<bool>(), any::<Index>()), 1..24)
        .prop_map(|raw| {
            let mut out: Vec<(FolderRecord, String)> = Vec::with_capacity(raw.len());
            for (i, (name, is_root, parent)) in raw.into_iter().enumerate() {
                let parent = (i > 0 && !is_root).then(|| parent.index(i));
                let expected = match parent {
                    Some(p) => format!("{}/{}", out[p].1, name),
                    None => name.clone(),
                };
                let parent_id = parent.map(|p| format!("f{}", p));
                let record = FolderRecord::new(&format!("f{}", i), &name, parent_id.as_deref());
                out.push((record, expected));
            }
            out
        })
        .prop_shuffle()
}

/// Folder lists with arbitrary parent pointers, cycles and dangling ids included.
fn arbitrary_folders() -> impl Strategy<Value = Vec<FolderRecord>> {
    prop::collection::vec(("[A-Za-z]{1,4}", 0usize..40), 1..24).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (name, parent))| {
                FolderRecord::new(&format!("f{}", i), &name, Some(&format!("f{}", parent)))
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// Every folder of an acyclic list resolves to its root-to-leaf name chain.
    #[test]
    fn acyclic_paths_run_root_to_leaf(folders in acyclic_folders()) {
        let records: Vec<FolderRecord> = folders.iter().map(|(r, _)| r.clone()).collect();
        let (_, resolved) = resolve(&records);

        prop_assert_eq!(resolved.len(), folders.len());
        for (folder, (record, expected)) in resolved.iter().zip(&folders) {
            prop_assert_eq!(&folder.id, &record.id);
            prop_assert_eq!(&folder.full_path, expected);
        }
    }

    /// Any parent pointers terminate, and no folder appears twice in one path.
    #[test]
    fn arbitrary_parents_terminate(records in arbitrary_folders()) {
        let (_, resolved) = resolve(&records);

        for (folder, record) in resolved.iter().zip(&records) {
            let segments: Vec<&str> = folder.full_path.split('/').collect();
            prop_assert!(segments.len() <= records.len());
            prop_assert_eq!(segments.last().copied(), Some(record.name.as_str()));
        }
    }
}
