//! Content location and the per-environment UI path index.
//!
//! Every dashboard and look gets two paths built from the same folder prefix:
//!
//! | Path        | Example                         | Used for                  |
//! |-------------|---------------------------------|---------------------------|
//! | `full_path` | `A/B/Dashboard_10_Sales.json`   | artifact on disk          |
//! | `ui_path`   | `A/B/Sales`                     | matching across instances |
//!
//! Numeric ids differ between environments, so deploy requests are matched by
//! `ui_path` and translated to the source `full_path` through a
//! [`CrossEnvironmentIndex`].

use std::collections::{HashMap, HashSet};

use crate::hierarchy::FolderHierarchy;
use crate::models::{ContentItem, ContentKind, ResolvedItem};

/// `ui_path -> full_path` for one content kind.
pub type KindIndex = HashMap<String, String>;

/// UI path indices of one environment, built fresh on every run.
#[derive(Debug, Clone, Default)]
pub struct CrossEnvironmentIndex {
    pub dashboards: KindIndex,
    pub looks: KindIndex,
}

impl CrossEnvironmentIndex {
    pub fn kind(&self, kind: ContentKind) -> Option<&KindIndex> {
        match kind {
            ContentKind::Dashboards => Some(&self.dashboards),
            ContentKind::Looks => Some(&self.looks),
            ContentKind::Folders => None,
        }
    }

    pub fn insert(&mut self, kind: ContentKind, index: KindIndex) {
        match kind {
            ContentKind::Dashboards => self.dashboards = index,
            ContentKind::Looks => self.looks = index,
            ContentKind::Folders => {}
        }
    }
}

/// Artifact filename the export tool writes for an item.
pub fn artifact_name(kind: ContentKind, item: &ContentItem) -> String {
    match kind.file_prefix() {
        Some(prefix) => format!("{}_{}_{}.json", prefix, item.id, item.title),
        None => item.title.clone(),
    }
}

fn join(prefix: &[String], leaf: &str) -> String {
    if prefix.is_empty() {
        leaf.to_string()
    } else {
        format!("{}/{}", prefix.join("/"), leaf)
    }
}

/// Resolve the paths of `items` and build the `ui_path` index for `kind`.
///
/// When two items share a UI path the first one listed keeps the index entry.
pub fn locate(
    items: &[ContentItem],
    hierarchy: &FolderHierarchy,
    kind: ContentKind,
) -> (Vec<ResolvedItem>, KindIndex) {
    let mut index = KindIndex::with_capacity(items.len());
    let mut resolved = Vec::with_capacity(items.len());

    for item in items {
        let mut seen = HashSet::new();
        let prefix = hierarchy.ancestor_names(item.folder_id.as_deref(), &mut seen);

        let full_path = join(&prefix, &artifact_name(kind, item));
        let ui_path = join(&prefix, &item.title);

        if index.contains_key(&ui_path) {
            tracing::warn!(
                kind = kind.as_str(),
                ui_path = %ui_path,
                id = %item.id,
                "duplicate UI path, keeping the first item"
            );
        } else {
            index.insert(ui_path.clone(), full_path.clone());
        }

        resolved.push(ResolvedItem {
            item: item.clone(),
            kind,
            full_path,
            ui_path,
        });
    }

    (resolved, index)
}
