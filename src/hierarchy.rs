//! Folder tree reconstruction.
//!
//! The reporting service lists folders as a flat array of parent pointers.
//! [`resolve`] turns that list into a [`FolderHierarchy`] and computes the
//! `/`-joined path of every folder, root first.
//!
//! Parent chains are walked with a visited set. A parent id that is unknown,
//! or that was already seen on the current walk, ends the chain as if the
//! folder above it were a root.

use std::collections::{HashMap, HashSet};

use crate::models::{FolderRecord, ResolvedFolder};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FolderNode {
    name: String,
    parent_id: Option<String>,
}

/// Immutable `id -> {name, parent_id}` map for one environment.
#[derive(Debug, Clone, Default)]
pub struct FolderHierarchy {
    nodes: HashMap<String, FolderNode>,
}

impl FolderHierarchy {
    pub fn from_records(records: &[FolderRecord]) -> Self {
        let nodes = records
            .iter()
            .map(|r| {
                (
                    r.id.clone(),
                    FolderNode {
                        name: r.name.clone(),
                        parent_id: r.parent_id.clone(),
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names of `start` and all of its ancestors, root first.
    ///
    /// `seen` holds ids that must not be entered; the walk adds every id it
    /// visits. Returns an empty list when `start` is `None` or unknown.
    pub(crate) fn ancestor_names(
        &self,
        start: Option<&str>,
        seen: &mut HashSet<String>,
    ) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = start.filter(|id| !id.is_empty());

        while let Some(id) = current {
            if !seen.insert(id.to_string()) {
                tracing::warn!(folder_id = id, "cycle in folder hierarchy, treating as root");
                break;
            }
            let Some(node) = self.nodes.get(id) else {
                break;
            };
            names.push(node.name.clone());
            current = node.parent_id.as_deref().filter(|p| !p.is_empty());
        }

        names.reverse();
        names
    }

    /// `/`-joined path of the folder `id` itself, root first.
    pub fn path_of(&self, id: &str) -> Option<String> {
        if !self.contains(id) {
            return None;
        }
        let mut seen = HashSet::new();
        Some(self.ancestor_names(Some(id), &mut seen).join("/"))
    }
}

/// Build the hierarchy and compute a full path for every record.
///
/// Output order follows input order.
pub fn resolve(records: &[FolderRecord]) -> (FolderHierarchy, Vec<ResolvedFolder>) {
    let hierarchy = FolderHierarchy::from_records(records);

    let resolved = records
        .iter()
        .map(|record| {
            let mut seen = HashSet::from([record.id.clone()]);
            let mut segments = hierarchy.ancestor_names(record.parent_id.as_deref(), &mut seen);
            segments.push(record.name.clone());

            ResolvedFolder {
                id: record.id.clone(),
                name: record.name.clone(),
                parent_id: record.parent_id.clone(),
                full_path: segments.join("/"),
            }
        })
        .collect();

    (hierarchy, resolved)
}
