//! Translation of a requested destination value into a source artifact path.

use thiserror::Error;

use crate::locator::CrossEnvironmentIndex;
use crate::models::ContentKind;

/// The requested UI path is not present in the source index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{value}] was not found in the source environment.")]
pub struct LookupMiss {
    pub kind: ContentKind,
    pub value: String,
}

/// Map a requested value to the storage path of its exported artifact.
///
/// Folders are addressed directly by the requested relative path. Dashboards
/// and looks are looked up by UI path in the source index.
pub fn map(
    kind: ContentKind,
    requested: &str,
    source_index: &CrossEnvironmentIndex,
) -> Result<String, LookupMiss> {
    let Some(index) = source_index.kind(kind) else {
        return Ok(requested.to_string());
    };

    index.get(requested).cloned().ok_or_else(|| LookupMiss {
        kind,
        value: requested.to_string(),
    })
}
