use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stable identifier for one page within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub page_id: String,
}

/// Per-document job output: the ordering of `pages` defines the index space
/// that `suggested_exclude_indices` refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArtifact {
    pub pages: Vec<PageRef>,
    pub suggested_exclude_indices: Vec<usize>,
}

impl JobArtifact {
    pub fn new(page_count: usize, suggested_exclude_indices: Vec<usize>) -> Self {
        JobArtifact {
            pages: (0..page_count)
                .map(|i| PageRef {
                    page_id: format!("page-{}", i + 1),
                })
                .collect(),
            suggested_exclude_indices,
        }
    }
}

/// Write a value as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut data = serde_json::to_string_pretty(value)?;
    data.push('\n');
    std::fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("malformed JSON in {}", path.display()))
}
