//! Snapshot-backed tree client: replays a recorded content tree through
//! the engine's client boundary, for dry runs and tests.

use arbor_core::{Node, NodeKind};
use arbor_engine::{ClientError, RemoteTreeClient};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A recorded content tree, as serialized to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    /// Prefix prepended to an entry's slash-joined location to form its
    /// deep link. Entries get no link when this is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_prefix: Option<String>,
    #[serde(default)]
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SnapshotEntry {
    Leaf {
        name: String,
        /// Remote type label, e.g. "Report" or "Data module".
        kind: String,
    },
    Folder {
        name: String,
        #[serde(default)]
        entries: Vec<SnapshotEntry>,
    },
}

impl SnapshotEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name, .. } | Self::Folder { name, .. } => name,
        }
    }
}

impl TreeSnapshot {
    pub fn from_file(path: &Utf8Path) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Total number of entries, folders included, at every depth.
    pub fn entry_count(&self) -> usize {
        fn count(entries: &[SnapshotEntry]) -> usize {
            entries
                .iter()
                .map(|e| match e {
                    SnapshotEntry::Leaf { .. } => 1,
                    SnapshotEntry::Folder { entries, .. } => 1 + count(entries),
                })
                .sum()
        }
        count(&self.entries)
    }
}

/// `RemoteTreeClient` over a [`TreeSnapshot`].
///
/// Navigation is modeled strictly: entering a folder the snapshot does
/// not contain, or leaving the root, fails the same way a live session
/// would.
pub struct SnapshotTreeClient {
    snapshot: TreeSnapshot,
    path: Vec<String>,
    open: bool,
}

impl SnapshotTreeClient {
    pub fn new(snapshot: TreeSnapshot) -> Self {
        Self {
            snapshot,
            path: Vec::new(),
            open: true,
        }
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self, SnapshotError> {
        Ok(Self::new(TreeSnapshot::from_file(path)?))
    }

    fn current(&self) -> Result<&[SnapshotEntry], ClientError> {
        if !self.open {
            return Err(ClientError::Session("session is closed".into()));
        }
        let mut cur = self.snapshot.entries.as_slice();
        for seg in &self.path {
            cur = cur
                .iter()
                .find_map(|e| match e {
                    SnapshotEntry::Folder { name, entries } if name == seg => {
                        Some(entries.as_slice())
                    }
                    _ => None,
                })
                .ok_or_else(|| {
                    ClientError::Session(format!("position desynchronized at {seg}"))
                })?;
        }
        Ok(cur)
    }

    fn link_for(&self, name: &str) -> Option<String> {
        let prefix = self.snapshot.link_prefix.as_deref()?;
        let mut location = self.path.join("/");
        if !location.is_empty() {
            location.push('/');
        }
        location.push_str(name);
        Some(format!("{prefix}{location}"))
    }
}

impl RemoteTreeClient for SnapshotTreeClient {
    fn list_current_folder(&mut self) -> Result<Vec<Node>, ClientError> {
        let path = self.path.clone();
        let nodes = self
            .current()?
            .iter()
            .map(|entry| {
                let kind = match entry {
                    SnapshotEntry::Leaf { kind, .. } => NodeKind::from_label(kind),
                    SnapshotEntry::Folder { .. } => NodeKind::Folder,
                };
                let mut node = Node::new(kind, entry.name(), path.clone());
                node.link = self.link_for(entry.name());
                node
            })
            .collect();
        Ok(nodes)
    }

    fn enter_folder(&mut self, name: &str) -> Result<(), ClientError> {
        let exists = self
            .current()?
            .iter()
            .any(|e| matches!(e, SnapshotEntry::Folder { name: n, .. } if n == name));
        if !exists {
            return Err(ClientError::ElementNotFound(format!(
                "no folder named {name:?} in the snapshot at this level"
            )));
        }
        self.path.push(name.to_string());
        Ok(())
    }

    fn leave_folder(&mut self) -> Result<(), ClientError> {
        if self.path.pop().is_none() {
            return Err(ClientError::NavigationBlocked(
                "already at the snapshot root".into(),
            ));
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.open = false;
        debug!("replay session closed");
    }
}
