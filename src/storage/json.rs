//! JSON storage for nodes
//!
//! Nodes are stored in `data/nodes.json` as one pretty-printed JSON array, in
//! insertion order. There is no in-memory cache: every operation re-reads the
//! file, so the file is the only source of truth.
//!
//! A reader/writer lock serializes access within the process. Loads share the
//! lock; every mutation holds the exclusive lock across its whole
//! read-modify-write sequence. Other processes are not coordinated with.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use crate::domain::Node;

/// File name used when none is configured
pub const DEFAULT_FILE_NAME: &str = "nodes.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to {action} nodes in {}: {source}", .path.display())]
    Serialization {
        action: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("node with {field} '{key}' not found")]
    NotFound { field: &'static str, key: String },

    #[error("multiple nodes found with title '{title}' (IDs: {}); use the ID instead", .ids.join(", "))]
    Ambiguous { title: String, ids: Vec<String> },
}

impl StoreError {
    fn id_not_found(id: &str) -> Self {
        StoreError::NotFound {
            field: "ID",
            key: id.to_string(),
        }
    }

    fn title_not_found(title: &str) -> Self {
        StoreError::NotFound {
            field: "title",
            key: title.to_string(),
        }
    }

    /// Returns true for a lookup that matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true for a title lookup that matched several nodes
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, StoreError::Ambiguous { .. })
    }
}

/// Store for node data in a single JSON file
#[derive(Debug)]
pub struct NodeStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl NodeStore {
    /// Creates a store bound to the given file
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Opens the store `file_name` inside `data_dir`, creating the directory
    pub fn open(data_dir: impl AsRef<Path>, file_name: &str) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            action: "create data directory",
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(Self::new(data_dir.join(file_name)))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // The lock guards no data, only the file, so a panic in another holder
    // leaves nothing inconsistent behind.
    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads all nodes, in file order
    ///
    /// A missing or empty file yields an empty collection.
    pub fn load(&self) -> Result<Vec<Node>, StoreError> {
        let _guard = self.read_guard();
        self.read_nodes()
    }

    /// Writes all nodes to the store (full rewrite)
    pub fn save(&self, nodes: &[Node]) -> Result<(), StoreError> {
        let _guard = self.write_guard();
        self.write_nodes(nodes.to_vec())
    }

    /// Replaces the node with the same ID in place, or appends it
    pub fn save_node(&self, node: &Node) -> Result<(), StoreError> {
        let _guard = self.write_guard();
        let mut nodes = self.read_nodes()?;

        match nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node.clone(),
            None => nodes.push(node.clone()),
        }

        self.write_nodes(nodes)
    }

    /// Finds a node by exact ID
    pub fn get_node(&self, id: &str) -> Result<Node, StoreError> {
        self.load()?
            .into_iter()
            .find(|n| n.id.as_str() == id)
            .ok_or_else(|| StoreError::id_not_found(id))
    }

    /// Finds the single node whose title matches, ignoring case
    pub fn get_node_by_title(&self, title: &str) -> Result<Node, StoreError> {
        let mut matches: Vec<Node> = self
            .load()?
            .into_iter()
            .filter(|n| n.title_matches(title))
            .collect();

        match matches.len() {
            0 => Err(StoreError::title_not_found(title)),
            1 => Ok(matches.remove(0)),
            _ => Err(StoreError::Ambiguous {
                title: title.to_string(),
                ids: matches.into_iter().map(|n| n.id.to_string()).collect(),
            }),
        }
    }

    /// Finds a node by ID, falling back to a title lookup
    ///
    /// Only a missing ID falls through to the title; any other failure is
    /// returned as is.
    pub fn get_node_by_id_or_title(&self, identifier: &str) -> Result<Node, StoreError> {
        match self.get_node(identifier) {
            Err(e) if e.is_not_found() => self.get_node_by_title(identifier),
            other => other,
        }
    }

    /// Returns false if a node other than `exclude_id` already uses `title`
    ///
    /// An empty `exclude_id` excludes nothing.
    pub fn is_title_unique(&self, title: &str, exclude_id: &str) -> Result<bool, StoreError> {
        let taken = self
            .load()?
            .iter()
            .filter(|n| exclude_id.is_empty() || n.id.as_str() != exclude_id)
            .any(|n| n.title_matches(title));

        Ok(!taken)
    }

    /// Overwrites the node with ID `id`, returning what was stored
    ///
    /// The stored node always keeps the original `id` and `created_at`,
    /// whatever `updated` carries.
    pub fn update_node(&self, id: &str, mut updated: Node) -> Result<Node, StoreError> {
        let _guard = self.write_guard();
        let mut nodes = self.read_nodes()?;

        let slot = nodes
            .iter_mut()
            .find(|n| n.id.as_str() == id)
            .ok_or_else(|| StoreError::id_not_found(id))?;

        updated.id = slot.id.clone();
        updated.created_at = slot.created_at;
        updated.updated_at = updated.updated_at.max(slot.created_at);
        updated.operations.retain(|op| !op.trim().is_empty());
        *slot = updated.clone();

        self.write_nodes(nodes)?;
        Ok(updated)
    }

    /// Removes the node with ID `id`
    ///
    /// Nothing is written when no node matches.
    pub fn delete_node(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_guard();
        let mut nodes = self.read_nodes()?;

        let before = nodes.len();
        nodes.retain(|n| n.id.as_str() != id);
        if nodes.len() == before {
            return Err(StoreError::id_not_found(id));
        }

        self.write_nodes(nodes)
    }

    /// Reads the file; callers must hold the lock
    fn read_nodes(&self) -> Result<Vec<Node>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    action: "read",
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Files written by older versions may hold `null` for an empty list
        let nodes: Option<Vec<Node>> =
            serde_json::from_str(&content).map_err(|source| StoreError::Serialization {
                action: "parse",
                path: self.path.clone(),
                source,
            })?;

        Ok(nodes.unwrap_or_default())
    }

    /// Writes the file through a temp file and rename; callers must hold the
    /// exclusive lock
    ///
    /// Blank operation entries are dropped on the way out.
    fn write_nodes(&self, mut nodes: Vec<Node>) -> Result<(), StoreError> {
        for node in &mut nodes {
            node.operations.retain(|op| !op.trim().is_empty());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                action: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.temp_path();
        let result = self.write_temp(&temp_path, &nodes).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Io {
                action: "replace",
                path: self.path.clone(),
                source,
            })
        });

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_temp(&self, temp_path: &Path, nodes: &[Node]) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            action: "write",
            path: temp_path.to_path_buf(),
            source,
        };

        let file = File::create(temp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(&file);

        serde_json::to_writer_pretty(&mut writer, nodes).map_err(|source| {
            StoreError::Serialization {
                action: "serialize",
                path: self.path.clone(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        drop(writer);

        file.sync_all().map_err(io_err)
    }

    /// Sibling temp file: `nodes.json` -> `nodes.json.tmp`
    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}
