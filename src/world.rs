//! World Provisioning
//!
//! Arena worlds are per-arena copies of a map directory. The provider
//! copies, loads, unloads and deletes them. Failures are logged and
//! reported as `false`/`None`, never propagated.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use serde::{Serialize, Deserialize};
use tracing::{debug, error, info, warn};

/// A loaded world backing an arena.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaWorld {
    /// World name, unique among loaded worlds
    pub name: String,
    /// Directory the world lives in
    pub folder: PathBuf,
}

/// World lifecycle operations used at arena build and close.
pub trait WorldProvider {
    /// Directory a world of this name lives in.
    fn world_path(&self, name: &str) -> PathBuf;

    /// Load a world by name.
    fn load_world(&mut self, name: &str) -> Option<ArenaWorld>;

    /// Unload a world. Returns false if it was not loaded.
    fn unload_world(&mut self, name: &str) -> bool;

    /// Recursively copy a directory.
    fn copy_directory(&self, from: &Path, to: &Path) -> bool;

    /// Recursively delete a directory.
    fn remove_directory(&self, path: &Path) -> bool;
}

/// Filesystem-backed worlds under one root directory.
#[derive(Debug)]
pub struct DirectoryWorlds {
    root: PathBuf,
    loaded: BTreeSet<String>,
}

impl DirectoryWorlds {
    /// Worlds live under `root`, one directory each.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: BTreeSet::new(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a world is currently loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }
}

impl WorldProvider for DirectoryWorlds {
    fn world_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn load_world(&mut self, name: &str) -> Option<ArenaWorld> {
        let folder = self.world_path(name);
        if !folder.is_dir() {
            warn!(world = name, folder = %folder.display(), "world directory missing");
            return None;
        }

        self.loaded.insert(name.to_string());
        info!(world = name, "world loaded");
        Some(ArenaWorld {
            name: name.to_string(),
            folder,
        })
    }

    fn unload_world(&mut self, name: &str) -> bool {
        let unloaded = self.loaded.remove(name);
        if unloaded {
            info!(world = name, "world unloaded");
        }
        unloaded
    }

    fn copy_directory(&self, from: &Path, to: &Path) -> bool {
        match copy_recursive(from, to) {
            Ok(()) => true,
            Err(e) => {
                error!(from = %from.display(), to = %to.display(), "copy failed: {}", e);
                false
            }
        }
    }

    fn remove_directory(&self, path: &Path) -> bool {
        match fs::remove_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), "remove failed: {}", e);
                false
            }
        }
    }
}

fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Names of the map directories under `dir`, sorted.
///
/// An unreadable directory yields no maps.
pub fn list_maps(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), "cannot list maps: {}", e);
            return Vec::new();
        }
    };

    let mut maps: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    maps.sort();
    debug!(dir = %dir.display(), count = maps.len(), "listed maps");
    maps
}

/// Load a world on the blocking pool without stalling the caller's task.
pub async fn load_world_async<P>(provider: Arc<Mutex<P>>, name: String) -> Option<ArenaWorld>
where
    P: WorldProvider + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        let mut provider = match provider.lock() {
            Ok(provider) => provider,
            Err(e) => {
                error!(world = %name, "world provider lock poisoned: {}", e);
                return None;
            }
        };
        provider.load_world(&name)
    });

    match task.await {
        Ok(world) => world,
        Err(e) => {
            error!("world load task failed: {}", e);
            None
        }
    }
}
