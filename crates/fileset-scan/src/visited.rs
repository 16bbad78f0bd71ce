//! Cycle detection for link following.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

/// Tracks the directories of the walk to spot links that loop.
///
/// Only consulted when symbolic links are followed. A linked directory is a
/// cycle when its target is one of the directories on the branch that leads
/// to the link. Links to anywhere else are walked, even when the target is
/// reached again through another path. Skipped links are remembered so they
/// can be reported.
#[derive(Debug, Default)]
pub struct VisitedDirs {
    canonical: DashMap<PathBuf, PathBuf>,
    cycles: Mutex<Vec<PathBuf>>,
}

impl VisitedDirs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the directory `link` resolves to one of its ancestors
    /// between its parent and `root`.
    ///
    /// Links that cannot be resolved never loop.
    pub fn loops_back(&self, link: &Path, root: &Path) -> bool {
        let Ok(target) = link.canonicalize() else {
            return false;
        };
        link.ancestors()
            .skip(1)
            .take_while(|ancestor| ancestor.starts_with(root))
            .any(|ancestor| self.canonical_of(ancestor).is_some_and(|c| c == target))
    }

    /// Canonical form of a walked directory, resolved once per path.
    fn canonical_of(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(known) = self.canonical.get(dir) {
            return Some(known.clone());
        }
        let resolved = dir.canonicalize().ok()?;
        self.canonical.insert(dir.to_path_buf(), resolved.clone());
        Some(resolved)
    }

    /// Remember a link that was not descended.
    pub fn record_cycle(&self, link: PathBuf) {
        self.cycles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(link);
    }

    /// Links skipped so far, in walk order.
    pub fn take_cycles(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.cycles.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
