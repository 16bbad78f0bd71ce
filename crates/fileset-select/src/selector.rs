//! The selector contract and AND-composition.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use fileset_core::{ScanError, ScanWarning};

/// A per-file inclusion predicate.
///
/// Selectors only ever see files that already passed the include and
/// exclude patterns. Returning `false` drops the file from the result; it is
/// never an error.
pub trait FileSelector: fmt::Debug + Send + Sync {
    /// Whether `file` (at `relative` below `base_dir`) stays in the result.
    fn is_selected(&self, base_dir: &Path, relative: &str, file: &Path) -> bool;

    /// Called once before the first file of a scan.
    fn scan_started(&self, _base_dir: &Path) -> Result<(), ScanError> {
        Ok(())
    }

    /// Called once after the last file of a scan.
    fn scan_finished(&self) -> Result<(), ScanError> {
        Ok(())
    }

    /// Drain warnings collected since the last call.
    fn take_warnings(&self) -> Vec<ScanWarning> {
        Vec::new()
    }
}

impl<T: FileSelector + ?Sized> FileSelector for Box<T> {
    fn is_selected(&self, base_dir: &Path, relative: &str, file: &Path) -> bool {
        (**self).is_selected(base_dir, relative, file)
    }

    fn scan_started(&self, base_dir: &Path) -> Result<(), ScanError> {
        (**self).scan_started(base_dir)
    }

    fn scan_finished(&self) -> Result<(), ScanError> {
        (**self).scan_finished()
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        (**self).take_warnings()
    }
}

impl<T: FileSelector + ?Sized> FileSelector for Arc<T> {
    fn is_selected(&self, base_dir: &Path, relative: &str, file: &Path) -> bool {
        (**self).is_selected(base_dir, relative, file)
    }

    fn scan_started(&self, base_dir: &Path) -> Result<(), ScanError> {
        (**self).scan_started(base_dir)
    }

    fn scan_finished(&self) -> Result<(), ScanError> {
        (**self).scan_finished()
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        (**self).take_warnings()
    }
}

/// Selectors that must all accept a file.
#[derive(Debug, Default)]
pub struct SelectorChain {
    selectors: Vec<Box<dyn FileSelector>>,
}

impl SelectorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, selector: Box<dyn FileSelector>) {
        self.selectors.push(selector);
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl From<Vec<Box<dyn FileSelector>>> for SelectorChain {
    fn from(selectors: Vec<Box<dyn FileSelector>>) -> Self {
        Self { selectors }
    }
}

impl Extend<Box<dyn FileSelector>> for SelectorChain {
    fn extend<I: IntoIterator<Item = Box<dyn FileSelector>>>(&mut self, iter: I) {
        self.selectors.extend(iter);
    }
}

impl FileSelector for SelectorChain {
    fn is_selected(&self, base_dir: &Path, relative: &str, file: &Path) -> bool {
        self.selectors
            .iter()
            .all(|s| s.is_selected(base_dir, relative, file))
    }

    fn scan_started(&self, base_dir: &Path) -> Result<(), ScanError> {
        self.selectors
            .iter()
            .try_for_each(|s| s.scan_started(base_dir))
    }

    /// Every selector is finished even if an earlier one fails; the first
    /// error is returned.
    fn scan_finished(&self) -> Result<(), ScanError> {
        let mut first_error = None;
        for selector in &self.selectors {
            if let Err(e) = selector.scan_finished() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        self.selectors
            .iter()
            .flat_map(|s| s.take_warnings())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(bool);

    impl FileSelector for Fixed {
        fn is_selected(&self, _: &Path, _: &str, _: &Path) -> bool {
            self.0
        }
    }

    #[test]
    fn test_empty_chain_selects_everything() {
        let chain = SelectorChain::new();
        assert!(chain.is_empty());
        assert!(chain.is_selected(Path::new("/b"), "x", Path::new("/b/x")));
    }

    #[test]
    fn test_chain_is_conjunction() {
        let mut chain = SelectorChain::new();
        chain.push(Box::new(Fixed(true)));
        assert!(chain.is_selected(Path::new("/b"), "x", Path::new("/b/x")));
        chain.push(Box::new(Fixed(false)));
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_selected(Path::new("/b"), "x", Path::new("/b/x")));
    }
}
