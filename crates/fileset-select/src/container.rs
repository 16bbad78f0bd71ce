//! Selectors that combine other selectors.

use std::path::Path;

use fileset_core::{ScanError, ScanWarning};

use crate::selector::FileSelector;

/// How a container combines its children's votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Every child selects. True when empty.
    All,
    /// At least one child selects. False when empty.
    Any,
    /// No child selects. True when empty.
    NoneOf,
    /// More children select than reject; ties decided by the flag.
    Majority { allow_ties: bool },
}

/// A selector built from nested selectors.
#[derive(Debug)]
pub struct ContainerSelector {
    combine: Combine,
    children: Vec<Box<dyn FileSelector>>,
}

impl ContainerSelector {
    pub fn new(combine: Combine, children: Vec<Box<dyn FileSelector>>) -> Self {
        Self { combine, children }
    }
}

impl FileSelector for ContainerSelector {
    fn is_selected(&self, base_dir: &Path, relative: &str, file: &Path) -> bool {
        let mut votes = self
            .children
            .iter()
            .map(|c| c.is_selected(base_dir, relative, file));
        match self.combine {
            Combine::All => votes.all(|v| v),
            Combine::Any => votes.any(|v| v),
            Combine::NoneOf => !votes.any(|v| v),
            Combine::Majority { allow_ties } => {
                let yes = votes.filter(|v| *v).count();
                let no = self.children.len() - yes;
                yes > no || (yes == no && allow_ties)
            }
        }
    }

    fn scan_started(&self, base_dir: &Path) -> Result<(), ScanError> {
        self.children.iter().try_for_each(|c| c.scan_started(base_dir))
    }

    fn scan_finished(&self) -> Result<(), ScanError> {
        self.children.iter().try_for_each(|c| c.scan_finished())
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        self.children.iter().flat_map(|c| c.take_warnings()).collect()
    }
}

/// Inverts a single selector.
#[derive(Debug)]
pub struct NotSelector {
    inner: Box<dyn FileSelector>,
}

impl NotSelector {
    pub fn new(inner: Box<dyn FileSelector>) -> Self {
        Self { inner }
    }
}

impl FileSelector for NotSelector {
    fn is_selected(&self, base_dir: &Path, relative: &str, file: &Path) -> bool {
        !self.inner.is_selected(base_dir, relative, file)
    }

    fn scan_started(&self, base_dir: &Path) -> Result<(), ScanError> {
        self.inner.scan_started(base_dir)
    }

    fn scan_finished(&self) -> Result<(), ScanError> {
        self.inner.scan_finished()
    }

    fn take_warnings(&self) -> Vec<ScanWarning> {
        self.inner.take_warnings()
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

    fn votes(values: &[bool]) -> Vec<Box<dyn FileSelector>> {
        values
            .iter()
            .map(|v| Box::new(Fixed(*v)) as Box<dyn FileSelector>)
            .collect()
    }

    fn eval(combine: Combine, values: &[bool]) -> bool {
        ContainerSelector::new(combine, votes(values)).is_selected(
            Path::new("/b"),
            "f",
            Path::new("/b/f"),
        )
    }

    #[test]
    fn test_empty_containers() {
        assert!(eval(Combine::All, &[]));
        assert!(!eval(Combine::Any, &[]));
        assert!(eval(Combine::NoneOf, &[]));
        assert!(eval(Combine::Majority { allow_ties: true }, &[]));
        assert!(!eval(Combine::Majority { allow_ties: false }, &[]));
    }

    #[test]
    fn test_combinations() {
        assert!(!eval(Combine::All, &[true, false]));
        assert!(eval(Combine::Any, &[false, true]));
        assert!(!eval(Combine::NoneOf, &[false, true]));
        assert!(eval(Combine::Majority { allow_ties: false }, &[true, true, false]));
        assert!(!eval(Combine::Majority { allow_ties: false }, &[true, false]));
        assert!(eval(Combine::Majority { allow_ties: true }, &[true, false]));
    }

    #[test]
    fn test_not() {
        let s = NotSelector::new(Box::new(Fixed(false)));
        assert!(s.is_selected(Path::new("/b"), "f", Path::new("/b/f")));
    }
}
