//! Per-file selectors for fileset scans.
//!
//! A selector is a predicate applied to every file that survived the include
//! and exclude patterns. Selectors configured on a scan are combined with
//! logical AND; containers (`and`, `or`, `not`, `none`, `majority`) combine
//! them further.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fileset_core::{SelectorConfig, UnixFamily};
//! use fileset_select::{FileSelector, build_chain};
//!
//! let family: Arc<dyn fileset_core::PathFamily> = Arc::new(UnixFamily);
//! let chain = build_chain(&[SelectorConfig::Readable], &family)?;
//! assert!(chain.is_selected(base, "src/lib.rs", &base.join("src/lib.rs")));
//! ```
//!
//! Most selectors are stateless. The modified selector keeps a fingerprint
//! cache that is loaded in [`FileSelector::scan_started`] and saved in
//! [`FileSelector::scan_finished`].

mod access;
mod attributes;
mod cache;
mod compare;
mod container;
mod date;
mod factory;
pub mod fingerprint;
mod modified;
mod selector;

pub use access::{
    ExecutableSelector, PermissionsSelector, ReadableSelector, SymlinkSelector, WritableSelector,
};
pub use attributes::{ContainsSelector, DepthSelector, FilenameSelector, SizeSelector};
pub use cache::FingerprintCache;
pub use compare::{DifferentSelector, PresentSelector};
pub use container::{Combine, ContainerSelector, NotSelector};
pub use date::DateSelector;
pub use factory::{build_chain, build_selector};
pub use modified::ModifiedSelector;
pub use selector::{FileSelector, SelectorChain};
