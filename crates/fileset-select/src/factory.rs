//! Turns [`SelectorConfig`] values into selectors.

use std::sync::Arc;

use fileset_core::{ConfigError, PathFamily, SelectorConfig};

use crate::access::{
    ExecutableSelector, PermissionsSelector, ReadableSelector, SymlinkSelector, WritableSelector,
};
use crate::attributes::{ContainsSelector, DepthSelector, FilenameSelector, SizeSelector};
use crate::compare::{DifferentSelector, PresentSelector};
use crate::container::{Combine, ContainerSelector, NotSelector};
use crate::date::DateSelector;
use crate::modified::ModifiedSelector;
use crate::selector::{FileSelector, SelectorChain};

/// Build one selector, validating it first.
///
/// `family` decides how relative paths handed to the selector are split.
pub fn build_selector(
    config: &SelectorConfig,
    family: &Arc<dyn PathFamily>,
) -> Result<Box<dyn FileSelector>, ConfigError> {
    config.validate()?;
    Ok(build(config, family))
}

/// Build an AND-chain from a list of configurations.
pub fn build_chain(
    configs: &[SelectorConfig],
    family: &Arc<dyn PathFamily>,
) -> Result<SelectorChain, ConfigError> {
    let selectors = configs
        .iter()
        .map(|c| build_selector(c, family))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SelectorChain::from(selectors))
}

fn build_all(configs: &[SelectorConfig], family: &Arc<dyn PathFamily>) -> Vec<Box<dyn FileSelector>> {
    configs.iter().map(|c| build(c, family)).collect()
}

fn build(config: &SelectorConfig, family: &Arc<dyn PathFamily>) -> Box<dyn FileSelector> {
    match config {
        SelectorConfig::Date {
            reference,
            when,
            granularity,
        } => Box::new(DateSelector::new(*reference, *when, *granularity)),
        SelectorConfig::Modified {
            cache,
            algorithm,
            update,
        } => Box::new(ModifiedSelector::new(cache.clone(), *algorithm, *update)),
        SelectorConfig::Permissions {
            mode,
            follow_symlinks,
        } => Box::new(PermissionsSelector::new(*mode, *follow_symlinks)),
        SelectorConfig::Readable => Box::new(ReadableSelector),
        SelectorConfig::Writable => Box::new(WritableSelector),
        SelectorConfig::Executable => Box::new(ExecutableSelector),
        SelectorConfig::Symlink => Box::new(SymlinkSelector),
        SelectorConfig::Different {
            target_dir,
            ignore_file_times,
            ignore_contents,
            granularity,
        } => Box::new(DifferentSelector::new(
            Arc::clone(family),
            target_dir.clone(),
            *ignore_file_times,
            *ignore_contents,
            *granularity,
        )),
        SelectorConfig::Present { target_dir, mode } => Box::new(PresentSelector::new(
            Arc::clone(family),
            target_dir.clone(),
            *mode,
        )),
        SelectorConfig::Size { limit, when } => Box::new(SizeSelector::new(*limit, *when)),
        SelectorConfig::Depth { min, max } => {
            Box::new(DepthSelector::new(Arc::clone(family), *min, *max))
        }
        SelectorConfig::Filename {
            pattern,
            case_sensitive,
            negate,
        } => Box::new(FilenameSelector::new(
            Arc::clone(family),
            pattern,
            *case_sensitive,
            *negate,
        )),
        SelectorConfig::Contains {
            text,
            case_sensitive,
            ignore_whitespace,
        } => Box::new(ContainsSelector::new(text, *case_sensitive, *ignore_whitespace)),
        SelectorConfig::And(children) => Box::new(ContainerSelector::new(
            Combine::All,
            build_all(children, family),
        )),
        SelectorConfig::Or(children) => Box::new(ContainerSelector::new(
            Combine::Any,
            build_all(children, family),
        )),
        SelectorConfig::NoneOf(children) => Box::new(ContainerSelector::new(
            Combine::NoneOf,
            build_all(children, family),
        )),
        SelectorConfig::Majority {
            allow_ties,
            selectors,
        } => Box::new(ContainerSelector::new(
            Combine::Majority {
                allow_ties: *allow_ties,
            },
            build_all(selectors, family),
        )),
        SelectorConfig::Not(inner) => Box::new(NotSelector::new(build(inner, family))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileset_core::UnixFamily;

    #[test]
    fn test_invalid_config_is_rejected_before_building() {
        let family: Arc<dyn PathFamily> = Arc::new(UnixFamily);
        let config = SelectorConfig::Depth {
            min: Some(4),
            max: Some(2),
        };
        assert!(build_selector(&config, &family).is_err());
    }

    #[test]
    fn test_build_chain() {
        let family: Arc<dyn PathFamily> = Arc::new(UnixFamily);
        let chain = build_chain(
            &[
                SelectorConfig::Readable,
                SelectorConfig::Not(Box::new(SelectorConfig::Symlink)),
            ],
            &family,
        )
        .unwrap();
        assert_eq!(chain.len(), 2);
    }
}
