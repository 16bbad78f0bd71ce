use fileset_core::{
    ConfigError, EntryKind, PathError, PathModel, ScanConfig, SelectorConfig, SelectorRecord,
    TimeComparison, UnixFamily, match_path, match_pattern_start,
};
use std::sync::Arc;

#[test]
fn test_deep_wildcard_against_root_and_descendants() {
    let unix = UnixFamily;
    for path in ["a", "a/b", "alpha/beta/gamma/gamma.xml", ".hidden"] {
        assert!(match_path(&unix, "**", path, true), "{path}");
    }
    assert!(!match_path(&unix, "**", "", true));
    assert!(!match_path(&unix, "**/x", "", true));
}

#[test]
fn test_case_sensitivity_flag() {
    let unix = UnixFamily;
    let pattern = "alpha/beta/gamma/GAMMA.XML";
    let path = "alpha/beta/gamma/gamma.xml";
    assert!(!match_path(&unix, pattern, path, true));
    assert!(match_path(&unix, pattern, path, false));
}

#[test]
fn test_pattern_start_prunes_unrelated_subtrees() {
    let unix = UnixFamily;
    assert!(match_pattern_start(&unix, "alpha/**/gamma.xml", "alpha/beta", true));
    assert!(!match_pattern_start(&unix, "alpha/**/gamma.xml", "delta", true));
    assert!(match_pattern_start(&unix, "*/beta/*.xml", "alpha", true));
}

#[test]
fn test_absolute_and_relative_paths() {
    let unix = PathModel::unix("/home/user");
    assert!(unix.prefix_length("/etc/hosts") > 0);
    assert!(unix.is_absolute("/etc/hosts"));
    assert_eq!(unix.prefix_length("notes/todo.txt"), 0);
    assert!(!unix.is_absolute("notes/todo.txt"));
    assert_eq!(
        unix.resolve_file("notes/todo.txt").unwrap(),
        "/home/user/notes/todo.txt"
    );

    let dos = PathModel::dos("c:\\work");
    assert!(dos.prefix_length("c:\\windows") > 0);
    assert!(dos.is_absolute("c:/windows"));
    assert!(dos.is_absolute("\\\\server\\share\\file"));
    assert_eq!(dos.prefix_length("notes\\todo.txt"), 0);
    assert!(!dos.is_absolute("notes\\todo.txt"));
    assert_eq!(
        dos.resolve_file("notes/todo.txt").unwrap(),
        "c:\\work\\notes\\todo.txt"
    );
    assert_eq!(dos.resolve_file("\\temp").unwrap(), "c:\\temp");
    assert!(matches!(
        dos.resolve_file("q:relative"),
        Err(PathError::Unresolvable { .. })
    ));
}

#[test]
fn test_dos_uri_paths() {
    let dos = PathModel::dos("c:\\");
    assert_eq!(dos.from_uri_path("/c:/"), "c:\\");
    assert_eq!(dos.from_uri_path("/d:/data/"), "d:\\data");
    assert_eq!(dos.default_parent(), "\\");
}

#[test]
fn test_families_are_explicit_values() {
    // Both families work the same on any host.
    let unix = PathModel::new(Arc::new(UnixFamily), "/");
    let dos = PathModel::dos("c:\\");
    assert_eq!(unix.normalize("a//b/"), "a/b");
    assert_eq!(dos.normalize("a//b/"), "a\\b");
    assert_eq!(unix.separator(), '/');
    assert_eq!(dos.separator(), '\\');
}

#[test]
fn test_scan_config_from_toml() {
    let config: ScanConfig = toml::from_str(
        r#"
        base_dir = "/srv/site"
        includes = ["**/*.html"]
        excludes = ["drafts/**"]
        case_sensitive = false

        [[selectors]]
        type = "date"
        datetime = "2024-05-01T12:00:00Z"
        when = "after"
        granularity = 2

        [[selectors]]
        type = "or"

        [[selectors.selectors]]
        type = "readable"

        [[selectors.selectors]]
        type = "size"
        value = 10
        units = "Ki"
        when = "less"
        "#,
    )
    .unwrap();

    assert_eq!(config.includes, Some(vec!["**/*.html".to_string()]));
    assert!(!config.case_sensitive);
    assert!(config.error_on_missing_dir);
    assert_eq!(config.selectors.len(), 2);
    assert!(matches!(
        config.selectors[0],
        SelectorConfig::Date {
            when: TimeComparison::After,
            ..
        }
    ));
    let SelectorConfig::Or(children) = &config.selectors[1] else {
        panic!("expected an or container");
    };
    assert_eq!(children.len(), 2);
}

#[test]
fn test_scan_config_rejects_bad_selector_while_parsing() {
    let result: Result<ScanConfig, _> = toml::from_str(
        r#"
        base_dir = "/srv"

        [[selectors]]
        type = "permissions"
        permissions = "drwxr-xr-x"
        "#,
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Malformed permissions"));
}

#[test]
fn test_selector_config_json_round_trip() {
    let config = SelectorConfig::Filename {
        pattern: "**/*.rs".to_string(),
        case_sensitive: false,
        negate: true,
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""type":"filename""#));
    let back: SelectorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_cli_style_record() {
    let record: SelectorRecord = "modified:cache=.cache.json,algorithm=digest,update=false"
        .parse()
        .unwrap();
    let config = SelectorConfig::try_from(record).unwrap();
    assert!(matches!(config, SelectorConfig::Modified { update: false, .. }));

    let err = "depth:min=x".parse::<SelectorRecord>().map(SelectorConfig::try_from);
    assert!(matches!(err, Ok(Err(ConfigError::InvalidValue { .. }))));
}

#[test]
fn test_trailing_separator_entries() {
    let config = ScanConfig::builder()
        .base_dir("/t")
        .includes(vec!["alpha/".to_string()])
        .build()
        .unwrap();
    let set = config.pattern_set(Arc::new(UnixFamily));
    assert!(set.keeps(&set.tokenize("alpha"), EntryKind::Directory));
    assert!(!set.keeps(&set.tokenize("alpha"), EntryKind::File));
    assert!(set.keeps(&set.tokenize("alpha/beta/beta.xml"), EntryKind::File));
    assert!(!set.root_included());
}
