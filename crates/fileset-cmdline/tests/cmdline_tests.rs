//! Integration tests for fileset-cmdline.

use fileset_cmdline::{Commandline, ParseError, join_quoted, translate_commandline};

#[test]
fn test_cvs_commit_line() {
    let line =
        "cvs -d:pserver:user@host:/cvs commit -m \"added a new test file for 'fun'\" Test.php";

    let tokens = translate_commandline(line).unwrap();
    assert_eq!(
        tokens,
        [
            "cvs",
            "-d:pserver:user@host:/cvs",
            "commit",
            "-m",
            "added a new test file for 'fun'",
            "Test.php"
        ]
    );

    let cmd = Commandline::parse(line).unwrap();
    assert_eq!(cmd.executable(), Some("cvs"));
    assert_eq!(cmd.arguments().len(), 5);
    assert_eq!(cmd.arguments()[3], "added a new test file for 'fun'");
    assert_eq!(cmd.arguments()[4], "Test.php");
}

#[test]
fn test_unmatched_double_quote() {
    let err = translate_commandline("cvs commit -m \"oops").unwrap_err();
    assert!(matches!(err, ParseError::UnbalancedQuotes { .. }));
    assert!(err.to_string().contains("unbalanced quotes"));
}

#[test]
fn test_add_line_propagates_errors() {
    let mut cmd = Commandline::with_executable("sh");
    assert!(cmd.add_line("-c 'echo").is_err());
    assert!(cmd.arguments().is_empty());
}

#[test]
fn test_round_trip_through_string() {
    let mut cmd = Commandline::with_executable("git");
    cmd.add_arguments(["commit", "-m", "fix the \"thing\"", "--author", "A B <a@b>"]);

    let line = cmd.to_command_string().unwrap();
    let reparsed: Commandline = line.parse().unwrap();
    assert_eq!(reparsed, cmd);
}

#[test]
fn test_marker_splicing_after_more_arguments() {
    let mut cmd = Commandline::with_executable("tar");
    cmd.add_argument("-c");
    let files = cmd.create_marker();
    cmd.add_arguments(["-f", "out.tar"]);

    cmd.insert_at(&files, ["a.txt"]);
    cmd.insert_at(&files, ["b.txt"]);

    assert_eq!(cmd.marker_position(&files), 2);
    assert_eq!(
        cmd.to_vec(),
        ["tar", "-c", "b.txt", "a.txt", "-f", "out.tar"]
    );
    assert_eq!(join_quoted(&cmd.to_vec()).unwrap(), cmd.to_string());
}
