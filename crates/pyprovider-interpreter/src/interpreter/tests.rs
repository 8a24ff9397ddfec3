use std::path::Path;
use std::str::FromStr;

use insta::assert_snapshot;
use test_case::test_case;

use pyprovider_pep440::{VersionBounds, VersionIdentifier};
use pyprovider_pep508::MarkerTree;

use super::*;

/// The query output of a 64-bit CPython 3.6.1 on Windows.
fn cpython36() -> String {
    [
        "3.6.1.final.0",
        r"C:\Python36\Lib\site-packages",
        "8",
        "cp36-cp36m-win_amd64.cp36-none-win_amd64.py3-none-win_amd64.cp36-none-any.py3-none-any",
        "nt",
        "win32",
        "10",
        "cpython",
        "AMD64",
        "CPython",
        "3.6",
        "3.6.1",
        "10.0.14393",
        "3.6.1",
    ]
    .join("\0")
}

/// The query output of a 32-bit CPython 2.7, which has no `sys.implementation`.
fn cpython27() -> String {
    [
        "2.7.13.final.0",
        r"C:\Python27\Lib\site-packages",
        "4",
        "cp27-cp27m-win32.cp27-none-win32.py2-none-win32.cp27-none-any.py2-none-any",
        "nt",
        "win32",
        "10",
        "",
        "x86",
        "CPython",
        "2.7",
        "2.7.13",
        "10.0.14393",
        "",
    ]
    .join("\0")
}

#[test]
fn parse_cpython36() {
    let info = InterpreterInfo::from_query_output(&cpython36()).unwrap();
    assert_eq!(info.version().to_string(), "3.6.1");
    assert_eq!(info.site_packages(), Path::new(r"C:\Python36\Lib\site-packages"));
    assert_eq!(info.pointer_size(), 8);
    assert!(info.is_64bit());
    assert_eq!(info.markers().sys_platform, "win32");
    assert_eq!(info.markers().python_version, VersionIdentifier::parse("3.6"));
    assert!(info.tags().is_compatible("py2.py3-none-any"));
}

#[test]
fn parse_cpython27() {
    let info = InterpreterInfo::from_query_output(&cpython27()).unwrap();
    assert_eq!(info.version().to_string(), "2.7.13");
    assert!(!info.is_64bit());
    assert_eq!(info.markers().implementation_name, "");
    assert!(!info.markers().implementation_version.is_valid());
}

#[test]
fn trailing_newline() {
    let info = InterpreterInfo::from_query_output(&format!("{}\n", cpython27())).unwrap();
    assert_eq!(info.markers().implementation_version.raw(), "");
}

#[test]
fn markers() {
    let info = InterpreterInfo::from_query_output(&cpython36()).unwrap();
    let marker =
        MarkerTree::from_str(r#"sys_platform == "win32" and python_version >= "3.4""#).unwrap();
    assert!(marker.evaluate(info.markers()).unwrap());

    let info = InterpreterInfo::from_query_output(&cpython27()).unwrap();
    assert!(!marker.evaluate(info.markers()).unwrap());
}

#[test_case("3.6.1.final.0", "3.6.1")]
#[test_case("3.7.0.candidate.1", "3.7.0rc1")]
#[test_case("3.8.0.alpha.4", "3.8.0a4")]
#[test_case("3.8.0.beta.2", "3.8.0b2")]
#[test_case("3.9.1", "3.9.1")]
fn version_info(version_info: &str, expected: &str) {
    assert_eq!(
        parse_version_info(version_info).unwrap().to_string(),
        expected
    );
}

#[test_case(""; "empty")]
#[test_case("final.0"; "no release")]
#[test_case("3.6.1.gamma.0"; "unknown release level")]
#[test_case("3.6.1.candidate"; "missing serial")]
#[test_case("3.6.1.final.0.1"; "too many parts")]
fn invalid_version_info(version_info: &str) {
    assert!(parse_version_info(version_info).is_none());
}

#[test_case("3", true)]
#[test_case("3.6", true)]
#[test_case("3.6.1", true)]
#[test_case("3.6.0", false)]
#[test_case("3.60", false)]
#[test_case("2.7", false)]
fn satisfies(request: &str, expected: bool) {
    let info = InterpreterInfo::from_query_output(&cpython36()).unwrap();
    assert_eq!(info.satisfies(&VersionIdentifier::parse(request)), expected);
}

#[test]
fn within() {
    let info = InterpreterInfo::from_query_output(&cpython36()).unwrap();
    assert!(info.within(&VersionBounds::default()));
    assert!(info.within(&VersionBounds::from_user_input(None, Some("3.5"), Some("3.6.1"))));
    assert!(!info.within(&VersionBounds::from_user_input(Some("3.6"), None, None)));
    assert!(!info.within(&VersionBounds::from_user_input(None, None, Some("3.6"))));
}

#[test]
fn supports_wheel() {
    let info = InterpreterInfo::from_query_output(&cpython36()).unwrap();
    assert!(info.supports_wheel("numpy-1.13.1-cp36-cp36m-win_amd64.whl"));
    assert!(info.supports_wheel("six-1.11.0-py2.py3-none-any.whl"));
    assert!(!info.supports_wheel("numpy-1.13.1-cp36-cp36m-win32.whl"));
    assert!(!info.supports_wheel("numpy.whl"));

    let info = InterpreterInfo::from_query_output(&cpython27()).unwrap();
    assert!(info.supports_wheel("numpy-1.13.1-cp27-cp27m-win32.whl"));
    assert!(!info.supports_wheel("numpy-1.13.1-cp36-cp36m-win_amd64.whl"));
}

#[test]
fn errors() {
    assert_snapshot!(
        InterpreterInfo::from_query_output("3.6.1.final.0\0C:\\Python36").unwrap_err(),
        @"Expected 14 NUL-separated fields in the interpreter query output, found 2"
    );
    assert_snapshot!(
        InterpreterInfo::from_query_output(&cpython36().replacen("\08\0", "\0eight\0", 1))
            .unwrap_err(),
        @"Invalid pointer size `eight`"
    );
    assert_snapshot!(
        InterpreterInfo::from_query_output(&cpython36().replacen("3.6.1.final.0", "unknown", 1))
            .unwrap_err(),
        @"Invalid Python version `unknown`"
    );
    assert_snapshot!(
        InterpreterInfo::from_query_output(&cpython36().replacen("py3-none-any", "py3-any", 1))
            .unwrap_err(),
        @"Invalid tag `py3-any`, expected `python-abi-platform`"
    );
}
