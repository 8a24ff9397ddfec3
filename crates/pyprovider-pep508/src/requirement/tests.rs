use std::str::FromStr;

use insta::assert_snapshot;

use pyprovider_pep440::VersionIdentifier;

use super::*;
use crate::MarkerValues;

fn env(sys_platform: &str, python_version: &str) -> MarkerValues {
    let python_version = VersionIdentifier::parse(python_version);
    MarkerValues {
        os_name: if sys_platform == "win32" { "nt" } else { "posix" }.to_string(),
        sys_platform: sys_platform.to_string(),
        platform_release: String::new(),
        implementation_name: "cpython".to_string(),
        platform_machine: "x86_64".to_string(),
        platform_python_implementation: "CPython".to_string(),
        python_version: python_version.clone(),
        python_full_version: python_version.clone(),
        platform_version: VersionIdentifier::parse(""),
        implementation_version: python_version,
    }
}

#[test]
fn parenthesized_specifier() {
    let requirement = Requirement::from_str(r#"pywin32 (>=1.0); sys_platform == "win32""#).unwrap();
    assert_eq!(requirement.name, "pywin32");
    assert!(requirement.extras.is_empty());
    assert_eq!(
        requirement.version_specifier,
        Some(VersionSpecifier::from_str(">=1.0").unwrap())
    );
    assert_eq!(
        requirement.marker,
        Some(MarkerTree::from_str(r#"sys_platform == "win32""#).unwrap())
    );
    assert_eq!(
        requirement.to_string(),
        r#"pywin32 >=1.0 ; sys_platform == "win32""#
    );
}

#[test]
fn extras_and_bare_specifier() {
    let requirement = Requirement::from_str(
        r#"requests [security, tests] >= 2.8.1, == 2.8.* ; python_version < "3""#,
    )
    .unwrap();
    assert_eq!(requirement.name, "requests");
    assert_eq!(requirement.extras, ["security", "tests"]);
    assert_eq!(
        requirement.to_string(),
        r#"requests[security,tests] >=2.8.1, ==2.8.* ; python_version < "3""#
    );
    assert_eq!(
        Requirement::from_str(&requirement.to_string()).unwrap(),
        requirement
    );
}

#[test]
fn name_only() {
    for input in ["six", "  six  ", "six[]", "six ()", "zope.interface"] {
        let requirement = Requirement::from_str(input).unwrap();
        assert!(requirement.extras.is_empty(), "{input}");
        assert!(requirement.marker.is_none(), "{input}");
        assert!(
            requirement
                .version_specifier
                .as_ref()
                .is_none_or(|specifier| specifier.is_empty()),
            "{input}"
        );
        assert!(requirement.allows(&VersionIdentifier::parse("0.1")));
    }
    assert_eq!(Requirement::from_str(" six ()").unwrap().to_string(), "six");
}

#[test]
fn allows() {
    let requirement = Requirement::from_str("requests >=2.8, <3").unwrap();
    assert!(requirement.allows(&VersionIdentifier::parse("2.9")));
    assert!(!requirement.allows(&VersionIdentifier::parse("3.0")));
    assert!(!requirement.allows(&VersionIdentifier::parse("2.7.1")));
}

#[test]
fn evaluate_marker() {
    let requirement =
        Requirement::from_str(r#"pywin32 >=1.0 ; sys_platform == "win32" and python_version >= "3.4""#)
            .unwrap();
    assert!(requirement.evaluate_marker(&env("win32", "3.4")).unwrap());
    assert!(!requirement.evaluate_marker(&env("win32", "2.7")).unwrap());
    assert!(!requirement.evaluate_marker(&env("linux", "3.4")).unwrap());

    let requirement = Requirement::from_str("six").unwrap();
    assert!(requirement.evaluate_marker(&env("linux", "3.4")).unwrap());
}

#[test]
fn error_url() {
    let err = Requirement::from_str("name @ https://example.org/name.whl").unwrap_err();
    assert!(matches!(err.message, RequirementErrorSource::Unsupported(_)));
    assert_snapshot!(err, @r"
    Direct URL references (`name @ url`) are not supported
    name @ https://example.org/name.whl
         ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
    ");
}

#[test]
fn error_specifier() {
    let err = Requirement::from_str("numpy >=1.0, ~=2").unwrap_err();
    assert!(matches!(err.message, RequirementErrorSource::Specifier(_)));
    assert_snapshot!(err, @r"
    The ~= operator requires at least two segments in the release version
    numpy >=1.0, ~=2
                 ^^^
    ");
}

#[test]
fn error_marker() {
    let err = Requirement::from_str(r#"pywin32 ; sys_platform = "win32""#).unwrap_err();
    assert!(matches!(
        err.message,
        RequirementErrorSource::Marker(MarkerErrorKind::IncompleteOperator('='))
    ));
    assert_snapshot!(err, @r#"
    Expected `=` after `=`
    pywin32 ; sys_platform = "win32"
                           ^
    "#);

    let err = Requirement::from_str("foo ; ").unwrap_err();
    assert!(matches!(
        err.message,
        RequirementErrorSource::Marker(MarkerErrorKind::Empty)
    ));
    assert_eq!(err.start, 6);
}

#[test]
fn error_missing_bracket() {
    assert_snapshot!(Requirement::from_str("requests[security").unwrap_err(), @r"
    Missing closing bracket (expected ']', found end of dependency specification)
    requests[security
            ^
    ");
}

#[test]
fn error_name_end() {
    assert_snapshot!(Requirement::from_str("foo- >=1").unwrap_err(), @r"
    Package name must end with an alphanumeric character, not '-'
    foo- >=1
       ^
    ");
}

#[test]
fn error_unexpected() {
    assert_snapshot!(Requirement::from_str("six 1.0").unwrap_err(), @r"
    Expected one of `(`, `<`, `=`, `>`, `~`, `!`, `;`, found `1`
    six 1.0
        ^
    ");
    assert_snapshot!(Requirement::from_str("numpy (>=1.0) x").unwrap_err(), @r"
    Expected end of input or ';', found 'x'
    numpy (>=1.0) x
                  ^
    ");
}

#[test]
fn error_missing_parenthesis() {
    assert_snapshot!(Requirement::from_str("numpy (>=1.0").unwrap_err(), @r"
    Missing closing parenthesis (expected ')', found end of dependency specification)
    numpy (>=1.0
          ^
    ");
}

#[test]
fn error_empty() {
    assert_eq!(
        Requirement::from_str("").unwrap_err().to_string(),
        "Empty field is not allowed for PEP508\n\n^"
    );
    assert_eq!(Requirement::from_str("   ").unwrap_err().start, 3);
}
