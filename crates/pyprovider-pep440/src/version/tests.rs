use std::cmp::Ordering;
use std::collections::HashSet;

use test_case::test_case;

use super::*;

/// The ordering example from <https://peps.python.org/pep-0440/#summary-of-permitted-suffixes-and-relative-ordering>
/// plus local versions, in ascending order.
const VERSIONS_ALL: &[&str] = &[
    "1.0.dev456",
    "1.0a1",
    "1.0a2.dev456",
    "1.0a12.dev456",
    "1.0a12",
    "1.0b1.dev456",
    "1.0b2",
    "1.0b2.post345.dev456",
    "1.0b2.post345",
    "1.0b2-346",
    "1.0c1.dev456",
    "1.0c1",
    "1.0rc2",
    "1.0c3",
    "1.0",
    "1.0.post456.dev34",
    "1.0.post456",
    "1.1.dev1",
    "1.2+123abc",
    "1.2+123abc456",
    "1.2+abc",
    "1.2+abc123",
    "1.2+abc123def",
    "1.2+1234.abc",
    "1.2+123456",
    "1.2.r32+123456",
    "1.2.rev33+123456",
    "1!1.0.dev456",
    "1!1.0a1",
    "1!1.0",
    "1!1.2.rev33+123456",
];

#[test]
fn packaging_ordering() {
    let versions: Vec<VersionIdentifier> = VERSIONS_ALL
        .iter()
        .map(|version| VersionIdentifier::parse(version))
        .collect();
    for version in &versions {
        assert!(version.is_valid(), "{version}");
    }
    for (i, a) in versions.iter().enumerate() {
        for (j, b) in versions.iter().enumerate() {
            assert_eq!(a.cmp(b), i.cmp(&j), "{a} vs {b}");
        }
    }
}

/// Strictly increasing, each pair compared both ways.
#[test]
fn total_order() {
    let versions = [
        "0",
        "0.9",
        "1.0.dev23",
        "1.0a0.dev2",
        "1.0a0",
        "1.0a0.post4",
        "1.0a5",
        "1.0b2",
        "1.0rc1",
        "1.0",
        "1.0.post1",
        "1.1",
        "1.1.1",
        "1.2",
        "2",
        "1!0.5",
    ]
    .map(VersionIdentifier::parse);
    for (i, a) in versions.iter().enumerate() {
        assert_eq!(a.cmp(a), Ordering::Equal);
        for b in &versions[i + 1..] {
            assert_eq!(a.cmp(b), Ordering::Less, "{a} < {b}");
            assert_eq!(b.cmp(a), Ordering::Greater, "{b} > {a}");
        }
    }
}

#[test]
fn trailing_zeros_are_equal() {
    let short = VersionIdentifier::parse("1.0");
    let long = VersionIdentifier::parse("1.0.0");
    assert_eq!(short.cmp(&long), Ordering::Equal);
    assert_eq!(short, long);
    // But the rendered form keeps every segment
    assert_eq!(long.to_string(), "1.0.0");

    let set: HashSet<VersionIdentifier> = ["1", "1.0", "1.0.0", "1.0.0.0"]
        .into_iter()
        .map(VersionIdentifier::parse)
        .collect();
    assert_eq!(set.len(), 1);

    let set: HashSet<VersionIdentifier> = ["0", "0.0", "1.0", "1.0.1", "1.0a1", "1.0+abc"]
        .into_iter()
        .map(VersionIdentifier::parse)
        .collect();
    assert_eq!(set.len(), 5);
}

#[test_case("050.0.06", "50.0.6")]
#[test_case("1.0alpha2", "1.0a2")]
#[test_case("1.0ALPHA2", "1.0a2"; "uppercase")]
#[test_case("v2", "2")]
#[test_case("  v1.0  ", "1.0")]
#[test_case("1.0-1", "1.0.post1")]
#[test_case("1.0dev2", "1.0.dev2")]
#[test_case("1.0.a.1", "1.0a1")]
#[test_case("1.0-beta_3", "1.0b3")]
#[test_case("1.0c1", "1.0rc1")]
#[test_case("1.0pre1", "1.0rc1")]
#[test_case("1.0preview1", "1.0rc1")]
#[test_case("1.0rc", "1.0rc0")]
#[test_case("1.0post", "1.0.post0")]
#[test_case("1.0-r4", "1.0.post4")]
#[test_case("1.0_rev4", "1.0.post4")]
#[test_case("1.0.post-2", "1.0.post2")]
#[test_case("1.0-dev", "1.0.dev0")]
#[test_case("0!1.0", "1.0")]
#[test_case("01!1.0", "1!1.0")]
#[test_case("1.0+Ubuntu-1", "1.0+ubuntu.1")]
#[test_case("1.0+abc_007", "1.0+abc.7")]
#[test_case("1.0postdev1", "1.0.post0.dev1")]
#[test_case("1.0rdev1", "1.0.post0.dev1")]
#[test_case("1.0revdev2", "1.0.post0.dev2")]
#[test_case("1.0-postdev", "1.0.post0.dev0")]
#[test_case("1.0.rev3", "1.0.post3")]
fn normalization(input: &str, normalized: &str) {
    let version = VersionIdentifier::parse(input);
    assert!(version.is_valid(), "{input}");
    assert_eq!(version.to_string(), normalized);
    assert_eq!(version.raw(), input.trim());
}

/// Both historical rules for the devrelease counter: with and without a separator before it.
#[test_case("1.0.dev2", "1.0.dev2"; "no separator")]
#[test_case("1.0.dev.2", "1.0.dev2"; "dot")]
#[test_case("1.0.dev-2", "1.0.dev2"; "dash")]
#[test_case("1.0dev_3", "1.0.dev3"; "underscore")]
fn dev_counter_separator(input: &str, normalized: &str) {
    let version = VersionIdentifier::parse(input);
    assert!(version.is_valid(), "{input}");
    assert_eq!(version.to_string(), normalized);
}

#[test_case("1.0a0.post4.dev1+postrelease")]
#[test_case("1!2.3.4rc5.post6.dev7+abc.8")]
#[test_case("0.0.0")]
#[test_case("1.0b2.post345")]
#[test_case("2012.15")]
fn round_trip(canonical: &str) {
    let version = VersionIdentifier::parse(canonical);
    assert!(version.is_valid());
    assert_eq!(version.to_string(), canonical);

    let reparsed = VersionIdentifier::parse(&version.to_string());
    assert_eq!(reparsed, version);
    assert_eq!(reparsed.epoch(), version.epoch());
    assert_eq!(reparsed.release(), version.release());
    assert_eq!(reparsed.pre(), version.pre());
    assert_eq!(reparsed.post(), version.post());
    assert_eq!(reparsed.dev(), version.dev());
    assert_eq!(reparsed.local(), version.local());
}

#[test_case(""; "empty")]
#[test_case("v"; "lone v")]
#[test_case("french toast")]
#[test_case("2:1.0"; "debian epoch")]
#[test_case("1.0+"; "empty local")]
#[test_case("1.0+.abc"; "leading empty local segment")]
#[test_case("1.0+abc."; "trailing empty local segment")]
#[test_case("1.0+abc..def"; "inner empty local segment")]
#[test_case("1.0+ab$c"; "symbol in local")]
#[test_case("1.0.*"; "wildcard outside of a specifier")]
#[test_case("1.0foo"; "unknown suffix")]
#[test_case("1.0postev"; "ev only follows r")]
#[test_case("1.0-"; "dangling separator")]
#[test_case("1!"; "epoch without release")]
#[test_case("1.0.99999999999999999999"; "overflow")]
#[test_case("１.0"; "non ascii digit")]
fn invalid(input: &str) {
    let version = VersionIdentifier::parse(input);
    assert!(!version.is_valid());
    assert_eq!(version.release(), &[0]);
    assert_eq!(version.epoch(), 0);
    assert_eq!(version.pre(), None);
    assert!(!version.is_local());
    assert_eq!(version.raw(), input.trim());
    assert_eq!(version.to_string(), input.trim());
}

#[test]
fn invalid_sorts_like_zero() {
    let invalid = VersionIdentifier::parse("not a version");
    assert_eq!(invalid.cmp(&VersionIdentifier::parse("0")), Ordering::Equal);
    assert!(invalid < VersionIdentifier::parse("0.1"));
}

#[test]
fn unknown_prerelease_backtracks() {
    // `post` and `dev` are not prerelease spellings, the parser has to give the separator back
    let version = VersionIdentifier::parse("1.0.post1");
    assert_eq!(version.pre(), None);
    assert_eq!(version.post(), Some(1));

    let version = VersionIdentifier::parse("1.0-dev1");
    assert_eq!(version.pre(), None);
    assert_eq!(version.dev(), Some(1));
}

#[test]
fn wildcard() {
    let version = VersionIdentifier::parse_wildcard("1.0.*");
    assert!(version.is_valid());
    assert!(version.is_wildcard());
    assert_eq!(version.release(), &[1, 0]);
    assert_eq!(version.to_string(), "1.0.*");

    let version = VersionIdentifier::parse_wildcard("1.0");
    assert!(version.is_valid());
    assert!(!version.is_wildcard());

    assert!(!VersionIdentifier::parse_wildcard("1.*.0").is_valid());
    assert!(!VersionIdentifier::parse_wildcard("1.0.*a1").is_valid());
    assert!(!VersionIdentifier::parse_wildcard("1.0a1.*").is_valid());
    assert!(!VersionIdentifier::parse_wildcard("1.0.*+local").is_valid());
}

#[test_case("1.0.0"; "trailing zero")]
#[test_case("1.0.1"; "more segments")]
#[test_case("1.0a2"; "prerelease")]
#[test_case("1"; "fewer segments")]
#[test_case("1.0.post1+local"; "post and local")]
fn is_prefix(other: &str) {
    let prefix = VersionIdentifier::parse("1.0");
    assert!(prefix.is_prefix_of(&VersionIdentifier::parse(other)));
}

#[test_case("1.1")]
#[test_case("2:1.0")]
#[test_case("2.0")]
#[test_case("1!1.0")]
fn is_not_prefix(other: &str) {
    let prefix = VersionIdentifier::parse("1.0");
    assert!(!prefix.is_prefix_of(&VersionIdentifier::parse(other)));
}

#[test]
fn interpreter_prefix() {
    let interpreter = VersionIdentifier::parse("3.2.7");
    assert!(VersionIdentifier::parse("3.2").is_prefix_of(&interpreter));
    assert!(VersionIdentifier::parse("3").is_prefix_of(&interpreter));
    assert!(!VersionIdentifier::parse("3.12").is_prefix_of(&interpreter));
}

#[test]
fn local_ordering() {
    let ascending = ["1.0", "1.0+abc", "1.0+abc.def", "1.0+1", "1.0+1.abc", "1.0+2"]
        .map(VersionIdentifier::parse);
    for pair in ascending.windows(2) {
        assert!(pair[0] < pair[1], "{} < {}", pair[0], pair[1]);
    }
    assert!(LocalSegment::String("zzz".to_string()) < LocalSegment::Number(0));
}

#[test]
fn compare_ignoring_parts() {
    let local = VersionIdentifier::parse("1.0+abc");
    let plain = VersionIdentifier::parse("1.0");
    assert_eq!(local.cmp(&plain), Ordering::Greater);
    let ignore_local = CompareOptions {
        ignore_local: true,
        ..CompareOptions::default()
    };
    assert_eq!(local.compare_with(&plain, ignore_local), Ordering::Equal);

    let pre = VersionIdentifier::parse("1.0rc1");
    let ignore_pre = CompareOptions {
        ignore_pre: true,
        ..CompareOptions::default()
    };
    assert_eq!(pre.compare_with(&plain, ignore_pre), Ordering::Equal);

    let post = VersionIdentifier::parse("1.0.post3.dev1");
    let ignore_post = CompareOptions {
        ignore_post: true,
        ..CompareOptions::default()
    };
    assert_eq!(post.compare_with(&plain, ignore_post), Ordering::Equal);

    // The epoch and the release are never skipped
    let newer = VersionIdentifier::parse("1!1.0");
    assert_eq!(
        newer.compare_with(&plain, CompareOptions::RELEASE_ONLY),
        Ordering::Greater
    );
    assert_eq!(
        VersionIdentifier::parse("1.0.dev1+abc").compare_with(&plain, CompareOptions::RELEASE_ONLY),
        Ordering::Equal
    );
}

#[test]
fn accessors() {
    let version = VersionIdentifier::parse("2!1.2.3b4.post5.dev6+ubuntu.7");
    assert_eq!(version.epoch(), 2);
    assert_eq!(version.release(), &[1, 2, 3]);
    assert_eq!(
        version.pre(),
        Some(Prerelease {
            kind: PrereleaseKind::Beta,
            number: 4
        })
    );
    assert_eq!(version.post(), Some(5));
    assert_eq!(version.dev(), Some(6));
    assert_eq!(
        version.local(),
        &[
            LocalSegment::String("ubuntu".to_string()),
            LocalSegment::Number(7)
        ]
    );
    assert!(version.is_prerelease());
    assert!(version.is_post());
    assert!(version.is_dev());
    assert!(version.is_local());
    assert_eq!(version.without_local().to_string(), "2!1.2.3b4.post5.dev6");

    assert!(VersionIdentifier::parse("1.0.dev0").is_prerelease());
    assert!(!VersionIdentifier::parse("1.0.post0").is_prerelease());
}

#[test]
fn from_release() {
    let version = VersionIdentifier::from_release(vec![3, 12]);
    assert!(version.is_valid());
    assert_eq!(version.to_string(), "3.12");
    assert_eq!(version, VersionIdentifier::parse("3.12.0"));
}

#[cfg(feature = "serde")]
#[test]
fn serde() {
    let version = VersionIdentifier::parse("1.0-1");
    assert_eq!(serde_json::to_string(&version).unwrap(), r#""1.0.post1""#);
    let parsed: VersionIdentifier = serde_json::from_str(r#""v3.8.10""#).unwrap();
    assert_eq!(parsed, VersionIdentifier::parse("3.8.10"));
}
