use test_case::test_case;

use super::*;

fn tags() -> Tags {
    Tags::from_query_output(
        "cp36-cp36m-win_amd64.cp36-abi3-win_amd64.cp36-none-win_amd64.py3-none-win_amd64.\
         cp36-none-any.py3-none-any",
    )
    .unwrap()
}

#[test_case("cp36-cp36m-win_amd64", true; "exact")]
#[test_case("py2.py3-none-any", true; "compressed python tag")]
#[test_case("cp35.cp36-abi3-win_amd64", true; "compressed with abi3")]
#[test_case("py3-none-win32.win_amd64", true; "compressed platform tag")]
#[test_case("cp27-cp27mu-manylinux1_x86_64", false; "wrong python")]
#[test_case("cp36-cp36m-win32", false; "wrong platform")]
#[test_case("py2-none-any", false; "python 2 only")]
#[test_case("none-any", false; "too few parts")]
#[test_case("foo-py3-none-any", false; "too many parts")]
fn compatibility(wheel_tag: &str, compatible: bool) {
    assert_eq!(tags().is_compatible(wheel_tag), compatible);
}

#[test]
fn priority_follows_position() {
    let tags = tags();
    let exact = tags.priority("cp36-cp36m-win_amd64").unwrap();
    let pure = tags.priority("py3-none-any").unwrap();
    assert!(exact > pure);
    // A compressed set gets the priority of its best member.
    assert_eq!(tags.priority("py3-none-any.win_amd64"), tags.priority("py3-none-win_amd64"));
}

#[test]
fn empty() {
    let tags = Tags::from_query_output("").unwrap();
    assert!(tags.is_empty());
    assert!(!tags.is_compatible("py3-none-any"));
}

#[test]
fn invalid_tag() {
    let err = Tags::from_query_output("cp36-cp36m-win_amd64.cp36-none").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid tag `cp36-none`, expected `python-abi-platform`"
    );
}

#[test_case("numpy-1.13.1-cp36-cp36m-win_amd64.whl", Some("cp36-cp36m-win_amd64"))]
#[test_case("six-1.11.0-py2.py3-none-any.whl", Some("py2.py3-none-any"))]
#[test_case("pkg-1.0-1-py3-none-any.whl", Some("py3-none-any"))]
#[test_case("cp36-cp36m-win_amd64", None)]
#[test_case("none-any.whl", None)]
fn wheel_tags(filename: &str, expected: Option<&str>) {
    assert_eq!(wheel_tag(filename), expected);
}
