//! Everyday mocking against the `StringList` contract.
//!
//! Mirrors how a test author uses the engine: stub, exercise, verify.

use mockingbird::matcher::{any_int, any_string, arg_that};
use mockingbird::testkit::list::{ListProxy, StringList};
use mockingbird::{
    args, AsMock, assert_contains_error, assert_error_code, assert_raises, assert_result_ok, at_least, at_least_once, at_most, at_most_once,
    never, times, CallQuery, Failure, MockError, TestSession,
};
use pretty_assertions::assert_eq;

fn list_mock(session: &TestSession) -> ListProxy {
    assert_result_ok!(session.mock(), "creating a List mock")
}

#[test]
fn test_stubbed_return_throw_and_default() {
    let session = TestSession::new();
    let list = list_mock(&session);
    session
        .when(&list, "get", args![0])
        .unwrap()
        .then_return("first")
        .unwrap();
    session
        .when(&list, "get", args![1])
        .unwrap()
        .then_throw(Failure::runtime("index 1"))
        .unwrap();

    assert_eq!(list.get(0).as_deref(), Some("first"));
    let failure = assert_raises!(list.get(1), "RuntimeException");
    assert_eq!(failure.message, "index 1");
    assert_eq!(list.get(999), None);

    session.verify(&list).called("get", args![0]).unwrap();
}

#[test]
fn test_last_stub_wins() {
    let session = TestSession::new();
    let list = list_mock(&session);
    session
        .when(&list, "get", args![any_int()])
        .unwrap()
        .then_return("general")
        .unwrap();
    session
        .when(&list, "get", args![0])
        .unwrap()
        .then_return("specific")
        .unwrap();
    session
        .when(&list, "get", args![0])
        .unwrap()
        .then_return("override")
        .unwrap();

    assert_eq!(list.get(0).as_deref(), Some("override"));
    assert_eq!(list.get(3).as_deref(), Some("general"));
}

#[test]
fn test_argument_matchers_in_stubbing_and_verification() {
    let session = TestSession::new();
    let list = list_mock(&session);
    session
        .when(&list, "get", args![any_int()])
        .unwrap()
        .then_return("element")
        .unwrap();

    assert_eq!(list.get(999).as_deref(), Some("element"));
    session.verify(&list).called("get", args![any_int()]).unwrap();

    list.add("a long entry");
    session
        .verify(&list)
        .called(
            "add",
            args![arg_that("<longer than 5>", |v| v
                .as_str()
                .is_some_and(|s| s.len() > 5))],
        )
        .unwrap();
    session
        .verify_with(&list, never())
        .called(
            "add",
            args![arg_that("<empty>", |v| v.as_str() == Some(""))],
        )
        .unwrap();
}

#[test]
fn test_mixed_literals_and_matchers_are_rejected() {
    let session = TestSession::new();
    let list = list_mock(&session);

    let err = assert_contains_error!(session.when(&list, "set", args![any_int(), "x"]), "eq()");
    assert_eq!(err.code(), "M004");
    assert_error_code!(
        session.do_return("x").when(&list, "set", args![0, any_string()]),
        "M004"
    );
    assert_error_code!(
        session.verify(&list).called("set", args![any_int(), "x"]),
        "M004"
    );
    assert_eq!(list.mock_handle().stub_count(), 0);
}

#[test]
fn test_invocation_counts() {
    let session = TestSession::new();
    let list = list_mock(&session);
    list.add("once");
    list.add("twice");
    list.add("twice");
    list.add("three times");
    list.add("three times");
    list.add("three times");

    session.verify(&list).called("add", args!["once"]).unwrap();
    session.verify_with(&list, times(1)).called("add", args!["once"]).unwrap();
    session.verify_with(&list, times(2)).called("add", args!["twice"]).unwrap();
    session
        .verify_with(&list, times(3))
        .called("add", args!["three times"])
        .unwrap();
    session
        .verify_with(&list, never())
        .called("add", args!["never happened"])
        .unwrap();
    session
        .verify_with(&list, at_most_once())
        .called("add", args!["once"])
        .unwrap();
    session
        .verify_with(&list, at_least_once())
        .called("add", args!["three times"])
        .unwrap();
    session
        .verify_with(&list, at_least(2))
        .called("add", args!["three times"])
        .unwrap();
    session
        .verify_with(&list, at_most(5))
        .called("add", args!["three times"])
        .unwrap();
}

#[test]
fn test_count_mismatch_reports_actual_and_expected() {
    let session = TestSession::new();
    let list = list_mock(&session);
    list.add("twice");
    list.add("twice");

    let err = session
        .verify_with(&list, times(3))
        .called("add", args!["twice"])
        .unwrap_err();
    match &err {
        MockError::Verification {
            mock,
            expected,
            actual,
            recorded,
            ..
        } => {
            assert_eq!(mock, "list#1");
            assert_eq!(*expected, times(3));
            assert_eq!(*actual, 2);
            assert_eq!(recorded.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err
        .to_string()
        .starts_with("list#1.add(\"twice\"): wanted exactly 3 times, but was invoked 2 time(s)"));
}

#[test]
fn test_unit_member_do_throw() {
    let session = TestSession::new();
    let list = list_mock(&session);
    session
        .do_throw(Failure::runtime("cleared"))
        .when(&list, "clear", args![])
        .unwrap();

    assert_raises!(list.clear(), "RuntimeException");
    assert_error_code!(
        session.when(&list, "clear", args![]).unwrap().then_return(1),
        "M006"
    );
}

#[test]
fn test_in_order_single_mock() {
    let session = TestSession::new();
    let single = list_mock(&session);
    single.add("was added first");
    single.add("was added second");

    let mut in_order = session.in_order(&[&single]);
    in_order
        .verify(&single)
        .called("add", args!["was added first"])
        .unwrap();
    in_order
        .verify(&single)
        .called("add", args!["was added second"])
        .unwrap();
}

#[test]
fn test_in_order_across_mocks() {
    let session = TestSession::new();
    let first: ListProxy = session.mock_named("firstMock").unwrap();
    let second: ListProxy = session.mock_named("secondMock").unwrap();
    first.add("was called first");
    second.add("was called second");

    session
        .verify_in_order(&[
            CallQuery::new(&first, "add", args!["was called first"]),
            CallQuery::new(&second, "add", args!["was called second"]),
        ])
        .unwrap();

    let err = session
        .verify_in_order(&[
            CallQuery::new(&second, "add", args!["was called second"]),
            CallQuery::new(&first, "add", args!["was called first"]),
        ])
        .unwrap_err();
    assert_eq!(
        err,
        MockError::OrderViolation {
            previous: "secondMock.add(\"was called second\")".to_string(),
            next: "firstMock.add(\"was called first\")".to_string(),
        }
    );
}

#[test]
fn test_in_order_rejects_mock_outside_group() {
    let session = TestSession::new();
    let inside = list_mock(&session);
    let outside = list_mock(&session);
    outside.add("x");

    let mut in_order = session.in_order(&[&inside]);
    assert_error_code!(in_order.verify(&outside).called("add", args!["x"]), "M008");
}

#[test]
fn test_mocks_are_independent() {
    let session = TestSession::new();
    let one: ListProxy = session.mock_named("mockOne").unwrap();
    let two: ListProxy = session.mock_named("mockTwo").unwrap();
    let three: ListProxy = session.mock_named("mockThree").unwrap();

    session.verify_zero_interactions(&[&one]).unwrap();
    one.add("one");

    session.verify(&one).called("add", args!["one"]).unwrap();
    session
        .verify_with(&one, never())
        .called("add", args!["two"])
        .unwrap();
    session.verify_zero_interactions(&[&two, &three]).unwrap();

    let err = assert_error_code!(session.verify_zero_interactions(&[&one]), "M012");
    assert_eq!(
        err,
        MockError::UnexpectedInteraction {
            mock: "mockOne".to_string(),
            invocations: vec!["add(\"one\")".to_string()],
        }
    );
}

#[test]
fn test_no_more_interactions_after_verifying_everything() {
    let session = TestSession::new();
    let list = list_mock(&session);
    list.add("one");
    list.get(0);

    session.verify(&list).called("add", args!["one"]).unwrap();
    assert_error_code!(session.verify_no_more_interactions(&[&list]), "M012");

    session.verify(&list).called("get", args![0]).unwrap();
    session.verify_no_more_interactions(&[&list]).unwrap();
}

#[test]
fn test_consecutive_responses_repeat_the_last() {
    let session = TestSession::new();
    let list = list_mock(&session);
    session
        .when(&list, "size", args![])
        .unwrap()
        .then_return(1)
        .unwrap()
        .then_return(2)
        .unwrap();

    assert_eq!(list.size(), 1);
    assert_eq!(list.size(), 2);
    assert_eq!(list.size(), 2);
}

#[test]
fn test_reset_forgets_stubs_and_calls() {
    let session = TestSession::new();
    let list = list_mock(&session);
    session
        .when(&list, "size", args![])
        .unwrap()
        .then_return(5)
        .unwrap();
    assert_eq!(list.size(), 5);

    session.reset(&list);
    assert_eq!(list.size(), 0);
    session.verify(&list).called("size", args![]).unwrap();
}
