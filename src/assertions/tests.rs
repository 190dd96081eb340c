use super::*;
use crate::error::AssertionError;
use serde_json::json;

fn unclosed_tag() -> RaisedError {
    RaisedError::new("TemplateError", "Unclosed tag")
        .with_property("id", "unclosed_tag")
        .with_property("explanation", "The tag beginning with \"{user\" is unclosed")
        .with_property("xtag", "user")
        .with_property("offset", 12)
}

fn expected_unclosed_tag() -> CanonicalError {
    CanonicalError::new("TemplateError", "Unclosed tag")
        .with_property("id", "unclosed_tag")
        .with_property("xtag", "user")
        .with_property("offset", 12)
}

#[test]
fn matching_error_passes() {
    let result = expect_to_throw(|| Err::<(), _>(unclosed_tag()), expected_unclosed_tag());
    assert_eq!(result, Ok(()));
}

#[test]
fn success_is_reported() {
    let result = expect_to_throw(|| Ok::<_, RaisedError>(42), expected_unclosed_tag());
    assert_eq!(result, Err(AssertionError::NoErrorRaised));
}

#[test]
fn missing_explanation_is_a_shape_mismatch() {
    let raised = RaisedError::new("TemplateError", "Unclosed tag").with_property("id", "unclosed_tag");
    let err = expect_to_throw(|| Err::<(), _>(raised), expected_unclosed_tag()).unwrap_err();
    assert_eq!(err.kind(), "AssertionShapeMismatch");
    assert!(matches!(err, AssertionError::ShapeMismatch { ref field, .. } if field == "explanation"));
}

#[test]
fn non_string_id_is_a_shape_mismatch() {
    let raised = RaisedError::new("TemplateError", "Unclosed tag")
        .with_property("id", 7)
        .with_property("explanation", "x");
    let err = expect_to_throw(|| Err::<(), _>(raised), expected_unclosed_tag()).unwrap_err();
    assert!(matches!(err, AssertionError::ShapeMismatch { ref field, .. } if field == "id"));
}

#[test]
fn differing_offset_fails_before_record_comparison() {
    let expected = expected_unclosed_tag().with_property("offset", 13);
    let err = expect_to_throw(|| Err::<(), _>(unclosed_tag()), expected).unwrap_err();
    match err {
        AssertionError::Mismatch { context, .. } => assert_eq!(context, "offset differs"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn offset_is_ignored_when_not_expected() {
    let mut expected = expected_unclosed_tag();
    expected.properties.remove("offset");
    assert_eq!(expect_to_throw(|| Err::<(), _>(unclosed_tag()), expected), Ok(()));
}

#[test]
fn location_fields_are_dropped() {
    let raised = unclosed_tag()
        .with_location("xml-templater.rs", 118)
        .with_stack("TemplateError: Unclosed tag\n    at parse");
    assert_eq!(
        expect_to_throw(|| Err::<(), _>(raised), expected_unclosed_tag()),
        Ok(())
    );
}

#[test]
fn stack_must_mention_expected_message() {
    let raised = unclosed_tag().with_stack("Error: Unopened tag\n    at parse");
    let err = expect_to_throw(|| Err::<(), _>(raised), expected_unclosed_tag()).unwrap_err();
    assert!(matches!(err, AssertionError::Mismatch { .. }));
}

#[test]
fn list_properties_collapse_to_lengths() {
    let raised = RaisedError::new("TemplateError", "Raw tag not in paragraph")
        .with_property("id", "raw_tag_outerxml_invalid")
        .with_property("explanation", "The raw tag \"myrawtag\" is not valid")
        .with_property(
            "postparsed",
            json!([
                {"type": "tag", "value": "myrawtag", "lIndex": 3, "offset": 0},
                {"type": "content", "value": "x", "lIndex": 4, "offset": 10}
            ]),
        )
        .with_property("paragraphParts", json!([{}, {}, {}]));

    let expected = CanonicalError::new("TemplateError", "Raw tag not in paragraph")
        .with_property("id", "raw_tag_outerxml_invalid")
        .with_property("postparsedLength", 2)
        .with_property("paragraphPartsLength", 3);

    assert_eq!(expect_to_throw(|| Err::<(), _>(raised), expected), Ok(()));
}

#[test]
fn wrong_length_is_reported() {
    let raised = RaisedError::new("TemplateError", "Raw tag not in paragraph")
        .with_property("id", "raw_tag_outerxml_invalid")
        .with_property("explanation", "x")
        .with_property("paragraphParts", json!([{}, {}]));
    let expected = CanonicalError::new("TemplateError", "Raw tag not in paragraph")
        .with_property("id", "raw_tag_outerxml_invalid")
        .with_property("paragraphPartsLength", 3);

    let err = expect_to_throw(|| Err::<(), _>(raised), expected).unwrap_err();
    match err {
        AssertionError::Mismatch { context, .. } => assert_eq!(context, "paragraphParts length differs"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn postparsed_entries_lose_parse_indexes() {
    let raised = RaisedError::new("TemplateError", "Unopened tag")
        .with_property("id", "unopened_tag")
        .with_property("explanation", "x")
        .with_property("postparsed", json!([{"type": "tag", "lIndex": 1, "offset": 4}]));
    let mut expected = CanonicalError::new("TemplateError", "Unopened tag")
        .with_property("id", "unopened_tag")
        .with_property("postparsed", json!([{"type": "tag"}]));

    let record = canonicalize(raised, &mut expected).unwrap();
    assert_eq!(record, expected);
}

#[test]
fn root_error_compares_by_message() {
    let cause = std::io::Error::new(std::io::ErrorKind::Other, "foo is not defined");
    let raised = RaisedError::new("ScopeParserError", "Scope parser compilation failed")
        .with_property("id", "scopeparser_compilation_failed")
        .with_property("explanation", "x")
        .with_root_error(cause);
    let expected = CanonicalError::new("ScopeParserError", "Scope parser compilation failed")
        .with_property("id", "scopeparser_compilation_failed")
        .with_property("rootError", json!({"message": "foo is not defined"}));

    assert_eq!(expect_to_throw(|| Err::<(), _>(raised), expected), Ok(()));
}

#[test]
fn root_error_message_mismatch_fails() {
    let cause = std::io::Error::new(std::io::ErrorKind::Other, "bar is not defined");
    let raised = RaisedError::new("ScopeParserError", "Scope parser compilation failed")
        .with_property("id", "scopeparser_compilation_failed")
        .with_property("explanation", "x")
        .with_root_error(cause);
    let expected = CanonicalError::new("ScopeParserError", "Scope parser compilation failed")
        .with_property("id", "scopeparser_compilation_failed")
        .with_property("rootError", json!({"message": "foo is not defined"}));

    let err = expect_to_throw(|| Err::<(), _>(raised), expected).unwrap_err();
    assert!(matches!(err, AssertionError::Mismatch { ref context, .. } if context == "rootError message differs"));
}

#[test]
fn multi_error_compares_nested_errors_pairwise() {
    let raised = RaisedError::multi(vec![
        unclosed_tag(),
        RaisedError::new("TemplateError", "Unopened tag")
            .with_property("id", "unopened_tag")
            .with_property("explanation", "x")
            .with_property("xtag", "name")
            .with_property("offset", 40),
    ]);
    let expected = wrap_multi_error(vec![
        expected_unclosed_tag(),
        CanonicalError::new("TemplateError", "Unopened tag")
            .with_property("id", "unopened_tag")
            .with_property("xtag", "name")
            .with_property("offset", 40),
    ]);

    assert_eq!(expect_to_throw(|| Err::<(), _>(raised), expected), Ok(()));
}

#[test]
fn multi_error_count_must_match() {
    let raised = RaisedError::multi(vec![unclosed_tag(), unclosed_tag()]);
    let expected = wrap_multi_error(Some(expected_unclosed_tag()));

    let err = expect_to_throw(|| Err::<(), _>(raised), expected).unwrap_err();
    assert!(matches!(err, AssertionError::Mismatch { ref context, .. } if context == "error count differs"));
}

#[test]
fn single_error_wraps_into_multi_shape() {
    let wrapped = wrap_multi_error(Some(expected_unclosed_tag()));
    assert_eq!(wrapped.name, MULTI_ERROR_NAME);
    assert_eq!(wrapped.message, MULTI_ERROR_MESSAGE);
    assert_eq!(wrapped.properties["id"], MULTI_ERROR_ID);
    assert_eq!(wrapped.properties["errors"].as_array().map(Vec::len), Some(1));
}

#[test]
fn differing_property_is_a_record_mismatch() {
    let expected = expected_unclosed_tag().with_property("xtag", "other");
    let err = expect_to_throw(|| Err::<(), _>(unclosed_tag()), expected).unwrap_err();
    match err {
        AssertionError::Mismatch {
            context,
            expected,
            actual,
        } => {
            assert_eq!(context, "canonical error records differ");
            assert!(expected.contains("\"other\""));
            assert!(actual.contains("\"user\""));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
