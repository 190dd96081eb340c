use serde_json::{Map, Value};

use super::{CanonicalError, RaisedError};
use crate::error::AssertionError;

/// Properties whose expected record may pin only a length (`<prop>Length`).
const LENGTH_CHECKED: [&str; 2] = ["paragraphParts", "postparsed"];

/// Run `f`, require it to fail, and compare the canonicalized failure with
/// `expected`.
///
/// The raised error must carry string `explanation` and `id` properties.
/// Nested errors of a multi-error are compared pairwise.
pub fn expect_to_throw<T, E, F>(f: F, mut expected: CanonicalError) -> Result<(), AssertionError>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<RaisedError>,
{
    let raised: RaisedError = match f() {
        Ok(_) => return Err(AssertionError::NoErrorRaised),
        Err(err) => err.into(),
    };
    require_string_property(&raised, "explanation")?;
    require_string_property(&raised, "id")?;

    let actual = canonicalize(raised, &mut expected)?;

    let (actual, expected) = (actual.to_value(), expected.to_value());
    if actual != expected {
        return Err(AssertionError::mismatch(
            "canonical error records differ",
            expected,
            actual,
        ));
    }
    Ok(())
}

/// Reduce `actual` to its canonical record.
///
/// `expected` is trimmed alongside: fields that were checked here (offset,
/// root error, length hints) are removed from it so the two records can be
/// compared with plain equality afterwards.
pub fn canonicalize(
    actual: RaisedError,
    expected: &mut CanonicalError,
) -> Result<CanonicalError, AssertionError> {
    let RaisedError {
        name,
        message,
        mut properties,
        errors,
        root_error,
        stack,
        ..
    } = actual;

    properties.remove("explanation");

    if let Some(expected_offset) = expected.properties.get("offset") {
        let actual_offset = properties.get("offset").unwrap_or(&Value::Null);
        if actual_offset != expected_offset {
            return Err(AssertionError::mismatch(
                "offset differs",
                expected_offset,
                actual_offset,
            ));
        }
    }
    properties.remove("offset");
    expected.properties.remove("offset");

    if let Some(Value::Array(parts)) = properties.get_mut("postparsed") {
        for part in parts.iter_mut().filter_map(Value::as_object_mut) {
            part.remove("lIndex");
            part.remove("offset");
        }
    }

    if let Some(root) = root_error {
        let expected_message = expected
            .properties
            .get("rootError")
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AssertionError::mismatch(
                    "expected record has no rootError.message",
                    Value::Object(expected.properties.clone()),
                    root.to_string(),
                )
            })?;
        if root.to_string() != expected_message {
            return Err(AssertionError::mismatch(
                "rootError message differs",
                expected_message,
                root,
            ));
        }
        expected.properties.remove("rootError");
    }
    properties.remove("rootError");

    for key in LENGTH_CHECKED {
        check_length(&mut properties, &mut expected.properties, key)?;
    }

    if let Some(stack) = stack {
        let needle = format!("Error: {}", expected.message);
        if !stack.contains(&needle) {
            return Err(AssertionError::mismatch("stack does not mention", needle, stack));
        }
    }

    let mut record = CanonicalError {
        name,
        message,
        properties,
    };

    if !errors.is_empty() {
        let nested = canonicalize_nested(errors, expected)?;
        record.properties.insert("errors".to_string(), Value::Array(nested));
    }

    Ok(record)
}

fn canonicalize_nested(
    errors: Vec<RaisedError>,
    expected: &mut CanonicalError,
) -> Result<Vec<Value>, AssertionError> {
    let actual_count = errors.len();
    let expected_errors = match expected.properties.get_mut("errors") {
        Some(Value::Array(list)) => list,
        other => {
            return Err(AssertionError::mismatch(
                "expected errors to be an array",
                other.cloned().unwrap_or(Value::Null),
                format!("{actual_count} errors"),
            ))
        }
    };
    if expected_errors.len() != actual_count {
        return Err(AssertionError::mismatch(
            "error count differs",
            expected_errors.len(),
            actual_count,
        ));
    }

    let mut cleaned = Vec::with_capacity(actual_count);
    for (raised, expected_value) in errors.into_iter().zip(expected_errors.iter_mut()) {
        let mut expected_nested = CanonicalError::from_json(expected_value)?;
        let record = canonicalize(raised, &mut expected_nested)?;
        *expected_value = expected_nested.to_value();
        cleaned.push(record.to_value());
    }
    Ok(cleaned)
}

/// Substitute a list property by its length when the expected record only
/// specifies `<key>Length`.
fn check_length(
    actual: &mut Map<String, Value>,
    expected: &mut Map<String, Value>,
    key: &str,
) -> Result<(), AssertionError> {
    let length_key = format!("{key}Length");
    let (Some(property), Some(expected_length)) = (actual.get(key), expected.get(&length_key))
    else {
        return Ok(());
    };

    let expected_length = expected_length.as_u64().ok_or_else(|| {
        AssertionError::mismatch(
            format!("{length_key} must be a number"),
            "number",
            expected_length,
        )
    })?;
    let actual_length = property.as_array().map(Vec::len).ok_or_else(|| {
        AssertionError::shape(key, format!("expected a list, got {property}"))
    })?;
    if actual_length as u64 != expected_length {
        return Err(AssertionError::mismatch(
            format!("{key} length differs"),
            expected_length,
            actual_length,
        ));
    }

    actual.remove(key);
    expected.remove(&length_key);
    Ok(())
}

fn require_string_property(raised: &RaisedError, key: &str) -> Result<(), AssertionError> {
    match raised.properties.get(key) {
        Some(Value::String(_)) => Ok(()),
        Some(other) => Err(AssertionError::shape(
            key,
            format!("expected a string, got {other} ({raised})"),
        )),
        None => Err(AssertionError::shape(key, format!("missing on {raised}"))),
    }
}
