//! JSON helpers for log serialization

use regex::Regex;
use serde_json::{Map, Value};

pub const MASKED_OUTPUT: &str = "***";

/// Serialize handler arguments for logging, masking sensitive fields.
///
/// Any object key matching one of `masked_keywords`, at any depth, has its
/// value replaced by `masked_output`. No arguments yield `None`; a single
/// argument is serialized on its own; several are serialized as an array.
pub fn stringify_with_mask(
    masked_keywords: &[Regex],
    masked_output: &str,
    args: &[Value],
) -> Option<String> {
    let masked = |value: &Value| mask_value(value, masked_keywords, masked_output);
    let serialized = match args {
        [] => return None,
        [single] => masked(single).to_string(),
        many => Value::Array(many.iter().map(masked).collect()).to_string(),
    };
    Some(serialized)
}

fn mask_value(value: &Value, masked_keywords: &[Regex], masked_output: &str) -> Value {
    match value {
        Value::Object(object) => {
            let mut result = Map::with_capacity(object.len());
            for (key, inner) in object {
                let replacement = if masked_keywords.iter().any(|pattern| pattern.is_match(key)) {
                    Value::String(masked_output.to_string())
                } else {
                    mask_value(inner, masked_keywords, masked_output)
                };
                result.insert(key.clone(), replacement);
            }
            Value::Object(result)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| mask_value(item, masked_keywords, masked_output))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;
    use serde_json::json;

    fn password_mask() -> Vec<Regex> {
        vec![RegexBuilder::new("password")
            .case_insensitive(true)
            .build()
            .unwrap()]
    }

    #[test]
    fn test_masks_matching_keys() {
        let output = stringify_with_mask(
            &password_mask(),
            MASKED_OUTPUT,
            &[json!({"password": "secret", "user": "a"})],
        );
        assert_eq!(output.as_deref(), Some(r#"{"password":"***","user":"a"}"#));
    }

    #[test]
    fn test_masks_nested_keys_case_insensitively() {
        let output = stringify_with_mask(
            &password_mask(),
            MASKED_OUTPUT,
            &[json!({"form": {"newPassword": "x", "items": [{"PASSWORD": 1}]}})],
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed,
            json!({"form": {"newPassword": "***", "items": [{"PASSWORD": "***"}]}})
        );
    }

    #[test]
    fn test_argument_count_shapes_output() {
        assert_eq!(stringify_with_mask(&[], MASKED_OUTPUT, &[]), None);
        assert_eq!(
            stringify_with_mask(&[], MASKED_OUTPUT, &[json!("a")]).as_deref(),
            Some(r#""a""#)
        );
        assert_eq!(
            stringify_with_mask(&[], MASKED_OUTPUT, &[json!("a"), json!(2)]).as_deref(),
            Some(r#"["a",2]"#)
        );
    }
}
