/// Extraction and validation of structured data from free-form model output.
///
/// Model text is untrusted. The only way it reaches domain types is through the total
/// validators in this module:
/// - the JSON object is located by slicing from the first `{` to the last `}`,
/// - every field is checked on its own and replaced by a fixed default when it is missing,
///   of the wrong type, or out of range.
///
/// Out-of-schema values never surface as errors, and neither do fields whose own JSON
/// cannot be decoded (an overflowing number such as `1e400`): such a field counts as absent. The only error is `ParseError`, meaning no
/// JSON object could be recovered at all.
use std::collections::BTreeMap;

use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::model::{Category, Classification, Complexity, Urgency};

pub const DEFAULT_CONFIDENCE: f64 = 0.5;
pub const MISSING_ADVICE_TEXT: &str = "Unable to generate advice";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON object found in model response")]
    NoJsonObject,

    #[error("invalid JSON in model response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Advice fields recovered from a model response; `model_used` is added by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAdvice {
    pub advice: String,
    pub next_steps: Vec<String>,
    pub relevant_laws: Vec<String>,
    pub disclaimers: Vec<String>,
    pub confidence: f64,
}

/// Slice the text between the first `{` and the last `}` and parse it as a JSON object.
///
/// The object's syntax is checked as a whole, but each member value is decoded on its own;
/// a member that fails to decode is dropped.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }
    let members: BTreeMap<String, Box<RawValue>> = serde_json::from_str(&text[start..=end])?;
    Ok(members
        .into_iter()
        .filter_map(|(key, raw)| {
            serde_json::from_str::<Value>(raw.get())
                .ok()
                .map(|value| (key, value))
        })
        .collect())
}

pub fn parse_classification(text: &str) -> Result<Classification, ParseError> {
    let data = extract_json_object(text)?;
    Ok(validate_classification(&data))
}

/// Map any JSON object onto a fully populated `Classification`.
pub fn validate_classification(data: &Map<String, Value>) -> Classification {
    let category = data
        .get("category")
        .and_then(Value::as_str)
        .map(Category::parse_lenient)
        .unwrap_or(Category::Other);

    let urgency = data
        .get("urgency")
        .and_then(Value::as_str)
        .and_then(Urgency::parse)
        .unwrap_or_default();

    let complexity = data
        .get("complexity")
        .and_then(Value::as_str)
        .and_then(Complexity::parse)
        .unwrap_or_default();

    let reasoning = data
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Classification {
        category,
        confidence: validate_confidence(data.get("confidence")),
        urgency,
        complexity,
        reasoning,
    }
}

pub fn parse_advice(text: &str) -> Result<ParsedAdvice, ParseError> {
    let data = extract_json_object(text)?;
    Ok(validate_advice(&data))
}

pub fn validate_advice(data: &Map<String, Value>) -> ParsedAdvice {
    let advice = data
        .get("advice")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_ADVICE_TEXT)
        .to_string();

    ParsedAdvice {
        advice,
        next_steps: string_list(data.get("next_steps")),
        relevant_laws: string_list(data.get("relevant_laws")),
        disclaimers: string_list(data.get("disclaimers")),
        confidence: validate_confidence(data.get("confidence")),
    }
}

/// A number within [0, 1], or `DEFAULT_CONFIDENCE`.
fn validate_confidence(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|c| (0.0..=1.0).contains(c))
        .unwrap_or(DEFAULT_CONFIDENCE)
}

/// Strings from an array (other items dropped), a lone string as one item, else empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAT: &str = r#"{"category":"tenant_rights","confidence":0.9,"urgency":"high","complexity":"moderate","reasoning":"heating repair dispute"}"#;

    #[test]
    fn well_formed_object_passes_through() {
        let c = parse_classification(HEAT).unwrap();
        assert_eq!(c.category, Category::TenantRights);
        assert_eq!(c.confidence, 0.9);
        assert_eq!(c.urgency, Urgency::High);
        assert_eq!(c.complexity, Complexity::Moderate);
        assert_eq!(c.reasoning, "heating repair dispute");
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = format!("Sure! Here you go:\n```json\n{HEAT}\n```\nHope that helps.");
        let a = parse_classification(&text).unwrap();
        let b = parse_classification(&text).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.category, Category::TenantRights);
    }

    #[test]
    fn every_valid_category_is_returned_verbatim() {
        for category in Category::ALL {
            let text = format!(r#"{{"category":"{}","confidence":0.7}}"#, category.as_str());
            assert_eq!(parse_classification(&text).unwrap().category, category);
        }
    }

    #[test]
    fn unknown_missing_or_mistyped_category_becomes_other() {
        for text in [
            r#"{"category":"landlord_law","confidence":0.9}"#,
            r#"{"category":"Tenant_Rights"}"#,
            r#"{"category":null}"#,
            r#"{"category":7}"#,
            r#"{"confidence":0.9}"#,
            r#"{"category":["employment"]}"#,
        ] {
            assert_eq!(
                parse_classification(text).unwrap().category,
                Category::Other,
                "input: {text}"
            );
        }
    }

    #[test]
    fn out_of_range_confidence_becomes_default() {
        for raw in ["-1", "2.5", "\"0.9\"", "true", "null", "1.0000001"] {
            let text = format!(r#"{{"category":"employment","confidence":{raw}}}"#);
            assert_eq!(
                parse_classification(&text).unwrap().confidence,
                DEFAULT_CONFIDENCE,
                "input: {raw}"
            );
        }
    }

    #[test]
    fn overflowing_confidence_keeps_the_category() {
        for raw in ["1e400", "-1e400"] {
            let text = format!(r#"{{"category":"employment","confidence":{raw},"urgency":"high"}}"#);
            let c = parse_classification(&text).unwrap();
            assert_eq!(c.category, Category::Employment, "input: {raw}");
            assert_eq!(c.urgency, Urgency::High);
            assert_eq!(c.confidence, DEFAULT_CONFIDENCE);
        }
    }

    #[test]
    fn overflow_inside_another_field_drops_only_that_field() {
        let parsed = parse_advice(
            r#"{"advice":"Keep records.","next_steps":[1e999,"Call"],"confidence":0.4}"#,
        )
        .unwrap();
        assert_eq!(parsed.advice, "Keep records.");
        assert!(parsed.next_steps.is_empty());
        assert_eq!(parsed.confidence, 0.4);
    }

    #[test]
    fn boundary_confidence_is_kept() {
        let zero = parse_classification(r#"{"confidence":0}"#).unwrap();
        assert_eq!(zero.confidence, 0.0);
        let one = parse_classification(r#"{"confidence":1}"#).unwrap();
        assert_eq!(one.confidence, 1.0);
    }

    #[test]
    fn invalid_urgency_and_complexity_use_defaults() {
        let c = parse_classification(
            r#"{"category":"criminal","urgency":"urgent","complexity":"very hard","extra":{"k":1}}"#,
        )
        .unwrap();
        assert_eq!(c.category, Category::Criminal);
        assert_eq!(c.urgency, Urgency::Medium);
        assert_eq!(c.complexity, Complexity::Moderate);
        assert_eq!(c.reasoning, "");
    }

    #[test]
    fn prose_without_braces_is_a_parse_error() {
        assert!(matches!(
            parse_classification("I think this is a tenant issue."),
            Err(ParseError::NoJsonObject)
        ));
        assert!(matches!(
            parse_classification("} backwards {"),
            Err(ParseError::NoJsonObject)
        ));
    }

    #[test]
    fn multiple_objects_fail_to_parse() {
        let text = r#"{"category":"employment"} and also {"category":"criminal"}"#;
        assert!(matches!(
            parse_classification(text),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn advice_fields_are_validated() {
        let parsed = parse_advice(
            r#"Here is my answer: {
                "advice": "  You may be owed a repair.  ",
                "next_steps": ["Write to your landlord", 3, "", "Call 311"],
                "relevant_laws": "Local Housing Code",
                "confidence": 4,
                "disclaimers": ["This is not legal advice"]
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.advice, "You may be owed a repair.");
        assert_eq!(parsed.next_steps, vec!["Write to your landlord", "Call 311"]);
        assert_eq!(parsed.relevant_laws, vec!["Local Housing Code"]);
        assert_eq!(parsed.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(parsed.disclaimers, vec!["This is not legal advice"]);
    }

    #[test]
    fn missing_advice_fields_get_placeholders() {
        let parsed = parse_advice("{}").unwrap();
        assert_eq!(parsed.advice, MISSING_ADVICE_TEXT);
        assert!(parsed.next_steps.is_empty());
        assert!(parsed.relevant_laws.is_empty());
        assert!(parsed.disclaimers.is_empty());
        assert_eq!(parsed.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn object_inside_other_json_is_extracted() {
        let data = extract_json_object(r#"[{"category":"housing"}]"#).unwrap();
        assert_eq!(data.get("category").and_then(Value::as_str), Some("housing"));
    }
}
