/// Template engine: `{{field}}` substitution with a literal-replace fallback.
///
/// The structured path validates placeholder syntax first. Well-formed placeholders
/// (`{{name}}`, optionally padded `{{ name }}`) are replaced by the field value; unknown
/// names are left untouched. If the body has a syntax error (an unclosed `{{` or a
/// non-identifier inside braces) rendering falls back to replacing every literal
/// `{{key}}` token from the mapping. Rendering itself never fails.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{Issue, Template};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid regex")
});
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

pub type Fields = BTreeMap<String, String>;

const DATE_FORMAT: &str = "%B %d, %Y";

/// Placeholder values used when neither the caller nor the issue supplies one.
const BUILTIN_DEFAULTS: [(&str, &str); 7] = [
    ("sender_name", "[YOUR NAME]"),
    ("sender_address", "[YOUR ADDRESS]"),
    ("recipient_name", "[RECIPIENT NAME]"),
    ("recipient_address", "[RECIPIENT ADDRESS]"),
    ("case_number", ""),
    ("amount", ""),
    ("deadline", ""),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateSyntaxError {
    #[error("unclosed placeholder at byte {0}")]
    Unclosed(usize),

    #[error("invalid placeholder '{text}' at byte {offset}")]
    InvalidName { offset: usize, text: String },
}

/// Render with the structured path, falling back to literal replacement on syntax errors.
pub fn render(body: &str, fields: &Fields) -> String {
    match render_structured(body, fields) {
        Ok(out) => out,
        Err(e) => {
            debug!(error = %e, "template syntax error, using literal substitution");
            render_literal(body, fields)
        }
    }
}

pub fn render_structured(body: &str, fields: &Fields) -> Result<String, TemplateSyntaxError> {
    check_syntax(body)?;
    let out = PLACEHOLDER_RE.replace_all(body, |caps: &Captures| match fields.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    });
    Ok(out.into_owned())
}

/// Replace each exact `{{key}}` token, in key order.
pub fn render_literal(body: &str, fields: &Fields) -> String {
    let mut content = body.to_string();
    for (key, value) in fields {
        content = content.replace(&format!("{{{{{key}}}}}"), value);
    }
    content
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholders(body: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    PLACEHOLDER_RE
        .captures_iter(body)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn check_syntax(body: &str) -> Result<(), TemplateSyntaxError> {
    let mut pos = 0;
    while let Some(rel) = body[pos..].find("{{") {
        let open = pos + rel;
        let inner_start = open + 2;
        let close = body[inner_start..]
            .find("}}")
            .map(|r| inner_start + r)
            .ok_or(TemplateSyntaxError::Unclosed(open))?;
        let inner = body[inner_start..close].trim();
        if !IDENTIFIER_RE.is_match(inner) {
            return Err(TemplateSyntaxError::InvalidName {
                offset: open,
                text: body[open..close + 2].to_string(),
            });
        }
        pos = close + 2;
    }
    Ok(())
}

/// The field mapping for one document, plus which names the caller or issue supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub fields: Fields,
    supplied: BTreeSet<String>,
}

impl FieldMapping {
    /// Layer built-in defaults, then issue-derived values, then caller `custom_data`.
    pub fn build(issue: &Issue, custom_data: &Map<String, Value>, now: DateTime<Utc>) -> Self {
        let mut fields: Fields = BUILTIN_DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let derived = issue_fields(issue, now);
        let mut supplied: BTreeSet<String> = derived.keys().cloned().collect();
        fields.extend(derived);

        for (key, value) in custom_data {
            let text = stringify(value);
            if !text.trim().is_empty() {
                supplied.insert(key.clone());
            }
            fields.insert(key.clone(), text);
        }

        Self { fields, supplied }
    }

    /// Required fields of `template` that neither the caller nor the issue provided.
    pub fn missing(&self, template: &Template) -> Vec<String> {
        template
            .required_fields
            .iter()
            .filter(|f| !self.supplied.contains(**f))
            .map(|f| f.to_string())
            .collect()
    }
}

fn issue_fields(issue: &Issue, now: DateTime<Utc>) -> Fields {
    let mut fields = Fields::new();
    fields.insert("current_date".into(), now.format(DATE_FORMAT).to_string());
    fields.insert("issue_description".into(), issue.description.clone());
    fields.insert(
        "issue_category".into(),
        issue
            .category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "General Legal Matter".to_string()),
    );
    fields.insert(
        "location".into(),
        issue.location.clone().unwrap_or_else(|| "Not specified".to_string()),
    );
    fields.insert("urgency".into(), issue.urgency.to_string());
    fields.insert("user_email".into(), issue.user_email.clone().unwrap_or_default());
    fields.insert("issue_id".into(), issue.id.clone());
    fields.insert(
        "created_date".into(),
        issue.created_at.format(DATE_FORMAT).to_string(),
    );
    fields
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
