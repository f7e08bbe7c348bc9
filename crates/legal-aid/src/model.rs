use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The closed set of legal domains an issue can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TenantRights,
    ConsumerProtection,
    Employment,
    FamilyLaw,
    Immigration,
    Criminal,
    CivilRights,
    DebtCollection,
    Housing,
    Healthcare,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::TenantRights,
        Category::ConsumerProtection,
        Category::Employment,
        Category::FamilyLaw,
        Category::Immigration,
        Category::Criminal,
        Category::CivilRights,
        Category::DebtCollection,
        Category::Housing,
        Category::Healthcare,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::TenantRights => "tenant_rights",
            Category::ConsumerProtection => "consumer_protection",
            Category::Employment => "employment",
            Category::FamilyLaw => "family_law",
            Category::Immigration => "immigration",
            Category::Criminal => "criminal",
            Category::CivilRights => "civil_rights",
            Category::DebtCollection => "debt_collection",
            Category::Housing => "housing",
            Category::Healthcare => "healthcare",
            Category::Other => "other",
        }
    }

    /// Exact match against the wire names; anything else maps to `Other`.
    pub fn parse_lenient(s: &str) -> Category {
        s.parse().unwrap_or(Category::Other)
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Urgency> {
        match s {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            _ => None,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Complexity {
    pub fn parse(s: &str) -> Option<Complexity> {
        match s {
            "simple" => Some(Complexity::Simple),
            "moderate" => Some(Complexity::Moderate),
            "complex" => Some(Complexity::Complex),
            _ => None,
        }
    }
}

/// A problem description submitted by a user.
///
/// Everything except `category` is fixed at creation; `category` is written once by the
/// classification flow through [`Issue::assign_category`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    pub id: String,
    pub description: String,
    pub location: Option<String>,
    pub urgency: Urgency,
    pub user_email: Option<String>,
    category: Option<Category>,
    pub created_at: DateTime<Utc>,
}

impl Issue {
    pub fn new(
        id: String,
        description: String,
        location: Option<String>,
        urgency: Urgency,
        user_email: Option<String>,
    ) -> Self {
        Self {
            id,
            description,
            location,
            urgency,
            user_email,
            category: None,
            created_at: Utc::now(),
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn assign_category(&mut self, category: Category) -> Result<(), AppError> {
        if let Some(existing) = self.category {
            return Err(AppError::AlreadyClassified {
                issue_id: self.id.clone(),
                category: existing,
            });
        }
        self.category = Some(category);
        Ok(())
    }
}

/// Validated classification of an issue. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Classification {
    pub category: Category,
    pub confidence: f64,
    pub urgency: Urgency,
    pub complexity: Complexity,
    pub reasoning: String,
}

impl Classification {
    /// The answer returned whenever the model could not be reached or understood.
    pub fn safe_default(reasoning: impl Into<String>) -> Self {
        Self {
            category: Category::Other,
            confidence: 0.0,
            urgency: Urgency::Medium,
            complexity: Complexity::Moderate,
            reasoning: reasoning.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Advice {
    pub advice: String,
    pub next_steps: Vec<String>,
    pub relevant_laws: Vec<String>,
    pub disclaimers: Vec<String>,
    pub confidence: f64,
    pub model_used: String,
}

/// A document template with `{{field}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: u32,
    pub key: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub body: &'static str,
    pub required_fields: &'static [&'static str],
}

impl Template {
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id,
            key: self.key.to_string(),
            name: self.name.to_string(),
            category: self.category,
            description: self.description.to_string(),
            required_fields: self.required_fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateSummary {
    pub id: u32,
    pub key: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub required_fields: Vec<String>,
}

/// Result of analyzing an issue: classification plus static guidance for its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Analysis {
    pub issue_id: String,
    pub classification: Classification,
    pub suggested_actions: Vec<String>,
    pub relevant_templates: Vec<TemplateSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdviceRecord {
    pub issue_id: String,
    pub advice: Advice,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentRecord {
    pub id: String,
    pub issue_id: String,
    pub template_id: u32,
    pub file_name: String,
    pub file_path: String,
    pub missing_fields: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names_round_trip_through_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn lenient_parse_maps_unknown_to_other() {
        assert_eq!(Category::parse_lenient("employment"), Category::Employment);
        assert_eq!(Category::parse_lenient("Employment"), Category::Other);
        assert_eq!(Category::parse_lenient("landlord_stuff"), Category::Other);
    }

    #[test]
    fn category_is_assigned_exactly_once() {
        let mut issue = Issue::new(
            "abc".to_string(),
            "My landlord won't fix the heat".to_string(),
            None,
            Urgency::High,
            None,
        );
        assert_eq!(issue.category(), None);
        issue.assign_category(Category::TenantRights).unwrap();
        assert_eq!(issue.category(), Some(Category::TenantRights));

        let err = issue.assign_category(Category::Housing).unwrap_err();
        assert!(matches!(err, AppError::AlreadyClassified { .. }));
        assert_eq!(issue.category(), Some(Category::TenantRights));
    }

    #[test]
    fn safe_default_is_fully_populated() {
        let c = Classification::safe_default("Classification error: timed out");
        assert_eq!(c.category, Category::Other);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.urgency, Urgency::Medium);
        assert_eq!(c.complexity, Complexity::Moderate);
        assert_eq!(c.reasoning, "Classification error: timed out");
    }
}
