use std::collections::BTreeMap;

use legal_common::gateway::BackendKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::knowledge::CategoryGuidance;
use crate::model::{Advice, AdviceRecord, Analysis, Category, DocumentRecord, Issue, TemplateSummary, Urgency};
use crate::resources::{LegalResource, OrganizationType};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeIssueParams {
    /// Plain-language description of the legal problem.
    pub description: String,
    /// City, state or country; used to tailor the analysis.
    pub location: Option<String>,
    /// How pressing the issue is to the user (default: medium).
    pub urgency: Option<Urgency>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AnalyzeIssueResponse {
    pub analysis: Analysis,
    /// Background for the category; absent for `other`.
    pub guidance: Option<CategoryGuidance>,
    /// Whether the issue was persisted and can be referenced by `issue_id` later.
    pub stored: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateAdviceParams {
    /// A stored issue to advise on. When set, its description and location are used.
    pub issue_id: Option<String>,
    /// Issue text, required when `issue_id` is not given.
    pub description: Option<String>,
    /// Category such as "tenant_rights". Defaults to the stored issue's category, else "other".
    pub category: Option<String>,
    pub location: Option<String>,
    pub additional_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GenerateAdviceResponse {
    pub issue_id: Option<String>,
    pub category: Category,
    pub advice: Advice,
    pub stored: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTemplatesParams {
    /// Restrict to one category; categories without templates list the general notice.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TemplateRef {
    /// Numeric template id.
    pub template_id: Option<u32>,
    /// Template key such as "tenant_demand". Used when `template_id` is absent.
    pub template_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TemplateDetailResponse {
    pub template: TemplateSummary,
    pub body: String,
    /// Every placeholder the body uses, in order of first appearance.
    pub placeholders: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateDocumentParams {
    #[serde(flatten)]
    pub template: TemplateRef,
    /// A stored issue to fill the template from.
    pub issue_id: Option<String>,
    /// Issue text for a one-off document, used when `issue_id` is absent.
    pub description: Option<String>,
    pub location: Option<String>,
    pub urgency: Option<Urgency>,
    /// Field values that override anything derived from the issue.
    pub custom_data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GenerateDocumentResponse {
    pub document: DocumentRecord,
    /// The field mapping the template was rendered with.
    pub fields: BTreeMap<String, String>,
    pub stored: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchResourcesParams {
    /// Jurisdiction code such as "US" (default: "US").
    pub jurisdiction: Option<String>,
    /// Keep organizations serving at least one of these categories. Absent or empty keeps all.
    pub categories: Option<Vec<Category>>,
    pub organization_type: Option<OrganizationType>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ResourceListResponse {
    pub jurisdiction: String,
    pub resources: Vec<LegalResource>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CategoryInfo {
    pub category: Category,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct OrganizationTypeInfo {
    pub organization_type: OrganizationType,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryInfo>,
    pub organization_types: Vec<OrganizationTypeInfo>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    pub issue_id: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct IssueDetailResponse {
    pub issue: Issue,
    pub advice: Vec<AdviceRecord>,
    pub documents: Vec<DocumentRecord>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// "healthy" when a model backend is configured and the record store answers, else "degraded".
    pub status: String,
    pub version: String,
    pub backend: BackendKind,
    pub llm_configured: bool,
    pub store_configured: bool,
    pub store_available: bool,
}
