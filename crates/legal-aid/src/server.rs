/// MCP server for the legal aid assistant.
///
/// Exposes nine tools:
/// - `analyze_issue`: classify an issue and return suggested actions and templates
/// - `generate_advice`: model-generated guidance for a stored or inline issue
/// - `list_templates` / `get_template`: browse the document template catalog
/// - `generate_document`: fill a template and write the letter to disk
/// - `search_resources` / `list_categories`: referral directory and the category vocabulary
/// - `get_issue`: a stored issue with its advice and document history
/// - `health`: backend and record store status
use std::sync::Arc;

use chrono::Utc;
use legal_common::gateway::{BackendKind, ModelGateway};
use legal_common::ids::new_record_id;
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::advisor::Advisor;
use crate::api::{
    AnalyzeIssueParams, AnalyzeIssueResponse, CategoryInfo, CategoryListResponse,
    GenerateAdviceParams, GenerateAdviceResponse, GenerateDocumentParams,
    GenerateDocumentResponse, GetIssueParams, HealthResponse, IssueDetailResponse,
    ListTemplatesParams, OrganizationTypeInfo, ResourceListResponse, SearchResourcesParams,
    TemplateDetailResponse, TemplateListResponse, TemplateRef,
};
use crate::classifier::Classifier;
use crate::config::GenerationSettings;
use crate::document::{self, DocumentOutput};
use crate::error::AppError;
use crate::knowledge;
use crate::model::{AdviceRecord, Analysis, Category, DocumentRecord, Issue, Template};
use crate::render::{self, FieldMapping};
use crate::resources::{self, OrganizationType};
use crate::store::RecordStore;
use crate::templates;

#[derive(Clone)]
pub struct LegalAidServer {
    classifier: Classifier,
    advisor: Advisor,
    store: RecordStore,
    output: DocumentOutput,
    backend: BackendKind,
    llm_configured: bool,
    tool_router: ToolRouter<LegalAidServer>,
}

impl LegalAidServer {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        settings: GenerationSettings,
        store: RecordStore,
        output: DocumentOutput,
        backend: BackendKind,
        llm_configured: bool,
    ) -> Self {
        Self {
            classifier: Classifier::new(Arc::clone(&gateway), settings),
            advisor: Advisor::new(gateway, settings),
            store,
            output,
            backend,
            llm_configured,
            tool_router: Self::tool_router(),
        }
    }

    async fn stored_issue(&self, issue_id: &str) -> Result<Issue, AppError> {
        if !self.store.is_configured() {
            return Err(AppError::StoreUnavailable);
        }
        self.store
            .load_issue(issue_id)
            .await
            .ok_or_else(|| AppError::IssueNotFound(issue_id.to_string()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn resolve_template(reference: &TemplateRef) -> Result<&'static Template, AppError> {
    if let Some(id) = reference.template_id {
        return templates::find(id).ok_or_else(|| AppError::TemplateNotFound(id.to_string()));
    }
    match non_empty(reference.template_key.clone()) {
        Some(key) => templates::find_by_key(&key).ok_or(AppError::TemplateNotFound(key)),
        None => Err(AppError::TemplateNotFound(
            "template_id or template_key is required".to_string(),
        )),
    }
}

#[tool_router]
impl LegalAidServer {
    #[tool(description = "Classify a legal issue into one of eleven categories and return urgency, complexity, suggested next actions and relevant document templates. The issue is stored and its issue_id can be reused by other tools.")]
    async fn analyze_issue(
        &self,
        Parameters(params): Parameters<AnalyzeIssueParams>,
    ) -> Result<Json<AnalyzeIssueResponse>, String> {
        let description = params.description.trim().to_string();
        if description.is_empty() {
            return Err("description must not be empty".to_string());
        }
        let location = non_empty(params.location);

        let mut issue = Issue::new(
            new_record_id(),
            description,
            location,
            params.urgency.unwrap_or_default(),
            non_empty(params.user_email),
        );

        let classification = self
            .classifier
            .classify(&issue.description, issue.location.as_deref())
            .await;
        let category = classification.category;
        issue
            .assign_category(category)
            .map_err(|e| format!("analyze_issue failed: {e}"))?;

        let stored = self.store.save_issue(&issue).await;
        info!(issue_id = %issue.id, category = %category, stored, "issue analyzed");

        Ok(Json(AnalyzeIssueResponse {
            analysis: Analysis {
                issue_id: issue.id,
                classification,
                suggested_actions: knowledge::actions_for(category)
                    .iter()
                    .map(|a| a.to_string())
                    .collect(),
                relevant_templates: knowledge::templates_for(category),
            },
            guidance: knowledge::guidance_for(category),
            stored,
        }))
    }

    #[tool(description = "Generate general legal guidance (advice, next steps, relevant laws, disclaimers) for a stored issue_id or an inline description and category. Always answers; when the model is unavailable the advice says so and points to legal aid.")]
    async fn generate_advice(
        &self,
        Parameters(params): Parameters<GenerateAdviceParams>,
    ) -> Result<Json<GenerateAdviceResponse>, String> {
        let issue = match non_empty(params.issue_id) {
            Some(id) => Some(
                self.stored_issue(&id)
                    .await
                    .map_err(|e| format!("generate_advice failed: {e}"))?,
            ),
            None => None,
        };

        let description = match (&issue, non_empty(params.description)) {
            (Some(issue), _) => issue.description.clone(),
            (None, Some(description)) => description,
            (None, None) => return Err("either issue_id or description is required".to_string()),
        };
        let location = non_empty(params.location)
            .or_else(|| issue.as_ref().and_then(|i| i.location.clone()));
        let category = match non_empty(params.category) {
            Some(raw) => Category::parse_lenient(&raw),
            None => issue
                .as_ref()
                .and_then(Issue::category)
                .unwrap_or(Category::Other),
        };
        let additional_context = non_empty(params.additional_context);

        let advice = self
            .advisor
            .advise(
                &description,
                category,
                location.as_deref(),
                additional_context.as_deref(),
            )
            .await;

        let issue_id = issue.map(|i| i.id);
        let stored = match &issue_id {
            Some(id) => {
                self.store
                    .append_advice(&AdviceRecord {
                        issue_id: id.clone(),
                        advice: advice.clone(),
                        generated_at: Utc::now(),
                    })
                    .await
            }
            None => false,
        };

        Ok(Json(GenerateAdviceResponse {
            issue_id,
            category,
            advice,
            stored,
        }))
    }

    #[tool(description = "List document templates, optionally only those relevant to a category (e.g. 'tenant_rights').")]
    async fn list_templates(
        &self,
        Parameters(params): Parameters<ListTemplatesParams>,
    ) -> Result<Json<TemplateListResponse>, String> {
        let templates = match non_empty(params.category) {
            Some(raw) => {
                let category: Category = raw.parse().map_err(|e: AppError| e.to_string())?;
                knowledge::templates_for(category)
            }
            None => templates::TEMPLATES.iter().map(Template::summary).collect(),
        };
        Ok(Json(TemplateListResponse { templates }))
    }

    #[tool(description = "Get one document template by template_id or template_key, including its body and the placeholders it uses.")]
    async fn get_template(
        &self,
        Parameters(params): Parameters<TemplateRef>,
    ) -> Result<Json<TemplateDetailResponse>, String> {
        let template = resolve_template(&params).map_err(|e| e.to_string())?;
        Ok(Json(TemplateDetailResponse {
            template: template.summary(),
            body: template.body.to_string(),
            placeholders: render::placeholders(template.body),
        }))
    }

    #[tool(description = "Fill a document template from a stored issue_id (or an inline description) plus custom_data field values, and write the letter to the output directory. Reports required fields that were not supplied.")]
    async fn generate_document(
        &self,
        Parameters(params): Parameters<GenerateDocumentParams>,
    ) -> Result<Json<GenerateDocumentResponse>, String> {
        let fail = |e: AppError| format!("generate_document failed: {e}");
        let template = resolve_template(&params.template).map_err(fail)?;

        let (issue, persisted) = match (non_empty(params.issue_id), non_empty(params.description)) {
            (Some(id), _) => (self.stored_issue(&id).await.map_err(fail)?, true),
            (None, Some(description)) => (
                Issue::new(
                    new_record_id(),
                    description,
                    non_empty(params.location),
                    params.urgency.unwrap_or_default(),
                    None,
                ),
                false,
            ),
            (None, None) => return Err("either issue_id or description is required".to_string()),
        };

        let now = Utc::now();
        let custom_data = params.custom_data.unwrap_or_default();
        let mapping = FieldMapping::build(&issue, &custom_data, now);
        let missing_fields = mapping.missing(template);

        let text = render::render(template.body, &mapping.fields);
        let rendered = document::assemble(&text, template.name, &now.format("%B %d, %Y").to_string());
        let stem = format!("{}_{}_{}", template.key, issue.id, now.format("%Y%m%d_%H%M%S"));
        let path = self.output.write(&stem, &rendered).await.map_err(fail)?;

        let record = DocumentRecord {
            id: new_record_id(),
            issue_id: issue.id.clone(),
            template_id: template.id,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| stem.clone()),
            file_path: path.display().to_string(),
            missing_fields,
            generated_at: now,
        };
        let stored = persisted && self.store.append_document(&record).await;
        info!(
            issue_id = %record.issue_id,
            template = template.key,
            file = %record.file_path,
            missing = record.missing_fields.len(),
            "document generated"
        );

        Ok(Json(GenerateDocumentResponse {
            document: record,
            fields: mapping.fields,
            stored,
        }))
    }

    #[tool(description = "Find organizations to refer a user to (legal aid, nonprofits, government agencies), filtered by jurisdiction (default 'US'), categories and organization_type.")]
    async fn search_resources(
        &self,
        Parameters(params): Parameters<SearchResourcesParams>,
    ) -> Result<Json<ResourceListResponse>, String> {
        let jurisdiction = non_empty(params.jurisdiction)
            .unwrap_or_else(|| resources::DEFAULT_JURISDICTION.to_string());
        let categories = params.categories.unwrap_or_default();
        let found: Vec<_> = resources::resources_for(&categories, &jurisdiction, params.organization_type)
            .into_iter()
            .cloned()
            .collect();
        info!(jurisdiction = %jurisdiction, results = found.len(), "resource search");
        Ok(Json(ResourceListResponse {
            jurisdiction,
            resources: found,
        }))
    }

    #[tool(description = "List the legal categories issues are classified into and the organization types used by search_resources, each with a short description.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        Ok(Json(CategoryListResponse {
            categories: Category::ALL
                .into_iter()
                .map(|category| CategoryInfo {
                    category,
                    description: knowledge::describe(category),
                })
                .collect(),
            organization_types: OrganizationType::ALL
                .into_iter()
                .map(|organization_type| OrganizationTypeInfo {
                    organization_type,
                    description: organization_type.description(),
                })
                .collect(),
        }))
    }

    #[tool(description = "Get a stored issue by issue_id with its advice history and generated documents.")]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<Json<IssueDetailResponse>, String> {
        let issue_id = params.issue_id.trim().to_string();
        if issue_id.is_empty() {
            return Err("issue_id must not be empty".to_string());
        }
        let issue = self
            .stored_issue(&issue_id)
            .await
            .map_err(|e| format!("get_issue failed: {e}"))?;
        Ok(Json(IssueDetailResponse {
            advice: self.store.advice_for(&issue_id).await,
            documents: self.store.documents_for(&issue_id).await,
            issue,
        }))
    }

    #[tool(description = "Report service status: model backend kind, whether it is configured, and whether the record store is reachable.")]
    async fn health(&self) -> Result<Json<HealthResponse>, String> {
        let store_available = self.store.is_available().await;
        let status = if self.llm_configured && store_available {
            "healthy"
        } else {
            "degraded"
        };
        Ok(Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: self.backend,
            llm_configured: self.llm_configured,
            store_configured: self.store.is_configured(),
            store_available,
        }))
    }
}

#[tool_handler]
impl ServerHandler for LegalAidServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "legal-aid".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Community legal aid assistant. Start with analyze_issue to classify a problem and \
get an issue_id, suggested actions and templates. Use generate_advice for general guidance, \
list_templates/get_template to browse letters and generate_document to fill one. \
search_resources finds organizations to refer the user to. Output is general information, not \
legal advice."
                    .to_string(),
            ),
        }
    }
}
