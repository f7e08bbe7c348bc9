use legal_common::error::CommonError;

use crate::model::Category;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("issue {issue_id} is already classified as {category}")]
    AlreadyClassified { issue_id: String, category: Category },

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("record store unavailable")]
    StoreUnavailable,

    #[error("document output failed: {0}")]
    Output(String),
}

/// Failure inside a build → invoke → parse pipeline. Never leaves the classifier or
/// advisor; it is folded into their fallback records.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Gateway(#[from] legal_common::gateway::GatewayError),

    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),
}
