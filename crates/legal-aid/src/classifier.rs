/// Issue classification: prompt → model gateway → validated `Classification`.
///
/// `classify` never fails. Gateway and parse failures collapse into
/// `Classification::safe_default` with the cause in `reasoning`; there is no retry here.
use std::sync::Arc;

use legal_common::gateway::{ModelGateway, ModelRequest};
use tracing::{debug, info, warn};

use crate::config::GenerationSettings;
use crate::error::PipelineError;
use crate::model::Classification;
use crate::parser;
use crate::prompt;

#[derive(Clone)]
pub struct Classifier {
    gateway: Arc<dyn ModelGateway>,
    settings: GenerationSettings,
}

impl Classifier {
    pub fn new(gateway: Arc<dyn ModelGateway>, settings: GenerationSettings) -> Self {
        Self { gateway, settings }
    }

    pub async fn classify(&self, description: &str, location: Option<&str>) -> Classification {
        match self.try_classify(description, location).await {
            Ok(classification) => {
                info!(
                    category = %classification.category,
                    confidence = classification.confidence,
                    "issue classified"
                );
                classification
            }
            Err(e) => {
                warn!(error = %e, "classification failed, using safe default");
                Classification::safe_default(format!("Classification error: {e}"))
            }
        }
    }

    async fn try_classify(
        &self,
        description: &str,
        location: Option<&str>,
    ) -> Result<Classification, PipelineError> {
        let request = ModelRequest {
            prompt: prompt::classification_prompt(description, location),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let raw = self.gateway.invoke(&request).await?;
        debug!(response = %raw, "raw classification response");
        Ok(parser::parse_classification(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Complexity, Urgency};
    use crate::testing::{Script, ScriptedGateway};

    fn classifier(gateway: Arc<ScriptedGateway>) -> Classifier {
        Classifier::new(gateway, GenerationSettings::default())
    }

    #[tokio::test]
    async fn heating_dispute_is_returned_unchanged() {
        let gateway = Arc::new(ScriptedGateway::replying(
            r#"{"category":"tenant_rights","confidence":0.9,"urgency":"high","complexity":"moderate","reasoning":"heating repair dispute"}"#,
        ));
        let result = classifier(gateway.clone())
            .classify("My landlord won't fix the heat", None)
            .await;

        assert_eq!(
            result,
            Classification {
                category: Category::TenantRights,
                confidence: 0.9,
                urgency: Urgency::High,
                complexity: Complexity::Moderate,
                reasoning: "heating repair dispute".to_string(),
            }
        );

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("My landlord won't fix the heat"));
        assert_eq!(requests[0].max_tokens, GenerationSettings::default().max_tokens);
    }

    #[tokio::test]
    async fn gateway_timeout_yields_safe_default() {
        let gateway = Arc::new(ScriptedGateway::new(Script::Timeout));
        let result = classifier(gateway.clone()).classify("anything", Some("Reno")).await;

        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.urgency, Urgency::Medium);
        assert_eq!(result.complexity, Complexity::Moderate);
        assert_eq!(
            result.reasoning,
            "Classification error: request timed out after 30s"
        );
        assert_eq!(gateway.requests().len(), 1, "no retries inside the classifier");
    }

    #[tokio::test]
    async fn braceless_reply_yields_safe_default() {
        let gateway = Arc::new(ScriptedGateway::replying(
            "This sounds like an employment matter.",
        ));
        let result = classifier(gateway).classify("My boss didn't pay me", None).await;
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, 0.0);
        assert!(result.reasoning.starts_with("Classification error: no JSON object"));
    }

    #[tokio::test]
    async fn malformed_json_yields_safe_default() {
        let gateway = Arc::new(ScriptedGateway::replying(r#"{"category": "employment",}"#));
        let result = classifier(gateway).classify("x", None).await;
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn out_of_enum_category_is_forced_to_other() {
        let gateway = Arc::new(ScriptedGateway::replying(
            r#"{"category":"landlord_law","confidence":2.5,"urgency":"high"}"#,
        ));
        let result = classifier(gateway).classify("x", None).await;
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.urgency, Urgency::High);
    }
}
