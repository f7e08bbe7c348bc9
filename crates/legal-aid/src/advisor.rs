/// Advice generation for a categorized issue.
///
/// Same shape as the classifier. On failure the returned `Advice` says the service is
/// degraded and points to a human fallback; `advise` never fails.
use std::sync::Arc;

use legal_common::gateway::{ModelGateway, ModelRequest};
use tracing::{debug, info, warn};

use crate::config::GenerationSettings;
use crate::error::PipelineError;
use crate::model::{Advice, Category};
use crate::parser;
use crate::prompt;

pub const FALLBACK_MODEL_LABEL: &str = "error_fallback";
pub const LEGAL_AID_REFERRAL: &str = "Contact a local legal aid organization for assistance";

const DEFAULT_DISCLAIMERS: [&str; 2] = [
    "This is general information only, not legal advice",
    "Consult with a qualified attorney about your specific situation",
];

#[derive(Clone)]
pub struct Advisor {
    gateway: Arc<dyn ModelGateway>,
    settings: GenerationSettings,
}

impl Advisor {
    pub fn new(gateway: Arc<dyn ModelGateway>, settings: GenerationSettings) -> Self {
        Self { gateway, settings }
    }

    pub async fn advise(
        &self,
        description: &str,
        category: Category,
        location: Option<&str>,
        additional_context: Option<&str>,
    ) -> Advice {
        match self
            .try_advise(description, category, location, additional_context)
            .await
        {
            Ok(advice) => {
                info!(
                    category = %category,
                    steps = advice.next_steps.len(),
                    model = %advice.model_used,
                    "advice generated"
                );
                advice
            }
            Err(e) => {
                warn!(error = %e, category = %category, "advice generation failed, using fallback");
                fallback_advice(&e)
            }
        }
    }

    async fn try_advise(
        &self,
        description: &str,
        category: Category,
        location: Option<&str>,
        additional_context: Option<&str>,
    ) -> Result<Advice, PipelineError> {
        let request = ModelRequest {
            prompt: prompt::advice_prompt(description, category, location, additional_context),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let raw = self.gateway.invoke(&request).await?;
        debug!(response = %raw, "raw advice response");
        let parsed = parser::parse_advice(&raw)?;

        let disclaimers = if parsed.disclaimers.is_empty() {
            default_disclaimers()
        } else {
            parsed.disclaimers
        };

        Ok(Advice {
            advice: parsed.advice,
            next_steps: parsed.next_steps,
            relevant_laws: parsed.relevant_laws,
            disclaimers,
            confidence: parsed.confidence,
            model_used: self.gateway.model_label().to_string(),
        })
    }
}

fn fallback_advice(err: &PipelineError) -> Advice {
    Advice {
        advice: format!(
            "I apologize, but I'm unable to generate advice at this time due to a technical issue: {err}"
        ),
        next_steps: vec![LEGAL_AID_REFERRAL.to_string()],
        relevant_laws: Vec::new(),
        disclaimers: default_disclaimers(),
        confidence: 0.0,
        model_used: FALLBACK_MODEL_LABEL.to_string(),
    }
}

fn default_disclaimers() -> Vec<String> {
    DEFAULT_DISCLAIMERS.iter().map(|d| d.to_string()).collect()
}
