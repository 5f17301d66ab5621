use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use super::client::LlmClient;
use crate::processor::{DocumentHandler, HandlerRegistry, Operation};

/// Answers one operation by prompting the LLM.
pub struct LlmHandler {
    client: Arc<LlmClient>,
    operation: Operation,
}

impl LlmHandler {
    pub fn new(client: Arc<LlmClient>, operation: Operation) -> Self {
        Self { client, operation }
    }

    /// A registry with an LLM-backed handler for every operation, sharing one client.
    pub fn registry(client: Arc<LlmClient>) -> HandlerRegistry {
        HandlerRegistry::from_fn(|operation| Arc::new(Self::new(client.clone(), operation)))
    }
}

#[async_trait]
impl DocumentHandler for LlmHandler {
    async fn handle(&self, text: &str, question: Option<&str>) -> anyhow::Result<String> {
        self.client
            .complete(self.operation, text, question)
            .await
            .with_context(|| format!("{} request failed", self.client.config().provider_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::config::{LlmAppConfig, LlmConfig, LlmDeviceConfig, LlmProvider};
    use crate::processor::DocumentProcessor;

    #[tokio::test]
    async fn test_missing_key_becomes_error_response() {
        let config = LlmConfig::new(
            LlmAppConfig::default(),
            LlmDeviceConfig {
                provider: LlmProvider::Gemini,
                endpoint: "http://127.0.0.1:9".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key: None,
            },
        );
        let client = Arc::new(LlmClient::new(config).unwrap());
        let processor = DocumentProcessor::new(LlmHandler::registry(client));

        let response = processor.process("Presuda", "appeal", None).await;
        let message = response.error().unwrap();
        assert!(
            message.starts_with("Error processing appeal request: Gemini request failed: "),
            "{}",
            message
        );
        assert!(message.contains("GEMINI_API_KEY"));
    }
}
