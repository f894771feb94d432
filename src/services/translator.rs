use reqwest::Client as HttpClient;
use serde_json::json;

use crate::api::middleware::AppError;
use crate::config::Config;

/// Translates natural-language questions into SQL via an external
/// text-generation endpoint.
///
/// The endpoint takes `{model, prompt}` and answers with a JSON body
/// whose `response` field holds the generated text. That text is
/// returned verbatim, with no syntactic validation: the query engine's
/// failure path is the safety net for malformed output. No retries.
pub struct QueryTranslator {
    endpoint_url: String,
    model: String,
    http_client: HttpClient,
}

impl QueryTranslator {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint_url: config.llm.endpoint_url.clone(),
            model: config.llm.model.clone(),
            http_client: HttpClient::new(),
        }
    }

    /// One prompt embedding the full schema summary and the literal
    /// question, instructing SQL-only output.
    pub fn build_prompt(&self, question: &str, schema_summary: &str) -> String {
        format!(
            "Generate ONLY a SQL SELECT query.\n\
             No explanation, no markdown.\n\n\
             Schema:\n{schema_summary}\n\
             User question:\n{question}\n"
        )
    }

    pub async fn translate(&self, question: &str, schema_summary: &str) -> Result<String, AppError> {
        let prompt = self.build_prompt(question, schema_summary);

        let response = self
            .http_client
            .post(&self.endpoint_url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
            }))
            .send()
            .await
            .map_err(|e| {
                AppError::TranslationFailed(format!("failed to reach translation endpoint: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AppError::TranslationFailed(format!(
                "translation endpoint returned {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            AppError::TranslationFailed(format!("invalid translation response: {}", e))
        })?;

        payload["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                AppError::TranslationFailed(
                    "translation response has no 'response' text field".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, LoggingConfig, ServerConfig};

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            llm: LlmConfig {
                endpoint_url: "http://localhost:11434/api/generate".to_string(),
                model: "llama3".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn test_prompt_embeds_schema_and_question() {
        let translator = QueryTranslator::new(&test_config());
        let prompt = translator.build_prompt(
            "total fares per zone?",
            "Table fares: zone, price\n",
        );

        assert!(prompt.contains("Table fares: zone, price"));
        assert!(prompt.contains("total fares per zone?"));
        assert!(prompt.contains("ONLY a SQL SELECT query"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_translation_failed() {
        let mut config = test_config();
        // Nothing listens on port 1; connection is refused immediately
        config.llm.endpoint_url = "http://127.0.0.1:1/api/generate".to_string();

        let translator = QueryTranslator::new(&config);
        let err = translator.translate("anything", "Table t: a\n").await;
        assert!(matches!(err, Err(AppError::TranslationFailed(_))));
    }
}
