use anyhow::Result;
use reqwest::{Client, Url};

use crate::clients::models::requests::GenerateContentRequest;
use crate::clients::models::responses::GenerateContentResponse;
use crate::config::Config;

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// `None` when no API key is configured; the coach is then unavailable.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(api_key) = config.gemini_api_key.clone() else {
            return Ok(None);
        };

        Ok(Some(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            base: Url::parse(&config.gemini_api_url)?,
            api_key,
            model: config.gemini_model.clone(),
        }))
    }

    fn generate_url(&self) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("/v1beta/models/{}:generateContent", self.model))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let url = self.generate_url()?;
        let request = GenerateContentRequest::json_prompt(prompt);

        let response = self.http.post(url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                body
            ));
        }

        let body = response.text().await?;
        let api_response: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("Failed to parse generateContent response: {}", e))?;

        match api_response.text() {
            Some(text) => Ok(text),
            None => {
                let finish_reason = api_response.finish_reason().unwrap_or("unknown");
                tracing::warn!(%finish_reason, "gemini.empty_reply");
                Err(anyhow::anyhow!(
                    "Model returned no text (finish reason: {})",
                    finish_reason
                ))
            }
        }
    }
}
