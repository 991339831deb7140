use async_trait::async_trait;
use heron_core::BackendError;
use serde_json::json;
use tracing::debug;

use crate::provider::GenerationBackend;

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
            model,
            temperature,
            max_tokens,
        }
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(prompt: &str, temperature: f32, max_tokens: u32) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
            },
        })
    }
}

#[async_trait]
impl GenerationBackend for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key,
        );

        let body = Self::build_request_body(prompt, self.temperature, self.max_tokens);

        debug!("Gemini request to model={}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status, body));
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                BackendError::Transient(
                    "missing candidates[0].content.parts[0].text in response".into(),
                )
            })?
            .to_string();

        Ok(content)
    }

    fn ready(&self) -> Result<(), BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::Auth("GOOGLE_API_KEY not configured".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_structure() {
        let body = GeminiProvider::build_request_body("Answer this.", 0.2, 1024);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Answer this.");

        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6, "temperature should be ~0.2, got {temp}");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn ready_requires_api_key() {
        let ok = GeminiProvider::new("key".into(), "gemini-2.5-flash".into(), 0.2, 1024);
        assert!(ok.ready().is_ok());

        let missing = GeminiProvider::new(String::new(), "gemini-2.5-flash".into(), 0.2, 1024);
        assert!(matches!(missing.ready(), Err(BackendError::Auth(_))));
    }
}
