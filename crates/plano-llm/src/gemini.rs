use plano_core::error::{PlanoError, Result};
use reqwest::Client;
use serde_json::json;

use crate::provider::{EmbeddingProvider, LlmProvider};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini text-generation provider.
pub struct GeminiLlm {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiLlm {
    /// Create a new Gemini LLM provider.
    ///
    /// # Arguments
    /// * `api_key` - Google API key
    /// * `model` - Model identifier (e.g. "gemini-2.0-flash-exp")
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

impl LlmProvider for GeminiLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PlanoError::Llm {
                provider: "gemini".to_string(),
                message: format!("request failed: {e}"),
            })?;

        let status = response.status().as_u16();
        let response_text = response.text().await.map_err(|e| PlanoError::Llm {
            provider: "gemini".to_string(),
            message: format!("failed to read response body: {e}"),
        })?;

        if status < 200 || status >= 300 {
            return Err(PlanoError::Http {
                status,
                body: response_text,
            });
        }

        let parsed: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| PlanoError::Llm {
                provider: "gemini".to_string(),
                message: format!("failed to parse response JSON: {e}"),
            })?;

        let content = parsed["candidates"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|candidate| candidate["content"]["parts"].as_array())
            .and_then(|parts| parts.first())
            .and_then(|part| part["text"].as_str())
            .ok_or_else(|| PlanoError::Llm {
                provider: "gemini".to_string(),
                message: "missing candidates[0].content.parts[0].text in response".to_string(),
            })?
            .to_string();

        Ok(content)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Google Gemini embedding provider.
pub struct GeminiEmbedding {
    client: Client,
    api_key: String,
    model: String,
    dims: usize,
}

impl GeminiEmbedding {
    /// Create a new Gemini embedding provider.
    ///
    /// # Arguments
    /// * `api_key` - Google API key
    /// * `model` - Embedding model identifier (e.g. "text-embedding-004")
    /// * `dims` - Expected embedding dimensionality (e.g. 768)
    pub fn new(api_key: String, model: String, dims: usize) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            dims,
        }
    }
}

impl EmbeddingProvider for GeminiEmbedding {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let body = json!({
                "content": {
                    "parts": [{ "text": text }]
                },
                "outputDimensionality": self.dims
            });

            let response = self
                .client
                .post(&url)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| PlanoError::Embedding(format!("gemini request failed: {e}")))?;

            let status = response.status().as_u16();
            let response_text = response.text().await.map_err(|e| {
                PlanoError::Embedding(format!("gemini failed to read response body: {e}"))
            })?;

            if status < 200 || status >= 300 {
                return Err(PlanoError::Http {
                    status,
                    body: response_text,
                });
            }

            let parsed: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
                PlanoError::Embedding(format!("gemini failed to parse response JSON: {e}"))
            })?;

            let values = parsed["embedding"]["values"].as_array().ok_or_else(|| {
                PlanoError::Embedding("missing embedding.values in gemini response".to_string())
            })?;

            let embedding: Vec<f32> = values
                .iter()
                .map(|v| {
                    v.as_f64()
                        .ok_or_else(|| {
                            PlanoError::Embedding(
                                "non-numeric value in gemini embedding array".to_string(),
                            )
                        })
                        .map(|f| f as f32)
                })
                .collect::<Result<Vec<f32>>>()?;

            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
