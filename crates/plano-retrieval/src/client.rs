use plano_core::error::{PlanoError, Result};
use plano_core::types::DocumentMatch;
use reqwest::Client;
use serde_json::json;

/// Client for the vector-search document store.
///
/// The store exposes a PostgREST-style surface: a `match_documents` remote
/// procedure for similarity search and a `documents` table used here only as
/// a liveness probe target. Ranking and thresholding happen server-side;
/// this client just ships the query embedding and parses the matches.
pub struct RetrievalClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RetrievalClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Similarity-search stored documents against a query embedding.
    /// Returns matches above `threshold`, at most `count`, best first.
    pub async fn match_documents(
        &self,
        query_embedding: &[f32],
        threshold: f64,
        count: usize,
    ) -> Result<Vec<DocumentMatch>> {
        let url = format!("{}/rest/v1/rpc/match_documents", self.base_url);

        let body = json!({
            "query_embedding": query_embedding,
            "match_threshold": threshold,
            "match_count": count,
        });

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PlanoError::Retrieval(format!("match_documents request failed: {e}")))?;

        let status = response.status().as_u16();
        let response_text = response.text().await.map_err(|e| {
            PlanoError::Retrieval(format!("failed to read match_documents response: {e}"))
        })?;

        if status < 200 || status >= 300 {
            return Err(PlanoError::Http {
                status,
                body: response_text,
            });
        }

        let matches: Vec<DocumentMatch> = serde_json::from_str(&response_text).map_err(|e| {
            PlanoError::Retrieval(format!("failed to parse match_documents response: {e}"))
        })?;

        Ok(matches)
    }

    /// Minimal one-row read against the documents table. Used by the
    /// keep-alive job to confirm the store is reachable.
    pub async fn probe(&self) -> Result<()> {
        let url = format!("{}/rest/v1/documents?select=id&limit=1", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| PlanoError::Retrieval(format!("probe request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanoError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
