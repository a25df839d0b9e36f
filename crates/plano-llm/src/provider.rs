use plano_core::error::Result;

/// Trait for text-generation providers.
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a single prompt.
    fn generate(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Return the provider name (e.g. "gemini").
    fn name(&self) -> &str;
}

/// Trait for text embedding providers.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one or more text strings, returning a vector of embeddings.
    fn embed(
        &self,
        texts: &[&str],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;

    /// Return the provider name.
    fn name(&self) -> &str;
}
