//! Language model collaborators.
//!
//! The pipelines only see the [`EmbeddingProvider`] and [`TextGenerator`]
//! traits; [`OllamaClient`] implements both over ollama's http api.

pub mod ollama;

pub use ollama::OllamaClient;

/// Turns text into an embedding vector.
pub trait EmbeddingProvider {
    /// Embed `text` with a single attempt.
    /// Returns `None` on any failure; the failure is logged by the provider.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;
}

/// Generates a completion for a prompt.
pub trait TextGenerator {
    /// Returns the raw model answer, or `None` on any failure.
    fn generate(&self, prompt: &str, system_prompt: Option<&str>, json_mode: bool)
        -> Option<String>;
}
