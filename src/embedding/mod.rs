//! Embedding provider abstraction.
//!
//! The engine only needs `text → vector`. Async providers (remote APIs)
//! implement [`Embedder`] directly; CPU-bound local models implement
//! [`EmbeddingModel`] and are wrapped in [`OffloadedEmbedder`] so they run
//! on the blocking pool instead of stalling the runtime.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result};

/// Turns text into an embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync + 'static {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// A synchronous embedding model.
pub trait EmbeddingModel: Send + Sync + 'static {
    fn embed_blocking(&self, text: &str) -> Result<Vec<f32>>;
}

/// Runs an [`EmbeddingModel`] on `tokio::task::spawn_blocking`.
pub struct OffloadedEmbedder<M: EmbeddingModel> {
    model: Arc<M>,
}

impl<M: EmbeddingModel> OffloadedEmbedder<M> {
    pub fn new(model: M) -> Self {
        Self { model: Arc::new(model) }
    }

    pub fn from_arc(model: Arc<M>) -> Self {
        Self { model }
    }
}

impl<M: EmbeddingModel> Clone for OffloadedEmbedder<M> {
    fn clone(&self) -> Self {
        Self { model: Arc::clone(&self.model) }
    }
}

#[async_trait]
impl<M: EmbeddingModel> Embedder for OffloadedEmbedder<M> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = Arc::clone(&self.model);
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || model.embed_blocking(&text))
            .await
            .map_err(|e| Error::Embedding(format!("Embedding task failed: {e}")))?
    }
}
