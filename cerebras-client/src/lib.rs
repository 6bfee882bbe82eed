//! Async client for the Cerebras chat-completions endpoint.
//!
//! Exposes the [`TextCompletion`] trait consumed by the simulation pipeline,
//! the reqwest-backed [`CerebrasClient`], and a bounded retry decorator shared
//! by every pipeline stage that talks to the provider.

pub mod client;
pub mod error;
pub mod retry;

pub use client::{CerebrasClient, ClientConfig};
pub use error::{ClientError, Result};
pub use retry::{complete_with_retry, RetryPolicy};

use async_trait::async_trait;

/// A provider that turns one prompt into one free-form text response.
///
/// The simulation stages depend on this trait rather than on the concrete
/// client so tests can script responses and failures.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
