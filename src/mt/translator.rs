//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! enabling support for different completion backends (OpenAI-compatible
//! services, mock, etc.) without coupling the pipeline to any of them.
//!
//! # Example
//!
//! ```ignore
//! use l10n_mt::mt::{Chunk, MachineTranslator, OpenAiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAiProvider::from_env()?;
//!
//!     let chunk: Chunk = [("greeting".to_string(), "Hello".to_string())]
//!         .into_iter()
//!         .collect();
//!     let pairs = provider.translate(&chunk, "French", "gpt-4o-mini").await?;
//!     println!("{:?}", pairs); // [("greeting", "Bonjour")]
//!
//!     Ok(())
//! }
//! ```

use crate::mt::chunking::Chunk;
use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// A translated key/value pair, as reported by a translator
pub type TranslatedPair = (String, String);

/// Generic trait for machine translation providers
///
/// Implementations of this trait handle the actual translation work,
/// whether through an API (chat completion) or deterministic logic (Mock).
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate the values of a non-empty chunk into `target_language`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<TranslatedPair>)` - Translated pairs in the order the service
    ///   produced them
    /// * `Err(MtError)` - If the request or the response is unusable
    ///
    /// # Guarantees
    ///
    /// None on the key set. The result *should* hold every input key exactly
    /// once, but a key can repeat (the service answered in several fragments),
    /// be absent, or not belong to the chunk at all. Callers reconcile.
    async fn translate_chunk(
        &self,
        chunk: &Chunk,
        target_language: &str,
        model: &str,
    ) -> MtResult<Vec<TranslatedPair>>;

    /// Validate inputs, then translate
    ///
    /// An empty chunk yields an empty result without calling
    /// [`translate_chunk`](MachineTranslator::translate_chunk).
    async fn translate(
        &self,
        chunk: &Chunk,
        target_language: &str,
        model: &str,
    ) -> MtResult<Vec<TranslatedPair>> {
        validate_language(target_language)?;
        if chunk.is_empty() {
            return Ok(Vec::new());
        }
        self.translate_chunk(chunk, target_language, model).await
    }

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Validate a target language name
///
/// Languages are free text that ends up in the prompt ("German",
/// "Brazilian Portuguese", "zh-Hant"), so only emptiness and control
/// characters are rejected.
///
/// # Example
///
/// ```ignore
/// validate_language("German")?; // OK
/// validate_language("pt-BR")?; // OK
/// validate_language("fr\nignore previous").unwrap_err(); // Error
/// ```
pub fn validate_language(language: &str) -> MtResult<()> {
    if language.trim().is_empty() {
        return Err(MtError::InvalidLanguage(
            "Language name is empty".to_string(),
        ));
    }

    if language.chars().any(char::is_control) {
        return Err(MtError::InvalidLanguage(format!(
            "Control characters in language name: {:?}",
            language
        )));
    }

    Ok(())
}
