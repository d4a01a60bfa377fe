/// Machine Translation Module
///
/// This module translates the flat key space of a localization file with a
/// chat-completion model. The key space is split into size-bounded chunks,
/// the chunks are translated concurrently, and the results are merged into a
/// single map while duplicate and missing keys are recorded.
///
/// # Overview
///
/// 1. **Chunking** - Groups flat key/value pairs into batches under a byte budget
/// 2. **MT Trait & Providers** - Generic trait for translators with an
///    OpenAI-compatible implementation and a mock
/// 3. **Dispatcher** - Runs chunks through a translator under a concurrency cap
///    and merges results
/// 4. **Resume** - Skips keys already present in a previous output
/// 5. **Pipeline** - Orchestrates the full file-to-file run
///
/// # Example
///
/// ```ignore
/// use l10n_mt::mt::{DispatchConfig, OpenAiProvider, Pipeline, TranslationJob};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = OpenAiProvider::from_env()?;
///     let job = TranslationJob::new(
///         "en.json",
///         "de.json",
///         DispatchConfig::new("German", "gpt-4o-mini"),
///     );
///     let report = Pipeline::new(Arc::new(provider)).run(&job).await?;
///     println!("{} keys translated", report.dispatch.translated.len());
///     Ok(())
/// }
/// ```
pub mod chunking;
pub mod dispatcher;
pub mod error;
pub mod mock;
pub mod openai;
pub mod pipeline;
pub mod resume;
pub mod translator;

// Integration tests (only available during testing)
#[cfg(test)]
mod integration_tests;

pub use chunking::{Chunk, DEFAULT_CHUNK_BUDGET, partition};
pub use dispatcher::{
    AnomalyLog, ChunkFailure, DEFAULT_WORKERS, DispatchConfig, DispatchReport, Dispatcher,
    MergeState, Progress,
};
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockTranslator};
pub use openai::OpenAiProvider;
pub use pipeline::{Pipeline, PipelineError, RunReport, TranslationJob};
pub use resume::{load_existing, resume};
pub use translator::{MachineTranslator, TranslatedPair, validate_language};
