//! End-to-end translation of a localization file
//!
//! ```text
//! read → flatten → resume filter → partition → dispatch → unflatten → write
//! ```
//!
//! `.strings` output skips the unflatten step and is written from flat keys.
//!
//! Input problems (unreadable file, bad content, unsupported extension,
//! invalid options) abort the run before anything is sent. Chunk failures and
//! merge anomalies do not: the output is written with whatever was
//! translated, and the report says what is missing.

use crate::formats::{self, Format, FormatError};
use crate::mt::chunking::{DEFAULT_CHUNK_BUDGET, partition};
use crate::mt::dispatcher::{DispatchConfig, DispatchReport, Dispatcher, Progress};
use crate::mt::error::MtError;
use crate::mt::resume::{load_existing, resume};
use crate::mt::translator::{MachineTranslator, validate_language};
use crate::tree::{FlatMap, flatten};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Errors that stop a run before any output is written
#[derive(Debug)]
pub enum PipelineError {
    Format(FormatError),
    Mt(MtError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Format(err) => write!(f, "{}", err),
            PipelineError::Mt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Format(err) => Some(err),
            PipelineError::Mt(err) => Some(err),
        }
    }
}

impl From<FormatError> for PipelineError {
    fn from(err: FormatError) -> Self {
        PipelineError::Format(err)
    }
}

impl From<MtError> for PipelineError {
    fn from(err: MtError) -> Self {
        PipelineError::Mt(err)
    }
}

/// Everything needed to translate one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Chunk budget in bytes of key + value
    pub chunk_budget: usize,
    /// Retranslate every key, ignoring an existing output
    pub force: bool,
    pub dispatch: DispatchConfig,
}

impl TranslationJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, dispatch: DispatchConfig) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            chunk_budget: DEFAULT_CHUNK_BUDGET,
            force: false,
            dispatch,
        }
    }

    pub fn with_chunk_budget(mut self, chunk_budget: usize) -> Self {
        self.chunk_budget = chunk_budget;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn validate(&self) -> Result<(), MtError> {
        validate_language(&self.dispatch.target_language)?;
        if self.chunk_budget == 0 {
            return Err(MtError::ConfigError(
                "chunk size must be at least 1".to_string(),
            ));
        }
        if self.dispatch.workers == 0 {
            return Err(MtError::ConfigError(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.dispatch.model.trim().is_empty() {
            return Err(MtError::ConfigError("model cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output: PathBuf,
    /// Leaves in the source file
    pub source_keys: usize,
    /// Keys taken from the existing output instead of being translated
    pub resumed: usize,
    /// Chunks dispatched
    pub chunks: usize,
    pub dispatch: DispatchReport,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.dispatch.is_complete()
    }
}

/// Runs [`TranslationJob`]s against a translator
pub struct Pipeline {
    translator: Arc<dyn MachineTranslator>,
    on_progress: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

impl Pipeline {
    pub fn new(translator: Arc<dyn MachineTranslator>) -> Self {
        Self {
            translator,
            on_progress: None,
        }
    }

    /// Call `f` as chunks complete
    pub fn with_progress(mut self, f: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    pub async fn run(&self, job: &TranslationJob) -> Result<RunReport, PipelineError> {
        job.validate()?;

        let format = Format::from_path(&job.input)?;
        let tree = formats::read_as(&job.input, format)?;
        let flat = flatten(&tree, "");
        let source_keys = flat.len();
        info!(
            input = %job.input.display(),
            keys = source_keys,
            language = %job.dispatch.target_language,
            "loaded source"
        );

        let (pending, seed) = if job.force {
            (flat, FlatMap::new())
        } else {
            let existing = load_existing(&job.output, format)?;
            resume(flat, existing)
        };
        let resumed = seed.len();

        let chunks = partition(pending, job.chunk_budget);
        let chunk_count = chunks.len();

        let mut dispatcher = Dispatcher::new(Arc::clone(&self.translator), job.dispatch.clone());
        if let Some(f) = &self.on_progress {
            let f = Arc::clone(f);
            dispatcher = dispatcher.with_progress(move |p| f(p));
        }
        let report = dispatcher.dispatch(chunks, seed).await;

        formats::write_flat(&report.translated, &job.output, format)?;
        info!(output = %job.output.display(), keys = report.translated.len(), "saved result");

        Ok(RunReport {
            output: job.output.clone(),
            source_keys,
            resumed,
            chunks: chunk_count,
            dispatch: report,
        })
    }
}
