//! Concurrent dispatch of chunks to a translator
//!
//! Chunks are translated by spawned tasks, at most `workers` at a time. Every
//! task sends its outcome over a channel to the dispatching task, which is
//! the only owner of the merged map, the anomaly log and the progress
//! counter. Merging a chunk is therefore atomic with respect to other chunks
//! without any lock.
//!
//! Failed chunks are not retried. Their keys stay untranslated and are
//! reported, so that a later run in resume mode can fill the gap.

use crate::mt::chunking::Chunk;
use crate::mt::error::MtError;
use crate::mt::translator::{MachineTranslator, TranslatedPair};
use crate::tree::FlatMap;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Default number of concurrent translate calls
pub const DEFAULT_WORKERS: usize = 3;

/// Settings shared by every chunk of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Maximum number of in-flight translate calls
    pub workers: usize,
    pub target_language: String,
    pub model: String,
}

impl DispatchConfig {
    pub fn new(target_language: &str, model: &str) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            target_language: target_language.to_string(),
            model: model.to_string(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

/// Keys that did not reconcile cleanly while merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnomalyLog {
    /// Keys seen again after a value was already merged (the first value is kept)
    pub duplicates: BTreeSet<String>,
    /// Keys sent in a successful chunk that came back without a value
    pub missing: BTreeSet<String>,
    /// Keys returned for a chunk that did not contain them
    pub unexpected: BTreeSet<String>,
}

impl AnomalyLog {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// A chunk whose translate call failed; none of its results were merged
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    pub chunk_index: usize,
    pub keys: Vec<String>,
    pub error: MtError,
}

/// Progress snapshot, reported after each chunk is merged or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Final state of a dispatch run
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Seed translations plus every merged chunk result
    pub translated: FlatMap,
    pub anomalies: AnomalyLog,
    pub failures: Vec<ChunkFailure>,
    pub completed: usize,
    pub total: usize,
}

impl DispatchReport {
    /// True when no chunk failed and no key went missing
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.anomalies.missing.is_empty()
    }

    /// Keys left without a translation because their chunk failed
    pub fn failed_keys(&self) -> impl Iterator<Item = &String> {
        self.failures.iter().flat_map(|failure| failure.keys.iter())
    }
}

/// The merge target of a run, owned by the dispatching task
#[derive(Debug)]
pub struct MergeState {
    translated: FlatMap,
    anomalies: AnomalyLog,
    failures: Vec<ChunkFailure>,
    completed: usize,
    total: usize,
}

impl MergeState {
    /// Start from previously translated values (empty unless resuming)
    pub fn new(seed: FlatMap, total: usize) -> Self {
        Self {
            translated: seed,
            anomalies: AnomalyLog::default(),
            failures: Vec::new(),
            completed: 0,
            total,
        }
    }

    /// Merge one successful chunk result
    ///
    /// The first value merged for a key wins; later values are recorded as
    /// duplicates. Keys that `chunk` does not contain are recorded as
    /// unexpected and never merged. Keys of `chunk` absent from `pairs` are
    /// recorded as missing.
    pub fn merge(&mut self, chunk_index: usize, chunk: &Chunk, pairs: Vec<TranslatedPair>) {
        let mut answered = HashSet::with_capacity(pairs.len());

        for (key, value) in pairs {
            let requested = chunk.contains_key(&key);
            if !requested {
                warn!(chunk = chunk_index, key = %key, "unexpected key in translation result, dropped");
                self.anomalies.unexpected.insert(key.clone());
            }

            if self.translated.contains_key(&key) {
                warn!(chunk = chunk_index, key = %key, "duplicate key, keeping first value");
                self.anomalies.duplicates.insert(key.clone());
            } else if requested {
                self.translated.insert(key.clone(), value);
            }

            if requested {
                answered.insert(key);
            }
        }

        let mut missing: Vec<&String> = chunk.keys().filter(|k| !answered.contains(*k)).collect();
        missing.sort();
        for key in missing {
            warn!(
                chunk = chunk_index,
                key = %key,
                "missing value for key; consider a smaller chunk size and re-running"
            );
            self.anomalies.missing.insert(key.clone());
        }

        self.completed += 1;
    }

    /// Record a failed chunk; nothing from it is merged
    pub fn record_failure(&mut self, chunk_index: usize, mut keys: Vec<String>, error: MtError) {
        warn!(
            chunk = chunk_index,
            keys = keys.len(),
            error = %error,
            "chunk failed; translations will be incomplete, re-run to resume"
        );
        keys.sort();
        self.failures.push(ChunkFailure {
            chunk_index,
            keys,
            error,
        });
        self.completed += 1;
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.completed,
            total: self.total,
        }
    }

    pub fn finish(self) -> DispatchReport {
        DispatchReport {
            translated: self.translated,
            anomalies: self.anomalies,
            failures: self.failures,
            completed: self.completed,
            total: self.total,
        }
    }
}

/// Outcome of one chunk, sent from a worker task to the dispatcher
struct ChunkOutcome {
    index: usize,
    chunk: Chunk,
    result: Result<Vec<TranslatedPair>, MtError>,
}

type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// Drives chunks through a translator under a concurrency cap
pub struct Dispatcher {
    translator: Arc<dyn MachineTranslator>,
    config: DispatchConfig,
    on_progress: Option<ProgressFn>,
}

impl Dispatcher {
    pub fn new(translator: Arc<dyn MachineTranslator>, config: DispatchConfig) -> Self {
        Self {
            translator,
            config,
            on_progress: None,
        }
    }

    /// Call `f` after every chunk is merged or failed
    pub fn with_progress(mut self, f: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Translate every chunk and merge the results on top of `seed`
    ///
    /// Returns once every chunk has either merged or failed. Chunk failures
    /// and anomalies are collected in the report, never returned as errors.
    pub async fn dispatch(&self, chunks: Vec<Chunk>, seed: FlatMap) -> DispatchReport {
        let total = chunks.len();
        let mut state = MergeState::new(seed, total);
        let chunk_keys: Vec<Vec<String>> = chunks
            .iter()
            .map(|chunk| chunk.keys().cloned().collect())
            .collect();

        info!(
            chunks = total,
            workers = self.config.workers,
            provider = self.translator.provider_name(),
            language = %self.config.target_language,
            "dispatching translation"
        );
        self.report_progress(&state);

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<ChunkOutcome>();
        let mut tasks = JoinSet::new();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let translator = Arc::clone(&self.translator);
            let language = self.config.target_language.clone();
            let model = self.config.model.clone();

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                debug!(chunk = index, keys = chunk.len(), "translating chunk");
                let result = translator.translate(&chunk, &language, &model).await;
                // The receiver lives until every sender is gone
                let _ = tx.send(ChunkOutcome {
                    index,
                    chunk,
                    result,
                });
            });
        }
        drop(tx);

        let mut reported = vec![false; total];
        while let Some(outcome) = rx.recv().await {
            reported[outcome.index] = true;
            match outcome.result {
                Ok(pairs) => state.merge(outcome.index, &outcome.chunk, pairs),
                Err(err) => {
                    let keys = outcome.chunk.keys().cloned().collect();
                    state.record_failure(outcome.index, keys, err);
                }
            }
            self.report_progress(&state);
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "translation task aborted");
            }
        }

        // Chunks whose task died before reporting
        for (index, keys) in chunk_keys.into_iter().enumerate() {
            if !reported[index] {
                state.record_failure(
                    index,
                    keys,
                    MtError::Other("translation task aborted".to_string()),
                );
                self.report_progress(&state);
            }
        }

        let report = state.finish();
        info!(
            translated = report.translated.len(),
            failures = report.failures.len(),
            duplicates = report.anomalies.duplicates.len(),
            missing = report.anomalies.missing.len(),
            "dispatch finished"
        );
        report
    }

    fn report_progress(&self, state: &MergeState) {
        if let Some(f) = &self.on_progress {
            f(state.progress());
        }
    }
}
