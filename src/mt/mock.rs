//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the pipeline without requiring API keys or network access. Besides plain
//! value transformations it can simulate the ways a real completion service
//! misbehaves: failed requests, dropped keys, keys answered twice, keys that
//! were never asked for, and slow responses.
//!
//! # Example
//!
//! ```ignore
//! use l10n_mt::mt::{Chunk, MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let chunk: Chunk = [("k".to_string(), "hello".to_string())].into_iter().collect();
//!     let result = mock.translate(&chunk, "fr", "mock").await.unwrap();
//!     assert_eq!(result, vec![("k".to_string(), "hello_fr".to_string())]);
//! }
//! ```

use crate::mt::chunking::Chunk;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, TranslatedPair};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append language suffix: "hello" → "hello_fr"
    Suffix,

    /// Uppercase every value: "hello" → "HELLO"
    Uppercase,

    /// Use predefined mappings for realistic translations
    /// (text, target_language) → translation, falling back to Suffix
    Mappings(HashMap<(String, String), String>),

    /// Fail every request
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Useful for testing the pipeline without external API dependencies.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated network delay for every request (in milliseconds)
    delay_ms: u64,
    /// Extra delay for any chunk containing the key
    key_delays: HashMap<String, u64>,
    /// Requests containing one of these keys fail
    failing_keys: HashSet<String>,
    /// Keys left out of the response
    dropped_keys: HashSet<String>,
    /// Keys answered a second time with the given value
    repeated_keys: HashMap<String, String>,
    /// Pairs appended to every response
    extra_pairs: Vec<TranslatedPair>,
    /// Keys of every chunk received, in call order
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::new(MockMode::Uppercase);
    /// ```
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            key_delays: HashMap::new(),
            failing_keys: HashSet::new(),
            dropped_keys: HashSet::new(),
            repeated_keys: HashMap::new(),
            extra_pairs: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each request will have ~50ms delay
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Delay any request whose chunk contains `key` by an extra `delay_ms`
    pub fn delay_key(mut self, key: &str, delay_ms: u64) -> Self {
        self.key_delays.insert(key.to_string(), delay_ms);
        self
    }

    /// Fail any request whose chunk contains `key`
    pub fn fail_on_key(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Leave `key` out of responses
    pub fn drop_key(mut self, key: &str) -> Self {
        self.dropped_keys.insert(key.to_string());
        self
    }

    /// Answer `key` a second time, with `value`, after its regular translation
    pub fn repeat_key(mut self, key: &str, value: &str) -> Self {
        self.repeated_keys.insert(key.to_string(), value.to_string());
        self
    }

    /// Append a pair to every response, whether or not it was asked for
    pub fn extra_pair(mut self, key: &str, value: &str) -> Self {
        self.extra_pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Keys of every chunk this translator was asked to translate
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every key sent to this translator, across all calls
    pub fn seen_keys(&self) -> HashSet<String> {
        self.calls().into_iter().flatten().collect()
    }

    /// Internal helper to apply the simulated delays
    async fn apply_delay(&self, chunk: &Chunk) {
        let extra: u64 = chunk
            .keys()
            .filter_map(|key| self.key_delays.get(key))
            .sum();
        let total = self.delay_ms + extra;
        if total > 0 {
            tokio::time::sleep(Duration::from_millis(total)).await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Uppercase => Ok(text.to_uppercase()),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate_chunk(
        &self,
        chunk: &Chunk,
        target_language: &str,
        _model: &str,
    ) -> MtResult<Vec<TranslatedPair>> {
        // Sorted so that responses are reproducible
        let mut keys: Vec<&String> = chunk.keys().collect();
        keys.sort();

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(keys.iter().map(|k| k.to_string()).collect());
        }

        self.apply_delay(chunk).await;

        if let Some(key) = keys.iter().find(|k| self.failing_keys.contains(k.as_str())) {
            return Err(MtError::TranslationError(format!(
                "simulated failure for chunk containing '{}'",
                key
            )));
        }

        let mut pairs = Vec::with_capacity(chunk.len());
        for key in keys {
            if self.dropped_keys.contains(key) {
                continue;
            }
            let value = &chunk.entries()[key];
            pairs.push((key.clone(), self.apply_translation(value, target_language)?));
        }

        // Repeats arrive as a later response fragment
        let mut repeats: Vec<TranslatedPair> = self
            .repeated_keys
            .iter()
            .filter(|(key, _)| chunk.contains_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        repeats.sort();
        pairs.extend(repeats);
        pairs.extend(self.extra_pairs.iter().cloned());

        Ok(pairs)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
