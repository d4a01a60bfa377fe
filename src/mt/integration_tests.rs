//! End-to-End Integration Tests for the translation pipeline
//!
//! These tests run whole files through the pipeline with the mock translator.
//! The last test talks to the real completion service and is ignored unless
//! requested.
//!
//! # Running Integration Tests
//!
//! ```bash
//! export OPENAI_API_KEY=...
//! cargo test --lib mt::integration_tests -- --ignored --nocapture
//! ```

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::formats;
    use crate::tree::{LocalizationTree, TreeNode};
    use serde_json::{Value, json};
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn job(input: &Path, output: &Path) -> TranslationJob {
        TranslationJob::new(input, output, DispatchConfig::new("German", "test-model"))
    }

    // ============================================================================
    // The canonical example: nested JSON, one chunk, uppercasing translator
    // ============================================================================

    #[tokio::test]
    async fn test_e2e_nested_json_uppercase() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(&input, r#"{"a":{"b":"Hello"},"c":"World"}"#).unwrap();

        let mock = MockTranslator::new(MockMode::Uppercase);
        let shared = mock.clone();
        let report = Pipeline::new(Arc::new(mock))
            .run(&job(&input, &output))
            .await
            .unwrap();

        assert_eq!(report.source_keys, 2);
        assert_eq!(report.chunks, 1);
        assert_eq!(report.resumed, 0);
        assert!(report.is_complete());
        assert_eq!(shared.calls(), vec![vec!["a.b".to_string(), "c".to_string()]]);
        assert_eq!(read_json(&output), json!({"a": {"b": "HELLO"}, "c": "WORLD"}));
    }

    // ============================================================================
    // Resume: keys in an existing output are never re-sent
    // ============================================================================

    #[tokio::test]
    async fn test_e2e_resume_skips_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(
            &input,
            r#"{"menu": {"open": "Open", "close": "Close"}, "title": "Editor"}"#,
        )
        .unwrap();
        std::fs::write(&output, r#"{"menu": {"open": "Öffnen"}}"#).unwrap();

        let mock = MockTranslator::new(MockMode::Uppercase);
        let shared = mock.clone();
        let report = Pipeline::new(Arc::new(mock))
            .run(&job(&input, &output))
            .await
            .unwrap();

        assert_eq!(report.resumed, 1);
        assert!(!shared.seen_keys().contains("menu.open"));
        assert_eq!(
            read_json(&output),
            json!({"menu": {"open": "Öffnen", "close": "CLOSE"}, "title": "EDITOR"})
        );
    }

    #[tokio::test]
    async fn test_e2e_force_retranslates_everything() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(&input, r#"{"open": "Open", "close": "Close"}"#).unwrap();
        std::fs::write(&output, r#"{"open": "Öffnen"}"#).unwrap();

        let mock = MockTranslator::new(MockMode::Uppercase);
        let shared = mock.clone();
        let report = Pipeline::new(Arc::new(mock))
            .run(&job(&input, &output).with_force(true))
            .await
            .unwrap();

        assert_eq!(report.resumed, 0);
        assert!(shared.seen_keys().contains("open"));
        assert_eq!(read_json(&output), json!({"open": "OPEN", "close": "CLOSE"}));
    }

    #[tokio::test]
    async fn test_e2e_everything_resumed_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(&input, r#"{"open": "Open"}"#).unwrap();
        std::fs::write(&output, r#"{"open": "Öffnen"}"#).unwrap();

        let mock = MockTranslator::new(MockMode::Error("must not be called".to_string()));
        let shared = mock.clone();
        let report = Pipeline::new(Arc::new(mock))
            .run(&job(&input, &output))
            .await
            .unwrap();

        assert!(report.is_complete());
        assert!(shared.calls().is_empty());
        assert_eq!(read_json(&output), json!({"open": "Öffnen"}));
    }

    // ============================================================================
    // Failure isolation and recovery through resume
    // ============================================================================

    #[tokio::test]
    async fn test_e2e_failed_chunk_then_resume_fills_gap() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(&input, r#"{"alpha": "aaaaaaaa", "beta": "bbbbbbbb"}"#).unwrap();

        // A budget of 13 puts each pair in its own chunk
        let first = MockTranslator::new(MockMode::Uppercase).fail_on_key("alpha");
        let report = Pipeline::new(Arc::new(first))
            .run(&job(&input, &output).with_chunk_budget(13))
            .await
            .unwrap();

        assert_eq!(report.chunks, 2);
        assert!(!report.is_complete());
        assert_eq!(report.dispatch.failures.len(), 1);
        assert_eq!(report.dispatch.failures[0].keys, vec!["alpha".to_string()]);
        assert_eq!(read_json(&output), json!({"beta": "BBBBBBBB"}));

        let second = MockTranslator::new(MockMode::Uppercase);
        let shared = second.clone();
        let report = Pipeline::new(Arc::new(second))
            .run(&job(&input, &output).with_chunk_budget(13))
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.resumed, 1);
        assert_eq!(shared.seen_keys().len(), 1);
        assert_eq!(
            read_json(&output),
            json!({"alpha": "AAAAAAAA", "beta": "BBBBBBBB"})
        );
    }

    #[tokio::test]
    async fn test_e2e_many_chunks_with_progress() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");

        let mut sections = serde_json::Map::new();
        for s in 0..5 {
            let mut section = serde_json::Map::new();
            for k in 0..10 {
                section.insert(format!("key{}", k), json!(format!("Message {} of section {}", k, s)));
            }
            sections.insert(format!("section{}", s), Value::Object(section));
        }
        std::fs::write(&input, Value::Object(sections).to_string()).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mock = MockTranslator::with_delay(MockMode::Suffix, 5);
        let report = Pipeline::new(Arc::new(mock))
            .with_progress(move |p: Progress| sink.lock().unwrap().push(p.completed))
            .run(&job(&input, &output).with_chunk_budget(80))
            .await
            .unwrap();

        assert_eq!(report.source_keys, 50);
        assert!(report.chunks > 1);
        assert!(report.is_complete());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().copied(), Some(report.chunks));
        assert!(seen.windows(2).all(|w| w[1] == w[0] + 1));

        let written = read_json(&output);
        assert_eq!(
            written["section3"]["key7"],
            "Message 7 of section 3_German"
        );
    }

    // ============================================================================
    // Other formats
    // ============================================================================

    #[tokio::test]
    async fn test_e2e_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.yml");
        let output = dir.path().join("fr.yml");
        std::fs::write(&input, "home:\n  greeting: Hello\n  count: 3\nfooter: Bye\n").unwrap();

        let report = Pipeline::new(Arc::new(MockTranslator::new(MockMode::Suffix)))
            .run(&job(&input, &output))
            .await
            .unwrap();
        assert!(report.is_complete());

        let tree = formats::read(&output).unwrap();
        let mut home = LocalizationTree::new();
        home.insert("greeting".to_string(), TreeNode::leaf("Hello_German"));
        home.insert("count".to_string(), TreeNode::leaf("3_German"));
        let mut expected = LocalizationTree::new();
        expected.insert("home".to_string(), home.into());
        expected.insert("footer".to_string(), TreeNode::leaf("Bye_German"));
        assert_eq!(tree, expected);
    }

    #[tokio::test]
    async fn test_e2e_strings() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Localizable.strings");
        let output = dir.path().join("de.lproj").join("Localizable.strings");
        std::fs::write(
            &input,
            "/* Settings */\n\"settings.title\" = \"Settings\";\n\"ok\" = \"OK\";\n",
        )
        .unwrap();

        let report = Pipeline::new(Arc::new(MockTranslator::new(MockMode::Uppercase)))
            .run(&job(&input, &output))
            .await
            .unwrap();
        assert!(report.is_complete());

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "\"ok\" = \"OK\";\n\"settings.title\" = \"SETTINGS\";\n"
        );
    }

    #[tokio::test]
    async fn test_e2e_strings_prefix_keys_survive_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.strings");
        let output = dir.path().join("de.strings");
        std::fs::write(
            &input,
            "\"button\" = \"Button\";\n\"button.title\" = \"Title\";\n",
        )
        .unwrap();

        let report = Pipeline::new(Arc::new(MockTranslator::new(MockMode::Uppercase)))
            .run(&job(&input, &output))
            .await
            .unwrap();
        assert!(report.is_complete());

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "\"button\" = \"BUTTON\";\n\"button.title\" = \"TITLE\";\n"
        );

        // Both keys are already present, so nothing is sent again
        let mock = MockTranslator::new(MockMode::Error("must not be called".to_string()));
        let shared = mock.clone();
        let report = Pipeline::new(Arc::new(mock))
            .run(&job(&input, &output))
            .await
            .unwrap();
        assert_eq!(report.resumed, 2);
        assert!(shared.seen_keys().is_empty());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), written);
    }

    #[tokio::test]
    async fn test_e2e_invented_keys_stay_out_of_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(&input, r#"{"a":"x"}"#).unwrap();

        let mock = MockTranslator::new(MockMode::Uppercase).extra_pair("invented", "X");
        let report = Pipeline::new(Arc::new(mock))
            .run(&job(&input, &output))
            .await
            .unwrap();

        assert!(report.dispatch.anomalies.unexpected.contains("invented"));
        assert_eq!(read_json(&output), json!({"a": "X"}));
    }

    #[tokio::test]
    async fn test_e2e_malformed_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("de.json");
        std::fs::write(&input, "{ broken").unwrap();

        let result = Pipeline::new(Arc::new(MockTranslator::new(MockMode::NoOp)))
            .run(&job(&input, &output))
            .await;

        assert!(matches!(result, Err(PipelineError::Format(_))));
        assert!(!output.exists());
    }

    // ============================================================================
    // Real service
    // ============================================================================

    #[tokio::test]
    #[ignore]
    async fn test_e2e_real_api() {
        if std::env::var(openai::API_KEY_ENV).is_err() {
            eprintln!("⚠️  Skipping: OPENAI_API_KEY not set");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("en.json");
        let output = dir.path().join("fr.json");
        std::fs::write(
            &input,
            r#"{"menu": {"open": "Open file", "save": "Save changes"}, "quit": "Quit"}"#,
        )
        .unwrap();

        let provider = OpenAiProvider::from_env().unwrap();
        let job = TranslationJob::new(
            &input,
            &output,
            DispatchConfig::new("French", "gpt-4o-mini"),
        );
        let report = Pipeline::new(Arc::new(provider)).run(&job).await.unwrap();

        println!("📦 Report: {:?}", report.dispatch.anomalies);
        println!("{}", std::fs::read_to_string(&output).unwrap());
        assert!(report.dispatch.failures.is_empty());
    }
}
