//! Command-line configuration
//!
//! Options come from flags; the API credential comes from the environment
//! (see [`crate::mt::openai::API_KEY_ENV`]) and is read by the provider, not
//! stored here.

use crate::mt::chunking::DEFAULT_CHUNK_BUDGET;
use crate::mt::dispatcher::{DEFAULT_WORKERS, DispatchConfig};
use crate::mt::error::{MtError, MtResult};
use crate::mt::pipeline::TranslationJob;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::{Path, PathBuf};

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Validated settings for one run of the binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub language: String,
    pub model: String,
    pub chunk_size: usize,
    pub workers: usize,
    pub force: bool,
    pub mock: bool,
    pub verbose: bool,
}

/// Build the command-line interface
pub fn command() -> Command {
    Command::new("l10n-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate JSON, YAML and .strings localization files with a chat-completion model")
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("Path to the *.json, *.yaml/*.yml or *.strings file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Target language (e.g. German, pt-BR)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output path (default: output-<lang>.<input extension>)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .short('m')
                .help("Completion model identifier")
                .default_value(DEFAULT_MODEL),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .short('c')
                .alias("chunksize")
                .help("Maximum bytes of key + value per request")
                .value_parser(value_parser!(usize))
                .default_value("500"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('w')
                .help("Number of concurrent requests")
                .value_parser(value_parser!(usize))
                .default_value("3"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Retranslate every key instead of resuming from an existing output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use the mock translator instead of the completion service")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show per-chunk details")
                .action(ArgAction::SetTrue),
        )
}

/// `output-<lang>.<ext>`, using the input file's extension
pub fn default_output_path(input: &Path, language: &str) -> PathBuf {
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json");
    PathBuf::from(format!("output-{}.{}", language, ext))
}

impl RunConfig {
    /// Build and validate a config from parsed arguments
    pub fn from_matches(matches: &ArgMatches) -> MtResult<Self> {
        let input = matches
            .get_one::<PathBuf>("file")
            .cloned()
            .ok_or_else(|| MtError::ConfigError("--file is required".to_string()))?;
        let language = matches
            .get_one::<String>("lang")
            .map(|s| s.trim().to_string())
            .ok_or_else(|| MtError::ConfigError("--lang is required".to_string()))?;
        crate::mt::translator::validate_language(&language)?;

        let output = matches
            .get_one::<PathBuf>("output")
            .cloned()
            .unwrap_or_else(|| default_output_path(&input, &language));
        let model = matches
            .get_one::<String>("model")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let chunk_size = matches
            .get_one::<usize>("chunk-size")
            .copied()
            .unwrap_or(DEFAULT_CHUNK_BUDGET);
        let workers = matches
            .get_one::<usize>("workers")
            .copied()
            .unwrap_or(DEFAULT_WORKERS);

        if chunk_size == 0 {
            return Err(MtError::ConfigError(
                "--chunk-size must be at least 1".to_string(),
            ));
        }
        if workers == 0 {
            return Err(MtError::ConfigError(
                "--workers must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            input,
            output,
            language,
            model,
            chunk_size,
            workers,
            force: matches.get_flag("force"),
            mock: matches.get_flag("mock"),
            verbose: matches.get_flag("verbose"),
        })
    }

    /// Parse and validate an argument list (first item is the program name)
    pub fn try_parse_from<I, T>(args: I) -> MtResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command()
            .try_get_matches_from(args)
            .map_err(|e| MtError::ConfigError(e.to_string()))?;
        Self::from_matches(&matches)
    }

    pub fn job(&self) -> TranslationJob {
        let dispatch = DispatchConfig::new(&self.language, &self.model).with_workers(self.workers);
        TranslationJob::new(&self.input, &self.output, dispatch)
            .with_chunk_budget(self.chunk_size)
            .with_force(self.force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::try_parse_from(["l10n-mt", "-f", "en.json", "-l", "German"]).unwrap();
        assert_eq!(config.input, PathBuf::from("en.json"));
        assert_eq!(config.output, PathBuf::from("output-German.json"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.workers, 3);
        assert!(!config.force);
        assert!(!config.mock);
    }

    #[test]
    fn test_all_flags() {
        let config = RunConfig::try_parse_from([
            "l10n-mt",
            "--file",
            "locales/en.yml",
            "--lang",
            "pt-BR",
            "--output",
            "locales/pt.yml",
            "--model",
            "gpt-4o",
            "--chunksize",
            "200",
            "--workers",
            "5",
            "--force",
            "--mock",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.output, PathBuf::from("locales/pt.yml"));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.workers, 5);
        assert!(config.force && config.mock && config.verbose);
    }

    #[test]
    fn test_default_output_keeps_input_extension() {
        assert_eq!(
            default_output_path(Path::new("Localizable.strings"), "fr"),
            PathBuf::from("output-fr.strings")
        );
        assert_eq!(
            default_output_path(Path::new("en.yml"), "fr"),
            PathBuf::from("output-fr.yml")
        );
    }

    #[test]
    fn test_missing_required_flags() {
        assert!(RunConfig::try_parse_from(["l10n-mt", "-l", "German"]).is_err());
        assert!(RunConfig::try_parse_from(["l10n-mt", "-f", "en.json"]).is_err());
    }

    #[test]
    fn test_rejects_zero_values() {
        let zero_chunk =
            RunConfig::try_parse_from(["l10n-mt", "-f", "en.json", "-l", "de", "-c", "0"]);
        assert!(matches!(zero_chunk, Err(MtError::ConfigError(_))));

        let zero_workers =
            RunConfig::try_parse_from(["l10n-mt", "-f", "en.json", "-l", "de", "-w", "0"]);
        assert!(matches!(zero_workers, Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_blank_language() {
        let result = RunConfig::try_parse_from(["l10n-mt", "-f", "en.json", "-l", "  "]);
        assert!(matches!(result, Err(MtError::InvalidLanguage(_))));
    }

    #[test]
    fn test_job_carries_settings() {
        let config = RunConfig::try_parse_from([
            "l10n-mt", "-f", "en.json", "-l", "German", "-c", "64", "-w", "2", "--force",
        ])
        .unwrap();
        let job = config.job();
        assert_eq!(job.chunk_budget, 64);
        assert!(job.force);
        assert_eq!(job.dispatch.workers, 2);
        assert_eq!(job.dispatch.target_language, "German");
        assert_eq!(job.output, PathBuf::from("output-German.json"));
    }
}
