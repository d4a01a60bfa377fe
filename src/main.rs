use l10n_mt::config::{self, RunConfig};
use l10n_mt::mt::openai::API_KEY_ENV;
use l10n_mt::mt::{MachineTranslator, MockMode, MockTranslator, OpenAiProvider, Pipeline};
use std::env;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = config::command().get_matches();
    let config = RunConfig::from_matches(&matches)?;

    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    println!("📄 File: {}", config.input.display());
    println!("🌍 Language: {}", config.language);
    println!("🤖 Model: {}", config.model);
    println!();

    let translator: Arc<dyn MachineTranslator> = if config.mock {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        if env::var(API_KEY_ENV).is_err() {
            eprintln!("❌ {} environment variable not set", API_KEY_ENV);
            eprintln!("   Set it with: export {}=your_api_key", API_KEY_ENV);
            eprintln!("   Or use --mock to use mock translator");
            return Err("Missing API key".into());
        }
        Arc::new(OpenAiProvider::from_env()?)
    };

    let pipeline = Pipeline::new(translator).with_progress(|progress| {
        eprint!("\rProgress: {}/{}\x1b[K", progress.completed, progress.total);
        let _ = std::io::stderr().flush();
    });

    let report = match pipeline.run(&config.job()).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            return Err(e.into());
        }
    };
    eprintln!();

    if report.resumed > 0 {
        println!("♻️  Resumed {} existing translations", report.resumed);
    }

    let dispatch = &report.dispatch;
    if !dispatch.anomalies.duplicates.is_empty() {
        println!("⚠️  Duplicate keys: {:?}", dispatch.anomalies.duplicates);
    }
    if !dispatch.anomalies.unexpected.is_empty() {
        println!("⚠️  Unexpected keys: {:?}", dispatch.anomalies.unexpected);
    }
    if !report.is_complete() {
        let untranslated = dispatch.failed_keys().count() + dispatch.anomalies.missing.len();
        eprintln!(
            "⚠️  Translation incomplete: {} of {} chunks failed, {} keys untranslated.",
            dispatch.failures.len(),
            dispatch.total,
            untranslated
        );
        eprintln!("   Re-run without --force to translate only the missing keys.");
    }

    println!("\n✅ Saved result in: {}", report.output.display());

    Ok(())
}
