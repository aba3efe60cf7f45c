use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use docdiff_diff::{
    Comparator, CompareError, Comparison, LexicalComparator, SemanticComparator, SemanticOptions,
    compare_sources, format_summary_report,
};
use docdiff_oracle::{ChatCompletionsOracle, DEFAULT_ENDPOINT, OracleConfig};
use docdiff_text::{DEFAULT_MAX_CHUNK_TOKENS, NormalizeOptions, extract_text};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "doc-diff")]
#[command(about = "Compare two document versions and print their differences")]
struct Cli {
    file_a: PathBuf,
    file_b: PathBuf,

    #[arg(long, value_enum, default_value_t = CliMode::Lexical)]
    mode: CliMode,

    /// Print the full comparison as JSON.
    #[arg(long, conflicts_with = "report")]
    json: bool,

    /// Print a Markdown summary instead of markup.
    #[arg(long)]
    report: bool,

    #[arg(long)]
    ignore_case: bool,

    #[arg(long)]
    ignore_punctuation: bool,

    /// Join words hyphenated across line breaks.
    #[arg(long)]
    de_hyphenate: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_TOKENS)]
    max_chunk_tokens: usize,

    #[arg(long, default_value = docdiff_diff::DEFAULT_MODEL_ID)]
    model: String,

    #[arg(long, env = "DOCDIFF_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "DOCDIFF_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Pause between classification requests, in milliseconds.
    #[arg(long, default_value_t = docdiff_diff::DEFAULT_CALL_DELAY_MS)]
    call_delay_ms: u64,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Lexical,
    Semantic,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let comparator: Box<dyn Comparator> = match cli.mode {
        CliMode::Lexical => Box::new(LexicalComparator::new(NormalizeOptions {
            ignore_case: cli.ignore_case,
            ignore_punctuation: cli.ignore_punctuation,
            de_hyphenate: cli.de_hyphenate,
        })),
        CliMode::Semantic => match semantic_comparator(&cli) {
            Ok(comparator) => Box::new(comparator),
            Err(failure) => return failure,
        },
    };

    info!(
        file_a = %cli.file_a.display(),
        file_b = %cli.file_b.display(),
        mode = ?comparator.mode(),
        "comparing documents"
    );
    let result = compare_sources(
        comparator.as_ref(),
        extract_text(&cli.file_a),
        extract_text(&cli.file_b),
    );

    match result.and_then(|comparison| render(&cli, &comparison)) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => fail(err.kind().as_str(), err),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn semantic_comparator(cli: &Cli) -> Result<SemanticComparator<ChatCompletionsOracle>, ExitCode> {
    let api_key = match cli.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            return Err(fail(
                "oracle",
                "semantic mode needs an API key (--api-key or DOCDIFF_API_KEY)",
            ));
        }
    };

    let oracle = ChatCompletionsOracle::new(OracleConfig {
        endpoint: cli.endpoint.clone(),
        api_key,
        model_id: cli.model.clone(),
        ..OracleConfig::default()
    })
    .map_err(|err| fail("oracle", err))?;

    let options = SemanticOptions {
        max_chunk_tokens: cli.max_chunk_tokens,
        model_id: cli.model.clone(),
        call_delay_ms: cli.call_delay_ms,
    };
    SemanticComparator::new(options, oracle).map_err(|err| fail(err.kind().as_str(), err))
}

fn render(cli: &Cli, comparison: &Comparison) -> Result<String, CompareError> {
    if cli.json {
        return serde_json::to_string_pretty(comparison)
            .map_err(|err| CompareError::Rendering(err.to_string()));
    }
    if cli.report {
        return Ok(format_summary_report(
            comparison,
            &cli.file_a.display().to_string(),
            &cli.file_b.display().to_string(),
        ));
    }
    if comparison.is_identical {
        return Ok("No differences found.".to_string());
    }
    Ok(comparison.markup.clone())
}

fn fail(kind: &str, message: impl Display) -> ExitCode {
    eprintln!("error [{kind}]: {message}");
    ExitCode::FAILURE
}
