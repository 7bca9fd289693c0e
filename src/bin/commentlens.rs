use clap::{Parser, ValueEnum};
use color_eyre::Result;
use commentlens::config::Config;
use commentlens::providers::{HuggingFaceTransport, InferenceClient};
use commentlens::{ExportService, PipelineError, Scope, SentimentService, Session, SummaryService, ThemeService};
use std::path::PathBuf;
use tracing::{error, info};

/// Theme search, sentiment classification and summarization of a comment file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comment file to load (.csv, .tsv or .xlsx) with a 'Comment' column
    #[arg(long = "input", short = 'i', value_name = "PATH")]
    input: Option<PathBuf>,
    /// Theme label shown in the theme search report
    #[arg(long = "theme", default_value = "Theme")]
    theme: String,
    /// Comma-separated keywords; runs a theme search when given
    #[arg(long = "keywords", short = 'k', value_name = "LIST")]
    keywords: Option<String>,
    /// Classify sentiment for the given scope
    #[arg(long = "classify", value_enum)]
    classify: Option<ScopeArg>,
    /// Summarize comments for the given scope
    #[arg(long = "summarize", value_enum)]
    summarize: Option<ScopeArg>,
    /// Export results for the given scope (requires --output)
    #[arg(long = "export", value_enum, requires = "output")]
    export: Option<ScopeArg>,
    /// Destination workbook for --export
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ScopeArg { All, Theme, Both }

impl ScopeArg {
    fn scopes(self) -> Vec<Scope> {
        match self {
            ScopeArg::All => vec![Scope::AllComments],
            ScopeArg::Theme => vec![Scope::ThemeMatched],
            ScopeArg::Both => Scope::ALL.to_vec(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn)  => Some(tracing::Level::WARN),
        Some(LogLevel::Info)  => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => None,
    };
    commentlens::logging::init_with(None, level)?;

    let config = Config::from_path(args.config.as_ref())?;

    if let Err(e) = run(&args, &config) {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args, config: &Config) -> Result<(), PipelineError> {
    let mut session = Session::new();
    let rows = session.load(args.input.as_deref())?;
    if let Some(input) = &args.input {
        println!("Loaded {rows} comments from {}", input.display());
    }

    if let Some(keywords) = &args.keywords {
        let report = ThemeService::apply(&mut session, &args.theme, keywords)?;
        println!("{}", report.message());
    }

    if args.classify.is_some() || args.summarize.is_some() {
        let transport = HuggingFaceTransport::from_env(&config.inference)?;
        let client = InferenceClient::new(transport, config.inference.clone());

        for scope in args.classify.map(ScopeArg::scopes).unwrap_or_default() {
            let report = SentimentService::classify(&mut session, &client, scope)?;
            println!("[{scope}] {}", report.message());
        }
        for scope in args.summarize.map(ScopeArg::scopes).unwrap_or_default() {
            let report = SummaryService::summarize(&mut session, &client, scope)?;
            println!("[{scope}] {}", report.message());
        }
    }

    if let (Some(export), Some(output)) = (args.export, &args.output) {
        let report = ExportService::export_scopes(&session, &export.scopes(), output)?;
        info!("{}", report.message());
        println!("{}", report.message());
    }

    Ok(())
}
