//! lazy-git - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lazy_git::{Config, GitCli, Overrides, Provider, Suggester, build_backend};

/// Suggest commit messages and branch names from your git changes.
#[derive(Parser, Debug)]
#[command(name = "lazy-git")]
#[command(about = "Suggest commit messages and branch names from your git changes using AI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Run git in this directory (overrides GIT_WORK_DIR)
    #[arg(short = 'C', long, global = true)]
    work_dir: Option<PathBuf>,

    /// Model identifier (overrides AI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Backend provider (overrides AI_PROVIDER)
    #[arg(long, value_enum, global = true)]
    provider: Option<ProviderArg>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Generate a git commit message based on your staged changes
    Commit,
    /// Generate a git branch name based on your code changes
    Branch,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderArg {
    Openai,
    ClaudeCli,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => Provider::OpenAi,
            ProviderArg::ClaudeCli => Provider::ClaudeCli,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(suggestion) => {
            println!("{}", first_line(&suggestion));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout only ever carries the suggestion.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "lazy_git=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<String> {
    let overrides = Overrides {
        provider: cli.provider.map(Provider::from),
        model: cli.model,
        work_dir: cli.work_dir,
    };

    let config = Config::load(overrides).context("Failed to load configuration")?;
    debug!(provider = config.provider.id(), ?config, "configuration loaded");

    let backend = build_backend(config.provider, &config.backend_config())
        .context("Failed to initialize AI provider")?;
    let git = GitCli::new(config.work_dir.clone(), config.timeout);
    let suggester = Suggester::new(Box::new(git), backend);

    dispatch(cli.command, &suggester).await
}

async fn dispatch(command: Command, suggester: &Suggester) -> Result<String> {
    let suggestion = match command {
        Command::Commit => suggester.commit_message().await?,
        Command::Branch => suggester.branch_name().await?,
    };
    Ok(suggestion)
}

/// First non-empty line of the model output, trimmed.
fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Join the error chain, skipping causes their parent already spelled out.
fn render_error(err: &anyhow::Error) -> String {
    let mut out = String::new();
    for cause in err.chain() {
        let msg = cause.to_string();
        if out.contains(&msg) {
            continue;
        }
        if !out.is_empty() {
            out.push_str(": ");
        }
        out.push_str(&msg);
    }
    out
}
