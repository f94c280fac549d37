//! # Agent Twin CLI
//!
//! Ask your digital twin one question and print its answer.
//!
//! Usage:
//!   twin [QUESTION]...
//!   twin --profile me.json "Where did I grow up?"
//!   twin --model anthropic/claude-3-5-haiku-latest "What do I do on weekends?"
//!
//! Credentials and defaults come from the environment (a `.env` file in the
//! working directory is loaded first). Logs go to stderr; `RUST_LOG`
//! overrides `-v`/`-q`.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use twin_agent::{write_answer, write_header, AgentProfile, AgentTwin, Invoker, TaskTemplate, DEFAULT_QUESTION};
use twin_error::{Error, Result};
use twin_llm::config::{MODEL_VAR, TEMPERATURE_VAR};
use twin_llm::{HostedProvider, LlmProvider, ModelSettings, ProviderConfig, SamplingConfig};

#[derive(Parser, Debug)]
#[command(name = "twin")]
#[command(author, version, about = "Personal Agent Twin - answers questions about you")]
struct Cli {
    /// Question to ask (defaults to "What are my interests and what am I learning?")
    #[arg(trailing_var_arg = true)]
    question: Vec<String>,

    /// JSON file with role, goal and persona (or backstory)
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Model as provider/model, e.g. openai/gpt-4o-mini or ollama/llama3
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn question(&self) -> String {
        let joined = self.question.join(" ");
        if joined.trim().is_empty() {
            DEFAULT_QUESTION.to_string()
        } else {
            joined.trim().to_string()
        }
    }

    fn log_filter(&self) -> &'static str {
        if self.verbose {
            "twin=debug,twin_agent=debug,twin_llm=debug"
        } else if self.quiet {
            "warn"
        } else {
            "twin=info,twin_agent=info,twin_llm=info"
        }
    }

    /// Settings read through `env`. A flag replaces its variable before
    /// anything is parsed, so a bad `TWIN_MODEL` cannot shadow `--model`.
    fn settings<F>(&self, env: F) -> Result<ModelSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        ModelSettings::from_lookup(|key| match key {
            MODEL_VAR if self.model.is_some() => self.model.clone(),
            TEMPERATURE_VAR if self.temperature.is_some() => self.temperature.map(|t| t.to_string()),
            _ => env(key),
        })
    }

    fn profile(&self) -> Result<AgentProfile> {
        match &self.profile {
            Some(path) => AgentProfile::load(path),
            None => Ok(AgentProfile::default()),
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Resolve configuration, connect to the model and answer the question.
/// Configuration errors surface before anything is written to `out`.
async fn run<F, W>(cli: &Cli, env: F, out: &mut W) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let settings = cli.settings(&env)?;
    debug!(model = %settings.model, timeout_secs = ?settings.timeout_secs, "model settings");

    let profile = cli.profile()?;
    let provider = HostedProvider::connect(ProviderConfig::resolve(&settings, &env)?)?;
    answer(cli, profile, settings.sampling, provider, out).await
}

async fn answer<P, W>(
    cli: &Cli,
    profile: AgentProfile,
    sampling: SamplingConfig,
    provider: P,
    out: &mut W,
) -> Result<()>
where
    P: LlmProvider,
    W: Write,
{
    let invoker = Invoker::new(provider).with_sampling(sampling);
    let twin = AgentTwin::new(profile, TaskTemplate::answer_question(), invoker);

    let question = cli.question();
    write_header(out, &question)?;
    out.flush()?;

    let answer = twin.ask(&question).await?;
    write_answer(out, &answer)?;
    Ok(())
}

/// One `Error: ...` line; the process then exits with status 1
fn report<W: Write>(err: &Error, out: &mut W) -> io::Result<()> {
    writeln!(out, "Error: {}", err)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    let env = |key: &str| std::env::var(key).ok();
    if let Err(e) = run(&cli, env, &mut io::stdout()).await {
        debug!(kind = %e.kind(), retryable = e.is_retryable(), "run failed");
        report(&e, &mut io::stderr()).ok();
        std::process::exit(1);
    }
}
