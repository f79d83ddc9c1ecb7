mod auth;
mod backend_client;
mod config;
mod controller;
mod errors;
mod messages;
mod models;
mod render;
mod state;
mod upload;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::supabase::SupabaseAuth;
use crate::auth::AuthProvider;
use crate::backend_client::BackendClient;
use crate::config::{Config, DEFAULT_OAUTH_PROVIDER};
use crate::controller::Controller;
use crate::errors::CoachError;
use crate::messages::Locale;
use crate::render::render_view;
use crate::upload::UploadedFile;

#[derive(Debug, Parser)]
#[command(name = "coach", version, about = "Match your CV against a job description")]
struct Cli {
    /// Backend base URL (overrides COACH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Interface language: en or pl (overrides COACH_LOCALE)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the backend is reachable
    Health,

    /// Upload a CV and analyze it against a job description
    Analyze {
        /// CV file (.pdf or .txt, up to 10 MB)
        #[arg(long)]
        cv: PathBuf,

        /// File containing the job description
        #[arg(long, conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// AI provider API key forwarded to the backend
        #[arg(long, env = "COACH_AI_API_KEY", hide_env_values = true, default_value = "")]
        api_key: String,
    },

    /// Sign in through the identity provider, then sign out on Enter
    Login {
        /// OAuth provider name (overrides COACH_OAUTH_PROVIDER)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show login availability and the configured backend
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    // Logs go to stderr; stdout carries the rendered screen.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Career Coach v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", config.api_url);

    let messages = config.locale.messages();
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let backend = BackendClient::new(&config.api_url, timeout, messages)?;
    let auth: Option<Arc<dyn AuthProvider>> = match &config.auth {
        Some(auth_config) => {
            info!("Auth provider: {}", auth_config.url);
            Some(Arc::new(SupabaseAuth::new(auth_config, timeout, messages)?))
        }
        None => {
            warn!("SUPABASE_URL or SUPABASE_ANON_KEY is not set; login is disabled");
            None
        }
    };
    let controller = Controller::new(backend, auth, messages);
    // Sessions are not persisted, so a fresh process only finds one when the
    // provider keeps its own; a failed refresh of that session is reported here.
    if let Err(e) = controller.restore_session().await {
        warn!("Could not restore session: {e}");
    }

    let outcome = match cli.command {
        Command::Health => controller.check_health().await.map(|_| ()),
        Command::Analyze {
            cv,
            job,
            job_text,
            api_key,
        } => {
            let file = UploadedFile::from_path(&cv).await?;
            let job_description = match (job, job_text) {
                (Some(path), _) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read '{}'", path.display()))?,
                (None, Some(text)) => text,
                (None, None) => String::new(),
            };
            controller.set_job_description(job_description);
            controller.set_api_key(api_key);
            run_analysis(&controller, file).await
        }
        Command::Login { provider } => {
            let provider = provider
                .or_else(|| config.auth.as_ref().map(|a| a.oauth_provider.clone()))
                .unwrap_or_else(|| DEFAULT_OAUTH_PROVIDER.to_string());
            run_login(&controller, &provider).await
        }
        Command::Status => Ok(()),
    };

    println!("{}", render_view(&controller.snapshot(), messages, controller.api_url()));

    if let Err(e) = outcome {
        warn!(kind = ?e.kind(), status = ?e.status(), "Action failed: {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_analysis(controller: &Controller, file: UploadedFile) -> Result<(), CoachError> {
    controller.upload(file).await?;
    controller.analyze().await.map(|_| ())
}

async fn run_login(controller: &Controller, provider: &str) -> Result<(), CoachError> {
    controller.login(provider).await?;

    let messages = controller.messages();
    println!("{}", render::render_auth(&controller.snapshot(), messages));
    println!("{}", messages.press_enter_to_sign_out);

    wait_for_enter(BufReader::new(tokio::io::stdin())).await;
    controller.logout().await
}

/// Waits for a line (or EOF) on `input`. A read failure is logged and treated
/// like Enter, so the caller still signs out.
async fn wait_for_enter<R: AsyncBufRead + Unpin>(mut input: R) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Could not read from stdin: {e}");
            false
        }
    }
}
