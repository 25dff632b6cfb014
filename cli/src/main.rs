//! `streampay`: command-line client for a StreamPay backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Drives the same `session::SessionStore` the browser uses, with `reqwest`
//! as transport, a JSON state file as the durable ("remember me") tier and
//! process memory as the session tier. Useful for scripting and for
//! smoke-testing a backend's auth endpoints.

mod http;
mod platform;
mod store;

use std::path::PathBuf;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use session::{
    AuthQueries, ConfigError, GuardDecision, MemoryStore, SessionAvailability, SessionConfig, SessionError,
    SessionPersistence, SessionStore, decide,
};
use tracing_subscriber::EnvFilter;

use crate::http::ReqwestAuthApi;
use crate::platform::{LogNavigator, TokioPlatform};
use crate::store::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("not logged in; run `streampay login` first")]
    NotLoggedIn,
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to listen for ctrl-c: {0}")]
    Signal(std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "streampay", about = "StreamPay session CLI")]
struct Cli {
    /// Backend base URL; overrides `STREAMPAY_API_URL` from the session config.
    #[arg(long)]
    api_url: Option<String>,

    /// Durable session file (the "remember me" tier).
    #[arg(long, env = "STREAMPAY_STATE_FILE", default_value = ".streampay-session.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STREAMPAY_PASSWORD", hide_env_values = true)]
        password: String,
        /// Keep the session in memory only; it ends with this process.
        #[arg(long, default_value_t = false)]
        no_remember: bool,
    },
    /// Forget the persisted session.
    Logout,
    /// Print the persisted user without contacting the backend.
    Whoami,
    /// Re-fetch the current user from `/api/auth/me`.
    Refresh {
        /// Ignore the refresh throttle window.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Keep the session alive with scheduled refreshes until ctrl-c or logout.
    Watch,
    /// Show what the route guard decides for a path.
    Guard {
        path: String,
        /// Evaluate as a public screen.
        #[arg(long, default_value_t = false)]
        public: bool,
    },
    /// Authenticated GET of any backend path; prints the JSON body.
    Get { path: String },
    /// Password reset flow.
    Reset(ResetCommand),
}

#[derive(Args, Debug)]
struct ResetCommand {
    #[command(subcommand)]
    command: ResetSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResetSubcommand {
    /// Email a reset link.
    Request { email: String },
    /// Check a reset token.
    Verify { token: String },
    /// Set a new password with a reset token.
    Confirm {
        token: String,
        #[arg(long, env = "STREAMPAY_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tokio::task::LocalSet::new().run_until(run(cli)).await
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = SessionConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_url = SessionConfig::with_api_url(url).api_url;
    }
    let store = build_store(config, &cli)?;
    store.initialize().await;

    let result = match cli.command {
        Command::Login { email, password, no_remember } => run_login(&store, &email, &password, !no_remember).await,
        Command::Logout => {
            store.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&store),
        Command::Refresh { force } => run_refresh(&store, force).await,
        Command::Watch => run_watch(&store).await,
        Command::Guard { path, public } => {
            run_guard(&store, &path, !public);
            Ok(())
        }
        Command::Get { path } => run_get(&store, &path).await,
        Command::Reset(reset) => run_reset(&store, reset).await,
    };
    store.teardown();
    result
}

fn build_store(config: SessionConfig, cli: &Cli) -> Result<SessionStore, CliError> {
    let api = Rc::new(ReqwestAuthApi::new(&config.api_url)?);
    let durable = Rc::new(FileStore::new(&cli.state_file));
    tracing::debug!(api_url = %config.api_url, state_file = %durable.path().display(), "session store configured");
    let persistence = SessionPersistence::new(durable, Rc::new(MemoryStore::new()));
    Ok(SessionStore::new(config, api, persistence, Rc::new(LogNavigator), Rc::new(TokioPlatform::new())))
}

async fn run_login(store: &SessionStore, email: &str, password: &str, remember: bool) -> Result<(), CliError> {
    let user = store.login(email, password, remember).await?;
    println!(
        "logged in as {} (role: {}, activated: {})",
        user.email().unwrap_or(email),
        user.role().as_str(),
        user.is_activated()
    );
    Ok(())
}

fn run_whoami(store: &SessionStore) -> Result<(), CliError> {
    let user = store.user().ok_or(CliError::NotLoggedIn)?;
    print_json(&serde_json::to_value(&user)?)
}

async fn run_refresh(store: &SessionStore, force: bool) -> Result<(), CliError> {
    if !store.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    match store.refresh(force).await? {
        Some(user) => print_json(&serde_json::to_value(&user)?),
        // A 401 ended the session.
        None => Err(CliError::Session(SessionError::SessionExpired)),
    }
}

async fn run_watch(store: &SessionStore) -> Result<(), CliError> {
    if !store.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    let (signed_in, mut changes) = tokio::sync::watch::channel(true);
    store.subscribe(move |snapshot| {
        let _ = signed_in.send(snapshot.is_authenticated());
    });
    eprintln!(
        "watching session; refreshing every {}s (ctrl-c to stop)",
        store.config().refresh_interval.as_secs()
    );

    tokio::select! {
        signal = tokio::signal::ctrl_c() => signal.map_err(CliError::Signal),
        _ = changes.wait_for(|authenticated| !authenticated) => {
            eprintln!("session ended");
            Err(CliError::Session(SessionError::SessionExpired))
        }
    }
}

fn run_guard(store: &SessionStore, path: &str, require_auth: bool) {
    match decide(SessionAvailability::from_provider(Some(store)), require_auth, path) {
        GuardDecision::Render => println!("render"),
        GuardDecision::Loading => println!("loading"),
        GuardDecision::Redirect(route) => println!("redirect {}", route.path()),
    }
}

async fn run_get(store: &SessionStore, path: &str) -> Result<(), CliError> {
    if !store.is_authenticated() {
        return Err(CliError::NotLoggedIn);
    }
    let body = store.fetch_authorized(path).await?;
    print_json(&body)
}

async fn run_reset(store: &SessionStore, reset: ResetCommand) -> Result<(), CliError> {
    match reset.command {
        ResetSubcommand::Request { email } => {
            println!("{}", store.request_password_reset(&email).await?);
        }
        ResetSubcommand::Verify { token } => {
            let status = store.verify_reset_token(&token).await?;
            if status.valid {
                println!("valid{}", status.email.map(|email| format!(" ({email})")).unwrap_or_default());
            } else {
                println!("invalid: {}", status.message.unwrap_or_else(|| "token rejected".to_owned()));
            }
        }
        ResetSubcommand::Confirm { token, password } => {
            println!("{}", store.reset_password(&token, &password).await?);
        }
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
