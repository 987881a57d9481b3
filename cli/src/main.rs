mod controller;
mod net;
mod render;
mod session;
mod state;

use std::io::IsTerminal;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, debug};
use uuid::Uuid;

use controller::{BoardController, PersistOutcome};
use net::ApiClient;
use net::generate::{GenerateError, GenerationClient};
use net::identity::IdentityClient;
use net::persist::{PersistError, PersistenceClient};
use state::auth::AuthObserver;
use state::view::NoticeLevel;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing session token; pass --session-token or set MOODGEN_SESSION_TOKEN")]
    MissingSessionToken,
    #[error(transparent)]
    Api(#[from] net::ApiError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("{0}")]
    Refused(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "moodgen-cli", about = "Moodboard generator client")]
struct Cli {
    #[arg(long, env = "MOODGEN_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "MOODGEN_SESSION_TOKEN")]
    session_token: Option<String>,

    /// Log debug output to stderr.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    /// Never paint swatches with terminal colors.
    #[arg(long, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Auth(AuthCommand),
    /// Generate a moodboard for a keyword and save it.
    Generate {
        keyword: String,
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    Boards(BoardsCommand),
    /// Interactive session: search, shuffle, replace, refresh, export.
    Session {
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    RequestCode {
        #[arg(long)]
        email: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    VerifyCode {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    Whoami,
    Refresh,
    Logout,
}

#[derive(Args, Debug)]
struct BoardsCommand {
    #[command(subcommand)]
    command: BoardsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BoardsSubcommand {
    List,
    Show {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
    Share {
        id: Uuid,
        #[arg(long, action = clap::ArgAction::Set)]
        public: bool,
    },
}

/// Clients wired to one auth observer.
struct CliContext {
    api: ApiClient,
    identity: IdentityClient,
    session_token: Option<String>,
    ansi: bool,
}

impl CliContext {
    fn new(cli: &Cli) -> Self {
        let api = ApiClient::new(&cli.base_url);
        let observer = Arc::new(AuthObserver::new(Arc::new(api.clone())));
        Self {
            identity: IdentityClient::new(api.clone(), observer),
            api,
            session_token: cli.session_token.clone(),
            ansi: !cli.no_color && std::io::stdout().is_terminal(),
        }
    }

    /// Sign in with the configured token.
    async fn sign_in(&self) -> Result<(), CliError> {
        let token = self.session_token.as_deref().ok_or(CliError::MissingSessionToken)?;
        self.identity.restore(token).await?;
        Ok(())
    }

    fn persistence(&self) -> PersistenceClient {
        PersistenceClient::new(self.api.clone(), self.identity.context())
    }

    fn controller(&self, autosave: bool) -> BoardController {
        let generator = Arc::new(GenerationClient::new(self.api.clone(), self.identity.context()));
        BoardController::new(generator, Arc::new(self.persistence()), self.identity.context()).with_autosave(autosave)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let ctx = CliContext::new(&cli);
    match cli.command {
        Command::Ping => {
            ctx.api.ping().await?;
            println!("ok");
            Ok(())
        }
        Command::Auth(auth) => run_auth(&ctx, auth).await,
        Command::Generate { keyword, no_save } => run_generate(&ctx, &keyword, !no_save).await,
        Command::Boards(boards) => run_boards(&ctx, boards).await,
        Command::Session { no_save } => run_session(&ctx, !no_save).await,
    }
}

async fn run_auth(ctx: &CliContext, auth: AuthCommand) -> Result<(), CliError> {
    match auth.command {
        AuthSubcommand::RequestCode { email, display_name } => {
            let response = ctx.identity.request_code(&email, display_name.as_deref()).await?;
            match response.code {
                Some(code) => println!("dev code: {code}"),
                None => println!("code sent to {email}"),
            }
            Ok(())
        }
        AuthSubcommand::VerifyCode { email, code } => {
            let session = ctx.identity.verify_code(&email, &code).await?;
            if let Some(profile) = ctx.identity.context().profile() {
                eprintln!("signed in as {} ({})", profile.name, profile.id);
            }
            println!("{}", session.token);
            Ok(())
        }
        AuthSubcommand::Whoami => {
            ctx.sign_in().await?;
            print_json(&ctx.identity.context().profile())
        }
        AuthSubcommand::Refresh => {
            ctx.sign_in().await?;
            let session = ctx.identity.refresh().await?;
            println!("{}", session.token);
            Ok(())
        }
        AuthSubcommand::Logout => {
            ctx.sign_in().await?;
            ctx.identity.logout().await?;
            println!("signed out");
            Ok(())
        }
    }
}

async fn run_generate(ctx: &CliContext, keyword: &str, autosave: bool) -> Result<(), CliError> {
    ctx.sign_in().await?;
    let controller = ctx.controller(autosave);
    let report = controller.search(keyword).await;
    let Some(notice) = report.notice else {
        return Err(CliError::Refused("search superseded".into()));
    };
    eprintln!("{}", render::notice(&notice));
    if notice.level != NoticeLevel::Success {
        return Err(CliError::Refused(notice.description));
    }
    if let Some(board) = controller.displayed() {
        print!("{}", render::moodboard(&board, ctx.ansi));
    }
    match report.persisted {
        PersistOutcome::Saved(id) => eprintln!("saved as {id}"),
        PersistOutcome::Failed(reason) => eprintln!("not saved: {reason}"),
        PersistOutcome::Skipped => {}
    }
    Ok(())
}

async fn run_boards(ctx: &CliContext, boards: BoardsCommand) -> Result<(), CliError> {
    ctx.sign_in().await?;
    let store = ctx.persistence();
    match boards.command {
        BoardsSubcommand::List => {
            print!("{}", render::saved_list(&store.list().await?));
            Ok(())
        }
        BoardsSubcommand::Show { id } => {
            let saved = store.fetch(id).await?;
            let visibility = if saved.is_public { "public" } else { "private" };
            print!("{}", render::moodboard(&saved.moodboard, ctx.ansi));
            println!("\n{visibility}, created {}", saved.created_at);
            Ok(())
        }
        BoardsSubcommand::Delete { id } => {
            store.delete(id).await?;
            println!("deleted {id}");
            Ok(())
        }
        BoardsSubcommand::Share { id, public } => print_json(&store.set_visibility(id, public).await?),
    }
}

async fn run_session(ctx: &CliContext, autosave: bool) -> Result<(), CliError> {
    ctx.sign_in().await?;
    let controller = ctx.controller(autosave);

    let mut auth = ctx.identity.context();
    let watcher = tokio::spawn(async move {
        while auth.changed().await {
            let snapshot = auth.snapshot();
            debug!(
                signed_in = snapshot.session.is_some(),
                user = ?snapshot.profile.map(|p| p.name),
                "auth state changed"
            );
        }
    });

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let result = session::run(&controller, input, tokio::io::stdout(), ctx.ansi).await;
    watcher.abort();
    Ok(result?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
