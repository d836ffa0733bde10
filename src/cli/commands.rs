//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::auth::SessionContext;
use crate::cli::output::{
    LiveRenderer, OutputFormat, format_history, format_login, format_message, format_profile,
    format_reply, format_session, format_session_list, format_source_list,
};
use crate::cli::parser::{Cli, Commands};
use crate::client::{CancelHandle, ChatClient, ClientConfig};
use crate::error::{CommandError, Result};
use crate::io::TokenStore;
use std::io::{self, BufRead, Read};
use tracing::{debug, info};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to start runtime: {e}")))?;
    runtime.block_on(run(cli))
}

async fn run(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let store = TokenStore::new(cli.get_token_path());
    let session = restore_session(&store)?;
    let held = session.credential().is_some();

    let config = ClientConfig::new(&cli.api_url)?;
    let client = ChatClient::new(&config, session.clone())?;
    debug!(api_url = %config.base_url, "client ready");

    let result = dispatch(cli, &client, &store, format).await;

    // The client clears the session when the server rejects the token.
    if held && session.credential().is_none() {
        store.clear()?;
    }
    result
}

async fn dispatch(
    cli: &Cli,
    client: &ChatClient,
    store: &TokenStore,
    format: OutputFormat,
) -> Result<String> {
    match &cli.command {
        Commands::Register {
            email,
            username,
            password,
        } => cmd_register(client, email, username, password.as_deref(), format).await,
        Commands::Login { email, password } => {
            cmd_login(client, store, email, password.as_deref(), format).await
        }
        Commands::Logout => cmd_logout(client, store, format),
        Commands::Whoami => cmd_whoami(client, format).await,
        Commands::ListSessions => cmd_list_sessions(client, format).await,
        Commands::NewSession { name } => cmd_new_session(client, name, format).await,
        Commands::Rename { id, name } => cmd_rename(client, *id, name, format).await,
        Commands::DeleteSession { id, yes } => cmd_delete(client, *id, *yes, format).await,
        Commands::History { id, full } => cmd_history(client, *id, *full, format).await,
        Commands::Ask {
            session,
            prompt,
            no_stream,
        } => cmd_ask(client, *session, prompt.as_deref(), *no_stream, format).await,
        Commands::Sources { session } => cmd_sources(client, *session, format).await,
    }
}

/// Builds the session context from the stored token, if any.
fn restore_session(store: &TokenStore) -> Result<SessionContext> {
    let session = SessionContext::new();
    if let Some(token) = store.load()? {
        debug!(path = %store.path().display(), "restoring stored token");
        session.init(token);
    }
    Ok(session)
}

// ==================== Command Implementations ====================

async fn cmd_register(
    client: &ChatClient,
    email: &str,
    username: &str,
    password: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let password = resolve_password(password)?;
    let message = client.register(email, username, &password).await?;
    Ok(format_message(&message, format))
}

async fn cmd_login(
    client: &ChatClient,
    store: &TokenStore,
    email: &str,
    password: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let password = resolve_password(password)?;
    let login = client.login(email, &password).await?;
    store.save(&login.access_token)?;
    info!(path = %store.path().display(), "token stored");
    Ok(format_login(
        &email.trim().to_lowercase(),
        login.user.as_ref(),
        format,
    ))
}

fn cmd_logout(client: &ChatClient, store: &TokenStore, format: OutputFormat) -> Result<String> {
    let had_session = client.logout();
    let removed = store.clear()?;
    let message = if had_session || removed {
        "Signed out."
    } else {
        "Not signed in."
    };
    Ok(format_message(message, format))
}

async fn cmd_whoami(client: &ChatClient, format: OutputFormat) -> Result<String> {
    let profile = client.profile().await?;
    Ok(format_profile(&profile, format))
}

async fn cmd_list_sessions(client: &ChatClient, format: OutputFormat) -> Result<String> {
    let sessions = client.list_sessions().await?;
    Ok(format_session_list(&sessions, format))
}

async fn cmd_new_session(client: &ChatClient, name: &str, format: OutputFormat) -> Result<String> {
    let session = client.create_session(name).await?;
    Ok(format_session(&session, "Created", format))
}

async fn cmd_rename(
    client: &ChatClient,
    id: i64,
    name: &str,
    format: OutputFormat,
) -> Result<String> {
    let session = client.rename_session(id, name).await?;
    Ok(format_session(&session, "Renamed", format))
}

async fn cmd_delete(
    client: &ChatClient,
    id: i64,
    yes: bool,
    format: OutputFormat,
) -> Result<String> {
    if !yes {
        return Err(CommandError::ConfirmationRequired {
            action: format!("deleting session {id} and its history"),
        }
        .into());
    }
    client.delete_session(id).await?;
    Ok(format_message(&format!("Deleted session {id}."), format))
}

async fn cmd_history(
    client: &ChatClient,
    id: i64,
    full: bool,
    format: OutputFormat,
) -> Result<String> {
    let log = client.history(id).await?;
    Ok(format_history(&log, full, format))
}

async fn cmd_ask(
    client: &ChatClient,
    session_id: i64,
    prompt: Option<&str>,
    no_stream: bool,
    format: OutputFormat,
) -> Result<String> {
    // Fail before any request when signed out.
    client.session().bearer()?;

    let prompt = resolve_prompt(prompt)?;
    let mut log = client.history(session_id).await?;

    if no_stream {
        log.push_user(prompt.as_str());
        let answer = client.chat(session_id, log.messages()).await?;
        let reply = log.push_reply(answer);
        return Ok(format_reply(reply, false, format));
    }

    let live = format == OutputFormat::Text;
    let cancel = CancelHandle::new();
    let watcher = watch_interrupt(cancel.clone());
    let mut renderer = LiveRenderer::new(io::stdout());

    let reply = client
        .chat_stream(session_id, &mut log, &prompt, &cancel, |log| {
            if !live {
                return;
            }
            if let Some(message) = log.last()
                && let Err(e) = renderer.update(&message.content)
            {
                debug!(error = %e, "live output failed");
            }
        })
        .await;
    watcher.abort();

    Ok(format_reply(&reply?, live, format))
}

async fn cmd_sources(client: &ChatClient, session_id: i64, format: OutputFormat) -> Result<String> {
    let log = client.history(session_id).await?;
    Ok(format_source_list(log.last_reply(), format))
}

/// Cancels the running reply on Ctrl-C.
fn watch_interrupt(cancel: CancelHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted; stopping reply");
            cancel.cancel();
        }
    })
}

fn resolve_password(password: Option<&str>) -> Result<String> {
    match password {
        Some(p) => Ok(p.to_string()),
        None => read_line(io::stdin().lock(), "--password"),
    }
}

fn resolve_prompt(prompt: Option<&str>) -> Result<String> {
    let prompt = if let Some(p) = prompt {
        p.to_string()
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| CommandError::Stdin(e.to_string()))?;
        buffer
    };
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(CommandError::MissingArgument("prompt".to_string()).into());
    }
    Ok(prompt.to_string())
}

/// Reads one non-empty line, without its line ending.
fn read_line<R: BufRead>(mut reader: R, what: &str) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| CommandError::Stdin(e.to_string()))?;
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(CommandError::MissingArgument(what.to_string()).into());
    }
    Ok(line.to_string())
}
