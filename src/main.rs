use std::sync::Arc;

use color_eyre::Result;
use tokio::sync::mpsc;

use mate::adapters::{GraphqlHistoryStore, ReqwestHttpClient};
use mate::cli::{self, CliCommand};
use mate::config::ClientConfig;
use mate::error::MateError;
use mate::session::ChatSession;
use mate::traits::{HistoryStore, HttpClient};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = cli::parse_args(std::env::args());
    cli::init_tracing(args.verbose);

    match args.command {
        CliCommand::Version => cli::handle_version_command(),
        CliCommand::Help => {
            println!("{}", cli::USAGE);
            Ok(())
        }
        CliCommand::Invalid(reason) => {
            eprintln!("mate: {}\n\n{}", reason, cli::USAGE);
            std::process::exit(2);
        }
        CliCommand::List => {
            let (_, history, _) = build_stack();
            let result = cli::run_list(history.as_ref(), &mut std::io::stdout()).await;
            exit_on_mate_error(result)
        }
        CliCommand::Send { chat, prompt } => {
            let (client, history, config) = build_stack();
            let (tx, mut rx) = mpsc::unbounded_channel();

            let session = match chat {
                Some(id) => {
                    let opened = ChatSession::open(client, history, config, &id)
                        .await
                        .map_err(MateError::from);
                    exit_on_mate_error(opened)?
                }
                None => ChatSession::new(client, history, config),
            }
            .with_events(tx);

            let interrupt = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("Could not listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            let mut stdout = std::io::stdout();
            let sent = cli::run_send(&session, &mut rx, &prompt, interrupt, &mut stdout).await;
            let outcome = exit_on_mate_error(sent)?;

            if let Some(id) = session.conversation_id() {
                tracing::info!("Conversation id: {}", id);
            }
            if let Some(err) = outcome.error() {
                report(err);
                std::process::exit(1);
            }
            if outcome.is_cancelled() {
                std::process::exit(130);
            }
            Ok(())
        }
    }
}

type Stack = (Arc<dyn HttpClient>, Arc<dyn HistoryStore>, ClientConfig);

fn build_stack() -> Stack {
    let config = ClientConfig::from_env();
    if config.token.is_none() {
        tracing::warn!("MATE_TOKEN is not set; requests will be unauthenticated");
    }

    let client: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new().with_request_timeout(config.request_timeout));
    let history: Arc<dyn HistoryStore> =
        Arc::new(GraphqlHistoryStore::new(client.clone(), config.clone()));
    (client, history, config)
}

/// Report known errors in user terms and exit; pass anything else through.
fn exit_on_mate_error<T, E>(result: std::result::Result<T, E>) -> Result<T>
where
    E: Into<color_eyre::Report>,
{
    let report = match result {
        Ok(value) => return Ok(value),
        Err(e) => e.into(),
    };
    if let Some(err) = report.downcast_ref::<MateError>() {
        self::report(err);
        std::process::exit(1);
    }
    Err(report)
}

fn report(err: &MateError) {
    tracing::debug!(
        "{} ({}, retryable: {})",
        err,
        err.error_code(),
        err.is_retryable()
    );
    eprintln!("mate: {}", err.user_message());
    eprintln!("hint: {}", err.recovery_hint());
}
