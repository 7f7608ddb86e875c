//! Command handlers behind the CLI flags.

use std::future::Future;
use std::io::Write;

use color_eyre::Result;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::consumer::StreamOutcome;
use crate::error::MateError;
use crate::lifecycle::LifecycleState;
use crate::session::{ChatSession, SessionEvent};
use crate::traits::HistoryStore;

/// Writes a streaming reply to a terminal as it grows.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    printed: String,
}

impl ReplyPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print whatever part of the reply `event` adds.
    pub fn handle<W: Write>(&mut self, event: &SessionEvent, out: &mut W) -> std::io::Result<()> {
        match event {
            SessionEvent::Progress(accumulated) => {
                if let Some(delta) = accumulated.strip_prefix(self.printed.as_str()) {
                    out.write_all(delta.as_bytes())?;
                } else {
                    write!(out, "\n{}", accumulated)?;
                }
                self.printed.clone_from(accumulated);
                out.flush()
            }
            SessionEvent::MessageAppended(message) if message.is_assistant() => {
                match message.content.strip_prefix(self.printed.as_str()) {
                    Some(rest) => writeln!(out, "{}", rest)?,
                    None => {
                        if !self.printed.is_empty() {
                            writeln!(out)?;
                        }
                        writeln!(out, "{}", message.content)?;
                    }
                }
                self.printed.clear();
                out.flush()
            }
            _ => Ok(()),
        }
    }
}

/// Send one prompt, printing the reply as it streams.
///
/// `interrupt` resolving cancels the stream (Ctrl-C in the binary). An
/// interrupt that lands while the conversation is still being created is
/// held until streaming starts.
pub async fn run_send<W, F>(
    session: &ChatSession,
    events: &mut UnboundedReceiver<SessionEvent>,
    prompt: &str,
    interrupt: F,
    out: &mut W,
) -> Result<StreamOutcome>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut printer = ReplyPrinter::new();
    let send = session.send(prompt);
    tokio::pin!(send);
    tokio::pin!(interrupt);

    let mut interrupted = false;
    let mut cancel_pending = false;

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            Some(event) = events.recv() => {
                if cancel_pending
                    && event == SessionEvent::StateChanged(LifecycleState::Streaming)
                {
                    cancel_pending = !session.cancel();
                }
                printer.handle(&event, out)?;
            }
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                if !session.cancel() {
                    tracing::debug!("Interrupted before streaming started");
                    cancel_pending = true;
                }
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        printer.handle(&event, out)?;
    }

    let outcome = result.map_err(MateError::from)?;
    if outcome.is_cancelled() {
        tracing::info!("Reply cancelled");
    }
    Ok(outcome)
}

/// Print the caller's conversations, most recent first.
pub async fn run_list<W: Write>(history: &dyn HistoryStore, out: &mut W) -> Result<()> {
    let conversations = history
        .list_conversations()
        .await
        .map_err(MateError::from)?;

    if conversations.is_empty() {
        writeln!(out, "No conversations yet.")?;
        return Ok(());
    }

    for conversation in &conversations {
        writeln!(
            out,
            "{}\t{}\t{}",
            conversation.id,
            conversation.updated_at.format("%Y-%m-%d %H:%M"),
            conversation.display_title()
        )?;
    }
    Ok(())
}
