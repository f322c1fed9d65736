//! `scrivener` command line: stream an edit of a note, review the diff, save or discard.

use anyhow::{Context, bail};
use clap::Parser;
use diff_engine::{RenderBlock, RowKind};
use edit_session::SessionId;
use scrivener_kernel::events::{EventReceiver, SessionEvent};
use scrivener_kernel::inference::{OpenAiConfig, OpenAiTokenSource};
use scrivener_kernel::infrastructure::{config::Settings, telemetry::TelemetryBuilder};
use scrivener_kernel::sessions::{EditTask, SessionManager};
use scrivener_kernel::store::HttpDocumentStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info};

/// Rewrite part of a note with an LLM and review the diff before saving.
#[derive(Debug, Parser)]
#[command(name = "scrivener", version, about)]
struct Args {
    /// Note to edit
    note_id: String,

    /// What the model should do
    instruction: String,

    /// First line to rewrite (1-based)
    #[arg(long, requires = "end_line", conflicts_with = "new_note")]
    start_line: Option<usize>,

    /// Last line to rewrite (inclusive)
    #[arg(long, requires = "start_line")]
    end_line: Option<usize>,

    /// Generate fresh content, appended to the note if it exists
    #[arg(long)]
    new_note: bool,

    /// Save without asking
    #[arg(long)]
    apply: bool,
}

impl Args {
    fn task(&self) -> anyhow::Result<EditTask> {
        match (self.start_line, self.end_line, self.new_note) {
            (_, _, true) => Ok(EditTask::new_note(&self.note_id, &self.instruction)),
            (Some(start), Some(end), false) => Ok(EditTask::lines(
                &self.note_id,
                start,
                end,
                &self.instruction,
            )),
            _ => bail!("Pass --start-line and --end-line, or --new-note"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let task = args.task()?;

    let settings = Settings::new().context("Failed to load configuration")?;
    TelemetryBuilder::from_settings(&settings.telemetry, env!("CARGO_PKG_VERSION")).init()?;

    let source = OpenAiTokenSource::new(OpenAiConfig::from_settings(&settings.inference)?);
    let store = HttpDocumentStore::from_settings(&settings.store)?;
    let manager = SessionManager::with_settings(source, store, settings.sessions);

    let mut events = manager.subscribe();
    let session_id = manager.start(task).await?;
    info!(%session_id, "Streaming edit");

    tokio::select! {
        outcome = wait_for_completion(&mut events, session_id) => outcome?,
        result = signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            let canceled = manager.cancel_all();
            info!(canceled, "Interrupted; note left untouched");
            return Ok(());
        }
    }

    print_blocks(&manager.render(session_id)?);

    if args.apply || confirm().await? {
        manager.accept(session_id).await?;
        println!("Saved {}.", args.note_id);
    } else {
        manager.cancel(session_id)?;
        println!("Discarded.");
    }
    Ok(())
}

async fn wait_for_completion(
    events: &mut EventReceiver,
    session_id: SessionId,
) -> anyhow::Result<()> {
    loop {
        let event = events.recv().await?;
        if event.session_id() != session_id {
            continue;
        }
        match event {
            SessionEvent::ViewUpdated { view, .. } => {
                debug!(changed_blocks = view.changed_block_count(), "View updated");
            }
            SessionEvent::StreamCompleted { .. } => return Ok(()),
            SessionEvent::Canceled { reason, .. } => bail!("Session canceled: {reason:?}"),
            SessionEvent::Accepted { .. } => bail!("Session accepted unexpectedly"),
        }
    }
}

fn print_blocks(blocks: &[RenderBlock]) {
    for block in blocks {
        if let Some(handle) = block.revert_handle {
            println!("@@ block {handle} @@");
        }
        for row in &block.rows {
            let marker = match row.kind {
                RowKind::Unchanged => ' ',
                RowKind::Removed | RowKind::ModifiedOld => '-',
                RowKind::Added | RowKind::ModifiedNew => '+',
            };
            println!("{marker} {}", row.text);
        }
    }
}

async fn confirm() -> anyhow::Result<bool> {
    println!("Apply this edit? [y/N]");
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
