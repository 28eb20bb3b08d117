//! Interactive line shell.
//!
//! Reads one command or question per line and prints the rendered output.
//! Generic over the reader and writer so sessions can be scripted in tests.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::app::App;
use crate::commands::{CommandOutput, CommandRouter};
use crate::error::{AskDbError, Result};

/// Prompt printed before each line in interactive sessions.
pub const PROMPT: &str = "askdb> ";

/// Runs the shell until `/quit` or end of input.
///
/// With `interactive` set a banner and prompt are printed. Returns the number
/// of lines that were executed.
pub async fn run<R, W>(app: &mut App, reader: R, writer: &mut W, interactive: bool) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if !app.is_demo() {
        let availability = app.runner_mut().refresh_health().await;
        info!("Query API is {}", availability.as_str());
    }

    if interactive {
        write(writer, &banner(app)).await?;
    }

    let mut lines = reader.lines();
    let mut executed = 0;
    loop {
        if interactive {
            write(writer, PROMPT).await?;
        }

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| AskDbError::internal(format!("Failed to read input: {e}")))?
        else {
            debug!("End of input");
            break;
        };

        let output = app.execute(CommandRouter::parse(&line)).await;
        executed += 1;
        if output.is_exit() {
            break;
        }
        print_output(writer, &output).await?;
    }

    if interactive {
        write(writer, "Goodbye.\n").await?;
    }
    Ok(executed)
}

fn banner(app: &App) -> String {
    let user = app.user();
    let mode = if app.is_demo() {
        "demo data".to_string()
    } else {
        format!(
            "{} ({})",
            app.runner().service().name(),
            app.runner().availability().as_str()
        )
    };
    format!(
        "AskDB {}\nSigned in as {} ({})\nQuerying: {mode}\nType /help for commands.\n\n",
        env!("CARGO_PKG_VERSION"),
        user.display_name,
        user.initials()
    )
}

async fn print_output<W: AsyncWrite + Unpin>(writer: &mut W, output: &CommandOutput) -> Result<()> {
    let rendered = output.render();
    if rendered.is_empty() {
        return Ok(());
    }
    write(writer, &format!("{rendered}\n")).await
}

async fn write<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    writer
        .write_all(text.as_bytes())
        .await
        .map_err(|e| AskDbError::internal(format!("Failed to write output: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| AskDbError::internal(format!("Failed to write output: {e}")))
}
