//! Interactive board session over line-oriented input.
//!
//! One command per line; results and notices are written to the output as
//! they settle. Input is read only after the previous command finishes.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::controller::{BoardController, PersistOutcome};
use crate::render;

pub const HELP: &str = "\
commands:
  search <keyword>  generate a moodboard
  shuffle           rearrange colors and images
  replace           swap in the alternative palette
  refresh           reorder images
  export            export the board
  show              print the current board
  help              this list
  quit              leave the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    Shuffle,
    Replace,
    Refresh,
    Export,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0} (type `help`)")]
pub struct UnknownCommand(pub String);

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<SessionCommand>, UnknownCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = match word.to_ascii_lowercase().as_str() {
        "search" | "s" => SessionCommand::Search(rest.trim().to_owned()),
        "shuffle" => SessionCommand::Shuffle,
        "replace" => SessionCommand::Replace,
        "refresh" => SessionCommand::Refresh,
        "export" => SessionCommand::Export,
        "show" => SessionCommand::Show,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        _ => return Err(UnknownCommand(word.to_owned())),
    };
    Ok(Some(command))
}

/// Run commands from `input` until `quit` or end of input.
pub async fn run<R, W>(controller: &BoardController, input: R, mut output: W, ansi: bool) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let text = match parse_line(&line) {
            Ok(None) => String::new(),
            Ok(Some(SessionCommand::Quit)) => break,
            Ok(Some(command)) => execute(controller, command, ansi).await,
            Err(e) => format!("{e}\n"),
        };
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await?;
    }
    output.write_all(b"\n").await?;
    output.flush().await
}

async fn execute(controller: &BoardController, command: SessionCommand, ansi: bool) -> String {
    let notice = match command {
        SessionCommand::Search(keyword) => {
            let report = controller.search(&keyword).await;
            let mut out = report.notice.map(|n| render::notice(&n) + "\n").unwrap_or_default();
            if let Some(board) = controller.displayed() {
                out.push_str(&render::moodboard(&board, ansi));
            }
            match report.persisted {
                PersistOutcome::Saved(id) => out.push_str(&format!("saved as {id}\n")),
                PersistOutcome::Failed(reason) => out.push_str(&format!("not saved: {reason}\n")),
                PersistOutcome::Skipped => {}
            }
            return out;
        }
        SessionCommand::Show => {
            return match controller.displayed() {
                Some(board) => render::moodboard(&board, ansi),
                None => "nothing displayed; try `search <keyword>`\n".to_owned(),
            };
        }
        SessionCommand::Help | SessionCommand::Quit => return HELP.to_owned(),
        SessionCommand::Shuffle => controller.shuffle(),
        SessionCommand::Replace => controller.replace(),
        SessionCommand::Refresh => controller.refresh_images(),
        SessionCommand::Export => controller.export(),
    };
    render::notice(&notice) + "\n"
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
