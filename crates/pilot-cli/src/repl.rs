use anyhow::Result;
use console::style;
use pilot::agent::Agent;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::render;

const PROMPT: &str = "\x1b[1m\x1b[38;5;30m(pilot)> \x1b[0m";
const HISTORY_FILE: &str = ".pilot_history";

#[derive(Debug, PartialEq, Eq)]
pub enum InputType {
    Question(String),
    AskAgain,
    Exit,
}

/// Classify one line typed at the prompt
pub fn parse_input(line: &str) -> InputType {
    let text = line.trim();
    if text.is_empty() {
        InputType::AskAgain
    } else if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
        InputType::Exit
    } else {
        InputType::Question(text.to_string())
    }
}

pub fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}

/// Ask questions until the user leaves. The same agent session, and so the
/// same conversation, serves every question.
pub async fn run(agent: &mut Agent, max_turns: usize) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        if editor.load_history(path).is_err() {
            debug!("no history at {}", path.display());
        }
    }

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        };

        let question = match parse_input(&line) {
            InputType::Exit => break,
            InputType::AskAgain => continue,
            InputType::Question(question) => question,
        };
        editor.add_history_entry(question.as_str())?;

        println!("{}", style("thinking...").dim());
        match agent.query(&question, max_turns).await {
            Ok(Some(answer)) => render::print_markdown(&answer),
            Ok(None) => render::print_no_answer(max_turns),
            Err(e) => render::print_error(&anyhow::Error::from(e)),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            warn!("could not save history to {}: {}", path.display(), e);
        }
    }
    Ok(())
}
