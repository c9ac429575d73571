//! Terminal presentation of notices and confirmation prompts.

use std::io::{self, BufRead, Write};

use client_core::{ConfirmPrompt, Notice, NoticeSink};
use tracing::warn;

pub struct TerminalNotices;

impl NoticeSink for TerminalNotices {
    fn notify(&self, notice: Notice) {
        if notice.is_failure() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }
}

pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if let Err(error) = io::stdout().flush() {
            warn!(%error, "failed to flush confirmation prompt");
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(error) => {
                warn!(%error, "failed to read confirmation; treating as declined");
                false
            }
        }
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
