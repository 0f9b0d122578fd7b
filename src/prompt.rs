use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, IsTerminal, Write};

/// Asks the user before destructive branch operations.
pub trait Confirm {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Yes/no prompt on the controlling terminal.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str) -> Result<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            bail!("{message} (confirmation needs a terminal; pass --force to skip it)");
        }
        let mut stderr = io::stderr();
        write!(stderr, "{message} [y/N] ").context("writing prompt")?;
        stderr.flush().context("writing prompt")?;

        let mut answer = String::new();
        stdin
            .lock()
            .read_line(&mut answer)
            .context("reading confirmation")?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
