//! Numbered-menu prompts: picking a commit message and picking a provider.
//!
//! Both prompts read exactly one line and never re-prompt. Reading goes
//! through `BufRead`/`Write` parameters so tests can drive them with
//! in-memory buffers.

use crate::error::GrittyError;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Outcome of presenting candidate messages to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The user picked `index` (1-based); `message` is that candidate.
    Selected { index: usize, message: String },
    /// Blank input or end of input.
    Cancelled,
    /// Anything else; carries the trimmed input.
    Invalid(String),
}

/// Parses a 1-based menu choice, returning `None` unless it is in `1..=len`.
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    input.parse::<usize>().ok().filter(|n| (1..=len).contains(n))
}

/// Reads one line; `None` at end of input.
fn read_one_line<R: BufRead>(input: &mut R) -> Result<Option<String>, GrittyError> {
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(GrittyError::Input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Presents candidate commit messages and reads the user's pick.
#[derive(Debug, Default)]
pub struct InteractiveSelector;

impl InteractiveSelector {
    pub fn new() -> Self {
        Self
    }

    /// Shows `candidates` as a 1-indexed list and reads a single choice.
    ///
    /// `candidates` must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading or writing fails.
    pub fn select_with_io<R: BufRead, W: Write>(
        &self,
        candidates: &[String],
        input: &mut R,
        output: &mut W,
    ) -> Result<Selection, GrittyError> {
        writeln!(output, "Suggested commit messages:").map_err(GrittyError::Input)?;
        for (i, candidate) in candidates.iter().enumerate() {
            let mut lines = candidate.lines();
            writeln!(output, "{}: {}", i + 1, lines.next().unwrap_or_default())
                .map_err(GrittyError::Input)?;
            for rest in lines {
                writeln!(output, "   {}", rest).map_err(GrittyError::Input)?;
            }
        }
        write!(
            output,
            "Select a commit message (1-{}), or press Enter to cancel: ",
            candidates.len()
        )
        .map_err(GrittyError::Input)?;
        output.flush().map_err(GrittyError::Input)?;

        let selection = match read_one_line(input)? {
            None => Selection::Cancelled,
            Some(line) if line.is_empty() => Selection::Cancelled,
            Some(line) => match parse_choice(&line, candidates.len()) {
                Some(index) => Selection::Selected {
                    index,
                    message: candidates[index - 1].clone(),
                },
                None => Selection::Invalid(line),
            },
        };

        match &selection {
            Selection::Selected { index, .. } => info!("User selected candidate {}", index),
            Selection::Cancelled => info!("User made no selection"),
            Selection::Invalid(raw) => info!("User entered invalid selection '{}'", raw),
        }
        Ok(selection)
    }

    /// Prompts for a commit message using stdin/stdout.
    ///
    /// This is a convenience wrapper around [`Self::select_with_io`].
    pub fn select(&self, candidates: &[String]) -> Result<Selection, GrittyError> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.select_with_io(candidates, &mut input, &mut output)
    }

    /// Shows provider `names` as a 1-indexed menu and returns the chosen name.
    ///
    /// # Errors
    ///
    /// [`GrittyError::InvalidChoice`] for blank, non-numeric or out-of-range
    /// input; [`GrittyError::Input`] if I/O fails.
    pub fn choose_provider_with_io<'a, R: BufRead, W: Write>(
        &self,
        names: &[&'a str],
        input: &mut R,
        output: &mut W,
    ) -> Result<&'a str, GrittyError> {
        writeln!(output, "Select a commit message provider:").map_err(GrittyError::Input)?;
        for (i, name) in names.iter().enumerate() {
            writeln!(output, "{}: {}", i + 1, name).map_err(GrittyError::Input)?;
        }
        write!(output, "Enter the number corresponding to your choice: ")
            .map_err(GrittyError::Input)?;
        output.flush().map_err(GrittyError::Input)?;

        let line = read_one_line(input)?.unwrap_or_default();
        let index = parse_choice(&line, names.len())
            .ok_or(GrittyError::InvalidChoice { max: names.len() })?;

        info!("User chose provider '{}'", names[index - 1]);
        Ok(names[index - 1])
    }
}
