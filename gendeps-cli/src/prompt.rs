//! Interactive prompts
//!
//! The orchestrator only talks to the user through [`Prompter`], so the dispatch logic
//! can be driven by scripted answers in tests.

use crate::error::{PromptSnafu, Result};
use snafu::ResultExt;
use std::io::{self, BufRead, Write};

/// ANSI sequence: erase the display and home the cursor
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Capability for talking to the person running the bootstrap
pub trait Prompter {
    /// Clear the terminal screen
    fn clear(&mut self) -> Result<()>;

    /// Print an informational line
    fn say(&mut self, message: &str) -> Result<()>;

    /// Ask a yes/no question; only `y` (any case) counts as yes
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Block until the user presses Enter
    fn acknowledge(&mut self, message: &str) -> Result<()>;
}

impl<T: Prompter + ?Sized> Prompter for &mut T {
    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn say(&mut self, message: &str) -> Result<()> {
        (**self).say(message)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        (**self).confirm(question)
    }

    fn acknowledge(&mut self, message: &str) -> Result<()> {
        (**self).acknowledge(message)
    }
}

/// Whether a typed answer means "yes"; only the line terminator is ignored
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim_end_matches(['\r', '\n'])
        .eq_ignore_ascii_case("y")
}

/// Line-oriented prompter over any reader/writer pair
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
    pause: bool,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            assume_yes: false,
            pause: true,
        }
    }

    /// Answer every yes/no question with yes without reading input
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// When false, "press Enter" acknowledgments return immediately
    pub fn pause(mut self, pause: bool) -> Self {
        self.pause = pause;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Read one line; EOF yields an empty answer
    fn read_answer(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }

    fn write_prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn clear(&mut self) -> Result<()> {
        self.write_prompt(CLEAR_SCREEN).context(PromptSnafu)
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}").context(PromptSnafu)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.write_prompt(&format!("{question}: ")).context(PromptSnafu)?;

        if self.assume_yes {
            writeln!(self.output, "y").context(PromptSnafu)?;
            return Ok(true);
        }

        let answer = self.read_answer().context(PromptSnafu)?;
        Ok(is_affirmative(&answer))
    }

    fn acknowledge(&mut self, message: &str) -> Result<()> {
        if !self.pause {
            return Ok(());
        }

        self.write_prompt(message).context(PromptSnafu)?;
        self.read_answer().context(PromptSnafu)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y\n"));
        assert!(is_affirmative("y\r\n"));
        assert!(!is_affirmative("  y \r\n"));
        assert!(!is_affirmative(" y"));
        assert!(!is_affirmative("y  \n"));
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_confirm_reads_one_line_per_question() {
        let mut p = prompter("Y\nn\n");
        assert!(p.confirm("Install dependencies? (y/N)").unwrap());
        assert!(!p.confirm("Install dependencies? (y/N)").unwrap());

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Install dependencies? (y/N): ").count(), 2);
    }

    #[test]
    fn test_confirm_at_eof_is_no() {
        let mut p = prompter("");
        assert!(!p.confirm("Run dependency installation? (y/n)").unwrap());
    }

    #[test]
    fn test_assume_yes_skips_input() {
        let mut p = prompter("n\n").assume_yes(true);
        assert!(p.confirm("Install dependencies? (y/N)").unwrap());
        // The scripted "n" is still there for the next read
        p.acknowledge("Press Enter to exit...").unwrap();

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Install dependencies? (y/N): y\n"));
    }

    #[test]
    fn test_acknowledge_consumes_a_line() {
        let mut p = prompter("anything\ny\n");
        p.acknowledge("Press Enter to continue").unwrap();
        assert!(p.confirm("again?").unwrap());
    }

    #[test]
    fn test_no_pause_does_not_block_or_print() {
        let mut p = prompter("y\n").pause(false);
        p.acknowledge("Press Enter to exit...").unwrap();
        assert!(p.confirm("still there?").unwrap());

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(!output.contains("Press Enter"));
    }

    #[test]
    fn test_clear_writes_escape_sequence() {
        let mut p = prompter("");
        p.clear().unwrap();
        assert_eq!(p.into_output(), CLEAR_SCREEN.as_bytes());
    }
}
