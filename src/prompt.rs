//! Line-oriented prompts over any reader/writer pair.

use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    fn read_line(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}: ")
            .and_then(|_| self.output.flush())
            .map_err(Error::io("Failed to write prompt"))?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(Error::io("Failed to read input"))?;
        if read == 0 {
            return Err(Error::io("Failed to read input")(io::Error::from(
                io::ErrorKind::UnexpectedEof,
            )));
        }
        Ok(line.trim().to_string())
    }

    /// Ask until a non-empty answer is given.
    pub fn ask(&mut self, label: &str) -> Result<String> {
        loop {
            let line = self.read_line(label)?;
            if !line.is_empty() {
                return Ok(line);
            }
        }
    }

    pub fn ask_default(&mut self, label: &str, default: &str) -> Result<String> {
        let line = self.read_line(&format!("{label} [{default}]"))?;
        Ok(if line.is_empty() {
            default.to_string()
        } else {
            line
        })
    }

    pub fn ask_allow_empty(&mut self, label: &str) -> Result<String> {
        self.read_line(label)
    }

    pub fn ask_yes_no(&mut self, label: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let line = self.read_line(&format!("{label} [{hint}]"))?.to_lowercase();
            match line.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn ask_skips_blank_lines() {
        let mut p = prompter("\n  \ng\n");
        assert_eq!(p.ask("Bind to key").expect("ask"), "g");
        let shown = String::from_utf8(p.output().clone()).expect("utf8");
        assert_eq!(shown.matches("Bind to key: ").count(), 3);
    }

    #[test]
    fn ask_default_uses_default_on_empty() {
        let mut p = prompter("\nother\n");
        assert_eq!(p.ask_default("Save layout as", "hive").expect("a"), "hive");
        assert_eq!(p.ask_default("Save layout as", "hive").expect("b"), "other");
    }

    #[test]
    fn yes_no_reprompts_on_garbage() {
        let mut p = prompter("maybe\nYES\n");
        assert!(p.ask_yes_no("Add tmux keybinding", false).expect("yn"));
        let mut p = prompter("\n");
        assert!(!p.ask_yes_no("Add tmux keybinding", false).expect("yn"));
    }

    #[test]
    fn eof_is_an_error() {
        let mut p = prompter("");
        assert!(matches!(p.ask("Name"), Err(Error::Io { .. })));
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let mut p = prompter("hive");
        assert_eq!(p.ask("Name").expect("ask"), "hive");
    }
}
