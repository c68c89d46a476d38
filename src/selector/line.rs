//! Line-based fallback: numbered list, typed filter, typed selection.

use std::io::{BufRead, Write};

use super::filter::rank;
use super::{SelectableOption, Selector};
use crate::error::{Error, Result};
use crate::prompt::Prompter;

const CANCEL_TOKENS: &[&str] = &["q", "quit", "exit"];

pub struct LineSelector<'p, R, W> {
    prompter: &'p mut Prompter<R, W>,
}

impl<'p, R: BufRead, W: Write> LineSelector<'p, R, W> {
    pub fn new(prompter: &'p mut Prompter<R, W>) -> Self {
        Self { prompter }
    }

    fn print_list(&mut self, title: &str, query: &str, shown: &[&SelectableOption]) -> Result<()> {
        let out = self.prompter.output();
        let mut text = format!("\n{title}\n");
        text.push_str("(type a number to select, text to filter, empty to reset, q to cancel)\n");
        if !query.is_empty() {
            text.push_str(&format!("Filter: {query}\n"));
        }
        if shown.is_empty() {
            text.push_str("  no matches\n");
        }
        for (i, option) in shown.iter().enumerate() {
            match option.detail.as_deref().map(str::trim) {
                Some(detail) if !detail.is_empty() => {
                    text.push_str(&format!("  {}) {} ({detail})\n", i + 1, option.label));
                }
                _ => text.push_str(&format!("  {}) {}\n", i + 1, option.label)),
            }
        }
        out.write_all(text.as_bytes())
            .map_err(Error::io("Failed to print options"))
    }
}

impl<R: BufRead, W: Write> Selector for LineSelector<'_, R, W> {
    fn select(&mut self, title: &str, options: &[SelectableOption]) -> Result<Option<String>> {
        let mut query = String::new();
        loop {
            let shown = rank(options, &query);
            self.print_list(title, &query, &shown)?;

            loop {
                let input = self.prompter.ask_allow_empty("Select")?;
                if CANCEL_TOKENS.contains(&input.to_lowercase().as_str()) {
                    return Ok(None);
                }
                match input.parse::<usize>() {
                    Ok(n) if (1..=shown.len()).contains(&n) => {
                        return Ok(Some(shown[n - 1].id.clone()));
                    }
                    Ok(_) => {
                        writeln!(self.prompter.output(), "Invalid selection.")
                            .map_err(Error::io("Failed to print options"))?;
                    }
                    Err(_) => {
                        query = input;
                        break;
                    }
                }
            }
        }
    }
}
