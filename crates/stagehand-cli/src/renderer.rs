//! Terminal rendering of markdown output.
//!
//! Headers are colored by the outcome icon they carry, so a run's failed
//! steps stand out. Plain mode prints the markdown unchanged.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to the terminal
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        for line in markdown.lines() {
            if line.starts_with('#') {
                println!("\x1b[{}m{line}\x1b[0m", header_color(line));
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
        Ok(())
    }
}

/// ANSI foreground code for a header line.
fn header_color(line: &str) -> u8 {
    if line.contains('✗') {
        31
    } else if line.contains('✓') {
        32
    } else if line.contains('○') {
        33
    } else {
        34
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
