//! Terminal rendering of the markdown produced by the display types.

use std::io::{self, Write};

use anyhow::Result;
use termimad::{MadSkin, crossterm::style::Color};

const HEADER_COLOR: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

/// Renders markdown with termimad, or passes it through untouched.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown to stdout.
    pub fn render(&self, markdown: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render_to(&mut out, markdown)?;
        out.flush()?;
        Ok(())
    }

    /// Render markdown to any writer.
    ///
    /// Headers keep their leading hashes so IDs in "# 3. Title" stay
    /// readable; other lines are styled inline.
    pub fn render_to<W: Write>(&self, out: &mut W, markdown: &str) -> io::Result<()> {
        if !self.rich_enabled {
            return out.write_all(markdown.as_bytes());
        }

        for line in markdown.lines() {
            if line.starts_with('#') {
                writeln!(out, "{HEADER_COLOR}{line}{RESET}")?;
            } else {
                writeln!(out, "{}", self.skin.inline(line))?;
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
