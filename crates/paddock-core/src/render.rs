use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::board::{BoardBody, BoardPage, BoardView, Tab};
use crate::config::Config;
use crate::presentation::{Badge, TaskCard, Tone};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_board(&self, view: &BoardView) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_board(&mut out, view)
    }

    pub fn write_board<W: Write>(&self, mut out: W, view: &BoardView) -> anyhow::Result<()> {
        match view {
            BoardView::Loading => writeln!(out, "Loading animal data...")?,
            BoardView::NotFound => {
                writeln!(out, "{}", self.paint("Error", "1;31"))?;
                writeln!(out, "Animal not found")?;
                writeln!(out, "Back to Animals: /animals")?;
            }
            BoardView::Ready(page) => self.write_page(&mut out, page)?,
        }
        Ok(())
    }

    fn write_page<W: Write>(&self, out: &mut W, page: &BoardPage) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&page.title, "1"))?;
        self.write_tabs(out, &page.tabs)?;
        writeln!(out)?;

        match &page.body {
            BoardBody::Empty(empty) => {
                writeln!(out, "  {}", empty.heading)?;
                writeln!(out, "  {}", empty.message)?;
                writeln!(out, "  Add Task: /animals/{}/tasks/new", page.animal_id)?;
            }
            BoardBody::Cards(cards) => {
                for card in cards {
                    self.write_card(out, card)?;
                    writeln!(out)?;
                }
            }
        }

        if let Some(confirm) = &page.confirm {
            writeln!(out, "{}", self.paint(confirm.title, "1"))?;
            writeln!(out, "{}", confirm.description)?;
            writeln!(out, "Task: {}", confirm.task_title)?;
        }

        Ok(())
    }

    fn write_tabs<W: Write>(&self, out: &mut W, tabs: &[Tab]) -> anyhow::Result<()> {
        let mut labels = String::new();
        let mut underline = String::new();

        for tab in tabs {
            let text = format!(" {} ({}) ", tab.label, tab.count);
            let width = UnicodeWidthStr::width(text.as_str());
            if tab.active {
                labels.push_str(&self.paint(&text, "7"));
                underline.push_str(&"‾".repeat(width));
            } else {
                labels.push_str(&text);
                underline.push_str(&" ".repeat(width));
            }
            labels.push(' ');
            underline.push(' ');
        }

        writeln!(out, "{}", labels.trim_end())?;
        writeln!(out, "{}", underline.trim_end())?;
        Ok(())
    }

    fn write_card<W: Write>(&self, out: &mut W, card: &TaskCard) -> anyhow::Result<()> {
        if card.past_due {
            writeln!(out, "  {}", self.paint("⚠ Past due", "31"))?;
        }
        writeln!(out, "  {}  [{}]", self.paint(&card.title, "1"), card.task_id)?;

        let due = if card.past_due {
            self.paint(&card.due, "31")
        } else {
            card.due.clone()
        };
        writeln!(out, "    {} · {}", card.created, due)?;

        for line in card.description.lines() {
            writeln!(out, "    {line}")?;
        }

        if !card.badges.is_empty() {
            let badges = card
                .badges
                .iter()
                .map(|badge| self.badge(badge))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(out, "    {badges}")?;
        }

        Ok(())
    }

    fn badge(&self, badge: &Badge) -> String {
        let text = match badge.icon {
            Some(icon) => format!("{} {}", icon.glyph(), badge.label),
            None => badge.label.clone(),
        };
        match badge.tone {
            Some(tone) => self.paint(&text, tone.ansi_code()),
            None => self.paint(&text, Tone::Gray.ansi_code()),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}
