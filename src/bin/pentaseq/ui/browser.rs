//! Melody browser - pick a saved melody and play it

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pentaseq::sequencing::{MelodyEntry, MelodyLibrary};

use super::Action;

#[derive(Debug, Clone, Default)]
pub struct Browser {
    entries: Vec<MelodyEntry>,
    selected: usize,
    /// Name of the melody last sent to the player
    loaded: Option<String>,
    status: Option<String>,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read the melody directory, keeping the selection in range.
    pub fn refresh(&mut self, library: &MelodyLibrary) {
        match library.scan() {
            Ok(entries) => self.entries = entries,
            Err(e) => {
                tracing::warn!("failed to list {}: {}", library.dir().display(), e);
                self.entries.clear();
                self.status = Some(format!("Cannot read {}: {e}", library.dir().display()));
            }
        }
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }

    pub fn set_loaded(&mut self, name: &str) {
        self.loaded = Some(name.to_string());
        self.status = None;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Up if !self.entries.is_empty() => {
                self.selected = (self.selected + self.entries.len() - 1) % self.entries.len();
            }
            KeyCode::Down if !self.entries.is_empty() => {
                self.selected = (self.selected + 1) % self.entries.len();
            }
            KeyCode::Enter => {
                if let Some(entry) = self.entries.get(self.selected) {
                    return Action::Load(entry.clone());
                }
            }
            KeyCode::Char(' ') => return Action::TogglePlayback,
            KeyCode::Char('e') => {
                if let Some(entry) = self.entries.get(self.selected) {
                    return Action::Edit(entry.clone());
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => return Action::ShowMenu,
            _ => {}
        }
        Action::None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let lines: Vec<Line> = if self.entries.is_empty() {
            vec![Line::from(Span::styled(
                " No melodies found",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let is_loaded = self.loaded.as_deref() == Some(entry.name.as_str());
                    let marker = if is_loaded { "♪ " } else { "  " };
                    let mut style = Style::default().fg(if is_loaded {
                        Color::Green
                    } else {
                        Color::White
                    });
                    if i == self.selected {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Line::from(Span::styled(format!("{marker}{}", entry.name), style))
                })
                .collect()
        };

        let block = Block::default()
            .title(" Melodies [Enter] play  [Space] play/stop  [e] edit  [q] back ")
            .borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

        if let Some(status) = &self.status {
            frame.render_widget(
                Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow)),
                chunks[1],
            );
        }
    }
}
