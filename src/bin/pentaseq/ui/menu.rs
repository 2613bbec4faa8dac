//! Main menu

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::Action;

const ITEMS: [&str; 3] = ["Write melody", "Play melody", "Exit"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Menu {
    selected: usize,
}

impl Menu {
    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Up => self.selected = (self.selected + ITEMS.len() - 1) % ITEMS.len(),
            KeyCode::Down => self.selected = (self.selected + 1) % ITEMS.len(),
            KeyCode::Enter => {
                return match self.selected {
                    0 => Action::NewMelody,
                    1 => Action::ShowBrowser,
                    _ => Action::Quit,
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::raw("")];
        for (i, item) in ITEMS.iter().enumerate() {
            let style = if i == self.selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(format!("  {item}  "), style)));
        }

        let block = Block::default().title(" pentaseq ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_picks_each_item() {
        let mut menu = Menu::default();
        assert!(matches!(menu.handle_key(KeyCode::Enter), Action::NewMelody));
        menu.handle_key(KeyCode::Down);
        assert!(matches!(menu.handle_key(KeyCode::Enter), Action::ShowBrowser));
        menu.handle_key(KeyCode::Down);
        assert!(matches!(menu.handle_key(KeyCode::Enter), Action::Quit));
    }

    #[test]
    fn selection_wraps() {
        let mut menu = Menu::default();
        menu.handle_key(KeyCode::Up);
        assert!(matches!(menu.handle_key(KeyCode::Enter), Action::Quit));
    }
}
