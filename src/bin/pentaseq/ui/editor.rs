//! Melody editor - header fields plus the 16 x 6 step grid

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pentaseq::{
    sequencing::{
        melody::DEFAULT_TEMPO,
        notes::{note_name, C3},
        scale::MAX_STEP,
        Melody, Scale,
    },
    Error, STEPS,
};

use super::Action;

/// Header fields, in entry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Tempo,
    Scale,
    StartNote,
}

impl Field {
    const ALL: [Field; 4] = [Field::Name, Field::Tempo, Field::Scale, Field::StartNote];

    fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Tempo => "Tempo (bpm)",
            Field::Scale => "Scale (1 major, 2 minor)",
            Field::StartNote => "Start note",
        }
    }

    fn next(self) -> Option<Field> {
        match self {
            Field::Name => Some(Field::Tempo),
            Field::Tempo => Some(Field::Scale),
            Field::Scale => Some(Field::StartNote),
            Field::StartNote => None,
        }
    }

    fn accepts(self, c: char) -> bool {
        match self {
            Field::Name => c.is_ascii_alphanumeric() || c == '-' || c == '_',
            Field::Tempo | Field::Scale => c.is_ascii_digit(),
            Field::StartNote => c.is_ascii_digit() || c == '-',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Grid,
}

/// Editor state. Key handling is pure; side effects come back as [`Action`]s.
#[derive(Debug, Clone)]
pub struct Editor {
    name: String,
    inputs: [String; 4],
    focus: Focus,
    melody: Melody,
    /// Step column under the cursor (0..16)
    cursor_step: usize,
    /// Degree row under the cursor (1..=6)
    cursor_degree: u8,
    message: Option<String>,
}

impl Editor {
    pub fn new() -> Self {
        let melody = Melody::default();
        Self::from_melody(String::new(), melody)
    }

    /// Open an existing melody with the header already filled in.
    pub fn from_melody(name: String, melody: Melody) -> Self {
        let inputs = [
            name.clone(),
            melody.tempo().to_string(),
            melody.scale().code().to_string(),
            melody.start_note().to_string(),
        ];
        Self {
            name,
            inputs,
            focus: Focus::Field(Field::Name),
            melody,
            cursor_step: 0,
            cursor_degree: 1,
            message: None,
        }
    }

    /// Show a status message under the grid.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        match self.focus {
            Focus::Field(field) => self.handle_field_key(field, key),
            Focus::Grid => self.handle_grid_key(key),
        }
    }

    fn handle_field_key(&mut self, field: Field, key: KeyCode) -> Action {
        let input = &mut self.inputs[field as usize];
        match key {
            KeyCode::Esc => return Action::ShowMenu,
            KeyCode::Char(c) if field.accepts(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Left | KeyCode::Right if field == Field::Scale => {
                let scale = Scale::from_code(input.parse().unwrap_or(1))
                    .unwrap_or_default()
                    .toggled();
                *input = scale.code().to_string();
            }
            KeyCode::Up | KeyCode::BackTab => {
                if let Some(pos) = Field::ALL.iter().position(|&f| f == field) {
                    if pos > 0 {
                        self.focus = Focus::Field(Field::ALL[pos - 1]);
                    }
                }
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => match self.commit(field) {
                Ok(()) => {
                    self.message = None;
                    self.focus = field.next().map_or(Focus::Grid, Focus::Field);
                }
                Err(e) => self.message = Some(e),
            },
            _ => {}
        }
        Action::None
    }

    /// Validate one header field and apply it to the melody.
    fn commit(&mut self, field: Field) -> Result<(), String> {
        let input = self.inputs[field as usize].trim();
        match field {
            Field::Name => {
                if input.is_empty() {
                    return Err("Enter a name to save the melody under".into());
                }
                self.name = input.to_string();
            }
            Field::Tempo => {
                let tempo = if input.is_empty() {
                    DEFAULT_TEMPO
                } else {
                    input
                        .parse::<u32>()
                        .map_err(|_| format!("Tempo must be a whole number, got {input:?}"))?
                };
                self.melody.set_tempo(tempo).map_err(|e| e.to_string())?;
            }
            Field::Scale => {
                let code = input
                    .parse::<i64>()
                    .map_err(|_| "Scale must be 1 (major) or 2 (minor)".to_string())?;
                let scale = Scale::from_code(code).map_err(|e| e.to_string())?;
                self.melody.set_scale(scale);
            }
            Field::StartNote => {
                let note = if input.is_empty() {
                    C3
                } else {
                    input
                        .parse::<i32>()
                        .map_err(|_| format!("Start note must be a number, got {input:?}"))?
                };
                self.melody.set_start_note(note).map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }

    fn handle_grid_key(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Left => self.cursor_step = (self.cursor_step + STEPS - 1) % STEPS,
            KeyCode::Right => self.cursor_step = (self.cursor_step + 1) % STEPS,
            // Row 1 is drawn at the bottom, so Up raises the degree
            KeyCode::Up => self.cursor_degree = self.cursor_degree % MAX_STEP + 1,
            KeyCode::Down => {
                self.cursor_degree = (self.cursor_degree + MAX_STEP - 2) % MAX_STEP + 1
            }
            KeyCode::Enter => self.toggle_step(),
            KeyCode::Tab | KeyCode::BackTab => self.focus = Focus::Field(Field::Name),
            KeyCode::F(1) | KeyCode::Char('s') => {
                return Action::Save {
                    name: self.name.clone(),
                    melody: self.melody.clone(),
                }
            }
            KeyCode::Char('p') => return Action::Play(self.melody.clone()),
            KeyCode::Char(' ') => return Action::TogglePlayback,
            KeyCode::Char('b') => return Action::ShowBrowser,
            KeyCode::Esc => return Action::ShowMenu,
            KeyCode::Char('q') => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    /// Set the cursor's degree on its step, or clear it back to a rest if
    /// it is already set.
    fn toggle_step(&mut self) {
        let current = self.melody.step(self.cursor_step);
        let next = if current == self.cursor_degree {
            0
        } else {
            self.cursor_degree
        };
        if let Err(e) = self.melody.set_step(self.cursor_step, next) {
            self.message = Some(e.to_string());
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, playing_step: Option<usize>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Header fields
                Constraint::Min(8),    // Grid
                Constraint::Length(1), // Status line
            ])
            .split(area);

        self.render_fields(frame, chunks[0]);
        self.render_grid(frame, chunks[1], playing_step);

        let status = self.message.as_deref().unwrap_or("");
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Yellow)),
            chunks[2],
        );
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = Field::ALL
            .iter()
            .map(|&field| {
                let focused = self.focus == Focus::Field(field);
                let marker = if focused { "> " } else { "  " };
                let style = if focused {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let mut spans = vec![
                    Span::styled(format!("{marker}{:<26}", field.label()), style),
                    Span::styled(self.inputs[field as usize].clone(), style),
                ];
                if field == Field::StartNote {
                    spans.push(Span::styled(
                        format!("  ({})", note_name(self.melody.start_note())),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            })
            .collect();

        let block = Block::default().title(" Melody ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect, playing_step: Option<usize>) {
        let grid_focused = self.focus == Focus::Grid;
        let mut lines = Vec::with_capacity(MAX_STEP as usize + 1);

        for degree in (1..=MAX_STEP).rev() {
            let mut spans = vec![Span::styled(
                format!(" {degree} "),
                Style::default().fg(Color::DarkGray),
            )];
            for step in 0..STEPS {
                let set = self.melody.step(step) == degree;
                let under_cursor =
                    grid_focused && step == self.cursor_step && degree == self.cursor_degree;
                let mut style = if set {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                if playing_step == Some(step) {
                    style = style.bg(Color::Rgb(40, 40, 60));
                }
                if under_cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let cell = if set { "[#]" } else { " . " };
                spans.push(Span::styled(cell, style));
            }
            lines.push(Line::from(spans));
        }

        let numbers: String = (1..=STEPS).map(|n| format!("{n:^3}")).collect();
        lines.push(Line::from(Span::styled(
            format!("   {numbers}"),
            Style::default().fg(Color::DarkGray),
        )));

        let title = if grid_focused {
            " Steps [Enter] set/clear  [s/F1] save  [p] play  [Space] stop  [b] browse  [q] quit "
        } else {
            " Steps "
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Message for a save attempt, shown in the editor status line.
pub fn describe_save(name: &str, result: &pentaseq::Result<std::path::PathBuf>) -> String {
    match result {
        Ok(path) => format!("Saved {}", path.display()),
        Err(Error::InvalidMelodyName(_)) if name.is_empty() => {
            "Enter a name before saving".to_string()
        }
        Err(e) => format!("Save failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut Editor, s: &str) {
        for c in s.chars() {
            editor.handle_key(KeyCode::Char(c));
        }
    }

    fn filled(name: &str) -> Editor {
        let mut editor = Editor::new();
        editor.inputs = Default::default();
        type_str(&mut editor, name);
        editor.handle_key(KeyCode::Enter);
        type_str(&mut editor, "90");
        editor.handle_key(KeyCode::Enter);
        type_str(&mut editor, "2");
        editor.handle_key(KeyCode::Enter);
        type_str(&mut editor, "60");
        editor.handle_key(KeyCode::Enter);
        editor
    }

    #[test]
    fn fields_lead_into_grid() {
        let editor = filled("tune");
        assert_eq!(editor.focus, Focus::Grid);
        assert_eq!(editor.melody.tempo(), 90);
        assert_eq!(editor.melody.scale(), Scale::Minor);
        assert_eq!(editor.melody.start_note(), 60);
        assert_eq!(editor.name, "tune");
    }

    #[test]
    fn invalid_tempo_stays_on_field() {
        let mut editor = Editor::new();
        editor.focus = Focus::Field(Field::Tempo);
        editor.inputs[Field::Tempo as usize].clear();
        type_str(&mut editor, "10");
        editor.handle_key(KeyCode::Enter);
        assert_eq!(editor.focus, Focus::Field(Field::Tempo));
        assert!(editor.message.is_some());
        assert_eq!(editor.melody.tempo(), DEFAULT_TEMPO);
    }

    #[test]
    fn arrows_toggle_scale_field() {
        let mut editor = Editor::new();
        editor.focus = Focus::Field(Field::Scale);
        editor.handle_key(KeyCode::Right);
        assert_eq!(editor.inputs[Field::Scale as usize], "2");
        editor.handle_key(KeyCode::Left);
        assert_eq!(editor.inputs[Field::Scale as usize], "1");
    }

    #[test]
    fn huge_start_note_stays_on_field() {
        let mut editor = Editor::new();
        editor.focus = Focus::Field(Field::StartNote);
        editor.inputs[Field::StartNote as usize].clear();
        type_str(&mut editor, "2147483647");
        editor.handle_key(KeyCode::Enter);
        assert_eq!(editor.focus, Focus::Field(Field::StartNote));
        assert_eq!(editor.melody.start_note(), 48);
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let mut editor = Editor::new();
        editor.focus = Focus::Field(Field::Scale);
        editor.inputs[Field::Scale as usize].clear();
        type_str(&mut editor, "3");
        editor.handle_key(KeyCode::Enter);
        assert_eq!(editor.focus, Focus::Field(Field::Scale));
    }

    #[test]
    fn enter_sets_then_clears_step() {
        let mut editor = filled("tune");
        editor.handle_key(KeyCode::Up);
        editor.handle_key(KeyCode::Up);
        assert_eq!((editor.cursor_step, editor.cursor_degree), (0, 3));
        editor.handle_key(KeyCode::Enter);
        assert_eq!(editor.melody.step(0), 3);

        editor.handle_key(KeyCode::Down);
        editor.handle_key(KeyCode::Enter);
        assert_eq!(editor.melody.step(0), 2);

        editor.handle_key(KeyCode::Enter);
        assert_eq!(editor.melody.step(0), 0);
    }

    #[test]
    fn cursor_wraps_at_edges() {
        let mut editor = filled("tune");
        editor.handle_key(KeyCode::Left);
        editor.handle_key(KeyCode::Down);
        assert_eq!((editor.cursor_step, editor.cursor_degree), (STEPS - 1, MAX_STEP));
        editor.handle_key(KeyCode::Right);
        editor.handle_key(KeyCode::Up);
        assert_eq!((editor.cursor_step, editor.cursor_degree), (0, 1));
    }

    #[test]
    fn grid_keys_map_to_distinct_actions() {
        let mut editor = filled("tune");
        assert!(matches!(
            editor.handle_key(KeyCode::Char('s')),
            Action::Save { ref name, .. } if name == "tune"
        ));
        assert!(matches!(editor.handle_key(KeyCode::F(1)), Action::Save { .. }));
        assert!(matches!(editor.handle_key(KeyCode::Char('p')), Action::Play(_)));
        assert!(matches!(editor.handle_key(KeyCode::Char('b')), Action::ShowBrowser));
        assert!(matches!(editor.handle_key(KeyCode::Char('q')), Action::Quit));
        assert!(matches!(editor.handle_key(KeyCode::Esc), Action::ShowMenu));
    }

    #[test]
    fn q_is_typed_into_the_name() {
        let mut editor = Editor::new();
        editor.inputs = Default::default();
        assert!(matches!(editor.handle_key(KeyCode::Char('q')), Action::None));
        assert_eq!(editor.inputs[Field::Name as usize], "q");
    }
}
