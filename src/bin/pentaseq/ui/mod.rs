//! TUI module for pentaseq
//!
//! Three screens (menu, editor, browser) over a shared transport panel and
//! audio visualization. Screens only turn keys into [`Action`]s; `UiApp`
//! carries them out against the player and the melody library.

mod browser;
mod editor;
mod menu;
mod spectrum;
mod transport;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

use pentaseq::{
    runtime::{PlaybackController, PlaybackStatus},
    sequencing::{Melody, MelodyEntry, MelodyLibrary},
};

use browser::Browser;
use editor::{describe_save, Editor};
use menu::Menu;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Editor,
    Browser,
}

/// What a key press asks the application to do.
#[derive(Debug, Clone)]
pub enum Action {
    None,
    Quit,
    ShowMenu,
    ShowBrowser,
    NewMelody,
    /// Open a saved melody in the editor
    Edit(MelodyEntry),
    Save { name: String, melody: Melody },
    /// Publish and start playing
    Play(Melody),
    /// Load from disk, publish and start playing
    Load(MelodyEntry),
    TogglePlayback,
}

pub struct UiApp {
    controller: PlaybackController,
    library: MelodyLibrary,
    screen: Screen,
    menu: Menu,
    editor: Editor,
    browser: Browser,
    /// Copy of the published melody, for display
    active: Option<Melody>,
    status: PlaybackStatus,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(controller: PlaybackController, library: MelodyLibrary, sample_rate: u32) -> Self {
        Self {
            controller,
            library,
            screen: Screen::Menu,
            menu: Menu::default(),
            editor: Editor::new(),
            browser: Browser::new(),
            active: None,
            status: PlaybackStatus::default(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.status = self.controller.poll_status();
            self.controller
                .drain_audio(&mut self.audio_buffer, VIS_BUFFER_SIZE);
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.controller.transport.stop_playback();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let action = match self.screen {
            Screen::Menu => self.menu.handle_key(key),
            Screen::Editor => self.editor.handle_key(key),
            Screen::Browser => self.browser.handle_key(key),
        };
        self.apply(action);
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::ShowMenu => self.screen = Screen::Menu,
            Action::ShowBrowser => {
                self.browser.refresh(&self.library);
                self.screen = Screen::Browser;
            }
            Action::NewMelody => {
                self.editor = Editor::new();
                self.screen = Screen::Editor;
            }
            Action::Edit(entry) => match self.library.load(&entry) {
                Ok(melody) => {
                    self.editor = Editor::from_melody(entry.name, melody);
                    self.screen = Screen::Editor;
                }
                Err(e) => {
                    tracing::warn!("failed to load {}: {}", entry.path.display(), e);
                    self.browser.set_status(format!("Failed to load {}: {e}", entry.name));
                }
            },
            Action::Save { name, melody } => {
                let result = self.library.save(&name, &melody);
                if let Err(e) = &result {
                    tracing::warn!("failed to save {:?}: {}", name, e);
                }
                self.editor.set_message(describe_save(&name, &result));
            }
            Action::Play(melody) => match self.play(melody) {
                Ok(()) => self.editor.set_message("Playing"),
                Err(e) => self.editor.set_message(format!("Cannot play: {e}")),
            },
            Action::Load(entry) => {
                let played = self
                    .library
                    .load(&entry)
                    .and_then(|melody| self.play(melody));
                match played {
                    Ok(()) => self.browser.set_loaded(&entry.name),
                    Err(e) => {
                        tracing::warn!("failed to play {}: {}", entry.path.display(), e);
                        self.browser.set_status(format!("Failed to load {}: {e}", entry.name));
                    }
                }
            }
            Action::TogglePlayback => {
                self.controller.transport.toggle();
            }
        }
    }

    fn play(&mut self, melody: Melody) -> pentaseq::Result<()> {
        self.controller.play(melody)?;
        self.active = self.controller.publisher.active();
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),    // Screen
                Constraint::Length(4),  // Transport
                Constraint::Length(10), // Waveform + spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let playing_step = self.status.is_playing.then_some(self.status.step_index);
        match self.screen {
            Screen::Menu => self.menu.render(frame, chunks[0]),
            Screen::Editor => self.editor.render(frame, chunks[0], playing_step),
            Screen::Browser => self.browser.render(frame, chunks[0]),
        }

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[1], self.active.as_ref(), &self.status, &stats);

        let vis = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        render_waveform(frame, vis[0], &self.audio_buffer);
        render_spectrum(frame, vis[1], &self.spectrum);

        let help = match self.screen {
            Screen::Menu => " [↑↓] Select  [Enter] Open  [Q] Quit",
            Screen::Editor => " [Tab] Fields/grid  [Esc] Menu",
            Screen::Browser => " [↑↓] Select  [Enter] Play  [Space] Play/Stop  [Q] Back",
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}
