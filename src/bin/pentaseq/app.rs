//! Pentaseq - main application builder and runner

use std::path::PathBuf;

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use pentaseq::{
    dsp::ToneConfig,
    runtime::{self, AudioConfig},
    sequencing::{library::DEFAULT_MAX_ENTRIES, MelodyLibrary},
};

use super::ui::UiApp;

/// Main application builder
pub struct Pentaseq {
    melody_dir: PathBuf,
    audio: AudioConfig,
    tone: ToneConfig,
    max_melodies: usize,
}

impl Pentaseq {
    pub fn new() -> Self {
        Self {
            melody_dir: PathBuf::from("."),
            audio: AudioConfig::default(),
            tone: ToneConfig::default(),
            max_melodies: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Directory melodies are saved to and browsed from
    pub fn melody_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.melody_dir = dir.into();
        self
    }

    /// Output stream parameters
    pub fn audio(mut self, audio: AudioConfig) -> Self {
        self.audio = audio;
        self
    }

    /// Envelope and amplitude of the synthesized tone
    pub fn tone(mut self, tone: ToneConfig) -> Self {
        self.tone = tone;
        self
    }

    /// Cap on how many melodies the browser lists
    pub fn max_melodies(mut self, max: usize) -> Self {
        self.max_melodies = max;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        tracing::info!(dir = %self.melody_dir.display(), "starting pentaseq");

        let library = MelodyLibrary::new(&self.melody_dir).with_max_entries(self.max_melodies);
        let (controller, renderer) = runtime::playback_pair(&self.audio, self.tone);

        // Without an output device there is nothing to do; fail before the
        // terminal is taken over so the error is readable.
        let output = runtime::open_output(self.audio, renderer)
            .wrap_err("failed to open the audio output")?;

        let mut app = UiApp::new(controller, library, output.config().sample_rate);
        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();

        output.close();
        tracing::info!("pentaseq exited");
        result
    }
}

impl Default for Pentaseq {
    fn default() -> Self {
        Self::new()
    }
}
