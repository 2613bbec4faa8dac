//! Transport panel - tempo, scale, start note, step strip and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pentaseq::{
    runtime::PlaybackStatus,
    sequencing::{notes::note_name, Melody},
    STEPS,
};

/// Audio statistics for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the transport panel for the active melody, if any.
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    melody: Option<&Melody>,
    status: &PlaybackStatus,
    stats: &AudioStats,
) {
    let block = Block::default().title(" Transport ").borders(Borders::ALL);

    let (play_symbol, play_label, play_color) = if status.is_playing {
        ("▶", "Playing", Color::Green)
    } else {
        ("■", "Stopped", Color::Yellow)
    };

    let mut header = vec![Span::styled(
        format!(" {play_symbol} {play_label}  "),
        Style::default().fg(play_color),
    )];
    match melody {
        Some(melody) => {
            header.push(Span::styled(
                format!("{} bpm  ", melody.tempo()),
                Style::default().fg(Color::Cyan),
            ));
            header.push(Span::styled(
                format!("{}  ", melody.scale().name()),
                Style::default().fg(Color::White),
            ));
            header.push(Span::styled(
                format!("from {}  ", note_name(melody.start_note())),
                Style::default().fg(Color::White),
            ));
        }
        None => header.push(Span::styled(
            "no melody loaded  ",
            Style::default().fg(Color::DarkGray),
        )),
    }
    header.push(Span::styled(
        format!(
            "Env: {:.2}  Peak: {:.2}  RMS: {:.2}",
            status.envelope_level, stats.peak, stats.rms
        ),
        Style::default().fg(Color::Magenta),
    ));

    let mut strip = vec![Span::raw(" ")];
    for step in 0..STEPS {
        let value = melody.map_or(0, |m| m.step(step));
        let label = if value == 0 {
            " · ".to_string()
        } else {
            format!(" {value} ")
        };
        let style = if melody.is_some() && status.is_playing && step == status.step_index {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else if value == 0 {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        strip.push(Span::styled(label, style));
    }

    let paragraph = Paragraph::new(vec![Line::from(header), Line::from(strip)]).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_empty_buffer_are_zero() {
        assert_eq!(
            AudioStats::from_buffer(&[]),
            AudioStats { peak: 0.0, rms: 0.0 }
        );
    }

    #[test]
    fn stats_track_peak_and_rms() {
        let stats = AudioStats::from_buffer(&[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(stats.peak, 0.5);
        assert!((stats.rms - 0.5).abs() < 1e-6);
    }
}
