//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the latest rendered samples, read out at
//! log-spaced frequencies over the range the melodies actually use.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Number of frequency points to display
const SPECTRUM_POINTS: usize = 64;
/// Lowest displayed frequency (Hz)
const MIN_FREQ: f64 = 40.0;
/// Highest displayed frequency (Hz); pentatonic melodies rarely go above
const MAX_FREQ: f64 = 4_000.0;
/// Floor for silent bins (dB)
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin read for each display point
    bins: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude dB) pairs for the chart
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `fft_len` must match the length of buffers passed to [`update`](Self::update).
    pub fn new(fft_len: usize, sample_rate: u32) -> Self {
        let fft_len = fft_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let denom = (fft_len - 1) as f32;
        let window = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = sample_rate as f64 / 2.0;
        let top = MAX_FREQ.min(nyquist).max(MIN_FREQ);
        let last_bin = fft_len / 2 - 1;

        let mut bins = Vec::with_capacity(SPECTRUM_POINTS);
        let mut points = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
            let freq = MIN_FREQ * (top / MIN_FREQ).powf(t);
            let bin = (freq * fft_len as f64 / sample_rate as f64).round() as usize;
            bins.push(bin.min(last_bin));
            points.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bins,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            points,
        }
    }

    /// Recompute from the newest samples. Buffers of the wrong length are
    /// ignored (the ring has not filled yet).
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &bin) in self.points.iter_mut().zip(&self.bins) {
            let power = self.scratch[bin].norm_sqr().max(1e-12) as f64;
            point.1 = (10.0 * power.log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Frequency of the loudest display point.
    pub fn peak_frequency(&self) -> Option<f64> {
        self.points
            .iter()
            .filter(|(_, db)| *db > FLOOR_DB)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(log_freq, _)| 10f64.powf(*log_freq))
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &SpectrumAnalyzer) {
    let title = match spectrum.peak_frequency() {
        Some(freq) => format!(" Spectrum  peak ~{freq:.0} Hz "),
        None => " Spectrum ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum.data());

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([MIN_FREQ.log10(), MAX_FREQ.log10()])
                .labels(vec!["40", "400", "4k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 40.0])
                .labels(vec!["-100", "-30", "40"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_stays_at_floor() {
        let mut analyzer = SpectrumAnalyzer::new(1024, 48_000);
        analyzer.update(&[0.0; 1024]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == FLOOR_DB));
        assert_eq!(analyzer.peak_frequency(), None);
    }

    #[test]
    fn finds_a_sine_peak() {
        let sample_rate = 48_000;
        let freq = 440.0f32;
        let samples: Vec<f32> = (0..4096)
            .map(|i| 0.5 * (std::f32::consts::TAU * freq * i as f32 / sample_rate as f32).sin())
            .collect();

        let mut analyzer = SpectrumAnalyzer::new(samples.len(), sample_rate);
        analyzer.update(&samples);
        let peak = analyzer.peak_frequency().unwrap();
        assert!((peak - 440.0).abs() < 40.0, "peak at {peak}");
    }

    #[test]
    fn wrong_length_is_ignored() {
        let mut analyzer = SpectrumAnalyzer::new(1024, 48_000);
        analyzer.update(&[0.5; 100]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == FLOOR_DB));
    }
}
