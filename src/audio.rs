//! Synthesized tick and win cues played through rodio.

use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Source};
use tracing::{debug, warn};

const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// Piecewise gain envelope: linear attack, exponential decay, silent tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub peak: f32,
    pub attack: f32,
    pub decay_end: f32,
    pub floor: f32,
}

impl Envelope {
    pub fn gain_at(&self, t: f32) -> f32 {
        if t < self.attack {
            return self.peak * (t / self.attack);
        }
        if t < self.decay_end {
            let span = (self.decay_end - self.attack).max(f32::EPSILON);
            let k = (t - self.attack) / span;
            return self.peak * (self.floor / self.peak).powf(k);
        }
        0.0
    }
}

/// A mono oscillator with an exponential frequency glide.
#[derive(Debug, Clone)]
pub struct Tone {
    waveform: Waveform,
    start_hz: f32,
    end_hz: f32,
    glide: f32,
    envelope: Envelope,
    phase: f32,
    sample: usize,
    total: usize,
}

impl Tone {
    pub fn new(waveform: Waveform, hz: f32, duration: Duration, envelope: Envelope) -> Self {
        Self {
            waveform,
            start_hz: hz,
            end_hz: hz,
            glide: 0.0,
            envelope,
            phase: 0.0,
            sample: 0,
            total: (duration.as_secs_f32() * SAMPLE_RATE as f32) as usize,
        }
    }

    /// Glide exponentially from the start frequency to `end_hz` over `over`.
    pub fn glide_to(mut self, end_hz: f32, over: Duration) -> Self {
        self.end_hz = end_hz;
        self.glide = over.as_secs_f32();
        self
    }

    pub fn frequency_at(&self, t: f32) -> f32 {
        if self.glide <= 0.0 || t >= self.glide {
            return if self.glide > 0.0 { self.end_hz } else { self.start_hz };
        }
        self.start_hz * (self.end_hz / self.start_hz).powf(t / self.glide)
    }

    fn oscillate(&self) -> f32 {
        match self.waveform {
            Waveform::Sine => (self.phase * std::f32::consts::TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        }
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.sample >= self.total {
            return None;
        }
        let t = self.sample as f32 / SAMPLE_RATE as f32;
        let value = self.oscillate() * self.envelope.gain_at(t);
        self.phase = (self.phase + self.frequency_at(t) / SAMPLE_RATE as f32).fract();
        self.sample += 1;
        Some(value)
    }
}

impl Source for Tone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total - self.sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(self.total as f32 / SAMPLE_RATE as f32))
    }
}

/// Short descending blip for a segment crossing.
pub fn tick_tone() -> Tone {
    let len = Duration::from_millis(50);
    Tone::new(
        Waveform::Sine,
        600.0,
        len,
        Envelope {
            peak: 0.1,
            attack: 0.0005,
            decay_end: 0.05,
            floor: 0.001,
        },
    )
    .glide_to(100.0, len)
}

/// C major arpeggio, each note offset from the start.
pub fn win_notes() -> Vec<(Duration, Tone)> {
    const NOTES: [f32; 4] = [523.25, 659.25, 783.99, 1046.50];
    NOTES
        .iter()
        .enumerate()
        .map(|(i, &hz)| {
            let tone = Tone::new(
                Waveform::Triangle,
                hz,
                Duration::from_millis(500),
                Envelope {
                    peak: 0.2,
                    attack: 0.05,
                    decay_end: 0.4,
                    floor: 0.001,
                },
            );
            (Duration::from_millis(100 * i as u64), tone)
        })
        .collect()
}

/// Owns the audio output for the lifetime of the view.
///
/// The device is opened up front so the first tick never waits on it.
/// If that fails the cues go silent.
pub struct AudioCues {
    muted: bool,
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl AudioCues {
    pub fn new(muted: bool) -> Self {
        let output = if muted {
            None
        } else {
            OutputStream::try_default()
                .map_err(|err| warn!(%err, "audio output unavailable, cues disabled"))
                .ok()
        };
        Self { muted, output }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn play_tick(&self) {
        self.play(tick_tone());
    }

    pub fn play_win(&self) {
        for (offset, tone) in win_notes() {
            self.play(tone.delay(offset));
        }
    }

    fn play<S>(&self, source: S)
    where
        S: Source<Item = f32> + Send + 'static,
    {
        let Some((_, handle)) = &self.output else {
            return;
        };
        if let Err(err) = handle.play_raw(source) {
            debug!(%err, "cue playback failed");
        }
    }
}
