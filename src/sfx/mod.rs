//! Sound effects
//!
//! The game's effects are short synthesized tones, not samples. Each cue is a
//! list of [`Tone`]s with start offsets; [`render_tones`] mixes them into mono
//! PCM using a fast attack and an exponential decay:
//!
//! - gain 0 at the start, rising linearly to `volume` over 10 ms
//! - exponential decay to 0.0001 at `duration`
//! - the oscillator keeps running 20 ms past `duration`

mod wav;

pub use wav::write_wav;

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Sample rate used for rendered effects.
pub const SFX_SAMPLE_RATE: u32 = 44_100;

const ATTACK_SECONDS: f32 = 0.01;
const RELEASE_TAIL_SECONDS: f32 = 0.02;
const DECAY_FLOOR: f32 = 0.0001;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    /// Sine wave
    #[default]
    Sine,
    /// Square wave
    Square,
    /// Triangle wave
    Triangle,
    /// Rising sawtooth
    Sawtooth,
}

impl Waveform {
    /// Oscillator value in `[-1, 1]` at `phase` cycles (fractional part used)
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase.fract();
        match self {
            Waveform::Sine => (2.0 * PI * p).sin(),
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
            Waveform::Sawtooth => 2.0 * p - 1.0,
        }
    }
}

/// One enveloped oscillator burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f32,
    /// Seconds until the envelope reaches the decay floor
    pub duration: f32,
    /// Oscillator shape
    pub waveform: Waveform,
    /// Peak gain
    pub volume: f32,
    /// Start offset in seconds within the cue
    pub delay: f32,
}

impl Tone {
    /// A 0.15 s sine tone at gain 0.2
    pub fn new(frequency: f32) -> Self {
        Tone {
            frequency,
            duration: 0.15,
            waveform: Waveform::Sine,
            volume: 0.2,
            delay: 0.0,
        }
    }

    /// Set the duration
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    /// Set the waveform
    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Set the peak gain
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Set the start offset
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// Seconds from the tone's start until its oscillator stops
    pub fn length(&self) -> f32 {
        self.duration.max(0.0) + RELEASE_TAIL_SECONDS
    }

    /// Envelope gain at `t` seconds after the tone starts
    pub fn envelope(&self, t: f32) -> f32 {
        let peak = self.volume.max(DECAY_FLOOR);
        if t < 0.0 || t > self.length() {
            return 0.0;
        }
        if t < ATTACK_SECONDS {
            return peak * t / ATTACK_SECONDS;
        }
        let decay_span = (self.duration - ATTACK_SECONDS).max(f32::EPSILON);
        let progress = ((t - ATTACK_SECONDS) / decay_span).min(1.0);
        peak * (DECAY_FLOOR / peak).powf(progress)
    }
}

/// Named game sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfxCue {
    /// Menu button
    Click,
    /// Player jump
    Jump,
    /// Coin pickup (two blips)
    Coin,
    /// Player hit
    Hit,
    /// Level complete arpeggio
    Win,
    /// Falling two-note phrase
    GameOver,
    /// Power-up arpeggio
    PowerUp,
}

impl SfxCue {
    /// Every cue, in declaration order
    pub const ALL: [SfxCue; 7] = [
        SfxCue::Click,
        SfxCue::Jump,
        SfxCue::Coin,
        SfxCue::Hit,
        SfxCue::Win,
        SfxCue::GameOver,
        SfxCue::PowerUp,
    ];

    /// Lowercase cue name
    pub fn name(self) -> &'static str {
        match self {
            SfxCue::Click => "click",
            SfxCue::Jump => "jump",
            SfxCue::Coin => "coin",
            SfxCue::Hit => "hit",
            SfxCue::Win => "win",
            SfxCue::GameOver => "gameover",
            SfxCue::PowerUp => "powerup",
        }
    }

    /// Tones making up the cue
    pub fn tones(self) -> Vec<Tone> {
        match self {
            SfxCue::Click => vec![Tone::new(600.0)
                .duration(0.05)
                .waveform(Waveform::Square)
                .volume(0.15)],
            SfxCue::Jump => vec![Tone::new(420.0)
                .duration(0.12)
                .waveform(Waveform::Square)
                .volume(0.2)],
            SfxCue::Coin => vec![
                Tone::new(880.0)
                    .duration(0.06)
                    .waveform(Waveform::Triangle)
                    .volume(0.22),
                Tone::new(1320.0)
                    .duration(0.07)
                    .waveform(Waveform::Triangle)
                    .volume(0.2)
                    .delay(0.05),
            ],
            SfxCue::Hit => vec![Tone::new(180.0)
                .duration(0.2)
                .waveform(Waveform::Sawtooth)
                .volume(0.25)],
            SfxCue::Win => arpeggio(&[660.0, 880.0, 990.0, 1320.0], 0.09, |f| {
                Tone::new(f)
                    .duration(0.08)
                    .waveform(Waveform::Triangle)
                    .volume(0.2)
            }),
            SfxCue::GameOver => vec![
                Tone::new(300.0).duration(0.18).volume(0.22),
                Tone::new(220.0).duration(0.22).volume(0.22).delay(0.16),
            ],
            SfxCue::PowerUp => arpeggio(&[523.0, 659.0, 784.0], 0.07, |f| {
                Tone::new(f)
                    .duration(0.06)
                    .waveform(Waveform::Square)
                    .volume(0.18)
            }),
        }
    }
}

fn arpeggio(notes: &[f32], step: f32, tone: impl Fn(f32) -> Tone) -> Vec<Tone> {
    notes
        .iter()
        .enumerate()
        .map(|(i, &f)| tone(f).delay(i as f32 * step))
        .collect()
}

impl fmt::Display for SfxCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SfxCue {
    type Err = crate::MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace(['-', '_'], "");
        SfxCue::ALL
            .into_iter()
            .find(|cue| cue.name() == normalized)
            .ok_or_else(|| crate::MusicError::Config(format!("Unknown sound effect '{}'", s)))
    }
}

/// Mix tones into mono samples in `[-1, 1]`
pub fn render_tones(tones: &[Tone], sample_rate: u32) -> Vec<f32> {
    if tones.is_empty() || sample_rate == 0 {
        return Vec::new();
    }
    let rate = sample_rate as f32;
    let total_seconds = tones
        .iter()
        .map(|t| t.delay.max(0.0) + t.length())
        .fold(0.0f32, f32::max);
    let mut samples = vec![0.0f32; (total_seconds * rate).ceil() as usize];

    for tone in tones {
        let start = (tone.delay.max(0.0) * rate).round() as usize;
        let len = (tone.length() * rate).ceil() as usize;
        let end = (start + len).min(samples.len());
        for (n, out) in samples[start..end].iter_mut().enumerate() {
            let t = n as f32 / rate;
            *out += tone.waveform.sample(tone.frequency * t) * tone.envelope(t);
        }
    }

    for s in samples.iter_mut() {
        *s = s.clamp(-1.0, 1.0);
    }
    samples
}

/// Render a cue at `sample_rate`
pub fn render_cue(cue: SfxCue, sample_rate: u32) -> Vec<f32> {
    render_tones(&cue.tones(), sample_rate)
}
