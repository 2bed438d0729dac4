use std::f32::consts::TAU;
use std::sync::Arc;

use super::config::VoiceConfig;
use super::envelope::{EnvState, Envelope};
use super::loudness::equal_loudness_weight;
use super::oscillator::{Oscillator, Waveform};
use super::wavetable::Wavetable;

/// Frequency ratio for a detune offset in cents.
pub fn detune_ratio(cents: f32) -> f32 {
    2.0f32.powf(cents / 1200.0)
}

/// What a voice reads for its signal. Parametric kinds run a pair of
/// oscillators; `Wavetable` reads a shared table by phase accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Sine,
    Square,
    Saw,
    Wavetable,
}

impl SourceKind {
    fn waveform(self) -> Option<Waveform> {
        match self {
            SourceKind::Sine => Some(Waveform::Sine),
            SourceKind::Square => Some(Waveform::Square),
            SourceKind::Saw => Some(Waveform::Saw),
            SourceKind::Wavetable => None,
        }
    }
}

/// One playable synthesis unit, mapped to one key slot. A voice is reused
/// across unrelated notes over its lifetime; `process` renders one sample.
pub struct Voice {
    slot: usize,
    frequency: f32,
    source: SourceKind,
    /// Primary and detuned oscillators for the parametric kinds.
    oscs: Option<(Oscillator, Oscillator)>,
    wavetable: Option<Arc<Wavetable>>,
    phase: f64,
    phase_detuned: f64,
    envelope: Envelope,
    detune_cents: f32,
    trem_rate: f32,
    trem_depth: f32,
    trem_phase: f32,
    last_raw: f32,
}

impl Voice {
    pub fn new(slot: usize, frequency: f32, config: VoiceConfig) -> Self {
        let mut voice = Self {
            slot,
            frequency: frequency.max(1e-6),
            source: SourceKind::Sine,
            oscs: None,
            wavetable: None,
            phase: 0.0,
            phase_detuned: 0.0,
            envelope: Envelope::new(config),
            detune_cents: 0.0,
            trem_rate: 0.0,
            trem_depth: 0.0,
            trem_phase: 0.0,
            last_raw: 0.0,
        };
        voice.set_source_kind(SourceKind::Sine);
        voice
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn env_state(&self) -> EnvState {
        self.envelope.state()
    }

    pub fn gain(&self) -> f32 {
        self.envelope.gain()
    }

    /// Last raw (pre-gain) sample, for the diagnostics sampler.
    pub fn last_sample(&self) -> f32 {
        self.last_raw
    }

    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz.max(1e-6);
    }

    /// Switching kind discards prior playback state. An installed wavetable
    /// is kept so switching back resumes table playback.
    pub fn set_source_kind(&mut self, kind: SourceKind) {
        self.source = kind;
        self.oscs = kind
            .waveform()
            .map(|w| (Oscillator::new(w), Oscillator::new(w)));
        self.phase = 0.0;
        self.phase_detuned = 0.0;
    }

    /// Install a shared table and switch to wavetable playback.
    pub fn set_wavetable(&mut self, table: Arc<Wavetable>) {
        self.source = SourceKind::Wavetable;
        self.oscs = None;
        self.wavetable = Some(table);
        self.phase = 0.0;
        self.phase_detuned = 0.0;
    }

    pub fn set_detune(&mut self, cents: f32) {
        self.detune_cents = cents;
    }

    pub fn set_tremolo(&mut self, rate: f32, depth: f32) {
        self.trem_rate = rate.clamp(0.0, 1.0);
        self.trem_depth = depth.clamp(0.0, 1.0);
    }

    pub fn note_on(&mut self, intensity: f32) {
        self.envelope.note_on(intensity);
    }

    pub fn note_move(&mut self, intensity: f32) {
        self.envelope.note_move(intensity);
    }

    /// Release: immediate for wavetable playback, deferred to a near-zero
    /// crossing for the parametric oscillators.
    pub fn note_off(&mut self) {
        if self.source == SourceKind::Wavetable {
            self.envelope.release_now();
        } else {
            self.envelope.release_deferred();
        }
    }

    /// Render one sample.
    pub fn process(&mut self, sample_rate: f32) -> f32 {
        if !self.envelope.is_active() {
            return 0.0;
        }
        let sample_rate = sample_rate.max(1.0);
        let gain = self.envelope.advance(sample_rate);

        let ratio = detune_ratio(self.detune_cents);
        let raw = match (&mut self.oscs, &self.wavetable) {
            (Some((primary, detuned)), _) => {
                let a = primary.tick(self.frequency, sample_rate);
                let b = detuned.tick(self.frequency * ratio, sample_rate);
                0.5 * (a + b)
            }
            (None, Some(table)) if !table.is_empty() => {
                let len = table.len() as f64;
                let s1 = table.at(self.phase as usize);

                self.phase_detuned +=
                    f64::from(self.frequency) * f64::from(ratio) / f64::from(sample_rate) * len;
                self.phase_detuned %= len;
                let s2 = table.at(self.phase_detuned as usize);

                self.phase += f64::from(self.frequency) / f64::from(sample_rate) * len;
                self.phase %= len;

                0.5 * (s1 + s2)
            }
            _ => 0.0,
        };
        self.last_raw = raw;
        self.envelope.observe(raw, sample_rate);

        let mut out = raw * gain;
        if self.trem_depth > 0.0 {
            let rate_hz = 1.0 + self.trem_rate * 7.0;
            // Lighter touches get proportionally less modulation.
            let effective = self.trem_depth * (1.0 - self.envelope.target_gain());
            self.trem_phase += rate_hz / sample_rate * TAU;
            if self.trem_phase >= TAU {
                self.trem_phase -= TAU;
            }
            out *= 1.0 + effective * 0.3 * self.trem_phase.sin();
        }
        out * equal_loudness_weight(self.frequency)
    }
}
