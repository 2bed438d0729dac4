use super::config::VoiceConfig;

/// Raw-signal magnitude below which a deferred release may begin.
const ZERO_CROSS_EPS: f32 = 1e-3;
/// Deferred releases fire after this long even without a near-zero sample.
const PENDING_TIMEOUT_SECS: f32 = 0.05;

/// Envelope stage. A voice is audible whenever this is not `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Idle,
    Attack,
    Sustain,
    Release,
}

/// Attack/Sustain/Release gain state machine, stepped once per sample. At
/// most one state transition happens per processed sample.
#[derive(Debug, Clone)]
pub struct Envelope {
    state: EnvState,
    gain: f32,
    target_gain: f32,
    config: VoiceConfig,
    pending_release: bool,
    pending_samples: u32,
}

impl Envelope {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            state: EnvState::Idle,
            gain: 0.0,
            target_gain: 0.0,
            config,
            pending_release: false,
            pending_samples: 0,
        }
    }

    pub fn state(&self) -> EnvState {
        self.state
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn target_gain(&self) -> f32 {
        self.target_gain
    }

    pub fn is_active(&self) -> bool {
        self.state != EnvState::Idle
    }

    pub fn note_on(&mut self, intensity: f32) {
        self.target_gain = intensity.clamp(0.0, 1.0);
        self.state = EnvState::Attack;
        self.pending_release = false;
        self.pending_samples = 0;
    }

    /// Retarget the gain without changing stage.
    pub fn note_move(&mut self, intensity: f32) {
        self.target_gain = intensity.clamp(0.0, 1.0);
    }

    /// Begin the release decay on the next `advance`.
    pub fn release_now(&mut self) {
        self.state = EnvState::Release;
        self.pending_release = false;
        self.pending_samples = 0;
    }

    /// Keep sustaining until the raw signal crosses near zero (or a timeout
    /// elapses), then release. Cutting a running oscillator mid-cycle would
    /// click.
    pub fn release_deferred(&mut self) {
        self.state = EnvState::Sustain;
        self.pending_release = true;
        self.pending_samples = 0;
    }

    /// Step the gain one sample. Returns the gain to apply; 0.0 when idle.
    pub fn advance(&mut self, sample_rate: f32) -> f32 {
        match self.state {
            EnvState::Idle => 0.0,
            EnvState::Attack => {
                self.gain += 1.0 / (self.config.attack_time * sample_rate);
                if self.gain >= self.target_gain {
                    self.gain = self.target_gain;
                    self.state = EnvState::Sustain;
                }
                self.gain
            }
            EnvState::Sustain => {
                self.gain += (self.target_gain - self.gain) * self.config.sustain_glide;
                self.gain
            }
            EnvState::Release => {
                self.gain *= self.config.release_coeff;
                if self.gain <= self.config.release_floor {
                    self.gain = 0.0;
                    self.state = EnvState::Idle;
                }
                self.gain
            }
        }
    }

    /// Feed the raw (pre-gain) sample back in so a pending release can trip
    /// on a near-zero crossing.
    pub fn observe(&mut self, raw_sample: f32, sample_rate: f32) {
        if !self.pending_release {
            return;
        }
        self.pending_samples += 1;
        let timeout = (PENDING_TIMEOUT_SECS * sample_rate) as u32;
        if raw_sample.abs() < ZERO_CROSS_EPS || self.pending_samples > timeout {
            self.state = EnvState::Release;
            self.pending_release = false;
        }
    }
}
