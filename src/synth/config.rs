/// Stream-wide parameters for the audio core.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub buffer_frames: usize,
    pub voice: VoiceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            buffer_frames: 256,
            voice: VoiceConfig::default(),
        }
    }
}

/// Envelope settings applied to every voice in a bank.
#[derive(Debug, Clone, Copy)]
pub struct VoiceConfig {
    /// Seconds for the attack ramp to reach full touch intensity.
    pub attack_time: f32,
    /// Per-sample fraction of the remaining distance to the target gain
    /// while sustaining, so intensity changes glide rather than step.
    pub sustain_glide: f32,
    /// Per-sample gain multiplier during release.
    pub release_coeff: f32,
    /// Gain below which a releasing voice goes idle.
    pub release_floor: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            attack_time: 0.22,
            sustain_glide: 0.002,
            release_coeff: 0.9995,
            release_floor: 1e-4,
        }
    }
}
