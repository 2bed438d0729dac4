use std::f32::consts::FRAC_1_SQRT_2;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// f32 stored as raw bits in an `AtomicU32`. Each knob is an independent
/// scalar, so relaxed ordering is enough; the callback reads once per block.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Every scalar knob the panel may move while the stream runs. Shared by
/// `Arc` between the controller and the audio callback.
#[derive(Debug)]
pub struct EngineParams {
    /// Engine tremolo LFO rate, already mapped to Hz.
    pub trem_rate_hz: AtomicF32,
    pub trem_depth: AtomicF32,
    /// `Waveform` discriminant for the engine tremolo LFO.
    pub trem_waveform: AtomicU32,
    pub reverb_decay: AtomicF32,
    pub reverb_room: AtomicF32,
    pub dry_mix: AtomicF32,
    pub wet_mix: AtomicF32,
    pub master_gain: AtomicF32,
    pub limiter_threshold: AtomicF32,
    pub lowpass_hz: AtomicF32,
    pub lowpass_q: AtomicF32,
    pub lowpass_enabled: AtomicBool,
    pub highpass_enabled: AtomicBool,
    pub bus_enabled: AtomicBool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            trem_rate_hz: AtomicF32::new(5.0),
            trem_depth: AtomicF32::new(0.5),
            trem_waveform: AtomicU32::new(0),
            reverb_decay: AtomicF32::new(0.85),
            reverb_room: AtomicF32::new(0.5),
            dry_mix: AtomicF32::new(0.75),
            wet_mix: AtomicF32::new(0.25),
            master_gain: AtomicF32::new(0.8),
            limiter_threshold: AtomicF32::new(0.9),
            lowpass_hz: AtomicF32::new(6000.0),
            lowpass_q: AtomicF32::new(FRAC_1_SQRT_2),
            lowpass_enabled: AtomicBool::new(true),
            highpass_enabled: AtomicBool::new(true),
            bus_enabled: AtomicBool::new(true),
        }
    }
}
