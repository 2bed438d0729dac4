//! Audio core for a touch-played microtonal keyboard instrument: polyphonic
//! voices with attack/sustain/release envelopes, wavetable construction from
//! sparse harmonic measurements, and a real-time mix/effects chain.

pub mod audio;
pub mod input;
pub mod synth;
