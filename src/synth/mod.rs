pub mod bank;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod envelope;
pub mod loudness;
pub mod mixbus;
pub mod mode;
pub mod oscillator;
pub mod params;
pub mod reverb;
pub mod voice;
pub mod wavetable;

pub use bank::VoiceBank;
pub use command::Controller;
pub use config::{EngineConfig, VoiceConfig};
pub use engine::AudioEngine;
pub use mode::Mode;
pub use voice::{SourceKind, Voice};
pub use wavetable::{HarmonicSpec, Wavetable, WavetableBuilder};
