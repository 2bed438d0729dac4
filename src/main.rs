use aulos::audio::{AudioBackend, CpalBackend};
use aulos::input::KeyboardHandler;
use aulos::synth::bank::VoiceBank;
use aulos::synth::config::EngineConfig;
use aulos::synth::diagnostics::{Diagnostics, DiagnosticsConfig};
use aulos::synth::engine::AudioEngine;
use aulos::synth::mode::Mode;

const NUM_KEYS: usize = 10;
const BASE_FREQ_HZ: f32 = 220.0;

fn main() {
    let config = EngineConfig::default();
    let (engine, mut controller) = AudioEngine::new(&config);

    let mode = Mode::just_example();
    println!("Mode: {} ({} ratios)", mode.name, mode.ratios.len());
    controller.set_voices(VoiceBank::from_mode(
        &mode,
        BASE_FREQ_HZ,
        NUM_KEYS,
        config.voice,
        0,
    ));

    let mut backend = CpalBackend::new(engine, config.buffer_frames);
    backend.start();

    let _diagnostics = controller
        .take_diagnostics()
        .map(|consumer| Diagnostics::start(consumer, DiagnosticsConfig::default()));

    let mut keyboard = KeyboardHandler::new();
    loop {
        keyboard.update(&controller);
        controller.reclaim();
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
}
