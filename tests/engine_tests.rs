use aulos::synth::bank::VoiceBank;
use aulos::synth::command::Controller;
use aulos::synth::config::EngineConfig;
use aulos::synth::diagnostics::DiagEvent;
use aulos::synth::engine::AudioEngine;
use aulos::synth::mode::Mode;
use aulos::synth::voice::Voice;

/// Tremolo, reverb and the bus out of the path, so the engine reduces to a
/// plain voice sum.
fn neutral(controller: &Controller) {
    controller.set_tremolo_depth(0.0);
    controller.set_reverb_mix(0.0);
    controller.set_bus_enabled(false);
}

#[test]
fn engine_output_is_sum_of_voices() {
    let config = EngineConfig::default();
    let sr = config.sample_rate as f32;
    let (mut engine, controller) = AudioEngine::new(&config);
    neutral(&controller);

    let mode = Mode::equal_temperament(12);
    controller.set_voices(VoiceBank::from_mode(&mode, 220.0, 2, config.voice, 0));
    controller.note_on(0, 0, 1.0, 0.0);
    controller.note_on(1, 1, 0.7, 0.0);

    let mut output = vec![0.0f32; 2 * config.buffer_frames];
    engine.process_block(&mut output);

    let mut v0 = Voice::new(0, mode.key_frequency(220.0, 0), config.voice);
    v0.note_on(1.0);
    let mut v1 = Voice::new(1, mode.key_frequency(220.0, 1), config.voice);
    v1.note_on(0.7);

    for frame in 0..config.buffer_frames {
        let expected = v0.process(sr) + v1.process(sr);
        assert!(
            (output[2 * frame] - expected).abs() < 1e-6,
            "frame {frame}: {} vs {expected}",
            output[2 * frame]
        );
        assert_eq!(output[2 * frame], output[2 * frame + 1]);
    }
}

#[test]
fn fallback_tone_before_first_registration() {
    let config = EngineConfig::default();
    let (mut engine, controller) = AudioEngine::new(&config);
    neutral(&controller);

    let mut output = vec![0.0f32; 2 * config.buffer_frames];
    engine.process_block(&mut output);
    assert!(output.iter().any(|s| s.abs() > 0.0));
}

#[test]
fn clear_voices_silences_output() {
    let config = EngineConfig::default();
    let (mut engine, controller) = AudioEngine::new(&config);
    neutral(&controller);

    let mode = Mode::just_example();
    controller.set_voices(VoiceBank::from_mode(&mode, 220.0, 5, config.voice, 0));
    controller.note_on(0, 0, 1.0, 0.0);

    let mut output = vec![0.0f32; 2 * config.buffer_frames];
    engine.process_block(&mut output);
    assert!(output.iter().any(|s| s.abs() > 0.0));

    controller.clear_voices();
    engine.process_block(&mut output);
    assert!(output.iter().all(|&s| s == 0.0));
}

#[test]
fn bank_swap_survives_processing() {
    let config = EngineConfig::default();
    let (mut engine, controller) = AudioEngine::new(&config);
    neutral(&controller);

    let mode = Mode::equal_temperament(7);
    controller.set_voices(VoiceBank::from_mode(&mode, 220.0, 7, config.voice, 0));
    controller.note_on(3, 0, 0.8, 0.0);

    let mut output = vec![0.0f32; 2 * config.buffer_frames];
    engine.process_block(&mut output);

    // Swap mid-stream; the old bank comes back over the reclaim channel.
    controller.set_voices(VoiceBank::from_mode(&mode, 330.0, 7, config.voice, 1));
    engine.process_block(&mut output);
    controller.reclaim();

    // The fresh bank holds no notes.
    assert!(output.iter().all(|&s| s == 0.0));
}

#[test]
fn diagnostics_snapshots_flow_to_consumer() {
    let config = EngineConfig::default();
    let (mut engine, mut controller) = AudioEngine::new(&config);
    neutral(&controller);

    let mut consumer = controller.take_diagnostics().expect("consumer available");
    assert!(controller.take_diagnostics().is_none());

    let mode = Mode::equal_temperament(12);
    controller.set_voices(VoiceBank::from_mode(&mode, 220.0, 2, config.voice, 3));
    controller.note_on(0, 0, 0.9, 0.0);

    let mut output = vec![0.0f32; 2 * config.buffer_frames];
    let blocks = (0.3 * config.sample_rate as f32 / config.buffer_frames as f32) as usize;
    for _ in 0..blocks {
        engine.process_block(&mut output);
    }

    let mut saw_bank = false;
    let mut saw_voice = false;
    while let Some(event) = consumer.pop() {
        match event {
            DiagEvent::Bank(stats) => {
                saw_bank = true;
                assert_eq!(stats.generation, 3);
                assert_eq!(stats.active_voices, 1);
            }
            DiagEvent::Voice(snapshot) => {
                saw_voice = true;
                assert_eq!(snapshot.slot, 0);
            }
        }
    }
    assert!(saw_bank && saw_voice);
}

#[test]
fn mode_frequencies_fold_octaves() {
    let mode = Mode::equal_temperament(12);
    assert!((mode.key_frequency(220.0, 0) - 220.0).abs() < 1e-4);
    assert!((mode.key_frequency(220.0, 12) - 440.0).abs() < 1e-3);

    let semitone = f64::from(mode.key_frequency(220.0, 1) / mode.key_frequency(220.0, 0));
    assert!((semitone - 2.0f64.powf(1.0 / 12.0)).abs() < 1e-6);
}
