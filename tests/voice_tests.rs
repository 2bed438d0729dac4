use std::sync::Arc;

use aulos::synth::bank::VoiceBank;
use aulos::synth::config::VoiceConfig;
use aulos::synth::envelope::EnvState;
use aulos::synth::loudness::equal_loudness_weight;
use aulos::synth::mode::Mode;
use aulos::synth::oscillator::{Oscillator, Waveform};
use aulos::synth::voice::{detune_ratio, SourceKind, Voice};
use aulos::synth::wavetable::{golden_wave, Wavetable};

const SR: f32 = 48_000.0;

/// Attack so fast the gain is at target from the first processed sample.
fn fast_attack() -> VoiceConfig {
    VoiceConfig {
        attack_time: 1.0 / SR,
        ..VoiceConfig::default()
    }
}

#[test]
fn attack_reaches_target_then_sustains() {
    let config = VoiceConfig {
        attack_time: 0.01,
        ..VoiceConfig::default()
    };
    let mut voice = Voice::new(0, 440.0, config);
    voice.note_on(1.0);

    let steps = (config.attack_time * SR) as usize;
    for _ in 0..steps {
        voice.process(SR);
    }
    let step = 1.0 / (config.attack_time * SR);
    assert!((voice.gain() - 1.0).abs() <= step);

    voice.process(SR);
    voice.process(SR);
    assert_eq!(voice.env_state(), EnvState::Sustain);
    assert_eq!(voice.gain(), 1.0);
    for _ in 0..100 {
        voice.process(SR);
        assert_eq!(voice.env_state(), EnvState::Sustain);
    }
}

#[test]
fn attack_at_default_time_end_to_end() {
    let config = VoiceConfig::default();
    let mut voice = Voice::new(0, 440.0, config);
    voice.note_on(1.0);

    let steps = (config.attack_time * SR) as usize;
    for _ in 0..steps {
        voice.process(SR);
    }
    let step = 1.0 / (config.attack_time * SR);
    assert!((voice.gain() - 1.0).abs() <= step + 1e-3);

    // A few more samples absorb accumulated float error in the long ramp.
    for _ in 0..20 {
        voice.process(SR);
    }
    assert_eq!(voice.env_state(), EnvState::Sustain);
}

#[test]
fn detune_ratio_is_exact() {
    assert_eq!(detune_ratio(0.0), 1.0);
    assert!((detune_ratio(1200.0) - 2.0).abs() < 1e-6);
    assert!((detune_ratio(-1200.0) - 0.5).abs() < 1e-6);
    assert!((detune_ratio(100.0) - 2.0f32.powf(100.0 / 1200.0)).abs() < 1e-7);
}

#[test]
fn zero_detune_matches_single_oscillator() {
    let mut voice = Voice::new(0, 440.0, fast_attack());
    voice.note_on(1.0);

    let mut reference = Oscillator::new(Waveform::Sine);
    let weight = equal_loudness_weight(440.0);
    for _ in 0..1000 {
        let got = voice.process(SR);
        let expected = reference.tick(440.0, SR) * weight;
        assert!((got - expected).abs() < 1e-6);
    }
}

#[test]
fn wavetable_kind_without_table_is_silent() {
    let mut voice = Voice::new(0, 440.0, fast_attack());
    voice.set_source_kind(SourceKind::Wavetable);
    voice.note_on(1.0);
    for _ in 0..256 {
        assert_eq!(voice.process(SR), 0.0);
    }

    let mut voice = Voice::new(0, 440.0, fast_attack());
    voice.set_wavetable(Arc::new(Wavetable::default()));
    voice.note_on(1.0);
    for _ in 0..256 {
        assert_eq!(voice.process(SR), 0.0);
    }
}

#[test]
fn wavetable_release_is_immediate() {
    let mut voice = Voice::new(0, 440.0, VoiceConfig::default());
    voice.set_wavetable(Arc::new(golden_wave(2048)));
    voice.note_on(1.0);
    voice.process(SR);
    voice.note_off();
    assert_eq!(voice.env_state(), EnvState::Release);
}

#[test]
fn oscillator_release_waits_for_zero_cross_or_timeout() {
    let mut voice = Voice::new(0, 440.0, fast_attack());
    voice.note_on(1.0);
    for _ in 0..100 {
        voice.process(SR);
    }

    voice.note_off();
    assert_eq!(voice.env_state(), EnvState::Sustain);

    let timeout = (0.05 * SR) as usize + 2;
    let mut released_after = None;
    for n in 0..timeout {
        voice.process(SR);
        if voice.env_state() == EnvState::Release {
            released_after = Some(n);
            break;
        }
    }
    assert!(
        released_after.is_some(),
        "release never tripped within the timeout"
    );
}

#[test]
fn released_voice_decays_to_idle() {
    let mut voice = Voice::new(0, 440.0, fast_attack());
    voice.set_wavetable(Arc::new(golden_wave(2048)));
    voice.note_on(1.0);
    voice.process(SR);
    voice.note_off();

    // 0.9995^n from 1.0 falls under 1e-4 within ~19k samples.
    let mut idle = false;
    for _ in 0..30_000 {
        voice.process(SR);
        if voice.env_state() == EnvState::Idle {
            idle = true;
            break;
        }
        assert!(voice.gain() >= 0.0);
    }
    assert!(idle);
    assert!(!voice.is_active());
    assert_eq!(voice.process(SR), 0.0);
}

#[test]
fn sine_voice_period_matches_frequency() {
    let mut voice = Voice::new(0, 440.0, fast_attack());
    voice.note_on(1.0);

    let mut crossings = 0usize;
    let mut prev = voice.process(SR);
    for _ in 1..48_000 {
        let sample = voice.process(SR);
        if prev <= 0.0 && sample > 0.0 {
            crossings += 1;
        }
        prev = sample;
    }
    assert!((439..=441).contains(&crossings), "crossings {crossings}");
}

#[test]
fn voice_releases_only_after_last_contact_lifts() {
    let mode = Mode::equal_temperament(12);
    let mut bank = VoiceBank::from_mode(&mode, 220.0, 3, VoiceConfig::default(), 0);
    bank.set_all_wavetable(&Arc::new(golden_wave(2048)));

    bank.note_on(1, 100, 0.5, 0.0);
    bank.note_on(1, 200, 0.9, 0.0);
    assert!(bank.voices()[1].is_active());

    bank.note_off(1, 200);
    assert_ne!(bank.voices()[1].env_state(), EnvState::Release);

    bank.note_off(1, 100);
    assert_eq!(bank.voices()[1].env_state(), EnvState::Release);
}
