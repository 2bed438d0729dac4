use aulos::synth::wavetable::{presets, HarmonicSpec, WavetableBuilder, DEFAULT_TABLE_SIZE};

#[test]
fn from_parts_reproduces_pure_cosine() {
    let table = WavetableBuilder::from_parts(&[0.0, 1.0], &[0.0, 0.0], 256);
    for (i, &sample) in table.samples().iter().enumerate() {
        let expected = (std::f64::consts::TAU * i as f64 / 256.0).cos() as f32;
        assert!(
            (sample - expected).abs() < 1e-6,
            "sample {i}: {sample} vs {expected}"
        );
    }
}

#[test]
fn from_parts_index_zero_is_dc() {
    let table = WavetableBuilder::from_parts(&[1.0], &[0.0], 64);
    for &sample in table.samples() {
        assert!((sample - 1.0).abs() < 1e-6);
    }
}

#[test]
fn from_parts_zero_pads_mismatched_lengths() {
    let padded = WavetableBuilder::from_parts(&[0.0, 1.0], &[], 128);
    let explicit = WavetableBuilder::from_parts(&[0.0, 1.0], &[0.0, 0.0], 128);
    assert_eq!(padded.samples(), explicit.samples());

    let imag_longer = WavetableBuilder::from_parts(&[], &[0.0, 0.5, 0.25], 128);
    let imag_explicit = WavetableBuilder::from_parts(&[0.0, 0.0, 0.0], &[0.0, 0.5, 0.25], 128);
    assert_eq!(imag_longer.samples(), imag_explicit.samples());
}

#[test]
fn builder_normalizes_peak_to_exactly_one() {
    let spec = HarmonicSpec::new(&[0.3, 0.1], &[0.0, 0.5]);
    let table = WavetableBuilder::build(&spec, 220.0, 48_000.0, 12_000.0, 2048);
    let peak = table.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert_eq!(peak, 1.0);
}

#[test]
fn empty_spec_builds_silent_table() {
    let table = WavetableBuilder::build(&HarmonicSpec::default(), 220.0, 48_000.0, 12_000.0, 512);
    assert_eq!(table.len(), 512);
    assert!(table.samples().iter().all(|&s| s == 0.0));
}

#[test]
fn extrapolation_targets_bandwidth_limit() {
    let spec = HarmonicSpec::new(&[1.0, 0.25], &[0.0, 0.0]);
    let extended = WavetableBuilder::extend_spec(&spec, 100.0, 48_000.0, 1_000.0);
    // min(floor(24000/100), floor(1000/100)) = 10 harmonics total.
    assert_eq!(extended.len(), 10);

    // Fitted rolloff: p = (ln 1 - ln 0.25) / ln 2 = 2, so harmonic 3 gets
    // amp[1] * (1/3)^2.
    let third = extended.harmonics[2];
    assert!((third.amp - 1.0 / 9.0).abs() < 1e-4);
    assert!(third.phase.abs() <= std::f32::consts::PI);
}

#[test]
fn extrapolation_respects_nyquist() {
    let spec = HarmonicSpec::new(&[1.0, 0.5], &[0.0, 0.0]);
    let extended = WavetableBuilder::extend_spec(&spec, 10_000.0, 48_000.0, 20_000.0);
    // Nyquist allows only floor(24000/10000) = 2 harmonics; nothing is added.
    assert_eq!(extended.len(), 2);
}

#[test]
fn extrapolated_tables_are_deterministic() {
    let spec = HarmonicSpec::new(&[1.0, 0.5, 0.25], &[0.0; 3]);
    let a = WavetableBuilder::build(&spec, 100.0, 48_000.0, 12_000.0, 512);
    let b = WavetableBuilder::build(&spec, 100.0, 48_000.0, 12_000.0, 512);
    assert_eq!(a.samples(), b.samples());
}

#[test]
fn preset_tables_are_normalized() {
    for (name, build) in presets() {
        if let Some(table) = build(DEFAULT_TABLE_SIZE) {
            assert_eq!(table.len(), DEFAULT_TABLE_SIZE, "preset {name}");
            let peak = table.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert_eq!(peak, 1.0, "preset {name}");
        }
    }
}
