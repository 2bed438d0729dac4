use aulos::synth::mixbus::{MixBus, SoftLimiter};

const SR: f32 = 48_000.0;

/// Bus with both filters off and unity gain, leaving only the limiter and
/// the block-peak safety net in the path.
fn passthrough_bus() -> MixBus {
    let mut bus = MixBus::new(SR);
    bus.set_highpass_enabled(false);
    bus.set_lowpass_enabled(false);
    bus.set_master_gain(1.0);
    bus
}

#[test]
fn process_is_idempotent_below_threshold() {
    let mut bus = passthrough_bus();
    let original: Vec<f32> = (0..256)
        .map(|i| 0.8 * (i as f32 / 256.0 * std::f32::consts::TAU).sin())
        .collect();

    let mut buffer = original.clone();
    bus.process(&mut buffer);
    assert_eq!(buffer, original);
    bus.process(&mut buffer);
    assert_eq!(buffer, original);
}

#[test]
fn limiter_is_a_soft_knee() {
    let limiter = SoftLimiter { threshold: 0.9 };
    assert_eq!(limiter.process(0.5), 0.5);
    assert_eq!(limiter.process(-0.5), -0.5);

    let a = limiter.process(2.0);
    let b = limiter.process(5.0);
    assert!(a > 0.9 && a < 1.9);
    assert!(b > a && b < 1.9, "asymptotic ceiling, not a hard clip");
    assert_eq!(limiter.process(-2.0), -a);
}

#[test]
fn block_peak_is_rescaled_to_ceiling() {
    let mut bus = passthrough_bus();
    bus.set_limiter_threshold(10.0);

    let mut buffer = vec![0.0f32; 64];
    buffer[10] = 3.0;
    buffer[20] = -1.5;
    bus.process(&mut buffer);

    let peak = buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - 0.95).abs() < 1e-6);
    // Relative levels survive the rescale.
    assert!((buffer[20].abs() - 0.475).abs() < 1e-6);
}

#[test]
fn quiet_blocks_are_not_rescaled() {
    let mut bus = passthrough_bus();
    let mut buffer = vec![0.5f32; 64];
    bus.process(&mut buffer);
    assert!(buffer.iter().all(|&s| s == 0.5));
}

#[test]
fn highpass_removes_dc() {
    let mut bus = MixBus::new(SR);
    bus.set_lowpass_enabled(false);
    bus.set_master_gain(1.0);
    bus.set_limiter_threshold(10.0);

    let mut last = 1.0f32;
    for _ in 0..200 {
        let mut block = vec![1.0f32; 256];
        bus.process(&mut block);
        last = block[255];
    }
    assert!(last.abs() < 0.01, "dc remaining {last}");
}

#[test]
fn lowpass_attenuates_high_frequencies() {
    let mut bus = MixBus::new(SR);
    bus.set_highpass_enabled(false);
    bus.set_master_gain(1.0);
    bus.set_limiter_threshold(10.0);
    bus.set_lowpass_hz(1000.0);

    // 12 kHz tone, well above the 1 kHz cutoff.
    let mut energy_in = 0.0f64;
    let mut energy_out = 0.0f64;
    for block_index in 0..20 {
        let mut block: Vec<f32> = (0..256)
            .map(|i| {
                let n = (block_index * 256 + i) as f32;
                (std::f32::consts::TAU * 12_000.0 * n / SR).sin() * 0.5
            })
            .collect();
        let before: f64 = block.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        bus.process(&mut block);
        let after: f64 = block.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        if block_index >= 2 {
            energy_in += before;
            energy_out += after;
        }
    }
    assert!(energy_out < energy_in * 0.01, "24 dB/oct should crush 12 kHz");
}
