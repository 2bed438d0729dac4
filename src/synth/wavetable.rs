use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::f64::consts::TAU;

pub const DEFAULT_TABLE_SIZE: usize = 2048;

/// Seed for the phases of synthesized high harmonics; fixed so a process run
/// is deterministic.
const PHASE_SEED: u64 = 42;

/// One measured partial: amplitude plus phase in radians.
#[derive(Debug, Clone, Copy)]
pub struct Harmonic {
    pub amp: f32,
    pub phase: f32,
}

/// Ordered harmonic content; entry `i` holds harmonic number `i + 1`, with no
/// gaps.
#[derive(Debug, Clone, Default)]
pub struct HarmonicSpec {
    pub harmonics: Vec<Harmonic>,
}

impl HarmonicSpec {
    /// Pair up parallel amplitude/phase lists, truncating to the shorter one.
    pub fn new(amps: &[f32], phases: &[f32]) -> Self {
        let harmonics = amps
            .iter()
            .zip(phases)
            .map(|(&amp, &phase)| Harmonic { amp: amp.max(0.0), phase })
            .collect();
        Self { harmonics }
    }

    pub fn len(&self) -> usize {
        self.harmonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.harmonics.is_empty()
    }

    /// Golden-ratio decay over the first 16 harmonics.
    pub fn golden() -> Self {
        const PHI: f32 = 1.618_034;
        let mut amps = Vec::with_capacity(16);
        let mut phases = Vec::with_capacity(16);
        for k in 1..=16u32 {
            amps.push((1.0 / PHI).powi(k as i32 - 1));
            phases.push(if k % 2 == 0 { 0.0 } else { 0.2 });
        }
        Self::new(&amps, &phases)
    }

    /// A sine with a sprinkle of measured upper partials.
    pub fn brighter_sine() -> Self {
        let amps = [
            1.0, 0.1, 0.05, 0.02, 0.009, 0.03, 0.011, 0.009, 0.004, 0.0013,
        ];
        Self::new(&amps, &[0.0; 10])
    }

    /// Measured eleven-harmonic spectrum with non-trivial phases.
    pub fn dod() -> Self {
        let amps = [
            1.000, 0.4, 0.88, 0.26, 0.032, 0.016, 0.004, 0.001, 0.0038, 0.00028, 0.0002,
        ];
        let phases = [
            -2.05, -1.00, -2.89, 0.60, 2.05, -0.12, -0.75, -1.77, 0.72, -2.16, -0.78,
        ];
        Self::new(&amps, &phases)
    }
}

/// Immutable periodic sample buffer read by phase accumulation. Shared by
/// reference across voices; rebuilt, never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Wavetable {
    samples: Vec<f32>,
}

impl Wavetable {
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at `index`, wrapping past the end. Empty tables read as silence.
    pub fn at(&self, index: usize) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples[index % self.samples.len()]
    }
}

/// Builds playback tables from harmonic measurements, filling in harmonics
/// that were never measured via a fitted power-law rolloff.
pub struct WavetableBuilder;

impl WavetableBuilder {
    /// Extend `spec` to the bandwidth/Nyquist target and synthesize a table
    /// normalized to span [-1, 1].
    pub fn build(
        spec: &HarmonicSpec,
        f0: f64,
        sample_rate: f64,
        bandwidth_hz: f64,
        table_size: usize,
    ) -> Wavetable {
        let extended = Self::extend_spec(spec, f0, sample_rate, bandwidth_hz);
        finish(synthesize(&extended.harmonics, table_size), true)
    }

    /// Synthesize at most `max_harmonics` of the measured spectrum, with no
    /// extrapolation. Normalized.
    pub fn build_limited(spec: &HarmonicSpec, max_harmonics: usize, table_size: usize) -> Wavetable {
        let count = spec.len().min(max_harmonics);
        finish(synthesize(&spec.harmonics[..count], table_size), true)
    }

    /// Direct synthesis from explicit cosine/sine coefficients, where index
    /// `k` drives harmonic `k`. Not normalized; mismatched list lengths are
    /// treated as zero-padded to the longer one.
    pub fn from_parts(real: &[f32], imag: &[f32], table_size: usize) -> Wavetable {
        let harmonics = real.len().max(imag.len());
        let mut out = vec![0.0f32; table_size];
        for (i, sample) in out.iter_mut().enumerate() {
            let t = TAU * i as f64 / table_size as f64;
            let mut v = 0.0f64;
            for k in 0..harmonics {
                let re = f64::from(real.get(k).copied().unwrap_or(0.0));
                let im = f64::from(imag.get(k).copied().unwrap_or(0.0));
                let kt = k as f64 * t;
                v += re * kt.cos() + im * kt.sin();
            }
            *sample = v as f32;
        }
        Wavetable { samples: out }
    }

    /// Fit a power-law rolloff `amp ~ 1/k^p` to the measured harmonics and
    /// extend the spec up to `min(Nyquist, bandwidth)` harmonics of `f0`.
    /// Synthesized phases are drawn from a fixed-seed uniform [-pi, pi].
    pub fn extend_spec(
        spec: &HarmonicSpec,
        f0: f64,
        sample_rate: f64,
        bandwidth_hz: f64,
    ) -> HarmonicSpec {
        let mut extended = spec.clone();
        if extended.is_empty() || f0 <= 0.0 {
            return extended;
        }

        let h_nyquist = (sample_rate * 0.5 / f0).floor() as i64;
        let h_needed = (bandwidth_hz / f0).floor() as i64;
        let h_target = h_nyquist.min(h_needed);

        let k = extended.len();
        let mut p = 1.0f64;
        if k >= 2 {
            let first = f64::from(extended.harmonics[0].amp.max(1e-9)).ln();
            let last = f64::from(extended.harmonics[k - 1].amp.max(1e-9)).ln();
            p = (first - last) / (k as f64).ln();
        }

        let base_amp = f64::from(extended.harmonics[0].amp);
        let mut rng = SmallRng::seed_from_u64(PHASE_SEED);
        for h in (k as i64 + 1)..=h_target {
            let amp = base_amp * (1.0 / h as f64).powf(p);
            extended.harmonics.push(Harmonic {
                amp: amp as f32,
                phase: rng.random_range(-PI..PI),
            });
        }
        extended
    }
}

/// Sum `amp[k] * sin((k+1)*theta + phase[k])` over one cycle.
fn synthesize(harmonics: &[Harmonic], table_size: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; table_size];
    for (i, sample) in out.iter_mut().enumerate() {
        let t = TAU * i as f64 / table_size as f64;
        let mut v = 0.0f64;
        for (k, h) in harmonics.iter().enumerate() {
            let number = (k + 1) as f64;
            v += f64::from(h.amp) * (number * t + f64::from(h.phase)).sin();
        }
        *sample = v as f32;
    }
    out
}

fn finish(mut samples: Vec<f32>, normalize: bool) -> Wavetable {
    if normalize {
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            for s in samples.iter_mut() {
                *s /= peak;
            }
        }
    }
    Wavetable { samples }
}

pub fn golden_wave(table_size: usize) -> Wavetable {
    let spec = HarmonicSpec::golden();
    WavetableBuilder::build_limited(&spec, spec.len(), table_size)
}

pub fn brighter_sine_wave(table_size: usize) -> Wavetable {
    let spec = HarmonicSpec::brighter_sine();
    WavetableBuilder::build_limited(&spec, spec.len(), table_size)
}

pub fn dod_wave(table_size: usize) -> Wavetable {
    let spec = HarmonicSpec::dod();
    WavetableBuilder::build_limited(&spec, spec.len(), table_size)
}

/// Mixed sine/cosine eleven-harmonic violin spectrum.
pub fn violin_wave(table_size: usize) -> Wavetable {
    // (cosine amp, sine amp) per harmonic number 1..=11.
    let partials: [(f32, f32); 11] = [
        (0.0, 0.490),
        (0.0, 0.995),
        (0.940, 0.0),
        (0.0, 0.425),
        (0.480, 0.0),
        (0.0, 0.0),
        (0.365, 0.0),
        (0.0, 0.040),
        (0.085, 0.0),
        (0.0, 0.0),
        (0.090, 0.0),
    ];
    let mut real = vec![0.0f32; partials.len() + 1];
    let mut imag = vec![0.0f32; partials.len() + 1];
    for (i, &(re, im)) in partials.iter().enumerate() {
        real[i + 1] = re;
        imag[i + 1] = im;
    }
    let table = WavetableBuilder::from_parts(&real, &imag, table_size);
    finish(table.samples, true)
}

/// Exponentially decaying cosine series.
pub fn euler_wave(table_size: usize) -> Wavetable {
    let mut real = vec![0.0f32; 65];
    for (k, r) in real.iter_mut().enumerate().skip(1) {
        *r = (-(k as f32) / 3.0).exp();
    }
    let table = WavetableBuilder::from_parts(&real, &[], table_size);
    finish(table.samples, true)
}

pub type PresetFn = fn(usize) -> Option<Wavetable>;

fn preset_sine(_table_size: usize) -> Option<Wavetable> {
    None
}

fn preset_golden(table_size: usize) -> Option<Wavetable> {
    Some(golden_wave(table_size))
}

fn preset_brighter_sine(table_size: usize) -> Option<Wavetable> {
    Some(brighter_sine_wave(table_size))
}

fn preset_dod(table_size: usize) -> Option<Wavetable> {
    Some(dod_wave(table_size))
}

fn preset_violin(table_size: usize) -> Option<Wavetable> {
    Some(violin_wave(table_size))
}

fn preset_euler(table_size: usize) -> Option<Wavetable> {
    Some(euler_wave(table_size))
}

const PRESETS: [(&str, PresetFn); 6] = [
    ("Sine", preset_sine),
    ("Golden", preset_golden),
    ("BrighterSine", preset_brighter_sine),
    ("Dod", preset_dod),
    ("Violin", preset_violin),
    ("Euler", preset_euler),
];

/// Preset registry the waveform selector cycles through. `None` means the
/// parametric sine source rather than a table.
pub fn presets() -> &'static [(&'static str, PresetFn)] {
    &PRESETS
}
