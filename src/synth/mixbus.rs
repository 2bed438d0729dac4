use std::f32::consts::{FRAC_1_SQRT_2, PI};

/// Block peak above which the whole block is rescaled.
const AUTO_NORMALIZE_CEILING: f32 = 0.95;

const DEFAULT_HIGHPASS_HZ: f32 = 40.0;
const DEFAULT_LOWPASS_HZ: f32 = 6000.0;

/// Second-order IIR section, Direct Form I, RBJ cookbook coefficients.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn highpass(sample_rate: f32, cutoff: f32, q: f32) -> Self {
        let (omega, alpha) = Self::prewarp(sample_rate, cutoff, q);
        let cos_omega = omega.cos();
        Self::from_unnormalized(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    pub fn lowpass(sample_rate: f32, cutoff: f32, q: f32) -> Self {
        let (omega, alpha) = Self::prewarp(sample_rate, cutoff, q);
        let cos_omega = omega.cos();
        Self::from_unnormalized(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    fn prewarp(sample_rate: f32, cutoff: f32, q: f32) -> (f32, f32) {
        let sample_rate = sample_rate.max(1.0);
        // Keep the cutoff below Nyquist and the Q away from zero.
        let cutoff = cutoff.clamp(1.0, sample_rate * 0.49);
        let q = q.max(1e-3);
        let omega = 2.0 * PI * cutoff / sample_rate;
        (omega, omega.sin() / (2.0 * q))
    }

    fn from_unnormalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            ..Default::default()
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// Soft-knee ceiling. Inside the threshold the signal passes untouched;
/// overshoot compresses asymptotically toward `threshold + 1`, never a hard
/// clip.
#[derive(Debug, Clone)]
pub struct SoftLimiter {
    pub threshold: f32,
}

impl SoftLimiter {
    pub fn process(&self, x: f32) -> f32 {
        let t = self.threshold;
        if x > t {
            t + (1.0 - (-(x - t)).exp())
        } else if x < -t {
            -t - (1.0 - (-(-x - t)).exp())
        } else {
            x
        }
    }
}

/// Post-sum effects chain: rumble highpass, optional 24 dB/oct lowpass
/// (two cascaded 12 dB/oct sections), master gain, soft limiter, then a
/// block-level peak rescale as a safety net.
pub struct MixBus {
    sample_rate: f32,
    highpass: Biquad,
    highpass_enabled: bool,
    lowpass1: Biquad,
    lowpass2: Biquad,
    lowpass_enabled: bool,
    lowpass_hz: f32,
    lowpass_q: f32,
    master_gain: f32,
    limiter: SoftLimiter,
}

impl MixBus {
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        let lowpass_hz = DEFAULT_LOWPASS_HZ;
        let lowpass_q = FRAC_1_SQRT_2;
        Self {
            sample_rate,
            highpass: Biquad::highpass(sample_rate, DEFAULT_HIGHPASS_HZ, FRAC_1_SQRT_2),
            highpass_enabled: true,
            lowpass1: Biquad::lowpass(sample_rate, lowpass_hz, lowpass_q),
            lowpass2: Biquad::lowpass(sample_rate, lowpass_hz, lowpass_q),
            lowpass_enabled: true,
            lowpass_hz,
            lowpass_q,
            master_gain: 0.8,
            limiter: SoftLimiter { threshold: 0.9 },
        }
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain.max(0.0);
    }

    pub fn set_limiter_threshold(&mut self, threshold: f32) {
        self.limiter.threshold = threshold.max(0.0);
    }

    pub fn set_lowpass_hz(&mut self, hz: f32) {
        if hz == self.lowpass_hz {
            return;
        }
        self.lowpass_hz = hz;
        self.rebuild_lowpass();
    }

    pub fn set_lowpass_q(&mut self, q: f32) {
        if q == self.lowpass_q {
            return;
        }
        self.lowpass_q = q;
        self.rebuild_lowpass();
    }

    pub fn set_lowpass_enabled(&mut self, enabled: bool) {
        self.lowpass_enabled = enabled;
    }

    pub fn set_highpass_enabled(&mut self, enabled: bool) {
        self.highpass_enabled = enabled;
    }

    fn rebuild_lowpass(&mut self) {
        self.lowpass1 = Biquad::lowpass(self.sample_rate, self.lowpass_hz, self.lowpass_q);
        self.lowpass2 = Biquad::lowpass(self.sample_rate, self.lowpass_hz, self.lowpass_q);
    }

    /// Run the chain over one block, in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        let mut peak = 0.0f32;
        for sample in buffer.iter_mut() {
            let mut s = *sample;
            if self.highpass_enabled {
                s = self.highpass.process(s);
            }
            if self.lowpass_enabled {
                s = self.lowpass2.process(self.lowpass1.process(s));
            }
            s *= self.master_gain;
            s = self.limiter.process(s);
            *sample = s;
            peak = peak.max(s.abs());
        }

        if peak > AUTO_NORMALIZE_CEILING {
            let norm = AUTO_NORMALIZE_CEILING / peak;
            for sample in buffer.iter_mut() {
                *sample *= norm;
            }
        }
    }
}
