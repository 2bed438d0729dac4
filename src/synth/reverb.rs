use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const NUM_LINES: usize = 8;
/// Shortest line length before spread/scatter/room scaling.
const BASE_DELAY_MS: f32 = 40.0;
/// Feedback damping lowpass cutoff; fixed, not a panel knob.
const DAMP_CUTOFF_HZ: f32 = 8000.0;
/// Largest room factor `retune_taps` may request; sizes the buffers.
const MAX_ROOM_FACTOR: f32 = 1.5;
const SCATTER_SEED: u64 = 7;

/// Fixed-capacity circular delay read at a movable tap.
#[derive(Debug, Clone)]
struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    #[inline]
    fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    #[inline]
    fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.min(len - 1);
        self.buffer[(self.write_pos + len - delay - 1) % len]
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// One-pole lowpass damping the feedback path.
#[derive(Debug, Clone, Copy, Default)]
struct Damper {
    z1: f32,
}

impl Damper {
    #[inline]
    fn process(&mut self, input: f32, coeff: f32) -> f32 {
        let output = input * (1.0 - coeff) + self.z1 * coeff;
        self.z1 = output;
        output
    }
}

/// Stereo feedback-delay-network reverberator: mono in, wet L/R out. Eight
/// exponentially spread delay lines mixed through a Householder reflection,
/// with per-line damping. Room-size changes move read taps only; buffers
/// never reallocate while the stream runs.
pub struct Reverb {
    sample_rate: f32,
    delays: Vec<DelayLine>,
    taps: [usize; NUM_LINES],
    max_taps: [usize; NUM_LINES],
    scatter: [f32; NUM_LINES],
    dampers: [Damper; NUM_LINES],
    damp_coeff: f32,
    feedback: f32,
    room_size: f32,
    read_buf: [f32; NUM_LINES],
}

impl Reverb {
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        let mut rng = SmallRng::seed_from_u64(SCATTER_SEED);

        let mut scatter = [1.0f32; NUM_LINES];
        let mut delays = Vec::with_capacity(NUM_LINES);
        let mut max_taps = [0usize; NUM_LINES];
        for (line, s) in scatter.iter_mut().enumerate() {
            *s = rng.random_range(0.9..1.1);
            let spread = 2.0f32.powf(line as f32 / NUM_LINES as f32);
            let longest =
                (BASE_DELAY_MS * 0.001 * sample_rate * spread * *s * MAX_ROOM_FACTOR) as usize + 2;
            max_taps[line] = longest;
            delays.push(DelayLine::new(longest + 1));
        }

        let mut reverb = Self {
            sample_rate,
            delays,
            taps: [1; NUM_LINES],
            max_taps,
            scatter,
            dampers: [Damper::default(); NUM_LINES],
            damp_coeff: (-TAU * DAMP_CUTOFF_HZ / sample_rate).exp(),
            feedback: 0.85,
            room_size: 0.5,
            read_buf: [0.0; NUM_LINES],
        };
        reverb.retune_taps();
        reverb
    }

    /// Decay knob, clamped to keep the loop contractive.
    pub fn set_feedback(&mut self, decay: f32) {
        self.feedback = decay.clamp(0.0, 0.99);
    }

    /// Room size 0..1 scales every read tap.
    pub fn set_room_size(&mut self, room: f32) {
        let room = room.clamp(0.0, 1.0);
        if room == self.room_size {
            return;
        }
        self.room_size = room;
        self.retune_taps();
    }

    fn retune_taps(&mut self) {
        let factor = 0.5 + self.room_size;
        for line in 0..NUM_LINES {
            let spread = 2.0f32.powf(line as f32 / NUM_LINES as f32);
            let samples =
                (BASE_DELAY_MS * 0.001 * self.sample_rate * spread * self.scatter[line] * factor)
                    as usize;
            self.taps[line] = samples.clamp(1, self.max_taps[line]);
        }
    }

    pub fn reset(&mut self) {
        for delay in self.delays.iter_mut() {
            delay.reset();
        }
        self.dampers = [Damper::default(); NUM_LINES];
    }

    /// One mono input sample in, wet stereo pair out.
    pub fn process(&mut self, input: f32) -> (f32, f32) {
        for line in 0..NUM_LINES {
            let delayed = self.delays[line].read(self.taps[line]);
            self.read_buf[line] = self.dampers[line].process(delayed, self.damp_coeff);
        }

        // Householder reflection: x - (2/N) * sum(x), applied in O(N).
        let sum: f32 = self.read_buf.iter().sum();
        let g = 2.0 / NUM_LINES as f32;
        for line in 0..NUM_LINES {
            let mixed = self.read_buf[line] - g * sum;
            let write = input + mixed * self.feedback;
            self.delays[line].write(if write.is_finite() { write } else { 0.0 });
        }

        let mut left = 0.0;
        let mut right = 0.0;
        for line in (0..NUM_LINES).step_by(2) {
            left += self.read_buf[line];
            right += self.read_buf[line + 1];
        }
        (left * 0.25, right * 0.25)
    }
}
