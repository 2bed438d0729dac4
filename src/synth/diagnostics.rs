use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// How often the audio thread publishes a snapshot batch.
pub const SNAPSHOT_PERIOD_SECS: f32 = 0.2;
const RING_CAPACITY: usize = 1024;

/// One observation published by the audio thread at a block boundary.
#[derive(Debug, Clone, Copy)]
pub enum DiagEvent {
    Bank(BankStats),
    Voice(VoiceSnapshot),
}

/// Aggregate state of the current voice bank.
#[derive(Debug, Clone, Copy)]
pub struct BankStats {
    pub generation: u64,
    pub active_voices: usize,
    pub gain_sum: f32,
    pub peak: f32,
}

/// Per-voice sample of envelope and signal state.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSnapshot {
    pub slot: usize,
    pub frequency: f32,
    pub gain: f32,
    pub last_sample: f32,
}

/// Bounded SPSC ring between the audio thread and the monitor. Pushes never
/// block; a full ring drops snapshots.
pub fn snapshot_ring() -> (HeapProducer<DiagEvent>, HeapConsumer<DiagEvent>) {
    HeapRb::new(RING_CAPACITY).split()
}

/// Warning thresholds for a live playing session.
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    pub period: Duration,
    pub clip_headroom: f32,
    pub voices_warn: usize,
    pub gain_jump_warn: f32,
    pub sample_jump_warn: f32,
    pub jank_warn: Duration,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(200),
            clip_headroom: 0.9,
            voices_warn: 8,
            gain_jump_warn: 0.20,
            sample_jump_warn: 0.70,
            jank_warn: Duration::from_millis(30),
        }
    }
}

/// Monitor thread draining the snapshot ring. Owns no audio state; every
/// value it sees was copied out by the audio thread at a block boundary.
pub struct Diagnostics {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Diagnostics {
    pub fn start(mut consumer: HeapConsumer<DiagEvent>, config: DiagnosticsConfig) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_flag = stop_flag.clone();

        let handle = std::thread::spawn(move || {
            let mut prev_gain: HashMap<usize, f32> = HashMap::new();
            let mut prev_sample: HashMap<usize, f32> = HashMap::new();
            let mut generation = 0u64;
            let mut expected = Instant::now() + config.period;

            while !thread_flag.load(Ordering::Relaxed) {
                let now = Instant::now();
                std::thread::sleep(expected.saturating_duration_since(now));
                let woke = Instant::now();
                if woke.saturating_duration_since(expected) > config.jank_warn {
                    println!(
                        "[CPU_JANK] drift_ms={}",
                        woke.saturating_duration_since(expected).as_millis()
                    );
                }
                expected += config.period;

                while let Some(event) = consumer.pop() {
                    match event {
                        DiagEvent::Bank(stats) => {
                            if stats.generation != generation {
                                // New bank: per-slot history is stale.
                                generation = stats.generation;
                                prev_gain.clear();
                                prev_sample.clear();
                            }
                            if stats.active_voices >= config.voices_warn {
                                println!(
                                    "[CLIP_RISK/OVERLAP] active={} sum_gain={}",
                                    stats.active_voices, stats.gain_sum
                                );
                            }
                            if stats.gain_sum > config.clip_headroom {
                                println!(
                                    "[CLIP_RISK] sum_gain={} > {}",
                                    stats.gain_sum, config.clip_headroom
                                );
                            }
                        }
                        DiagEvent::Voice(snap) => {
                            if let Some(&prev) = prev_gain.get(&snap.slot) {
                                let delta = snap.gain - prev;
                                if delta.abs() > config.gain_jump_warn {
                                    println!(
                                        "[GAIN_JUMP] f={} gain={} d={}",
                                        snap.frequency, snap.gain, delta
                                    );
                                }
                            }
                            prev_gain.insert(snap.slot, snap.gain);

                            if let Some(&prev) = prev_sample.get(&snap.slot) {
                                let delta = (snap.last_sample - prev).abs();
                                if delta > config.sample_jump_warn {
                                    println!(
                                        "[DISCONTINUITY] f={} sample_delta={}",
                                        snap.frequency, delta
                                    );
                                }
                            }
                            prev_sample.insert(snap.slot, snap.last_sample);
                        }
                    }
                }
            }
        });

        Self {
            stop_flag,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Diagnostics {
    fn drop(&mut self) {
        self.stop();
    }
}
