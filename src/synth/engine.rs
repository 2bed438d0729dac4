use std::sync::atomic::Ordering;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use ringbuf::HeapProducer;

use super::bank::VoiceBank;
use super::command::{Command, Controller};
use super::config::EngineConfig;
use super::diagnostics::{snapshot_ring, BankStats, DiagEvent, VoiceSnapshot, SNAPSHOT_PERIOD_SECS};
use super::mixbus::MixBus;
use super::oscillator::{Oscillator, Waveform};
use super::params::EngineParams;
use super::reverb::Reverb;

/// Frequency of the bring-up tone played before any bank is registered.
const FALLBACK_FREQ_HZ: f32 = 440.0;

/// Callback-side owner of everything audible: the voice bank, the tremolo
/// LFO, the mix bus and the reverb. All of it lives on the audio thread;
/// the paired `Controller` talks to it through a command channel and shared
/// atomic knobs, so the callback never takes a lock and never observes a
/// half-replaced voice set.
pub struct AudioEngine {
    sample_rate: f32,
    /// `None` until the first registration (bring-up tone); `Some` with an
    /// empty bank after `ClearVoices` (silence).
    bank: Option<VoiceBank>,
    fallback_osc: Oscillator,
    trem_lfo: Oscillator,
    reverb: Reverb,
    bus: MixBus,
    params: Arc<EngineParams>,
    commands: Receiver<Command>,
    reclaim: Sender<VoiceBank>,
    snapshots: HeapProducer<DiagEvent>,
    scratch: Vec<f32>,
    samples_until_snapshot: usize,
}

impl AudioEngine {
    /// Build an engine and the controller wired to it.
    pub fn new(config: &EngineConfig) -> (AudioEngine, Controller) {
        let (command_tx, command_rx) = channel();
        let (reclaim_tx, reclaim_rx) = channel();
        let (snapshot_tx, snapshot_rx) = snapshot_ring();
        let params = Arc::new(EngineParams::default());
        let sample_rate = config.sample_rate as f32;

        let engine = AudioEngine {
            sample_rate,
            bank: None,
            fallback_osc: Oscillator::new(Waveform::Saw),
            trem_lfo: Oscillator::new(Waveform::Sine),
            reverb: Reverb::new(sample_rate),
            bus: MixBus::new(sample_rate),
            params: params.clone(),
            commands: command_rx,
            reclaim: reclaim_tx,
            snapshots: snapshot_tx,
            scratch: vec![0.0; config.buffer_frames],
            samples_until_snapshot: (SNAPSHOT_PERIOD_SECS * sample_rate) as usize,
        };
        let controller = Controller::new(command_tx, params, reclaim_rx, snapshot_rx);
        (engine, controller)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Render one interleaved stereo block. Runs on the audio thread; never
    /// blocks and never panics.
    pub fn process_block(&mut self, output: &mut [f32]) {
        self.drain_commands();
        self.apply_params();

        let frames = output.len() / 2;
        if self.scratch.len() < frames {
            self.scratch.resize(frames, 0.0);
        }

        let trem_rate = self.params.trem_rate_hz.get();
        let trem_depth = self.params.trem_depth.get().clamp(0.0, 1.0);

        for frame in 0..frames {
            let mut dry = match self.bank.as_mut() {
                Some(bank) => bank.process(self.sample_rate),
                None => 0.5 * self.fallback_osc.tick(FALLBACK_FREQ_HZ, self.sample_rate),
            };

            let lfo = self.trem_lfo.tick(trem_rate, self.sample_rate);
            let modulation = 0.5 * (lfo + 1.0);
            dry *= 1.0 - trem_depth + trem_depth * modulation;

            self.scratch[frame] = dry;
        }

        // Bus before the reverb send: both the dry path and the reverb input
        // see the filtered, limited signal.
        if self.params.bus_enabled.load(Ordering::Relaxed) {
            self.bus.process(&mut self.scratch[..frames]);
        }

        let dry_mix = self.params.dry_mix.get();
        let wet_mix = self.params.wet_mix.get();
        for frame in 0..frames {
            let dry = self.scratch[frame];
            let (wet_l, wet_r) = self.reverb.process(dry);
            output[2 * frame] = dry * dry_mix + wet_l * wet_mix;
            output[2 * frame + 1] = dry * dry_mix + wet_r * wet_mix;
        }
        for sample in output[2 * frames..].iter_mut() {
            *sample = 0.0;
        }

        self.publish_snapshots(frames);
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::NoteOn {
                    slot,
                    contact,
                    intensity,
                    detune_cents,
                } => {
                    if let Some(bank) = self.bank.as_mut() {
                        bank.note_on(slot, contact, intensity, detune_cents);
                    }
                }
                Command::NoteMove {
                    slot,
                    contact,
                    intensity,
                    detune_cents,
                } => {
                    if let Some(bank) = self.bank.as_mut() {
                        bank.note_move(slot, contact, intensity, detune_cents);
                    }
                }
                Command::NoteOff { slot, contact } => {
                    if let Some(bank) = self.bank.as_mut() {
                        bank.note_off(slot, contact);
                    }
                }
                Command::ReplaceVoices(bank) => self.install_bank(bank),
                Command::ClearVoices => {
                    let next = self.bank.as_ref().map_or(0, |b| b.generation() + 1);
                    self.install_bank(VoiceBank::empty(next));
                }
                Command::SetVoiceFrequency { slot, hz } => {
                    if let Some(voice) = self.bank.as_mut().and_then(|b| b.voice_mut(slot)) {
                        voice.set_frequency(hz);
                    }
                }
                Command::SetSourceKind(kind) => {
                    if let Some(bank) = self.bank.as_mut() {
                        bank.set_all_source_kind(kind);
                    }
                }
                Command::SetWavetable(table) => {
                    if let Some(bank) = self.bank.as_mut() {
                        bank.set_all_wavetable(&table);
                    }
                }
                Command::SetVoiceTremolo { rate, depth } => {
                    if let Some(bank) = self.bank.as_mut() {
                        bank.set_all_tremolo(rate, depth);
                    }
                }
            }
        }
    }

    fn install_bank(&mut self, bank: VoiceBank) {
        if let Some(old) = self.bank.replace(bank) {
            // Freed on the control thread; dropped here only if it is gone.
            let _ = self.reclaim.send(old);
        }
    }

    fn apply_params(&mut self) {
        self.reverb.set_feedback(self.params.reverb_decay.get());
        self.reverb.set_room_size(self.params.reverb_room.get());
        self.trem_lfo.waveform = Waveform::from(self.params.trem_waveform.load(Ordering::Relaxed));
        self.bus.set_master_gain(self.params.master_gain.get());
        self.bus
            .set_limiter_threshold(self.params.limiter_threshold.get());
        self.bus.set_lowpass_hz(self.params.lowpass_hz.get());
        self.bus.set_lowpass_q(self.params.lowpass_q.get());
        self.bus
            .set_lowpass_enabled(self.params.lowpass_enabled.load(Ordering::Relaxed));
        self.bus
            .set_highpass_enabled(self.params.highpass_enabled.load(Ordering::Relaxed));
    }

    fn publish_snapshots(&mut self, frames: usize) {
        if self.samples_until_snapshot > frames {
            self.samples_until_snapshot -= frames;
            return;
        }
        self.samples_until_snapshot = (SNAPSHOT_PERIOD_SECS * self.sample_rate) as usize;

        let Some(bank) = self.bank.as_ref() else {
            return;
        };
        let mut active = 0usize;
        let mut gain_sum = 0.0f32;
        let mut peak = 0.0f32;
        for voice in bank.voices() {
            if voice.is_active() {
                active += 1;
                gain_sum += voice.gain();
            }
            peak = peak.max(voice.last_sample().abs());
        }
        let _ = self.snapshots.push(DiagEvent::Bank(BankStats {
            generation: bank.generation(),
            active_voices: active,
            gain_sum,
            peak,
        }));
        for voice in bank.voices().iter().filter(|v| v.is_active()) {
            let snapshot = DiagEvent::Voice(VoiceSnapshot {
                slot: voice.slot(),
                frequency: voice.frequency(),
                gain: voice.gain(),
                last_sample: voice.last_sample(),
            });
            if self.snapshots.push(snapshot).is_err() {
                // Ring full: drop the rest of this batch.
                break;
            }
        }
    }
}
