use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use ringbuf::HeapConsumer;

use super::bank::VoiceBank;
use super::diagnostics::DiagEvent;
use super::oscillator::Waveform;
use super::params::EngineParams;
use super::voice::SourceKind;
use super::wavetable::Wavetable;

/// Structural changes routed to the audio thread over a channel and drained
/// at block start. Scalar knobs travel through `EngineParams` instead.
pub enum Command {
    NoteOn {
        slot: usize,
        contact: u64,
        intensity: f32,
        detune_cents: f32,
    },
    NoteMove {
        slot: usize,
        contact: u64,
        intensity: f32,
        detune_cents: f32,
    },
    NoteOff {
        slot: usize,
        contact: u64,
    },
    ReplaceVoices(VoiceBank),
    ClearVoices,
    SetVoiceFrequency {
        slot: usize,
        hz: f32,
    },
    SetSourceKind(SourceKind),
    SetWavetable(Arc<Wavetable>),
    SetVoiceTremolo {
        rate: f32,
        depth: f32,
    },
}

/// Control-thread handle to a running engine. Sends are fire-and-forget;
/// once the stream is gone there is nobody left to tell.
pub struct Controller {
    commands: Sender<Command>,
    params: Arc<EngineParams>,
    reclaim: Receiver<VoiceBank>,
    diagnostics: Option<HeapConsumer<DiagEvent>>,
}

impl Controller {
    pub(crate) fn new(
        commands: Sender<Command>,
        params: Arc<EngineParams>,
        reclaim: Receiver<VoiceBank>,
        diagnostics: HeapConsumer<DiagEvent>,
    ) -> Self {
        Self {
            commands,
            params,
            reclaim,
            diagnostics: Some(diagnostics),
        }
    }

    fn send(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    // --- Voice control ---

    pub fn note_on(&self, slot: usize, contact: u64, intensity: f32, detune_cents: f32) {
        self.send(Command::NoteOn {
            slot,
            contact,
            intensity,
            detune_cents,
        });
    }

    pub fn note_move(&self, slot: usize, contact: u64, intensity: f32, detune_cents: f32) {
        self.send(Command::NoteMove {
            slot,
            contact,
            intensity,
            detune_cents,
        });
    }

    pub fn note_off(&self, slot: usize, contact: u64) {
        self.send(Command::NoteOff { slot, contact });
    }

    /// Swap in a freshly built bank; the old one comes back on the reclaim
    /// channel so it is freed off the audio thread.
    pub fn set_voices(&self, bank: VoiceBank) {
        self.send(Command::ReplaceVoices(bank));
    }

    pub fn clear_voices(&self) {
        self.send(Command::ClearVoices);
    }

    pub fn set_voice_frequency(&self, slot: usize, hz: f32) {
        self.send(Command::SetVoiceFrequency { slot, hz });
    }

    pub fn set_source_kind(&self, kind: SourceKind) {
        self.send(Command::SetSourceKind(kind));
    }

    pub fn set_wavetable(&self, table: Arc<Wavetable>) {
        self.send(Command::SetWavetable(table));
    }

    pub fn set_voice_tremolo(&self, rate: f32, depth: f32) {
        self.send(Command::SetVoiceTremolo { rate, depth });
    }

    // --- Panel knobs (atomics, read by the callback once per block) ---

    /// Slider 0..1 mapped to 0.1..10 Hz.
    pub fn set_tremolo_rate(&self, rate: f32) {
        self.params
            .trem_rate_hz
            .set(0.1 + rate.clamp(0.0, 1.0) * 9.9);
    }

    pub fn set_tremolo_depth(&self, depth: f32) {
        self.params.trem_depth.set(depth.clamp(0.0, 1.0));
    }

    pub fn set_tremolo_waveform(&self, waveform: Waveform) {
        self.params
            .trem_waveform
            .store(waveform as u32, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn set_reverb_decay(&self, decay: f32) {
        self.params.reverb_decay.set(decay.clamp(0.0, 0.99));
    }

    /// Wet mix 0..1; dry is kept complementary.
    pub fn set_reverb_mix(&self, mix: f32) {
        let wet = mix.clamp(0.0, 1.0);
        self.params.wet_mix.set(wet);
        self.params.dry_mix.set(1.0 - wet);
    }

    pub fn set_reverb_room_size(&self, room: f32) {
        self.params.reverb_room.set(room.clamp(0.0, 1.0));
    }

    pub fn set_master_gain(&self, gain: f32) {
        self.params.master_gain.set(gain.max(0.0));
    }

    pub fn set_limiter_threshold(&self, threshold: f32) {
        self.params.limiter_threshold.set(threshold.max(0.0));
    }

    pub fn set_lowpass_hz(&self, hz: f32) {
        self.params.lowpass_hz.set(hz);
    }

    pub fn set_lowpass_q(&self, q: f32) {
        self.params.lowpass_q.set(q);
    }

    pub fn set_lowpass_enabled(&self, enabled: bool) {
        self.params
            .lowpass_enabled
            .store(enabled, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn set_highpass_enabled(&self, enabled: bool) {
        self.params
            .highpass_enabled
            .store(enabled, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn set_bus_enabled(&self, enabled: bool) {
        self.params
            .bus_enabled
            .store(enabled, std::sync::atomic::Ordering::Relaxed);
    }

    // --- Housekeeping ---

    /// Drop any banks the audio thread has swapped out. Call this from the
    /// control loop so deallocation stays off the audio thread.
    pub fn reclaim(&self) {
        while let Ok(bank) = self.reclaim.try_recv() {
            drop(bank);
        }
    }

    /// Hand the snapshot consumer to a `Diagnostics` monitor. Yields `None`
    /// after the first call.
    pub fn take_diagnostics(&mut self) -> Option<HeapConsumer<DiagEvent>> {
        self.diagnostics.take()
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }
}
