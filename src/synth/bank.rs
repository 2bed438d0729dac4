use std::collections::HashMap;
use std::sync::Arc;

use super::config::VoiceConfig;
use super::mode::Mode;
use super::voice::{SourceKind, Voice};
use super::wavetable::Wavetable;

/// Arena of voices for the current tuning, rebuilt wholesale whenever the
/// mode or key count changes. Contact bookkeeping lives here, not in the
/// voices: a voice releases only once its last touch lifts.
pub struct VoiceBank {
    voices: Vec<Voice>,
    touches: Vec<HashMap<u64, f32>>,
    generation: u64,
}

impl VoiceBank {
    pub fn empty(generation: u64) -> Self {
        Self {
            voices: Vec::new(),
            touches: Vec::new(),
            generation,
        }
    }

    /// One voice per key, tuned from the mode's ratio ladder.
    pub fn from_mode(
        mode: &Mode,
        base_freq: f32,
        num_keys: usize,
        config: VoiceConfig,
        generation: u64,
    ) -> Self {
        let voices = (0..num_keys)
            .map(|slot| Voice::new(slot, mode.key_frequency(base_freq, slot), config))
            .collect();
        Self {
            voices,
            touches: vec![HashMap::new(); num_keys],
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice_mut(&mut self, slot: usize) -> Option<&mut Voice> {
        self.voices.get_mut(slot)
    }

    /// Register a contact; the voice plays at the loudest current touch.
    pub fn note_on(&mut self, slot: usize, contact: u64, intensity: f32, detune_cents: f32) {
        if slot >= self.voices.len() {
            return;
        }
        self.touches[slot].insert(contact, intensity.clamp(0.0, 1.0));
        let target = self.aggregate(slot);
        let voice = &mut self.voices[slot];
        voice.set_detune(detune_cents);
        voice.note_on(target);
    }

    /// Update a held contact. Moves for unknown contacts are dropped.
    pub fn note_move(&mut self, slot: usize, contact: u64, intensity: f32, detune_cents: f32) {
        if slot >= self.voices.len() || !self.touches[slot].contains_key(&contact) {
            return;
        }
        self.touches[slot].insert(contact, intensity.clamp(0.0, 1.0));
        let target = self.aggregate(slot);
        let voice = &mut self.voices[slot];
        voice.set_detune(detune_cents);
        voice.note_move(target);
    }

    /// Drop a contact; release the voice only when its set empties.
    pub fn note_off(&mut self, slot: usize, contact: u64) {
        if slot >= self.voices.len() {
            return;
        }
        self.touches[slot].remove(&contact);
        if self.touches[slot].is_empty() {
            self.voices[slot].note_off();
        } else {
            let target = self.aggregate(slot);
            self.voices[slot].note_move(target);
        }
    }

    fn aggregate(&self, slot: usize) -> f32 {
        self.touches[slot].values().fold(0.0f32, |m, &v| m.max(v))
    }

    pub fn set_all_source_kind(&mut self, kind: SourceKind) {
        for voice in self.voices.iter_mut() {
            voice.set_source_kind(kind);
        }
    }

    pub fn set_all_wavetable(&mut self, table: &Arc<Wavetable>) {
        for voice in self.voices.iter_mut() {
            voice.set_wavetable(Arc::clone(table));
        }
    }

    pub fn set_all_tremolo(&mut self, rate: f32, depth: f32) {
        for voice in self.voices.iter_mut() {
            voice.set_tremolo(rate, depth);
        }
    }

    /// Sum every voice's next sample.
    pub fn process(&mut self, sample_rate: f32) -> f32 {
        self.voices
            .iter_mut()
            .map(|voice| voice.process(sample_rate))
            .sum()
    }
}
