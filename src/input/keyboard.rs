use crate::synth::command::Controller;
use crate::synth::voice::SourceKind;
use crate::synth::wavetable::{presets, DEFAULT_TABLE_SIZE};
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::collections::HashMap;
use std::sync::Arc;

/// Intensity used for every computer-keyboard press; a real touch surface
/// supplies this per contact.
const KEY_INTENSITY: f32 = 0.8;

/// Polls the computer keyboard as a stand-in for the touch surface: the home
/// row plays slots left to right, comma/period cycle the waveform preset.
pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_slot: HashMap<Keycode, usize>,
    control_keys: HashMap<Keycode, bool>,
    preset_index: usize,
}

impl KeyboardHandler {
    pub fn new() -> Self {
        let key_to_slot: HashMap<Keycode, usize> = [
            (Keycode::A, 0),
            (Keycode::S, 1),
            (Keycode::D, 2),
            (Keycode::F, 3),
            (Keycode::G, 4),
            (Keycode::H, 5),
            (Keycode::J, 6),
            (Keycode::K, 7),
            (Keycode::L, 8),
            (Keycode::Semicolon, 9),
        ]
        .iter()
        .cloned()
        .collect();

        let mut key_states = HashMap::new();
        for key in key_to_slot.keys() {
            key_states.insert(*key, false);
        }

        let mut control_keys = HashMap::new();
        control_keys.insert(Keycode::Comma, false);
        control_keys.insert(Keycode::Dot, false);

        Self {
            device_state: DeviceState::new(),
            key_states,
            key_to_slot,
            control_keys,
            preset_index: 0,
        }
    }

    pub fn update(&mut self, controller: &Controller) {
        let keys: Vec<Keycode> = self.device_state.get_keys();

        for (key, slot) in &self.key_to_slot {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).copied().unwrap_or(false);
            if is_pressed != was_pressed {
                // One synthetic contact per physical key.
                let contact = *slot as u64;
                if is_pressed {
                    controller.note_on(*slot, contact, KEY_INTENSITY, 0.0);
                } else {
                    controller.note_off(*slot, contact);
                }
                self.key_states.insert(*key, is_pressed);
            }
        }

        for (key, step) in [(Keycode::Comma, -1isize), (Keycode::Dot, 1isize)] {
            let is_pressed = keys.contains(&key);
            let was_pressed = self.control_keys.get(&key).copied().unwrap_or(false);
            if is_pressed && !was_pressed {
                self.cycle_preset(step, controller);
            }
            self.control_keys.insert(key, is_pressed);
        }
    }

    fn cycle_preset(&mut self, step: isize, controller: &Controller) {
        let options = presets();
        let count = options.len() as isize;
        self.preset_index = ((self.preset_index as isize + step).rem_euclid(count)) as usize;

        let (name, build) = options[self.preset_index];
        println!("Waveform preset: {name}");
        match build(DEFAULT_TABLE_SIZE) {
            Some(table) => controller.set_wavetable(Arc::new(table)),
            None => controller.set_source_kind(SourceKind::Sine),
        }
    }
}

impl Default for KeyboardHandler {
    fn default() -> Self {
        Self::new()
    }
}
