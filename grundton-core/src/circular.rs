//! # Pitch-Class Module
//!
//! Octave-folded pitch representation and its circular statistics.
//!
//! A frequency maps to a **pitch class**: its position within one octave in
//! cents, with C at 0 and A at 900 (equal temperament, A4 = 440 Hz). Pitch
//! classes live on a circle (1190 cents is 10 cents away from 0), so they
//! are averaged as unit vectors rather than as plain numbers.
//!
//! ## Features
//! - Hz to fractional MIDI note number
//! - Hz to pitch class in `[0, 1200)` cents
//! - Circular mean of pitch classes
//! - Note names with English or German spelling

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Reference pitch of A4 in Hz.
pub const A4_HZ: f32 = 440.0;
/// MIDI note number of A4.
pub const A4_MIDI: f32 = 69.0;
/// Cents in one octave.
pub const OCTAVE_CENTS: f32 = 1200.0;

const NAMES_EN: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NAMES_DE: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "H",
];

/// Spelling used for note names. German names the B natural "H".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spelling {
    #[default]
    English,
    German,
}

impl Spelling {
    fn names(self) -> &'static [&'static str; 12] {
        match self {
            Spelling::English => &NAMES_EN,
            Spelling::German => &NAMES_DE,
        }
    }
}

/// The nearest equal-tempered note to a frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteName {
    /// Note name without octave (e.g., "A", "C#")
    pub name: &'static str,
    /// Scientific octave number (A4 = 440 Hz)
    pub octave: i32,
    /// Deviation from the note in whole cents, in `-50..=50`
    pub cents: i32,
}

impl std::fmt::Display for NoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} ({:+} ct)", self.name, self.octave, self.cents)
    }
}

/// Converts a frequency to a fractional MIDI note number.
pub fn hz_to_midi(hz: f32) -> f32 {
    A4_MIDI + 12.0 * (hz / A4_HZ).log2()
}

/// Converts a frequency to its pitch class in cents, in `[0, 1200)`.
pub fn to_pitch_class(hz: f32) -> f32 {
    let cents = (hz_to_midi(hz) * 100.0) % OCTAVE_CENTS;
    wrap_cents(cents)
}

/// Folds any cent value into `[0, 1200)`.
pub fn wrap_cents(cents: f32) -> f32 {
    let wrapped = (cents % OCTAVE_CENTS + OCTAVE_CENTS) % OCTAVE_CENTS;
    // (-tiny + 1200) % 1200 rounds to 1200.0 in f32.
    if wrapped >= OCTAVE_CENTS { 0.0 } else { wrapped }
}

/// Circular mean of pitch classes given in cents.
///
/// Each value becomes a unit vector at angle `2π·c/1200`; the mean is the
/// direction of their sum. Returns `None` for an empty input. Note that 0
/// is a valid result (pitch class C), not a "no data" marker.
///
/// If the vectors cancel exactly the direction is arbitrary; `atan2(0, 0)`
/// then yields 0.
pub fn circular_mean(pitch_classes: &[f32]) -> Option<f32> {
    if pitch_classes.is_empty() {
        return None;
    }
    let (x, y) = pitch_classes.iter().fold((0.0f32, 0.0f32), |(x, y), &c| {
        let angle = TAU * (c / OCTAVE_CENTS);
        (x + angle.cos(), y + angle.sin())
    });
    let mean = y.atan2(x);
    Some(wrap_cents(mean / TAU * OCTAVE_CENTS))
}

/// Circular mean pitch class of a set of frequencies.
pub fn circular_mean_hz(frequencies: &[f32]) -> Option<f32> {
    let classes: Vec<f32> = frequencies.iter().map(|&hz| to_pitch_class(hz)).collect();
    circular_mean(&classes)
}

/// Finds the nearest note name, octave and cent deviation for a MIDI number.
pub fn midi_to_note_name(midi: f32, spelling: Spelling) -> NoteName {
    let nearest = midi.round();
    let n = nearest as i32;
    NoteName {
        name: spelling.names()[n.rem_euclid(12) as usize],
        octave: n.div_euclid(12) - 1,
        cents: ((midi - nearest) * 100.0).round() as i32,
    }
}

/// [`midi_to_note_name`] for a frequency.
pub fn hz_to_note_name(hz: f32, spelling: Spelling) -> NoteName {
    midi_to_note_name(hz_to_midi(hz), spelling)
}

/// Name of the pitch class nearest to `cents` (0 = C, 100 = C#, ...).
pub fn pitch_class_name(cents: f32, spelling: Spelling) -> &'static str {
    let step = (wrap_cents(cents) / 100.0).round() as usize % 12;
    spelling.names()[step]
}
