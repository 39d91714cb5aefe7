//! Key signature arithmetic.
//!
//! Key signatures are counted in fifths: positive for sharps, negative for flats. Moving a
//! key by an interval moves it a fixed number of steps around the circle of fifths, which is
//! what the instrument corrector uses to derive the written key of a transposing instrument.
//!
//! Sharps are added in the order `F C G D A E B`, flats in the order `B E A D G C F`.

use crate::model::Step;

/// Order in which sharps enter a key signature.
pub const SHARP_ORDER: [Step; 7] = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E, Step::B];

/// Order in which flats enter a key signature.
pub const FLAT_ORDER: [Step; 7] = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C, Step::F];

/// Key signature as it appears in a `<key>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySignature {
    pub fifths: i8, // -7 to +7 (flats to sharps)
    pub mode: Option<String>,
}

impl KeySignature {
    pub fn new(fifths: i8) -> Self {
        Self { fifths, mode: None }
    }

    /// Parse a key name like "G", "Bb", "F#", a minor key like "Gm" or "Ebm", or a count of
    /// sharps ("#", "##") or flats ("bb", "bbb").
    ///
    /// A single "b" is not a flat count; use "F" for one flat.
    pub fn from_name(s: &str) -> Option<Self> {
        let trimmed = s.trim();

        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '#') {
            let count = trimmed.len();
            return (count <= 7).then(|| Self::major(count as i8));
        }

        if trimmed.len() >= 2 && trimmed.chars().all(|c| c == 'b') {
            let count = trimmed.len();
            return (count <= 7).then(|| Self::major(-(count as i8)));
        }

        if let Some(tonic) = trimmed.strip_suffix('m').filter(|t| !t.is_empty()) {
            let fifths = match tonic {
                "A" => 0,
                "E" => 1,
                "B" => 2,
                "F#" | "Fs" => 3,
                "C#" | "Cs" => 4,
                "G#" | "Gs" => 5,
                "D#" | "Ds" => 6,
                "A#" | "As" => 7,
                "D" => -1,
                "G" => -2,
                "C" => -3,
                "F" => -4,
                "Bb" | "Bf" => -5,
                "Eb" | "Ef" => -6,
                "Ab" | "Af" => -7,
                _ => return None,
            };
            return Some(Self {
                fifths,
                mode: Some("minor".to_string()),
            });
        }

        let fifths = match trimmed {
            "C" => 0,
            "G" => 1,
            "D" => 2,
            "A" => 3,
            "E" => 4,
            "B" => 5,
            "F#" | "Fs" => 6,
            "C#" | "Cs" => 7,
            "F" => -1,
            "Bb" | "Bf" => -2,
            "Eb" | "Ef" => -3,
            "Ab" | "Af" => -4,
            "Db" | "Df" => -5,
            "Gb" | "Gf" => -6,
            "Cb" | "Cf" => -7,
            _ => return None,
        };
        Some(Self::major(fifths))
    }

    fn major(fifths: i8) -> Self {
        Self {
            fifths,
            mode: Some("major".to_string()),
        }
    }

    /// Steps this key alters, in the order they appear in the signature.
    pub fn altered_steps(&self) -> &'static [Step] {
        let count = self.fifths.unsigned_abs().min(7) as usize;
        if self.fifths >= 0 {
            &SHARP_ORDER[..count]
        } else {
            &FLAT_ORDER[..count]
        }
    }

    /// Alteration the key implies for a step: +1, -1 or 0.
    pub fn alter_for(&self, step: Step) -> i8 {
        if !self.altered_steps().contains(&step) {
            0
        } else if self.fifths > 0 {
            1
        } else {
            -1
        }
    }

    /// The same key moved `delta` fifths, clamped into [-7, 7].
    pub fn shifted(&self, delta: i8) -> Self {
        Self {
            fifths: clamp_fifths(self.fifths as i32 + delta as i32),
            mode: self.mode.clone(),
        }
    }
}

/// Circle-of-fifths movement for an upward interval of `semitones` (mod 12).
///
/// Major 2nd is +2, perfect 4th is -1, perfect 5th is +1, major 6th is +3.
pub fn fifths_delta(semitones: i32) -> i8 {
    match semitones.rem_euclid(12) {
        0 => 0,
        1 => -5,
        2 => 2,
        3 => -3,
        4 => 4,
        5 => -1,
        6 => 6,
        7 => 1,
        8 => -4,
        9 => 3,
        10 => -2,
        _ => 5,
    }
}

/// Bring a fifths count into [-7, 7] by enharmonic steps of 12.
pub fn clamp_fifths(fifths: i32) -> i8 {
    let mut fifths = fifths;
    while fifths > 7 {
        fifths -= 12;
    }
    while fifths < -7 {
        fifths += 12;
    }
    fifths as i8
}

/// Written key for an instrument whose written pitch sounds `chromatic` semitones away.
///
/// An instrument sounding a major second below written (`chromatic = -2`) reads a key two
/// fifths sharper than the concert key.
pub fn written_fifths(concert_fifths: i8, chromatic: i8) -> i8 {
    clamp_fifths(concert_fifths as i32 + fifths_delta(-(chromatic as i32)) as i32)
}
