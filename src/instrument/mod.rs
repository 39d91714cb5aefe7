//! # Instrument Profiles
//!
//! One immutable profile per supported instrument: how its written pitch relates to concert
//! pitch, what the score metadata should say about it, the range a beginner can play, and
//! the fingering chart used for annotations.
//!
//! ## Transposition
//! `transpose_chromatic` and `transpose_diatonic` have MusicXML `<transpose>` semantics:
//! the interval from written to sounding pitch. An alto saxophone sounds a major sixth below
//! written, so it is `-9` chromatic and `-5` diatonic.
//!
//! ## Home Key
//! The written key beginners on the instrument meet first (concert Bb major as read by that
//! instrument). The courtesy accidental policy treats the alterations of this key as the
//! ones a player expects.

mod charts;

use crate::error::ScoreError;
use crate::model::{Pitch, Step, Transpose};

/// One fingering chart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartEntry {
    pub step: Step,
    pub alter: i8,
    pub octave: i8,
    /// Finger numbers or valve combination
    pub text: &'static str,
    /// Woodwind key diagram, pressed = true
    pub holes: Option<[bool; 9]>,
}

/// How chart text is laid out on the staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartNotation {
    /// One mark per finger, stacked
    Woodwind,
    /// One valve-combination mark above the note
    Valves,
    None,
}

/// Comfortable written range in MIDI numbers, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayableRange {
    pub low: i32,
    pub high: i32,
}

impl PlayableRange {
    pub fn contains(&self, midi: i32) -> bool {
        midi >= self.low && midi <= self.high
    }
}

/// Letters a player expects to be sharp or flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeKey {
    pub sharps: &'static [Step],
    pub flats: &'static [Step],
}

impl HomeKey {
    pub const NONE: HomeKey = HomeKey {
        sharps: &[],
        flats: &[],
    };

    /// Alteration the home key gives `step`: +1, -1 or 0.
    pub fn alter_for(&self, step: Step) -> i8 {
        if self.sharps.contains(&step) {
            1
        } else if self.flats.contains(&step) {
            -1
        } else {
            0
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InstrumentProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub part_name: &'static str,
    pub transpose_chromatic: i8,
    pub transpose_diatonic: i8,
    pub sound_id: &'static str,
    pub midi_program: u8,
    pub playable_range: PlayableRange,
    pub home_key: HomeKey,
    /// Written pitches a beginner already knows, as (step, alter, octave)
    pub familiar_pitches: &'static [(Step, i8, i8)],
    pub chart: &'static [ChartEntry],
    pub chart_notation: ChartNotation,
}

impl InstrumentProfile {
    pub fn is_concert_pitch(&self) -> bool {
        self.transpose_chromatic == 0 && self.transpose_diatonic == 0
    }

    /// The `<transpose>` this instrument's parts should declare.
    pub fn transpose(&self) -> Transpose {
        Transpose {
            diatonic: self.transpose_diatonic,
            chromatic: self.transpose_chromatic,
            octave_change: None,
        }
    }

    pub fn fingering(&self, pitch: &Pitch) -> Option<&'static ChartEntry> {
        self.chart.iter().find(|entry| {
            entry.step == pitch.step && entry.alter == pitch.alter && entry.octave == pitch.octave
        })
    }

    pub fn is_familiar(&self, pitch: &Pitch) -> bool {
        self.familiar_pitches
            .contains(&(pitch.step, pitch.alter, pitch.octave))
    }
}

const FIRST_OCTAVE_NATURALS: &[(Step, i8, i8)] = &[
    (Step::C, 0, 4),
    (Step::D, 0, 4),
    (Step::E, 0, 4),
    (Step::F, 0, 4),
    (Step::G, 0, 4),
    (Step::A, 0, 4),
    (Step::B, 0, 4),
    (Step::C, 0, 5),
];

const SAX_FAMILIAR: &[(Step, i8, i8)] = &[
    (Step::B, -1, 3),
    (Step::B, 0, 3),
    (Step::C, 0, 4),
    (Step::D, 0, 4),
    (Step::E, 0, 4),
    (Step::F, 0, 4),
    (Step::G, 0, 4),
    (Step::A, 0, 4),
    (Step::B, 0, 4),
    (Step::C, 0, 5),
];

pub static PROFILES: [InstrumentProfile; 6] = [
    InstrumentProfile {
        id: "bb_trumpet",
        display_name: "Trumpet",
        part_name: "Trumpet in Bb",
        transpose_chromatic: -2,
        transpose_diatonic: -1,
        sound_id: "brass.trumpet.bflat",
        midi_program: 57,
        playable_range: PlayableRange { low: 55, high: 74 }, // G3..D5
        home_key: HomeKey::NONE,
        familiar_pitches: FIRST_OCTAVE_NATURALS,
        chart: charts::BB_TRUMPET,
        chart_notation: ChartNotation::Valves,
    },
    InstrumentProfile {
        id: "bb_clarinet",
        display_name: "Clarinet",
        part_name: "Clarinet in Bb",
        transpose_chromatic: -2,
        transpose_diatonic: -1,
        sound_id: "wind.reed.clarinet.bflat",
        midi_program: 72,
        playable_range: PlayableRange { low: 52, high: 70 }, // E3..Bb4
        home_key: HomeKey::NONE,
        familiar_pitches: &[],
        chart: &[],
        chart_notation: ChartNotation::None,
    },
    InstrumentProfile {
        id: "f_horn",
        display_name: "Horn",
        part_name: "Horn in F",
        transpose_chromatic: -7,
        transpose_diatonic: -4,
        sound_id: "brass.french-horn",
        midi_program: 61,
        playable_range: PlayableRange { low: 55, high: 72 }, // G3..C5
        home_key: HomeKey {
            sharps: &[],
            flats: &[Step::B],
        },
        familiar_pitches: FIRST_OCTAVE_NATURALS,
        chart: charts::F_HORN,
        chart_notation: ChartNotation::Valves,
    },
    InstrumentProfile {
        id: "eb_alto_sax",
        display_name: "Alto Saxophone",
        part_name: "Alto Saxophone in Eb",
        transpose_chromatic: -9,
        transpose_diatonic: -5,
        sound_id: "reed.saxophone.alto",
        midi_program: 66,
        playable_range: PlayableRange { low: 58, high: 72 }, // Bb3..C5
        home_key: HomeKey {
            sharps: &[Step::F],
            flats: &[],
        },
        familiar_pitches: SAX_FAMILIAR,
        chart: charts::ALTO_SAX,
        chart_notation: ChartNotation::Woodwind,
    },
    InstrumentProfile {
        id: "flute",
        display_name: "Flute",
        part_name: "Flute",
        transpose_chromatic: 0,
        transpose_diatonic: 0,
        sound_id: "wind.flutes.flute",
        midi_program: 74,
        playable_range: PlayableRange { low: 60, high: 79 }, // C4..G5
        home_key: HomeKey {
            sharps: &[],
            flats: &[Step::B, Step::E],
        },
        familiar_pitches: &[],
        chart: &[],
        chart_notation: ChartNotation::None,
    },
    InstrumentProfile {
        id: "concert_pitch",
        display_name: "Concert Pitch",
        part_name: "Concert Pitch",
        transpose_chromatic: 0,
        transpose_diatonic: 0,
        sound_id: "keyboard.piano",
        midi_program: 1,
        playable_range: PlayableRange { low: 21, high: 108 }, // piano range
        home_key: HomeKey {
            sharps: &[],
            flats: &[Step::B, Step::E],
        },
        familiar_pitches: &[],
        chart: &[],
        chart_notation: ChartNotation::None,
    },
];

/// Look up a profile by id.
///
/// # Example
/// ```
/// use easyscore::instrument::profile;
///
/// let sax = profile("eb_alto_sax").unwrap();
/// assert_eq!(sax.transpose_chromatic, -9);
/// assert!(profile("kazoo").is_err());
/// ```
pub fn profile(id: &str) -> Result<&'static InstrumentProfile, ScoreError> {
    PROFILES
        .iter()
        .find(|p| p.id == id.trim())
        .ok_or_else(|| ScoreError::UnknownInstrument(id.to_string()))
}

pub fn profile_ids() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_resolve() {
        for id in profile_ids() {
            assert_eq!(profile(id).unwrap().id, id);
        }
        assert_eq!(profile_ids().count(), 6);
    }

    #[test]
    fn test_unknown_profile() {
        assert!(matches!(
            profile("bagpipes"),
            Err(ScoreError::UnknownInstrument(ref id)) if id == "bagpipes"
        ));
    }

    #[test]
    fn test_concert_pitch_detection() {
        assert!(profile("flute").unwrap().is_concert_pitch());
        assert!(profile("concert_pitch").unwrap().is_concert_pitch());
        assert!(!profile("f_horn").unwrap().is_concert_pitch());
    }

    #[test]
    fn test_chart_lookup() {
        let trumpet = profile("bb_trumpet").unwrap();
        let entry = trumpet.fingering(&"F#4".parse().unwrap()).unwrap();
        assert_eq!(entry.text, "2");
        assert!(entry.holes.is_none());
        assert!(trumpet.fingering(&"C7".parse().unwrap()).is_none());

        let sax = profile("eb_alto_sax").unwrap();
        let entry = sax.fingering(&"G4".parse().unwrap()).unwrap();
        assert_eq!(entry.text, "T");
        let holes = entry.holes.unwrap();
        assert!(holes[0]);
        assert!(holes[1..].iter().all(|closed| !closed));
    }

    #[test]
    fn test_enharmonic_chart_rows_agree() {
        let sax = profile("eb_alto_sax").unwrap();
        let c_sharp = sax.fingering(&"C#4".parse().unwrap()).unwrap();
        let d_flat = sax.fingering(&"Db4".parse().unwrap()).unwrap();
        assert_eq!(c_sharp.text, d_flat.text);
        assert_eq!(c_sharp.holes, d_flat.holes);
    }

    #[test]
    fn test_familiar_pitches() {
        let sax = profile("eb_alto_sax").unwrap();
        assert!(sax.is_familiar(&"Bb3".parse().unwrap()));
        assert!(!sax.is_familiar(&"F#4".parse().unwrap()));
    }

    #[test]
    fn test_ranges_are_ordered() {
        for p in PROFILES.iter() {
            assert!(p.playable_range.low < p.playable_range.high, "{}", p.id);
        }
        assert!(profile("eb_alto_sax").unwrap().playable_range.contains(72));
        assert!(!profile("eb_alto_sax").unwrap().playable_range.contains(73));
    }

    #[test]
    fn test_home_key_alterations() {
        let horn = profile("f_horn").unwrap();
        assert_eq!(horn.home_key.alter_for(Step::B), -1);
        assert_eq!(horn.home_key.alter_for(Step::F), 0);
        assert_eq!(HomeKey::NONE.alter_for(Step::F), 0);
    }
}
