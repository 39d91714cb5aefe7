//! Static fingering charts, keyed by written pitch.
//!
//! Saxophone entries carry a nine-key diagram in the order
//! `LH-thumb, LH-1, LH-2, LH-3, RH-1, RH-2, RH-3, RH-4, octave key`, written as a pattern
//! where `x` is a pressed key and `-` an open one. Brass entries are valve combinations
//! ("0" is open).

use super::ChartEntry;
use crate::model::Step;

const fn keys(pattern: &[u8; 9]) -> [bool; 9] {
    let mut out = [false; 9];
    let mut i = 0;
    while i < 9 {
        out[i] = pattern[i] == b'x';
        i += 1;
    }
    out
}

const fn sax(
    step: Step,
    alter: i8,
    octave: i8,
    text: &'static str,
    pattern: &[u8; 9],
) -> ChartEntry {
    ChartEntry {
        step,
        alter,
        octave,
        text,
        holes: Some(keys(pattern)),
    }
}

const fn valves(step: Step, alter: i8, octave: i8, text: &'static str) -> ChartEntry {
    ChartEntry {
        step,
        alter,
        octave,
        text,
        holes: None,
    }
}

/// Alto saxophone, written Bb3 to B5. Notes from C#5 up need the octave key.
pub const ALTO_SAX: &[ChartEntry] = &[
    sax(Step::B, -1, 3, "123 123C", b"xxxxxxxx-"), // Bb3
    sax(Step::B, 0, 3, "123 123", b"xxxxxxx--"), // B3
    sax(Step::C, 0, 4, "123 12", b"xxxxxx---"), // C4
    sax(Step::C, 1, 4, "123 1", b"xxxxx----"), // C#4
    sax(Step::D, -1, 4, "123 1", b"xxxxx----"), // Db4
    sax(Step::D, 0, 4, "123", b"xxxx-----"), // D4
    sax(Step::D, 1, 4, "12", b"xxx------"), // D#4
    sax(Step::E, -1, 4, "12", b"xxx------"), // Eb4
    sax(Step::E, 0, 4, "1", b"xx-------"), // E4
    sax(Step::F, 0, 4, "1 1", b"xx--x----"), // F4
    sax(Step::F, 1, 4, "123 12 LowC", b"xxxxxx---"), // F#4
    sax(Step::G, -1, 4, "123 12 LowC", b"xxxxxx---"), // Gb4
    sax(Step::G, 0, 4, "T", b"x--------"), // G4
    sax(Step::G, 1, 4, "23 123", b"x-xxxxx--"), // G#4
    sax(Step::A, -1, 4, "23 123", b"x-xxxxx--"), // Ab4
    sax(Step::A, 0, 4, "2 123", b"x-x-xxx--"), // A4
    sax(Step::A, 1, 4, "2 12", b"x-x-xx---"), // A#4
    sax(Step::B, -1, 4, "2 12", b"x-x-xx---"), // Bb4
    sax(Step::B, 0, 4, "2", b"x-x------"), // B4
    sax(Step::C, 0, 5, "2 1", b"x-x-x----"), // C5
    sax(Step::C, 1, 5, "Oct", b"x-------x"), // C#5
    sax(Step::D, -1, 5, "Oct", b"x-------x"), // Db5
    sax(Step::D, 0, 5, "123 123 Oct", b"xxxxxxx-x"), // D5
    sax(Step::D, 1, 5, "12 1 Oct", b"xxx-x---x"), // D#5
    sax(Step::E, -1, 5, "12 1 Oct", b"xxx-x---x"), // Eb5
    sax(Step::E, 0, 5, "12 12 Oct", b"xxx-xx--x"), // E5
    sax(Step::F, 0, 5, "1 12 Oct", b"xx--xx--x"), // F5
    sax(Step::F, 1, 5, "1 2 Oct", b"xx-x----x"), // F#5
    sax(Step::G, -1, 5, "1 2 Oct", b"xx-x----x"), // Gb5
    sax(Step::G, 0, 5, "Oct", b"x-------x"), // G5
    sax(Step::A, 0, 5, "2 123 Oct", b"x-x-xxx-x"), // A5
    sax(Step::B, 0, 5, "2 Oct", b"x-x-----x"), // B5
];

/// Bb trumpet, written F#3 to G5.
pub const BB_TRUMPET: &[ChartEntry] = &[
    valves(Step::F, 1, 3, "2"), // F#3
    valves(Step::G, 0, 3, "0"), // G3
    valves(Step::G, 1, 3, "23"), // G#3
    valves(Step::A, -1, 3, "23"), // Ab3
    valves(Step::A, 0, 3, "12"), // A3
    valves(Step::A, 1, 3, "1"), // A#3
    valves(Step::B, -1, 3, "1"), // Bb3
    valves(Step::B, 0, 3, "2"), // B3
    valves(Step::C, 0, 4, "0"), // C4
    valves(Step::C, 1, 4, "23"), // C#4
    valves(Step::D, -1, 4, "23"), // Db4
    valves(Step::D, 0, 4, "13"), // D4
    valves(Step::D, 1, 4, "2"), // D#4
    valves(Step::E, -1, 4, "2"), // Eb4
    valves(Step::E, 0, 4, "12"), // E4
    valves(Step::F, 0, 4, "1"), // F4
    valves(Step::F, 1, 4, "2"), // F#4
    valves(Step::G, -1, 4, "2"), // Gb4
    valves(Step::G, 0, 4, "0"), // G4
    valves(Step::G, 1, 4, "23"), // G#4
    valves(Step::A, -1, 4, "23"), // Ab4
    valves(Step::A, 0, 4, "12"), // A4
    valves(Step::A, 1, 4, "1"), // A#4
    valves(Step::B, -1, 4, "1"), // Bb4
    valves(Step::B, 0, 4, "2"), // B4
    valves(Step::C, 0, 5, "0"), // C5
    valves(Step::C, 1, 5, "23"), // C#5
    valves(Step::D, -1, 5, "23"), // Db5
    valves(Step::D, 0, 5, "13"), // D5
    valves(Step::D, 1, 5, "2"), // D#5
    valves(Step::E, -1, 5, "2"), // Eb5
    valves(Step::E, 0, 5, "12"), // E5
    valves(Step::F, 0, 5, "1"), // F5
    valves(Step::F, 1, 5, "2"), // F#5
    valves(Step::G, -1, 5, "2"), // Gb5
    valves(Step::G, 0, 5, "0"), // G5
];

/// Horn in F (F side), written B3 to C6.
pub const F_HORN: &[ChartEntry] = &[
    valves(Step::B, 0, 3, "123"), // B3
    valves(Step::C, 0, 4, "12"), // C4
    valves(Step::C, 1, 4, "2"), // C#4
    valves(Step::D, -1, 4, "2"), // Db4
    valves(Step::D, 0, 4, "1"), // D4
    valves(Step::D, 1, 4, "23"), // D#4
    valves(Step::E, -1, 4, "23"), // Eb4
    valves(Step::E, 0, 4, "12"), // E4
    valves(Step::F, 0, 4, "1"), // F4
    valves(Step::F, 1, 4, "2"), // F#4
    valves(Step::G, -1, 4, "2"), // Gb4
    valves(Step::G, 0, 4, "0"), // G4
    valves(Step::G, 1, 4, "23"), // G#4
    valves(Step::A, -1, 4, "23"), // Ab4
    valves(Step::A, 0, 4, "12"), // A4
    valves(Step::A, 1, 4, "1"), // A#4
    valves(Step::B, -1, 4, "1"), // Bb4
    valves(Step::B, 0, 4, "2"), // B4
    valves(Step::C, 0, 5, "0"), // C5
    valves(Step::C, 1, 5, "23"), // C#5
    valves(Step::D, -1, 5, "23"), // Db5
    valves(Step::D, 0, 5, "12"), // D5
    valves(Step::D, 1, 5, "1"), // D#5
    valves(Step::E, -1, 5, "1"), // Eb5
    valves(Step::E, 0, 5, "2"), // E5
    valves(Step::F, 0, 5, "0"), // F5
    valves(Step::F, 1, 5, "23"), // F#5
    valves(Step::G, -1, 5, "23"), // Gb5
    valves(Step::G, 0, 5, "12"), // G5
    valves(Step::G, 1, 5, "1"), // G#5
    valves(Step::A, -1, 5, "1"), // Ab5
    valves(Step::A, 0, 5, "2"), // A5
    valves(Step::A, 1, 5, "0"), // A#5
    valves(Step::B, -1, 5, "0"), // Bb5
    valves(Step::B, 0, 5, "23"), // B5
    valves(Step::C, 0, 6, "12"), // C6
];
