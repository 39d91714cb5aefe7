//! # Range Transposition
//!
//! Moves notes by whole octaves so a beginner can play them.
//!
//! ## Hard Constraint
//! A note below the instrument's playable range goes up one octave; a note above it goes
//! down one octave. This is always applied, and only ever one octave.
//!
//! ## Melodic Smoothing
//! A note already in range may still sit a long leap away from its neighbours, typically
//! because the notes around it were just moved by the hard constraint. For such a note the
//! pass looks at up to `context` notes on each side in the same measure and computes
//! `max_jump`, the largest distance to any of them. If `max_jump > max_leap`, it tries the
//! note an octave up and an octave down and keeps the one that lowers `max_jump` the most
//! (down wins a tie). A shift is never taken if it does not strictly improve, or if it would
//! leave the floor/ceiling, which default to the playable range.
//!
//! Notes are decided left to right: preceding neighbours are seen at their new pitch,
//! following neighbours at their original pitch. Only the octave changes; spelling is kept.
//!
//! Chord members (`<chord/>` notes) are neither neighbours nor smoothed; only the hard
//! constraint applies to them.

use crate::instrument::{InstrumentProfile, PlayableRange};
use crate::model::{Event, Measure, Score};
use crate::options::RangeOptions;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeStats {
    pub notes_transposed: usize,
}

pub fn transpose_for_range(
    score: &Score,
    profile: &InstrumentProfile,
    options: &RangeOptions,
) -> (Score, RangeStats) {
    let mut result = score.clone();
    let mut stats = RangeStats::default();

    for part in &mut result.parts {
        for measure in &mut part.measures {
            stats.notes_transposed += transpose_measure(measure, profile.playable_range, options);
        }
    }

    info!(
        instrument = profile.id,
        transposed = stats.notes_transposed,
        "range transposition done"
    );
    (result, stats)
}

/// Shift notes of one measure in place, returning how many moved.
pub fn transpose_measure(
    measure: &mut Measure,
    range: PlayableRange,
    options: &RangeOptions,
) -> usize {
    let floor = options.floor.unwrap_or(range.low);
    let ceiling = options.ceiling.unwrap_or(range.high);

    let number = measure.number;
    // Chord members are not part of the melodic line
    let input: Vec<i32> = measure
        .notes()
        .filter(|n| !n.chord)
        .map(|n| n.pitch.midi())
        .collect();
    let mut decided = input.clone();
    let mut k: usize = 0;
    let mut moved = 0;

    for note in measure.notes_mut() {
        let current = note.pitch.midi();
        let shift = if current < range.low {
            12
        } else if current > range.high {
            -12
        } else if note.chord {
            0
        } else {
            let preceding = &decided[k.saturating_sub(options.context)..k];
            let end = k.saturating_add(1).saturating_add(options.context).min(input.len());
            let following = &input[k + 1..end];
            smoothing_shift(current, preceding, following, options.max_leap, floor, ceiling)
        };

        if !note.chord {
            decided[k] = current + shift;
            k += 1;
        }
        if shift != 0 {
            let from = note.pitch;
            note.pitch = note.pitch.shifted_octaves((shift / 12) as i8);
            moved += 1;
            debug!(measure = number, %from, to = %note.pitch, "moved octave");
        }
    }

    moved
}

/// Octave shift (+12, -12 or 0) for an in-range note.
fn smoothing_shift(
    current: i32,
    preceding: &[i32],
    following: &[i32],
    max_leap: i32,
    floor: i32,
    ceiling: i32,
) -> i32 {
    let neighbours: Vec<i32> = preceding.iter().chain(following).copied().collect();
    let max_jump = |pitch: i32| {
        neighbours
            .iter()
            .map(|n| (pitch - n).abs())
            .max()
            .unwrap_or(0)
    };

    if neighbours.is_empty() {
        return 0;
    }
    let baseline = max_jump(current);
    if baseline <= max_leap {
        return 0;
    }

    // Down first so it wins ties.
    [-12, 12]
        .into_iter()
        .filter(|shift| (floor..=ceiling).contains(&(current + shift)))
        .map(|shift| (max_jump(current + shift), shift))
        .filter(|(jump, _)| *jump < baseline)
        .min_by_key(|(jump, _)| *jump)
        .map(|(_, shift)| shift)
        .unwrap_or(0)
}

/// Whether every note of the measure lies in `range`.
pub fn measure_in_range(measure: &Measure, range: PlayableRange) -> bool {
    measure
        .events
        .iter()
        .filter_map(Event::as_note)
        .all(|n| range.contains(n.pitch.midi()))
}
