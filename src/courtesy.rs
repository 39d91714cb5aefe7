//! Courtesy accidentals for players who read by letter rather than by key signature.
//!
//! The analysis keeps one history per letter (octave ignored) over the measures of a part:
//! where its first sharp, first flat and first natural appear, and the last measure in which
//! it carries a written accidental. A (letter, measure) pair is flagged when
//!
//! - it holds the letter's first sharp or flat and the home key expects that alteration, or
//!   its first natural and the home key alters the letter;
//! - it is the first measure using the letter after its last written accidental.
//!
//! Notes of a flagged letter without an accidental then get a cautionary one, at most once
//! per (letter, alteration) in the measure.

use crate::instrument::HomeKey;
use crate::model::{Accidental, AccidentalKind, Measure, Score, Step};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourtesyStats {
    pub accidentals_added: usize,
}

#[derive(Debug, Default)]
struct LetterHistory {
    first_sharp: Option<usize>,
    first_flat: Option<usize>,
    first_natural: Option<usize>,
    last_written: Option<usize>,
}

pub fn add_courtesy_accidentals(score: &Score, home_key: &HomeKey) -> (Score, CourtesyStats) {
    let mut result = score.clone();
    let mut stats = CourtesyStats::default();

    for part in &mut result.parts {
        let flagged = courtesy_points(&part.measures, home_key);
        for (index, measure) in part.measures.iter_mut().enumerate() {
            stats.accidentals_added += insert_courtesy(measure, index, &flagged);
        }
    }

    info!(added = stats.accidentals_added, "courtesy accidentals done");
    (result, stats)
}

/// (letter, measure index) pairs that need a courtesy accidental.
fn courtesy_points(measures: &[Measure], home_key: &HomeKey) -> HashSet<(Step, usize)> {
    let mut histories: HashMap<Step, LetterHistory> = HashMap::new();
    let mut flagged = HashSet::new();

    for (index, measure) in measures.iter().enumerate() {
        for note in measure.notes() {
            let step = note.pitch.step;
            let history = histories.entry(step).or_default();
            let expected = home_key.alter_for(step);

            if note.accidental.as_ref().is_some_and(|a| !a.cautionary) {
                history.last_written = Some(index);
            }

            let first = match note.pitch.alter {
                1 => &mut history.first_sharp,
                -1 => &mut history.first_flat,
                0 => &mut history.first_natural,
                _ => continue,
            };
            if first.is_none() {
                *first = Some(index);
                let needs = match note.pitch.alter {
                    0 => expected != 0,
                    alter => alter == expected,
                };
                if needs {
                    flagged.insert((step, index));
                }
            }
        }
    }

    for (step, history) in &histories {
        let Some(last) = history.last_written else {
            continue;
        };
        let next_use = measures
            .iter()
            .enumerate()
            .skip(last + 1)
            .find(|(_, m)| m.notes().any(|n| n.pitch.step == *step));
        if let Some((index, _)) = next_use {
            flagged.insert((*step, index));
        }
    }

    flagged
}

fn insert_courtesy(measure: &mut Measure, index: usize, flagged: &HashSet<(Step, usize)>) -> usize {
    let number = measure.number;
    let mut marked: HashSet<(Step, i8)> = HashSet::new();
    let mut added = 0;

    for note in measure.notes_mut() {
        let step = note.pitch.step;
        let alter = note.pitch.alter;
        if note.accidental.is_some() || !flagged.contains(&(step, index)) {
            continue;
        }
        if !(-1..=1).contains(&alter) || !marked.insert((step, alter)) {
            continue;
        }
        let Some(kind) = AccidentalKind::for_alter(alter) else {
            continue;
        };

        debug!(measure = number, pitch = %note.pitch, "added courtesy accidental");
        note.accidental = Some(Accidental::courtesy(kind));
        added += 1;
    }
    added
}
