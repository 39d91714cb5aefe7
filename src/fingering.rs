//! Fingering annotations from the instrument's chart.
//!
//! Two policies choose which notes are annotated: notes showing an accidental (courtesy or
//! written, naturals included), or chart pitches the player has not learned yet. Brass
//! charts give one valve combination placed above the note. Woodwind charts give finger
//! numbers stacked one per mark, a key diagram, or both.
//!
//! A note that already carries a fingering is never annotated again, so running the pass
//! twice gives the same score.

use crate::instrument::{ChartEntry, ChartNotation, InstrumentProfile};
use crate::model::{Annotation, Note, Score};
use crate::options::FingeringStyle;
use tracing::{debug, info};

/// Which notes get a fingering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingeringPolicy {
    /// Notes with a visible accidental
    Accidentals,
    /// Chart pitches outside the profile's familiar list
    UnfamiliarPitches,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingeringStats {
    pub fingerings_added: usize,
}

pub fn add_fingerings(
    score: &Score,
    profile: &InstrumentProfile,
    policy: FingeringPolicy,
    style: FingeringStyle,
) -> (Score, FingeringStats) {
    let mut result = score.clone();
    let mut stats = FingeringStats::default();

    if profile.chart_notation == ChartNotation::None {
        info!(instrument = profile.id, "no fingering chart, skipping");
        return (result, stats);
    }

    for part in &mut result.parts {
        for measure in &mut part.measures {
            let number = measure.number;
            for note in measure.notes_mut() {
                if note.has_fingering() || !selected(note, profile, policy) {
                    continue;
                }
                let Some(entry) = profile.fingering(&note.pitch) else {
                    continue;
                };
                let annotations = annotations_for(entry, profile.chart_notation, style);
                if annotations.is_empty() {
                    continue;
                }
                debug!(measure = number, pitch = %note.pitch, fingering = entry.text, "added fingering");
                note.annotations.extend(annotations);
                stats.fingerings_added += 1;
            }
        }
    }

    info!(
        instrument = profile.id,
        ?policy,
        added = stats.fingerings_added,
        "fingerings done"
    );
    (result, stats)
}

fn selected(note: &Note, profile: &InstrumentProfile, policy: FingeringPolicy) -> bool {
    match policy {
        FingeringPolicy::Accidentals => note.accidental.is_some(),
        FingeringPolicy::UnfamiliarPitches => !profile.is_familiar(&note.pitch),
    }
}

/// Annotations drawn for one chart entry.
pub fn annotations_for(
    entry: &ChartEntry,
    notation: ChartNotation,
    style: FingeringStyle,
) -> Vec<Annotation> {
    match notation {
        ChartNotation::None => Vec::new(),
        ChartNotation::Valves => vec![Annotation::Fingering {
            text: entry.text.to_string(),
            placement: Some("above".to_string()),
        }],
        ChartNotation::Woodwind => {
            let mut annotations = Vec::new();
            if style.shows_numbers() {
                annotations.extend(finger_marks(entry.text).into_iter().map(|text| {
                    Annotation::Fingering {
                        text,
                        placement: None,
                    }
                }));
            }
            if style.shows_holes() {
                if let Some(holes) = entry.holes {
                    annotations.extend(holes.iter().map(|&closed| Annotation::Hole { closed }));
                }
            }
            annotations
        }
    }
}

/// Split woodwind chart text into single marks, last mark first so they stack top-down.
///
/// "123 12 LowC" gives `C 2 1 3 2 1`; "Oct" is drawn as "8va".
pub fn finger_marks(text: &str) -> Vec<String> {
    let mut marks = Vec::new();
    for group in text.split_whitespace() {
        match group {
            "Oct" => marks.push("8va".to_string()),
            "LowC" => marks.push("C".to_string()),
            _ => marks.extend(
                group
                    .chars()
                    .filter(|c| c.is_ascii_digit() || matches!(c, 'C' | 'T'))
                    .map(String::from),
            ),
        }
    }
    marks.reverse();
    marks
}
