//! # Rhythm Simplification
//!
//! Merges short subdivided notes into one note on the beat, so beginners read fewer, longer
//! notes. Rules are tried left to right over each measure and never overlap:
//!
//! 1. Dotted quarter note + eighth note → half note (the eighth is absorbed)
//! 2. Eighth note + eighth note or eighth rest → quarter note (the second is absorbed)
//! 3. Eighth rest + eighth note → quarter rest (the note is absorbed)
//!
//! The surviving event keeps its pitch, accidental, articulations and annotations; its
//! duration becomes the sum of the pair, so every measure keeps its length.
//!
//! Two events only form a pair when they are both plain (no tuplet, not part of a chord), in
//! the same voice, and nothing else in the measure (a direction, an attribute change, a grace
//! note) sits between them.
//!
//! Afterwards all beams are removed, since beaming groups no longer match the notes, and ties
//! and slurs are repaired so that every start has a matching stop.

use crate::model::{Event, Measure, Note, NoteType, Rest, Score, SlurKind};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RhythmStats {
    pub measures_processed: usize,
    /// One per merge, however many events it absorbed
    pub notes_merged: usize,
}

/// Apply the merge rules to every measure of every part.
pub fn simplify_rhythm(score: &Score) -> (Score, RhythmStats) {
    let mut result = score.clone();
    let mut stats = RhythmStats::default();

    for part in &mut result.parts {
        for measure in &mut part.measures {
            let merges = simplify_measure(measure);
            if merges > 0 {
                debug!(part = %part.id, measure = measure.number, merges, "merged notes");
            }
            stats.notes_merged += merges;
            stats.measures_processed += 1;
        }
    }

    repair_ties(&mut result);
    repair_slurs(&mut result);

    info!(
        measures = stats.measures_processed,
        merged = stats.notes_merged,
        "rhythm simplification done"
    );
    (result, stats)
}

/// Merge pairs in one measure in place, returning the number of merges.
pub fn simplify_measure(measure: &mut Measure) -> usize {
    let before_total = measure.total_duration();
    let old_events = std::mem::take(&mut measure.events);

    // new_index[i] = position in the new event list of whatever absorbed old event i
    let mut new_index = vec![0usize; old_events.len() + 1];
    let mut events: Vec<Event> = Vec::with_capacity(old_events.len());
    let mut merges = 0;
    let mut i = 0;

    while i < old_events.len() {
        let merged = if can_pair(&old_events, i, measure) {
            merge_pair(&old_events[i], &old_events[i + 1])
        } else {
            None
        };

        match merged {
            Some(event) => {
                new_index[i] = events.len();
                new_index[i + 1] = events.len();
                events.push(event);
                merges += 1;
                i += 2;
            }
            None => {
                new_index[i] = events.len();
                events.push(old_events[i].clone());
                i += 1;
            }
        }
    }
    new_index[old_events.len()] = events.len();

    for inline in &mut measure.inline {
        inline.before = new_index[inline.before.min(old_events.len())];
    }
    measure.events = events;

    for note in measure.notes_mut() {
        note.beams.clear();
    }

    debug_assert_eq!(
        before_total,
        measure.total_duration(),
        "measure {} changed length",
        measure.number
    );
    merges
}

/// Whether events `i` and `i + 1` may be merged, regardless of their note values.
fn can_pair(events: &[Event], i: usize, measure: &Measure) -> bool {
    let (Some(first), Some(second)) = (events.get(i), events.get(i + 1)) else {
        return false;
    };
    let chord_follows = events.get(i + 2).is_some_and(Event::is_chord_member);

    is_plain(first)
        && is_plain(second)
        && !chord_follows
        && first.voice() == second.voice()
        && !measure.has_inline_before(i + 1)
}

fn is_plain(event: &Event) -> bool {
    event.time_modification().is_none()
        && !event.is_chord_member()
        && !matches!(event, Event::Rest(r) if r.measure_rest)
}

fn is_value(event: &Event, note_type: NoteType, dots: u8) -> bool {
    event.note_type() == Some(note_type) && event.dots() == dots
}

/// Apply the first matching rule to a pair.
fn merge_pair(first: &Event, second: &Event) -> Option<Event> {
    let total = first.duration() + second.duration();

    match (first, second) {
        // Rule 1: dotted quarter + eighth note
        (Event::Note(a), Event::Note(_))
            if is_value(first, NoteType::Quarter, 1) && is_value(second, NoteType::Eighth, 0) =>
        {
            Some(Event::Note(absorb(a, second, total, NoteType::Half)))
        }
        // Rule 2: eighth note + eighth note or rest
        (Event::Note(a), _)
            if is_value(first, NoteType::Eighth, 0) && is_value(second, NoteType::Eighth, 0) =>
        {
            Some(Event::Note(absorb(a, second, total, NoteType::Quarter)))
        }
        // Rule 3: eighth rest + eighth note
        (Event::Rest(r), Event::Note(_))
            if is_value(first, NoteType::Eighth, 0) && is_value(second, NoteType::Eighth, 0) =>
        {
            Some(Event::Rest(Rest {
                duration: total,
                note_type: Some(NoteType::Quarter),
                dots: 0,
                ..r.clone()
            }))
        }
        _ => None,
    }
}

fn absorb(first: &Note, second: &Event, duration: u32, note_type: NoteType) -> Note {
    // A tie leaving the absorbed note now leaves the merged one, if the pitch is unchanged.
    let tie_start = match second {
        Event::Note(b) => b.tie_start && b.pitch.midi() == first.pitch.midi(),
        Event::Rest(_) => false,
    };

    Note {
        duration,
        note_type: Some(note_type),
        dots: 0,
        tie_start,
        slurs: Vec::new(),
        beams: Vec::new(),
        ..first.clone()
    }
}

/// Make every tie start meet a same-pitch note with a tie stop in the same voice, and drop
/// stops that nothing leads into. Chord members keep their ties.
pub fn repair_ties(score: &mut Score) -> usize {
    let mut repaired = 0;

    for part in &mut score.parts {
        let mut by_voice: BTreeMap<Option<String>, Vec<(usize, usize)>> = BTreeMap::new();
        for (m, measure) in part.measures.iter().enumerate() {
            for (e, event) in measure.events.iter().enumerate() {
                if !event.is_chord_member() {
                    by_voice
                        .entry(event.voice().map(str::to_string))
                        .or_default()
                        .push((m, e));
                }
            }
        }

        for positions in by_voice.values() {
            let mut previous_starts: Option<i32> = None;
            for &(m, e) in positions {
                let Event::Note(note) = &mut part.measures[m].events[e] else {
                    previous_starts = None;
                    continue;
                };

                let tied_in = previous_starts == Some(note.pitch.midi());
                if note.tie_stop != tied_in {
                    note.tie_stop = tied_in;
                    repaired += 1;
                }
                previous_starts = note.tie_start.then(|| note.pitch.midi());
            }

            // Clear starts that no note received.
            let mut next_pitch: Option<i32> = None;
            for &(m, e) in positions.iter().rev() {
                match &mut part.measures[m].events[e] {
                    Event::Note(note) => {
                        if note.tie_start && next_pitch != Some(note.pitch.midi()) {
                            note.tie_start = false;
                            repaired += 1;
                        }
                        next_pitch = note.tie_stop.then(|| note.pitch.midi());
                    }
                    Event::Rest(_) => next_pitch = None,
                }
            }
        }
    }

    if repaired > 0 {
        debug!(repaired, "repaired ties");
    }
    repaired
}

/// Drop slur stops without an open slur of the same number, and starts never closed.
pub fn repair_slurs(score: &mut Score) -> usize {
    let mut removed = 0;

    for part in &mut score.parts {
        let mut open: HashMap<u8, (usize, usize)> = HashMap::new();
        let mut dangling: Vec<(usize, usize, u8)> = Vec::new();

        for (m, measure) in part.measures.iter_mut().enumerate() {
            for (e, event) in measure.events.iter_mut().enumerate() {
                let Event::Note(note) = event else { continue };
                let before = note.slurs.len();
                note.slurs.retain(|slur| {
                    let number = slur.number.unwrap_or(1);
                    match slur.kind {
                        SlurKind::Start => {
                            if let Some((pm, pe)) = open.insert(number, (m, e)) {
                                dangling.push((pm, pe, number));
                            }
                            true
                        }
                        SlurKind::Continue => open.contains_key(&number),
                        SlurKind::Stop => open.remove(&number).is_some(),
                    }
                });
                removed += before - note.slurs.len();
            }
        }

        dangling.extend(open.into_iter().map(|(number, (m, e))| (m, e, number)));
        for (m, e, number) in dangling {
            if let Event::Note(note) = &mut part.measures[m].events[e] {
                let before = note.slurs.len();
                note.slurs.retain(|slur| {
                    !(slur.kind == SlurKind::Start && slur.number.unwrap_or(1) == number)
                });
                removed += before - note.slurs.len();
            }
        }
    }

    if removed > 0 {
        debug!(removed, "removed unmatched slurs");
    }
    removed
}
