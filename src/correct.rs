//! # Instrument and Key Correction
//!
//! OMR tools often lose the transposing-instrument information of a part: the instrument is
//! read as a piano, the `<transpose>` element disappears, and the key signature comes out in
//! concert pitch while the note heads are still the written ones. This pass puts the part
//! back in order for a given instrument profile:
//!
//! - instrument name, sound and MIDI program on every `<score-part>`
//! - one `<transpose>` matching the profile (none for concert-pitch instruments)
//! - optionally the profile's part name, made visible
//! - with a declared concert key, the written key for the instrument, and the alteration of
//!   every note that was following the wrong key
//!
//! ## Key Recomputation
//! `target = concert + fifths_delta(-chromatic)`, clamped into [-7, 7]. The first key in a
//! part becomes `target`; later key changes move by the same number of fifths.
//!
//! ## Respelling
//! When the key changes, a letter whose implied alteration differs between the old and the
//! new key is respelled if the note was following the old key (its `alter` equals the old
//! key's alteration for that letter). A visible accidental on it is rewritten to match.

use crate::instrument::InstrumentProfile;
use crate::key::{clamp_fifths, written_fifths, KeySignature};
use crate::model::{
    AccidentalKind, AttributeItem, Attributes, Inline, InlineItem, Measure, Note, Score,
};
use crate::xml::XmlElement;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectStats {
    pub parts_updated: usize,
    pub transposes_written: usize,
    pub keys_rewritten: usize,
    pub accidentals_corrected: usize,
}

/// Elements that precede `<score-instrument>` inside `<score-part>`.
const BEFORE_SCORE_INSTRUMENT: &[&str] = &[
    "identification",
    "part-link",
    "part-name",
    "part-name-display",
    "part-abbreviation",
    "part-abbreviation-display",
    "group",
];

/// Elements that precede `<midi-instrument>` inside `<score-part>`.
const BEFORE_MIDI_INSTRUMENT: &[&str] = &[
    "identification",
    "part-link",
    "part-name",
    "part-name-display",
    "part-abbreviation",
    "part-abbreviation-display",
    "group",
    "score-instrument",
    "player",
    "midi-device",
];

pub fn correct_instrument(
    score: &Score,
    profile: &InstrumentProfile,
    source_key: Option<&KeySignature>,
    rename_parts: bool,
) -> (Score, CorrectStats) {
    let mut result = score.clone();
    let mut stats = CorrectStats::default();

    for score_part in result.score_parts_mut() {
        update_score_part(score_part, profile, rename_parts);
        stats.parts_updated += 1;
    }

    for part in &mut result.parts {
        stats.transposes_written += correct_transpose(&mut part.measures, profile);

        if let Some(source) = source_key {
            let target = written_fifths(source.fifths, profile.transpose_chromatic);
            let (keys, respelled) = rewrite_keys(&mut part.measures, target, source);
            debug!(part = %part.id, target, keys, respelled, "rewrote written key");
            stats.keys_rewritten += keys;
            stats.accidentals_corrected += respelled;
        }
    }

    info!(
        instrument = profile.id,
        parts = stats.parts_updated,
        corrected = stats.accidentals_corrected,
        "instrument correction done"
    );
    (result, stats)
}

/// Rewrite instrument metadata of one `<score-part>`, creating elements as needed.
pub fn update_score_part(score_part: &mut XmlElement, profile: &InstrumentProfile, rename: bool) {
    let part_id = score_part.attribute("id").unwrap_or("P1").to_string();

    if rename {
        score_part.set_child_text("part-name", profile.part_name);
        if let Some(part_name) = score_part.child_mut("part-name") {
            if part_name.attribute("print-object") == Some("no") {
                part_name.set_attribute("print-object", "yes");
            }
        }
    }

    if !score_part.has_child("score-instrument") {
        score_part.insert_after_last_of(
            BEFORE_SCORE_INSTRUMENT,
            XmlElement::new("score-instrument").with_attribute("id", &format!("{}-I1", part_id)),
        );
    }
    let mut instrument_id = None;
    if let Some(instrument) = score_part.child_mut("score-instrument") {
        set_text_after(instrument, "instrument-name", profile.display_name, &[]);
        set_text_after(
            instrument,
            "instrument-sound",
            profile.sound_id,
            &["instrument-name", "instrument-abbreviation"],
        );
        instrument_id = instrument.attribute("id").map(str::to_string);
    }

    if !score_part.has_child("midi-instrument") {
        let mut midi = XmlElement::new("midi-instrument");
        if let Some(id) = &instrument_id {
            midi.set_attribute("id", id);
        }
        score_part.insert_after_last_of(BEFORE_MIDI_INSTRUMENT, midi);
    }
    if let Some(midi) = score_part.child_mut("midi-instrument") {
        set_text_after(
            midi,
            "midi-program",
            &profile.midi_program.to_string(),
            &["midi-channel", "midi-name", "midi-bank"],
        );
    }
}

/// Set a child's text, inserting the child after the last of `after` when absent.
fn set_text_after(parent: &mut XmlElement, name: &str, text: &str, after: &[&str]) {
    if parent.has_child(name) {
        parent.set_child_text(name, text);
    } else {
        parent.insert_after_last_of(after, XmlElement::with_text(name, text));
    }
}

/// Make the part's `<transpose>` elements match the profile. Returns how many were written
/// or removed.
fn correct_transpose(measures: &mut [Measure], profile: &InstrumentProfile) -> usize {
    let mut changed = 0;

    if profile.is_concert_pitch() {
        for measure in measures.iter_mut() {
            for attributes in measure.attributes_blocks_mut() {
                changed += attributes.remove_transpose();
            }
        }
        return changed;
    }

    let mut found = false;
    for measure in measures.iter_mut() {
        for attributes in measure.attributes_blocks_mut() {
            if let Some(existing) = attributes.transpose() {
                found = true;
                if existing.chromatic != profile.transpose_chromatic {
                    attributes.set_transpose(profile.transpose());
                    changed += 1;
                }
            }
        }
    }

    if !found {
        if let Some(first) = measures.first_mut() {
            ensure_attributes(first);
            if let Some(attributes) = first.attributes_blocks_mut().next() {
                attributes.set_transpose(profile.transpose());
                changed += 1;
            }
        }
    }
    changed
}

/// Give the measure an attributes block at its start if it has none.
fn ensure_attributes(measure: &mut Measure) {
    if measure.attributes_blocks().next().is_some() {
        return;
    }
    // After any leading <print>, which must open the measure
    let position = measure
        .inline
        .iter()
        .take_while(|i| {
            i.before == 0 && matches!(&i.item, InlineItem::Other(el) if el.name == "print")
        })
        .count();
    measure.inline.insert(
        position,
        Inline {
            before: 0,
            item: InlineItem::Attributes(Attributes::default()),
        },
    );
}

/// Set the written key of a part to `target` and respell notes that followed the old key.
/// Returns (keys rewritten, notes respelled).
fn rewrite_keys(measures: &mut [Measure], target: i8, source: &KeySignature) -> (usize, usize) {
    let has_key = measures
        .iter()
        .any(|m| m.attributes_blocks().any(|a| a.key().is_some()));
    if !has_key {
        let Some(first) = measures.first_mut() else {
            return (0, 0);
        };
        let new_key = KeySignature {
            fifths: target,
            mode: source.mode.clone(),
        };
        ensure_attributes(first);
        if let Some(attributes) = first.attributes_blocks_mut().next() {
            insert_key(attributes, new_key.clone());
        }
        // No key element means the notes were following C major
        let implicit = KeySignature::new(0);
        let mut respelled = 0;
        for note in measures.iter_mut().flat_map(|m| m.notes_mut()) {
            if respell(note, &implicit, &new_key) {
                respelled += 1;
            }
        }
        return (1, respelled);
    }

    let mut delta: Option<i32> = None;
    let mut old_key = KeySignature::new(0);
    let mut new_key = KeySignature::new(0);
    let mut keys = 0;
    let mut respelled = 0;

    for measure in measures.iter_mut() {
        // Key changes in this measure, by the event index they apply from
        let mut changes: Vec<(usize, KeySignature, KeySignature)> = Vec::new();
        for inline in &mut measure.inline {
            let before = inline.before;
            let InlineItem::Attributes(attributes) = &mut inline.item else {
                continue;
            };
            for key in attributes.keys_mut() {
                let old = key.clone();
                let shift = *delta.get_or_insert(target as i32 - key.fifths as i32);
                key.fifths = clamp_fifths(key.fifths as i32 + shift);
                keys += 1;
                changes.push((before, old, key.clone()));
            }
        }

        let mut pending = changes.into_iter().peekable();
        for (index, event) in measure.events.iter_mut().enumerate() {
            while let Some((_, old, new)) = pending.next_if(|(before, _, _)| *before <= index) {
                old_key = old;
                new_key = new;
            }
            if let Some(note) = event.as_note_mut() {
                if respell(note, &old_key, &new_key) {
                    respelled += 1;
                }
            }
        }
        // Changes after the last event apply from the next measure on
        for (_, old, new) in pending {
            old_key = old;
            new_key = new;
        }
    }

    (keys, respelled)
}

fn insert_key(attributes: &mut Attributes, key: KeySignature) {
    let position = attributes
        .items
        .iter()
        .position(|item| !matches!(item, AttributeItem::Other(el) if matches!(el.name.as_str(), "footnote" | "level" | "divisions")))
        .unwrap_or(attributes.items.len());
    attributes.items.insert(position, AttributeItem::Key(key.into()));
}

/// Move a note that followed `old` onto `new`. Returns true if it changed.
fn respell(note: &mut Note, old: &KeySignature, new: &KeySignature) -> bool {
    let step = note.pitch.step;
    let old_alter = old.alter_for(step);
    let new_alter = new.alter_for(step);
    if old_alter == new_alter || note.pitch.alter != old_alter {
        return false;
    }

    note.pitch.alter = new_alter;
    if let Some(accidental) = &mut note.accidental {
        if let Some(kind) = AccidentalKind::for_alter(new_alter) {
            accidental.kind = kind;
        }
    }
    true
}
