//! # Transform Pipeline
//!
//! The entry points that run every enabled pass over a score, in a fixed order:
//!
//! 1. Rhythm simplification (`simplify_rhythm`)
//! 2. Range transposition (`transpose_for_range`)
//! 3. Instrument and key correction (`correct_instrument`)
//! 4. Rehearsal mark renumbering (`rehearsal_marks`)
//! 5. Multi-measure rest expansion (`split_multimeasure_rests`)
//! 6. Courtesy accidentals (`add_courtesy_accidentals`)
//! 7. Fingerings, accidental policy then unfamiliar-pitch policy
//! 8. Structural validation
//! 9. Processing note in the metadata (`mark_processed`)
//!
//! Fingerings come last because they are looked up by final written pitch, and key correction
//! runs before courtesy analysis because respelling changes which letters are altered.
//!
//! ## Functions
//!
//! - [`transform()`] - Typed score in, typed score and report out
//! - [`simplify_musicxml()`] - MusicXML text in, MusicXML text and report out
//!
//! ## Typical Usage
//!
//! ```rust
//! use easyscore::{simplify_musicxml, TransformOptions};
//!
//! let source = r#"<score-partwise version="4.0">
//!   <part-list><score-part id="P1"><part-name>Music</part-name></score-part></part-list>
//!   <part id="P1"><measure number="1">
//!     <attributes><divisions>2</divisions></attributes>
//!     <note><pitch><step>C</step><octave>5</octave></pitch><duration>1</duration><type>eighth</type></note>
//!     <note><pitch><step>C</step><octave>5</octave></pitch><duration>1</duration><type>eighth</type></note>
//!   </measure></part>
//! </score-partwise>"#;
//!
//! let (musicxml, report) = simplify_musicxml(source, "eb_alto_sax", &TransformOptions::default())?;
//! assert_eq!(report.stats.notes_merged, 1);
//! assert!(musicxml.contains("<type>quarter</type>"));
//! # Ok::<(), easyscore::ScoreError>(())
//! ```

use crate::correct::correct_instrument;
use crate::courtesy::add_courtesy_accidentals;
use crate::fingering::{add_fingerings, FingeringPolicy};
use crate::instrument::{profile, HomeKey};
use crate::metadata::{mark_processed, Processing};
use crate::musicxml::{read_score, write_score};
use crate::options::TransformOptions;
use crate::range::transpose_for_range;
use crate::rehearsal::renumber_rehearsal_marks;
use crate::rests::split_multimeasure_rests;
use crate::rhythm::simplify_rhythm;
use crate::validate::validate_score;
use crate::{Score, ScoreError};
use tracing::{info, warn};

/// Counters gathered from every pass of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub measures_processed: usize,
    pub notes_merged: usize,
    pub notes_transposed: usize,
    pub accidentals_corrected: usize,
    pub accidentals_added: usize,
    pub fingerings_added: usize,
    pub rehearsal_marks_fixed: usize,
    /// `<multiple-rest>` directives removed
    pub multimeasure_rests_removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    pub stats: TransformStats,
    /// Configuration problems that made a pass skip its work
    pub warnings: Vec<String>,
}

/// Run the enabled passes for `instrument_id` over `score`.
///
/// An unknown instrument id is not fatal: the passes that need a profile are skipped and the
/// problem is recorded in the report's warnings.
///
/// # Errors
/// Returns [`ScoreError::Structure`] if the result fails the structural check.
pub fn transform(
    score: &Score,
    instrument_id: &str,
    options: &TransformOptions,
) -> Result<(Score, TransformReport), ScoreError> {
    let mut report = TransformReport::default();
    let mut current = score.clone();

    let instrument = match profile(instrument_id) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(instrument = instrument_id, "{}, instrument passes skipped", e);
            report
                .warnings
                .push(format!("{}: range, correction and fingering passes skipped", e));
            None
        }
    };

    if options.simplify_rhythm {
        let (next, stats) = simplify_rhythm(&current);
        report.stats.measures_processed = stats.measures_processed;
        report.stats.notes_merged = stats.notes_merged;
        current = next;
    } else {
        report.stats.measures_processed = current.measure_count();
    }

    if let Some(instrument) = instrument {
        if options.transpose_for_range {
            let (next, stats) = transpose_for_range(&current, instrument, &options.range);
            report.stats.notes_transposed = stats.notes_transposed;
            current = next;
        }

        if options.correct_instrument {
            let (next, stats) = correct_instrument(
                &current,
                instrument,
                options.source_key.as_ref(),
                options.rename_parts,
            );
            report.stats.accidentals_corrected = stats.accidentals_corrected;
            current = next;
        }
    }

    if let Some(mode) = options.rehearsal_marks {
        let (next, stats) = renumber_rehearsal_marks(&current, mode);
        report.stats.rehearsal_marks_fixed = stats.marks_fixed;
        current = next;
    }

    if options.split_multimeasure_rests {
        let (next, stats) = split_multimeasure_rests(&current);
        report.stats.multimeasure_rests_removed = stats.multiple_rests_removed;
        current = next;
    }

    if options.add_courtesy_accidentals {
        let home_key = instrument.map(|p| p.home_key).unwrap_or(HomeKey::NONE);
        let (next, stats) = add_courtesy_accidentals(&current, &home_key);
        report.stats.accidentals_added = stats.accidentals_added;
        current = next;
    }

    if let Some(instrument) = instrument {
        let policies = [
            (options.add_courtesy_fingerings, FingeringPolicy::Accidentals),
            (options.add_fingerings, FingeringPolicy::UnfamiliarPitches),
        ];
        for (_, policy) in policies.into_iter().filter(|(enabled, _)| *enabled) {
            let (next, stats) = add_fingerings(&current, instrument, policy, options.fingering_style);
            report.stats.fingerings_added += stats.fingerings_added;
            current = next;
        }
    }

    validate_score(&current)?;

    if options.mark_processed {
        let processing = if options.simplify_rhythm {
            Processing::Simplified
        } else {
            Processing::OmrCorrected
        };
        mark_processed(&mut current, processing, !options.rename_parts);
    }

    info!(
        measures = report.stats.measures_processed,
        merged = report.stats.notes_merged,
        transposed = report.stats.notes_transposed,
        corrected = report.stats.accidentals_corrected,
        courtesy = report.stats.accidentals_added,
        fingerings = report.stats.fingerings_added,
        rehearsal = report.stats.rehearsal_marks_fixed,
        "transform complete"
    );
    Ok((current, report))
}

/// Read MusicXML text, transform it, and write it back.
///
/// # Errors
/// Returns [`ScoreError`] if reading fails or the transformed score is invalid. Nothing is
/// returned on error, so callers never see a partial document.
pub fn simplify_musicxml(
    xml: &str,
    instrument_id: &str,
    options: &TransformOptions,
) -> Result<(String, TransformReport), ScoreError> {
    let score = read_score(xml)?;
    let (result, report) = transform(&score, instrument_id, options)?;
    Ok((write_score(&result), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeySignature;
    use crate::model::{Event, Measure, Note, NoteType, Rest};

    fn eighth(pitch: &str) -> Event {
        Event::Note(Note::new(pitch.parse().unwrap(), 1, NoteType::Eighth))
    }

    fn sax_measure() -> Score {
        Score::from_measures(vec![Measure::new(
            1,
            vec![eighth("C5"), eighth("C5"), eighth("D5"), eighth("D5")],
        )])
    }

    fn summary(score: &Score) -> Vec<(String, u32, Option<NoteType>)> {
        score.parts[0].measures[0]
            .events
            .iter()
            .map(|e| match e {
                Event::Note(n) => (n.pitch.to_string(), n.duration, n.note_type),
                Event::Rest(r) => ("rest".to_string(), r.duration, r.note_type),
            })
            .collect()
    }

    #[test]
    fn test_alto_sax_scenario() {
        let (result, report) =
            transform(&sax_measure(), "eb_alto_sax", &TransformOptions::default()).unwrap();
        assert_eq!(
            summary(&result),
            vec![
                ("C5".to_string(), 2, Some(NoteType::Quarter)),
                ("D4".to_string(), 2, Some(NoteType::Quarter)),
            ]
        );
        assert_eq!(result.parts[0].measures[0].total_duration(), 4);
        assert!(result.parts[0].measures[0].notes().all(|n| n.beams.is_empty()));
        assert_eq!(report.stats.notes_merged, 2);
        assert_eq!(report.stats.notes_transposed, 1);
        assert_eq!(report.stats.measures_processed, 1);
    }

    #[test]
    fn test_passes_can_be_disabled() {
        let options = TransformOptions {
            simplify_rhythm: false,
            transpose_for_range: false,
            correct_instrument: false,
            ..Default::default()
        };
        let score = sax_measure();
        let (result, report) = transform(&score, "eb_alto_sax", &options).unwrap();
        assert_eq!(result, score);
        assert_eq!(report.stats, TransformStats { measures_processed: 1, ..Default::default() });
    }

    #[test]
    fn test_unknown_instrument_warns_and_skips() {
        let score = Score::from_measures(vec![Measure::new(
            1,
            vec![eighth("C7"), Event::Rest(Rest::new(1, NoteType::Eighth))],
        )]);
        let (result, report) = transform(&score, "theremin", &TransformOptions::default()).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("theremin"));
        // Rhythm still runs, range does not
        assert_eq!(
            summary(&result),
            vec![("C7".to_string(), 2, Some(NoteType::Quarter))]
        );
        assert!(result.part_list[0].child("score-instrument").is_none());
    }

    #[test]
    fn test_correction_with_source_key() {
        let options = TransformOptions {
            source_key: Some(KeySignature::from_name("Bb").unwrap()),
            ..Default::default()
        };
        let score = Score::from_measures(vec![Measure::new(1, vec![eighth("C5")])]);
        let (result, _) = transform(&score, "eb_alto_sax", &options).unwrap();
        let attributes = result.parts[0].measures[0].attributes_blocks().next().unwrap();
        assert_eq!(attributes.key().unwrap().fifths, 1);
        assert_eq!(attributes.transpose().unwrap().chromatic, -9);
    }

    #[test]
    fn test_fingering_policies_add_up() {
        let options = TransformOptions {
            simplify_rhythm: false,
            add_fingerings: true,
            add_courtesy_fingerings: true,
            ..Default::default()
        };
        let mut sharp = Note::new("F#4".parse().unwrap(), 1, NoteType::Quarter);
        sharp.accidental = Some(crate::model::Accidental::written(
            crate::model::AccidentalKind::Sharp,
        ));
        let score = Score::from_measures(vec![Measure::new(
            1,
            vec![
                Event::Note(sharp),
                Event::Note(Note::new("Eb4".parse().unwrap(), 1, NoteType::Quarter)),
                Event::Note(Note::new("A4".parse().unwrap(), 1, NoteType::Quarter)),
            ],
        )]);
        let (_, report) = transform(&score, "eb_alto_sax", &options).unwrap();
        // F#4 by accidental, Eb4 as unfamiliar, A4 familiar
        assert_eq!(report.stats.fingerings_added, 2);
    }

    #[test]
    fn test_cleanup_passes_and_processing_note() {
        use crate::model::{AttributeItem, Attributes, Inline, InlineItem};
        use crate::rehearsal::RehearsalMode;
        use crate::xml::XmlElement;

        let mut measure = Measure::new(3, vec![eighth("C5")]);
        measure.inline.push(Inline {
            before: 0,
            item: InlineItem::Attributes(Attributes {
                items: vec![AttributeItem::Other(
                    XmlElement::new("measure-style")
                        .with_child(XmlElement::with_text("multiple-rest", "3")),
                )],
            }),
        });
        measure.inline.push(Inline {
            before: 0,
            item: InlineItem::Other(XmlElement::new("direction").with_child(
                XmlElement::new("direction-type")
                    .with_child(XmlElement::with_text("rehearsal", "8")),
            )),
        });
        let mut score = Score::from_measures(vec![measure]);
        score.header.push(XmlElement::new("identification").with_child(
            XmlElement::new("encoding").with_child(XmlElement::with_text("software", "OMR")),
        ));

        let options = TransformOptions {
            simplify_rhythm: false,
            rehearsal_marks: Some(RehearsalMode::Letters),
            split_multimeasure_rests: true,
            ..Default::default()
        };
        let (result, report) = transform(&score, "eb_alto_sax", &options).unwrap();
        assert_eq!(report.stats.rehearsal_marks_fixed, 1);
        assert_eq!(report.stats.multimeasure_rests_removed, 1);
        let software = result.header[0].child("encoding").unwrap().child_text("software");
        assert_eq!(software.as_deref(), Some("OMR - OMR Corrected by easyscore"));

        let unmarked = TransformOptions {
            mark_processed: false,
            ..Default::default()
        };
        let (result, _) = transform(&score, "eb_alto_sax", &unmarked).unwrap();
        assert_eq!(result.header, score.header);
    }

    #[test]
    fn test_invalid_result_is_an_error() {
        let score = Score::from_measures(Vec::new());
        assert!(matches!(
            transform(&score, "flute", &TransformOptions::default()),
            Err(ScoreError::Structure(_))
        ));
    }
}
