//! Integration tests for easyscore
//!
//! Drives MusicXML text through the public API, from reading to the written result.

use easyscore::{
    read_score, simplify_musicxml, transform, write_score, AccidentalKind, Event, FingeringStyle,
    KeySignature, NoteType, Score, ScoreError, TransformOptions,
};

fn document(part_list: &str, measures: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="4.0">
  <work><work-title>Ode</work-title></work>
  <part-list>{}</part-list>
  <part id="P1">{}</part>
</score-partwise>"#,
        part_list, measures
    )
}

fn piano_part() -> &'static str {
    r#"<score-part id="P1"><part-name>Piano</part-name>
         <score-instrument id="P1-I1"><instrument-name>Piano</instrument-name></score-instrument>
         <midi-instrument id="P1-I1"><midi-channel>1</midi-channel><midi-program>1</midi-program></midi-instrument>
       </score-part>"#
}

fn note(step: &str, alter: i8, octave: i8, duration: u32, note_type: &str) -> String {
    let alter = if alter != 0 {
        format!("<alter>{}</alter>", alter)
    } else {
        String::new()
    };
    format!(
        "<note><pitch><step>{}</step>{}<octave>{}</octave></pitch><duration>{}</duration><voice>1</voice><type>{}</type></note>",
        step, alter, octave, duration, note_type
    )
}

fn measure(number: u32, attributes: &str, notes: &[String]) -> String {
    format!(
        r#"<measure number="{}">{}{}</measure>"#,
        number,
        attributes,
        notes.concat()
    )
}

fn first_measure_events(score: &Score) -> Vec<(String, u32, Option<NoteType>)> {
    score.parts[0].measures[0]
        .events
        .iter()
        .map(|e| match e {
            Event::Note(n) => (n.pitch.to_string(), n.duration, n.note_type),
            Event::Rest(r) => ("rest".to_string(), r.duration, r.note_type),
        })
        .collect()
}

const FOUR_FOUR: &str = "<attributes><divisions>2</divisions><key><fifths>0</fifths></key>\
    <time><beats>4</beats><beat-type>4</beat-type></time><clef><sign>G</sign><line>2</line></clef></attributes>";

#[test]
fn test_alto_sax_end_to_end() {
    let xml = document(
        piano_part(),
        &measure(
            1,
            FOUR_FOUR,
            &[
                note("C", 0, 5, 1, "eighth").replace("</type>", "</type><beam number=\"1\">begin</beam>"),
                note("C", 0, 5, 1, "eighth").replace("</type>", "</type><beam number=\"1\">end</beam>"),
                note("D", 0, 5, 1, "eighth"),
                note("D", 0, 5, 1, "eighth"),
            ],
        ),
    );

    let (output, report) = simplify_musicxml(&xml, "eb_alto_sax", &TransformOptions::default()).unwrap();
    let result = read_score(&output).unwrap();

    assert_eq!(
        first_measure_events(&result),
        vec![
            ("C5".to_string(), 2, Some(NoteType::Quarter)),
            ("D4".to_string(), 2, Some(NoteType::Quarter)),
        ]
    );
    assert!(!output.contains("<beam"));
    assert_eq!(report.stats.notes_merged, 2);
    assert_eq!(report.stats.notes_transposed, 1);
    assert!(report.warnings.is_empty());

    // Instrument metadata and transpose
    assert!(output.contains("<instrument-name>Alto Saxophone</instrument-name>"));
    assert!(output.contains("<instrument-sound>reed.saxophone.alto</instrument-sound>"));
    assert!(output.contains("<midi-program>66</midi-program>"));
    assert!(output.contains("<chromatic>-9</chromatic>"));
    assert!(output.contains("<part-name>Piano</part-name>"));
}

#[test]
fn test_rhythm_rules_end_to_end() {
    let rest = "<note><rest/><duration>1</duration><voice>1</voice><type>eighth</type></note>".to_string();
    let dotted = note("E", 0, 4, 3, "quarter").replace("</type>", "</type><dot/>");
    let xml = document(
        piano_part(),
        &measure(
            1,
            FOUR_FOUR,
            &[
                note("G", 0, 4, 1, "eighth"),
                rest.clone(),
                rest,
                note("A", 0, 4, 1, "eighth"),
                dotted,
                note("F", 0, 4, 1, "eighth"),
            ],
        ),
    );
    let options = TransformOptions {
        transpose_for_range: false,
        correct_instrument: false,
        ..Default::default()
    };

    let (output, _) = simplify_musicxml(&xml, "flute", &options).unwrap();
    let result = read_score(&output).unwrap();
    assert_eq!(
        first_measure_events(&result),
        vec![
            ("G4".to_string(), 2, Some(NoteType::Quarter)),
            ("rest".to_string(), 2, Some(NoteType::Quarter)),
            ("E4".to_string(), 4, Some(NoteType::Half)),
        ]
    );
    assert_eq!(result.parts[0].measures[0].total_duration(), 8);
    assert!(!output.contains("<dot/>"));
}

#[test]
fn test_duration_conserved_across_measures() {
    let measures: String = (1..=4)
        .map(|n| {
            measure(
                n,
                if n == 1 { FOUR_FOUR } else { "" },
                &[
                    note("C", 0, 5, 1, "eighth"),
                    note("B", -1, 4, 1, "eighth"),
                    note("A", 0, 4, 3, "quarter").replace("</type>", "</type><dot/>"),
                    note("G", 0, 4, 1, "eighth"),
                    note("F", 0, 4, 2, "quarter"),
                ],
            )
        })
        .collect();
    let xml = document(piano_part(), &measures);

    let source = read_score(&xml).unwrap();
    let (result, _) = transform(&source, "bb_trumpet", &TransformOptions::default()).unwrap();
    for (before, after) in source.parts[0].measures.iter().zip(&result.parts[0].measures) {
        assert_eq!(before.total_duration(), after.total_duration());
        assert_eq!(before.number, after.number);
    }
}

#[test]
fn test_source_key_recomputed_for_transposing_instruments() {
    let bb_major = "<attributes><divisions>1</divisions><key><fifths>-2</fifths><mode>major</mode></key></attributes>";
    let xml = document(
        piano_part(),
        &measure(1, bb_major, &[note("B", -1, 4, 2, "half"), note("E", -1, 5, 2, "half")]),
    );
    let options = TransformOptions {
        source_key: Some(KeySignature::from_name("Bb").unwrap()),
        ..Default::default()
    };

    let trumpet = transform(&read_score(&xml).unwrap(), "bb_trumpet", &options).unwrap();
    let key = trumpet.0.parts[0].measures[0].attributes_blocks().next().unwrap().key().unwrap().clone();
    assert_eq!(key.fifths, 0);
    assert_eq!(key.mode.as_deref(), Some("major"));
    assert_eq!(trumpet.1.stats.accidentals_corrected, 2);

    let sax = transform(&read_score(&xml).unwrap(), "eb_alto_sax", &options).unwrap();
    let key = sax.0.parts[0].measures[0].attributes_blocks().next().unwrap().key().unwrap().clone();
    assert_eq!(key.fifths, 1);
}

#[test]
fn test_courtesy_accidentals_at_most_once_per_letter() {
    let sharp = note("F", 1, 4, 1, "quarter").replace("</type>", "</type><accidental>sharp</accidental>");
    let xml = document(
        piano_part(),
        &[
            measure(1, FOUR_FOUR, &[sharp]),
            measure(
                2,
                "",
                &[
                    note("F", 0, 4, 1, "quarter"),
                    note("F", 0, 5, 1, "quarter"),
                    note("F", 0, 4, 1, "quarter"),
                    note("G", 0, 4, 1, "quarter"),
                ],
            ),
        ]
        .concat(),
    );
    let options = TransformOptions {
        simplify_rhythm: false,
        transpose_for_range: false,
        add_courtesy_accidentals: true,
        ..Default::default()
    };

    let (output, report) = simplify_musicxml(&xml, "bb_trumpet", &options).unwrap();
    assert_eq!(report.stats.accidentals_added, 1);
    assert_eq!(output.matches("<accidental cautionary=\"yes\">natural</accidental>").count(), 1);

    let result = read_score(&output).unwrap();
    let second: Vec<bool> = result.parts[0].measures[1]
        .notes()
        .map(|n| n.accidental.is_some())
        .collect();
    assert_eq!(second, vec![true, false, false, false]);
}

#[test]
fn test_fingerings_are_idempotent() {
    let xml = document(
        piano_part(),
        &measure(
            1,
            FOUR_FOUR,
            &[
                note("F", 1, 4, 2, "quarter").replace("</type>", "</type><accidental>sharp</accidental>"),
                note("C", 1, 5, 2, "quarter"),
                note("A", 0, 4, 4, "half"),
            ],
        ),
    );
    // C#5 sits above the beginner range; keep it there to get an octave-key fingering
    let options = TransformOptions {
        transpose_for_range: false,
        add_fingerings: true,
        add_courtesy_fingerings: true,
        fingering_style: FingeringStyle::Both,
        ..Default::default()
    };

    let (once, first) = simplify_musicxml(&xml, "eb_alto_sax", &options).unwrap();
    let (twice, second) = simplify_musicxml(&once, "eb_alto_sax", &options).unwrap();
    assert_eq!(first.stats.fingerings_added, 2);
    assert_eq!(second.stats.fingerings_added, 0);
    assert_eq!(once, twice);
    assert!(once.contains("<fingering>8va</fingering>"));
    assert!(once.contains("<hole-closed>yes</hole-closed>"));
}

#[test]
fn test_brass_valves_above_accidentals() {
    let xml = document(
        piano_part(),
        &measure(
            1,
            FOUR_FOUR,
            &[note("E", -1, 4, 4, "half").replace("</type>", "</type><accidental>flat</accidental>")],
        ),
    );
    let options = TransformOptions {
        add_courtesy_fingerings: true,
        ..Default::default()
    };
    let (output, report) = simplify_musicxml(&xml, "bb_trumpet", &options).unwrap();
    assert_eq!(report.stats.fingerings_added, 1);
    assert!(output.contains("<fingering placement=\"above\">2</fingering>"));
}

#[test]
fn test_unmodelled_content_survives() {
    let xml = document(
        piano_part(),
        &measure(
            1,
            r#"<print new-system="yes"/><attributes><divisions>1</divisions><key><fifths>0</fifths></key><staff-details><staff-lines>5</staff-lines></staff-details></attributes>
               <direction placement="above"><direction-type><words>Allegro</words></direction-type></direction>"#,
            &[
                note("G", 0, 4, 4, "whole").replace("</type>", "</type><notations><fermata/></notations><lyric><text>Joy</text></lyric>"),
                r#"<barline location="right"><bar-style>light-heavy</bar-style></barline>"#.to_string(),
            ],
        ),
    );
    let (output, _) = simplify_musicxml(&xml, "flute", &TransformOptions::default()).unwrap();

    assert!(output.contains("<work-title>Ode</work-title>"));
    assert!(output.contains("<print new-system=\"yes\"/>"));
    assert!(output.contains("<staff-lines>5</staff-lines>"));
    assert!(output.contains("<words>Allegro</words>"));
    assert!(output.contains("<fermata/>"));
    assert!(output.contains("<text>Joy</text>"));
    assert!(output.contains("<bar-style>light-heavy</bar-style>"));

    let print = output.find("<print").unwrap();
    let attributes = output.find("<attributes>").unwrap();
    let note = output.find("<note>").unwrap();
    let barline = output.find("<barline").unwrap();
    assert!(print < attributes && attributes < note && note < barline);
}

#[test]
fn test_options_from_yaml_drive_the_pipeline() {
    let options = TransformOptions::from_yaml(
        "simplify-rhythm: false\ntranspose-for-range: false\ncorrect-instrument: false\n",
    )
    .unwrap();
    let xml = document(
        piano_part(),
        &measure(1, FOUR_FOUR, &[note("C", 0, 7, 1, "eighth"), note("C", 0, 7, 1, "eighth")]),
    );
    let source = read_score(&xml).unwrap();
    let (result, report) = transform(&source, "eb_alto_sax", &options).unwrap();
    assert_eq!(result, source);
    assert_eq!(report.stats.notes_merged, 0);
    assert_eq!(write_score(&result), write_score(&source));
}

#[test]
fn test_unknown_instrument_is_reported() {
    let xml = document(piano_part(), &measure(1, FOUR_FOUR, &[note("C", 0, 5, 4, "whole")]));
    let (output, report) = simplify_musicxml(&xml, "kazoo", &TransformOptions::default()).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("kazoo"));
    assert!(output.contains("<instrument-name>Piano</instrument-name>"));
}

#[test]
fn test_undeclared_part_fails_validation() {
    let xml = document(
        r#"<score-part id="P9"><part-name>Other</part-name></score-part>"#,
        &measure(1, FOUR_FOUR, &[note("C", 0, 5, 4, "whole")]),
    );
    assert!(matches!(
        simplify_musicxml(&xml, "flute", &TransformOptions::default()),
        Err(ScoreError::Structure(_))
    ));
}

#[test]
fn test_reader_errors() {
    assert!(matches!(
        simplify_musicxml("<score-partwise>", "flute", &TransformOptions::default()),
        Err(ScoreError::Xml { .. })
    ));
    assert!(matches!(
        simplify_musicxml("<score-timewise version=\"4.0\"/>", "flute", &TransformOptions::default()),
        Err(ScoreError::UnsupportedDocument(_))
    ));
}

#[test]
fn test_rename_parts_and_concert_pitch() {
    let with_transpose = "<attributes><divisions>1</divisions><key><fifths>0</fifths></key>\
        <transpose><diatonic>-1</diatonic><chromatic>-2</chromatic></transpose></attributes>";
    let xml = document(
        r#"<score-part id="P1"><part-name print-object="no">Clarinet</part-name></score-part>"#,
        &measure(1, with_transpose, &[note("A", 0, 4, 4, "whole")]),
    );
    let options = TransformOptions {
        rename_parts: true,
        ..Default::default()
    };
    let (output, _) = simplify_musicxml(&xml, "flute", &options).unwrap();
    assert!(output.contains("<part-name print-object=\"yes\">Flute</part-name>"));
    assert!(!output.contains("<transpose>"));
}

#[test]
fn test_accidental_kinds_round_trip_through_pipeline() {
    let xml = document(
        piano_part(),
        &measure(
            1,
            FOUR_FOUR,
            &[note("B", 0, 4, 4, "whole").replace("</type>", "</type><accidental parentheses=\"yes\">natural</accidental>")],
        ),
    );
    let (output, _) = simplify_musicxml(&xml, "bb_trumpet", &TransformOptions::default()).unwrap();
    let result = read_score(&output).unwrap();
    let accidental = result.parts[0].measures[0].notes().next().unwrap().accidental.clone().unwrap();
    assert_eq!(accidental.kind, AccidentalKind::Natural);
    assert_eq!(accidental.attributes, vec![("parentheses".to_string(), "yes".to_string())]);
}

#[test]
fn test_missing_key_element_respelled_like_written_c_major() {
    let bare = "<attributes><divisions>1</divisions></attributes>";
    let options = TransformOptions {
        source_key: Some(KeySignature::from_name("Bb").unwrap()),
        simplify_rhythm: false,
        ..Default::default()
    };
    let notes = [note("F", 0, 4, 4, "whole")];
    let implicit = read_score(&document(piano_part(), &measure(1, bare, &notes))).unwrap();
    let explicit = read_score(&document(piano_part(), &measure(1, FOUR_FOUR, &notes))).unwrap();

    let (from_implicit, implicit_report) = transform(&implicit, "eb_alto_sax", &options).unwrap();
    let (from_explicit, explicit_report) = transform(&explicit, "eb_alto_sax", &options).unwrap();

    assert_eq!(first_measure_events(&from_implicit)[0].0, "F#4");
    assert_eq!(first_measure_events(&from_implicit), first_measure_events(&from_explicit));
    assert_eq!(
        implicit_report.stats.accidentals_corrected,
        explicit_report.stats.accidentals_corrected
    );
}

#[test]
fn test_octave_chord_survives_range_pass() {
    let chord_member = note("C", 0, 5, 4, "whole").replace("<note>", "<note><chord/>");
    let xml = document(
        piano_part(),
        &measure(1, FOUR_FOUR, &[note("C", 0, 4, 4, "whole"), chord_member]),
    );
    let (result, report) =
        transform(&read_score(&xml).unwrap(), "eb_alto_sax", &TransformOptions::default()).unwrap();
    let pitches: Vec<String> = first_measure_events(&result).into_iter().map(|e| e.0).collect();
    assert_eq!(pitches, vec!["C4", "C5"]);
    assert_eq!(report.stats.notes_transposed, 0);
}

#[test]
fn test_key_cancel_and_octave_carried_through_key_rewrite() {
    let attributes = "<attributes><divisions>1</divisions><key><cancel>2</cancel><fifths>-2</fifths>\
        <key-octave number=\"1\">4</key-octave></key></attributes>";
    let xml = document(piano_part(), &measure(1, attributes, &[note("C", 0, 5, 4, "whole")]));
    let options = TransformOptions {
        source_key: Some(KeySignature::from_name("Bb").unwrap()),
        ..Default::default()
    };
    let (output, _) = simplify_musicxml(&xml, "bb_trumpet", &options).unwrap();

    let cancel = output.find("<cancel>2</cancel>").unwrap();
    let fifths = output.find("<fifths>0</fifths>").unwrap();
    let octave = output.find("<key-octave number=\"1\">4</key-octave>").unwrap();
    assert!(cancel < fifths && fifths < octave);
}

#[test]
fn test_rehearsal_rests_and_credit() {
    let rehearsal = |text: &str| {
        format!(
            "<direction placement=\"above\"><direction-type><rehearsal enclosure=\"square\">{}</rehearsal></direction-type></direction>",
            text
        )
    };
    let rest_measure = |number: u32, style: &str| {
        format!(
            r#"<measure number="{}">{}<note><rest measure="yes"/><duration>8</duration><voice>1</voice></note></measure>"#,
            number, style
        )
    };
    let measures = [
        measure(1, FOUR_FOUR, &[rehearsal("8"), note("C", 0, 5, 8, "whole")]),
        rest_measure(2, "<attributes><measure-style><multiple-rest>2</multiple-rest></measure-style></attributes>"),
        rest_measure(3, ""),
        measure(4, "", &[rehearsal("B"), note("D", 0, 5, 8, "whole")]),
    ]
    .concat();
    let xml = document(piano_part(), &measures).replace(
        "<work><work-title>Ode</work-title></work>",
        "<work><work-title>Ode</work-title></work>\n  <identification><encoding><software>Audiveris</software></encoding></identification>",
    );

    let (numbered, report) = simplify_musicxml(&xml, "eb_alto_sax", &TransformOptions::default()).unwrap();
    assert_eq!(report.stats.rehearsal_marks_fixed, 2);
    assert!(numbered.contains("<rehearsal enclosure=\"square\">1</rehearsal>"));
    assert!(numbered.contains("<rehearsal enclosure=\"square\">4</rehearsal>"));
    assert!(numbered.contains("<software>Audiveris - Simplified by easyscore</software>"));
    // Rests are left as written unless asked
    assert!(numbered.contains("<multiple-rest>2</multiple-rest>"));

    let options = TransformOptions::from_yaml(
        "rehearsal-marks: letters\nsplit-multimeasure-rests: true\nmark-processed: false\n",
    )
    .unwrap();
    let (lettered, report) = simplify_musicxml(&xml, "eb_alto_sax", &options).unwrap();
    assert!(lettered.contains("<rehearsal enclosure=\"square\">A</rehearsal>"));
    assert!(lettered.contains("<rehearsal enclosure=\"square\">B</rehearsal>"));
    assert_eq!(report.stats.multimeasure_rests_removed, 1);
    assert!(!lettered.contains("multiple-rest"));
    assert!(!lettered.contains("measure=\"yes\""));
    assert!(lettered.contains("<software>Audiveris</software>"));
}
