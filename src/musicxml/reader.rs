use crate::error::ScoreError;
use crate::key::KeySignature;
use crate::model::{
    Accidental, AccidentalKind, Annotation, AttributeItem, Attributes, Beam, Event, Inline,
    InlineItem, KeyElement, Measure, Note, NoteType, Part, Pitch, Preserved, Rest, Score, Slur,
    SlurKind, Stem, Step, TimeModification, Transpose,
};
use crate::xml::XmlElement;
use tracing::{debug, warn};

/// Note children the reader maps onto model fields.
const MODELLED_NOTE_CHILDREN: &[&str] = &[
    "chord",
    "pitch",
    "rest",
    "duration",
    "tie",
    "voice",
    "type",
    "dot",
    "accidental",
    "time-modification",
    "stem",
    "beam",
    "notations",
];

/// Parse a `score-partwise` MusicXML document.
///
/// # Example
/// ```
/// use easyscore::read_score;
///
/// let score = read_score(r#"<score-partwise version="4.0">
///   <part-list><score-part id="P1"><part-name>Flute</part-name></score-part></part-list>
///   <part id="P1"><measure number="1">
///     <note><pitch><step>C</step><octave>5</octave></pitch><duration>4</duration><type>whole</type></note>
///   </measure></part>
/// </score-partwise>"#).unwrap();
/// assert_eq!(score.parts[0].measures[0].events.len(), 1);
/// ```
pub fn read_score(xml: &str) -> Result<Score, ScoreError> {
    let root = XmlElement::parse(xml)?;
    if root.name != "score-partwise" {
        return Err(ScoreError::UnsupportedDocument(root.name));
    }

    let mut score = Score {
        attributes: root.attributes.clone(),
        ..Default::default()
    };

    for child in root.elements() {
        match child.name.as_str() {
            "part-list" => score.part_list = child.elements().cloned().collect(),
            "part" => score.parts.push(read_part(child)?),
            _ => score.header.push(child.clone()),
        }
    }

    debug!(
        parts = score.parts.len(),
        measures = score.measure_count(),
        "read score"
    );
    Ok(score)
}

fn read_part(element: &XmlElement) -> Result<Part, ScoreError> {
    let id = element
        .attribute("id")
        .ok_or_else(|| missing("part", "id"))?
        .to_string();

    let mut measures: Vec<Measure> = Vec::new();
    for child in element.elements().filter(|el| el.name == "measure") {
        let previous = measures.last().map(|m| m.number);
        measures.push(read_measure(child, previous)?);
    }

    Ok(Part { id, measures })
}

/// `previous` is the number of the measure before this one in the part, if any.
fn read_measure(element: &XmlElement, previous: Option<u32>) -> Result<Measure, ScoreError> {
    let parsed = element
        .attribute("number")
        .and_then(|n| n.trim().parse::<u32>().ok());
    let number = match (parsed, previous) {
        // Measure 0 is a pickup, allowed only as the first measure of a part
        (Some(0), None) => 0,
        (Some(n), _) if n > 0 => n,
        _ => {
            let assigned = previous.map_or(1, |p| p + 1);
            warn!(
                number = ?element.attribute("number"),
                assigned,
                "measure number is not a positive integer"
            );
            assigned
        }
    };

    let mut measure = Measure {
        number,
        attributes: element
            .attributes
            .iter()
            .filter(|(k, _)| k != "number")
            .cloned()
            .collect(),
        events: Vec::new(),
        inline: Vec::new(),
    };

    for child in element.elements() {
        let before = measure.events.len();
        let item = match child.name.as_str() {
            "note" => match read_note(child)? {
                Some(event) => {
                    measure.events.push(event);
                    continue;
                }
                None => InlineItem::Other(child.clone()),
            },
            "attributes" => InlineItem::Attributes(read_attributes(child)?),
            _ => InlineItem::Other(child.clone()),
        };
        measure.inline.push(Inline { before, item });
    }

    Ok(measure)
}

fn read_attributes(element: &XmlElement) -> Result<Attributes, ScoreError> {
    let mut items = Vec::new();
    for child in element.elements() {
        let item = match child.name.as_str() {
            "key" if child.has_child("fifths") => AttributeItem::Key(read_key(child)?),
            "transpose" if child.has_child("chromatic") && child.attributes.is_empty() => {
                AttributeItem::Transpose(Transpose {
                    diatonic: parse_optional::<i8>(child, "diatonic")?.unwrap_or(0),
                    chromatic: parse_number::<i8>(child, "chromatic")?,
                    octave_change: parse_optional::<i8>(child, "octave-change")?,
                })
            }
            _ => AttributeItem::Other(child.clone()),
        };
        items.push(item);
    }
    Ok(Attributes { items })
}

fn read_key(element: &XmlElement) -> Result<KeyElement, ScoreError> {
    let signature = KeySignature {
        fifths: parse_number::<i8>(element, "fifths")?,
        mode: element.child_text("mode"),
    };
    Ok(KeyElement {
        signature,
        attributes: element.attributes.clone(),
        cancel: element.child("cancel").cloned(),
        trailing: element
            .elements()
            .filter(|el| !matches!(el.name.as_str(), "cancel" | "fifths" | "mode"))
            .cloned()
            .collect(),
    })
}

/// Map a `<note>` onto an event, or `None` for notes kept inline (grace, cue, unpitched).
fn read_note(element: &XmlElement) -> Result<Option<Event>, ScoreError> {
    if ["grace", "cue", "unpitched"]
        .iter()
        .any(|name| element.has_child(name))
    {
        return Ok(None);
    }

    let mut preserved = Preserved {
        attributes: element.attributes.clone(),
        ..Default::default()
    };
    let mut note_type = None;
    for child in element.elements() {
        if child.name == "type" {
            note_type = NoteType::from_musicxml(&child.text());
            if note_type.is_none() {
                preserved.children.push(child.clone());
            }
        } else if !MODELLED_NOTE_CHILDREN.contains(&child.name.as_str()) {
            preserved.children.push(child.clone());
        }
    }

    let duration = parse_number::<u32>(element, "duration")?;
    let dots = element.elements().filter(|el| el.name == "dot").count() as u8;
    let voice = element.child_text("voice");
    let time_modification = element
        .child("time-modification")
        .map(read_time_modification)
        .transpose()?;

    if let Some(rest) = element.child("rest") {
        return Ok(Some(Event::Rest(Rest {
            duration,
            note_type,
            dots,
            voice,
            measure_rest: rest.attribute("measure") == Some("yes"),
            display: rest.elements().cloned().collect(),
            time_modification,
            preserved,
        })));
    }

    let pitch = element
        .child("pitch")
        .ok_or_else(|| missing("note", "pitch"))
        .and_then(read_pitch)?;

    let mut note = Note {
        pitch,
        duration,
        note_type,
        dots,
        voice,
        stem: None,
        accidental: None,
        tie_start: false,
        tie_stop: false,
        slurs: Vec::new(),
        beams: Vec::new(),
        time_modification,
        annotations: Vec::new(),
        chord: element.has_child("chord"),
        preserved,
    };

    for child in element.elements() {
        match child.name.as_str() {
            "tie" => match child.attribute("type") {
                Some("start") => note.tie_start = true,
                Some("stop") => note.tie_stop = true,
                _ => {}
            },
            "stem" => match Stem::from_musicxml(&child.text()) {
                Some(stem) => note.stem = Some(stem),
                None => note.preserved.children.push(child.clone()),
            },
            "accidental" => note.accidental = Some(read_accidental(child)),
            "beam" => note.beams.push(Beam {
                number: child
                    .attribute("number")
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(1),
                value: child.text().trim().to_string(),
            }),
            "notations" => read_notations(child, &mut note),
            _ => {}
        }
    }

    Ok(Some(Event::Note(note)))
}

fn read_pitch(element: &XmlElement) -> Result<Pitch, ScoreError> {
    let step_text = element
        .child_text("step")
        .ok_or_else(|| missing("pitch", "step"))?;
    let step = step_text
        .chars()
        .next()
        .filter(|_| step_text.len() == 1)
        .and_then(Step::from_letter)
        .ok_or_else(|| invalid("step", &step_text))?;

    let alter = match element.child_text("alter") {
        Some(text) => parse_alter(&text)?,
        None => 0,
    };

    Ok(Pitch {
        step,
        alter,
        octave: parse_number::<i8>(element, "octave")?,
    })
}

/// `<alter>` is a decimal; whole-semitone values such as "-1.0" are accepted.
fn parse_alter(text: &str) -> Result<i8, ScoreError> {
    if let Ok(alter) = text.parse::<i8>() {
        return Ok(alter);
    }
    match text.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() <= 2.0 => Ok(value as i8),
        _ => Err(invalid("alter", text)),
    }
}

fn read_accidental(element: &XmlElement) -> Accidental {
    Accidental {
        kind: AccidentalKind::from_musicxml(&element.text()),
        cautionary: element.attribute("cautionary") == Some("yes"),
        attributes: element
            .attributes
            .iter()
            .filter(|(k, _)| k != "cautionary")
            .cloned()
            .collect(),
    }
}

fn read_time_modification(element: &XmlElement) -> Result<TimeModification, ScoreError> {
    Ok(TimeModification {
        actual_notes: parse_number::<u8>(element, "actual-notes")?,
        normal_notes: parse_number::<u8>(element, "normal-notes")?,
        normal_type: element
            .child_text("normal-type")
            .and_then(|t| NoteType::from_musicxml(&t)),
    })
}

fn read_notations(element: &XmlElement, note: &mut Note) {
    for child in element.elements() {
        match child.name.as_str() {
            "tied" => match child.attribute("type") {
                Some("start") => note.tie_start = true,
                Some("stop") => note.tie_stop = true,
                _ => note.preserved.notations.push(child.clone()),
            },
            "slur" => {
                let kind = match child.attribute("type") {
                    Some("start") => Some(SlurKind::Start),
                    Some("stop") => Some(SlurKind::Stop),
                    Some("continue") => Some(SlurKind::Continue),
                    _ => None,
                };
                match kind {
                    Some(kind) => note.slurs.push(Slur {
                        kind,
                        number: child.attribute("number").and_then(|n| n.parse().ok()),
                    }),
                    None => note.preserved.notations.push(child.clone()),
                }
            }
            "technical" => read_technical(child, note),
            _ => note.preserved.notations.push(child.clone()),
        }
    }
}

fn read_technical(element: &XmlElement, note: &mut Note) {
    for child in element.elements() {
        match child.name.as_str() {
            "fingering" => note.annotations.push(Annotation::Fingering {
                text: child.text().trim().to_string(),
                placement: child.attribute("placement").map(str::to_string),
            }),
            "hole" if child.has_child("hole-closed") && !child.has_child("hole-type") => {
                note.annotations.push(Annotation::Hole {
                    closed: child.child_text("hole-closed").as_deref() == Some("yes"),
                })
            }
            _ => note.preserved.technical.push(child.clone()),
        }
    }
}

fn parse_number<T: std::str::FromStr>(parent: &XmlElement, name: &str) -> Result<T, ScoreError> {
    parse_optional(parent, name)?.ok_or_else(|| missing(&parent.name, name))
}

fn parse_optional<T: std::str::FromStr>(
    parent: &XmlElement,
    name: &str,
) -> Result<Option<T>, ScoreError> {
    match parent.child_text(name) {
        Some(text) => text.parse::<T>().map(Some).map_err(|_| invalid(name, &text)),
        None => Ok(None),
    }
}

fn missing(parent: &str, element: &str) -> ScoreError {
    ScoreError::MissingElement {
        parent: parent.to_string(),
        element: element.to_string(),
    }
}

fn invalid(element: &str, value: &str) -> ScoreError {
    ScoreError::InvalidValue {
        element: element.to_string(),
        value: value.to_string(),
    }
}
