use crate::model::*;
use crate::xml::{XmlElement, XmlNode};

/// Convert a Score to MusicXML text
pub fn write_score(score: &Score) -> String {
    let mut xml = String::new();
    let version = score.version().unwrap_or("4.0");

    // XML declaration and doctype
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML {} Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#,
        version
    ));
    xml.push('\n');

    let mut root = String::from("<score-partwise");
    push_attributes(&mut root, &score.attributes);
    xml.push_str(&root);
    xml.push_str(">\n");

    for element in &score.header {
        element.write(&mut xml, 1);
    }

    let part_list = XmlElement {
        name: "part-list".to_string(),
        attributes: Vec::new(),
        children: score.part_list.iter().cloned().map(XmlNode::Element).collect(),
    };
    part_list.write(&mut xml, 1);

    for part in &score.parts {
        xml.push_str(&format!("  <part id=\"{}\">\n", escape(&part.id)));
        for measure in &part.measures {
            measure_to_xml(&mut xml, measure);
        }
        xml.push_str("  </part>\n");
    }

    xml.push_str("</score-partwise>\n");
    xml
}

fn measure_to_xml(xml: &mut String, measure: &Measure) {
    let mut open = format!("    <measure number=\"{}\"", measure.number);
    push_attributes(&mut open, &measure.attributes);
    xml.push_str(&open);

    if measure.events.is_empty() && measure.inline.is_empty() {
        xml.push_str("/>\n");
        return;
    }
    xml.push_str(">\n");

    for index in 0..=measure.events.len() {
        for inline in measure.inline.iter().filter(|i| i.before == index) {
            inline_to_xml(&inline.item).write(xml, 3);
        }
        if let Some(event) = measure.events.get(index) {
            event_to_xml(event).write(xml, 3);
        }
    }

    // Anchors past the end can only come from a pass that dropped trailing events.
    for inline in measure
        .inline
        .iter()
        .filter(|i| i.before > measure.events.len())
    {
        inline_to_xml(&inline.item).write(xml, 3);
    }

    xml.push_str("    </measure>\n");
}

fn inline_to_xml(item: &InlineItem) -> XmlElement {
    match item {
        InlineItem::Other(element) => element.clone(),
        InlineItem::Attributes(attributes) => attributes_to_xml(attributes),
    }
}

fn key_to_xml(key: &KeyElement) -> XmlElement {
    let mut element = XmlElement::new("key");
    element.attributes = key.attributes.clone();
    if let Some(cancel) = &key.cancel {
        element.push(cancel.clone());
    }
    element.push(XmlElement::with_text("fifths", &key.signature.fifths.to_string()));
    if let Some(mode) = &key.signature.mode {
        element.push(XmlElement::with_text("mode", mode));
    }
    for child in &key.trailing {
        element.push(child.clone());
    }
    element
}

fn attributes_to_xml(attributes: &Attributes) -> XmlElement {
    let mut element = XmlElement::new("attributes");
    for item in &attributes.items {
        match item {
            AttributeItem::Key(key) => element.push(key_to_xml(key)),
            AttributeItem::Transpose(transpose) => {
                let mut transpose_el = XmlElement::new("transpose")
                    .with_child(XmlElement::with_text(
                        "diatonic",
                        &transpose.diatonic.to_string(),
                    ))
                    .with_child(XmlElement::with_text(
                        "chromatic",
                        &transpose.chromatic.to_string(),
                    ));
                if let Some(octave_change) = transpose.octave_change {
                    transpose_el.push(XmlElement::with_text(
                        "octave-change",
                        &octave_change.to_string(),
                    ));
                }
                element.push(transpose_el);
            }
            AttributeItem::Other(other) => element.push(other.clone()),
        }
    }
    element
}

fn event_to_xml(event: &Event) -> XmlElement {
    match event {
        Event::Note(note) => note_to_xml(note),
        Event::Rest(rest) => rest_to_xml(rest),
    }
}

fn note_to_xml(note: &Note) -> XmlElement {
    let mut children: Vec<XmlElement> = Vec::new();

    if note.chord {
        children.push(XmlElement::new("chord"));
    }

    let mut pitch = XmlElement::new("pitch").with_child(XmlElement::with_text("step", note.pitch.step.as_str()));
    if note.pitch.alter != 0 {
        pitch.push(XmlElement::with_text("alter", &note.pitch.alter.to_string()));
    }
    pitch.push(XmlElement::with_text("octave", &note.pitch.octave.to_string()));
    children.push(pitch);

    children.push(XmlElement::with_text("duration", &note.duration.to_string()));
    if note.tie_stop {
        children.push(XmlElement::new("tie").with_attribute("type", "stop"));
    }
    if note.tie_start {
        children.push(XmlElement::new("tie").with_attribute("type", "start"));
    }

    push_timing(
        &mut children,
        note.voice.as_deref(),
        note.note_type,
        note.dots,
    );

    if let Some(accidental) = &note.accidental {
        let mut el = XmlElement::with_text("accidental", accidental.kind.musicxml_name());
        if accidental.cautionary {
            el.set_attribute("cautionary", "yes");
        }
        for (key, value) in &accidental.attributes {
            el.set_attribute(key, value);
        }
        children.push(el);
    }

    if let Some(tm) = &note.time_modification {
        children.push(time_modification_to_xml(tm));
    }

    if let Some(stem) = note.stem {
        children.push(XmlElement::with_text("stem", stem.musicxml_name()));
    }

    for beam in &note.beams {
        children.push(
            XmlElement::with_text("beam", &beam.value).with_attribute("number", &beam.number.to_string()),
        );
    }

    if let Some(notations) = notations_to_xml(note) {
        children.push(notations);
    }

    children.extend(note.preserved.children.iter().cloned());
    finish_note(children, &note.preserved.attributes)
}

fn rest_to_xml(rest: &Rest) -> XmlElement {
    let mut children: Vec<XmlElement> = Vec::new();

    let mut rest_el = XmlElement::new("rest");
    if rest.measure_rest {
        rest_el.set_attribute("measure", "yes");
    }
    for child in &rest.display {
        rest_el.push(child.clone());
    }
    children.push(rest_el);
    children.push(XmlElement::with_text("duration", &rest.duration.to_string()));

    push_timing(&mut children, rest.voice.as_deref(), rest.note_type, rest.dots);

    if let Some(tm) = &rest.time_modification {
        children.push(time_modification_to_xml(tm));
    }

    children.extend(rest.preserved.children.iter().cloned());
    if !rest.preserved.notations.is_empty() {
        let mut notations = XmlElement::new("notations");
        for el in &rest.preserved.notations {
            notations.push(el.clone());
        }
        children.push(notations);
    }
    finish_note(children, &rest.preserved.attributes)
}

fn push_timing(
    children: &mut Vec<XmlElement>,
    voice: Option<&str>,
    note_type: Option<NoteType>,
    dots: u8,
) {
    if let Some(voice) = voice {
        children.push(XmlElement::with_text("voice", voice));
    }
    if let Some(note_type) = note_type {
        children.push(XmlElement::with_text("type", note_type.musicxml_type()));
    }
    for _ in 0..dots {
        children.push(XmlElement::new("dot"));
    }
}

fn time_modification_to_xml(tm: &TimeModification) -> XmlElement {
    let mut el = XmlElement::new("time-modification")
        .with_child(XmlElement::with_text("actual-notes", &tm.actual_notes.to_string()))
        .with_child(XmlElement::with_text("normal-notes", &tm.normal_notes.to_string()));
    if let Some(normal_type) = tm.normal_type {
        el.push(XmlElement::with_text("normal-type", normal_type.musicxml_type()));
    }
    el
}

fn notations_to_xml(note: &Note) -> Option<XmlElement> {
    let mut notations = XmlElement::new("notations");

    if note.tie_stop {
        notations.push(XmlElement::new("tied").with_attribute("type", "stop"));
    }
    if note.tie_start {
        notations.push(XmlElement::new("tied").with_attribute("type", "start"));
    }

    for slur in &note.slurs {
        let kind = match slur.kind {
            SlurKind::Start => "start",
            SlurKind::Stop => "stop",
            SlurKind::Continue => "continue",
        };
        let mut el = XmlElement::new("slur").with_attribute("type", kind);
        if let Some(number) = slur.number {
            el.set_attribute("number", &number.to_string());
        }
        notations.push(el);
    }

    for el in &note.preserved.notations {
        notations.push(el.clone());
    }

    if !note.annotations.is_empty() || !note.preserved.technical.is_empty() {
        let mut technical = XmlElement::new("technical");
        for annotation in &note.annotations {
            technical.push(annotation_to_xml(annotation));
        }
        for el in &note.preserved.technical {
            technical.push(el.clone());
        }
        notations.push(technical);
    }

    (!notations.children.is_empty()).then_some(notations)
}

fn annotation_to_xml(annotation: &Annotation) -> XmlElement {
    match annotation {
        Annotation::Fingering { text, placement } => {
            let mut el = XmlElement::with_text("fingering", text);
            if let Some(placement) = placement {
                el.set_attribute("placement", placement);
            }
            el
        }
        Annotation::Hole { closed } => XmlElement::new("hole")
            .with_child(XmlElement::with_text(
                "hole-closed",
                if *closed { "yes" } else { "no" },
            ))
            .with_child(XmlElement::with_text("hole-shape", "circle")),
    }
}

/// Put note children into MusicXML schema order. The sort is stable, so preserved children
/// keep their relative order.
fn finish_note(mut children: Vec<XmlElement>, attributes: &[(String, String)]) -> XmlElement {
    children.sort_by_key(|el| note_child_rank(&el.name));
    XmlElement {
        name: "note".to_string(),
        attributes: attributes.to_vec(),
        children: children.into_iter().map(XmlNode::Element).collect(),
    }
}

fn note_child_rank(name: &str) -> u8 {
    match name {
        "grace" => 0,
        "cue" => 1,
        "chord" => 2,
        "pitch" | "unpitched" | "rest" => 3,
        "duration" => 4,
        "tie" => 5,
        "instrument" => 6,
        "footnote" => 7,
        "level" => 8,
        "voice" => 9,
        "type" => 10,
        "dot" => 11,
        "accidental" => 12,
        "time-modification" => 13,
        "stem" => 14,
        "notehead" => 15,
        "notehead-text" => 16,
        "staff" => 17,
        "beam" => 18,
        "notations" => 19,
        "lyric" => 20,
        "play" => 21,
        "listen" => 22,
        _ => 23,
    }
}

fn push_attributes(out: &mut String, attributes: &[(String, String)]) {
    for (key, value) in attributes {
        out.push_str(&format!(" {}=\"{}\"", key, escape(value)));
    }
}

fn escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}
