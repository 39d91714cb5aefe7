//! # Score Model
//!
//! This module defines the typed score that every transformation pass works on.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── version, root attributes
//!   ├── header: Vec<XmlElement> (work, identification, defaults, credits)
//!   ├── part_list: Vec<XmlElement> (score-part, part-group)
//!   └── Vec<Part>
//!         ├── id
//!         └── Vec<Measure>
//!               ├── number
//!               ├── Vec<Event> (Note | Rest)
//!               └── Vec<Inline> (attributes, directions, barlines, grace notes, ...)
//!
//! Event (enum)
//!   ├── Note
//!   │     ├── pitch: Pitch (step, alter, octave)
//!   │     ├── duration, note_type, dots, voice, stem
//!   │     ├── accidental: Option<Accidental> (kind, cautionary)
//!   │     ├── tie_start/stop: bool
//!   │     ├── slurs, beams, time_modification
//!   │     ├── annotations: Vec<Annotation> (fingering, hole)
//!   │     ├── chord: bool
//!   │     └── preserved: Preserved (unmodelled children, notations, technical)
//!   └── Rest
//!         ├── duration, note_type, dots, voice
//!         ├── measure_rest: bool
//!         └── preserved: Preserved
//! ```
//!
//! ## Key Concepts
//!
//! ### Events and Inline Items
//! A measure's events are its pitched notes and rests in document order. Everything else in
//! the measure (attributes, directions, backup/forward, barlines, grace, cue and unpitched
//! notes) is an [`Inline`] item anchored before an event index. The writer emits inline
//! items anchored at `i`, then event `i`, which restores the original interleaving.
//!
//! ### Durations
//! `duration` is in divisions (the `<divisions>` value of the part), not beats. The symbolic
//! `note_type` and `dots` describe how the note is drawn.
//!
//! ### Pitch
//! MIDI number is `(octave + 1) * 12 + semitone(step) + alter`, so C4 = 60.
//!
//! ## Related Modules
//! - `musicxml` - Reads and writes these types
//! - `rhythm`, `range`, `correct`, `courtesy`, `fingering` - Transform these types
//! - `validate` - Checks the shape of a transformed score

use crate::error::ScoreError;
use crate::key::KeySignature;
use crate::xml::XmlElement;
use std::fmt;
use std::str::FromStr;

/// Diatonic step (letter name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    /// Semitones above C
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Written pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub step: Step,
    pub alter: i8,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Self { step, alter, octave }
    }

    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.step.semitone() + self.alter as i32
    }

    /// Same spelling, `octaves` octaves higher (negative for lower).
    pub fn shifted_octaves(&self, octaves: i8) -> Self {
        Self {
            octave: self.octave + octaves,
            ..*self
        }
    }
}

/// Parses names like "C4", "Bb3", "F#5", "C##4".
impl FromStr for Pitch {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoreError::InvalidValue {
            element: "pitch".to_string(),
            value: s.to_string(),
        };

        let mut chars = s.trim().chars().peekable();
        let step = chars.next().and_then(Step::from_letter).ok_or_else(invalid)?;

        let mut alter: i8 = 0;
        while let Some(&c) = chars.peek() {
            match c {
                '#' => alter += 1,
                'b' => alter -= 1,
                _ => break,
            }
            chars.next();
        }

        let octave: String = chars.collect();
        let octave = octave.parse::<i8>().map_err(|_| invalid())?;
        Ok(Self { step, alter, octave })
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.alter {
            a if a > 0 => "#".repeat(a as usize),
            a if a < 0 => "b".repeat(a.unsigned_abs() as usize),
            _ => String::new(),
        };
        write!(f, "{}{}{}", self.step, accidental, self.octave)
    }
}

/// Symbolic note value (the `<type>` element)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl NoteType {
    pub fn musicxml_type(&self) -> &'static str {
        match self {
            NoteType::Breve => "breve",
            NoteType::Whole => "whole",
            NoteType::Half => "half",
            NoteType::Quarter => "quarter",
            NoteType::Eighth => "eighth",
            NoteType::Sixteenth => "16th",
            NoteType::ThirtySecond => "32nd",
            NoteType::SixtyFourth => "64th",
        }
    }

    pub fn from_musicxml(s: &str) -> Option<Self> {
        match s.trim() {
            "breve" => Some(NoteType::Breve),
            "whole" => Some(NoteType::Whole),
            "half" => Some(NoteType::Half),
            "quarter" => Some(NoteType::Quarter),
            "eighth" => Some(NoteType::Eighth),
            "16th" => Some(NoteType::Sixteenth),
            "32nd" => Some(NoteType::ThirtySecond),
            "64th" => Some(NoteType::SixtyFourth),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccidentalKind {
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    FlatFlat,
    /// Any other MusicXML accidental value (quarter tones, sharp-sharp, ...)
    Other(String),
}

impl AccidentalKind {
    pub fn musicxml_name(&self) -> &str {
        match self {
            AccidentalKind::Sharp => "sharp",
            AccidentalKind::Flat => "flat",
            AccidentalKind::Natural => "natural",
            AccidentalKind::DoubleSharp => "double-sharp",
            AccidentalKind::FlatFlat => "flat-flat",
            AccidentalKind::Other(name) => name,
        }
    }

    pub fn from_musicxml(s: &str) -> Self {
        match s.trim() {
            "sharp" => AccidentalKind::Sharp,
            "flat" => AccidentalKind::Flat,
            "natural" => AccidentalKind::Natural,
            "double-sharp" => AccidentalKind::DoubleSharp,
            "flat-flat" => AccidentalKind::FlatFlat,
            other => AccidentalKind::Other(other.to_string()),
        }
    }

    /// The accidental that spells this alteration.
    pub fn for_alter(alter: i8) -> Option<Self> {
        match alter {
            -2 => Some(AccidentalKind::FlatFlat),
            -1 => Some(AccidentalKind::Flat),
            0 => Some(AccidentalKind::Natural),
            1 => Some(AccidentalKind::Sharp),
            2 => Some(AccidentalKind::DoubleSharp),
            _ => None,
        }
    }
}

/// Visible accidental sign on a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accidental {
    pub kind: AccidentalKind,
    /// Courtesy (cautionary) sign rather than one the pitch requires
    pub cautionary: bool,
    /// Other attributes of the `<accidental>` element (parentheses, editorial, ...)
    pub attributes: Vec<(String, String)>,
}

impl Accidental {
    pub fn written(kind: AccidentalKind) -> Self {
        Self {
            kind,
            cautionary: false,
            attributes: Vec::new(),
        }
    }

    pub fn courtesy(kind: AccidentalKind) -> Self {
        Self {
            kind,
            cautionary: true,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stem {
    Up,
    Down,
    None,
    Double,
}

impl Stem {
    pub fn musicxml_name(&self) -> &'static str {
        match self {
            Stem::Up => "up",
            Stem::Down => "down",
            Stem::None => "none",
            Stem::Double => "double",
        }
    }

    pub fn from_musicxml(s: &str) -> Option<Self> {
        match s.trim() {
            "up" => Some(Stem::Up),
            "down" => Some(Stem::Down),
            "none" => Some(Stem::None),
            "double" => Some(Stem::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlurKind {
    Start,
    Stop,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slur {
    pub kind: SlurKind,
    pub number: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beam {
    pub number: u8,
    /// begin, continue, end, forward hook, backward hook
    pub value: String,
}

/// Tuplet ratio: `actual_notes` in the time of `normal_notes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeModification {
    pub actual_notes: u8,
    pub normal_notes: u8,
    pub normal_type: Option<NoteType>,
}

/// Performance hint attached under `<technical>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Fingering or valve combination text
    Fingering {
        text: String,
        placement: Option<String>,
    },
    /// One hole of a woodwind key diagram
    Hole { closed: bool },
}

/// MusicXML content of a note that the passes never inspect.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preserved {
    /// Attributes of the `<note>` element itself
    pub attributes: Vec<(String, String)>,
    /// Unmodelled `<note>` children (notehead, staff, lyric, ...)
    pub children: Vec<XmlElement>,
    /// Unmodelled `<notations>` children (articulations, fermata, tuplet, ...)
    pub notations: Vec<XmlElement>,
    /// Unmodelled `<technical>` children
    pub technical: Vec<XmlElement>,
}

/// A pitched note
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    pub duration: u32,
    pub note_type: Option<NoteType>,
    pub dots: u8,
    pub voice: Option<String>,
    pub stem: Option<Stem>,
    pub accidental: Option<Accidental>,
    pub tie_start: bool,
    pub tie_stop: bool,
    pub slurs: Vec<Slur>,
    pub beams: Vec<Beam>,
    pub time_modification: Option<TimeModification>,
    pub annotations: Vec<Annotation>,
    /// Sounds together with the previous note
    pub chord: bool,
    pub preserved: Preserved,
}

impl Note {
    pub fn new(pitch: Pitch, duration: u32, note_type: NoteType) -> Self {
        Self {
            pitch,
            duration,
            note_type: Some(note_type),
            dots: 0,
            voice: None,
            stem: None,
            accidental: None,
            tie_start: false,
            tie_stop: false,
            slurs: Vec::new(),
            beams: Vec::new(),
            time_modification: None,
            annotations: Vec::new(),
            chord: false,
            preserved: Preserved::default(),
        }
    }

    pub fn dotted(mut self) -> Self {
        self.dots = 1;
        self
    }

    pub fn with_accidental(mut self, accidental: Accidental) -> Self {
        self.accidental = Some(accidental);
        self
    }

    pub fn has_fingering(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::Fingering { .. } | Annotation::Hole { .. }))
    }
}

/// A rest
#[derive(Debug, Clone, PartialEq)]
pub struct Rest {
    pub duration: u32,
    pub note_type: Option<NoteType>,
    pub dots: u8,
    pub voice: Option<String>,
    /// `<rest measure="yes">`
    pub measure_rest: bool,
    /// Children of `<rest>` (display-step, display-octave)
    pub display: Vec<XmlElement>,
    pub time_modification: Option<TimeModification>,
    pub preserved: Preserved,
}

impl Rest {
    pub fn new(duration: u32, note_type: NoteType) -> Self {
        Self {
            duration,
            note_type: Some(note_type),
            dots: 0,
            voice: None,
            measure_rest: false,
            display: Vec::new(),
            time_modification: None,
            preserved: Preserved::default(),
        }
    }
}

/// A timed event in a measure (discriminated union)
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Note(Note),
    Rest(Rest),
}

impl Event {
    pub fn duration(&self) -> u32 {
        match self {
            Event::Note(n) => n.duration,
            Event::Rest(r) => r.duration,
        }
    }

    pub fn note_type(&self) -> Option<NoteType> {
        match self {
            Event::Note(n) => n.note_type,
            Event::Rest(r) => r.note_type,
        }
    }

    pub fn dots(&self) -> u8 {
        match self {
            Event::Note(n) => n.dots,
            Event::Rest(r) => r.dots,
        }
    }

    pub fn voice(&self) -> Option<&str> {
        match self {
            Event::Note(n) => n.voice.as_deref(),
            Event::Rest(r) => r.voice.as_deref(),
        }
    }

    pub fn time_modification(&self) -> Option<&TimeModification> {
        match self {
            Event::Note(n) => n.time_modification.as_ref(),
            Event::Rest(r) => r.time_modification.as_ref(),
        }
    }

    /// True for chord members after the first; they take no time of their own.
    pub fn is_chord_member(&self) -> bool {
        matches!(self, Event::Note(n) if n.chord)
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Event::Note(n) => Some(n),
            Event::Rest(_) => None,
        }
    }

    pub fn as_note_mut(&mut self) -> Option<&mut Note> {
        match self {
            Event::Note(n) => Some(n),
            Event::Rest(_) => None,
        }
    }
}

/// Transposition declared for a part's written pitch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpose {
    pub diatonic: i8,
    pub chromatic: i8,
    pub octave_change: Option<i8>,
}

/// A traditional `<key>` element: the signature the passes rewrite, plus what they carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyElement {
    pub signature: KeySignature,
    /// Attributes of `<key>` (number, print-object, ...)
    pub attributes: Vec<(String, String)>,
    /// `<cancel>`, written before `<fifths>`
    pub cancel: Option<XmlElement>,
    /// Children after `<mode>`, such as `<key-octave>`
    pub trailing: Vec<XmlElement>,
}

impl From<KeySignature> for KeyElement {
    fn from(signature: KeySignature) -> Self {
        Self {
            signature,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeItem {
    Key(KeyElement),
    Transpose(Transpose),
    /// divisions, time, clef, staves, ... carried verbatim
    Other(XmlElement),
}

/// Contents of an `<attributes>` element, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    pub items: Vec<AttributeItem>,
}

impl Attributes {
    pub fn key(&self) -> Option<&KeySignature> {
        self.items.iter().find_map(|item| match item {
            AttributeItem::Key(k) => Some(&k.signature),
            _ => None,
        })
    }

    pub fn keys_mut(&mut self) -> impl Iterator<Item = &mut KeySignature> {
        self.items.iter_mut().filter_map(|item| match item {
            AttributeItem::Key(k) => Some(&mut k.signature),
            _ => None,
        })
    }

    pub fn transpose(&self) -> Option<&Transpose> {
        self.items.iter().find_map(|item| match item {
            AttributeItem::Transpose(t) => Some(t),
            _ => None,
        })
    }

    pub fn divisions(&self) -> Option<u32> {
        self.items.iter().find_map(|item| match item {
            AttributeItem::Other(el) if el.name == "divisions" => el.text().trim().parse().ok(),
            _ => None,
        })
    }

    /// Replace every transpose with `transpose`, or insert it after the last key, time or
    /// clef when there is none.
    pub fn set_transpose(&mut self, transpose: Transpose) {
        if self.transpose().is_some() {
            self.remove_transpose();
        }
        let position = self
            .items
            .iter()
            .rposition(|item| match item {
                AttributeItem::Key(_) => true,
                AttributeItem::Other(el) => matches!(
                    el.name.as_str(),
                    "divisions" | "time" | "staves" | "part-symbol" | "instruments" | "clef"
                ),
                AttributeItem::Transpose(_) => false,
            })
            .map(|i| i + 1)
            .unwrap_or(0);
        self.items.insert(position, AttributeItem::Transpose(transpose));
    }

    /// Remove every transpose, returning how many were removed.
    pub fn remove_transpose(&mut self) -> usize {
        let before = self.items.len();
        self.items
            .retain(|item| !matches!(item, AttributeItem::Transpose(_)));
        before - self.items.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineItem {
    Attributes(Attributes),
    Other(XmlElement),
}

/// Non-event measure content, emitted just before event `before`.
#[derive(Debug, Clone, PartialEq)]
pub struct Inline {
    pub before: usize,
    pub item: InlineItem,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measure {
    pub number: u32,
    /// Attributes of the `<measure>` element other than `number`
    pub attributes: Vec<(String, String)>,
    pub events: Vec<Event>,
    pub inline: Vec<Inline>,
}

impl Measure {
    pub fn new(number: u32, events: Vec<Event>) -> Self {
        Self {
            number,
            attributes: Vec::new(),
            events,
            inline: Vec::new(),
        }
    }

    /// True if any inline item sits between event `index - 1` and event `index`.
    pub fn has_inline_before(&self, index: usize) -> bool {
        self.inline.iter().any(|i| i.before == index)
    }

    /// Time taken by the events, counting chord members once.
    pub fn total_duration(&self) -> u32 {
        self.events
            .iter()
            .filter(|e| !e.is_chord_member())
            .map(Event::duration)
            .sum()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.events.iter().filter_map(Event::as_note)
    }

    pub fn notes_mut(&mut self) -> impl Iterator<Item = &mut Note> {
        self.events.iter_mut().filter_map(Event::as_note_mut)
    }

    pub fn attributes_blocks(&self) -> impl Iterator<Item = &Attributes> {
        self.inline.iter().filter_map(|i| match &i.item {
            InlineItem::Attributes(a) => Some(a),
            InlineItem::Other(_) => None,
        })
    }

    pub fn attributes_blocks_mut(&mut self) -> impl Iterator<Item = &mut Attributes> {
        self.inline.iter_mut().filter_map(|i| match &mut i.item {
            InlineItem::Attributes(a) => Some(a),
            InlineItem::Other(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    pub id: String,
    pub measures: Vec<Measure>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score {
    /// Attributes of the root element, including `version`
    pub attributes: Vec<(String, String)>,
    /// Root children before the part list (work, identification, defaults, credits)
    pub header: Vec<XmlElement>,
    /// Children of `<part-list>` (score-part, part-group)
    pub part_list: Vec<XmlElement>,
    pub parts: Vec<Part>,
}

impl Score {
    /// Single-part score with a minimal part list, for building scores in code.
    pub fn from_measures(measures: Vec<Measure>) -> Self {
        let score_part = XmlElement::new("score-part")
            .with_attribute("id", "P1")
            .with_child(XmlElement::with_text("part-name", "Music"));
        Self {
            attributes: vec![("version".to_string(), "4.0".to_string())],
            header: Vec::new(),
            part_list: vec![score_part],
            parts: vec![Part {
                id: "P1".to_string(),
                measures,
            }],
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == "version")
            .map(|(_, v)| v.as_str())
    }

    /// `<score-part>` entries of the part list.
    pub fn score_parts(&self) -> impl Iterator<Item = &XmlElement> {
        self.part_list.iter().filter(|el| el.name == "score-part")
    }

    pub fn score_parts_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.part_list.iter_mut().filter(|el| el.name == "score-part")
    }

    /// Part ids declared in the part list.
    pub fn declared_part_ids(&self) -> Vec<&str> {
        self.score_parts().filter_map(|el| el.attribute("id")).collect()
    }

    pub fn measure_count(&self) -> usize {
        self.parts.iter().map(|p| p.measures.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_midi() {
        assert_eq!(Pitch::new(Step::C, 0, 4).midi(), 60);
        assert_eq!(Pitch::new(Step::A, 0, 4).midi(), 69);
        assert_eq!(Pitch::new(Step::B, -1, 3).midi(), 58);
        assert_eq!(Pitch::new(Step::C, 0, 5).midi(), 72);
        assert_eq!(Pitch::new(Step::B, 1, 3).midi(), 60);
    }

    #[test]
    fn test_pitch_from_str() {
        assert_eq!("C5".parse::<Pitch>().unwrap(), Pitch::new(Step::C, 0, 5));
        assert_eq!("Bb3".parse::<Pitch>().unwrap(), Pitch::new(Step::B, -1, 3));
        assert_eq!("F#4".parse::<Pitch>().unwrap(), Pitch::new(Step::F, 1, 4));
        assert_eq!("C##4".parse::<Pitch>().unwrap(), Pitch::new(Step::C, 2, 4));
        assert!("H4".parse::<Pitch>().is_err());
        assert!("C".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_pitch_display() {
        assert_eq!(Pitch::new(Step::E, -1, 5).to_string(), "Eb5");
        assert_eq!(Pitch::new(Step::G, 0, 4).to_string(), "G4");
        assert_eq!(Pitch::new(Step::F, 2, 3).to_string(), "F##3");
    }

    #[test]
    fn test_shifted_octaves_keeps_spelling() {
        let pitch = Pitch::new(Step::F, 1, 5).shifted_octaves(-1);
        assert_eq!(pitch, Pitch::new(Step::F, 1, 4));
    }

    #[test]
    fn test_note_type_names() {
        assert_eq!(NoteType::Sixteenth.musicxml_type(), "16th");
        assert_eq!(NoteType::from_musicxml("eighth"), Some(NoteType::Eighth));
        assert_eq!(NoteType::from_musicxml("128th"), None);
    }

    #[test]
    fn test_accidental_for_alter() {
        assert_eq!(AccidentalKind::for_alter(1), Some(AccidentalKind::Sharp));
        assert_eq!(AccidentalKind::for_alter(0), Some(AccidentalKind::Natural));
        assert_eq!(AccidentalKind::for_alter(3), None);
        assert_eq!(
            AccidentalKind::from_musicxml("quarter-sharp"),
            AccidentalKind::Other("quarter-sharp".to_string())
        );
    }

    #[test]
    fn test_total_duration_skips_chord_members() {
        let mut chord_note = Note::new("E4".parse().unwrap(), 4, NoteType::Whole);
        chord_note.chord = true;
        let measure = Measure::new(
            1,
            vec![
                Event::Note(Note::new("C4".parse().unwrap(), 4, NoteType::Whole)),
                Event::Note(chord_note),
            ],
        );
        assert_eq!(measure.total_duration(), 4);
    }

    #[test]
    fn test_set_transpose_inserts_after_clef() {
        let mut attributes = Attributes {
            items: vec![
                AttributeItem::Other(XmlElement::with_text("divisions", "2")),
                AttributeItem::Key(KeySignature::new(0).into()),
                AttributeItem::Other(XmlElement::new("clef")),
                AttributeItem::Other(XmlElement::new("measure-style")),
            ],
        };
        attributes.set_transpose(Transpose {
            diatonic: -1,
            chromatic: -2,
            octave_change: None,
        });
        assert!(matches!(attributes.items[3], AttributeItem::Transpose(_)));
        assert_eq!(attributes.divisions(), Some(2));
    }

    #[test]
    fn test_set_transpose_replaces_existing() {
        let mut attributes = Attributes {
            items: vec![
                AttributeItem::Other(XmlElement::new("clef")),
                AttributeItem::Transpose(Transpose {
                    diatonic: 0,
                    chromatic: 0,
                    octave_change: None,
                }),
            ],
        };
        attributes.set_transpose(Transpose {
            diatonic: -5,
            chromatic: -9,
            octave_change: None,
        });
        assert_eq!(attributes.items.len(), 2);
        assert_eq!(attributes.transpose().unwrap().chromatic, -9);
    }

    #[test]
    fn test_score_from_measures_declares_part() {
        let score = Score::from_measures(vec![Measure::new(1, Vec::new())]);
        assert_eq!(score.declared_part_ids(), vec!["P1"]);
        assert_eq!(score.version(), Some("4.0"));
        assert_eq!(score.measure_count(), 1);
    }
}
