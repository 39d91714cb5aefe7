//! Rehearsal mark renumbering.
//!
//! OMR output often garbles rehearsal marks (a boxed "B" read as "8", a letter skipped). The
//! pass rewrites every `<rehearsal>` inside a `<direction>` either to the number of the
//! measure it sits in, or to sequential letters per part: A to Z, then AA, BB, and so on.

use crate::model::{InlineItem, Score};
use crate::xml::XmlElement;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RehearsalMode {
    MeasureNumbers,
    Letters,
}

impl RehearsalMode {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim() {
            "measure-numbers" | "measure_numbers" => Some(RehearsalMode::MeasureNumbers),
            "letters" => Some(RehearsalMode::Letters),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RehearsalStats {
    pub marks_fixed: usize,
}

pub fn renumber_rehearsal_marks(score: &Score, mode: RehearsalMode) -> (Score, RehearsalStats) {
    let mut result = score.clone();
    let mut stats = RehearsalStats::default();

    for part in &mut result.parts {
        let mut letters = 0;
        for measure in &mut part.measures {
            let number = measure.number;
            for inline in &mut measure.inline {
                let InlineItem::Other(element) = &mut inline.item else {
                    continue;
                };
                if element.name != "direction" {
                    continue;
                }
                for mark in rehearsal_marks_mut(element) {
                    let label = match mode {
                        RehearsalMode::MeasureNumbers => number.to_string(),
                        RehearsalMode::Letters => {
                            letters += 1;
                            letter_label(letters - 1)
                        }
                    };
                    let current = mark.text();
                    if current.trim() != label {
                        debug!(measure = number, from = %current.trim(), to = %label, "fixed rehearsal mark");
                        mark.set_text(&label);
                        stats.marks_fixed += 1;
                    }
                }
            }
        }
    }

    info!(fixed = stats.marks_fixed, ?mode, "rehearsal marks done");
    (result, stats)
}

fn rehearsal_marks_mut(direction: &mut XmlElement) -> impl Iterator<Item = &mut XmlElement> {
    direction
        .elements_mut()
        .filter(|el| el.name == "direction-type")
        .flat_map(|el| el.elements_mut())
        .filter(|el| el.name == "rehearsal")
}

/// "A".."Z", then "AA", "BB", ...
fn letter_label(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    std::iter::repeat(letter).take(index / 26 + 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Inline, Measure};

    fn with_mark(number: u32, text: &str) -> Measure {
        let mut measure = Measure::new(number, Vec::new());
        let direction = XmlElement::new("direction").with_child(
            XmlElement::new("direction-type").with_child(
                XmlElement::with_text("rehearsal", text).with_attribute("enclosure", "square"),
            ),
        );
        measure.inline.push(Inline {
            before: 0,
            item: InlineItem::Other(direction),
        });
        measure
    }

    fn marks(score: &Score) -> Vec<String> {
        score.parts[0]
            .measures
            .iter()
            .flat_map(|m| &m.inline)
            .filter_map(|i| match &i.item {
                InlineItem::Other(el) => el.child("direction-type")?.child_text("rehearsal"),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_measure_number_mode() {
        let score = Score::from_measures(vec![with_mark(5, "8"), with_mark(13, "13")]);
        let (result, stats) = renumber_rehearsal_marks(&score, RehearsalMode::MeasureNumbers);
        assert_eq!(marks(&result), vec!["5", "13"]);
        assert_eq!(stats.marks_fixed, 1);
    }

    #[test]
    fn test_letter_mode() {
        let score = Score::from_measures(vec![
            with_mark(1, "A"),
            Measure::new(2, Vec::new()),
            with_mark(3, "8"),
            with_mark(9, "D"),
        ]);
        let (result, stats) = renumber_rehearsal_marks(&score, RehearsalMode::Letters);
        assert_eq!(marks(&result), vec!["A", "B", "C"]);
        assert_eq!(stats.marks_fixed, 2);
        // Enclosure survives
        let InlineItem::Other(direction) = &result.parts[0].measures[2].inline[0].item else {
            panic!("direction expected");
        };
        let mark = direction.child("direction-type").unwrap().child("rehearsal").unwrap();
        assert_eq!(mark.attribute("enclosure"), Some("square"));
    }

    #[test]
    fn test_letters_past_z() {
        assert_eq!(letter_label(0), "A");
        assert_eq!(letter_label(25), "Z");
        assert_eq!(letter_label(26), "AA");
        assert_eq!(letter_label(27), "BB");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(RehearsalMode::from_name("letters"), Some(RehearsalMode::Letters));
        assert_eq!(
            RehearsalMode::from_name("measure-numbers"),
            Some(RehearsalMode::MeasureNumbers)
        );
        assert_eq!(RehearsalMode::from_name("roman"), None);
    }
}
