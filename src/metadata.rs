//! Marks a transformed score as processed.
//!
//! Every `<software>` entry of the encoding gets a suffix naming what was done, so a printed
//! part can be told apart from the scan it came from. Unless parts were renamed, the
//! `partName` miscellaneous field gets a shorter suffix too. Suffixes already present are not
//! added again.

use crate::model::Score;
use crate::xml::XmlElement;
use tracing::debug;

/// What the run did to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processing {
    /// Rhythm was simplified
    Simplified,
    /// Only recognition errors were corrected
    OmrCorrected,
}

impl Processing {
    fn part_name_suffix(self) -> &'static str {
        match self {
            Processing::Simplified => " - Simplified",
            Processing::OmrCorrected => " - OMR Corrected",
        }
    }

    fn software_suffix(self) -> &'static str {
        match self {
            Processing::Simplified => " - Simplified by easyscore",
            Processing::OmrCorrected => " - OMR Corrected by easyscore",
        }
    }
}

/// Append processing suffixes to the score's metadata. Returns how many fields changed.
pub fn mark_processed(score: &mut Score, processing: Processing, include_part_name: bool) -> usize {
    let mut changed = 0;

    for identification in score.header.iter_mut().filter(|el| el.name == "identification") {
        for encoding in identification.elements_mut().filter(|el| el.name == "encoding") {
            for software in encoding.elements_mut().filter(|el| el.name == "software") {
                changed += append_suffix(software, processing.software_suffix()) as usize;
            }
        }

        if include_part_name {
            for miscellaneous in identification
                .elements_mut()
                .filter(|el| el.name == "miscellaneous")
            {
                for field in miscellaneous.elements_mut().filter(|el| {
                    el.name == "miscellaneous-field" && el.attribute("name") == Some("partName")
                }) {
                    changed += append_suffix(field, processing.part_name_suffix()) as usize;
                }
            }
        }
    }

    debug!(changed, ?processing, "marked score as processed");
    changed
}

fn append_suffix(element: &mut XmlElement, suffix: &str) -> bool {
    let text = element.text();
    if text.trim_end().ends_with(suffix) {
        return false;
    }
    element.set_text(&format!("{}{}", text.trim_end(), suffix));
    true
}
