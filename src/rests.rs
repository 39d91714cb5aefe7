//! Multi-measure rest expansion.
//!
//! A `<multiple-rest>` draws several empty measures as one bar with a count, which beginners
//! lose their place in. The measures themselves are still in the document, so removing the
//! directive is enough to print them one by one. Whole-measure rests (`<rest measure="yes">`)
//! become plain rests.

use crate::model::{AttributeItem, Event, Score};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestStats {
    pub multiple_rests_removed: usize,
    pub measure_rests_converted: usize,
}

pub fn split_multimeasure_rests(score: &Score) -> (Score, RestStats) {
    let mut result = score.clone();
    let mut stats = RestStats::default();

    for part in &mut result.parts {
        for measure in &mut part.measures {
            let number = measure.number;
            for attributes in measure.attributes_blocks_mut() {
                for item in &mut attributes.items {
                    if let AttributeItem::Other(style) = item {
                        if style.name == "measure-style" {
                            let removed = style.remove_children("multiple-rest");
                            if removed > 0 {
                                debug!(measure = number, "removed multiple-rest");
                            }
                            stats.multiple_rests_removed += removed;
                        }
                    }
                }
                // A measure-style left with nothing to say goes too
                attributes.items.retain(|item| {
                    !matches!(item, AttributeItem::Other(el) if el.name == "measure-style" && el.elements().next().is_none())
                });
            }

            for event in &mut measure.events {
                if let Event::Rest(rest) = event {
                    if rest.measure_rest {
                        rest.measure_rest = false;
                        stats.measure_rests_converted += 1;
                    }
                }
            }
        }
    }

    info!(
        multiple_rests = stats.multiple_rests_removed,
        measure_rests = stats.measure_rests_converted,
        "multi-measure rests split"
    );
    (result, stats)
}
