//! Shape checks run on a transformed score before it is written.

use crate::error::ScoreError;
use crate::model::Score;

/// Check that the score has at least one part, every part has at least one measure, and
/// every part is declared in the part list.
pub fn validate_score(score: &Score) -> Result<(), ScoreError> {
    if score.parts.is_empty() {
        return Err(ScoreError::Structure("score has no parts".to_string()));
    }

    let declared = score.declared_part_ids();
    for part in &score.parts {
        if part.measures.is_empty() {
            return Err(ScoreError::Structure(format!(
                "part {} has no measures",
                part.id
            )));
        }
        if !declared.contains(&part.id.as_str()) {
            return Err(ScoreError::Structure(format!(
                "part {} is not declared in the part list",
                part.id
            )));
        }
    }

    Ok(())
}
