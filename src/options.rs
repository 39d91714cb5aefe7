//! Transformation options.
//!
//! One options struct switches every pass on or off. It can be built in code, or loaded
//! from a kebab-case YAML file:
//!
//! ```yaml
//! simplify-rhythm: true
//! source-key: Bb
//! add-courtesy-accidentals: true
//! fingering-style: both
//! rehearsal-marks: letters
//! range:
//!   max-leap: 7
//!   floor: Bb3
//! ```

use crate::error::ScoreError;
use crate::key::KeySignature;
use crate::model::Pitch;
use crate::rehearsal::RehearsalMode;
use serde::Deserialize;

/// Leap, in semitones, above which a note is considered for octave smoothing
pub const DEFAULT_MAX_LEAP: i32 = 7;

/// Notes inspected on each side of the current note during smoothing
pub const DEFAULT_CONTEXT: usize = 3;

/// How fingering annotations are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingeringStyle {
    #[default]
    Numbers,
    Holes,
    Both,
}

impl FingeringStyle {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim() {
            "numbers" => Some(FingeringStyle::Numbers),
            "holes" => Some(FingeringStyle::Holes),
            "both" => Some(FingeringStyle::Both),
            _ => None,
        }
    }

    pub fn shows_numbers(&self) -> bool {
        matches!(self, FingeringStyle::Numbers | FingeringStyle::Both)
    }

    pub fn shows_holes(&self) -> bool {
        matches!(self, FingeringStyle::Holes | FingeringStyle::Both)
    }
}

/// Tuning for the range transposer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeOptions {
    pub max_leap: i32,
    pub context: usize,
    /// Lowest MIDI note smoothing may produce; defaults to the playable range
    pub floor: Option<i32>,
    /// Highest MIDI note smoothing may produce; defaults to the playable range
    pub ceiling: Option<i32>,
}

impl Default for RangeOptions {
    fn default() -> Self {
        Self {
            max_leap: DEFAULT_MAX_LEAP,
            context: DEFAULT_CONTEXT,
            floor: None,
            ceiling: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    pub simplify_rhythm: bool,
    pub transpose_for_range: bool,
    pub correct_instrument: bool,
    /// Concert key the score was written in; enables key recomputation
    pub source_key: Option<KeySignature>,
    /// Annotate chart pitches the player is not yet familiar with
    pub add_fingerings: bool,
    pub add_courtesy_accidentals: bool,
    /// Annotate every note that shows an accidental
    pub add_courtesy_fingerings: bool,
    pub fingering_style: FingeringStyle,
    /// Replace part names with the instrument's part name
    pub rename_parts: bool,
    /// How to rewrite rehearsal marks; `None` leaves them alone
    pub rehearsal_marks: Option<RehearsalMode>,
    pub split_multimeasure_rests: bool,
    /// Note the processing in the software credit and part name metadata
    pub mark_processed: bool,
    pub range: RangeOptions,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            simplify_rhythm: true,
            transpose_for_range: true,
            correct_instrument: true,
            source_key: None,
            add_fingerings: false,
            add_courtesy_accidentals: false,
            add_courtesy_fingerings: false,
            fingering_style: FingeringStyle::default(),
            rename_parts: false,
            rehearsal_marks: Some(RehearsalMode::MeasureNumbers),
            split_multimeasure_rests: false,
            mark_processed: true,
            range: RangeOptions::default(),
        }
    }
}

/// Raw options for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawOptions {
    pub simplify_rhythm: Option<bool>,
    pub transpose_for_range: Option<bool>,
    pub correct_instrument: Option<bool>,
    pub source_key: Option<String>,
    pub add_fingerings: Option<bool>,
    pub add_courtesy_accidentals: Option<bool>,
    pub add_courtesy_fingerings: Option<bool>,
    pub fingering_style: Option<String>,
    pub rename_parts: Option<bool>,
    pub rehearsal_marks: Option<String>, // measure-numbers, letters or none
    pub split_multimeasure_rests: Option<bool>,
    pub mark_processed: Option<bool>,
    pub range: Option<RawRangeOptions>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawRangeOptions {
    pub max_leap: Option<i32>,
    pub context: Option<usize>,
    pub floor: Option<String>, // pitch name, e.g. "Bb3"
    pub ceiling: Option<String>,
}

impl TransformOptions {
    /// Load options from YAML. Keys that are absent keep their defaults.
    ///
    /// # Example
    /// ```
    /// use easyscore::TransformOptions;
    ///
    /// let options = TransformOptions::from_yaml("source-key: Bb\nsimplify-rhythm: false").unwrap();
    /// assert_eq!(options.source_key.unwrap().fifths, -2);
    /// assert!(!options.simplify_rhythm);
    /// assert!(options.transpose_for_range);
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, ScoreError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawOptions =
            serde_yaml::from_str(content).map_err(|e| ScoreError::Options(e.to_string()))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawOptions) -> Result<Self, ScoreError> {
        let defaults = Self::default();

        let source_key = raw
            .source_key
            .as_deref()
            .map(parse_key)
            .transpose()?;

        let fingering_style = match &raw.fingering_style {
            Some(name) => FingeringStyle::from_name(name).ok_or_else(|| {
                ScoreError::Options(format!(
                    "Invalid fingering style: {} (expected numbers, holes or both)",
                    name
                ))
            })?,
            None => defaults.fingering_style,
        };

        let rehearsal_marks = match &raw.rehearsal_marks {
            Some(name) => parse_rehearsal_mode(name)?,
            None => defaults.rehearsal_marks,
        };

        let range = match raw.range {
            Some(r) => RangeOptions {
                max_leap: r.max_leap.unwrap_or(DEFAULT_MAX_LEAP),
                context: r.context.unwrap_or(DEFAULT_CONTEXT),
                floor: r.floor.as_deref().map(parse_midi).transpose()?,
                ceiling: r.ceiling.as_deref().map(parse_midi).transpose()?,
            },
            None => defaults.range,
        };

        Ok(Self {
            simplify_rhythm: raw.simplify_rhythm.unwrap_or(defaults.simplify_rhythm),
            transpose_for_range: raw
                .transpose_for_range
                .unwrap_or(defaults.transpose_for_range),
            correct_instrument: raw.correct_instrument.unwrap_or(defaults.correct_instrument),
            source_key,
            add_fingerings: raw.add_fingerings.unwrap_or(defaults.add_fingerings),
            add_courtesy_accidentals: raw
                .add_courtesy_accidentals
                .unwrap_or(defaults.add_courtesy_accidentals),
            add_courtesy_fingerings: raw
                .add_courtesy_fingerings
                .unwrap_or(defaults.add_courtesy_fingerings),
            fingering_style,
            rename_parts: raw.rename_parts.unwrap_or(defaults.rename_parts),
            rehearsal_marks,
            split_multimeasure_rests: raw
                .split_multimeasure_rests
                .unwrap_or(defaults.split_multimeasure_rests),
            mark_processed: raw.mark_processed.unwrap_or(defaults.mark_processed),
            range,
        })
    }
}

/// Parse a key name for `source-key` and the `--source-key` flag.
pub fn parse_key(name: &str) -> Result<KeySignature, ScoreError> {
    KeySignature::from_name(name)
        .ok_or_else(|| ScoreError::Options(format!("Invalid key signature: {}", name)))
}

/// Parse a rehearsal mode for `rehearsal-marks` and the `--rehearsal` flag; "none" turns the
/// pass off.
pub fn parse_rehearsal_mode(name: &str) -> Result<Option<RehearsalMode>, ScoreError> {
    if name.trim() == "none" {
        return Ok(None);
    }
    RehearsalMode::from_name(name).map(Some).ok_or_else(|| {
        ScoreError::Options(format!(
            "Invalid rehearsal mode: {} (expected measure-numbers, letters or none)",
            name
        ))
    })
}

fn parse_midi(name: &str) -> Result<i32, ScoreError> {
    name.parse::<Pitch>()
        .map(|p| p.midi())
        .map_err(|_| ScoreError::Options(format!("Invalid pitch: {}", name)))
}
