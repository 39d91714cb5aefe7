//! # easyscore
//!
//! Simplifies and corrects MusicXML scores (typically produced by optical music recognition)
//! so that beginner wind and brass players can read them.
//!
//! ## Passes
//! - `rhythm` - Merges eighth-note figures into quarter and half notes
//! - `range` - Moves notes by octaves into the instrument's beginner range
//! - `correct` - Fixes instrument metadata, `<transpose>` and the written key
//! - `courtesy` - Adds cautionary accidentals at pedagogically ambiguous points
//! - `fingering` - Annotates notes with fingerings or valve combinations
//! - `rehearsal` - Renumbers rehearsal marks by measure number or letter
//! - `rests` - Prints multi-measure rests as single measures
//! - `metadata` - Notes the processing in the software credit
//!
//! See [`pipeline`] for the entry points that run them in order.

pub mod correct;
pub mod courtesy;
pub mod error;
pub mod fingering;
pub mod instrument;
pub mod key;
pub mod metadata;
pub mod model;
pub mod musicxml;
pub mod options;
pub mod pipeline;
pub mod range;
pub mod rehearsal;
pub mod rests;
pub mod rhythm;
pub mod validate;
pub mod xml;

pub use error::*;
pub use instrument::{profile, InstrumentProfile};
pub use key::KeySignature;
pub use model::*;
pub use musicxml::{read_score, write_score};
pub use options::{FingeringStyle, RangeOptions, TransformOptions};
pub use pipeline::{simplify_musicxml, transform, TransformReport, TransformStats};
pub use rehearsal::RehearsalMode;
pub use validate::validate_score;
