//! # MusicXML Input and Output
//!
//! `score-partwise` documents are parsed into the element tree in [`crate::xml`], then mapped
//! onto the typed [`Score`](crate::model::Score). The writer goes the other way and emits the
//! standard partwise DOCTYPE.
//!
//! Anything the model does not name (credits, layout, directions, lyrics, articulations, ...)
//! is carried through as raw elements, so a read followed by a write changes only what the
//! passes changed.

mod reader;
mod writer;

pub use reader::read_score;
pub use writer::write_score;
