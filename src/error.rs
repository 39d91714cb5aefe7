//! # Error Types
//!
//! This module defines all error types for the easyscore library.
//!
//! Reader errors carry the element path or value that failed so the user can find the
//! problem in the source document. Transform errors name the configuration that was rejected.
//!
//! ## Error Types
//! - `Xml` - The input is not well-formed XML
//! - `UnsupportedDocument` - Well-formed XML that is not a `score-partwise` document
//! - `MissingElement` / `InvalidValue` - MusicXML content the reader cannot map to the model
//! - `UnknownInstrument` - An instrument id that has no profile
//! - `Options` - Invalid options (bad YAML, unknown key name)
//! - `Structure` - The post-transform structural check failed
//! - `Io` - File access from the command line
//!
//! ## Usage
//! ```rust
//! use easyscore::{read_score, ScoreError};
//!
//! match read_score("<score-timewise/>") {
//!     Ok(_) => unreachable!(),
//!     Err(ScoreError::UnsupportedDocument(root)) => assert_eq!(root, "score-timewise"),
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    /// The input could not be tokenized as XML.
    ///
    /// # Example
    /// ```
    /// # use easyscore::ScoreError;
    /// let err = ScoreError::Xml {
    ///     position: 120,
    ///     message: "unexpected end of file".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "XML error at byte 120: unexpected end of file");
    /// ```
    #[error("XML error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    /// The root element is not `score-partwise`.
    #[error("Unsupported document: root element <{0}> (expected <score-partwise>)")]
    UnsupportedDocument(String),

    /// A required child element is absent.
    ///
    /// # Example
    /// ```
    /// # use easyscore::ScoreError;
    /// let err = ScoreError::MissingElement {
    ///     parent: "pitch".to_string(),
    ///     element: "step".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Missing <step> inside <pitch>");
    /// ```
    #[error("Missing <{element}> inside <{parent}>")]
    MissingElement { parent: String, element: String },

    /// An element holds text the model cannot represent.
    #[error("Invalid value '{value}' in <{element}>")]
    InvalidValue { element: String, value: String },

    /// No instrument profile is registered under this id.
    ///
    /// # Example
    /// ```
    /// # use easyscore::ScoreError;
    /// let err = ScoreError::UnknownInstrument("kazoo".to_string());
    /// assert_eq!(err.to_string(), "Unknown instrument 'kazoo'");
    /// ```
    #[error("Unknown instrument '{0}'")]
    UnknownInstrument(String),

    /// Options file or option value rejected.
    #[error("Invalid options: {0}")]
    Options(String),

    /// The transformed score no longer has the minimal shape a MusicXML document needs.
    #[error("Structural check failed: {0}")]
    Structure(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
