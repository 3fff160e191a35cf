//! # Error Types
//!
//! This module defines all error types for the iReal decoder.
//!
//! Every error names the stage that failed.
//!
//! ## Error Types
//! - `MissingUri` / `InvalidEncoding` - the playlist document itself is unusable
//! - `Segment` - one song segment failed; carries the segment index
//! - `MissingFields` / `MissingMusicMarker` - the `=` field schema is malformed
//! - `Chord` - a standalone chord string does not match the chord grammar
//! - `Options` - transpose options are out of range or unreadable
//!
//! Recoverable problems (an alternate chord that does not re-parse) are not
//! errors: they are dropped and reported through `log::warn!`.
//!
//! ## Usage
//! ```rust
//! use ireal::{decode_playlist, IrealError};
//!
//! match decode_playlist("<html>no chart here</html>") {
//!     Ok(playlist) => println!("{} songs", playlist.songs.len()),
//!     Err(IrealError::MissingUri) => eprintln!("not an iReal document"),
//!     Err(IrealError::Segment { index, source }) => {
//!         eprintln!("song #{} is broken: {}", index, source);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrealError {
    /// No `irealb://` payload was found in the input text.
    ///
    /// # Example
    /// ```
    /// # use ireal::IrealError;
    /// assert_eq!(IrealError::MissingUri.to_string(), "no embedded chart URI found");
    /// ```
    #[error("no embedded chart URI found")]
    MissingUri,

    /// The payload could not be percent-decoded into UTF-8 text.
    #[error("invalid percent-encoding in chart URI: {0}")]
    InvalidEncoding(String),

    /// A song segment failed to decode.
    ///
    /// `index` is the 0-based position of the segment inside the playlist.
    ///
    /// # Example
    /// ```
    /// # use ireal::IrealError;
    /// let err = IrealError::Segment {
    ///     index: 2,
    ///     source: Box::new(IrealError::MissingMusicMarker),
    /// };
    /// assert_eq!(err.to_string(), "song segment 2: music field lacks the 1r34LbKcu7 marker");
    /// ```
    #[error("song segment {index}: {source}")]
    Segment {
        index: usize,
        #[source]
        source: Box<IrealError>,
    },

    /// Fewer `=` separated fields than the song schema requires.
    #[error("expected at least {required} fields, found {found}")]
    MissingFields { found: usize, required: usize },

    /// Field 6 does not carry the fixed music marker.
    #[error("music field lacks the 1r34LbKcu7 marker")]
    MissingMusicMarker,

    /// A chord string does not match the chord grammar.
    #[error("malformed chord '{0}'")]
    Chord(String),

    /// Transpose options are out of range or could not be read.
    #[error("invalid transpose options: {0}")]
    Options(String),
}

impl IrealError {
    /// Wrap an error with the index of the segment it came from.
    pub fn in_segment(self, index: usize) -> Self {
        IrealError::Segment {
            index,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, IrealError>;
