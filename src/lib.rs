//! Decoder, chord-chart parser and transposer for iReal Pro playlists.
//!
//! ```rust
//! use ireal::{parse_chord, parse_song, Song};
//!
//! let song = parse_song(Song::with_music("Blues", "[C7 |F7 |C7 |C7 ]"));
//! assert_eq!(song.cells().len(), 8);
//! assert_eq!(parse_chord("Bb-7/Ab")?.unwrap().to_string(), "Bb-7/Ab");
//! # Ok::<(), ireal::IrealError>(())
//! ```

pub mod api;
pub mod chord;
pub mod cipher;
pub mod error;
pub mod layout;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod playlist;
pub mod text;
pub mod transpose;

pub use api::{decode_playlist, parse_playlist, prepare_song};
pub use chord::parse_chord;
pub use error::{IrealError, Result};
pub use layout::{rows, Row};
pub use model::*;
pub use parser::{parse_music, parse_song};
pub use playlist::SegmentPolicy;
pub use transpose::{transpose, MinorStyle, TransposeOptions};
