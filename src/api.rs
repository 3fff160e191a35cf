//! # Public API
//!
//! Entry points that run the decoding pipeline end to end.
//!
//! ## Pipeline
//! 1. [`decode_playlist()`] - find the chart URI, split songs, unscramble music
//! 2. [`crate::parse_song()`] - tokenize and build cells
//! 3. [`crate::transpose()`] - produce a transposed copy
//!
//! [`parse_playlist()`] runs steps 1 and 2 for every song.
//!
//! ## Typical Usage
//!
//! ```rust
//! use ireal::{parse_playlist, transpose, SegmentPolicy, TransposeOptions};
//!
//! let html = r#"<a href="irealb://Tune%3DOne%20Some%3D%3DSwing%3DF%3D0%3D1r34LbKcu7%5BF%5E7%20%7CC7%20%5D">Tune</a>"#;
//! let playlist = parse_playlist(html, SegmentPolicy::Abort)?;
//! let song = &playlist.songs[0];
//! assert_eq!(song.composer, "Some One");
//!
//! let moved = transpose(song, &TransposeOptions::by(2));
//! assert_eq!(moved.key, "G");
//! # Ok::<(), ireal::IrealError>(())
//! ```

use crate::error::Result;
use crate::model::{Playlist, Song};
use crate::parser::parse_song;
use crate::playlist::SegmentPolicy;
use crate::transpose::{transpose, TransposeOptions};

/// Decode the playlist embedded in `text` without parsing the music.
///
/// # Errors
/// Returns [`crate::IrealError`] if no chart URI is found, the payload is not
/// valid UTF-8, or a song segment is malformed.
pub fn decode_playlist(text: &str) -> Result<Playlist> {
    Playlist::decode(text)
}

/// Decode the playlist embedded in `text` and parse every song into cells.
///
/// # Errors
/// Under [`SegmentPolicy::Abort`], returns the first malformed segment
/// wrapped in [`crate::IrealError::Segment`].
pub fn parse_playlist(text: &str, policy: SegmentPolicy) -> Result<Playlist> {
    Playlist::decode_songs(text, policy, parse_song)
}

/// Parse (if needed) and transpose one song.
///
/// # Errors
/// Returns [`crate::IrealError::Options`] for out-of-range options.
pub fn prepare_song(song: Song, options: &TransposeOptions) -> Result<Song> {
    options.validate()?;
    Ok(transpose(&parse_song(song), options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IrealError;

    #[test]
    fn test_stray_comment_bracket_does_not_fail_song() {
        let text = "irealb://A=B==C=D=0=1r34LbKcu7C7===E=F==G=H=0=1r34LbKcu7C <oops===List";
        let playlist = parse_playlist(text, SegmentPolicy::Abort).unwrap();
        assert_eq!(playlist.songs.len(), 2);
        assert!(playlist.skipped.is_empty());

        let cells = playlist.songs[1].cells();
        assert_eq!(cells[0].chord.as_ref().unwrap().note, "C");
        assert!(cells.iter().all(|cell| cell.comments.is_empty()));
    }

    #[test]
    fn test_songs_are_parsed_after_skipping() {
        let text = "irealb://A=B==C=D=0=1r34LbKcu7C7===broken===E=F==G=H=0=1r34LbKcu7D7===List";
        let playlist = parse_playlist(text, SegmentPolicy::Skip).unwrap();
        assert_eq!(playlist.songs.len(), 2);
        assert!(playlist.songs.iter().all(|song| song.is_parsed()));
        assert_eq!(playlist.skipped[0].index, 1);
        assert!(matches!(
            playlist.skipped[0].error,
            IrealError::MissingFields { .. }
        ));
    }

    #[test]
    fn test_decode_leaves_music_unparsed() {
        let playlist = decode_playlist("irealb://A=B==C=D=0=1r34LbKcu7C7").unwrap();
        assert_eq!(playlist.songs[0].music(), Some("C7"));
    }

    #[test]
    fn test_prepare_song() {
        let mut song = Song::with_music("T", "C7");
        song.key = "C".to_string();
        let song = prepare_song(song, &TransposeOptions::by(7)).unwrap();
        assert_eq!(song.key, "G");
        assert_eq!(song.cells()[0].chord.as_ref().unwrap().note, "G");

        let err = prepare_song(Song::with_music("T", "C7"), &TransposeOptions::by(20));
        assert!(matches!(err, Err(IrealError::Options(_))));
    }
}
