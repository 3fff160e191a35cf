//! # Playlist Decoder
//!
//! Finds the `irealb://` URI inside a document, percent-decodes it and splits
//! it into songs.
//!
//! ## Payload layout
//! ```text
//! song === song === ... === playlist name
//! ```
//! With a single song there is no `===` and no playlist name.
//!
//! ## Song fields (separated by `=`)
//! | index | field                                           |
//! |-------|-------------------------------------------------|
//! | 0     | title                                           |
//! | 1     | composer, "Last First" for two-word names       |
//! | 2     | unused                                          |
//! | 3     | style                                           |
//! | 4     | key                                             |
//! | 5     | embedded transpose (default 0)                  |
//! | 6     | `1r34LbKcu7` followed by the ciphered music     |
//! | 7     | extended style                                  |
//! | 8     | tempo in bpm (default 0)                        |
//! | 9     | repeats (default 3)                             |

use log::{debug, warn};
use percent_encoding::percent_decode_str;

use crate::cipher::unscramble;
use crate::error::{IrealError, Result};
use crate::model::{Playlist, SkippedSegment, Song, SongBody};

const URI_SCHEME: &str = "irealb://";
const SONG_SEPARATOR: &str = "===";
const MUSIC_MARKER: &str = "1r34LbKcu7";

/// Fields 0 through 6 must be present.
const REQUIRED_FIELDS: usize = 7;
const DEFAULT_REPEATS: u32 = 3;

/// What to do with a song segment that does not decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentPolicy {
    /// Fail the whole playlist with [`IrealError::Segment`].
    #[default]
    Abort,
    /// Leave the song out and record it in [`Playlist::skipped`].
    Skip,
}

/// Locate the percent-encoded payload following `irealb://`, up to the next `"`.
///
/// # Errors
/// Returns [`IrealError::MissingUri`] if the scheme does not occur in `text`.
pub fn extract_payload(text: &str) -> Result<&str> {
    let start = text.find(URI_SCHEME).ok_or(IrealError::MissingUri)? + URI_SCHEME.len();
    let rest = &text[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    Ok(&rest[..end])
}

/// Swap a two-word composer name stored as "Last First".
fn composer_name(raw: &str) -> String {
    let words: Vec<&str> = raw.split(' ').collect();
    match words.as_slice() {
        [last, first] => format!("{} {}", first, last),
        _ => raw.to_string(),
    }
}

impl Song {
    /// Decode one `=` separated song segment. The music is unscrambled but not parsed.
    ///
    /// # Errors
    /// Returns [`IrealError::MissingFields`] if fewer than seven fields are present and
    /// [`IrealError::MissingMusicMarker`] if field 6 lacks the music marker.
    pub fn from_segment(segment: &str) -> Result<Song> {
        let fields: Vec<&str> = segment.split('=').collect();
        if fields.len() < REQUIRED_FIELDS {
            return Err(IrealError::MissingFields {
                found: fields.len(),
                required: REQUIRED_FIELDS,
            });
        }
        let field = |index: usize| fields.get(index).copied().unwrap_or("");

        // Only the text between the first and second marker is music.
        let ciphered = field(6)
            .split(MUSIC_MARKER)
            .nth(1)
            .ok_or(IrealError::MissingMusicMarker)?;

        Ok(Song {
            title: field(0).to_string(),
            composer: composer_name(field(1)),
            style: field(3).to_string(),
            key: field(4).to_string(),
            transpose: field(5).trim().parse().unwrap_or(0),
            ex_style: field(7).to_string(),
            bpm: field(8).trim().parse().unwrap_or(0),
            repeats: field(9)
                .trim()
                .parse()
                .ok()
                .filter(|&repeats| repeats != 0)
                .unwrap_or(DEFAULT_REPEATS),
            body: SongBody::Music(unscramble(ciphered)),
        })
    }
}

impl Playlist {
    /// Decode a playlist, failing on the first malformed song segment.
    ///
    /// # Errors
    /// See [`Playlist::decode_with`].
    pub fn decode(text: &str) -> Result<Playlist> {
        Self::decode_with(text, SegmentPolicy::Abort)
    }

    /// Decode a playlist with an explicit policy for malformed song segments.
    ///
    /// # Errors
    /// Returns [`IrealError::MissingUri`] when no chart URI is present,
    /// [`IrealError::InvalidEncoding`] when the payload is not UTF-8 after
    /// percent-decoding, and [`IrealError::Segment`] for a malformed song
    /// under [`SegmentPolicy::Abort`].
    pub fn decode_with(text: &str, policy: SegmentPolicy) -> Result<Playlist> {
        Self::decode_songs(text, policy, std::convert::identity)
    }

    /// Decode a playlist, passing every decoded song through `finish`.
    pub(crate) fn decode_songs<F>(text: &str, policy: SegmentPolicy, mut finish: F) -> Result<Playlist>
    where
        F: FnMut(Song) -> Song,
    {
        let payload = extract_payload(text)?;
        let decoded = percent_decode_str(payload)
            .decode_utf8()
            .map_err(|e| IrealError::InvalidEncoding(e.to_string()))?;

        let mut segments: Vec<&str> = decoded.split(SONG_SEPARATOR).collect();
        let name = if segments.len() > 1 {
            segments.pop().map(str::to_string)
        } else {
            None
        };
        debug!("found {} song segment(s), playlist name {:?}", segments.len(), name);

        let mut songs = Vec::with_capacity(segments.len());
        let mut skipped = Vec::new();
        for (index, segment) in segments.into_iter().enumerate() {
            match Song::from_segment(segment).map(&mut finish) {
                Ok(song) => songs.push(song),
                Err(error) => match policy {
                    SegmentPolicy::Abort => return Err(error.in_segment(index)),
                    SegmentPolicy::Skip => {
                        warn!("skipping song segment {}: {}", index, error);
                        skipped.push(SkippedSegment { index, error });
                    }
                },
            }
        }

        Ok(Playlist {
            name,
            songs,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_payload() {
        let html = r#"<a href="irealb://abc%20def">x</a>"#;
        assert_eq!(extract_payload(html).unwrap(), "abc%20def");
    }

    #[test]
    fn test_missing_uri() {
        assert!(matches!(
            extract_payload("<html></html>"),
            Err(IrealError::MissingUri)
        ));
    }

    #[test]
    fn test_composer_order() {
        assert_eq!(composer_name("Ellington Duke"), "Duke Ellington");
        assert_eq!(composer_name("Traditional"), "Traditional");
        assert_eq!(composer_name("Jobim Antonio Carlos"), "Jobim Antonio Carlos");
    }

    #[test]
    fn test_segment_fields() {
        let song = Song::from_segment(
            "Blue Bossa=Dorham Kenny==Bossa Nova=C-=2=1r34LbKcu7[C-7 =Latin-Brazil: Bossa Acoustic=140=4",
        )
        .unwrap();
        assert_eq!(song.title, "Blue Bossa");
        assert_eq!(song.composer, "Kenny Dorham");
        assert_eq!(song.style, "Bossa Nova");
        assert_eq!(song.key, "C-");
        assert_eq!(song.transpose, 2);
        assert_eq!(song.ex_style, "Latin-Brazil: Bossa Acoustic");
        assert_eq!(song.bpm, 140);
        assert_eq!(song.repeats, 4);
        assert_eq!(song.music(), Some("[C-7"));
    }

    #[test]
    fn test_segment_defaults() {
        let song = Song::from_segment("Tune=Someone==Ballad=F=n=1r34LbKcu7F^7").unwrap();
        assert_eq!(song.transpose, 0);
        assert_eq!(song.ex_style, "");
        assert_eq!(song.bpm, 0);
        assert_eq!(song.repeats, 3);

        let song = Song::from_segment("Tune=Someone==Ballad=F=0=1r34LbKcu7F^7==abc=0").unwrap();
        assert_eq!(song.bpm, 0);
        assert_eq!(song.repeats, 3);
    }

    #[test]
    fn test_segment_missing_fields() {
        let err = Song::from_segment("Title=Composer==Style").unwrap_err();
        match err {
            IrealError::MissingFields { found, required } => {
                assert_eq!(found, 4);
                assert_eq!(required, 7);
            }
            _ => panic!("Expected MissingFields"),
        }
    }

    #[test]
    fn test_segment_missing_marker() {
        let err = Song::from_segment("T=C==S=K=0=C7 F7").unwrap_err();
        assert!(matches!(err, IrealError::MissingMusicMarker));
    }

    #[test]
    fn test_music_stops_at_second_marker() {
        let song = Song::from_segment("T=C==S=K=0=1r34LbKcu7C7 1r34LbKcu7F7").unwrap();
        assert_eq!(song.music(), Some("C7 "));

        let song = Song::from_segment("T=C==S=K=0=1r34LbKcu7").unwrap();
        assert_eq!(song.music(), Some(""));
    }

    #[test]
    fn test_single_song_has_no_name() {
        let text = "irealb://Tune%3DSomeone%3D%3DBallad%3DF%3Dn%3D1r34LbKcu7F%5E7";
        let playlist = Playlist::decode(text).unwrap();
        assert_eq!(playlist.name, None);
        assert_eq!(playlist.songs.len(), 1);
        assert_eq!(playlist.songs[0].music(), Some("F^7"));
    }

    #[test]
    fn test_bad_segment_policies() {
        let text = "irealb://A=B==C=D=0=1r34LbKcu7C===broken===E=F==G=H=0=1r34LbKcu7D===My List\"";
        let err = Playlist::decode(text).unwrap_err();
        match err {
            IrealError::Segment { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, IrealError::MissingFields { .. }));
            }
            _ => panic!("Expected Segment error"),
        }

        let playlist = Playlist::decode_with(text, SegmentPolicy::Skip).unwrap();
        assert_eq!(playlist.name.as_deref(), Some("My List"));
        assert_eq!(playlist.songs.len(), 2);
        assert_eq!(playlist.skipped.len(), 1);
        assert_eq!(playlist.skipped[0].index, 1);
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Playlist::decode("irealb://%FF%FE").unwrap_err();
        assert!(matches!(err, IrealError::InvalidEncoding(_)));
    }
}
