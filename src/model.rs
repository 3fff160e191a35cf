//! # Chart Model
//!
//! Value types produced by the decoder and the grammar pass.
//!
//! ## Type Hierarchy
//! ```text
//! Playlist
//!   ├── name: Option<String>
//!   ├── skipped: Vec<SkippedSegment> (lenient decoding only)
//!   └── Vec<Song>
//!         ├── title, composer, style, key, transpose, exStyle, bpm, repeats
//!         └── body: SongBody
//!               ├── Music(String)     (before parsing)
//!               └── Cells(Vec<Cell>)  (after parsing)
//!
//! Cell
//!   ├── chord: Option<Chord>
//!   │     ├── note, modifiers
//!   │     ├── over: Option<Box<Chord>>
//!   │     └── alternate: Option<Box<Chord>>
//!   ├── annots: Vec<String>   (verbatim codes, see Annotation)
//!   ├── comments: Vec<String>
//!   ├── bars: Vec<BarLine>
//!   └── spacer: u32
//! ```
//!
//! ## Cells
//! A chart is laid out on rows of 16 cells. The grammar pass emits a flat
//! sequence; grouping into rows is done by [`crate::layout::rows`].
//!
//! ## Sentinel notes
//! Besides `A`-`G` (with optional `b`/`#`), a chord note may be one of:
//! - `" "` - empty root (only ever seen with an alternate or over chord)
//! - `W` - invisible root
//! - `x` - repeat the previous bar
//! - `r` - repeat the previous two bars
//! - `p` - pause slash
//! - `n` - no chord (N.C.)

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::IrealError;

/// Note codes that stand for something other than a pitch.
pub const SENTINEL_NOTES: [char; 5] = ['x', 'r', 'p', 'n', 'W'];

/// A decoded playlist.
#[derive(Debug, Serialize)]
pub struct Playlist {
    pub name: Option<String>,
    pub songs: Vec<Song>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedSegment>,
}

/// A segment that was left out under [`crate::SegmentPolicy::Skip`].
#[derive(Debug, Serialize)]
pub struct SkippedSegment {
    pub index: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: IrealError,
}

/// One song of a playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub title: String,
    pub composer: String,
    pub style: String,
    /// Key of the chart, e.g. `"Eb"` or `"C-"`. Empty when none was given.
    pub key: String,
    /// Semitone offset embedded in the chart itself.
    pub transpose: i32,
    pub ex_style: String,
    pub bpm: u32,
    pub repeats: u32,
    #[serde(flatten)]
    pub body: SongBody,
}

/// The musical content of a song, before or after parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SongBody {
    /// Unscrambled music string, not parsed yet.
    Music(String),
    /// Parsed cell sequence.
    Cells(Vec<Cell>),
}

impl Default for SongBody {
    fn default() -> Self {
        SongBody::Music(String::new())
    }
}

impl Default for Song {
    fn default() -> Self {
        Self {
            title: String::new(),
            composer: String::new(),
            style: String::new(),
            key: String::new(),
            transpose: 0,
            ex_style: String::new(),
            bpm: 0,
            repeats: 0,
            body: SongBody::default(),
        }
    }
}

impl Song {
    /// Build an unparsed song from a title and a plain (already unscrambled) music string.
    pub fn with_music(title: &str, music: &str) -> Self {
        Self {
            title: title.to_string(),
            body: SongBody::Music(music.to_string()),
            ..Default::default()
        }
    }

    /// The unparsed music string, if this song has not been parsed yet.
    pub fn music(&self) -> Option<&str> {
        match &self.body {
            SongBody::Music(music) => Some(music),
            SongBody::Cells(_) => None,
        }
    }

    /// The parsed cells; empty until the song has been parsed.
    pub fn cells(&self) -> &[Cell] {
        match &self.body {
            SongBody::Cells(cells) => cells,
            SongBody::Music(_) => &[],
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.body, SongBody::Cells(_))
    }
}

/// One rendering unit of a chart row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub chord: Option<Chord>,
    pub annots: Vec<String>,
    pub comments: Vec<String>,
    pub bars: Vec<BarLine>,
    /// Number of vertical spacer units above this cell.
    pub spacer: u32,
}

impl Cell {
    /// Typed view of the annotation codes. Codes that carry no meaning
    /// (a bare `T` or `N`) are skipped.
    pub fn annotations(&self) -> impl Iterator<Item = Annotation> + '_ {
        self.annots.iter().filter_map(|code| Annotation::from_code(code))
    }

    /// Comments paired with their vertical offset.
    ///
    /// A comment written as `*NNtext` is raised by `NN` units; all others have offset 0.
    pub fn comment_offsets(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.comments.iter().map(|comment| {
            let digits = comment.strip_prefix('*').and_then(|rest| {
                let head = rest.get(..2)?;
                let offset = head.parse::<u32>().ok()?;
                Some((offset, &rest[2..]))
            });
            digits.unwrap_or((0, comment.as_str()))
        })
    }
}

/// A chord symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    pub note: String,
    pub modifiers: String,
    pub over: Option<Box<Chord>>,
    pub alternate: Option<Box<Chord>>,
}

impl Chord {
    pub fn new(note: &str, modifiers: &str) -> Self {
        Self {
            note: note.to_string(),
            modifiers: modifiers.to_string(),
            over: None,
            alternate: None,
        }
    }

    /// A chord standing for one of the sentinel codes (`x`, `r`, `p`, `n`, `W`).
    pub fn sentinel(code: char) -> Self {
        Self::new(&code.to_string(), "")
    }

    pub fn with_over(mut self, over: Chord) -> Self {
        self.over = Some(Box::new(over));
        self
    }

    pub fn with_alternate(mut self, alternate: Chord) -> Self {
        self.alternate = Some(Box::new(alternate));
        self
    }

    pub fn is_sentinel(&self) -> bool {
        let mut chars = self.note.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => SENTINEL_NOTES.contains(&c),
            _ => false,
        }
    }

    /// A `-` anywhere in the modifiers marks a minor chord.
    pub fn is_minor(&self) -> bool {
        self.modifiers.contains('-')
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note.trim(), self.modifiers)?;
        if let Some(over) = &self.over {
            write!(f, "/{}", over)?;
        }
        if let Some(alternate) = &self.alternate {
            write!(f, "({})", alternate)?;
        }
        Ok(())
    }
}

/// A bar-edge marker attached to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarLine {
    /// `|`
    OpenSingle,
    /// `[`
    OpenDouble,
    /// `{`
    OpenRepeat,
    /// Right edge of a measure that was never closed explicitly.
    CloseSingle,
    /// `]`
    CloseDouble,
    /// `}`
    CloseRepeat,
    /// `Z`
    Final,
}

impl BarLine {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '|' => Some(BarLine::OpenSingle),
            '[' => Some(BarLine::OpenDouble),
            '{' => Some(BarLine::OpenRepeat),
            ']' => Some(BarLine::CloseDouble),
            '}' => Some(BarLine::CloseRepeat),
            'Z' => Some(BarLine::Final),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BarLine::OpenSingle | BarLine::CloseSingle => '|',
            BarLine::OpenDouble => '[',
            BarLine::OpenRepeat => '{',
            BarLine::CloseDouble => ']',
            BarLine::CloseRepeat => '}',
            BarLine::Final => 'Z',
        }
    }

    pub fn is_open(self) -> bool {
        matches!(
            self,
            BarLine::OpenSingle | BarLine::OpenDouble | BarLine::OpenRepeat
        )
    }

    pub fn is_close(self) -> bool {
        !self.is_open()
    }
}

/// Typed form of an annotation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// `*A`, `*B`, `*i` (intro), `*v` (verse) ...
    Section(char),
    /// `Txy`; `T12` is 12/8.
    TimeSignature { upper: u8, lower: u8 },
    /// `N1`, `N2` ... repeat brackets.
    Ending(char),
    /// `Q`
    Coda,
    /// `S`
    Segno,
    /// `U`
    End,
    /// `f`
    Fermata,
    /// `s`
    Small,
    /// `l`
    Normal,
}

impl Annotation {
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let head = chars.next()?;
        let annotation = match head {
            '*' => Annotation::Section(chars.next()?),
            'N' => Annotation::Ending(chars.next()?),
            'T' => {
                let upper = chars.next()?.to_digit(10)? as u8;
                let lower = chars.next()?.to_digit(10)? as u8;
                match (upper, lower) {
                    (1, 2) => Annotation::TimeSignature { upper: 12, lower: 8 },
                    _ => Annotation::TimeSignature { upper, lower },
                }
            }
            'Q' => Annotation::Coda,
            'S' => Annotation::Segno,
            'U' => Annotation::End,
            'f' => Annotation::Fermata,
            's' => Annotation::Small,
            'l' => Annotation::Normal,
            _ => return None,
        };
        Some(annotation)
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            Annotation::Section('i') => "In".to_string(),
            Annotation::Section(c) => c.to_string(),
            Annotation::TimeSignature { upper, lower } => format!("{}/{}", upper, lower),
            Annotation::Ending(c) => format!("{}.", c),
            Annotation::Coda => "Coda".to_string(),
            Annotation::Segno => "Segno".to_string(),
            Annotation::End => "END".to_string(),
            Annotation::Fermata => "Fermata".to_string(),
            Annotation::Small => "small".to_string(),
            Annotation::Normal => "normal".to_string(),
        }
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_signature_codes() {
        assert_eq!(
            Annotation::from_code("T44"),
            Some(Annotation::TimeSignature { upper: 4, lower: 4 })
        );
        assert_eq!(
            Annotation::from_code("T12"),
            Some(Annotation::TimeSignature { upper: 12, lower: 8 })
        );
        assert_eq!(Annotation::from_code("T"), None);
    }

    #[test]
    fn test_section_labels() {
        assert_eq!(Annotation::from_code("*i").map(|a| a.label()), Some("In".to_string()));
        assert_eq!(Annotation::from_code("*A").map(|a| a.label()), Some("A".to_string()));
        assert_eq!(Annotation::from_code("N2").map(|a| a.label()), Some("2.".to_string()));
    }

    #[test]
    fn test_chord_display() {
        let chord = Chord::new("Bb", "-7")
            .with_over(Chord::new("Ab", ""))
            .with_alternate(Chord::new("E", "7"));
        assert_eq!(chord.to_string(), "Bb-7/Ab(E7)");

        let blank = Chord::new(" ", "").with_alternate(Chord::new("Db", "^7"));
        assert_eq!(blank.to_string(), "(Db^7)");
    }

    #[test]
    fn test_sentinels() {
        assert!(Chord::sentinel('x').is_sentinel());
        assert!(Chord::sentinel('W').is_sentinel());
        assert!(!Chord::new("C", "").is_sentinel());
        assert!(!Chord::new("Bb", "").is_sentinel());
    }

    #[test]
    fn test_minor_marker() {
        assert!(Chord::new("Bb", "-7").is_minor());
        assert!(Chord::new("F", "7b9-5").is_minor());
        assert!(!Chord::new("C", "^7").is_minor());
    }

    #[test]
    fn test_comment_offsets() {
        let cell = Cell {
            comments: vec!["*74Fine".to_string(), "D.C. al Coda".to_string()],
            ..Default::default()
        };
        let offsets: Vec<_> = cell.comment_offsets().collect();
        assert_eq!(offsets, vec![(74, "Fine"), (0, "D.C. al Coda")]);
    }

    #[test]
    fn test_bar_symbols() {
        for c in ['|', '[', '{', ']', '}', 'Z'] {
            let bar = BarLine::from_symbol(c).unwrap();
            assert_eq!(bar.symbol(), c);
        }
        assert!(BarLine::OpenRepeat.is_open());
        assert!(BarLine::CloseSingle.is_close());
        assert_eq!(BarLine::from_symbol('x'), None);
    }
}
