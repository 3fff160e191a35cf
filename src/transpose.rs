//! Chord and key transposition.
//!
//! A note is looked up in the flat spelling table first and in the sharp
//! table second; the result is taken from the same table, so a flat chart
//! stays flat and a sharp chart stays sharp. Notes found in neither table
//! (sentinels, the blank root) keep their spelling, but minor rendering still
//! applies to them.

use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{IrealError, Result};
use crate::model::{Cell, Chord, Song, SongBody};

const FLAT_NOTES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];
const SHARP_NOTES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Accepted range of [`TransposeOptions::transpose`].
pub const MIN_TRANSPOSE: i32 = -6;
pub const MAX_TRANSPOSE: i32 = 15;

/// How a minor chord (`-` in its modifiers) is written after transposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinorStyle {
    /// Leave `-` as is: `Bb-7`.
    #[default]
    Minus,
    /// Lowercase root, `-` removed: `bb7`.
    Small,
    /// `-` replaced by `m`: `Bbm7`.
    M,
}

impl FromStr for MinorStyle {
    type Err = IrealError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "minus" => Ok(MinorStyle::Minus),
            "small" => Ok(MinorStyle::Small),
            "m" => Ok(MinorStyle::M),
            other => Err(IrealError::Options(format!(
                "unknown minor style '{}', expected minus, small or m",
                other
            ))),
        }
    }
}

/// Options for [`transpose`].
///
/// Deserializes from YAML with every field optional:
/// ```yaml
/// transpose: 3
/// minor: small
/// useH: true
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransposeOptions {
    /// Semitones to move, between -6 and 15.
    pub transpose: i32,
    pub minor: MinorStyle,
    /// Write `B` as `H`.
    pub use_h: bool,
}

impl TransposeOptions {
    pub fn by(semitones: i32) -> Self {
        Self {
            transpose: semitones,
            ..Default::default()
        }
    }

    /// Parse options from a YAML document and validate them.
    ///
    /// # Errors
    /// Returns [`IrealError::Options`] if the YAML is malformed or the values are out of range.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let options: TransposeOptions =
            serde_yaml::from_str(source).map_err(|e| IrealError::Options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Check that the offset lies within the supported range.
    ///
    /// # Errors
    /// Returns [`IrealError::Options`] for an offset outside `-6..=15`.
    pub fn validate(&self) -> Result<()> {
        if (MIN_TRANSPOSE..=MAX_TRANSPOSE).contains(&self.transpose) {
            Ok(())
        } else {
            Err(IrealError::Options(format!(
                "transpose {} is outside {}..={}",
                self.transpose, MIN_TRANSPOSE, MAX_TRANSPOSE
            )))
        }
    }
}

fn transpose_note(note: &str, semitones: i32) -> Option<&'static str> {
    let shift = |table: &[&'static str; 12]| {
        let index = table.iter().position(|&n| n == note)?;
        let target = (index as i32 + semitones).rem_euclid(12) as usize;
        Some(table[target])
    };
    shift(&FLAT_NOTES).or_else(|| shift(&SHARP_NOTES))
}

fn render_minor(chord: &mut Chord, style: MinorStyle) {
    match style {
        MinorStyle::Minus => {}
        MinorStyle::Small => {
            chord.note = chord
                .note
                .char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect();
            chord.modifiers = chord.modifiers.replacen('-', "", 1);
        }
        MinorStyle::M => chord.modifiers = chord.modifiers.replacen('-', "m", 1),
    }
}

/// Transpose one chord, including its alternate and bass note, by `semitones`.
pub fn transpose_chord(chord: &Chord, semitones: i32, options: &TransposeOptions) -> Chord {
    let note = match transpose_note(&chord.note, semitones) {
        Some("B") if options.use_h => "H",
        Some(moved) => moved,
        None => chord.note.as_str(),
    };
    let mut moved = Chord::new(note, &chord.modifiers);
    if chord.is_minor() {
        render_minor(&mut moved, options.minor);
    }

    Chord {
        over: chord
            .over
            .as_deref()
            .map(|over| Box::new(transpose_chord(over, semitones, options))),
        alternate: chord
            .alternate
            .as_deref()
            .map(|alternate| Box::new(transpose_chord(alternate, semitones, options))),
        ..moved
    }
}

fn transpose_key(key: &str, semitones: i32, options: &TransposeOptions) -> String {
    let chord = match key.strip_suffix('-') {
        Some(root) => Chord::new(root, "-"),
        None => Chord::new(key, ""),
    };
    let moved = transpose_chord(&chord, semitones, options);
    format!("{}{}", moved.note, moved.modifiers)
}

/// Return a transposed copy of `song`.
///
/// The song's own embedded offset is added to `options.transpose`. Only chord
/// notes, modifiers and the key change; the embedded offset is kept. Only
/// parsed cells are transposed; the music string of an unparsed song is left as is.
///
/// # Example
/// ```
/// use ireal::{parse_song, transpose, Song, TransposeOptions};
///
/// let mut song = parse_song(Song::with_music("Blues", "C7 F7"));
/// song.key = "C".to_string();
/// let moved = transpose(&song, &TransposeOptions::by(2));
/// assert_eq!(moved.key, "D");
/// assert_eq!(moved.cells()[0].chord.as_ref().unwrap().note, "D");
/// ```
pub fn transpose(song: &Song, options: &TransposeOptions) -> Song {
    let semitones = options.transpose + song.transpose;
    debug!("transposing '{}' by {} semitone(s)", song.title, semitones);

    let body = match &song.body {
        SongBody::Cells(cells) => SongBody::Cells(
            cells
                .iter()
                .map(|cell| Cell {
                    chord: cell
                        .chord
                        .as_ref()
                        .map(|chord| transpose_chord(chord, semitones, options)),
                    ..cell.clone()
                })
                .collect(),
        ),
        SongBody::Music(music) => SongBody::Music(music.clone()),
    };

    Song {
        key: transpose_key(&song.key, semitones, options),
        body,
        ..song.clone()
    }
}
