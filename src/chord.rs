//! Chord symbol parsing.
//!
//! A chord token is `root [modifiers] [*comment*] [/bass] [(alternate)]`:
//! - root: `A`-`G` or `W` (invisible root) with an optional `b`/`#`, or a
//!   blank `" "` when only an alternate or bass note is given
//! - modifiers: any run of `sus`, `alt`, `add`, `+ - ^ h o b #` and digits
//! - inline comment: merged into the modifiers
//! - bass note: one letter, two when followed by an accidental
//! - alternate: a parenthesized chord, parsed with the same grammar
//!
//! A blank root with neither bass nor alternate is "no chord" and yields `None`.

use log::warn;

use crate::error::{IrealError, Result};
use crate::lexer::{ChordMatch, CHORD_REGEX};
use crate::model::Chord;

/// Build a [`Chord`] from the raw captures of a chord token.
///
/// Returns `None` for an empty cell. An alternate that fails to re-parse is
/// dropped with a warning; the rest of the chord is kept.
pub fn chord_from_match(raw: &ChordMatch) -> Option<Chord> {
    let mut modifiers = raw.modifiers.clone();
    if let Some(comment) = &raw.comment {
        let inner = comment
            .strip_prefix('*')
            .and_then(|c| c.strip_suffix('*'))
            .unwrap_or(comment);
        modifiers.push_str(&inner.replacen("XyQ", "   ", 1));
    }

    let over = raw
        .over
        .as_deref()
        .map(|over| over.strip_prefix('/').unwrap_or(over))
        .filter(|over| !over.is_empty());
    let alternate = raw.alternate.as_deref().and_then(parse_alternate);

    if raw.note == " " && alternate.is_none() && over.is_none() {
        return None;
    }

    let mut chord = Chord::new(&raw.note, &modifiers);
    chord.over = over.map(|over| Box::new(bass_note(over)));
    chord.alternate = alternate.map(Box::new);
    Some(chord)
}

/// Split a bass note into note and trailing modifiers.
fn bass_note(over: &str) -> Chord {
    let mut chars = over.char_indices().skip(1);
    let split = match chars.next() {
        Some((i, c)) if c == '#' || c == 'b' => i + c.len_utf8(),
        Some((i, _)) => i,
        None => over.len(),
    };
    Chord::new(&over[..split], &over[split..])
}

fn parse_alternate(group: &str) -> Option<Chord> {
    let inner = group
        .strip_prefix('(')
        .and_then(|g| g.strip_suffix(')'))
        .unwrap_or(group);
    match CHORD_REGEX.captures(inner) {
        Some(caps) => chord_from_match(&ChordMatch::from_captures(&caps)),
        None => {
            warn!("dropping alternate chord {:?}: not a valid chord", group);
            None
        }
    }
}

/// Parse a standalone chord symbol such as `"Bb-7/Ab(E7)"`.
///
/// The whole string must match the chord grammar. A lone blank parses to `Ok(None)`.
///
/// # Examples
/// ```
/// use ireal::parse_chord;
///
/// let chord = parse_chord("F#h7/C").unwrap().unwrap();
/// assert_eq!(chord.note, "F#");
/// assert_eq!(chord.modifiers, "h7");
/// assert_eq!(chord.over.unwrap().note, "C");
/// ```
///
/// # Errors
/// Returns [`IrealError::Chord`] if the text is not a single chord token.
pub fn parse_chord(text: &str) -> Result<Option<Chord>> {
    let caps = CHORD_REGEX
        .captures(text)
        .ok_or_else(|| IrealError::Chord(text.to_string()))?;
    let whole = caps.get(0).map_or(0, |m| m.end());
    if whole != text.len() {
        return Err(IrealError::Chord(text.to_string()));
    }
    Ok(chord_from_match(&ChordMatch::from_captures(&caps)))
}
