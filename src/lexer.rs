//! # Music Tokenizer
//!
//! Splits a plain (unscrambled) music string into [`Token`]s.
//!
//! The head of the remaining input is tried against an ordered pattern list;
//! the first pattern that matches wins, regardless of match length:
//!
//! 1. section marker `*x`
//! 2. time signature `Tnn`
//! 3. repeat bracket `Nx`
//! 4. comment `<...>`
//! 5. blank root with an alternate chord ` (...)`
//! 6. chord (see [`crate::chord`])
//! 7. residual aliases `LZ`, `XyQ`, `Kcl`
//!
//! Anything else is consumed one character at a time and classified by that
//! character. Commas are separators and produce no token; a `<` that never
//! closes becomes a literal.

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::model::{BarLine, SENTINEL_NOTES};

/// Raw captures of one chord token, before [`crate::chord`] interprets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordMatch {
    /// Root note, `" "` for an empty root.
    pub note: String,
    pub modifiers: String,
    /// Inline comment, including its `*` delimiters.
    pub comment: Option<String>,
    /// Bass note, including the leading `/`.
    pub over: Option<String>,
    /// Alternate chord, including its parentheses.
    pub alternate: Option<String>,
}

impl ChordMatch {
    pub(crate) fn from_captures(caps: &Captures<'_>) -> Self {
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Self {
            note: group(1).unwrap_or_else(|| " ".to_string()),
            modifiers: group(2).unwrap_or_default(),
            comment: group(3),
            over: group(4),
            alternate: group(5),
        }
    }
}

/// Token categories of the music grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Chord(ChordMatch),
    /// Section, time signature, repeat bracket, coda, segno, end, fermata, small/normal.
    Annotation(String),
    BarOpen(BarLine),
    BarClose(BarLine),
    /// Comment text without its `<` `>` delimiters.
    Comment(String),
    /// `Y`: one vertical spacer unit.
    Spacer,
    /// `x`, `r`, `p`, `n` or `W` on their own.
    Sentinel(char),
    /// `,`
    Separator,
    /// Any other text; occupies a cell without a chord.
    Literal(String),
}

impl Token {
    /// Classify a plain text token by its first character.
    pub fn classify(text: &str) -> Token {
        let Some(head) = text.chars().next() else {
            return Token::Literal(String::new());
        };
        match head {
            ',' => Token::Separator,
            'S' | 'T' | 'Q' | 'N' | 'U' | 's' | 'l' | 'f' | '*' => {
                Token::Annotation(text.to_string())
            }
            'Y' => Token::Spacer,
            c if SENTINEL_NOTES.contains(&c) => Token::Sentinel(c),
            '<' if text.len() > 1 && text.ends_with('>') => {
                Token::Comment(strip_delimiters(text).to_string())
            }
            c => match BarLine::from_symbol(c) {
                Some(bar) if bar.is_open() => Token::BarOpen(bar),
                Some(bar) => Token::BarClose(bar),
                None => Token::Literal(text.to_string()),
            },
        }
    }
}

fn strip_delimiters(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Section,
    TimeSignature,
    Ending,
    Comment,
    BlankAlternate,
    Chord,
    Residual,
}

/// The chord grammar: root, modifiers, inline `*comment*`, `/bass`, `(alternate)`.
pub static CHORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ A-GW][b#]?)((?:sus|alt|add|[+\-^\dhob#])*)(\*.+?\*)*(/[A-G][#b]?)?(\(.*?\))?")
        .expect("chord pattern is valid")
});

static PATTERNS: Lazy<Vec<(Pattern, Regex)>> = Lazy::new(|| {
    let build = |pattern: Pattern, source: &str| {
        (pattern, Regex::new(source).expect("token pattern is valid"))
    };
    vec![
        build(Pattern::Section, r"^\*[a-zA-Z]"),
        build(Pattern::TimeSignature, r"^T\d\d"),
        build(Pattern::Ending, r"^N."),
        build(Pattern::Comment, r"^<.*?>"),
        build(Pattern::BlankAlternate, r"^ (\(.*?\))"),
        (Pattern::Chord, CHORD_REGEX.clone()),
        build(Pattern::Residual, r"^(?:LZ|XyQ|Kcl)"),
    ]
});

/// Expansion of an alias that survived unscrambling.
fn residual_tokens(alias: &str) -> Vec<Token> {
    let parts: &[&str] = match alias {
        "LZ" => &[" ", "|"],
        "XyQ" => &[" ", " ", " "],
        _ => &["|", "x", " "],
    };
    parts.iter().map(|part| Token::classify(part)).collect()
}

/// Try the ordered patterns against the head of `rest`.
/// Returns the produced tokens and the number of bytes consumed.
fn match_head(rest: &str) -> Option<(Vec<Token>, usize)> {
    for (pattern, regex) in PATTERNS.iter() {
        let Some(caps) = regex.captures(rest) else {
            continue;
        };
        let whole = caps.get(0)?;
        let text = whole.as_str();
        let tokens = match pattern {
            Pattern::Section | Pattern::TimeSignature | Pattern::Ending => {
                vec![Token::Annotation(text.to_string())]
            }
            Pattern::Comment => vec![Token::Comment(strip_delimiters(text).to_string())],
            Pattern::BlankAlternate => vec![Token::Chord(ChordMatch {
                note: " ".to_string(),
                alternate: caps.get(1).map(|m| m.as_str().to_string()),
                ..Default::default()
            })],
            Pattern::Chord => vec![Token::Chord(ChordMatch::from_captures(&caps))],
            Pattern::Residual => residual_tokens(text),
        };
        return Some((tokens, whole.end()));
    }
    None
}

/// Tokenize a plain music string.
pub fn tokenize(music: &str) -> Vec<Token> {
    let music = music.trim_end();
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < music.len() {
        let rest = &music[position..];
        if let Some((matched, len)) = match_head(rest) {
            tokens.extend(matched);
            position += len;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        if c != ',' {
            tokens.push(Token::classify(&rest[..c.len_utf8()]));
        }
        position += c.len_utf8();
    }

    debug!("tokenized {} bytes into {} tokens", music.len(), tokens.len());
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(note: &str, modifiers: &str) -> Token {
        Token::Chord(ChordMatch {
            note: note.to_string(),
            modifiers: modifiers.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_simple_bar() {
        let tokens = tokenize("[C^7 A-7 |");
        assert_eq!(
            tokens,
            vec![
                Token::BarOpen(BarLine::OpenDouble),
                chord("C", "^7"),
                chord(" ", ""),
                chord("A", "-7"),
                chord(" ", ""),
                Token::BarOpen(BarLine::OpenSingle),
            ]
        );
    }

    #[test]
    fn test_annotations_come_before_chords() {
        let tokens = tokenize("*AT44N1C");
        assert_eq!(
            tokens,
            vec![
                Token::Annotation("*A".to_string()),
                Token::Annotation("T44".to_string()),
                Token::Annotation("N1".to_string()),
                chord("C", ""),
            ]
        );
    }

    #[test]
    fn test_commas_are_dropped() {
        let tokens = tokenize("C,D");
        assert_eq!(tokens, vec![chord("C", ""), chord("D", "")]);
    }

    #[test]
    fn test_comment() {
        let tokens = tokenize("<D.C. al Coda>C");
        assert_eq!(
            tokens,
            vec![Token::Comment("D.C. al Coda".to_string()), chord("C", "")]
        );
    }

    #[test]
    fn test_unterminated_comment_is_literal() {
        let tokens = tokenize("C <Fine");
        assert_eq!(
            tokens,
            vec![
                chord("C", ""),
                chord(" ", ""),
                Token::Literal("<".to_string()),
                Token::Chord(ChordMatch {
                    note: "F".to_string(),
                    ..Default::default()
                }),
                Token::Literal("i".to_string()),
                Token::Sentinel('n'),
                Token::Literal("e".to_string()),
            ]
        );
    }

    #[test]
    fn test_full_chord_captures() {
        let tokens = tokenize("Bb-7*add9*/Ab(E7)");
        assert_eq!(
            tokens,
            vec![Token::Chord(ChordMatch {
                note: "Bb".to_string(),
                modifiers: "-7".to_string(),
                comment: Some("*add9*".to_string()),
                over: Some("/Ab".to_string()),
                alternate: Some("(E7)".to_string()),
            })]
        );
    }

    #[test]
    fn test_blank_with_alternate() {
        let tokens = tokenize(" (Db^7)");
        assert_eq!(
            tokens,
            vec![Token::Chord(ChordMatch {
                note: " ".to_string(),
                alternate: Some("(Db^7)".to_string()),
                ..Default::default()
            })]
        );
    }

    #[test]
    fn test_sentinels_spacers_and_closing_bars() {
        let tokens = tokenize("xYr}nZ");
        assert_eq!(
            tokens,
            vec![
                Token::Sentinel('x'),
                Token::Spacer,
                Token::Sentinel('r'),
                Token::BarClose(BarLine::CloseRepeat),
                Token::Sentinel('n'),
                Token::BarClose(BarLine::Final),
            ]
        );
    }

    #[test]
    fn test_residual_aliases() {
        let tokens = tokenize("Kcl");
        assert_eq!(
            tokens,
            vec![
                Token::BarOpen(BarLine::OpenSingle),
                Token::Sentinel('x'),
                Token::Literal(" ".to_string()),
            ]
        );
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let tokens = tokenize("C   ");
        assert_eq!(tokens, vec![chord("C", "")]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Token::classify("Q"), Token::Annotation("Q".to_string()));
        assert_eq!(Token::classify("f"), Token::Annotation("f".to_string()));
        assert_eq!(Token::classify("Y"), Token::Spacer);
        assert_eq!(Token::classify("]"), Token::BarClose(BarLine::CloseDouble));
        assert_eq!(Token::classify("{"), Token::BarOpen(BarLine::OpenRepeat));
        assert_eq!(Token::classify("<hi>"), Token::Comment("hi".to_string()));
        assert_eq!(Token::classify("<"), Token::Literal("<".to_string()));
        assert_eq!(Token::classify(","), Token::Separator);
        assert_eq!(Token::classify("("), Token::Literal("(".to_string()));
    }
}
