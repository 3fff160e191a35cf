//! # Grammar Pass
//!
//! Turns the token stream of [`crate::lexer`] into an ordered sequence of [`Cell`]s.
//!
//! ## State
//! - `current`: the cell being filled; opened lazily by the first token that writes to it
//! - `pending_close`: index of the last cell of the bar region that is still open,
//!   i.e. the cell a closing bar line would attach to
//!
//! ## Transitions
//! - chord, sentinel, literal: fill `current`, then emit it
//! - annotation, comment: append to `current`
//! - spacer: bump `current.spacer`; ends the pending region of an earlier cell
//! - bar open: close the pending region with an implicit single bar (on an
//!   earlier cell or on `current` itself), then open on `current`
//! - bar close: append to the pending cell (or the last emitted cell) and clear the pending region
//!
//! At the end of the stream a region still open is closed with an implicit
//! single bar, and a partially filled `current` is emitted. Every opening bar
//! line therefore has a closing one on the same cell or a later one.

use log::debug;

use crate::chord::chord_from_match;
use crate::lexer::{tokenize, Token};
use crate::model::{BarLine, Cell, Chord, Song, SongBody};

#[derive(Debug, Default)]
struct CellBuilder {
    cells: Vec<Cell>,
    current: Option<Cell>,
    pending_close: Option<usize>,
}

impl CellBuilder {
    fn current(&mut self) -> &mut Cell {
        self.current.get_or_insert_with(Cell::default)
    }

    /// The cell at `index`, which is either emitted already or is `current`.
    fn cell_at(&mut self, index: usize) -> &mut Cell {
        if index < self.cells.len() {
            &mut self.cells[index]
        } else {
            self.current()
        }
    }

    /// Close the pending region, wherever it ends.
    fn close_region(&mut self) {
        if let Some(index) = self.pending_close.take() {
            self.cell_at(index).bars.push(BarLine::CloseSingle);
        }
    }

    /// Close the pending region if it ends on an already emitted cell.
    fn close_earlier_region(&mut self) {
        if let Some(index) = self.pending_close {
            if index < self.cells.len() {
                self.cells[index].bars.push(BarLine::CloseSingle);
                self.pending_close = None;
            }
        }
    }

    fn fill(&mut self, chord: Option<Chord>) {
        if self.pending_close.is_some() {
            self.pending_close = Some(self.cells.len());
        }
        let mut cell = self.current.take().unwrap_or_default();
        cell.chord = chord;
        self.cells.push(cell);
    }

    fn apply(&mut self, token: Token) {
        match token {
            Token::Chord(raw) => self.fill(chord_from_match(&raw)),
            Token::Sentinel(code) => self.fill(Some(Chord::sentinel(code))),
            Token::Literal(_) => self.fill(None),
            Token::Annotation(code) => self.current().annots.push(code),
            Token::Comment(text) => self.current().comments.push(text),
            Token::Spacer => {
                self.current().spacer += 1;
                self.close_earlier_region();
            }
            Token::BarOpen(bar) => {
                self.close_region();
                self.current().bars.push(bar);
                self.pending_close = Some(self.cells.len());
            }
            Token::BarClose(bar) => {
                let target = self
                    .pending_close
                    .take()
                    .unwrap_or_else(|| self.cells.len().saturating_sub(1));
                self.cell_at(target).bars.push(bar);
            }
            Token::Separator => {}
        }
    }

    fn finish(mut self) -> Vec<Cell> {
        self.close_region();
        if let Some(cell) = self.current.take() {
            self.cells.push(cell);
        }
        self.cells
    }
}

/// Run the grammar pass over an already tokenized stream.
pub fn build_cells(tokens: Vec<Token>) -> Vec<Cell> {
    let count = tokens.len();
    let mut builder = CellBuilder::default();
    for token in tokens {
        builder.apply(token);
    }
    let cells = builder.finish();
    debug!("built {} cells from {} tokens", cells.len(), count);
    cells
}

/// Tokenize and parse a plain music string into cells.
pub fn parse_music(music: &str) -> Vec<Cell> {
    build_cells(tokenize(music))
}

/// Parse a song's music into cells. A song that is already parsed is returned unchanged.
///
/// # Example
/// ```
/// use ireal::{parse_song, Song};
///
/// let song = parse_song(Song::with_music("Blues", "{C7 |F7 }"));
/// assert_eq!(song.cells().len(), 4);
/// assert_eq!(song.cells()[0].chord.as_ref().unwrap().note, "C");
/// ```
pub fn parse_song(song: Song) -> Song {
    match song.body {
        SongBody::Music(ref music) => {
            let cells = parse_music(music);
            Song {
                body: SongBody::Cells(cells),
                ..song
            }
        }
        SongBody::Cells(_) => song,
    }
}
