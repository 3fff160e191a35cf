//! Plain-text chart rendering.
//!
//! Each row of the layout becomes one line of fixed-width columns. Rows with
//! annotations or comments get a second line above them carrying the labels
//! in the matching columns.

use crate::layout::{rows, Row};
use crate::model::{Cell, Chord, Playlist, Song};

const COLUMN_WIDTH: usize = 7;

/// Render a parsed song as a text chart.
pub fn render_song(song: &Song) -> String {
    let mut out = String::new();

    out.push_str(&song.title);
    out.push('\n');

    let mut details = Vec::new();
    if !song.composer.is_empty() {
        details.push(song.composer.clone());
    }
    if !song.style.is_empty() {
        details.push(song.style.clone());
    }
    if !song.key.is_empty() {
        details.push(format!("key {}", song.key));
    }
    if song.bpm > 0 {
        details.push(format!("{} bpm", song.bpm));
    }
    if !details.is_empty() {
        out.push_str(&details.join(" - "));
        out.push('\n');
    }
    out.push('\n');

    for row in rows(song.cells()) {
        out.push_str(&render_row(&row));
    }
    if let Some(music) = song.music() {
        out.push_str(music);
        out.push('\n');
    }

    out
}

fn render_row(row: &Row<'_>) -> String {
    let mut out = String::new();
    for _ in 0..row.spacer {
        out.push('\n');
    }

    let labels: Vec<String> = row.cells.iter().map(cell_labels).collect();
    if labels.iter().any(|label| !label.is_empty()) {
        out.push_str(&columns(&labels));
        out.push('\n');
    }

    let chords: Vec<String> = row.cells.iter().map(cell_text).collect();
    out.push_str(&columns(&chords));
    out.push('\n');
    out
}

fn columns(texts: &[String]) -> String {
    let line: String = texts
        .iter()
        .map(|text| format!("{:<width$}", text, width = COLUMN_WIDTH))
        .collect();
    line.trim_end().to_string()
}

fn cell_labels(cell: &Cell) -> String {
    let mut parts: Vec<String> = cell.annotations().map(|a| a.label()).collect();
    parts.extend(cell.comment_offsets().map(|(_, text)| format!("<{}>", text)));
    parts.join(" ")
}

fn cell_text(cell: &Cell) -> String {
    let mut text = String::new();
    for bar in cell.bars.iter().filter(|bar| bar.is_open()) {
        text.push(bar.symbol());
    }
    if let Some(chord) = &cell.chord {
        text.push_str(&chord_text(chord));
    }
    for bar in cell.bars.iter().filter(|bar| bar.is_close()) {
        text.push(bar.symbol());
    }
    text
}

/// Chord symbol with the sentinel notes spelled out.
pub fn chord_text(chord: &Chord) -> String {
    match chord.note.as_str() {
        "x" => "%".to_string(),
        "r" => "%%".to_string(),
        "n" => "N.C.".to_string(),
        "p" => "/".to_string(),
        "W" => chord.to_string().trim_start_matches('W').to_string(),
        _ => chord.to_string(),
    }
}

/// One line per song: position, title, composer and key.
pub fn render_index(playlist: &Playlist) -> String {
    let mut out = String::new();
    if let Some(name) = &playlist.name {
        out.push_str(name);
        out.push('\n');
    }
    for (index, song) in playlist.songs.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {} - {} ({})\n",
            index + 1,
            song.title,
            song.composer,
            song.key
        ));
    }
    for skipped in &playlist.skipped {
        out.push_str(&format!("  skipped segment {}: {}\n", skipped.index, skipped.error));
    }
    out
}
