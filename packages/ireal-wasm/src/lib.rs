use ireal::{IrealError, Playlist, SegmentPolicy, TransposeOptions};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize, Debug, PartialEq)]
struct DecodeError {
    message: String,
    segment: Option<usize>,
}

fn error_to_decode_error(e: &IrealError) -> DecodeError {
    let segment = match e {
        IrealError::Segment { index, .. } => Some(*index),
        _ => None,
    };
    DecodeError {
        message: e.to_string(),
        segment,
    }
}

fn to_js_error(e: IrealError) -> JsValue {
    let report = error_to_decode_error(&e);
    let json = serde_json::to_string(&report).unwrap_or_else(|_| report.message.clone());
    JsValue::from_str(&json)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn policy(skip_invalid: bool) -> SegmentPolicy {
    if skip_invalid {
        SegmentPolicy::Skip
    } else {
        SegmentPolicy::Abort
    }
}

/// Decode a playlist without parsing the music; returns the playlist as JSON
#[wasm_bindgen]
pub fn decode(text: &str, skip_invalid: bool) -> Result<String, JsValue> {
    let playlist = Playlist::decode_with(text, policy(skip_invalid)).map_err(to_js_error)?;
    to_json(&playlist)
}

/// Decode a playlist and parse every song into cells; returns JSON
#[wasm_bindgen]
pub fn parse(text: &str, skip_invalid: bool) -> Result<String, JsValue> {
    let playlist = ireal::parse_playlist(text, policy(skip_invalid)).map_err(to_js_error)?;
    to_json(&playlist)
}

/// Parse and transpose every song of a playlist.
/// `options` is an object `{ transpose, minor, useH }`; missing fields take their defaults.
#[wasm_bindgen]
pub fn transpose(text: &str, options: JsValue, skip_invalid: bool) -> Result<String, JsValue> {
    let options: TransposeOptions = if options.is_undefined() || options.is_null() {
        TransposeOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    options.validate().map_err(to_js_error)?;

    let mut playlist = ireal::parse_playlist(text, policy(skip_invalid)).map_err(to_js_error)?;
    playlist.songs = playlist
        .songs
        .iter()
        .map(|song| ireal::transpose(song, &options))
        .collect();
    to_json(&playlist)
}

/// Parse a single chord symbol; returns JSON (`null` for an empty chord)
#[wasm_bindgen]
pub fn parse_chord(text: &str) -> Result<String, JsValue> {
    let chord = ireal::parse_chord(text).map_err(to_js_error)?;
    to_json(&chord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_error_report() {
        let err = IrealError::MissingMusicMarker.in_segment(2);
        let report = error_to_decode_error(&err);
        assert_eq!(report.segment, Some(2));
        assert!(report.message.contains("song segment 2"));
        assert!(report.message.contains("1r34LbKcu7"));
    }

    #[test]
    fn test_playlist_error_report() {
        let report = error_to_decode_error(&IrealError::MissingUri);
        assert_eq!(
            report,
            DecodeError {
                message: "no embedded chart URI found".to_string(),
                segment: None,
            }
        );
    }
}
