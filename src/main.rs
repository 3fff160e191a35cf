use clap::{Parser, ValueEnum};
use log::info;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use ireal::text::{render_index, render_song};
use ireal::{parse_playlist, transpose, MinorStyle, Playlist, SegmentPolicy, TransposeOptions};

#[derive(Parser, Debug)]
#[command(name = "ireal")]
#[command(version = "0.1.0")]
#[command(about = "Decode, parse and transpose iReal Pro playlists", long_about = None)]
struct Args {
    /// Document containing an irealb:// link (reads from stdin if not specified)
    input: Option<PathBuf>,

    /// Only output song N (1-based)
    #[arg(short, long)]
    song: Option<usize>,

    /// Semitones to transpose by (-6 to 15)
    #[arg(short, long, allow_hyphen_values = true)]
    transpose: Option<i32>,

    /// Minor chord spelling: minus, small or m
    #[arg(long)]
    minor: Option<MinorStyle>,

    /// Write B as H
    #[arg(long)]
    use_h: bool,

    /// YAML file with transpose options; flags override its values
    #[arg(long)]
    options: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Skip malformed songs instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// List the songs of the playlist and exit
    #[arg(short = 'L', long)]
    list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let source = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let policy = if args.skip_invalid {
        SegmentPolicy::Skip
    } else {
        SegmentPolicy::Abort
    };

    if args.list {
        let playlist = Playlist::decode_with(&source, policy)?;
        print!("{}", render_index(&playlist));
        return Ok(());
    }

    let options = transpose_options(&args)?;
    let mut playlist = parse_playlist(&source, policy)?;
    info!(
        "decoded {} song(s), {} skipped",
        playlist.songs.len(),
        playlist.skipped.len()
    );

    if let Some(number) = args.song {
        let count = playlist.songs.len();
        if number == 0 || number > count {
            return Err(format!("song {} out of range, playlist has {} song(s)", number, count).into());
        }
        let song = playlist.songs.swap_remove(number - 1);
        playlist.songs = vec![song];
    }
    playlist.songs = playlist
        .songs
        .iter()
        .map(|song| transpose(song, &options))
        .collect();

    match args.format {
        Format::Text => {
            let charts: Vec<String> = playlist.songs.iter().map(render_song).collect();
            print!("{}", charts.join("\n"));
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&playlist)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(&playlist)?),
    }

    Ok(())
}

fn transpose_options(args: &Args) -> Result<TransposeOptions, Box<dyn std::error::Error>> {
    let mut options = match &args.options {
        Some(path) => TransposeOptions::from_yaml(&fs::read_to_string(path)?)?,
        None => TransposeOptions::default(),
    };
    if let Some(semitones) = args.transpose {
        options.transpose = semitones;
    }
    if let Some(minor) = args.minor {
        options.minor = minor;
    }
    if args.use_h {
        options.use_h = true;
    }
    options.validate()?;
    Ok(options)
}
