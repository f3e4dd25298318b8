use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use anyhow::{Result, Context};
use log::{warn, debug};

use crate::errors::MovetextError;

// @module: PGN archive parsing and game record assembly

// @const: Bracketed tag line `[Key "Value"]`, tolerant of extra whitespace
static TAG_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[([^\s"\]]+)\s+"(.*)"\s*\]$"#).unwrap()
});

/// Column names of the tabular output, in export order. The first 22 are
/// metadata tags; the last slot is the movetext before decoding.
pub const TAG_FIELDS: [&str; 23] = [
    "Event", "Site", "Date", "Round", "White", "Black", "Result",
    "Tournament", "CurrentPosition", "Timezone", "ECO", "ECOURL",
    "UTCDate", "UTCTime", "WhiteELO", "BlackELO", "TimeControl",
    "Termination", "StartTime", "EndDate", "EndTime", "Link", "Moves",
];

// @const: Line prefix that opens a new game block
const EVENT_TAG_MARKER: &str = "[Event";

// @const: Position where a missing Tournament tag is backfilled
const TOURNAMENT_INDEX: usize = 7;

// @const: Position of the movetext line in a fully tagged block
const MOVETEXT_INDEX: usize = 22;

// Normalized blocks shorter than this cannot cover the tag set.
const MIN_BLOCK_LINES: usize = 22;

// Length seen when a stray annotation line survives normalization; such
// blocks no longer map positionally onto the tag set.
const MISALIGNED_BLOCK_LINES: usize = 25;

// Sentinel appended to the side whose last move got no reply.
const GAME_OVER_TOKEN: &str = "over";

const TERMINATION_MARKERS: [&str; 3] = ["1-0", "0-1", "1/2-1/2"];

/// Movetext encoding conventions observed in chess.com exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDialect {
    /// Daily games: tokens arrive in fixed (number, white, black) triples.
    LetsPlay,
    /// Live games: numbered markers with clock annotations in braces.
    LiveChess,
}

impl MoveDialect {
    /// Select the dialect from a record's Event tag value.
    pub fn from_event(event: &str) -> Self {
        if event == "Let's Play!" {
            MoveDialect::LetsPlay
        } else {
            MoveDialect::LiveChess
        }
    }
}

/// Whether a record's movetext was fully decoded or carried through raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovetextOutcome {
    /// Both move lists are populated and length-aligned.
    Decoded,
    /// Decoding bailed out; move lists hold whatever was accumulated and
    /// the raw movetext stays attached to the record.
    RawPassthrough,
}

// @struct: One game flattened to tag values plus per-side move lists
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    // @field: Metadata values, positionally aligned with TAG_FIELDS
    pub tag_values: Vec<String>,

    // @field: White's moves in order
    pub white_moves: Vec<String>,

    // @field: Black's moves in order
    pub black_moves: Vec<String>,

    // @field: Raw movetext, retained only when decoding bailed out
    pub raw_movetext: Option<String>,

    // @field: How move decoding ended
    pub outcome: MovetextOutcome,
}

impl GameRecord {
    /// Creates a record with empty move lists, awaiting movetext decoding
    pub fn new(tag_values: Vec<String>) -> Self {
        GameRecord {
            tag_values,
            white_moves: Vec::new(),
            black_moves: Vec::new(),
            raw_movetext: None,
            outcome: MovetextOutcome::RawPassthrough,
        }
    }

    /// Look up a tag value by its column name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        TAG_FIELDS
            .iter()
            .position(|field| *field == name)
            .and_then(|idx| self.tag_values.get(idx))
            .map(|value| value.as_str())
    }

    /// The Event tag value, empty if the block was truncated before it.
    pub fn event(&self) -> &str {
        self.tag("Event").unwrap_or_default()
    }

    /// Movetext dialect this record was decoded with.
    pub fn dialect(&self) -> MoveDialect {
        MoveDialect::from_event(self.event())
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} vs {} ({})",
            self.tag("White").unwrap_or("?"),
            self.tag("Black").unwrap_or("?"),
            self.tag("Result").unwrap_or("*"),
        )
    }
}

/// All games parsed out of one concatenated archive.
#[derive(Debug)]
pub struct GameCollection {
    /// Archive the games came from
    pub source: PathBuf,

    /// Retained game records
    pub records: Vec<GameRecord>,

    /// Blocks dropped by the structural filter
    pub dropped_blocks: usize,
}

impl GameCollection {
    /// Create an empty collection for a source
    pub fn new(source: PathBuf) -> Self {
        GameCollection {
            source,
            records: Vec::new(),
            dropped_blocks: 0,
        }
    }

    /// Parse a concatenated PGN archive file into game records.
    pub fn parse_archive_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read archive file: {:?}", path))?;
        Ok(Self::parse_archive_string(path.to_path_buf(), &content))
    }

    /// Parse concatenated PGN text into game records.
    ///
    /// This never fails: malformed blocks are dropped (and counted) and a
    /// record whose movetext cannot be decoded is kept with its raw
    /// movetext attached instead of aborting the batch.
    pub fn parse_archive_string(source: PathBuf, content: &str) -> Self {
        let lines: Vec<&str> = content.lines().collect();
        let edges = edge_points(&lines);
        let blocks = group_games(&lines, &edges);
        let grouped = blocks.len();

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for block in blocks {
            let normalized = normalize_block(&block);
            if !block_is_well_formed(&normalized) {
                debug!("Dropping block of {} normalized lines", normalized.len());
                dropped += 1;
                continue;
            }
            records.push(assemble_record(normalized));
        }

        if dropped > 0 {
            warn!(
                "Dropped {} of {} game blocks that could not be mapped onto the tag set",
                dropped, grouped
            );
        }

        GameCollection {
            source,
            records,
            dropped_blocks: dropped,
        }
    }
}

impl fmt::Display for GameCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Game Collection")?;
        writeln!(f, "Source: {:?}", self.source)?;
        writeln!(f, "Records: {}", self.records.len())?;
        writeln!(f, "Dropped blocks: {}", self.dropped_blocks)?;
        Ok(())
    }
}

/// Find the (start, end) line index pair of every game block.
///
/// A line starting with `[Event` opens a block and closes the previous one
/// at the preceding index; the final line of input always closes the last
/// open block whatever its content. Lines before the first marker belong
/// to no block.
pub fn edge_points(lines: &[&str]) -> Vec<(usize, usize)> {
    let mut starts = Vec::new();
    let mut ends = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if line.starts_with(EVENT_TAG_MARKER) {
            // A marker with no open block before it (the very first line,
            // or one preceded only by stray text) has nothing to close.
            if !starts.is_empty() {
                ends.push(idx - 1);
            }
            starts.push(idx);
        }
        if idx == lines.len() - 1 && ends.len() < starts.len() {
            ends.push(idx);
        }
    }

    starts.into_iter().zip(ends).collect()
}

/// Slice the line sequence into per-game blocks, collapsing duplicates.
fn group_games(lines: &[&str], edges: &[(usize, usize)]) -> Vec<Vec<String>> {
    let mut blocks: Vec<Vec<String>> = Vec::new();
    for &(start, end) in edges {
        let block: Vec<String> = lines[start..=end]
            .iter()
            .map(|line| (*line).to_string())
            .collect();
        // Re-downloaded months produce byte-identical blocks; keep one.
        if !blocks.contains(&block) {
            blocks.push(block);
        }
    }
    blocks
}

/// Reduce a raw block to its ordered field values.
///
/// Tag lines yield their quoted value; the movetext line (or any line that
/// is not a tag) is carried through unchanged. Lines that are empty after
/// trimming, and tags whose value normalizes to nothing, are removed. A
/// block with tag lines but no Tournament tag gets the `-` placeholder
/// inserted at its fixed position so positional mapping stays aligned.
pub fn normalize_block(lines: &[String]) -> Vec<String> {
    let mut values = Vec::new();
    let mut saw_tag = false;
    let mut saw_tournament = false;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_tag_line(trimmed) {
            Some((key, value)) => {
                saw_tag = true;
                if key == "Tournament" {
                    saw_tournament = true;
                }
                if value.is_empty() {
                    debug!("Skipping empty {} tag", key);
                    continue;
                }
                values.push(value);
            }
            // Not a tag line: movetext, or a malformed tag left as-is.
            None => values.push(trimmed.to_string()),
        }
    }

    if saw_tag && !saw_tournament && values.len() >= TOURNAMENT_INDEX {
        values.insert(TOURNAMENT_INDEX, "-".to_string());
    }

    values
}

/// Extract the key and quoted value from a `[Key "Value"]` tag line.
fn parse_tag_line(line: &str) -> Option<(String, String)> {
    TAG_LINE_REGEX.captures(line).map(|caps| {
        (
            caps.get(1).map_or(String::new(), |m| m.as_str().to_string()),
            caps.get(2).map_or(String::new(), |m| m.as_str().to_string()),
        )
    })
}

/// Structural filter: can this normalized block map onto the tag set?
pub fn block_is_well_formed(values: &[String]) -> bool {
    values.len() != MISALIGNED_BLOCK_LINES && values.len() >= MIN_BLOCK_LINES
}

/// Zip a normalized block with the fixed field names and decode its
/// movetext. Trailing fields stay unset when the block is short; lines
/// beyond the movetext slot are ignored.
fn assemble_record(mut values: Vec<String>) -> GameRecord {
    let movetext = values.get(MOVETEXT_INDEX).cloned();
    values.truncate(MOVETEXT_INDEX);

    let mut record = GameRecord::new(values);
    let dialect = record.dialect();

    let Some(movetext) = movetext else {
        warn!("Game {} has no movetext line, passing through raw", record);
        return record;
    };

    let decoded = match dialect {
        MoveDialect::LetsPlay => {
            decode_lets_play(&movetext, &mut record.white_moves, &mut record.black_moves);
            Ok(())
        }
        MoveDialect::LiveChess => {
            decode_live_chess(&movetext, &mut record.white_moves, &mut record.black_moves)
        }
    };

    match decoded {
        Ok(()) => {
            align_move_lists(&mut record.white_moves, &mut record.black_moves);
            record.outcome = MovetextOutcome::Decoded;
        }
        Err(e) => {
            warn!("Movetext decode bailed out for {}: {}", record, e);
            record.raw_movetext = Some(movetext);
            record.outcome = MovetextOutcome::RawPassthrough;
        }
    }

    record
}

/// Decode the positional "Let's Play!" dialect.
///
/// Tokens arrive in (move-number, white, black) triples by raw index: an
/// index divisible by three anchors a triple, the token two past the
/// anchor is white's move, every other token is black's. Termination
/// markers never land in a list and never move the anchor.
fn decode_lets_play(movetext: &str, white: &mut Vec<String>, black: &mut Vec<String>) {
    let mut anchor = 0usize;
    for (idx, token) in movetext.split(' ').enumerate() {
        if is_termination(token) {
            continue;
        }
        if idx % 3 == 0 {
            anchor = idx;
        } else if idx == anchor + 2 {
            white.push(token.to_string());
        } else {
            black.push(token.to_string());
        }
    }
}

// States of the annotated-movetext decoder: no side is active until the
// first move-number marker is seen.
#[derive(Debug, Clone, Copy)]
enum DecodeState {
    AwaitingMarker,
    White,
    Black,
}

/// Decode the annotated "Live Chess" dialect.
///
/// Brace-bearing tokens are clock/comment fragments and are skipped. A
/// `.`-bearing token is a move-number marker: `12.` hands the turn to
/// white, `12...` to black, and a move fused to the marker (`12.Nf3`)
/// belongs to that side. A bare move token plays for whichever side holds
/// the turn and passes it on; in fully-marked movetext every move carries
/// its own marker, so the two conventions agree. A move before any
/// marker, or a marker whose numeric prefix does not parse, bails the
/// decode out.
fn decode_live_chess(
    movetext: &str,
    white: &mut Vec<String>,
    black: &mut Vec<String>,
) -> Result<(), MovetextError> {
    let mut state = DecodeState::AwaitingMarker;
    let mut move_number = 0u32;

    for token in movetext.split(' ') {
        if token.contains('{') || token.contains('}') {
            continue;
        }
        match token.find('.') {
            Some(first_dot) => {
                move_number = token[..first_dot]
                    .parse()
                    .map_err(|_| MovetextError::BadMarker(token.to_string()))?;
                state = if token.contains("...") {
                    DecodeState::Black
                } else {
                    DecodeState::White
                };
                // rfind is safe here, the token has at least one dot
                let fused_move = &token[token.rfind('.').unwrap_or(first_dot) + 1..];
                if !fused_move.is_empty() && !is_termination(fused_move) {
                    state = push_move(state, fused_move, white, black)?;
                }
            }
            None => {
                if !is_termination(token) {
                    state = push_move(state, token, white, black)?;
                }
            }
        }
    }

    debug!(
        "Decoded {} white / {} black plies over {} numbered moves",
        white.len(),
        black.len(),
        move_number
    );
    Ok(())
}

/// Append a move to the side holding the turn and pass the turn on.
fn push_move(
    state: DecodeState,
    token: &str,
    white: &mut Vec<String>,
    black: &mut Vec<String>,
) -> Result<DecodeState, MovetextError> {
    match state {
        DecodeState::AwaitingMarker => Err(MovetextError::UnanchoredMove(token.to_string())),
        DecodeState::White => {
            white.push(token.to_string());
            Ok(DecodeState::Black)
        }
        DecodeState::Black => {
            black.push(token.to_string());
            Ok(DecodeState::White)
        }
    }
}

/// Pad the side whose final move got no reply so both lists export with
/// equal length.
fn align_move_lists(white: &mut Vec<String>, black: &mut Vec<String>) {
    if black.len() > white.len() {
        white.push(GAME_OVER_TOKEN.to_string());
    }
    if black.len() < white.len() {
        black.push(GAME_OVER_TOKEN.to_string());
    }
}

fn is_termination(token: &str) -> bool {
    TERMINATION_MARKERS.contains(&token)
}
