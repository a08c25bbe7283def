use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use flate2::write::ZlibEncoder;
use flate2::read::ZlibDecoder;
use flate2::Compression;
use thiserror::Error;
use super::{TileCode, TileMap};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Failure while loading or saving tile data.
///
/// A failed load never leaves a partially written level behind.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("table is {rows}x{cols} but the grid is {expected_rows}x{expected_cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    #[error("invalid tile code {value:?} at row {row}, column {col}")]
    Parse { row: usize, col: usize, value: String },
    #[error("level {level} is out of range ({levels} levels)")]
    LevelOutOfRange { level: usize, levels: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// Compressed binary image of every level of a [`TileMap`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TileMapSnapshot {
    pub version: u32,
    pub levels: usize,
    pub rows: usize,
    pub cols: usize,
    pub tiles: Vec<Vec<TileCode>>,
}

// ============================================================================
// Delimited table IO
// ============================================================================

fn parse_table(text: &str) -> Result<Vec<Vec<TileCode>>, MapError> {
    let mut table = Vec::new();
    for (row, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut cells = Vec::new();
        for (col, field) in line.split(',').enumerate() {
            let field = field.trim();
            let value = field.parse::<TileCode>().map_err(|_| MapError::Parse {
                row,
                col,
                value: field.to_string(),
            })?;
            cells.push(value);
        }
        table.push(cells);
    }
    Ok(table)
}

impl TileMap {
    fn check_level(&self, level: usize) -> Result<(), MapError> {
        if level >= self.levels() {
            return Err(MapError::LevelOutOfRange { level, levels: self.levels() });
        }
        Ok(())
    }

    /// Load a comma-delimited table into `level`.
    ///
    /// The table must have exactly `rows` lines of `cols` integers each.
    /// Row 0 of the table becomes storage row 0 (the top of the level).
    pub fn load_csv_str(&mut self, text: &str, level: usize) -> Result<(), MapError> {
        self.check_level(level)?;
        let table = parse_table(text)?;

        let rows = table.len();
        let ragged = table.iter().find(|r| r.len() != self.cols());
        let cols = ragged.map_or_else(|| table.first().map_or(0, |r| r.len()), |r| r.len());
        if rows != self.rows() || cols != self.cols() {
            return Err(MapError::DimensionMismatch {
                expected_rows: self.rows(),
                expected_cols: self.cols(),
                rows,
                cols,
            });
        }

        let flat: Vec<TileCode> = table.into_iter().flatten().collect();
        if let Some(tiles) = self.level_tiles_mut(level) {
            *tiles = flat;
        }
        Ok(())
    }

    pub fn load_csv(&mut self, path: impl AsRef<Path>, level: usize) -> Result<(), MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        self.load_csv_str(&text, level)?;
        info!("[TILE_MAP] Loaded level {} from {}", level, path.display());
        Ok(())
    }

    /// Render `level` as a comma-delimited table in storage order.
    pub fn to_csv_string(&self, level: usize) -> Result<String, MapError> {
        self.check_level(level)?;
        let mut out = String::new();
        if let Some(tiles) = self.level_tiles(level) {
            for row in tiles.chunks(self.cols().max(1)) {
                let line: Vec<String> = row.iter().map(|code| code.to_string()).collect();
                out.push_str(&line.join(","));
                out.push('\n');
            }
        }
        Ok(out)
    }

    pub fn save_csv(&self, path: impl AsRef<Path>, level: usize) -> Result<(), MapError> {
        let text = self.to_csv_string(level)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    // ========================================================================
    // Binary snapshots
    // ========================================================================

    pub fn snapshot(&self) -> TileMapSnapshot {
        TileMapSnapshot {
            version: SNAPSHOT_VERSION,
            levels: self.levels(),
            rows: self.rows(),
            cols: self.cols(),
            tiles: (0..self.levels())
                .filter_map(|level| self.level_tiles(level).map(|t| t.to_vec()))
                .collect(),
        }
    }

    /// Replace every level with the snapshot contents. The snapshot must
    /// have been taken from a grid of identical dimensions.
    pub fn restore(&mut self, snapshot: TileMapSnapshot) -> Result<(), MapError> {
        let well_formed = snapshot.tiles.len() == snapshot.levels
            && snapshot.tiles.iter().all(|t| t.len() == snapshot.rows * snapshot.cols);
        if snapshot.levels != self.levels()
            || snapshot.rows != self.rows()
            || snapshot.cols != self.cols()
            || !well_formed
        {
            return Err(MapError::DimensionMismatch {
                expected_rows: self.rows(),
                expected_cols: self.cols(),
                rows: snapshot.rows,
                cols: snapshot.cols,
            });
        }

        for (level, tiles) in snapshot.tiles.into_iter().enumerate() {
            if let Some(dst) = self.level_tiles_mut(level) {
                *dst = tiles;
            }
        }
        Ok(())
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let mut encoder = ZlibEncoder::new(writer, Compression::default());
        bincode::serialize_into(&mut encoder, &self.snapshot())?;
        encoder.finish()?;
        Ok(())
    }

    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut decoder = ZlibDecoder::new(reader);
        let snapshot: TileMapSnapshot = bincode::deserialize_from(&mut decoder)?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!("[TILE_MAP] Snapshot version {} differs from {}", snapshot.version, SNAPSHOT_VERSION);
        }
        self.restore(snapshot)
    }
}
