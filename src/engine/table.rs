use serde::Serialize;

use crate::banner::BannerConfig;
use crate::engine::draw::{resolve_normal_draw, DrawResult, TrackMemory};
use crate::engine::lookahead::{lookahead_guaranteed, Lookahead};
use crate::rng::SeedStream;
use crate::types::Track;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCell {
    pub draw: DrawResult,
    /// Guaranteed-segment prediction starting at this cell, for banners that
    /// have a guaranteed variant.
    pub guaranteed: Option<Lookahead>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub row: u32,
    pub a: Option<TableCell>,
    pub b: Option<TableCell>,
}

/// Draw table for one banner: row `n` holds the cells at indices `2n` (track A)
/// and `2n + 1` (track B). Each cell is resolved as if reached by a plain
/// two-seed draw from the cell above it on the same track.
pub fn roll_table(stream: &SeedStream, banner: &BannerConfig, rows: u32) -> Vec<TableRow> {
    let mut memory = TrackMemory::default();
    let mut out = Vec::with_capacity(rows as usize);

    for row in 0..rows {
        let mut cell_for = |track: Track| -> Option<TableCell> {
            let index = row * 2 + if track == Track::A { 0 } else { 1 };
            let draw = resolve_normal_draw(stream, index, banner, &memory);
            if draw.is_exhausted() {
                memory.set(track, None);
                return None;
            }
            let guaranteed = banner.guaranteed.and_then(|g| {
                lookahead_guaranteed(index, banner, stream, &memory, u32::from(g.normal_rolls))
            });
            memory.record(&draw);
            Some(TableCell { draw, guaranteed })
        };
        let a = cell_for(Track::A);
        let b = cell_for(Track::B);
        out.push(TableRow { row, a, b });
    }

    out
}
