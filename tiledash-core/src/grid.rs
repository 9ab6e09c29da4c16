// tiledash-core/src/grid.rs
use crate::position::Position;
use ratatui::layout::Rect;

/// Size of one grid column or row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Fixed size in cells
    Fixed(u16),
    /// Share of the space left after fixed tracks (weight)
    Flex(u16),
}

impl Track {
    /// Read a configured size: positive = fixed, 0 = flex, -n = flex with weight n
    pub fn from_size(size: i32) -> Self {
        match size {
            s if s > 0 => Track::Fixed(s.min(u16::MAX as i32) as u16),
            0 => Track::Flex(1),
            s => Track::Flex(s.unsigned_abs().min(u16::MAX as u32) as u16),
        }
    }
}

/// Split `total` cells into `count` sizes that differ by at most one and
/// sum to `total`. The larger sizes come first. A zero count yields no sizes.
pub fn split_size(total: i32, count: i32) -> Vec<i32> {
    if count <= 0 {
        return Vec::new();
    }

    let total = total.max(0);
    let min = total / count;
    let larger = total % count;

    (0..count)
        .map(|i| if i < larger { min + 1 } else { min })
        .collect()
}

/// Lay `tracks` out over `total` cells. Returns `(offset, length)` per track.
///
/// Fixed tracks are served first in order; flex tracks then share what is
/// left by weight, with rounding leftovers going to the last flex track.
pub fn split_tracks(total: u16, tracks: &[Track]) -> Vec<(u16, u16)> {
    if tracks.is_empty() {
        return vec![];
    }

    let mut lengths = Vec::with_capacity(tracks.len());
    let mut remaining = total;

    // First pass: fixed tracks
    for track in tracks {
        match track {
            Track::Fixed(size) => {
                let allocated = (*size).min(remaining);
                lengths.push(allocated);
                remaining -= allocated;
            }
            Track::Flex(_) => lengths.push(0),
        }
    }

    // Second pass: flex tracks share the rest
    let total_weight: u32 = tracks
        .iter()
        .filter_map(|t| match t {
            Track::Flex(w) => Some(u32::from(*w)),
            Track::Fixed(_) => None,
        })
        .sum();

    if total_weight > 0 && remaining > 0 {
        let mut distributed = 0u16;
        for (i, track) in tracks.iter().enumerate() {
            if let Track::Flex(weight) = track {
                let share = (u32::from(remaining) * u32::from(*weight) / total_weight) as u16;
                lengths[i] = share;
                distributed += share;
            }
        }

        if distributed < remaining
            && let Some(last) = tracks.iter().rposition(|t| matches!(t, Track::Flex(_)))
        {
            lengths[last] += remaining - distributed;
        }
    }

    let mut offset = 0u16;
    lengths
        .into_iter()
        .map(|len| {
            let start = offset;
            offset = offset.saturating_add(len);
            (start, len)
        })
        .collect()
}

/// Column and row tracks panels are placed on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    columns: Vec<Track>,
    rows: Vec<Track>,
}

impl Grid {
    pub fn new(columns: Vec<Track>, rows: Vec<Track>) -> Self {
        Self { columns, rows }
    }

    /// Grid from configured sizes, padded with flexible tracks so every
    /// position fits
    pub fn from_sizes(columns: &[i32], rows: &[i32], positions: &[Position]) -> Self {
        let mut columns: Vec<Track> = columns.iter().copied().map(Track::from_size).collect();
        let mut rows: Vec<Track> = rows.iter().copied().map(Track::from_size).collect();

        let needed_cols = positions.iter().map(Position::right).max().unwrap_or(1) as usize;
        let needed_rows = positions.iter().map(Position::bottom).max().unwrap_or(1) as usize;
        if columns.len() < needed_cols {
            columns.resize(needed_cols, Track::Flex(1));
        }
        if rows.len() < needed_rows {
            rows.resize(needed_rows, Track::Flex(1));
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Track] {
        &self.columns
    }

    pub fn rows(&self) -> &[Track] {
        &self.rows
    }

    /// Screen area covered by `position` inside `area`.
    /// None when the position lies entirely outside the grid.
    pub fn area_for(&self, area: Rect, position: &Position) -> Option<Rect> {
        let cols = split_tracks(area.width, &self.columns);
        let rows = split_tracks(area.height, &self.rows);

        let (x, width) = span(&cols, position.left(), position.right())?;
        let (y, height) = span(&rows, position.top(), position.bottom())?;

        Some(Rect::new(area.x + x, area.y + y, width, height))
    }
}

/// Offset and combined length of tracks `start..end`, clipped to the grid
fn span(tracks: &[(u16, u16)], start: u16, end: u16) -> Option<(u16, u16)> {
    let start = start as usize;
    let end = (end as usize).min(tracks.len());
    if start >= end {
        return None;
    }

    let offset = tracks[start].0;
    let (last_offset, last_len) = tracks[end - 1];
    Some((offset, last_offset + last_len - offset))
}
