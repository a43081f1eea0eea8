//! `WorldConstraintField`: per-cell terrain constraint rasters.
//!
//! A dense row-major bundle of parallel arrays over `width x height` cells of
//! `cell_size` world meters. Downstream stages (tensor/road tracing, lot
//! validation) sample it by world position; samplers are out-of-bounds safe
//! and return conservative defaults so callers never need a bounds check of
//! their own.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Flood mask value: no flood risk.
pub const FLOOD_NONE: u8 = 0;
/// Flood mask value: seasonal inundation.
pub const FLOOD_SEASONAL: u8 = 1;
/// Flood mask value: permanently wet. Implies no-build.
pub const FLOOD_PERMANENT: u8 = 2;

// ---------------------------------------------------------------------------
// History tags
// ---------------------------------------------------------------------------

/// Historical-use overlays biasing district classification and validation.
///
/// Stored per cell as a bitmask; zero or more tags may apply to one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HistoryTag {
    /// Legacy dumps / industrial remnants.
    Brownfield = 1 << 0,
    /// No-build cultural zones.
    SacredSite = 1 << 1,
    /// Old buried lines and wells.
    UtilityLegacy = 1 << 2,
    /// Hazard remediation zones.
    Contaminated = 1 << 3,
}

impl HistoryTag {
    #[inline]
    pub fn mask(self) -> u8 {
        self as u8
    }
}

/// Whether `mask` carries the given tag bit.
#[inline]
pub fn has_history_tag(mask: u8, tag: HistoryTag) -> bool {
    mask & tag.mask() != 0
}

// ---------------------------------------------------------------------------
// The raster bundle
// ---------------------------------------------------------------------------

/// Rasterized world constraints produced by terrain analysis.
///
/// Invariant: every array holds exactly `width * height` entries (checked by
/// [`WorldConstraintField::is_valid`]). `slope_degrees` is clamped to
/// [0, 89]; `soil_strength` and `nature_score` to [0, 1]; `flood_mask` holds
/// the `FLOOD_*` values; `history_tags` holds [`HistoryTag`] bitmasks;
/// `no_build_mask` is 0/1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct WorldConstraintField {
    pub width: i32,
    pub height: i32,
    pub cell_size: f64,

    pub height_meters: Vec<f32>,
    pub slope_degrees: Vec<f32>,
    pub flood_mask: Vec<u8>,
    pub soil_strength: Vec<f32>,
    pub nature_score: Vec<f32>,
    pub history_tags: Vec<u8>,
    pub no_build_mask: Vec<u8>,
}

impl Default for WorldConstraintField {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            cell_size: 10.0,
            height_meters: Vec::new(),
            slope_degrees: Vec::new(),
            flood_mask: Vec::new(),
            soil_strength: Vec::new(),
            nature_score: Vec::new(),
            history_tags: Vec::new(),
            no_build_mask: Vec::new(),
        }
    }
}

impl WorldConstraintField {
    /// Resize to `w x h` cells of `cell` world meters and reset every raster
    /// to its default: soil strength 1.0, everything else zero. Negative
    /// dimensions clamp to zero.
    pub fn resize(&mut self, w: i32, h: i32, cell: f64) {
        self.width = w.max(0);
        self.height = h.max(0);
        self.cell_size = cell;
        let cells = self.cell_count();
        self.height_meters.clear();
        self.height_meters.resize(cells, 0.0);
        self.slope_degrees.clear();
        self.slope_degrees.resize(cells, 0.0);
        self.flood_mask.clear();
        self.flood_mask.resize(cells, FLOOD_NONE);
        self.soil_strength.clear();
        self.soil_strength.resize(cells, 1.0);
        self.nature_score.clear();
        self.nature_score.resize(cells, 0.0);
        self.history_tags.clear();
        self.history_tags.resize(cells, 0);
        self.no_build_mask.clear();
        self.no_build_mask.resize(cells, 0);
    }

    /// True iff dimensions and cell size are positive and every raster holds
    /// exactly `width * height` entries.
    pub fn is_valid(&self) -> bool {
        if self.width <= 0 || self.height <= 0 || self.cell_size <= 0.0 {
            return false;
        }
        let cells = self.cell_count();
        self.height_meters.len() == cells
            && self.slope_degrees.len() == cells
            && self.flood_mask.len() == cells
            && self.soil_strength.len() == cells
            && self.nature_score.len() == cells
            && self.history_tags.len() == cells
            && self.no_build_mask.len() == cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    #[inline]
    pub fn to_index(&self, gx: i32, gy: i32) -> usize {
        (gy * self.width + gx) as usize
    }

    #[inline]
    pub fn in_bounds(&self, gx: i32, gy: i32) -> bool {
        gx >= 0 && gx < self.width && gy >= 0 && gy < self.height
    }

    /// Map a world position to grid coordinates, or `None` when the position
    /// falls outside the field (or the field is degenerate). Floor-based:
    /// positions in `(-cell_size, 0)` land at index -1 and read as outside,
    /// never in row or column zero.
    pub fn world_to_grid(&self, world: DVec2) -> Option<(i32, i32)> {
        if self.width <= 0 || self.height <= 0 || self.cell_size <= 0.0 {
            return None;
        }
        let gx = (world.x / self.cell_size).floor() as i32;
        let gy = (world.y / self.cell_size).floor() as i32;
        if self.in_bounds(gx, gy) {
            Some((gx, gy))
        } else {
            None
        }
    }

    // -----------------------------------------------------------------------
    // World-space samplers. Out-of-bounds positions return the conservative
    // default for each channel; no-build in particular defaults to true so
    // nothing is ever placed off the field.
    // -----------------------------------------------------------------------

    pub fn sample_height_meters(&self, world: DVec2) -> f32 {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.height_meters[self.to_index(gx, gy)],
            None => 0.0,
        }
    }

    pub fn sample_slope_degrees(&self, world: DVec2) -> f32 {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.slope_degrees[self.to_index(gx, gy)],
            None => 0.0,
        }
    }

    pub fn sample_flood_mask(&self, world: DVec2) -> u8 {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.flood_mask[self.to_index(gx, gy)],
            None => FLOOD_NONE,
        }
    }

    pub fn sample_soil_strength(&self, world: DVec2) -> f32 {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.soil_strength[self.to_index(gx, gy)],
            None => 1.0,
        }
    }

    pub fn sample_nature_score(&self, world: DVec2) -> f32 {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.nature_score[self.to_index(gx, gy)],
            None => 0.0,
        }
    }

    pub fn sample_history_tags(&self, world: DVec2) -> u8 {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.history_tags[self.to_index(gx, gy)],
            None => 0,
        }
    }

    pub fn sample_no_build(&self, world: DVec2) -> bool {
        match self.world_to_grid(world) {
            Some((gx, gy)) => self.no_build_mask[self.to_index(gx, gy)] != 0,
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
