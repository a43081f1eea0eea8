//! Terrain constraint generation: height synthesis, erosion, and the
//! derived per-cell rasters plus site diagnostics.
//!
//! [`generate`] is a pure function of its inputs. Three passes over the
//! grid: synthesize a height field from deterministic ridge/fractal/basin
//! terms, smooth it with a diffusion erosion filter, then derive slope,
//! flood, soil, nature, and history rasters from the eroded field and
//! reduce them to a [`SiteProfile`] with a generation mode.
//!
//! Determinism is the load-bearing property: identical `(input, config)`
//! always produce bit-identical output. All randomness is position-hashed
//! (see [`crate::noise`]) and the erosion pass is double-buffered so cell
//! traversal order can never leak into results.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use model::city_spec::{CitySpec, DistrictHint};
use model::constraint_field::{
    has_history_tag, HistoryTag, WorldConstraintField, FLOOD_NONE, FLOOD_PERMANENT, FLOOD_SEASONAL,
};
use model::site_profile::{GenerationMode, SiteProfile};

use crate::config::{DEFAULT_CELL_SIZE, DEFAULT_TARGET_DENSITY, DEFAULT_WORLD_EXTENT};
use crate::noise::{fractal01, hash01};

// ---------------------------------------------------------------------------
// Input / Config / Output
// ---------------------------------------------------------------------------

/// World definition handed to [`generate`].
///
/// `world_width`/`world_height` are world meters; the grid resolution is
/// derived from them and `cell_size`. The optional spec only contributes
/// district density hints to the policy-friction score.
#[derive(Debug, Clone, Copy)]
pub struct TerrainInput<'a> {
    pub world_width: i32,
    pub world_height: i32,
    pub cell_size: f64,
    pub seed: u32,
    pub city_spec: Option<&'a CitySpec>,
}

impl Default for TerrainInput<'_> {
    fn default() -> Self {
        Self {
            world_width: DEFAULT_WORLD_EXTENT,
            world_height: DEFAULT_WORLD_EXTENT,
            cell_size: DEFAULT_CELL_SIZE,
            seed: 1,
            city_spec: None,
        }
    }
}

/// Tunable thresholds for constraint rasterization and site classification.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct TerrainConfig {
    /// Slope above which a cell is hard no-build, in degrees.
    pub max_buildable_slope_deg: f32,
    /// Average buildable slope above which the site reads as hostile.
    pub hostile_terrain_slope_deg: f32,
    /// Minimum buildable fraction below which the site reads as hostile.
    pub min_buildable_fraction: f32,
    /// No-build boundary density above which geometry reads as awkward.
    pub fragmentation_threshold: f32,
    /// Policy friction above which policy conflicts with physics.
    pub policy_friction_threshold: f32,
    /// Diffusion erosion passes applied to the synthesized height field.
    pub erosion_iterations: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            max_buildable_slope_deg: 24.0,
            hostile_terrain_slope_deg: 32.0,
            min_buildable_fraction: 0.30,
            fragmentation_threshold: 0.40,
            policy_friction_threshold: 0.55,
            erosion_iterations: 3,
        }
    }
}

/// Constraint rasters plus the site profile reduced from them.
#[derive(
    Debug, Clone, PartialEq, Default, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct TerrainOutput {
    pub constraints: WorldConstraintField,
    pub profile: SiteProfile,
}

// ---------------------------------------------------------------------------
// Height synthesis
// ---------------------------------------------------------------------------

/// Peak-to-trough span of the ridge/relief terms, in meters.
const RELIEF_AMPLITUDE_M: f32 = 80.0;
/// Depth of the basin bias toward low-index rows, in meters.
const BASIN_DEPTH_M: f32 = 42.0;

/// Product of two phase-shifted waves; peaks form an irregular ridge lattice.
fn ridge_term(nx: f32, ny: f32, seed_phase: f64) -> f32 {
    let along_x = (f64::from(nx) * TAU * 1.25 + seed_phase).sin().abs();
    let along_y = (f64::from(ny) * TAU * 0.9 - seed_phase * 0.65).cos().abs();
    (along_x * along_y) as f32
}

/// Build the raw height field: ridge and fractal relief lifted by
/// `RELIEF_AMPLITUDE_M`, minus a basin sink toward low `y` rows.
fn synthesize_heights(cells_x: i32, cells_y: i32, seed: u32) -> Vec<f32> {
    let denom_x = (cells_x - 1).max(1) as f32;
    let denom_y = (cells_y - 1).max(1) as f32;
    let seed_phase = f64::from(seed % 10_000) * 0.001;

    let mut heights = vec![0.0_f32; cells_x as usize * cells_y as usize];
    for y in 0..cells_y {
        for x in 0..cells_x {
            let nx = x as f32 / denom_x;
            let ny = y as f32 / denom_y;

            let ridge = ridge_term(nx, ny, seed_phase);
            let relief = fractal01(nx * 64.0, ny * 64.0, seed.wrapping_add(17));
            let basin = (1.0 - ny + 0.25 * (relief - 0.5)).clamp(0.0, 1.0);

            heights[(y * cells_x + x) as usize] =
                (0.58 * ridge + 0.42 * relief) * RELIEF_AMPLITUDE_M - basin * BASIN_DEPTH_M;
        }
    }
    heights
}

// ---------------------------------------------------------------------------
// Erosion
// ---------------------------------------------------------------------------

/// Height lookup with coordinates clamped to the nearest valid cell.
#[inline]
fn sample_clamped(heights: &[f32], cells_x: i32, cells_y: i32, x: i32, y: i32) -> f32 {
    let cx = x.clamp(0, cells_x - 1);
    let cy = y.clamp(0, cells_y - 1);
    heights[(cy * cells_x + cx) as usize]
}

/// 4-neighbor diffusion smoothing, `iterations` sequential passes.
///
/// Each pass blends every cell toward its neighbor average by a seed- and
/// pass-dependent factor in [0.14, 0.22]. Passes are double-buffered; an
/// in-place update would make the result depend on traversal order.
fn erode(heights: &mut Vec<f32>, cells_x: i32, cells_y: i32, iterations: u32, seed: u32) {
    if iterations == 0 {
        return;
    }
    let mut scratch = vec![0.0_f32; heights.len()];
    for pass in 0..iterations {
        let blend = 0.14 + 0.08 * hash01(pass as i32, 12_345, seed.wrapping_add(463));
        for y in 0..cells_y {
            for x in 0..cells_x {
                let center = heights[(y * cells_x + x) as usize];
                let average = (sample_clamped(heights, cells_x, cells_y, x - 1, y)
                    + sample_clamped(heights, cells_x, cells_y, x + 1, y)
                    + sample_clamped(heights, cells_x, cells_y, x, y - 1)
                    + sample_clamped(heights, cells_x, cells_y, x, y + 1))
                    * 0.25;
                scratch[(y * cells_x + x) as usize] = center + (average - center) * blend;
            }
        }
        std::mem::swap(heights, &mut scratch);
    }
}

/// Slope in degrees from the centered-difference gradient, clamped [0, 89].
fn slope_degrees_at(
    heights: &[f32],
    cells_x: i32,
    cells_y: i32,
    cell_size: f64,
    x: i32,
    y: i32,
) -> f32 {
    let h_l = sample_clamped(heights, cells_x, cells_y, x - 1, y);
    let h_r = sample_clamped(heights, cells_x, cells_y, x + 1, y);
    let h_d = sample_clamped(heights, cells_x, cells_y, x, y - 1);
    let h_u = sample_clamped(heights, cells_x, cells_y, x, y + 1);

    let dzdx = f64::from(h_r - h_l) / (2.0 * cell_size);
    let dzdy = f64::from(h_u - h_d) / (2.0 * cell_size);
    let grad = (dzdx * dzdx + dzdy * dzdy).sqrt();
    (grad.atan().to_degrees() as f32).clamp(0.0, 89.0)
}

// ---------------------------------------------------------------------------
// Site classification
// ---------------------------------------------------------------------------

/// Mean of clamped district densities, or the stock assumption without one.
fn target_density_from_spec(spec: Option<&CitySpec>) -> f32 {
    let Some(spec) = spec else {
        return DEFAULT_TARGET_DENSITY;
    };
    if spec.districts.is_empty() {
        return DEFAULT_TARGET_DENSITY;
    }
    let sum: f32 = spec.districts.iter().map(DistrictHint::clamped_density).sum();
    sum / spec.districts.len() as f32
}

/// First-match-wins mode selection. Physical infeasibility outranks the
/// softer policy and geometry signals.
fn select_mode(profile: &SiteProfile, min_buildable_fraction: f32) -> GenerationMode {
    if profile.buildable_fraction < (min_buildable_fraction * 0.55).max(0.12) {
        return GenerationMode::ConservationOnly;
    }
    if profile.hostile_terrain {
        return GenerationMode::HillTown;
    }
    if profile.brownfield_pockets {
        return GenerationMode::BrownfieldCore;
    }
    if profile.policy_vs_physics {
        return GenerationMode::CompromisePlan;
    }
    if profile.awkward_geometry {
        return GenerationMode::Patchwork;
    }
    GenerationMode::Standard
}

// ---------------------------------------------------------------------------
// Generation entry point
// ---------------------------------------------------------------------------

/// Generate world constraint rasters and site diagnostics.
///
/// Never fails: degenerate inputs (zero-sized world, tiny cell size) clamp
/// to a valid 1x1-or-larger field instead of erroring.
pub fn generate(input: &TerrainInput, config: &TerrainConfig) -> TerrainOutput {
    let cell_size = input.cell_size.max(1.0);
    let cells_x = ((f64::from(input.world_width) / cell_size).round() as i32).max(1);
    let cells_y = ((f64::from(input.world_height) / cell_size).round() as i32).max(1);

    let mut output = TerrainOutput::default();
    output.constraints.resize(cells_x, cells_y, cell_size);

    let mut heights = synthesize_heights(cells_x, cells_y, input.seed);
    erode(&mut heights, cells_x, cells_y, config.erosion_iterations, input.seed);

    let mut min_h = f32::INFINITY;
    let mut max_h = f32::NEG_INFINITY;
    for &h in &heights {
        min_h = min_h.min(h);
        max_h = max_h.max(h);
    }
    let range = max_h - min_h;

    let denom_x = (cells_x - 1).max(1) as f32;
    let denom_y = (cells_y - 1).max(1) as f32;
    let seed = input.seed;

    let mut buildable_cells: u64 = 0;
    let mut steep_buildable_cells: u64 = 0;
    let mut brownfield_cells: u64 = 0;
    let mut buildable_slope_sum = 0.0_f32;

    for y in 0..cells_y {
        for x in 0..cells_x {
            let idx = output.constraints.to_index(x, y);
            let nx = x as f32 / denom_x;
            let ny = y as f32 / denom_y;

            let height = heights[idx];
            // Flat fields normalize to neutral mid-elevation.
            let elev_norm = if range > 1e-6 { (height - min_h) / range } else { 0.5 };
            let slope = slope_degrees_at(&heights, cells_x, cells_y, cell_size, x, y);

            let flood_noise =
                fractal01(nx * 48.0 + 13.0, ny * 48.0 - 9.0, seed.wrapping_add(89));
            let flood_score = (0.62 * (1.0 - elev_norm) + 0.38 * flood_noise
                - 0.15 * (slope / 45.0).min(1.0))
            .clamp(0.0, 1.0);
            let flood_mask = if flood_score > 0.78 {
                FLOOD_PERMANENT
            } else if flood_score > 0.56 {
                FLOOD_SEASONAL
            } else {
                FLOOD_NONE
            };

            let soil_noise =
                fractal01(nx * 72.0 - 5.0, ny * 72.0 + 7.0, seed.wrapping_add(133));
            let flood_penalty = if flood_mask == FLOOD_PERMANENT { 0.22 } else { 0.0 };
            let soil_strength =
                (1.0 - slope / 50.0 + 0.25 * (soil_noise - 0.5) - flood_penalty).clamp(0.0, 1.0);

            let nature_noise =
                fractal01(nx * 80.0 + 3.0, ny * 80.0 - 2.0, seed.wrapping_add(211));
            let nature_score = (0.45 * (1.0 - elev_norm) + 0.55 * nature_noise).clamp(0.0, 1.0);

            let mut history = 0_u8;
            let tag_base = hash01(x, y, seed.wrapping_add(307));
            if tag_base > 0.965 {
                history |= HistoryTag::Brownfield.mask();
            }
            if tag_base < 0.022 {
                history |= HistoryTag::SacredSite.mask();
            }
            if hash01(x + 83, y - 41, seed.wrapping_add(911)) > 0.976 {
                history |= HistoryTag::Contaminated.mask();
            }
            if hash01(x - 59, y + 17, seed.wrapping_add(1213)) > 0.971 {
                history |= HistoryTag::UtilityLegacy.mask();
            }

            let no_build = slope > config.max_buildable_slope_deg
                || flood_mask == FLOOD_PERMANENT
                || has_history_tag(history, HistoryTag::SacredSite);

            output.constraints.height_meters[idx] = height;
            output.constraints.slope_degrees[idx] = slope;
            output.constraints.flood_mask[idx] = flood_mask;
            output.constraints.soil_strength[idx] = soil_strength;
            output.constraints.nature_score[idx] = nature_score;
            output.constraints.history_tags[idx] = history;
            output.constraints.no_build_mask[idx] = u8::from(no_build);

            if !no_build {
                buildable_cells += 1;
                buildable_slope_sum += slope;
                if slope > config.hostile_terrain_slope_deg {
                    steep_buildable_cells += 1;
                }
            }
            if has_history_tag(history, HistoryTag::Brownfield)
                || has_history_tag(history, HistoryTag::Contaminated)
            {
                brownfield_cells += 1;
            }
        }
    }

    // Fragmentation: no-build boundary transitions over axis-aligned
    // adjacency pairs (right and down neighbors, each pair counted once).
    let mut transitions: u64 = 0;
    let mut adjacency: u64 = 0;
    for y in 0..cells_y {
        for x in 0..cells_x {
            let current = output.constraints.no_build_mask[output.constraints.to_index(x, y)];
            if x + 1 < cells_x {
                adjacency += 1;
                if current != output.constraints.no_build_mask[output.constraints.to_index(x + 1, y)]
                {
                    transitions += 1;
                }
            }
            if y + 1 < cells_y {
                adjacency += 1;
                if current != output.constraints.no_build_mask[output.constraints.to_index(x, y + 1)]
                {
                    transitions += 1;
                }
            }
        }
    }

    let total_cells = output.constraints.cell_count().max(1) as f32;
    let buildable_fraction = buildable_cells as f32 / total_cells;
    let avg_buildable_slope = if buildable_cells > 0 {
        buildable_slope_sum / buildable_cells as f32
    } else {
        // Nothing buildable: assume the worst for classification.
        45.0
    };
    let fragmentation = if adjacency > 0 {
        transitions as f32 / adjacency as f32
    } else {
        0.0
    };
    let steep_pressure = if buildable_cells > 0 {
        steep_buildable_cells as f32 / buildable_cells as f32
    } else {
        1.0
    };

    let target_density = target_density_from_spec(input.city_spec);
    let policy_friction = ((1.0 - buildable_fraction) * 0.45
        + fragmentation * 0.32
        + steep_pressure * 0.17
        + target_density * (1.0 - buildable_fraction) * 0.20)
        .clamp(0.0, 1.0);

    output.profile.buildable_fraction = buildable_fraction;
    output.profile.average_buildable_slope = avg_buildable_slope;
    output.profile.buildable_fragmentation = fragmentation;
    output.profile.policy_friction = policy_friction;
    output.profile.hostile_terrain = avg_buildable_slope > config.hostile_terrain_slope_deg
        || buildable_fraction < config.min_buildable_fraction;
    output.profile.policy_vs_physics = policy_friction > config.policy_friction_threshold;
    output.profile.awkward_geometry = fragmentation > config.fragmentation_threshold;
    output.profile.brownfield_pockets = brownfield_cells as f32 / total_cells > 0.04;
    output.profile.mode = select_mode(&output.profile, config.min_buildable_fraction);

    output
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
