//! Input contract of the downstream road/lot generator.
//!
//! These shapes are owned by the generator that consumes them; this crate
//! only populates them (see [`crate::spec_adapter`]). Field meanings and
//! defaults are part of that external contract and must not drift.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CELL_SIZE, DEFAULT_GENERATOR_SEED, DEFAULT_WORLD_EXTENT};
use crate::terrain::TerrainConfig;

// ---------------------------------------------------------------------------
// Generator configuration
// ---------------------------------------------------------------------------

/// Top-level configuration consumed by the road/lot generator.
///
/// `width`/`height` are world meters, not cells. `num_seeds` is the number
/// of streamline seeds the road tracer starts from; the `max_*` caps bound
/// memory for pathological specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub cell_size: f64,
    pub seed: u32,
    pub num_seeds: i32,
    pub max_districts: u32,
    pub max_lots: u32,
    pub max_buildings: u32,
    pub terrain: TerrainConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_EXTENT,
            height: DEFAULT_WORLD_EXTENT,
            cell_size: DEFAULT_CELL_SIZE,
            seed: DEFAULT_GENERATOR_SEED,
            num_seeds: 20,
            max_districts: 256,
            max_lots: 50_000,
            max_buildings: 100_000,
            terrain: TerrainConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Axioms
// ---------------------------------------------------------------------------

/// Road-pattern strategy with its strategy-specific parameter.
///
/// Serialized with a `"type"` discriminator so requests stay readable when
/// dumped for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxiomKind {
    /// Meandering street growth; higher curviness bends harder.
    Organic { curviness: f32 },
    /// Rectilinear blocks; jitter loosens the alignment.
    Grid { jitter: f32 },
    /// Spokes radiating from the axiom position.
    Radial { spokes: i32 },
    /// Looping cul-de-sac fabric.
    Suburban { loop_strength: f32 },
    /// Large uniform blocks, sized in world meters.
    Superblock { block_size: f32 },
    /// A single dominant corridor along `theta`.
    Linear,
}

impl AxiomKind {
    /// Lower-case strategy name, used in tags and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            AxiomKind::Organic { .. } => "organic",
            AxiomKind::Grid { .. } => "grid",
            AxiomKind::Radial { .. } => "radial",
            AxiomKind::Suburban { .. } => "suburban",
            AxiomKind::Superblock { .. } => "superblock",
            AxiomKind::Linear => "linear",
        }
    }
}

/// One seed of influence for the road tracer.
///
/// `radius` is the influence radius in world meters, `theta` the pattern
/// orientation in radians, `decay` how quickly influence falls off with
/// distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxiomInput {
    pub kind: AxiomKind,
    pub position: DVec2,
    pub radius: f64,
    pub theta: f64,
    pub decay: f64,
}

impl Default for AxiomInput {
    fn default() -> Self {
        Self {
            kind: AxiomKind::Grid { jitter: 0.15 },
            position: DVec2::ZERO,
            radius: 250.0,
            theta: 0.0,
            decay: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
