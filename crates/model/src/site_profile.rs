//! Site-level diagnostics and the generation mode derived from them.

use serde::{Deserialize, Serialize};

/// Generation mode selected from terrain/policy diagnostics.
///
/// Drives how the downstream generator approaches the site: `HillTown`
/// switches to slope-following roads, `ConservationOnly` suppresses most
/// construction, and so on. Selection order lives in the terrain generator;
/// physical constraints outrank policy ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, bitcode::Encode,
    bitcode::Decode,
)]
#[repr(u8)]
pub enum GenerationMode {
    #[default]
    Standard = 0,
    HillTown,
    ConservationOnly,
    BrownfieldCore,
    CompromisePlan,
    Patchwork,
}

/// Scalar site diagnostics computed from one [`WorldConstraintField`].
///
/// Computed once per generation request and never mutated afterward.
/// Fractions and scores are in [0, 1]; `average_buildable_slope` is in
/// degrees.
///
/// [`WorldConstraintField`]: crate::constraint_field::WorldConstraintField
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct SiteProfile {
    pub buildable_fraction: f32,
    pub average_buildable_slope: f32,
    pub buildable_fragmentation: f32,
    pub policy_friction: f32,

    pub hostile_terrain: bool,
    pub policy_vs_physics: bool,
    pub awkward_geometry: bool,
    pub brownfield_pockets: bool,

    pub mode: GenerationMode,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            buildable_fraction: 1.0,
            average_buildable_slope: 0.0,
            buildable_fragmentation: 0.0,
            policy_friction: 0.0,
            hostile_terrain: false,
            policy_vs_physics: false,
            awkward_geometry: false,
            brownfield_pockets: false,
            mode: GenerationMode::Standard,
        }
    }
}
