//! Shared data model for the city-generation pipeline.
//!
//! Three groups of types live here:
//! - [`city_spec`]: the user/AI-authored `CitySpec` input document,
//! - [`constraint_field`]: the per-cell `WorldConstraintField` raster bundle
//!   produced by terrain analysis,
//! - [`site_profile`]: the site-level summary (`SiteProfile`) and the
//!   generation mode classification derived from it.
//!
//! Everything here is plain owned data: no I/O, no global state. Generators
//! consume these types; they never reach back into editor or app state.

pub mod city_spec;
pub mod constraint_field;
pub mod site_profile;

pub use city_spec::{
    BudgetHint, CityIntent, CitySpec, DistrictHint, PopulationHint, ZoningHint,
};
pub use constraint_field::{
    HistoryTag, WorldConstraintField, FLOOD_NONE, FLOOD_PERMANENT, FLOOD_SEASONAL,
};
pub use site_profile::{GenerationMode, SiteProfile};
