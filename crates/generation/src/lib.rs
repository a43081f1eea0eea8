//! Deterministic city-generation front end: terrain constraint synthesis
//! plus the spec-to-request adapter that feeds it.

pub mod citygen;
pub mod config;
pub mod noise;
pub mod spec_adapter;
pub mod terrain;


pub use citygen::{AxiomInput, AxiomKind, GeneratorConfig};
pub use spec_adapter::{build_request, try_build_request, AdapterError, CitySpecGenerationRequest};
pub use terrain::{TerrainConfig, TerrainInput, TerrainOutput};
