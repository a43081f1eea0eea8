pub const DEFAULT_WORLD_EXTENT: i32 = 2000;
pub const DEFAULT_CELL_SIZE: f64 = 10.0;
pub const DEFAULT_GENERATOR_SEED: u32 = 12345;

/// Floor for the road-network seed count; below this the tracer degenerates.
pub const MIN_SEED_COUNT: i32 = 8;

/// District density assumed when no spec (or an empty district list) is supplied.
pub const DEFAULT_TARGET_DENSITY: f32 = 0.55;
