//! Translates an authored [`CitySpec`] into a generator-ready request.
//!
//! The adapter owns all spec-to-generator policy: scale presets, seed
//! derivation, the district-to-axiom strategy table, and the coastal and
//! fallback scaffolds. Output ordering is part of the contract (coastal
//! axiom first, then districts in input order) so downstream results stay
//! reproducible for a given spec.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;
use tracing::{debug, warn};
use xxhash_rust::xxh64::xxh64;

use model::city_spec::{CitySpec, DistrictHint};

use crate::citygen::{AxiomInput, AxiomKind, GeneratorConfig};
use crate::config::{DEFAULT_CELL_SIZE, MIN_SEED_COUNT};

// ---------------------------------------------------------------------------
// Request and error types
// ---------------------------------------------------------------------------

/// Everything the downstream generator needs to run one generation.
///
/// Built fresh per call; immutable once returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CitySpecGenerationRequest {
    pub config: GeneratorConfig,
    pub axioms: Vec<AxiomInput>,
    pub tags: Vec<String>,
}

/// Structural failures while translating a spec.
///
/// Malformed or partial specs are not errors (they resolve via defaults);
/// the only hard failure is produced geometry that escapes the world.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error(
        "axiom {index} ({strategy}) at ({x:.1}, {y:.1}) lies outside the {width}x{height} world"
    )]
    AxiomOutOfBounds {
        index: usize,
        strategy: &'static str,
        x: f64,
        y: f64,
        width: i32,
        height: i32,
    },
}

// ---------------------------------------------------------------------------
// Scale presets
// ---------------------------------------------------------------------------

struct ScalePreset {
    extent: i32,
    footprint_scale: f32,
    base_seed_count: i32,
}

/// Coarse world-size presets keyed by the lower-cased intent scale.
/// Unknown scales read as "city".
fn scale_preset(scale_lower: &str) -> ScalePreset {
    match scale_lower {
        "hamlet" => ScalePreset {
            extent: 900,
            footprint_scale: 0.55,
            base_seed_count: 8,
        },
        "town" => ScalePreset {
            extent: 1400,
            footprint_scale: 0.78,
            base_seed_count: 12,
        },
        "metro" => ScalePreset {
            extent: 3200,
            footprint_scale: 1.45,
            base_seed_count: 34,
        },
        _ => ScalePreset {
            extent: 2200,
            footprint_scale: 1.0,
            base_seed_count: 22,
        },
    }
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Deterministic fallback seed from spec content, for specs without an
/// explicit seed. Folds a 64-bit content hash to 32 bits; zero remaps to 1
/// so the result never collides with the "no seed" sentinel.
fn fallback_seed(spec: &CitySpec) -> u32 {
    let mut key = format!(
        "{}|{}|{}",
        spec.intent.description, spec.intent.scale, spec.intent.climate
    );
    for tag in &spec.intent.style_tags {
        key.push('|');
        key.push_str(tag);
    }
    for district in &spec.districts {
        key.push('|');
        key.push_str(&district.district_type);
        key.push(':');
        key.push_str(&district.density.to_string());
    }

    let h = xxh64(key.as_bytes(), 0);
    let folded = (h ^ (h >> 32)) as u32;
    if folded == 0 {
        1
    } else {
        folded
    }
}

// ---------------------------------------------------------------------------
// District axioms
// ---------------------------------------------------------------------------

/// Convert one district hint into a concrete axiom.
///
/// Districts sit on radial rings around the map center; density drives
/// influence radius, decay, and the strategy-specific parameter. The
/// strategy itself follows the district type.
fn district_axiom(
    district: &DistrictHint,
    center: DVec2,
    footprint_scale: f32,
    index: usize,
    count: usize,
) -> AxiomInput {
    let kind_lower = district.district_type.to_lowercase();
    let density = district.clamped_density();

    let angle = if count == 0 {
        0.0
    } else {
        TAU * index as f64 / count as f64
    };
    let ring = f64::from((160.0 + (index % 3) as f32 * 120.0) * footprint_scale);

    let kind = match kind_lower.as_str() {
        "downtown" | "commercial" | "civic" => {
            if density > 0.75 {
                AxiomKind::Radial {
                    spokes: (6 + (density * 14.0) as i32).clamp(6, 24),
                }
            } else {
                AxiomKind::Grid {
                    jitter: (0.05 + (1.0 - density) * 0.20).clamp(0.03, 0.32),
                }
            }
        }
        "industrial" | "logistics" => {
            if density > 0.65 {
                AxiomKind::Linear
            } else {
                AxiomKind::Superblock {
                    block_size: ((220.0 + (1.0 - density) * 240.0) * footprint_scale)
                        .clamp(150.0, 520.0),
                }
            }
        }
        "residential" | "suburban" => AxiomKind::Suburban {
            loop_strength: (0.45 + (1.0 - density) * 0.45).clamp(0.30, 0.95),
        },
        _ => AxiomKind::Organic {
            curviness: (0.35 + (1.0 - density) * 0.45).clamp(0.15, 0.95),
        },
    };

    AxiomInput {
        kind,
        position: DVec2::new(
            center.x + angle.cos() * ring,
            center.y + angle.sin() * ring,
        ),
        radius: f64::from((220.0 + 420.0 * density) * footprint_scale).clamp(90.0, 1200.0),
        theta: angle,
        decay: (3.0 - f64::from(density) * 1.6).clamp(0.9, 3.8),
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Every axiom center must lie inside `[0, width] x [0, height]`. Bounds
/// are inclusive; violations abort rather than clamp so bad parameter
/// combinations surface instead of silently warping geometry.
fn validate_axiom_bounds(
    axioms: &[AxiomInput],
    width: i32,
    height: i32,
) -> Result<(), AdapterError> {
    let max_x = f64::from(width);
    let max_y = f64::from(height);
    for (index, axiom) in axioms.iter().enumerate() {
        let p = axiom.position;
        if p.x < 0.0 || p.y < 0.0 || p.x > max_x || p.y > max_y {
            return Err(AdapterError::AxiomOutOfBounds {
                index,
                strategy: axiom.kind.label(),
                x: p.x,
                y: p.y,
                width,
                height,
            });
        }
    }
    Ok(())
}

/// Translate a spec into a generation request.
///
/// Resolution order: scale presets, seed count and effective seed,
/// provenance tags, the optional coastal scaffold, one axiom per district
/// in input order, the fallback grid axiom if nothing else was produced,
/// then bounds validation over the final axiom list.
pub fn try_build_request(spec: &CitySpec) -> Result<CitySpecGenerationRequest, AdapterError> {
    let mut request = CitySpecGenerationRequest::default();

    let scale_lower = if spec.intent.scale.is_empty() {
        "city".to_string()
    } else {
        spec.intent.scale.to_lowercase()
    };
    let preset = scale_preset(&scale_lower);
    request.config.width = preset.extent;
    request.config.height = preset.extent;
    request.config.cell_size = DEFAULT_CELL_SIZE;

    // Road density widens or narrows the seed count around the preset base.
    let road_density = spec.clamped_road_density();
    request.config.num_seeds = ((preset.base_seed_count as f32 * (0.5 + road_density)).round()
        as i32)
        .max(MIN_SEED_COUNT);
    request.config.seed = if spec.seed == 0 {
        fallback_seed(spec)
    } else {
        spec.seed
    };

    request.tags.push(format!("scale:{scale_lower}"));
    request
        .tags
        .push(format!("climate:{}", spec.intent.climate.to_lowercase()));
    for tag in &spec.intent.style_tags {
        request.tags.push(format!("style:{}", tag.to_lowercase()));
    }

    let center = DVec2::new(
        f64::from(request.config.width) * 0.5,
        f64::from(request.config.height) * 0.5,
    );

    // Shoreline scaffold when the intent text suggests water frontage.
    let desc_lower = spec.intent.description.to_lowercase();
    if ["coastal", "harbor", "waterfront"]
        .iter()
        .any(|token| desc_lower.contains(token))
    {
        request.axioms.push(AxiomInput {
            kind: AxiomKind::Linear,
            position: DVec2::new(
                center.x,
                center.y - f64::from(request.config.height) * 0.28,
            ),
            radius: (f64::from(request.config.width) * 0.52).max(200.0),
            theta: 0.0,
            decay: 1.6,
        });
        request.tags.push("hint:coastal".to_string());
    }

    let count = spec.districts.len();
    for (index, district) in spec.districts.iter().enumerate() {
        request.axioms.push(district_axiom(
            district,
            center,
            preset.footprint_scale,
            index,
            count,
        ));
        request
            .tags
            .push(format!("district:{}", district.district_type.to_lowercase()));
    }

    // The generator must never receive an empty axiom list.
    if request.axioms.is_empty() {
        debug!("spec produced no axioms, seeding a central grid fallback");
        request.axioms.push(AxiomInput {
            kind: AxiomKind::Grid { jitter: 0.15 },
            position: center,
            radius: (f64::from(request.config.width) * 0.28).clamp(180.0, 950.0),
            theta: 0.0,
            decay: 2.0,
        });
        request.tags.push("fallback:grid".to_string());
    }

    validate_axiom_bounds(&request.axioms, request.config.width, request.config.height)?;
    Ok(request)
}

/// Convenience wrapper: logs and returns the empty default request when the
/// spec is rejected. Callers needing the reason use [`try_build_request`].
pub fn build_request(spec: &CitySpec) -> CitySpecGenerationRequest {
    match try_build_request(spec) {
        Ok(request) => request,
        Err(e) => {
            warn!("city spec rejected, substituting an empty request: {e}");
            CitySpecGenerationRequest::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use model::city_spec::CityIntent;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn spec_with_scale(scale: &str) -> CitySpec {
        CitySpec {
            intent: CityIntent {
                scale: scale.to_string(),
                ..CityIntent::default()
            },
            ..CitySpec::default()
        }
    }

    #[test]
    fn test_scale_presets_set_world_dims() {
        for (scale, extent) in [
            ("hamlet", 900),
            ("town", 1400),
            ("city", 2200),
            ("metro", 3200),
            ("METRO", 3200),
            ("galaxy", 2200),
        ] {
            let request = try_build_request(&spec_with_scale(scale)).unwrap();
            assert_eq!(request.config.width, extent, "scale {scale}");
            assert_eq!(request.config.height, extent, "scale {scale}");
            assert_eq!(request.config.cell_size, 10.0);
        }
    }

    #[test]
    fn test_empty_scale_defaults_to_city() {
        let request = try_build_request(&CitySpec::default()).unwrap();
        assert_eq!(request.config.width, 2200);
        assert_eq!(request.tags[0], "scale:city");
    }

    #[test]
    fn test_num_seeds_scales_with_road_density() {
        let mut spec = spec_with_scale("metro");
        spec.road_density = 0.75;
        let request = try_build_request(&spec).unwrap();
        // round(34 * (0.5 + 0.75))
        assert_eq!(request.config.num_seeds, 43);

        let mut sparse = spec_with_scale("hamlet");
        sparse.road_density = 0.0; // clamps to 0.05
        let request = try_build_request(&sparse).unwrap();
        // round(8 * 0.55) = 4, floored at the viability minimum
        assert_eq!(request.config.num_seeds, 8);
    }

    #[test]
    fn test_explicit_seed_is_honored() {
        let mut spec = CitySpec::default();
        spec.seed = 42;
        let request = try_build_request(&spec).unwrap();
        assert_eq!(request.config.seed, 42);
    }

    #[test]
    fn test_fallback_seed_deterministic_and_content_sensitive() {
        let mut spec = CitySpec::default();
        spec.intent.description = "river town".to_string();
        let a = try_build_request(&spec).unwrap();
        let b = try_build_request(&spec).unwrap();
        assert_ne!(a.config.seed, 0);
        assert_eq!(a.config.seed, b.config.seed);

        spec.intent.description = "mountain town".to_string();
        let c = try_build_request(&spec).unwrap();
        assert_ne!(a.config.seed, c.config.seed);
    }

    #[test]
    fn test_tags_are_ordered_and_lowercased() {
        let spec = CitySpec {
            intent: CityIntent {
                description: String::new(),
                scale: "Town".to_string(),
                climate: "Arid".to_string(),
                style_tags: vec!["Modern".to_string(), "DENSE".to_string()],
            },
            districts: vec![DistrictHint {
                district_type: "Downtown".to_string(),
                density: 0.5,
            }],
            ..CitySpec::default()
        };
        let request = try_build_request(&spec).unwrap();
        assert_eq!(request.tags[0], "scale:town");
        assert_eq!(request.tags[1], "climate:arid");
        assert_eq!(request.tags[2], "style:modern");
        assert_eq!(request.tags[3], "style:dense");
        assert_eq!(request.tags[4], "district:downtown");
    }

    #[test]
    fn test_coastal_description_adds_shoreline_axiom() {
        let mut spec = CitySpec::default();
        spec.intent.description = "A quiet HARBOR settlement".to_string();
        let request = try_build_request(&spec).unwrap();

        assert_eq!(request.axioms.len(), 1);
        let shoreline = &request.axioms[0];
        assert_eq!(shoreline.kind, AxiomKind::Linear);
        assert_eq!(shoreline.position.x, 1100.0);
        // 28% of the map height above center
        assert_eq!(shoreline.position.y, 1100.0 - 2200.0 * 0.28);
        assert_eq!(shoreline.radius, 2200.0 * 0.52);
        assert_eq!(shoreline.decay, 1.6);
        assert!(request.tags.contains(&"hint:coastal".to_string()));
        assert!(!request.tags.contains(&"fallback:grid".to_string()));
    }

    #[test]
    fn test_district_strategy_table() {
        let cases: [(&str, f32, AxiomKind); 6] = [
            ("downtown", 0.9, AxiomKind::Radial { spokes: 18 }),
            ("commercial", 0.5, AxiomKind::Grid { jitter: 0.15 }),
            ("industrial", 0.7, AxiomKind::Linear),
            ("logistics", 0.3, AxiomKind::Superblock { block_size: 388.0 }),
            ("residential", 0.4, AxiomKind::Suburban { loop_strength: 0.72 }),
            ("park", 0.2, AxiomKind::Organic { curviness: 0.71 }),
        ];
        for (district_type, density, expected) in cases {
            let spec = CitySpec {
                districts: vec![DistrictHint {
                    district_type: district_type.to_string(),
                    density,
                }],
                ..CitySpec::default()
            };
            let request = try_build_request(&spec).unwrap();
            assert_eq!(request.axioms.len(), 1);
            match (&request.axioms[0].kind, &expected) {
                (AxiomKind::Radial { spokes }, AxiomKind::Radial { spokes: want }) => {
                    assert_eq!(spokes, want, "{district_type}");
                }
                (AxiomKind::Grid { jitter }, AxiomKind::Grid { jitter: want }) => {
                    assert!((jitter - want).abs() < 1e-5, "{district_type}");
                }
                (AxiomKind::Linear, AxiomKind::Linear) => {}
                (
                    AxiomKind::Superblock { block_size },
                    AxiomKind::Superblock { block_size: want },
                ) => {
                    assert!((block_size - want).abs() < 1e-3, "{district_type}");
                }
                (
                    AxiomKind::Suburban { loop_strength },
                    AxiomKind::Suburban { loop_strength: want },
                ) => {
                    assert!((loop_strength - want).abs() < 1e-5, "{district_type}");
                }
                (
                    AxiomKind::Organic { curviness },
                    AxiomKind::Organic { curviness: want },
                ) => {
                    assert!((curviness - want).abs() < 1e-5, "{district_type}");
                }
                (got, want) => panic!("{district_type}: got {got:?}, want {want:?}"),
            }
        }
    }

    #[test]
    fn test_single_district_sits_on_first_ring() {
        let spec = CitySpec {
            districts: vec![DistrictHint {
                district_type: "residential".to_string(),
                density: 0.6,
            }],
            ..CitySpec::default()
        };
        let request = try_build_request(&spec).unwrap();
        let axiom = &request.axioms[0];
        // index 0 of 1: angle 0, ring 160 * footprint 1.0
        assert_eq!(axiom.theta, 0.0);
        assert!((axiom.position.x - (1100.0 + 160.0)).abs() < 1e-9);
        assert!((axiom.position.y - 1100.0).abs() < 1e-9);
        // radius (220 + 420*0.6) * 1.0 = 472
        assert!((axiom.radius - 472.0).abs() < 1e-3);
        // decay 3.0 - 1.6*0.6
        assert!((axiom.decay - 2.04).abs() < 1e-6);
    }

    #[test]
    fn test_districts_spread_over_rings_and_angles() {
        let districts: Vec<DistrictHint> = (0..4)
            .map(|i| DistrictHint {
                district_type: "residential".to_string(),
                density: 0.1 + 0.2 * i as f32,
            })
            .collect();
        let spec = CitySpec {
            districts,
            ..CitySpec::default()
        };
        let request = try_build_request(&spec).unwrap();
        assert_eq!(request.axioms.len(), 4);
        for (i, axiom) in request.axioms.iter().enumerate() {
            let expected_angle = TAU * i as f64 / 4.0;
            assert!((axiom.theta - expected_angle).abs() < 1e-12, "axiom {i}");
        }
        // ring pattern repeats every 3 districts
        let d0 = request.axioms[0].position.distance(DVec2::new(1100.0, 1100.0));
        let d3 = request.axioms[3].position.distance(DVec2::new(1100.0, 1100.0));
        assert!((d0 - 160.0).abs() < 1e-6);
        assert!((d3 - 160.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_spec_gets_fallback_grid() {
        let request = try_build_request(&CitySpec::default()).unwrap();
        assert_eq!(request.axioms.len(), 1);
        let fallback = &request.axioms[0];
        assert_eq!(fallback.kind, AxiomKind::Grid { jitter: 0.15 });
        assert_eq!(fallback.position, DVec2::new(1100.0, 1100.0));
        // 28% of the map width, inside the clamp band
        assert_eq!(fallback.radius, 2200.0 * 0.28);
        assert_eq!(fallback.decay, 2.0);
        assert_eq!(
            request.tags.iter().filter(|t| *t == "fallback:grid").count(),
            1
        );
    }

    #[test]
    fn test_bounds_validation_is_inclusive() {
        let on_edge = AxiomInput {
            position: DVec2::new(2200.0, 0.0),
            ..AxiomInput::default()
        };
        assert!(validate_axiom_bounds(&[on_edge], 2200, 2200).is_ok());

        let outside = AxiomInput {
            position: DVec2::new(-0.1, 50.0),
            ..AxiomInput::default()
        };
        let err = validate_axiom_bounds(&[AxiomInput::default(), outside], 2200, 2200)
            .unwrap_err();
        match err {
            AdapterError::AxiomOutOfBounds { index, strategy, .. } => {
                assert_eq!(index, 1);
                assert_eq!(strategy, "grid");
            }
        }
    }

    #[test]
    fn test_build_request_matches_try_build_on_success() {
        let mut spec = spec_with_scale("town");
        spec.intent.description = "waterfront village".to_string();
        assert_eq!(build_request(&spec), try_build_request(&spec).unwrap());
    }

    #[test]
    fn test_prop_axioms_always_contained() {
        let scales = ["hamlet", "town", "city", "metro", "", "sprawl"];
        let types = [
            "downtown",
            "commercial",
            "civic",
            "industrial",
            "logistics",
            "residential",
            "suburban",
            "market",
            "",
        ];
        let descriptions = ["", "a coastal stronghold", "harbor and rail", "plains city"];

        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED_C17E);
        for _ in 0..250 {
            let mut spec = CitySpec::default();
            spec.intent.scale = scales[rng.gen_range(0..scales.len())].to_string();
            spec.intent.description = descriptions[rng.gen_range(0..descriptions.len())].to_string();
            spec.road_density = rng.gen_range(-1.0..3.0);
            spec.seed = rng.gen_range(0..u32::MAX);
            for _ in 0..rng.gen_range(0..6) {
                spec.districts.push(DistrictHint {
                    district_type: types[rng.gen_range(0..types.len())].to_string(),
                    // deliberately unclamped
                    density: rng.gen_range(-0.5..2.0),
                });
            }

            let request = try_build_request(&spec).expect("valid spec must build");
            assert!(!request.axioms.is_empty());
            let max_x = f64::from(request.config.width);
            let max_y = f64::from(request.config.height);
            for axiom in &request.axioms {
                assert!(
                    axiom.position.x >= 0.0
                        && axiom.position.x <= max_x
                        && axiom.position.y >= 0.0
                        && axiom.position.y <= max_y,
                    "axiom escaped bounds: {:?} in {max_x}x{max_y}",
                    axiom.position
                );
                assert!(axiom.radius > 0.0);
                assert!(axiom.decay > 0.0);
            }
            assert!(request.config.num_seeds >= MIN_SEED_COUNT);
        }
    }
}
