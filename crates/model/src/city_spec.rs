//! `CitySpec`: the authored description of the city to generate.
//!
//! Specs arrive either from the editor panel or as JSON from the AI bridge,
//! so every struct tolerates partial input: missing fields deserialize to
//! the documented defaults and a malformed-but-parseable spec is never an
//! error. Numeric fields keep whatever the author wrote; consumers clamp at
//! the point of use instead of rewriting the spec.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Intent and district hints
// ---------------------------------------------------------------------------

/// High-level authored intent: free-text description plus coarse knobs.
///
/// `scale` is one of `hamlet`/`town`/`city`/`metro` (case-insensitive);
/// anything else, including empty, is treated as `city` downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CityIntent {
    pub description: String,
    pub scale: String,
    pub climate: String,
    pub style_tags: Vec<String>,
}

/// One requested district: a named type and a target density in [0, 1].
///
/// The wire field for the type is `"type"` to match the JSON the AI bridge
/// emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictHint {
    #[serde(rename = "type")]
    pub district_type: String,
    pub density: f32,
}

impl Default for DistrictHint {
    fn default() -> Self {
        Self {
            district_type: String::new(),
            density: 0.5,
        }
    }
}

impl DistrictHint {
    /// Density clamped to [0, 1]. The stored field keeps the authored value.
    #[inline]
    pub fn clamped_density(&self) -> f32 {
        self.density.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Pass-through hints (consumed by downstream generators only)
// ---------------------------------------------------------------------------

/// Budget envelope forwarded to the economy generator. Not read here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetHint {
    pub total: f64,
    pub infrastructure_share: f32,
    pub services_share: f32,
}

/// Population targets forwarded to the growth generator. Not read here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationHint {
    pub target_residents: u32,
    pub growth_rate: f32,
}

/// Zoning preferences forwarded to the lot generator. Not read here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoningHint {
    pub mixed_use_bias: f32,
    pub max_far: f32,
}

// ---------------------------------------------------------------------------
// The spec document
// ---------------------------------------------------------------------------

/// Complete authored city specification.
///
/// `seed == 0` means "no explicit seed": the adapter derives one
/// deterministically from the spec's content so the same text always maps
/// to the same city. `road_density` defaults to 0.5 and is clamped to
/// [0.05, 1.0] where it is consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitySpec {
    pub intent: CityIntent,
    pub districts: Vec<DistrictHint>,
    pub budget: Option<BudgetHint>,
    pub population: Option<PopulationHint>,
    pub zoning: Option<ZoningHint>,
    pub seed: u32,
    pub road_density: f32,
}

impl Default for CitySpec {
    fn default() -> Self {
        Self {
            intent: CityIntent::default(),
            districts: Vec::new(),
            budget: None,
            population: None,
            zoning: None,
            seed: 0,
            road_density: 0.5,
        }
    }
}

impl CitySpec {
    /// Road density clamped to the consumable range [0.05, 1.0].
    #[inline]
    pub fn clamped_road_density(&self) -> f32 {
        self.road_density.clamp(0.05, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default_spec() {
        let spec: CitySpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, CitySpec::default());
        assert_eq!(spec.seed, 0);
        assert_eq!(spec.road_density, 0.5);
        assert!(spec.budget.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let spec: CitySpec = serde_json::from_str(
            r#"{"intent": {"scale": "metro"}, "districts": [{"type": "downtown"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.intent.scale, "metro");
        assert!(spec.intent.description.is_empty());
        assert_eq!(spec.districts.len(), 1);
        assert_eq!(spec.districts[0].district_type, "downtown");
        // density missing on the wire -> documented default
        assert_eq!(spec.districts[0].density, 0.5);
        assert_eq!(spec.road_density, 0.5);
    }

    #[test]
    fn test_district_type_uses_wire_name() {
        let json = serde_json::to_value(DistrictHint {
            district_type: "industrial".to_string(),
            density: 0.8,
        })
        .unwrap();
        assert_eq!(json["type"], "industrial");
        assert!(json.get("district_type").is_none());
    }

    #[test]
    fn test_json_roundtrip_exact() {
        let spec = CitySpec {
            intent: CityIntent {
                description: "A coastal tech city".to_string(),
                scale: "metro".to_string(),
                climate: "temperate".to_string(),
                style_tags: vec!["modern".to_string(), "dense".to_string()],
            },
            districts: vec![
                DistrictHint {
                    district_type: "residential".to_string(),
                    density: 0.6,
                },
                DistrictHint {
                    district_type: "downtown".to_string(),
                    density: 0.9,
                },
            ],
            budget: Some(BudgetHint {
                total: 5_000_000.0,
                infrastructure_share: 0.4,
                services_share: 0.25,
            }),
            population: Some(PopulationHint {
                target_residents: 250_000,
                growth_rate: 0.02,
            }),
            zoning: None,
            seed: 42,
            road_density: 0.75,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: CitySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_roundtrip_preserves_empty_style_tags() {
        let spec = CitySpec::default();
        let json = serde_json::to_string(&spec).unwrap();
        let back: CitySpec = serde_json::from_str(&json).unwrap();
        assert!(back.intent.style_tags.is_empty());
        assert_eq!(back, spec);
    }

    #[test]
    fn test_clamped_accessors() {
        let hint = DistrictHint {
            district_type: "park".to_string(),
            density: 1.7,
        };
        assert_eq!(hint.clamped_density(), 1.0);

        let spec = CitySpec {
            road_density: -3.0,
            ..CitySpec::default()
        };
        assert_eq!(spec.clamped_road_density(), 0.05);
        // stored value stays untouched
        assert_eq!(spec.road_density, -3.0);
    }
}
