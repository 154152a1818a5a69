//! Provider variable catalog.
//!
//! Maps each provider's raw variable names to the canonical output names
//! clients ask for, along with how the quantity must be resampled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResamplerError, Result};
use crate::types::RawField;

/// Upstream data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// NOAA WaveWatch III wave and wind fields.
    WaveWatch,
    /// Copernicus Marine current, tide, wave and wind products.
    Copernicus,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaveWatch => "wavewatch",
            Self::Copernicus => "copernicus",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a catalog entry is resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    /// Plain scalar: `raw` → `output`.
    Scalar { raw: &'static str, output: &'static str },
    /// Angle in degrees: resampled via cosine/sine components.
    Angular { raw: &'static str, output: &'static str },
    /// Eastward/northward components reduced to direction and/or magnitude.
    VectorPair {
        east: &'static str,
        north: &'static str,
        direction: Option<&'static str>,
        magnitude: Option<&'static str>,
    },
}

impl QuantityKind {
    /// Canonical outputs this entry can produce.
    pub fn outputs(&self) -> Vec<&'static str> {
        match self {
            Self::Scalar { output, .. } | Self::Angular { output, .. } => vec![*output],
            Self::VectorPair {
                direction,
                magnitude,
                ..
            } => direction.iter().chain(magnitude.iter()).copied().collect(),
        }
    }
}

const WAVEWATCH_CATALOG: &[QuantityKind] = &[
    QuantityKind::Angular {
        raw: "dirpw",
        output: "wave_direction",
    },
    QuantityKind::Scalar {
        raw: "swh",
        output: "wave_height",
    },
    QuantityKind::Scalar {
        raw: "perpw",
        output: "wave_period",
    },
    QuantityKind::Scalar {
        raw: "ws",
        output: "wind_speed",
    },
    QuantityKind::VectorPair {
        east: "u",
        north: "v",
        direction: Some("wind_direction"),
        magnitude: None,
    },
];

const COPERNICUS_CATALOG: &[QuantityKind] = &[
    QuantityKind::VectorPair {
        east: "uo",
        north: "vo",
        direction: Some("sea_current_direction"),
        magnitude: Some("sea_current_speed"),
    },
    QuantityKind::VectorPair {
        east: "eastward_wind",
        north: "northward_wind",
        direction: Some("wind_direction"),
        magnitude: Some("wind_speed"),
    },
    QuantityKind::Scalar {
        raw: "zos",
        output: "tide_height",
    },
    QuantityKind::Scalar {
        raw: "VHM0",
        output: "wave_height",
    },
    QuantityKind::Scalar {
        raw: "VTM01_SW1",
        output: "wave_period",
    },
    QuantityKind::Angular {
        raw: "VMDR",
        output: "wave_direction",
    },
];

/// Catalog entries for a provider.
pub fn catalog(provider: Provider) -> &'static [QuantityKind] {
    match provider {
        Provider::WaveWatch => WAVEWATCH_CATALOG,
        Provider::Copernicus => COPERNICUS_CATALOG,
    }
}

/// One resampling job: a raw field or pair of fields plus the outputs to build.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceVariable {
    Scalar {
        output: String,
        field: RawField,
    },
    Angular {
        output: String,
        field: RawField,
    },
    VectorPair {
        east: RawField,
        north: RawField,
        direction: Option<String>,
        magnitude: Option<String>,
    },
}

impl SourceVariable {
    /// Canonical names this job writes.
    pub fn outputs(&self) -> Vec<String> {
        match self {
            Self::Scalar { output, .. } | Self::Angular { output, .. } => vec![output.clone()],
            Self::VectorPair {
                direction,
                magnitude,
                ..
            } => direction.iter().chain(magnitude.iter()).cloned().collect(),
        }
    }

    /// The field whose extent seeds the target grid when this job is first.
    pub fn reference_field(&self) -> &RawField {
        match self {
            Self::Scalar { field, .. } | Self::Angular { field, .. } => field,
            Self::VectorPair { east, .. } => east,
        }
    }
}

/// Decoded raw fields from one provider, keyed by raw variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDataset {
    pub provider: Provider,
    pub fields: BTreeMap<String, RawField>,
}

impl ProviderDataset {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            fields: BTreeMap::new(),
        }
    }

    /// Add a raw field under its own name.
    pub fn with_field(mut self, field: RawField) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Build resampling jobs from a provider dataset.
///
/// Only outputs in `requested` are kept; an empty request keeps everything the
/// dataset can produce. Jobs come back in catalog order. A vector pair with
/// only one component present is reported as
/// [`ResamplerError::MissingComponent`] in its slot.
pub fn assemble_sources(
    dataset: &ProviderDataset,
    requested: &[String],
) -> Vec<Result<SourceVariable>> {
    let wanted = |name: &str| requested.is_empty() || requested.iter().any(|r| r == name);
    let mut jobs = Vec::new();

    for kind in catalog(dataset.provider) {
        match *kind {
            QuantityKind::Scalar { raw, output } | QuantityKind::Angular { raw, output } => {
                let Some(field) = dataset.fields.get(raw) else {
                    continue;
                };
                if !wanted(output) {
                    continue;
                }
                let output = output.to_string();
                let field = field.clone();
                jobs.push(Ok(if matches!(kind, QuantityKind::Angular { .. }) {
                    SourceVariable::Angular { output, field }
                } else {
                    SourceVariable::Scalar { output, field }
                }));
            }
            QuantityKind::VectorPair {
                east,
                north,
                direction,
                magnitude,
            } => {
                let direction = direction.filter(|d| wanted(d)).map(str::to_string);
                let magnitude = magnitude.filter(|m| wanted(m)).map(str::to_string);
                if direction.is_none() && magnitude.is_none() {
                    continue;
                }
                match (dataset.fields.get(east), dataset.fields.get(north)) {
                    (Some(e), Some(n)) => jobs.push(Ok(SourceVariable::VectorPair {
                        east: e.clone(),
                        north: n.clone(),
                        direction,
                        magnitude,
                    })),
                    (None, None) => {}
                    (Some(_), None) => jobs.push(Err(ResamplerError::MissingComponent {
                        pair: format!("{}/{}", east, north),
                        component: north.to_string(),
                    })),
                    (None, Some(_)) => jobs.push(Err(ResamplerError::MissingComponent {
                        pair: format!("{}/{}", east, north),
                        component: east.to_string(),
                    })),
                }
            }
        }
    }

    for name in dataset.fields.keys() {
        let known = catalog(dataset.provider).iter().any(|kind| match *kind {
            QuantityKind::Scalar { raw, .. } | QuantityKind::Angular { raw, .. } => raw == name,
            QuantityKind::VectorPair { east, north, .. } => east == name || north == name,
        });
        if !known {
            debug!(provider = %dataset.provider, variable = %name, "Ignoring unknown raw variable");
        }
    }

    jobs
}

/// Canonical outputs a vector pair would produce when one component is missing.
pub fn pair_outputs(provider: Provider, component: &str) -> Vec<&'static str> {
    catalog(provider)
        .iter()
        .filter(|kind| {
            matches!(
                kind,
                QuantityKind::VectorPair { east, north, .. }
                    if *east == component || *north == component
            )
        })
        .flat_map(|kind| kind.outputs())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    fn field(name: &str) -> RawField {
        RawField::new(
            name,
            Axis::single(0.0),
            Axis::single(0.0),
            Axis::single(0.0),
            vec![1.0],
        )
        .unwrap()
    }

    fn names(jobs: &[Result<SourceVariable>]) -> Vec<Vec<String>> {
        jobs.iter()
            .map(|j| j.as_ref().map(|s| s.outputs()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_wavewatch_all_outputs() {
        let dataset = ProviderDataset::new(Provider::WaveWatch)
            .with_field(field("dirpw"))
            .with_field(field("swh"))
            .with_field(field("u"))
            .with_field(field("v"));
        let jobs = assemble_sources(&dataset, &[]);
        assert_eq!(
            names(&jobs),
            vec![
                vec!["wave_direction".to_string()],
                vec!["wave_height".to_string()],
                vec!["wind_direction".to_string()],
            ]
        );
        assert!(matches!(jobs[0], Ok(SourceVariable::Angular { .. })));
    }

    #[test]
    fn test_requested_filter_on_vector_pair() {
        let dataset = ProviderDataset::new(Provider::Copernicus)
            .with_field(field("uo"))
            .with_field(field("vo"))
            .with_field(field("zos"));
        let jobs = assemble_sources(&dataset, &["sea_current_speed".to_string()]);
        assert_eq!(jobs.len(), 1);
        match &jobs[0] {
            Ok(SourceVariable::VectorPair {
                direction,
                magnitude,
                ..
            }) => {
                assert_eq!(direction, &None);
                assert_eq!(magnitude.as_deref(), Some("sea_current_speed"));
            }
            other => panic!("unexpected job {:?}", other),
        }
    }

    #[test]
    fn test_half_vector_pair_is_error() {
        let dataset = ProviderDataset::new(Provider::Copernicus).with_field(field("eastward_wind"));
        let jobs = assemble_sources(&dataset, &[]);
        assert_eq!(
            jobs,
            vec![Err(ResamplerError::MissingComponent {
                pair: "eastward_wind/northward_wind".to_string(),
                component: "northward_wind".to_string(),
            })]
        );
    }

    #[test]
    fn test_unknown_variables_ignored() {
        let dataset = ProviderDataset::new(Provider::WaveWatch).with_field(field("tmp2m"));
        assert!(assemble_sources(&dataset, &[]).is_empty());
    }

    #[test]
    fn test_pair_outputs() {
        assert_eq!(
            pair_outputs(Provider::Copernicus, "uo"),
            vec!["sea_current_direction", "sea_current_speed"]
        );
        assert_eq!(pair_outputs(Provider::WaveWatch, "v"), vec!["wind_direction"]);
    }
}
