//! Per-request resampling.
//!
//! A [`RequestScope`] owns everything one request needs: the target grid slot,
//! the accumulated outputs and the per-variable reports. Provider datasets are
//! folded in one at a time; the first one that yields any job fixes the grid.
//!
//! ```text
//! ProviderDataset ──► assemble_sources ──► SourceVariable jobs
//!                                              │
//!                      GridSlot::merge ◄───────┤ (first job of first dataset)
//!                                              ▼
//!            ┌──────── per job (optionally on rayon) ────────┐
//!            │ spatial RBF ─► temporal trilinear  (values)    │
//!            │ spatial RBF ─► temporal trilinear  (indicator) │
//!            │ threshold indicator ─► blank values            │
//!            │ reconstruct angle / direction / magnitude      │
//!            └────────────────────────────────────────────────┘
//!                                              │
//!                                              ▼
//!                                       ResampledGrid
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let service = ResamplerService::new(ResamplerConfig::default())?;
//! let request = ResampleRequest::new(3600.0)
//!     .with_time(Extent::new(start, end))
//!     .with_variables(["wave_height", "sea_current_direction"]);
//! let output = service.resample(&request, &[wavewatch, copernicus])?;
//! let json = output.to_json()?;
//! ```

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::circular::{decompose_field, direction_field, magnitude_field, reconstruct_field};
use crate::config::{ResamplerConfig, SliceFailurePolicy};
use crate::error::{ResamplerError, Result};
use crate::merger::GridSlot;
use crate::missingness::{MissingMask, MissingnessPropagator};
use crate::planner::CoordinateGridPlanner;
use crate::spatial::{SliceStatus, SpatialInterpolator, SpatialPass};
use crate::temporal::interpolate_time;
use crate::types::{Axis, Extent, GridField, RawField, TargetGrid};
use crate::variables::{assemble_sources, pair_outputs, Provider, ProviderDataset, SourceVariable};

/// What the caller wants resampled.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleRequest {
    /// Requested time window; the first source's own time extent when absent.
    pub time: Option<Extent>,
    /// Target time step in seconds.
    pub interval_seconds: f64,
    /// Overrides the configured resolution for this request.
    pub resolution_deg: Option<f64>,
    /// Canonical output names; empty means everything available.
    pub variables: Vec<String>,
}

impl ResampleRequest {
    pub fn new(interval_seconds: f64) -> Self {
        Self {
            time: None,
            interval_seconds,
            resolution_deg: None,
            variables: Vec::new(),
        }
    }

    pub fn with_time(mut self, time: Extent) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_resolution(mut self, resolution_deg: f64) -> Self {
        self.resolution_deg = Some(resolution_deg);
        self
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    fn wants(&self, output: &str) -> bool {
        self.variables.is_empty() || self.variables.iter().any(|v| v == output)
    }
}

/// Counters for one resampling job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableReport {
    pub provider: Provider,
    pub outputs: Vec<String>,
    /// Slices fitted, summed over every resampled component.
    pub fitted_slices: usize,
    pub all_missing_slices: usize,
    pub failed_slices: usize,
    /// Target query points outside the source time range.
    pub extrapolated_points: usize,
    /// Present values blanked by the missingness threshold.
    pub masked_cells: usize,
}

impl VariableReport {
    fn new(provider: Provider, outputs: Vec<String>) -> Self {
        Self {
            provider,
            outputs,
            fitted_slices: 0,
            all_missing_slices: 0,
            failed_slices: 0,
            extrapolated_points: 0,
            masked_cells: 0,
        }
    }

    fn absorb(&mut self, pass: &SpatialPass) {
        self.fitted_slices += pass.count(|s| matches!(s, SliceStatus::Fitted { .. }));
        self.all_missing_slices += pass.count(|s| matches!(s, SliceStatus::AllMissing));
        self.failed_slices += pass.count(|s| matches!(s, SliceStatus::Failed(_)));
    }
}

/// Outputs dropped from the response, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmittedVariable {
    pub provider: Provider,
    pub outputs: Vec<String>,
    pub reason: String,
}

/// The assembled response: target axes plus one field per canonical output.
#[derive(Debug, Clone, Serialize)]
pub struct ResampledGrid {
    pub time: Axis,
    pub lat: Axis,
    pub lon: Axis,
    #[serde(flatten)]
    pub variables: BTreeMap<String, GridField>,
    #[serde(skip)]
    pub reports: Vec<VariableReport>,
    #[serde(skip)]
    pub omitted: Vec<OmittedVariable>,
}

impl ResampledGrid {
    pub fn get(&self, output: &str) -> Option<&GridField> {
        self.variables.get(output)
    }

    pub fn is_omitted(&self, output: &str) -> bool {
        self.omitted
            .iter()
            .any(|o| o.outputs.iter().any(|name| name == output))
    }

    /// Serialize as `{"time": [...], "lat": [...], "lon": [...], "<output>": [[[...]]]}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Resamples provider datasets onto a shared grid.
#[derive(Debug, Clone)]
pub struct ResamplerService {
    config: ResamplerConfig,
    propagator: MissingnessPropagator,
}

impl ResamplerService {
    /// Create a service from a validated configuration.
    pub fn new(config: ResamplerConfig) -> Result<Self> {
        config.validate().map_err(ResamplerError::Config)?;
        let propagator = MissingnessPropagator::new(config.land_threshold);
        Ok(Self { config, propagator })
    }

    pub fn config(&self) -> &ResamplerConfig {
        &self.config
    }

    /// Open a request scope.
    pub fn scope(&self, request: ResampleRequest) -> Result<RequestScope<'_>> {
        let resolution = request.resolution_deg.unwrap_or(self.config.resolution_deg);
        let planner = CoordinateGridPlanner::new(resolution, request.interval_seconds)?;
        Ok(RequestScope {
            service: self,
            request,
            planner,
            slot: GridSlot::new(),
            variables: BTreeMap::new(),
            reports: Vec::new(),
            omitted: Vec::new(),
        })
    }

    /// Resample every dataset, in order, for one request.
    pub fn resample(
        &self,
        request: &ResampleRequest,
        datasets: &[ProviderDataset],
    ) -> Result<ResampledGrid> {
        let mut scope = self.scope(request.clone())?;
        for dataset in datasets {
            scope.add_dataset(dataset)?;
        }
        Ok(scope.finish())
    }

    /// Run one job against an established grid.
    fn resample_variable(
        &self,
        provider: Provider,
        source: &SourceVariable,
        grid: &TargetGrid,
        spatial: &SpatialInterpolator,
    ) -> Result<(Vec<(String, GridField)>, VariableReport)> {
        let mut report = VariableReport::new(provider, source.outputs());

        if grid.is_empty() {
            warn!(
                outputs = ?report.outputs,
                shape = ?grid.shape(),
                "Empty target extent; skipping interpolation"
            );
            let fields = report
                .outputs
                .iter()
                .map(|name| (name.clone(), GridField::missing(grid.shape())))
                .collect();
            return Ok((fields, report));
        }

        let fields = match source {
            SourceVariable::Scalar { output, field } => {
                let mut values = self.resample_values(field, grid, spatial, &mut report)?;
                let mask = self.missing_mask(field, grid, spatial)?;
                report.masked_cells += mask.apply(&mut values);
                vec![(output.clone(), values)]
            }
            SourceVariable::Angular { output, field } => {
                let (cos, sin) = decompose_field(field);
                let cos = self.resample_values(&cos, grid, spatial, &mut report)?;
                let sin = self.resample_values(&sin, grid, spatial, &mut report)?;
                let mut angles = reconstruct_field(&cos, &sin);
                let mask = self.missing_mask(field, grid, spatial)?;
                report.masked_cells += mask.apply(&mut angles);
                vec![(output.clone(), angles)]
            }
            SourceVariable::VectorPair {
                east,
                north,
                direction,
                magnitude,
            } => {
                let mut e = self.resample_values(east, grid, spatial, &mut report)?;
                let mut n = self.resample_values(north, grid, spatial, &mut report)?;
                report.masked_cells += self.missing_mask(east, grid, spatial)?.apply(&mut e);
                report.masked_cells += self.missing_mask(north, grid, spatial)?.apply(&mut n);

                let mut fields = Vec::with_capacity(2);
                if let Some(name) = direction {
                    fields.push((name.clone(), direction_field(&e, &n)));
                }
                if let Some(name) = magnitude {
                    fields.push((name.clone(), magnitude_field(&e, &n)));
                }
                fields
            }
        };

        info!(
            provider = %provider,
            outputs = ?report.outputs,
            fitted = report.fitted_slices,
            all_missing = report.all_missing_slices,
            masked = report.masked_cells,
            "Resampled variable"
        );
        Ok((fields, report))
    }

    /// Spatial then temporal pass over the raw values.
    fn resample_values(
        &self,
        raw: &RawField,
        grid: &TargetGrid,
        spatial: &SpatialInterpolator,
        report: &mut VariableReport,
    ) -> Result<GridField> {
        let pass = spatial.interpolate_field(raw);
        report.absorb(&pass);
        self.check_failures(raw, &pass)?;
        let temporal = interpolate_time(raw.time(), &pass.field, grid);
        report.extrapolated_points += temporal.extrapolated;
        Ok(temporal.field)
    }

    /// The raw field's missing indicator pushed through the same path, thresholded.
    fn missing_mask(
        &self,
        raw: &RawField,
        grid: &TargetGrid,
        spatial: &SpatialInterpolator,
    ) -> Result<MissingMask> {
        let indicator = raw.missing_indicator();
        let pass = spatial.interpolate_field(&indicator);
        self.check_failures(&indicator, &pass)?;
        let temporal = interpolate_time(indicator.time(), &pass.field, grid);
        Ok(self.propagator.mask(&temporal.field))
    }

    fn check_failures(&self, raw: &RawField, pass: &SpatialPass) -> Result<()> {
        let Some((time_index, err)) = pass.first_failure() else {
            return Ok(());
        };
        match self.config.slice_failure {
            SliceFailurePolicy::OmitVariable => {
                Err(ResamplerError::interpolation(raw.name(), time_index, err.to_string()))
            }
            SliceFailurePolicy::FillMissing => {
                warn!(
                    field = raw.name(),
                    time_index,
                    error = %err,
                    "Filling failed slice with missing values"
                );
                Ok(())
            }
        }
    }
}

/// State for one request: the grid slot and everything produced so far.
#[derive(Debug)]
pub struct RequestScope<'a> {
    service: &'a ResamplerService,
    request: ResampleRequest,
    planner: CoordinateGridPlanner,
    slot: GridSlot,
    variables: BTreeMap<String, GridField>,
    reports: Vec<VariableReport>,
    omitted: Vec<OmittedVariable>,
}

impl RequestScope<'_> {
    /// The grid established so far, if any.
    pub fn grid(&self) -> Option<&TargetGrid> {
        self.slot.get()
    }

    /// Use a caller-built grid instead of planning one.
    ///
    /// Fails with [`ResamplerError::GridMismatch`] if a different grid is
    /// already in use for this request.
    pub fn adopt_grid(&mut self, grid: TargetGrid) -> Result<()> {
        self.slot.establish(grid).map(|_| ())
    }

    /// Resample one provider's dataset onto the request grid.
    ///
    /// Per-variable failures are recorded as omissions; only request-fatal
    /// errors are returned.
    pub fn add_dataset(&mut self, dataset: &ProviderDataset) -> Result<()> {
        let provider = dataset.provider;
        let mut jobs = Vec::new();
        for job in assemble_sources(dataset, &self.request.variables) {
            match job {
                Ok(source) => jobs.push(source),
                Err(err) => {
                    let outputs = self.outputs_for_error(provider, &err);
                    self.omit(provider, outputs, err);
                }
            }
        }

        if jobs.is_empty() {
            debug!(provider = %provider, "No requested variables in dataset");
            return Ok(());
        }

        let mut extent = jobs[0].reference_field().extent();
        if let Some(time) = self.request.time {
            extent.time = time;
        }
        let grid = self.slot.merge(&extent, &self.planner).clone();
        let spatial = SpatialInterpolator::new(&grid, self.service.config.singularity_tolerance);

        let service = self.service;
        let results: Vec<_> = if service.config.parallel_variables {
            jobs.par_iter()
                .map(|job| service.resample_variable(provider, job, &grid, &spatial))
                .collect()
        } else {
            jobs.iter()
                .map(|job| service.resample_variable(provider, job, &grid, &spatial))
                .collect()
        };

        for (job, result) in jobs.iter().zip(results) {
            match result {
                Ok((fields, report)) => {
                    for (name, field) in fields {
                        if self.variables.contains_key(&name) {
                            warn!(
                                provider = %provider,
                                output = %name,
                                "Overwriting output from an earlier provider"
                            );
                        }
                        self.variables.insert(name, field);
                    }
                    self.reports.push(report);
                }
                Err(err) if err.is_request_fatal() => return Err(err),
                Err(err) => self.omit(provider, job.outputs(), err),
            }
        }

        Ok(())
    }

    /// Close the scope and assemble the response.
    pub fn finish(self) -> ResampledGrid {
        let (time, lat, lon) = match self.slot.into_inner() {
            Some(grid) => (grid.time().clone(), grid.lat().clone(), grid.lon().clone()),
            None => (Axis::empty(), Axis::empty(), Axis::empty()),
        };
        ResampledGrid {
            time,
            lat,
            lon,
            variables: self.variables,
            reports: self.reports,
            omitted: self.omitted,
        }
    }

    fn outputs_for_error(&self, provider: Provider, err: &ResamplerError) -> Vec<String> {
        match err {
            ResamplerError::MissingComponent { component, .. } => pair_outputs(provider, component)
                .into_iter()
                .filter(|o| self.request.wants(o))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn omit(&mut self, provider: Provider, outputs: Vec<String>, err: ResamplerError) {
        warn!(provider = %provider, outputs = ?outputs, error = %err, "Omitting variable");
        self.omitted.push(OmittedVariable {
            provider,
            outputs,
            reason: err.to_string(),
        });
    }
}
