//! Core types for grid resampling.

use chrono::{DateTime, TimeZone, Utc};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ResamplerError, Result};

/// An ordered, strictly increasing sequence of coordinate values.
///
/// Used for latitude and longitude (degrees) and time (epoch seconds).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Axis {
    values: Vec<f64>,
}

impl Axis {
    /// Create an axis, rejecting non-finite or non-increasing values.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        for (index, v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(ResamplerError::UnsortedAxis { index });
            }
            if index > 0 && values[index - 1] >= *v {
                return Err(ResamplerError::UnsortedAxis { index });
            }
        }
        Ok(Self { values })
    }

    /// Wrap values already known to be strictly increasing.
    pub(crate) fn from_sorted(values: Vec<f64>) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        Self { values }
    }

    /// An axis with no coordinates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single-coordinate axis.
    pub fn single(value: f64) -> Self {
        Self {
            values: vec![value],
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }


    /// The (first, last) extent of the axis. Empty axes yield an empty extent.
    pub fn extent(&self) -> Extent {
        match (self.first(), self.last()) {
            (Some(start), Some(end)) => Extent::new(start, end),
            _ => Extent::EMPTY,
        }
    }

}

impl TryFrom<Vec<f64>> for Axis {
    type Error = ResamplerError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

/// A closed coordinate range. `end < start` denotes an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub start: f64,
    pub end: f64,
}

impl Extent {
    /// The canonical empty extent.
    pub const EMPTY: Extent = Extent {
        start: 0.0,
        end: -1.0,
    };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Build a time extent in epoch seconds from two UTC instants.
    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start.timestamp() as f64, end.timestamp() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Start and end coincide; the planned axis is that single value.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

}

/// Extents of one provider's raw coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceExtent {
    pub lat: Extent,
    pub lon: Extent,
    pub time: Extent,
}

/// One variable's raw samples from one provider, indexed `[time][lat][lon]`.
///
/// Missing observations are `None`. The fetch layer hands over NaN-sentinel
/// arrays; [`RawField::new`] converts them on entry so no NaN travels further.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFieldRepr")]
pub struct RawField {
    name: String,
    time: Axis,
    lat: Axis,
    lon: Axis,
    data: Vec<Option<f64>>,
}

impl RawField {
    /// Create a field from NaN-sentinel values in `[time][lat][lon]` row-major order.
    pub fn new(
        name: impl Into<String>,
        time: Axis,
        lat: Axis,
        lon: Axis,
        values: Vec<f64>,
    ) -> Result<Self> {
        let data = values
            .into_iter()
            .map(|v| if v.is_finite() { Some(v) } else { None })
            .collect();
        Self::from_options(name, time, lat, lon, data)
    }

    /// Create a field from explicit optional values.
    pub fn from_options(
        name: impl Into<String>,
        time: Axis,
        lat: Axis,
        lon: Axis,
        data: Vec<Option<f64>>,
    ) -> Result<Self> {
        let name = name.into();
        let expected = time.len() * lat.len() * lon.len();
        if data.len() != expected {
            return Err(ResamplerError::shape_mismatch(name, expected, data.len()));
        }
        Ok(Self {
            name,
            time,
            lat,
            lon,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> &Axis {
        &self.time
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    /// (time, lat, lon) dimensions.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }

    pub fn data(&self) -> &[Option<f64>] {
        &self.data
    }

    /// The `[lat][lon]` plane at one time index.
    pub fn slice(&self, t: usize) -> &[Option<f64>] {
        let plane = self.lat.len() * self.lon.len();
        &self.data[t * plane..(t + 1) * plane]
    }

    pub fn extent(&self) -> SourceExtent {
        SourceExtent {
            lat: self.lat.extent(),
            lon: self.lon.extent(),
            time: self.time.extent(),
        }
    }

    /// Number of present samples.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }

    /// A new field on the same axes with every present value transformed.
    pub fn map_values(&self, name: impl Into<String>, f: impl Fn(f64) -> f64) -> RawField {
        RawField {
            name: name.into(),
            time: self.time.clone(),
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            data: self.data.iter().map(|v| v.map(&f)).collect(),
        }
    }

    /// A fully populated field that is 1.0 where this field is missing and 0.0 elsewhere.
    pub fn missing_indicator(&self) -> RawField {
        RawField {
            name: format!("{}_missing", self.name),
            time: self.time.clone(),
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            data: self
                .data
                .iter()
                .map(|v| Some(if v.is_some() { 0.0 } else { 1.0 }))
                .collect(),
        }
    }
}

/// Nested-array wire shape for [`RawField`].
#[derive(Debug, Deserialize)]
struct RawFieldRepr {
    name: String,
    time: Vec<f64>,
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Vec<Vec<Vec<Option<f64>>>>,
}

impl TryFrom<RawFieldRepr> for RawField {
    type Error = ResamplerError;

    fn try_from(repr: RawFieldRepr) -> Result<Self> {
        let (nt, ny, nx) = (repr.time.len(), repr.lat.len(), repr.lon.len());
        let shape_ok = repr.values.len() == nt
            && repr
                .values
                .iter()
                .all(|plane| plane.len() == ny && plane.iter().all(|row| row.len() == nx));
        if !shape_ok {
            let actual = repr.values.iter().flatten().map(Vec::len).sum();
            return Err(ResamplerError::shape_mismatch(repr.name, nt * ny * nx, actual));
        }
        let data = repr
            .values
            .into_iter()
            .flatten()
            .flatten()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        RawField::from_options(
            repr.name,
            Axis::new(repr.time)?,
            Axis::new(repr.lat)?,
            Axis::new(repr.lon)?,
            data,
        )
    }
}

/// The shared output coordinate system for one request.
///
/// Fields are private: once built, a grid cannot be altered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetGrid {
    time: Axis,
    lat: Axis,
    lon: Axis,
}

impl TargetGrid {
    pub fn new(time: Axis, lat: Axis, lon: Axis) -> Self {
        Self { time, lat, lon }
    }

    pub fn time(&self) -> &Axis {
        &self.time
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    /// (time, lat, lon) dimensions.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }

    /// True when any axis has zero length.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty() || self.lat.is_empty() || self.lon.is_empty()
    }

    /// Time axis as UTC instants (sub-second parts are truncated).
    pub fn time_as_datetimes(&self) -> Vec<DateTime<Utc>> {
        self.time
            .values()
            .iter()
            .filter_map(|&t| Utc.timestamp_opt(t as i64, 0).single())
            .collect()
    }
}

/// A dense `[time][lat][lon]` array with explicit missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    shape: (usize, usize, usize),
    data: Vec<Option<f64>>,
}

impl GridField {
    /// A field where every cell is missing.
    pub fn missing(shape: (usize, usize, usize)) -> Self {
        Self {
            shape,
            data: vec![None; shape.0 * shape.1 * shape.2],
        }
    }

    pub(crate) fn from_vec(shape: (usize, usize, usize), data: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(data.len(), shape.0 * shape.1 * shape.2);
        Self { shape, data }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[Option<f64>] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [Option<f64>] {
        &mut self.data
    }

    fn index(&self, t: usize, i: usize, j: usize) -> usize {
        (t * self.shape.1 + i) * self.shape.2 + j
    }

    /// Value at (time, lat, lon) indices; `None` when missing or out of range.
    pub fn get(&self, t: usize, i: usize, j: usize) -> Option<f64> {
        if t >= self.shape.0 || i >= self.shape.1 || j >= self.shape.2 {
            return None;
        }
        self.data[self.index(t, i, j)]
    }

    /// Overwrite the `[lat][lon]` plane at one time index.
    pub(crate) fn set_slice(&mut self, t: usize, values: &[Option<f64>]) {
        let plane = self.shape.1 * self.shape.2;
        self.data[t * plane..(t + 1) * plane].copy_from_slice(values);
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_none()).count()
    }

    /// Combine two same-shaped fields cell by cell; missing if either side is.
    pub fn zip_with(&self, other: &GridField, f: impl Fn(f64, f64) -> f64) -> GridField {
        debug_assert_eq!(self.shape, other.shape);
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                _ => None,
            })
            .collect();
        GridField::from_vec(self.shape, data)
    }
}

impl Serialize for GridField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (nt, ny, nx) = self.shape;
        let plane = ny * nx;
        let mut seq = serializer.serialize_seq(Some(nt))?;
        for t in 0..nt {
            let rows: Vec<&[Option<f64>]> = if nx == 0 {
                vec![&[][..]; ny]
            } else {
                self.data[t * plane..(t + 1) * plane].chunks(nx).collect()
            };
            seq.serialize_element(&rows)?;
        }
        seq.end()
    }
}
