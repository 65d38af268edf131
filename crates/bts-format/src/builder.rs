//! Builder for constructing timeseries records

use crate::dtype::Sample;
use crate::error::Result;
use crate::scaling::Scaling;
use crate::timebase::{TimeValue, Timebase};
use crate::timeseries::Timeseries;
use crate::values::Samples;

/// Builder for constructing `Timeseries` instances
///
/// Defaults: `long` timebase with t0 0 and dt 1, scaling disabled, no
/// samples (`double`).
#[derive(Debug, Clone)]
pub struct TimeseriesBuilder {
    timebase: Timebase,
    scaling: Scaling,
    samples: Samples,
}

impl TimeseriesBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            timebase: Timebase::Long { t0: 0, dt: 1 },
            scaling: Scaling::Disabled,
            samples: Samples::Double(Vec::new()),
        }
    }

    /// Set the reference time and sample interval
    #[must_use]
    pub fn timebase<T: TimeValue>(mut self, t0: T, dt: T) -> Self {
        self.timebase = Timebase::new(t0, dt);
        self
    }

    /// Record linear scaling `raw * scale + offset`
    #[must_use]
    pub fn scaling<T: Sample>(mut self, offset: T, scale: T) -> Self {
        self.scaling = Scaling::linear(offset, scale);
        self
    }

    /// Drop any recorded scaling
    #[must_use]
    pub fn no_scaling(mut self) -> Self {
        self.scaling = Scaling::Disabled;
        self
    }

    /// Set the raw samples
    #[must_use]
    pub fn samples<T: Sample>(mut self, values: Vec<T>) -> Self {
        self.samples = Samples::from_vec(values);
        self
    }

    /// Build the final `Timeseries`
    pub fn build(self) -> Result<Timeseries> {
        let series = Timeseries {
            timebase: self.timebase,
            scaling: self.scaling,
            samples: self.samples,
        };
        series.validate()?;
        Ok(series)
    }
}

impl Default for TimeseriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dtype::DataType;
    use crate::error::TimeseriesError;

    #[test]
    fn test_builder_defaults() {
        let series = TimeseriesBuilder::new().build().expect("Should build with defaults");
        assert_eq!(series.timebase, Timebase::Long { t0: 0, dt: 1 });
        assert_eq!(series.scaling, Scaling::Disabled);
        assert_eq!(series.samples.dtype(), DataType::Double);
        assert!(series.is_empty());
    }

    #[test]
    fn test_builder_round_trip() {
        let series = Timeseries::builder()
            .timebase(-99_000_000i64, 500)
            .scaling(0.0f64, 1.0e-3)
            .samples(vec![1i16, -1, i16::MAX, i16::MIN])
            .build()
            .expect("Should build");

        let data = series.build().expect("Should encode");
        let parsed = Timeseries::parse(&data).expect("Should parse");
        assert_eq!(parsed, series);
    }

    #[test]
    fn test_no_scaling_resets() {
        let series = TimeseriesBuilder::default()
            .scaling(1i8, 2i8)
            .no_scaling()
            .build()
            .unwrap();
        assert!(!series.scaling.is_enabled());
    }

    #[test]
    fn test_builder_rejects_zero_dt() {
        assert!(matches!(
            TimeseriesBuilder::new().timebase(0.0f64, 0.0).build(),
            Err(TimeseriesError::InvalidTimebase(_))
        ));
        assert!(TimeseriesBuilder::new().timebase(5i64, 0).build().is_err());
    }
}
