//! Volatility surface and the filter that selects calibration instruments.

use crate::error::CalibrationError;

/// Market swaption volatilities on a maturity × duration grid.
///
/// Row `i` holds the quotes for `maturities[i]`, column `j` those for
/// `durations[j]`. The shape is checked once here, so every later stage can
/// index the matrix freely.
///
/// # Example
///
/// ```
/// use pricer_optimiser::calibration::VolatilitySurface;
///
/// let surface = VolatilitySurface::new(
///     vec![1.0, 5.0],
///     vec![2.0, 10.0],
///     vec![vec![0.20, 0.18], vec![0.17, 0.15]],
/// )
/// .unwrap();
/// assert_eq!(surface.volatility(1, 0), 0.17);
///
/// // Three durations for a two-column matrix
/// assert!(VolatilitySurface::new(vec![1.0], vec![1.0, 2.0, 3.0], vec![vec![0.2, 0.2]]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SurfaceFields"))]
pub struct VolatilitySurface {
    maturities: Vec<f64>,
    durations: Vec<f64>,
    volatilities: Vec<Vec<f64>>,
}

impl VolatilitySurface {
    /// Build a surface, checking the matrix has one row per maturity and one
    /// column per duration.
    pub fn new(
        maturities: Vec<f64>,
        durations: Vec<f64>,
        volatilities: Vec<Vec<f64>>,
    ) -> Result<Self, CalibrationError> {
        if volatilities.len() != maturities.len() {
            return Err(CalibrationError::InvalidSurface(format!(
                "{} volatility rows for {} maturities",
                volatilities.len(),
                maturities.len()
            )));
        }
        if let Some((i, row)) = volatilities
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != durations.len())
        {
            return Err(CalibrationError::InvalidSurface(format!(
                "row {} has {} volatilities for {} durations",
                i,
                row.len(),
                durations.len()
            )));
        }

        Ok(Self {
            maturities,
            durations,
            volatilities,
        })
    }

    /// Option maturities (rows).
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Swap durations (columns).
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Volatility matrix, row-major.
    pub fn volatilities(&self) -> &[Vec<f64>] {
        &self.volatilities
    }

    /// Volatility at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of range.
    pub fn volatility(&self, i: usize, j: usize) -> f64 {
        self.volatilities[i][j]
    }
}

/// Unchecked wire form; deserialising goes through [`VolatilitySurface::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SurfaceFields {
    maturities: Vec<f64>,
    durations: Vec<f64>,
    volatilities: Vec<Vec<f64>>,
}

#[cfg(feature = "serde")]
impl TryFrom<SurfaceFields> for VolatilitySurface {
    type Error = CalibrationError;

    fn try_from(fields: SurfaceFields) -> Result<Self, Self::Error> {
        Self::new(fields.maturities, fields.durations, fields.volatilities)
    }
}

/// Inclusive maturity and duration bounds.
///
/// The default admits every instrument. Inverted bounds are not an error;
/// they simply let nothing through.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterCriteria {
    /// Smallest maturity kept.
    pub min_maturity: f64,
    /// Largest maturity kept.
    pub max_maturity: f64,
    /// Smallest duration kept.
    pub min_duration: f64,
    /// Largest duration kept.
    pub max_duration: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_maturity: f64::MIN,
            max_maturity: f64::MAX,
            min_duration: f64::MIN,
            max_duration: f64::MAX,
        }
    }
}

impl FilterCriteria {
    /// Create criteria from the four bounds.
    pub fn new(min_maturity: f64, max_maturity: f64, min_duration: f64, max_duration: f64) -> Self {
        Self {
            min_maturity,
            max_maturity,
            min_duration,
            max_duration,
        }
    }

    /// Whether `maturity` lies within the maturity bounds.
    #[inline]
    pub fn admits_maturity(&self, maturity: f64) -> bool {
        self.min_maturity <= maturity && maturity <= self.max_maturity
    }

    /// Whether `duration` lies within the duration bounds.
    #[inline]
    pub fn admits_duration(&self, duration: f64) -> bool {
        self.min_duration <= duration && duration <= self.max_duration
    }
}

/// Sub-grid that survived filtering.
///
/// Keeps the input order of rows and columns. Either axis may be empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilteredGrid {
    maturities: Vec<f64>,
    durations: Vec<f64>,
    volatilities: Vec<Vec<f64>>,
}

impl FilteredGrid {
    /// Surviving maturities.
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Surviving durations.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Surviving volatilities, one row per maturity.
    pub fn volatilities(&self) -> &[Vec<f64>] {
        &self.volatilities
    }

    /// Volatility at row `i`, column `j`.
    pub fn volatility(&self, i: usize, j: usize) -> f64 {
        self.volatilities[i][j]
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.maturities.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.durations.len()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    /// True when no cell survived.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(maturity, duration, volatility)` for every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.maturities
            .iter()
            .zip(&self.volatilities)
            .flat_map(move |(&m, row)| {
                self.durations
                    .iter()
                    .zip(row)
                    .map(move |(&d, &v)| (m, d, v))
            })
    }
}

/// Selects the calibration instruments from a surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceFilter;

impl SurfaceFilter {
    /// Keep the rows whose maturity and the columns whose duration satisfy
    /// `criteria`.
    ///
    /// An empty result is returned as an empty grid, not an error.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_optimiser::calibration::{FilterCriteria, SurfaceFilter, VolatilitySurface};
    ///
    /// let surface = VolatilitySurface::new(
    ///     vec![1.0, 5.0, 10.0],
    ///     vec![1.0, 5.0],
    ///     vec![vec![0.3, 0.2], vec![0.25, 0.18], vec![0.2, 0.15]],
    /// )
    /// .unwrap();
    ///
    /// let grid = SurfaceFilter::filter(&surface, &FilterCriteria::new(2.0, 10.0, 5.0, 5.0));
    /// assert_eq!(grid.maturities(), &[5.0, 10.0]);
    /// assert_eq!(grid.durations(), &[5.0]);
    /// assert_eq!(grid.volatilities(), &[vec![0.18], vec![0.15]]);
    /// ```
    pub fn filter(surface: &VolatilitySurface, criteria: &FilterCriteria) -> FilteredGrid {
        let rows: Vec<usize> = (0..surface.maturities.len())
            .filter(|&i| criteria.admits_maturity(surface.maturities[i]))
            .collect();
        let cols: Vec<usize> = (0..surface.durations.len())
            .filter(|&j| criteria.admits_duration(surface.durations[j]))
            .collect();

        FilteredGrid {
            maturities: rows.iter().map(|&i| surface.maturities[i]).collect(),
            durations: cols.iter().map(|&j| surface.durations[j]).collect(),
            volatilities: rows
                .iter()
                .map(|&i| cols.iter().map(|&j| surface.volatilities[i][j]).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn surface_3x3() -> VolatilitySurface {
        VolatilitySurface::new(
            vec![1.0, 2.0, 5.0],
            vec![1.0, 5.0, 10.0],
            vec![
                vec![0.11, 0.12, 0.13],
                vec![0.21, 0.22, 0.23],
                vec![0.51, 0.52, 0.53],
            ],
        )
        .unwrap()
    }

    // ========================================
    // Surface Construction Tests
    // ========================================

    #[test]
    fn test_surface_rejects_row_count_mismatch() {
        let err = VolatilitySurface::new(vec![1.0, 2.0], vec![1.0], vec![vec![0.2]]).unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidSurface(_)));
    }

    #[test]
    fn test_surface_rejects_ragged_rows() {
        let err = VolatilitySurface::new(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![vec![0.2, 0.2], vec![0.2]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_empty_surface_is_valid() {
        let surface = VolatilitySurface::new(vec![], vec![1.0], vec![]).unwrap();
        assert!(SurfaceFilter::filter(&surface, &FilterCriteria::default()).is_empty());
    }

    // ========================================
    // Filter Tests
    // ========================================

    #[test]
    fn test_default_criteria_keep_everything() {
        let surface = surface_3x3();
        let grid = SurfaceFilter::filter(&surface, &FilterCriteria::default());
        assert_eq!(grid.maturities(), surface.maturities());
        assert_eq!(grid.durations(), surface.durations());
        assert_eq!(grid.volatilities(), surface.volatilities());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let grid = SurfaceFilter::filter(&surface_3x3(), &FilterCriteria::new(2.0, 5.0, 1.0, 5.0));
        assert_eq!(grid.maturities(), &[2.0, 5.0]);
        assert_eq!(grid.durations(), &[1.0, 5.0]);
        assert_eq!(grid.volatility(1, 1), 0.52);
    }

    #[test]
    fn test_non_contiguous_selection_keeps_order() {
        let surface = VolatilitySurface::new(
            vec![5.0, 1.0, 7.0],
            vec![1.0],
            vec![vec![0.5], vec![0.1], vec![0.7]],
        )
        .unwrap();
        let grid = SurfaceFilter::filter(&surface, &FilterCriteria::new(4.0, 8.0, 0.0, 2.0));
        assert_eq!(grid.maturities(), &[5.0, 7.0]);
        assert_eq!(grid.volatilities(), &[vec![0.5], vec![0.7]]);
    }

    #[test]
    fn test_no_maturity_survives() {
        let criteria = FilterCriteria::new(20.0, 30.0, 0.0, 30.0);
        let grid = SurfaceFilter::filter(&surface_3x3(), &criteria);
        assert!(grid.is_empty());
        assert_eq!(grid.rows(), 0);
        assert!(grid.volatilities().is_empty());
    }

    #[test]
    fn test_no_duration_survives() {
        let grid = SurfaceFilter::filter(&surface_3x3(), &FilterCriteria::new(0.0, 30.0, 2.0, 3.0));
        assert!(grid.is_empty());
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 0);
        assert!(grid.volatilities().iter().all(|row| row.is_empty()));
    }

    #[test]
    fn test_inverted_bounds_give_empty_grid() {
        let grid = SurfaceFilter::filter(&surface_3x3(), &FilterCriteria::new(5.0, 1.0, 1.0, 10.0));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_cells_iterate_row_major() {
        let grid = SurfaceFilter::filter(&surface_3x3(), &FilterCriteria::new(1.0, 2.0, 5.0, 10.0));
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(
            cells,
            vec![(1.0, 5.0, 0.12), (1.0, 10.0, 0.13), (2.0, 5.0, 0.22), (2.0, 10.0, 0.23)]
        );
    }

    // ========================================
    // Property Tests
    // ========================================

    fn surface_strategy() -> impl Strategy<Value = VolatilitySurface> {
        (
            prop::collection::vec(0.0f64..30.0, 0..6),
            prop::collection::vec(0.0f64..30.0, 0..6),
        )
            .prop_map(|(maturities, durations)| {
                let volatilities = maturities
                    .iter()
                    .map(|m| durations.iter().map(|d| 0.01 * (m + d)).collect())
                    .collect();
                VolatilitySurface {
                    maturities,
                    durations,
                    volatilities,
                }
            })
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialise_checks_shape() {
        let ragged = r#"{"maturities":[5.0,6.0],"durations":[5.0],"volatilities":[[0.2]]}"#;
        let err = serde_json::from_str::<VolatilitySurface>(ragged).unwrap_err();
        assert!(err.to_string().contains("volatility rows"));

        let valid = r#"{"maturities":[5.0],"durations":[5.0],"volatilities":[[0.2]]}"#;
        let surface: VolatilitySurface = serde_json::from_str(valid).unwrap();
        assert_eq!(surface.volatility(0, 0), 0.2);
    }

    proptest! {
        #[test]
        fn test_filter_cells_within_bounds(
            surface in surface_strategy(),
            min_m in 0.0f64..30.0,
            span_m in -5.0f64..30.0,
            min_d in 0.0f64..30.0,
            span_d in -5.0f64..30.0,
        ) {
            let criteria = FilterCriteria::new(min_m, min_m + span_m, min_d, min_d + span_d);
            let grid = SurfaceFilter::filter(&surface, &criteria);

            prop_assert_eq!(grid.cells().count(), grid.rows() * grid.cols());
            prop_assert_eq!(grid.volatilities().len(), grid.rows());
            for (m, d, v) in grid.cells() {
                prop_assert!(criteria.admits_maturity(m));
                prop_assert!(criteria.admits_duration(d));
                prop_assert_eq!(v, 0.01 * (m + d));
            }

            let expected_rows = surface
                .maturities()
                .iter()
                .filter(|&&m| criteria.admits_maturity(m))
                .count();
            prop_assert_eq!(grid.rows(), expected_rows);
        }
    }
}
