//! Discounted swaptions for every filtered cell, and the price matrices
//! computed over them.

use pricer_core::market_data::curves::YieldCurve;
use pricer_models::analytical::AnalyticalError;
use pricer_models::instruments::rates::{DiscountedSwaption, SwaptionSchedule};

use super::surface::FilteredGrid;
use crate::error::CalibrationError;

/// Prices per cell, one row per maturity.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PriceMatrix {
    values: Vec<Vec<f64>>,
}

impl PriceMatrix {
    /// Wrap row-major values.
    pub fn new(values: Vec<Vec<f64>>) -> Self {
        Self { values }
    }

    /// Rows of the matrix.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Value at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    /// Number of columns (zero for an empty matrix).
    pub fn cols(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// All values, row by row.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    /// Element-wise `self - other`.
    ///
    /// Both matrices must have the same shape.
    pub fn difference(&self, other: &PriceMatrix) -> PriceMatrix {
        PriceMatrix::new(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x - y).collect())
                .collect(),
        )
    }

    /// Sum of squared entries.
    pub fn sum_of_squares(&self) -> f64 {
        self.iter().map(|v| v * v).sum()
    }

    /// Largest absolute entry (zero for an empty matrix).
    pub fn max_abs(&self) -> f64 {
        self.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }
}

/// One [`DiscountedSwaption`] per filtered cell.
///
/// Schedules and discount factors depend only on the curve and the grid,
/// so they are built once per calibration and shared by the reference and
/// model pricers.
#[derive(Debug, Clone)]
pub struct SwaptionGrid {
    maturities: Vec<f64>,
    durations: Vec<f64>,
    tenor_step: f64,
    cells: Vec<Vec<DiscountedSwaption>>,
}

impl SwaptionGrid {
    /// Discount every cell of `grid` on `curve` with fixed-leg step `tenor_step`.
    ///
    /// # Errors
    ///
    /// `ReferencePricing` for the first cell whose schedule is invalid or
    /// whose annuity is degenerate.
    pub fn build<C>(
        curve: &C,
        grid: &FilteredGrid,
        tenor_step: f64,
    ) -> Result<Self, CalibrationError>
    where
        C: YieldCurve<f64> + ?Sized,
    {
        let cells = grid
            .maturities()
            .iter()
            .map(|&maturity| {
                grid.durations()
                    .iter()
                    .map(|&duration| {
                        discount_cell(curve, maturity, duration, tenor_step).map_err(|source| {
                            CalibrationError::ReferencePricing {
                                maturity,
                                duration,
                                source,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            maturities: grid.maturities().to_vec(),
            durations: grid.durations().to_vec(),
            tenor_step,
            cells,
        })
    }

    /// Cell maturities.
    pub fn maturities(&self) -> &[f64] {
        &self.maturities
    }

    /// Cell durations.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Fixed-leg payment step in years.
    pub fn tenor_step(&self) -> f64 {
        self.tenor_step
    }

    /// Discounted swaption at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> &DiscountedSwaption {
        &self.cells[i][j]
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.maturities.len() * self.durations.len()
    }

    /// True for a grid without cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `price` to every cell and collect the results into a matrix.
    ///
    /// `price` receives the row, the column and the cell. With the
    /// `parallel` feature rows are priced on the rayon pool; the output is
    /// identical either way.
    pub fn map_cells<F>(&self, price: F) -> Result<PriceMatrix, CalibrationError>
    where
        F: Fn(usize, usize, &DiscountedSwaption) -> Result<f64, CalibrationError> + Sync,
    {
        let price_row = |(i, row): (usize, &Vec<DiscountedSwaption>)| {
            row.iter()
                .enumerate()
                .map(|(j, cell)| price(i, j, cell))
                .collect::<Result<Vec<_>, _>>()
        };

        #[cfg(feature = "parallel")]
        let values = {
            use rayon::prelude::*;
            self.cells
                .par_iter()
                .enumerate()
                .map(price_row)
                .collect::<Result<Vec<_>, _>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let values = self
            .cells
            .iter()
            .enumerate()
            .map(price_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PriceMatrix::new(values))
    }
}

fn discount_cell<C>(
    curve: &C,
    maturity: f64,
    duration: f64,
    tenor_step: f64,
) -> Result<DiscountedSwaption, AnalyticalError>
where
    C: YieldCurve<f64> + ?Sized,
{
    let schedule = SwaptionSchedule::new(maturity, duration, tenor_step)?;
    DiscountedSwaption::new(curve, &schedule)
}
