//! Business-rule corrections applied to raw model output.
//!
//! Corrections work on `DraftPoint`s: the mutable, floating-point form of a
//! forecast point that exists only while the pipeline assembles a series.

use chrono::NaiveDate;

use crate::domain::Metric;

pub mod fifteenth;
pub mod floor;

pub use fifteenth::*;
pub use floor::*;

/// A forecast point under construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftPoint {
    pub date: NaiveDate,
    pub checks: f64,
    pub avg_check: f64,
    pub total_sales: f64,
}

impl DraftPoint {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Checks => self.checks,
            Metric::AvgCheck => self.avg_check,
            Metric::TotalSales => self.total_sales,
        }
    }

    pub fn value_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::Checks => &mut self.checks,
            Metric::AvgCheck => &mut self.avg_check,
            Metric::TotalSales => &mut self.total_sales,
        }
    }
}
