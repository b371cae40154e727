//! Model fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate the coefficient grid searched by the seasonal model
//! - fit one trend model per metric and predict the horizon

pub mod coef_grid;
pub mod fitter;

pub use coef_grid::*;
pub use fitter::*;
