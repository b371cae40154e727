//! Historical data: the validated dataset, outlier filtering and synthetic samples.

pub mod dataset;
pub mod outliers;
pub mod sample;

pub use dataset::{
    DatasetStats, HistoricalDataset, Observation, RawObservation, TrainingRow, month_number,
};
pub use outliers::{OutlierBand, OutlierReport, filter_outliers};
pub use sample::{SampleSpec, generate_history};
