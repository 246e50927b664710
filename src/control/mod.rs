mod service;

pub use service::{SprayAlert, ThresholdController};
