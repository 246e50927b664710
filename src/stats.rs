use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::models::Reading;

/// Aggregate temperature statistics over a window of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TempStats {
    /// Arithmetic mean.
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub count: usize,
}

/// Compute average/min/max over the `temperature` field.
///
/// `None` means "no data": callers must handle the empty window explicitly
/// (the API maps it to 404, the dashboard to a placeholder state). Never
/// produces NaN from an empty input.
pub fn stats(readings: &[Reading]) -> Option<TempStats> {
    if readings.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    let mut highest = f64::NEG_INFINITY;
    let mut lowest = f64::INFINITY;
    for r in readings {
        sum += r.temperature;
        highest = highest.max(r.temperature);
        lowest = lowest.min(r.temperature);
    }

    Some(TempStats {
        average: sum / readings.len() as f64,
        highest,
        lowest,
        count: readings.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64) -> Reading {
        Reading::new(temperature, None)
    }

    #[test]
    fn empty_input_signals_no_data() {
        assert_eq!(stats(&[]), None);
    }

    #[test]
    fn two_readings() {
        let got = stats(&[reading(30.0), reading(40.0)]).unwrap();
        assert_eq!(got.average, 35.0);
        assert_eq!(got.highest, 40.0);
        assert_eq!(got.lowest, 30.0);
        assert_eq!(got.count, 2);
    }

    #[test]
    fn single_reading_is_its_own_extremes() {
        let got = stats(&[reading(21.5)]).unwrap();
        assert_eq!(got.average, 21.5);
        assert_eq!(got.highest, 21.5);
        assert_eq!(got.lowest, 21.5);
        assert_eq!(got.count, 1);
    }

    #[test]
    fn negative_temperatures() {
        let got = stats(&[reading(-5.0), reading(5.0), reading(0.0)]).unwrap();
        assert_eq!(got.average, 0.0);
        assert_eq!(got.highest, 5.0);
        assert_eq!(got.lowest, -5.0);
    }
}
