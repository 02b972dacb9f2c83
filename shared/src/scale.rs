//! Axis domains for the price chart.
//!
//! Dates are placed on a continuous day axis (days since the common era) so
//! the renderer can work with plain `f64` coordinates. Price bounds are
//! rounded outward with the same step selection d3's linear scale uses.

use chrono::{Datelike, NaiveDate};

use crate::DataPoint;

/// Map a calendar date onto the day axis
pub fn date_to_axis(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`date_to_axis`], rounding to the nearest whole day
pub fn axis_to_date(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
}

/// Step between ticks for `count` ticks over `[start, stop]`.
///
/// Positive results are the step itself; negative results encode a step of
/// `1 / -result`, which keeps fractional steps free of float noise.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Widen `[start, stop]` outward to multiples of the tick step
pub fn nice_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let (mut start, mut stop) = if stop < start { (stop, start) } else { (start, stop) };
    if !(start.is_finite() && stop.is_finite()) || start == stop {
        return (start, stop);
    }

    let mut previous = None;
    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if previous == Some(step) {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }
    (start, stop)
}

/// Round tick values inside `[start, stop]`
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !(start.is_finite() && stop.is_finite()) || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let step = tick_increment(start, stop, count);
    if step > 0.0 {
        let first = (start / step).ceil() as i64;
        let last = (stop / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    } else if step < 0.0 {
        let inverse = -step;
        let first = (start * inverse).ceil() as i64;
        let last = (stop * inverse).floor() as i64;
        (first..=last).map(|i| i as f64 / inverse).collect()
    } else {
        Vec::new()
    }
}

/// Decimal places needed to print ticks spaced `step` apart
pub fn tick_precision(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    }
}

/// Value ranges of a non-empty filtered set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDomain {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Nice-rounded lower price bound
    pub y_min: f64,
    /// Nice-rounded upper price bound
    pub y_max: f64,
}

impl ChartDomain {
    /// Returns `None` for an empty set
    pub fn from_points(points: &[DataPoint], y_tick_count: usize) -> Option<Self> {
        let first_date = points.iter().map(|p| p.date).min()?;
        let last_date = points.iter().map(|p| p.date).max()?;
        let low = points.iter().map(DataPoint::low).fold(f64::INFINITY, f64::min);
        let high = points.iter().map(DataPoint::high).fold(f64::NEG_INFINITY, f64::max);

        // A flat series has no extent to round; give it one unit each side
        let (low, high) = if low == high { (low - 1.0, high + 1.0) } else { (low, high) };
        let (y_min, y_max) = nice_domain(low, high, y_tick_count);

        Some(Self {
            first_date,
            last_date,
            y_min,
            y_max,
        })
    }

    /// Day-axis range; a single day is padded by half a day so it lands mid-axis
    pub fn x_range(&self) -> (f64, f64) {
        let start = date_to_axis(self.first_date);
        let end = date_to_axis(self.last_date);
        if start == end {
            (start - 0.5, end + 0.5)
        } else {
            (start, end)
        }
    }

    /// One tick per calendar day between the first and last date
    pub fn day_ticks(&self) -> Vec<f64> {
        let start = date_to_axis(self.first_date) as i64;
        let end = date_to_axis(self.last_date) as i64;
        (start..=end).map(|day| day as f64).collect()
    }

    pub fn y_ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.y_min, self.y_max, count)
    }

    /// Decimal places for y tick labels
    pub fn y_precision(&self, count: usize) -> usize {
        let step = tick_increment(self.y_min, self.y_max, count);
        if step < 0.0 {
            tick_precision(-1.0 / step)
        } else {
            tick_precision(step)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tick_increment() {
        assert_eq!(tick_increment(0.0, 100.0, 10), 10.0);
        assert_eq!(tick_increment(101.3, 148.7, 10), 5.0);
        // 0.5 is encoded as its inverse
        assert_eq!(tick_increment(100.0, 105.0, 10), -2.0);
    }

    #[test]
    fn test_nice_domain_rounds_outward() {
        assert_eq!(nice_domain(101.3, 148.7, 10), (100.0, 150.0));
        assert_eq!(nice_domain(100.0, 105.0, 10), (100.0, 105.0));
        assert_eq!(nice_domain(0.12, 0.87, 10), (0.1, 0.9));
    }

    #[test]
    fn test_nice_domain_degenerate_inputs() {
        assert_eq!(nice_domain(5.0, 5.0, 10), (5.0, 5.0));
        let (start, stop) = nice_domain(f64::NAN, 1.0, 10);
        assert!(start.is_nan());
        assert_eq!(stop, 1.0);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(100.0, 150.0, 10), vec![100.0, 105.0, 110.0, 115.0, 120.0, 125.0, 130.0, 135.0, 140.0, 145.0, 150.0]);
        assert_eq!(ticks(100.0, 101.0, 5), vec![100.0, 100.2, 100.4, 100.6, 100.8, 101.0]);
        assert_eq!(ticks(3.0, 3.0, 10), vec![3.0]);
        assert!(ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_tick_precision() {
        assert_eq!(tick_precision(5.0), 0);
        assert_eq!(tick_precision(0.5), 1);
        assert_eq!(tick_precision(0.2), 1);
        assert_eq!(tick_precision(0.05), 2);
    }

    #[test]
    fn test_axis_round_trip() {
        let date = day(2023, 11, 1);
        assert_eq!(axis_to_date(date_to_axis(date)), Some(date));
        assert_eq!(axis_to_date(date_to_axis(date) + 0.4), Some(date));
        assert_eq!(axis_to_date(f64::NAN), None);
    }

    #[test]
    fn test_domain_uses_lowest_and_highest_of_open_and_close() {
        let points = vec![
            DataPoint::new("Apple", day(2023, 11, 2), 105.0, 103.0),
            DataPoint::new("Apple", day(2023, 11, 1), 100.0, 105.0),
        ];
        let domain = ChartDomain::from_points(&points, 10).unwrap();
        assert_eq!(domain.first_date, day(2023, 11, 1));
        assert_eq!(domain.last_date, day(2023, 11, 2));
        assert_eq!((domain.y_min, domain.y_max), (100.0, 105.0));
        assert_eq!(domain.day_ticks().len(), 2);
        assert_eq!(domain.y_precision(10), 1);
    }

    #[test]
    fn test_domain_of_empty_set_is_none() {
        assert!(ChartDomain::from_points(&[], 10).is_none());
    }

    #[test]
    fn test_single_point_domain_is_padded() {
        let points = vec![DataPoint::new("Meta", day(2023, 11, 3), 300.0, 300.0)];
        let domain = ChartDomain::from_points(&points, 10).unwrap();
        let (x0, x1) = domain.x_range();
        assert_eq!(x1 - x0, 1.0);
        assert_eq!((x0 + x1) / 2.0, date_to_axis(day(2023, 11, 3)));
        assert!(domain.y_min < 300.0 && domain.y_max > 300.0);
        assert_eq!(domain.day_ticks(), vec![date_to_axis(day(2023, 11, 3))]);
    }
}
