use crate::DataPoint;

/// Text shown when the pointer rests on a point marker
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub date: String,
    pub open: String,
    pub close: String,
    pub diff: String,
}

impl Tooltip {
    pub fn for_point(point: &DataPoint) -> Self {
        Self {
            date: point.date.format("%-m/%-d/%Y").to_string(),
            open: format!("{:.2}", point.open),
            close: format!("{:.2}", point.close),
            diff: format!("{:.2}", point.diff()),
        }
    }

    /// One entry per tooltip row
    pub fn lines(&self) -> [String; 4] {
        [
            format!("Date: {}", self.date),
            format!("Open: {}", self.open),
            format!("Close: {}", self.close),
            format!("Diff: {}", self.diff),
        ]
    }
}
