//! Small aggregation helpers shared by the dashboard reports.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

/// Chart-ready series: parallel label and count arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Frequency counter that keeps labels in first-seen order.
#[derive(Debug, Default)]
pub struct Tally {
    positions: HashMap<String, usize>,
    series: Series,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: impl Into<String>) {
        let label = label.into();
        match self.positions.get(&label) {
            Some(&idx) => self.series.values[idx] += 1,
            None => {
                self.positions.insert(label.clone(), self.series.labels.len());
                self.series.labels.push(label);
                self.series.values.push(1);
            }
        }
    }

    pub fn count(&self, label: &str) -> u64 {
        self.positions
            .get(label)
            .map(|&idx| self.series.values[idx])
            .unwrap_or(0)
    }

    pub fn into_series(self) -> Series {
        self.series
    }
}

impl<S: Into<String>> FromIterator<S> for Tally {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for label in iter {
            tally.add(label);
        }
        tally
    }
}

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Numeric value of a JSON number or numeric string.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty string content of a JSON value.
pub fn text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Loose truthiness: null, `false`, zero, empty strings and empty
/// containers are all "absent".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Tally of the non-empty string values of `field` across `records`.
pub fn tally_field(records: &[Value], field: &str) -> Tally {
    records
        .iter()
        .filter_map(|r| r.get(field).and_then(text))
        .collect()
}

/// Count of `values` equal to any of `targets`, ignoring case.
pub fn count_any_of<'a>(values: impl IntoIterator<Item = &'a str>, targets: &[&str]) -> u64 {
    values
        .into_iter()
        .filter(|v| {
            let v = v.to_lowercase();
            targets.iter().any(|t| t.to_lowercase() == v)
        })
        .count() as u64
}

/// Sale-price ranges, upper bound inclusive.
pub const PRICE_RANGES: [(&str, f64); 5] = [
    ("Up to R$ 100k", 100_000.0),
    ("R$ 100k - 300k", 300_000.0),
    ("R$ 300k - 500k", 500_000.0),
    ("R$ 500k - 1M", 1_000_000.0),
    ("Over R$ 1M", f64::INFINITY),
];

/// Bucket prices into [`PRICE_RANGES`]. Every range is present, even empty.
pub fn price_ranges(prices: &[f64]) -> Series {
    let mut values = vec![0u64; PRICE_RANGES.len()];
    for &price in prices {
        let idx = PRICE_RANGES
            .iter()
            .position(|&(_, upper)| price <= upper)
            .unwrap_or(PRICE_RANGES.len() - 1);
        values[idx] += 1;
    }
    Series {
        labels: PRICE_RANGES.iter().map(|(l, _)| l.to_string()).collect(),
        values,
    }
}

/// Years grouped by decade, ascending, labelled like `1990s`.
pub fn decades(years: &[i64]) -> Series {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for &year in years {
        *buckets.entry(year.div_euclid(10) * 10).or_default() += 1;
    }
    let (labels, values) = buckets
        .into_iter()
        .map(|(decade, count)| (format!("{decade}s"), count))
        .unzip();
    Series { labels, values }
}

/// Garage counts sorted ascending, labelled `1 space` / `N spaces`.
pub fn garages(counts: &[i64]) -> Series {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for &n in counts {
        *buckets.entry(n).or_default() += 1;
    }
    let (labels, values) = buckets
        .into_iter()
        .map(|(n, count)| {
            let label = if n == 1 {
                "1 space".to_string()
            } else {
                format!("{n} spaces")
            };
            (label, count)
        })
        .unzip();
    Series { labels, values }
}
