//! In-memory model of a range-query result: labeled series of timestamped
//! samples, as parsed from one backend response.

use std::collections::BTreeMap;
use std::fmt;

mod labels;
mod series;

pub use labels::Labels;
pub use series::{Sample, Series, Timestamp, Value};

/// The series returned by one range query, in response order.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ResultSet {
    pub series: Vec<Series>,
    pub warnings: Vec<String>,
}

impl ResultSet {
    pub fn new(series: Vec<Series>) -> Self {
        Self {
            series,
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
