use super::*;

/// A Unix-epoch instant at millisecond precision.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[cfg(test)]
    pub fn from_secs(secs: i64) -> Self {
        Self::from_millis(secs.saturating_mul(1000))
    }

    /// Converts the float seconds used on the wire, rounding to the nearest
    /// millisecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::from_millis((secs * 1000.0).round() as i64)
    }
}

/// Whole seconds render as an integer (`1700000000`), anything else as
/// seconds with up to three fractional digits (`1700000000.25`).
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let secs = self.0.unsigned_abs() / 1000;
        let millis = self.0.unsigned_abs() % 1000;

        if millis == 0 {
            return write!(f, "{sign}{secs}");
        }

        let fraction = format!("{millis:03}");
        write!(f, "{sign}{secs}.{}", fraction.trim_end_matches('0'))
    }
}

/// A sample value. `Missing` is the backend's no-data marker (`NaN`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Float(f64),
    Missing,
}

impl Value {
    /// Parses a value string as sent by the backend. Returns `None` when the
    /// string is neither a float nor one of the special markers.
    pub fn parse(s: &str) -> Option<Self> {
        let value = match s {
            "NaN" => return Some(Value::Missing),
            "+Inf" | "Inf" => f64::INFINITY,
            "-Inf" => f64::NEG_INFINITY,
            _ => s.parse::<f64>().ok()?,
        };

        if value.is_nan() {
            Some(Value::Missing)
        } else {
            Some(Value::Float(value))
        }
    }
}

/// Floats use the shortest representation that round-trips, always with a
/// fractional part or exponent (`2.0`, `1.5`, `1e-7`). Infinities use the
/// backend's spelling. `Missing` renders as nothing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "+Inf" } else { "-Inf" })
            }
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Missing => Ok(()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: Value,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: Value) -> Self {
        Self { timestamp, value }
    }
}

/// One labeled series. Samples are kept in the order the backend sent them.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Series {
    pub labels: Labels,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(labels: Labels, samples: Vec<Sample>) -> Self {
        Self { labels, samples }
    }

    /// Samples indexed by timestamp. When a timestamp repeats, the last
    /// sample wins.
    pub fn by_timestamp(&self) -> BTreeMap<Timestamp, Value> {
        self.samples
            .iter()
            .map(|sample| (sample.timestamp, sample.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_whole_seconds() {
        assert_eq!(Timestamp::from_secs(100).to_string(), "100");
        assert_eq!(Timestamp::from_secs_f64(1435781451.0).to_string(), "1435781451");
    }

    #[test]
    fn timestamp_fractional_seconds() {
        assert_eq!(
            Timestamp::from_secs_f64(1435781451.781).to_string(),
            "1435781451.781"
        );
        assert_eq!(Timestamp::from_millis(1500).to_string(), "1.5");
        assert_eq!(Timestamp::from_millis(1050).to_string(), "1.05");
    }

    #[test]
    fn timestamp_before_epoch() {
        assert_eq!(Timestamp::from_millis(-1500).to_string(), "-1.5");
        assert_eq!(Timestamp::from_secs(-3).to_string(), "-3");
    }

    #[test]
    fn value_parse() {
        assert_eq!(Value::parse("1.5"), Some(Value::Float(1.5)));
        assert_eq!(Value::parse("2"), Some(Value::Float(2.0)));
        assert_eq!(Value::parse("1e3"), Some(Value::Float(1000.0)));
        assert_eq!(Value::parse("+Inf"), Some(Value::Float(f64::INFINITY)));
        assert_eq!(Value::parse("-Inf"), Some(Value::Float(f64::NEG_INFINITY)));
        assert_eq!(Value::parse("NaN"), Some(Value::Missing));
        assert_eq!(Value::parse("abc"), None);
        assert_eq!(Value::parse(""), None);
    }

    #[test]
    fn value_render() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Inf");
        assert_eq!(Value::Missing.to_string(), "");
    }

    #[test]
    fn by_timestamp_tolerates_disorder() {
        let series = Series::new(
            Labels::default(),
            vec![
                Sample::new(Timestamp::from_secs(200), Value::Float(2.0)),
                Sample::new(Timestamp::from_secs(100), Value::Float(1.0)),
                Sample::new(Timestamp::from_secs(200), Value::Float(3.0)),
            ],
        );

        let index = series.by_timestamp();
        let ordered: Vec<_> = index.into_iter().collect();
        assert_eq!(
            ordered,
            vec![
                (Timestamp::from_secs(100), Value::Float(1.0)),
                (Timestamp::from_secs(200), Value::Float(3.0)),
            ]
        );
    }
}
