use super::*;

/// The label set identifying one series. Backed by a `BTreeMap` so iteration
/// (and therefore rendering) is always in key order, whatever order the
/// backend sent the labels in.
#[derive(Default, Eq, PartialEq, Hash, Clone, Debug)]
pub struct Labels {
    pub inner: BTreeMap<String, String>,
}

impl Labels {
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Renders as `key=value` pairs in key order joined by `;`, which is how
/// columns are named in the CSV header and plot legends.
impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{name}={value}")?;
        }

        Ok(())
    }
}

impl From<std::collections::HashMap<String, String>> for Labels {
    fn from(other: std::collections::HashMap<String, String>) -> Self {
        Labels {
            inner: other.into_iter().collect(),
        }
    }
}

impl From<()> for Labels {
    fn from(_other: ()) -> Self {
        Labels::default()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Labels {
    fn from(other: [(&str, &str); N]) -> Self {
        Labels {
            inner: other
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn renders_sorted_by_key() {
        let labels = Labels::from([("job", "node"), ("instance", "a"), ("__name__", "up")]);
        assert_eq!(labels.to_string(), "__name__=up;instance=a;job=node");
    }

    #[test]
    fn rendering_ignores_insertion_order() {
        let mut forward = HashMap::new();
        for (k, v) in [("b", "2"), ("a", "1"), ("c", "3")] {
            forward.insert(k.to_string(), v.to_string());
        }

        let mut reverse = HashMap::new();
        for (k, v) in [("c", "3"), ("a", "1"), ("b", "2")] {
            reverse.insert(k.to_string(), v.to_string());
        }

        assert_eq!(Labels::from(forward).to_string(), "a=1;b=2;c=3");
        assert_eq!(Labels::from(reverse).to_string(), "a=1;b=2;c=3");
    }

    #[test]
    fn empty_renders_empty() {
        let labels = Labels::from(());
        assert!(labels.is_empty());
        assert_eq!(labels.to_string(), "");
    }
}
