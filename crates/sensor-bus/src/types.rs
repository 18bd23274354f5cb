use core::fmt;

pub const SENSOR_VALUE_INTERFACE: &str = "xyz.openbmc_project.Sensor.Value";
pub const CRITICAL_THRESHOLD_INTERFACE: &str = "xyz.openbmc_project.Sensor.Threshold.Critical";

/// Absolute object path, e.g. `/xyz/openbmc_project/sensors/voltage/VBAT`
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Validates `/`-separated elements of `[A-Za-z0-9_]`. The root path `/` is allowed.
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path == "/" {
            return Some(Self(path));
        }
        let rest = path.strip_prefix('/')?;
        if rest.split('/').all(Self::is_valid_element) {
            Some(Self(path))
        } else {
            None
        }
    }

    /// Append one element, returning `None` if it is not a valid path element.
    pub fn join(&self, element: &str) -> Option<Self> {
        if !Self::is_valid_element(element) {
            return None;
        }
        if self.0 == "/" {
            Some(Self(format!("/{element}")))
        } else {
            Some(Self(format!("{}/{element}", self.0)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A single path element: non-empty, `[A-Za-z0-9_]` only.
    pub fn is_valid_element(element: &str) -> bool {
        !element.is_empty()
            && element
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Static limits exposed on the critical-threshold interface.
///
/// Every set carries `CriticalLow`. The upper property is either `CriticalHigh` or, for
/// battery-style rails, `WarningLow`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdSet {
    Critical { high: f64, low: f64 },
    WarningLow { warning_low: f64, critical_low: f64 },
}

impl ThresholdSet {
    /// Property names and values in the order they are registered on the bus.
    pub fn properties(&self) -> Vec<(&'static str, f64)> {
        match *self {
            ThresholdSet::Critical { high, low } => {
                vec![("CriticalHigh", high), ("CriticalLow", low)]
            }
            ThresholdSet::WarningLow {
                warning_low,
                critical_low,
            } => vec![("WarningLow", warning_low), ("CriticalLow", critical_low)],
        }
    }

    pub fn get(&self, property: &str) -> Option<f64> {
        self.properties()
            .into_iter()
            .find(|(name, _)| *name == property)
            .map(|(_, v)| v)
    }
}

/// Reference to an exposed `Sensor.Value` object.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ValueHandle(ObjectPath);

impl ValueHandle {
    pub fn new(path: ObjectPath) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &ObjectPath {
        &self.0
    }
}

/// Reference to an exposed `Sensor.Threshold.Critical` object.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ThresholdHandle(ObjectPath);

impl ThresholdHandle {
    pub fn new(path: ObjectPath) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &ObjectPath {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_validation() {
        assert!(ObjectPath::new("/xyz/openbmc_project/sensors/voltage").is_some());
        assert!(ObjectPath::new("/").is_some());
        assert!(ObjectPath::new("xyz/relative").is_none());
        assert!(ObjectPath::new("/trailing/").is_none());
        assert!(ObjectPath::new("/double//slash").is_none());
        assert!(ObjectPath::new("/has-dash").is_none());
    }

    #[test]
    fn test_object_path_join() {
        let prefix = ObjectPath::new("/xyz/openbmc_project/sensors/voltage").unwrap();
        let path = prefix.join("PVCCIN_CPU0").unwrap();
        assert_eq!(
            path.as_str(),
            "/xyz/openbmc_project/sensors/voltage/PVCCIN_CPU0"
        );
        assert!(prefix.join("bad name").is_none());
        assert!(prefix.join("").is_none());

        let root = ObjectPath::new("/").unwrap();
        assert_eq!(root.join("VBAT").unwrap().as_str(), "/VBAT");
    }

    #[test]
    fn test_threshold_properties() {
        let critical = ThresholdSet::Critical {
            high: 12.9,
            low: 11.16,
        };
        assert_eq!(
            critical.properties(),
            vec![("CriticalHigh", 12.9), ("CriticalLow", 11.16)]
        );
        assert_eq!(critical.get("WarningLow"), None);

        let battery = ThresholdSet::WarningLow {
            warning_low: 2.6,
            critical_low: 2.5,
        };
        assert_eq!(battery.get("WarningLow"), Some(2.6));
        assert_eq!(battery.get("CriticalLow"), Some(2.5));
        assert_eq!(battery.get("CriticalHigh"), None);
    }
}
