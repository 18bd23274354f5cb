use crate::error::RegistryError;
use sensor_bus::{ObjectPath, ThresholdSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Published before a channel has produced its first sample.
pub const SENTINEL_VALUE: f64 = 88.88;

/// `WarningLow` for the battery rail.
pub const VBAT_WARNING_LOW: f64 = 2.6;

pub const VBAT_CHANNEL: &str = "VBAT";

/// Which upper threshold a channel exposes next to `CriticalLow`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThresholdKind {
    /// `CriticalHigh = crit_max`
    Standard,
    /// `WarningLow` replaces `CriticalHigh`
    WarningLowOnly { warning_low: f64 },
}

/// Declarative form of a channel, as written in the built-in table or a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    pub r1: f64,
    #[serde(default)]
    pub r2: f64,
    pub crit_max: f64,
    pub crit_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_low: Option<f64>,
}

impl ChannelSpec {
    pub fn new(name: &str, crit_max: f64, crit_min: f64, r1: f64, r2: f64) -> Self {
        Self {
            name: name.to_string(),
            r1,
            r2,
            crit_max,
            crit_min,
            warning_low: None,
        }
    }

    fn threshold_kind(&self) -> ThresholdKind {
        match self.warning_low {
            Some(warning_low) => ThresholdKind::WarningLowOnly { warning_low },
            None if self.name == VBAT_CHANNEL => ThresholdKind::WarningLowOnly {
                warning_low: VBAT_WARNING_LOW,
            },
            None => ThresholdKind::Standard,
        }
    }
}

/// One ADC line with its divider constants. `index` matches the `in_voltage<index>_raw`
/// file the samples come from.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub index: usize,
    pub r1: f64,
    pub r2: f64,
    pub crit_max: f64,
    pub crit_min: f64,
    pub threshold: ThresholdKind,
}

impl Channel {
    pub fn thresholds(&self) -> ThresholdSet {
        match self.threshold {
            ThresholdKind::Standard => ThresholdSet::Critical {
                high: self.crit_max,
                low: self.crit_min,
            },
            ThresholdKind::WarningLowOnly { warning_low } => ThresholdSet::WarningLow {
                warning_low,
                critical_low: self.crit_min,
            },
        }
    }
}

/// Fixed, ordered channel table plus the last computed voltage of each channel.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
    last_values: Vec<f64>,
}

impl ChannelRegistry {
    /// Build a registry, assigning indices by position.
    pub fn from_specs(specs: &[ChannelSpec]) -> Result<Self, RegistryError> {
        if specs.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        let mut channels = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if !ObjectPath::is_valid_element(&spec.name) {
                return Err(RegistryError::InvalidName(spec.name.clone()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(RegistryError::DuplicateName(spec.name.clone()));
            }
            let fields = [
                ("r1", spec.r1),
                ("r2", spec.r2),
                ("crit_max", spec.crit_max),
                ("crit_min", spec.crit_min),
                ("warning_low", spec.warning_low.unwrap_or(0.0)),
            ];
            if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(RegistryError::NonFinite {
                    name: spec.name.clone(),
                    field: *field,
                });
            }
            channels.push(Channel {
                name: spec.name.clone(),
                index,
                r1: spec.r1,
                r2: spec.r2,
                crit_max: spec.crit_max,
                crit_min: spec.crit_min,
                threshold: spec.threshold_kind(),
            });
        }
        let last_values = vec![SENTINEL_VALUE; channels.len()];
        Ok(Self {
            channels,
            last_values,
        })
    }

    /// The board's compiled-in channel table.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_specs(&builtin_specs())
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn last_value(&self, index: usize) -> Option<f64> {
        self.last_values.get(index).copied()
    }

    pub(crate) fn record(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.last_values.get_mut(index) {
            *slot = value;
        }
    }
}

/// name, crit_max, crit_min, r1, r2
pub fn builtin_specs() -> Vec<ChannelSpec> {
    [
        ("PLUS12V", 12.9, 11.16, 8.2, 1.0),
        ("PLUS5V", 5.37, 4.65, 3.0, 1.0),
        ("PLUS3DOT3V", 3.54, 3.06, 1.8, 1.0),
        ("PVCCIN_CPU0", 2.04, 1.56, 1.0, 3.0),
        ("PVCCIN_CPU1", 2.04, 1.56, 1.0, 3.0),
        ("PVCCIO_CPU0", 1.25, 0.75, 1.0, 1.0),
        ("PVCCIO_CPU1", 1.25, 0.75, 1.0, 1.0),
        ("VBAT", 0.0, 2.5, 787.0, 402.0),
        ("PVDDQ_ABCD_CPU0", 1.29, 1.11, 1.0, 0.0),
        ("PVDDQ_EFGH_CPU0", 1.29, 1.11, 1.0, 0.0),
        ("PVDDQ_ABCD_CPU1", 1.29, 1.11, 1.0, 0.0),
        ("PVDDQ_EFGH_CPU1", 1.29, 1.11, 1.0, 0.0),
        ("P1V05_PCH", 1.11, 0.99, 1.0, 0.0),
        ("PVNN_PCH", 1.07, 0.93, 1.0, 0.0),
        ("P1V8_PCH", 1.94, 1.66, 5.6, 15.0),
        ("PGPPA_PCH", 3.54, 3.06, 1.8, 1.0),
    ]
    .into_iter()
    .map(|(name, crit_max, crit_min, r1, r2)| ChannelSpec::new(name, crit_max, crit_min, r1, r2))
    .collect()
}
