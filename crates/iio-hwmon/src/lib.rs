//! iio-hwmon: IIO ADC sampling and sensor publication
//!
//! Reads raw codes from `in_voltage<N>_raw` attributes, converts them through each
//! channel's resistor-divider constants and keeps one `Sensor.Value` plus one
//! `Sensor.Threshold.Critical` object per channel up to date on a [`sensor_bus::SensorBus`].

mod error;
pub use error::{ConfigError, ReadError, RegistryError};

mod registry;
pub use registry::{
    builtin_specs, Channel, ChannelRegistry, ChannelSpec, ThresholdKind, SENTINEL_VALUE,
    VBAT_CHANNEL, VBAT_WARNING_LOW,
};

mod convert;
pub use convert::convert;

mod reader;
pub use reader::{parse_raw, RawSource, SysfsReader, DEFAULT_RAW_BASE};

mod exposition;
pub use exposition::{ChannelEntities, Delivery, Exposition, DEFAULT_OBJECT_PREFIX};

mod sampler;
pub use sampler::{CycleOutcome, CycleReport, Sampler, Schedule, DEFAULT_PERIOD};

mod config;
pub use config::{DaemonConfig, DEFAULT_SERVICE_NAME};
