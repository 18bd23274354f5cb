//! sensor-bus: object/property bus abstractions for sensor publishers
//!
//! This crate models the small slice of a system object bus that a sensor daemon needs:
//! objects at hierarchical paths carrying a live `Value` property and a set of static
//! threshold properties. The default build enables an in-memory `mock` backend so that
//! binaries and tests work on any host; the `dbus` feature adds a `zbus` backend serving
//! the `xyz.openbmc_project.Sensor.*` interfaces.

mod types;
pub use types::{
    ObjectPath, ThresholdHandle, ThresholdSet, ValueHandle, CRITICAL_THRESHOLD_INTERFACE,
    SENSOR_VALUE_INTERFACE,
};

mod error;
pub use error::{BusError, Result};

mod traits;
pub use traits::SensorBus;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{MockBus, PropertyWrite};

#[cfg(feature = "dbus")]
mod dbus;

#[cfg(feature = "dbus")]
pub use dbus::{CriticalThreshold, DbusBus, SensorValue, WarningLowThreshold};
