use crate::{ObjectPath, Result, ThresholdHandle, ThresholdSet, ValueHandle};
use async_trait::async_trait;

/// A bus that can expose sensor objects and update their live value.
///
/// Objects become externally visible as soon as the `add_*` call returns. Both
/// interfaces are read-write from the outside; this process is only the intended writer.
#[async_trait]
pub trait SensorBus: Send + Sync {
    /// Expose a `Sensor.Value` interface at `path` with `Value = initial`.
    async fn add_value(&self, path: &ObjectPath, initial: f64) -> Result<ValueHandle>;

    /// Expose a `Sensor.Threshold.Critical` interface at `path` carrying `set`.
    async fn add_thresholds(&self, path: &ObjectPath, set: ThresholdSet)
        -> Result<ThresholdHandle>;

    /// Update the `Value` property of a previously exposed object.
    async fn set_value(&self, handle: &ValueHandle, value: f64) -> Result<()>;
}
