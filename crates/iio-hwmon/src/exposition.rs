use crate::{Channel, ChannelRegistry, SENTINEL_VALUE};
use sensor_bus::{BusError, ObjectPath, SensorBus, ThresholdHandle, ValueHandle};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_OBJECT_PREFIX: &str = "/xyz/openbmc_project/sensors/voltage";

/// What happened to a best-effort `Value` write.
///
/// Not `#[must_use]`; a dropped write is already logged and callers may ignore it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delivery {
    Sent,
    Dropped,
}

/// The two bus objects created for one channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelEntities {
    pub value: ValueHandle,
    pub thresholds: ThresholdHandle,
}

/// Maps channels to bus objects and pushes their live values.
pub struct Exposition {
    bus: Arc<dyn SensorBus>,
    prefix: ObjectPath,
    entities: BTreeMap<usize, ChannelEntities>,
}

impl Exposition {
    pub fn new(bus: Arc<dyn SensorBus>, prefix: ObjectPath) -> Self {
        Self {
            bus,
            prefix,
            entities: BTreeMap::new(),
        }
    }

    pub fn path_for(&self, channel: &Channel) -> Result<ObjectPath, BusError> {
        self.prefix
            .join(&channel.name)
            .ok_or_else(|| BusError::InvalidPath(format!("{}/{}", self.prefix, channel.name)))
    }

    /// Create the value and threshold objects for `channel`. Fails if the channel was
    /// already registered.
    pub async fn register_channel(
        &mut self,
        channel: &Channel,
    ) -> Result<&ChannelEntities, BusError> {
        let path = self.path_for(channel)?;
        if self.entities.contains_key(&channel.index) {
            return Err(BusError::AlreadyRegistered(path.to_string()));
        }
        let value = self.bus.add_value(&path, SENTINEL_VALUE).await?;
        let thresholds = self.bus.add_thresholds(&path, channel.thresholds()).await?;
        debug!(%path, index = channel.index, "sensor objects registered");
        Ok(self
            .entities
            .entry(channel.index)
            .or_insert(ChannelEntities { value, thresholds }))
    }

    /// Register every channel in registry order.
    pub async fn register_all(&mut self, registry: &ChannelRegistry) -> Result<(), BusError> {
        for channel in registry.channels() {
            self.register_channel(channel).await?;
        }
        info!(count = self.entities.len(), prefix = %self.prefix, "sensors exposed");
        Ok(())
    }

    pub fn entities(&self, index: usize) -> Option<&ChannelEntities> {
        self.entities.get(&index)
    }

    pub fn registered(&self) -> usize {
        self.entities.len()
    }

    /// Best-effort write of the channel's `Value`. Failures are logged and dropped.
    pub async fn publish_value(&self, channel: &Channel, value: f64) -> Delivery {
        let Some(entities) = self.entities.get(&channel.index) else {
            warn!(channel = %channel.name, "publish for unregistered channel dropped");
            return Delivery::Dropped;
        };
        match self.bus.set_value(&entities.value, value).await {
            Ok(()) => {
                debug!(channel = %channel.name, value, "value published");
                Delivery::Sent
            }
            Err(e) => {
                warn!(path = %entities.value.path(), error = %e, "value update dropped");
                Delivery::Dropped
            }
        }
    }
}
