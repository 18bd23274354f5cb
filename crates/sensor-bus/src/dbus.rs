use crate::{
    BusError, ObjectPath, Result, SensorBus, ThresholdHandle, ThresholdSet, ValueHandle,
    CRITICAL_THRESHOLD_INTERFACE, SENSOR_VALUE_INTERFACE,
};
use async_trait::async_trait;
use tracing::debug;
use zbus::{interface, Connection};

/// `xyz.openbmc_project.Sensor.Value` object state.
pub struct SensorValue {
    value: f64,
}

#[interface(name = "xyz.openbmc_project.Sensor.Value")]
impl SensorValue {
    #[zbus(property)]
    fn value(&self) -> f64 {
        self.value
    }

    #[zbus(property)]
    fn set_value(&mut self, value: f64) {
        self.value = value;
    }
}

/// Threshold interface exposing `CriticalHigh` and `CriticalLow`.
pub struct CriticalThreshold {
    critical_high: f64,
    critical_low: f64,
}

#[interface(name = "xyz.openbmc_project.Sensor.Threshold.Critical")]
impl CriticalThreshold {
    #[zbus(property)]
    fn critical_high(&self) -> f64 {
        self.critical_high
    }

    #[zbus(property)]
    fn set_critical_high(&mut self, value: f64) {
        self.critical_high = value;
    }

    #[zbus(property)]
    fn critical_low(&self) -> f64 {
        self.critical_low
    }

    #[zbus(property)]
    fn set_critical_low(&mut self, value: f64) {
        self.critical_low = value;
    }
}

/// Threshold interface exposing `WarningLow` in place of `CriticalHigh`.
pub struct WarningLowThreshold {
    warning_low: f64,
    critical_low: f64,
}

#[interface(name = "xyz.openbmc_project.Sensor.Threshold.Critical")]
impl WarningLowThreshold {
    #[zbus(property)]
    fn warning_low(&self) -> f64 {
        self.warning_low
    }

    #[zbus(property)]
    fn set_warning_low(&mut self, value: f64) {
        self.warning_low = value;
    }

    #[zbus(property)]
    fn critical_low(&self) -> f64 {
        self.critical_low
    }

    #[zbus(property)]
    fn set_critical_low(&mut self, value: f64) {
        self.critical_low = value;
    }
}

/// D-Bus backend serving sensor objects on a `zbus` connection.
pub struct DbusBus {
    conn: Connection,
}

impl DbusBus {
    pub async fn system() -> Result<Self> {
        Ok(Self {
            conn: Connection::system().await?,
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Claim a well-known name. Failure here is expected to be fatal for the caller.
    pub async fn request_name(&self, name: &str) -> Result<()> {
        self.conn
            .request_name(name)
            .await
            .map_err(|e| BusError::NameClaim {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl SensorBus for DbusBus {
    async fn add_value(&self, path: &ObjectPath, initial: f64) -> Result<ValueHandle> {
        let added = self
            .conn
            .object_server()
            .at(path.as_str(), SensorValue { value: initial })
            .await?;
        if !added {
            return Err(BusError::AlreadyRegistered(path.to_string()));
        }
        debug!(%path, interface = SENSOR_VALUE_INTERFACE, "interface added");
        Ok(ValueHandle::new(path.clone()))
    }

    async fn add_thresholds(
        &self,
        path: &ObjectPath,
        set: ThresholdSet,
    ) -> Result<ThresholdHandle> {
        let server = self.conn.object_server();
        let added = match set {
            ThresholdSet::Critical { high, low } => {
                server
                    .at(
                        path.as_str(),
                        CriticalThreshold {
                            critical_high: high,
                            critical_low: low,
                        },
                    )
                    .await?
            }
            ThresholdSet::WarningLow {
                warning_low,
                critical_low,
            } => {
                server
                    .at(
                        path.as_str(),
                        WarningLowThreshold {
                            warning_low,
                            critical_low,
                        },
                    )
                    .await?
            }
        };
        if !added {
            return Err(BusError::AlreadyRegistered(path.to_string()));
        }
        debug!(%path, interface = CRITICAL_THRESHOLD_INTERFACE, "interface added");
        Ok(ThresholdHandle::new(path.clone()))
    }

    async fn set_value(&self, handle: &ValueHandle, value: f64) -> Result<()> {
        let iface_ref = self
            .conn
            .object_server()
            .interface::<_, SensorValue>(handle.path().as_str())
            .await
            .map_err(|_| BusError::NotFound(handle.path().to_string()))?;
        let mut iface = iface_ref.get_mut().await;
        iface.value = value;
        // Emits PropertiesChanged so observers see the new sample
        iface.value_changed(iface_ref.signal_context()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::net::UnixStream;
    use zbus::message::Type;
    use zbus::zvariant::{OwnedValue, Value};
    use zbus::{connection, Guid, MessageStream};

    const PROPERTIES: &str = "org.freedesktop.DBus.Properties";

    /// Server-side `DbusBus` and a client connection joined by a socket pair.
    async fn peer_pair() -> anyhow::Result<(DbusBus, Connection)> {
        let (server_end, client_end) = UnixStream::pair()?;
        let server = connection::Builder::unix_stream(server_end)
            .server(Guid::generate())?
            .p2p()
            .build();
        let client = connection::Builder::unix_stream(client_end).p2p().build();
        let (server, client) = tokio::try_join!(server, client)?;
        Ok((DbusBus::from_connection(server), client))
    }

    async fn get_all(
        conn: &Connection,
        path: &str,
        interface: &str,
    ) -> anyhow::Result<HashMap<String, OwnedValue>> {
        let reply = conn
            .call_method(None::<&str>, path, Some(PROPERTIES), "GetAll", &(interface,))
            .await?;
        let body = reply.body();
        let props: HashMap<String, OwnedValue> = body.deserialize()?;
        Ok(props)
    }

    fn take_f64(props: &mut HashMap<String, OwnedValue>, name: &str) -> anyhow::Result<f64> {
        let value = props
            .remove(name)
            .ok_or_else(|| anyhow::anyhow!("property {name} not served"))?;
        Ok(f64::try_from(value)?)
    }

    async fn assert_thresholds(
        client: &Connection,
        path: &ObjectPath,
        set: ThresholdSet,
    ) -> anyhow::Result<()> {
        let mut props = get_all(client, path.as_str(), CRITICAL_THRESHOLD_INTERFACE).await?;
        let expected = set.properties();
        assert_eq!(props.len(), expected.len());
        for (name, value) in expected {
            assert_eq!(take_f64(&mut props, name)?, value);
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_served_properties() -> anyhow::Result<()> {
        let (bus, client) = peer_pair().await?;

        let vbat = ObjectPath::new("/xyz/openbmc_project/sensors/voltage/VBAT").unwrap();
        let vbat_set = ThresholdSet::WarningLow {
            warning_low: 2.6,
            critical_low: 2.5,
        };
        bus.add_value(&vbat, 88.88).await?;
        bus.add_thresholds(&vbat, vbat_set).await?;

        let plus5 = ObjectPath::new("/xyz/openbmc_project/sensors/voltage/PLUS5V").unwrap();
        let plus5_set = ThresholdSet::Critical {
            high: 5.37,
            low: 4.65,
        };
        bus.add_value(&plus5, 88.88).await?;
        bus.add_thresholds(&plus5, plus5_set).await?;

        for path in [&vbat, &plus5] {
            let mut props = get_all(&client, path.as_str(), SENSOR_VALUE_INTERFACE).await?;
            assert_eq!(props.len(), 1);
            assert_eq!(take_f64(&mut props, "Value")?, 88.88);
        }
        assert_thresholds(&client, &vbat, vbat_set).await?;
        assert_thresholds(&client, &plus5, plus5_set).await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_set_value_signals_change() -> anyhow::Result<()> {
        let (bus, client) = peer_pair().await?;
        let path = ObjectPath::new("/xyz/openbmc_project/sensors/voltage/PLUS12V").unwrap();
        let handle = bus.add_value(&path, 88.88).await?;

        let mut stream = MessageStream::from(&client);
        bus.set_value(&handle, 3.1).await?;

        let (interface, mut changed) = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(msg) = stream.next().await {
                let msg = msg?;
                let header = msg.header();
                let is_change = msg.message_type() == Type::Signal
                    && header.member().map(|m| m.as_str()) == Some("PropertiesChanged")
                    && header.path().map(|p| p.as_str()) == Some(path.as_str());
                if is_change {
                    let (interface, changed, _invalidated): (
                        String,
                        HashMap<String, OwnedValue>,
                        Vec<String>,
                    ) = msg.body().deserialize()?;
                    return Ok((interface, changed));
                }
            }
            Err(anyhow::anyhow!("message stream ended"))
        })
        .await??;

        assert_eq!(interface, SENSOR_VALUE_INTERFACE);
        assert_eq!(changed.len(), 1);
        assert_eq!(take_f64(&mut changed, "Value")?, 3.1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_external_write_accepted() -> anyhow::Result<()> {
        let (bus, client) = peer_pair().await?;
        let path = ObjectPath::new("/xyz/openbmc_project/sensors/voltage/PVNN_PCH").unwrap();
        bus.add_value(&path, 88.88).await?;

        client
            .call_method(
                None::<&str>,
                path.as_str(),
                Some(PROPERTIES),
                "Set",
                &(SENSOR_VALUE_INTERFACE, "Value", Value::from(7.0_f64)),
            )
            .await?;

        let mut props = get_all(&client, path.as_str(), SENSOR_VALUE_INTERFACE).await?;
        assert_eq!(take_f64(&mut props, "Value")?, 7.0);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_duplicate_object_rejected() -> anyhow::Result<()> {
        let (bus, _client) = peer_pair().await?;
        let path = ObjectPath::new("/xyz/openbmc_project/sensors/voltage/VBAT").unwrap();
        bus.add_value(&path, 88.88).await?;
        assert!(matches!(
            bus.add_value(&path, 1.0).await,
            Err(BusError::AlreadyRegistered(_))
        ));

        let missing = ValueHandle::new(
            ObjectPath::new("/xyz/openbmc_project/sensors/voltage/NOPE").unwrap(),
        );
        assert!(matches!(
            bus.set_value(&missing, 1.0).await,
            Err(BusError::NotFound(_))
        ));
        Ok(())
    }
}
