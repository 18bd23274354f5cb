use crate::{BusError, ObjectPath, Result, SensorBus, ThresholdHandle, ThresholdSet, ValueHandle};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;

/// One `Value` write observed by the mock bus.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyWrite {
    pub path: ObjectPath,
    pub value: f64,
    pub at: OffsetDateTime,
}

#[derive(Default)]
struct State {
    // Kept in registration order
    values: Vec<(ObjectPath, f64)>,
    thresholds: Vec<(ObjectPath, ThresholdSet)>,
    writes: Vec<PropertyWrite>,
    failing: HashSet<ObjectPath>,
}

/// A simple in-process bus. Clones share the same object table, so a test can keep one
/// clone for inspection while the code under test owns another.
#[derive(Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<State>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `Value` of the object at `path`.
    pub fn value(&self, path: &str) -> Option<f64> {
        self.state
            .lock()
            .values
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, v)| *v)
    }

    pub fn thresholds(&self, path: &str) -> Option<ThresholdSet> {
        self.state
            .lock()
            .thresholds
            .iter()
            .find(|(p, _)| p.as_str() == path)
            .map(|(_, t)| *t)
    }

    pub fn value_paths(&self) -> Vec<ObjectPath> {
        self.state
            .lock()
            .values
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn threshold_paths(&self) -> Vec<ObjectPath> {
        self.state
            .lock()
            .thresholds
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Every successful `set_value` call, oldest first.
    pub fn writes(&self) -> Vec<PropertyWrite> {
        self.state.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().writes.clear();
    }

    /// Make subsequent `set_value` calls for `path` fail.
    pub fn fail_writes_to(&self, path: &ObjectPath) {
        self.state.lock().failing.insert(path.clone());
    }

    /// Simulate an external client writing the `Value` property.
    pub fn write_external(&self, path: &str, value: f64) -> Result<()> {
        let mut st = self.state.lock();
        let slot = st
            .values
            .iter_mut()
            .find(|(p, _)| p.as_str() == path)
            .ok_or_else(|| BusError::NotFound(path.to_string()))?;
        slot.1 = value;
        Ok(())
    }
}

#[async_trait]
impl SensorBus for MockBus {
    async fn add_value(&self, path: &ObjectPath, initial: f64) -> Result<ValueHandle> {
        let mut st = self.state.lock();
        if st.values.iter().any(|(p, _)| p == path) {
            return Err(BusError::AlreadyRegistered(path.to_string()));
        }
        st.values.push((path.clone(), initial));
        Ok(ValueHandle::new(path.clone()))
    }

    async fn add_thresholds(
        &self,
        path: &ObjectPath,
        set: ThresholdSet,
    ) -> Result<ThresholdHandle> {
        let mut st = self.state.lock();
        if st.thresholds.iter().any(|(p, _)| p == path) {
            return Err(BusError::AlreadyRegistered(path.to_string()));
        }
        st.thresholds.push((path.clone(), set));
        Ok(ThresholdHandle::new(path.clone()))
    }

    async fn set_value(&self, handle: &ValueHandle, value: f64) -> Result<()> {
        let path = handle.path();
        let mut st = self.state.lock();
        if st.failing.contains(path) {
            return Err(BusError::Backend(format!("injected write failure: {path}")));
        }
        let slot = st
            .values
            .iter_mut()
            .find(|(p, _)| p == path)
            .ok_or_else(|| BusError::NotFound(path.to_string()))?;
        slot.1 = value;
        st.writes.push(PropertyWrite {
            path: path.clone(),
            value,
            at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }
}
