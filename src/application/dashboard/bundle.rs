use serde::ser::{Serialize, SerializeMap, Serializer};

use super::catalog::{AggregateKey, AggregateValue};

/// Several aggregates fetched together, keyed by aggregate in request order.
#[derive(Debug, Clone, Default)]
pub struct AggregateBundle {
    entries: Vec<(AggregateKey, AggregateValue)>,
}

impl AggregateBundle {
    pub fn new(entries: Vec<(AggregateKey, AggregateValue)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: AggregateKey) -> Option<&AggregateValue> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = AggregateKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AggregateBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}
