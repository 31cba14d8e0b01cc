//! Status report

use envkeeper_core::types::{PlatformStatus, PluginStatus, StatusItem};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Outcome of assessing an environment: one platform item, then one item per
/// plugin in descriptor order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusReport {
    items: Vec<StatusItem>,
}

impl StatusReport {
    /// Build a report from items
    pub fn new(items: Vec<StatusItem>) -> Self {
        Self { items }
    }

    /// Whether every item is up to date
    pub fn is_up_to_date(&self) -> bool {
        self.items.iter().all(StatusItem::is_up_to_date)
    }

    /// All items in report order
    pub fn items(&self) -> &[StatusItem] {
        &self.items
    }

    /// Items that show drift
    pub fn drifted(&self) -> impl Iterator<Item = &StatusItem> {
        self.items.iter().filter(|item| !item.is_up_to_date())
    }

    /// The platform item, if one was assessed
    pub fn platform(&self) -> Option<&PlatformStatus> {
        self.items.iter().find_map(|item| match item {
            StatusItem::Platform(status) => Some(status),
            StatusItem::Plugin(_) => None,
        })
    }

    /// Plugin items in descriptor order
    pub fn plugins(&self) -> impl Iterator<Item = &PluginStatus> {
        self.items.iter().filter_map(|item| match item {
            StatusItem::Plugin(status) => Some(status),
            StatusItem::Platform(_) => None,
        })
    }
}

impl Serialize for StatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StatusReport", 2)?;
        state.serialize_field("up_to_date", &self.is_up_to_date())?;
        state.serialize_field("items", &self.items)?;
        state.end()
    }
}
