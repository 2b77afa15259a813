// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notification payloads delivered to subscribers.

use std::fmt;

use crate::types::PodId;

use super::EventName;

/// New value carried by a notification.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    /// Textual value (mode, swing position, fan level, unit code).
    Text(String),
    /// Integral value (set point).
    Integer(i64),
    /// Measured or derived value.
    Float(f64),
    /// Power state.
    Bool(bool),
}

impl EventValue {
    /// Returns the text, if this is a textual value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the number as `f64`, if this is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integral value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a power state.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for EventValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// The object whose property changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// A device-level property of a pod.
    Pod {
        /// Pod id.
        id: PodId,
        /// Room name of the pod.
        name: String,
    },
    /// A property of the pod's active mode.
    Mode {
        /// Pod id.
        id: PodId,
        /// Room name of the pod.
        pod: String,
        /// Mode name.
        mode: String,
    },
}

impl EventSource {
    /// Returns the id of the pod that emitted the event.
    #[must_use]
    pub fn pod_id(&self) -> &PodId {
        match self {
            Self::Pod { id, .. } | Self::Mode { id, .. } => id,
        }
    }

    /// Returns the room name of the pod that emitted the event.
    #[must_use]
    pub fn pod_name(&self) -> &str {
        match self {
            Self::Pod { name, .. } => name,
            Self::Mode { pod, .. } => pod,
        }
    }

    /// Returns the mode name for mode-scoped events.
    #[must_use]
    pub fn mode_name(&self) -> Option<&str> {
        match self {
            Self::Pod { .. } => None,
            Self::Mode { mode, .. } => Some(mode),
        }
    }
}

/// A single emitted change: event name, new value and source.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    name: EventName,
    value: EventValue,
    source: EventSource,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(name: EventName, value: impl Into<EventValue>, source: EventSource) -> Self {
        Self {
            name,
            value: value.into(),
            source,
        }
    }

    /// Returns the event name.
    #[must_use]
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// Returns the new value.
    #[must_use]
    pub fn value(&self) -> &EventValue {
        &self.value
    }

    /// Returns the source of the change.
    #[must_use]
    pub fn source(&self) -> &EventSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_accessors() {
        assert_eq!(EventValue::from("cool").as_str(), Some("cool"));
        assert_eq!(EventValue::from(22_i64).as_f64(), Some(22.0));
        assert_eq!(EventValue::from(22_i64).as_i64(), Some(22));
        assert_eq!(EventValue::from(true).as_bool(), Some(true));
        assert_eq!(EventValue::from(1.5).as_bool(), None);
    }

    #[test]
    fn value_display() {
        assert_eq!(EventValue::from("auto").to_string(), "auto");
        assert_eq!(EventValue::from(false).to_string(), "false");
        assert_eq!(EventValue::from(21.5).to_string(), "21.5");
    }

    #[test]
    fn source_accessors() {
        let source = EventSource::Mode {
            id: PodId::new("abc"),
            pod: "Bedroom".to_string(),
            mode: "heat".to_string(),
        };
        assert_eq!(source.pod_id().as_str(), "abc");
        assert_eq!(source.pod_name(), "Bedroom");
        assert_eq!(source.mode_name(), Some("heat"));
    }
}
