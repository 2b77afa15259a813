// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event names and the property names they end with.

use std::fmt;

/// Property names used as the last segment of event names.
pub mod property {
    /// Operating mode changed (device level).
    pub const MODE: &str = "mode";
    /// Power switched on or off (device level).
    pub const POWER: &str = "power";
    /// Room temperature reading changed (device level).
    pub const ROOM_TEMP: &str = "room_temp";
    /// Room humidity reading changed (device level).
    pub const ROOM_HUMIDITY: &str = "room_humidity";
    /// Derived room dew point (device level).
    pub const ROOM_DEW_POINT: &str = "room_dew_point";
    /// Derived room heat index (device level).
    pub const ROOM_HEAT_INDEX: &str = "room_heat_index";
    /// Battery voltage reading changed (device level).
    pub const BATTERY_VOLTAGE: &str = "battery_voltage";
    /// Swing position changed (mode scoped).
    pub const SWING: &str = "swing";
    /// Set point changed (mode scoped).
    pub const TEMP: &str = "temp";
    /// Fan level changed (mode scoped).
    pub const FAN_LEVEL: &str = "fan_level";
    /// Unit of measure changed (mode scoped).
    pub const TEMP_UNIT: &str = "temp_unit";
    /// Wildcard accepted by the bind helpers.
    pub const ANY: &str = "*";

    /// Properties emitted as `{pod}.{property}`.
    pub const DEVICE_PROPERTIES: &[&str] = &[
        MODE,
        POWER,
        ROOM_TEMP,
        ROOM_HUMIDITY,
        ROOM_DEW_POINT,
        ROOM_HEAT_INDEX,
        BATTERY_VOLTAGE,
    ];

    /// Properties emitted as `{pod}.{mode}.{property}`.
    pub const MODE_PROPERTIES: &[&str] = &[SWING, TEMP, FAN_LEVEL, TEMP_UNIT];
}

/// Name of an emitted event.
///
/// Device-level events are named `{pod}.{property}` and mode-scoped events
/// `{pod}.{mode}.{property}`.
///
/// # Examples
///
/// ```
/// use sensibo_lib::event::EventName;
///
/// let name = EventName::mode_scoped("Bedroom", "cool", "temp");
/// assert_eq!(name.as_str(), "Bedroom.cool.temp");
/// assert_eq!(name.property(), "temp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName(String);

impl EventName {
    /// Wraps an already formatted event name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds a device-level event name.
    #[must_use]
    pub fn device(pod: &str, property: &str) -> Self {
        Self(format!("{pod}.{property}"))
    }

    /// Builds a mode-scoped event name.
    #[must_use]
    pub fn mode_scoped(pod: &str, mode: &str, property: &str) -> Self {
        Self(format!("{pod}.{mode}.{property}"))
    }

    /// Returns the full name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment.
    #[must_use]
    pub fn property(&self) -> &str {
        self.0
            .rsplit_once('.')
            .map_or(self.0.as_str(), |(_, property)| property)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
