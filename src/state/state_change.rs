// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] is one observed difference between two consecutive
//! snapshots of a pod. The [`StateTracker`](super::StateTracker) produces
//! them and the poll loop turns each into a
//! [`Notification`](crate::event::Notification).
//!
//! # Change Types
//!
//! - [`StateChange::Mode`] - Operating mode switched
//! - [`StateChange::Swing`], [`StateChange::TargetTemperature`],
//!   [`StateChange::FanLevel`], [`StateChange::TemperatureUnit`] - Mode-scoped
//!   settings, tagged with the mode that was active
//! - [`StateChange::Power`] - Power toggled
//! - [`StateChange::RoomTemperature`], [`StateChange::RoomHumidity`],
//!   [`StateChange::BatteryVoltage`] - Sensor readings
//! - [`StateChange::RoomDewPoint`], [`StateChange::RoomHeatIndex`] - Derived
//!   from temperature and humidity
//!
//! # Examples
//!
//! ```
//! use sensibo_lib::state::StateChange;
//! use sensibo_lib::types::PodInfo;
//!
//! let change = StateChange::TargetTemperature { mode: "cool".into(), temperature: 22 };
//! assert_eq!(change.property(), "temp");
//! assert!(change.is_mode_scoped());
//!
//! let notification = change.to_notification(&PodInfo::new("abc", "Bedroom"));
//! assert_eq!(notification.name().as_str(), "Bedroom.cool.temp");
//! ```

use crate::event::{EventName, EventSource, EventValue, Notification, property};
use crate::types::{PodInfo, TemperatureUnit};

/// Represents a change in pod state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// The operating mode changed.
    Mode(String),
    /// The swing position changed.
    Swing {
        /// Active mode.
        mode: String,
        /// New swing position.
        swing: String,
    },
    /// The set point changed.
    TargetTemperature {
        /// Active mode.
        mode: String,
        /// New set point.
        temperature: i32,
    },
    /// The fan level changed.
    FanLevel {
        /// Active mode.
        mode: String,
        /// New fan level.
        level: String,
    },
    /// The unit of measure changed.
    TemperatureUnit {
        /// Active mode.
        mode: String,
        /// New unit.
        unit: TemperatureUnit,
    },
    /// Power toggled.
    Power(bool),
    /// Room temperature reading changed.
    RoomTemperature(f64),
    /// Room humidity reading changed.
    RoomHumidity(f64),
    /// Dew point recomputed after a temperature or humidity change.
    RoomDewPoint(f64),
    /// Heat index recomputed after a temperature or humidity change.
    RoomHeatIndex(f64),
    /// Battery voltage reading changed.
    BatteryVoltage(f64),
}

impl StateChange {
    /// Returns the property name used in event names.
    #[must_use]
    pub fn property(&self) -> &'static str {
        match self {
            Self::Mode(_) => property::MODE,
            Self::Swing { .. } => property::SWING,
            Self::TargetTemperature { .. } => property::TEMP,
            Self::FanLevel { .. } => property::FAN_LEVEL,
            Self::TemperatureUnit { .. } => property::TEMP_UNIT,
            Self::Power(_) => property::POWER,
            Self::RoomTemperature(_) => property::ROOM_TEMP,
            Self::RoomHumidity(_) => property::ROOM_HUMIDITY,
            Self::RoomDewPoint(_) => property::ROOM_DEW_POINT,
            Self::RoomHeatIndex(_) => property::ROOM_HEAT_INDEX,
            Self::BatteryVoltage(_) => property::BATTERY_VOLTAGE,
        }
    }

    /// Returns the mode a mode-scoped change belongs to.
    #[must_use]
    pub fn mode_name(&self) -> Option<&str> {
        match self {
            Self::Swing { mode, .. }
            | Self::TargetTemperature { mode, .. }
            | Self::FanLevel { mode, .. }
            | Self::TemperatureUnit { mode, .. } => Some(mode),
            _ => None,
        }
    }

    /// Returns `true` for changes published under `{pod}.{mode}.{property}`.
    #[must_use]
    pub fn is_mode_scoped(&self) -> bool {
        self.mode_name().is_some()
    }

    /// Returns the new value.
    #[must_use]
    pub fn value(&self) -> EventValue {
        match self {
            Self::Mode(mode) => mode.as_str().into(),
            Self::Swing { swing, .. } => swing.as_str().into(),
            Self::TargetTemperature { temperature, .. } => i64::from(*temperature).into(),
            Self::FanLevel { level, .. } => level.as_str().into(),
            Self::TemperatureUnit { unit, .. } => unit.code().into(),
            Self::Power(on) => (*on).into(),
            Self::RoomTemperature(v)
            | Self::RoomHumidity(v)
            | Self::RoomDewPoint(v)
            | Self::RoomHeatIndex(v)
            | Self::BatteryVoltage(v) => (*v).into(),
        }
    }

    /// Builds the notification published for this change.
    #[must_use]
    pub fn to_notification(&self, pod: &PodInfo) -> Notification {
        let (name, source) = match self.mode_name() {
            Some(mode) => (
                EventName::mode_scoped(pod.name(), mode, self.property()),
                EventSource::Mode {
                    id: pod.id().clone(),
                    pod: pod.name().to_string(),
                    mode: mode.to_string(),
                },
            ),
            None => (
                EventName::device(pod.name(), self.property()),
                EventSource::Pod {
                    id: pod.id().clone(),
                    name: pod.name().to_string(),
                },
            ),
        };
        Notification::new(name, self.value(), source)
    }
}
