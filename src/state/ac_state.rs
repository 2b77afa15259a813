// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating state of the air conditioner behind a pod.

use serde::{Deserialize, Serialize};

use crate::types::TemperatureUnit;

/// Point-in-time operating state, as returned by the `acStates` endpoint.
///
/// Every field is optional: the API omits fields the current mode does not
/// support. Fields the library does not model are preserved in `extra` so the
/// complete state can be sent back when changing a property.
///
/// # Examples
///
/// ```
/// use sensibo_lib::state::AcState;
///
/// let state: AcState = serde_json::from_str(
///     r#"{"on": true, "mode": "cool", "targetTemperature": 22, "temperatureUnit": "C"}"#,
/// ).unwrap();
/// assert_eq!(state.on, Some(true));
/// assert_eq!(state.mode.as_deref(), Some("cool"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcState {
    /// Power state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,

    /// Active mode name (`cool`, `heat`, `fan`, `auto`, `dry`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Swing position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing: Option<String>,

    /// Set point, in `temperature_unit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<i32>,

    /// Fan level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_level: Option<String>,

    /// Unit of measure of the set point and room readings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<TemperatureUnit>,

    /// Fields not modelled above (`timestamp`, `light`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AcState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the power state.
    #[must_use]
    pub fn with_power(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Sets the swing position.
    #[must_use]
    pub fn with_swing(mut self, swing: impl Into<String>) -> Self {
        self.swing = Some(swing.into());
        self
    }

    /// Sets the set point.
    #[must_use]
    pub fn with_target_temperature(mut self, temperature: i32) -> Self {
        self.target_temperature = Some(temperature);
        self
    }

    /// Sets the fan level.
    #[must_use]
    pub fn with_fan_level(mut self, level: impl Into<String>) -> Self {
        self.fan_level = Some(level.into());
        self
    }

    /// Sets the unit of measure.
    #[must_use]
    pub fn with_temperature_unit(mut self, unit: TemperatureUnit) -> Self {
        self.temperature_unit = Some(unit);
        self
    }

    /// Applies a property change as the API would, by wire name.
    ///
    /// Returns `false` if the value does not fit the property; unknown
    /// properties are stored in `extra`.
    pub fn apply(&mut self, property: &str, value: &serde_json::Value) -> bool {
        match property {
            "on" => value.as_bool().map(|v| self.on = Some(v)).is_some(),
            "mode" => value.as_str().map(|v| self.mode = Some(v.to_string())).is_some(),
            "swing" => value.as_str().map(|v| self.swing = Some(v.to_string())).is_some(),
            "fanLevel" => value
                .as_str()
                .map(|v| self.fan_level = Some(v.to_string()))
                .is_some(),
            "targetTemperature" => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(|v| self.target_temperature = Some(v))
                .is_some(),
            "temperatureUnit" => value
                .as_str()
                .and_then(|v| v.parse().ok())
                .map(|v| self.temperature_unit = Some(v))
                .is_some(),
            other => {
                self.extra.insert(other.to_string(), value.clone());
                true
            }
        }
    }
}
