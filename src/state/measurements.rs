// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room sensor readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest sensor readings of a pod.
///
/// Readings are expressed in the pod's current unit of measure. Pods without
/// a battery report no `battery_voltage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    /// Room temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Relative humidity, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,

    /// Battery voltage, in millivolts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,

    /// When the readings were taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<MeasurementTime>,
}

impl Measurements {
    /// Creates empty measurements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the room temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the relative humidity.
    #[must_use]
    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = Some(humidity);
        self
    }

    /// Sets the battery voltage.
    #[must_use]
    pub fn with_battery_voltage(mut self, voltage: f64) -> Self {
        self.battery_voltage = Some(voltage);
        self
    }
}

/// Timestamp attached to a set of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementTime {
    /// Reading time.
    pub time: DateTime<Utc>,
    /// Age of the reading when the server answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_ago: Option<i64>,
}
