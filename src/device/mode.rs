// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode descriptors.

use crate::capabilities::ModeCapabilities;
use crate::error::DeviceError;
use crate::event::property;
use crate::types::TemperatureUnit;

/// An operating mode of a pod and the settings it accepts.
///
/// Looked up by name from the pod's [`Capabilities`](crate::Capabilities).
///
/// # Examples
///
/// ```
/// use sensibo_lib::ModeCapabilities;
/// use sensibo_lib::device::Mode;
/// use sensibo_lib::types::TemperatureUnit;
///
/// let cool = Mode::new(
///     "cool",
///     ModeCapabilities::new()
///         .with_temperatures(TemperatureUnit::Celsius, 18..=30)
///         .with_fan_levels(["low", "high"]),
/// );
///
/// assert_eq!(cool.supported_fan_levels().unwrap(), ["low", "high"]);
/// assert!(cool.supported_swing_modes().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    name: String,
    capabilities: ModeCapabilities,
}

impl Mode {
    /// Creates a mode descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, capabilities: ModeCapabilities) -> Self {
        Self {
            name: name.into(),
            capabilities,
        }
    }

    /// Returns the mode name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw capabilities of this mode.
    #[must_use]
    pub fn capabilities(&self) -> &ModeCapabilities {
        &self.capabilities
    }

    /// Returns the swing positions this mode accepts.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the mode has no swing.
    pub fn supported_swing_modes(&self) -> Result<&[String], DeviceError> {
        self.capabilities
            .swing
            .as_deref()
            .ok_or_else(|| DeviceError::unsupported(property::SWING))
    }

    /// Returns the units set points can be expressed in.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the mode has no set point.
    pub fn supported_temp_units(&self) -> Result<Vec<TemperatureUnit>, DeviceError> {
        if !self.capabilities.supports_temperature() {
            return Err(DeviceError::unsupported(property::TEMP_UNIT));
        }
        Ok(self.capabilities.temperature_units())
    }

    /// Returns the set points this mode accepts in a unit.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the mode has no set point
    /// in that unit.
    pub fn supported_temps(&self, unit: TemperatureUnit) -> Result<&[i32], DeviceError> {
        self.capabilities
            .temperatures_for(unit)
            .ok_or_else(|| DeviceError::unsupported(property::TEMP))
    }

    /// Returns the fan levels this mode accepts.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the fan level is fixed.
    pub fn supported_fan_levels(&self) -> Result<&[String], DeviceError> {
        self.capabilities
            .fan_levels
            .as_deref()
            .ok_or_else(|| DeviceError::unsupported(property::FAN_LEVEL))
    }

    /// Checks a swing position against this mode.
    pub(crate) fn check_swing(&self, swing: &str) -> Result<(), DeviceError> {
        check_listed(property::SWING, self.supported_swing_modes()?, swing)
    }

    /// Checks a fan level against this mode.
    pub(crate) fn check_fan_level(&self, level: &str) -> Result<(), DeviceError> {
        check_listed(property::FAN_LEVEL, self.supported_fan_levels()?, level)
    }

    /// Checks a set point in `unit` against this mode.
    pub(crate) fn check_temp(&self, unit: TemperatureUnit, temp: i32) -> Result<(), DeviceError> {
        if self.supported_temps(unit)?.contains(&temp) {
            Ok(())
        } else {
            Err(DeviceError::UnsupportedValue {
                field: property::TEMP.to_string(),
                value: format!("{temp}{unit}"),
            })
        }
    }

    /// Checks a unit of measure against this mode.
    pub(crate) fn check_temp_unit(&self, unit: TemperatureUnit) -> Result<(), DeviceError> {
        if self.supported_temp_units()?.contains(&unit) {
            Ok(())
        } else {
            Err(DeviceError::UnsupportedValue {
                field: property::TEMP_UNIT.to_string(),
                value: unit.to_string(),
            })
        }
    }
}

fn check_listed(field: &str, supported: &[String], value: &str) -> Result<(), DeviceError> {
    if supported.iter().any(|s| s == value) {
        Ok(())
    } else {
        Err(DeviceError::UnsupportedValue {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}
