// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote capabilities of a pod.
//!
//! The API describes, per operating mode, which fields the air conditioner
//! accepts while that mode is active and which values each field supports.
//! Capabilities are fetched once per pod and then looked up by mode name.
//!
//! # Manual Configuration
//!
//! Tests and offline tools can describe capabilities with the builder:
//!
//! ```
//! use sensibo_lib::{Capabilities, ModeCapabilities};
//! use sensibo_lib::types::TemperatureUnit;
//!
//! let caps = Capabilities::builder()
//!     .mode(
//!         "cool",
//!         ModeCapabilities::new()
//!             .with_swing(["stopped", "rangeFull"])
//!             .with_temperatures(TemperatureUnit::Celsius, 16..=30)
//!             .with_fan_levels(["low", "high", "auto"]),
//!     )
//!     .mode("fan", ModeCapabilities::new().with_fan_levels(["low", "high"]))
//!     .build();
//!
//! assert!(caps.mode("cool").unwrap().supports_temperature());
//! assert!(!caps.mode("fan").unwrap().supports_temperature());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TemperatureUnit;

/// Capabilities of a pod, keyed by operating mode name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Supported fields for each operating mode (`cool`, `heat`, `fan`, ...).
    #[serde(default)]
    pub modes: BTreeMap<String, ModeCapabilities>,
}

impl Capabilities {
    /// Creates a builder for manual configuration.
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Looks up the capabilities of a mode by name.
    #[must_use]
    pub fn mode(&self, name: &str) -> Option<&ModeCapabilities> {
        self.modes.get(name)
    }

    /// Returns `true` if the pod offers the named mode.
    #[must_use]
    pub fn supports_mode(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    /// Returns the supported mode names in sorted order.
    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }
}

/// Fields supported while a specific mode is active.
///
/// A field that is `None` is not available in this mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeCapabilities {
    /// Supported swing positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing: Option<Vec<String>>,

    /// Supported set points, keyed by unit code (`"C"`, `"F"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatures: Option<BTreeMap<String, TemperatureRange>>,

    /// Supported fan levels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_levels: Option<Vec<String>>,
}

impl ModeCapabilities {
    /// Creates capabilities with no supported fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the supported swing positions.
    #[must_use]
    pub fn with_swing<I, S>(mut self, positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.swing = Some(positions.into_iter().map(Into::into).collect());
        self
    }

    /// Adds the supported set points for a unit.
    #[must_use]
    pub fn with_temperatures(
        mut self,
        unit: TemperatureUnit,
        values: impl IntoIterator<Item = i32>,
    ) -> Self {
        self.temperatures.get_or_insert_with(BTreeMap::new).insert(
            unit.code().to_string(),
            TemperatureRange {
                is_native: false,
                values: values.into_iter().collect(),
            },
        );
        self
    }

    /// Adds the supported fan levels.
    #[must_use]
    pub fn with_fan_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fan_levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` if swing can be controlled in this mode.
    #[must_use]
    pub fn supports_swing(&self) -> bool {
        self.swing.is_some()
    }

    /// Returns `true` if a set point (and therefore a unit) exists in this mode.
    #[must_use]
    pub fn supports_temperature(&self) -> bool {
        self.temperatures.is_some()
    }

    /// Returns `true` if the fan level can be controlled in this mode.
    #[must_use]
    pub fn supports_fan_level(&self) -> bool {
        self.fan_levels.is_some()
    }

    /// Returns the units this mode accepts set points in.
    ///
    /// Unit keys the library does not recognise are skipped.
    #[must_use]
    pub fn temperature_units(&self) -> Vec<TemperatureUnit> {
        self.temperatures
            .iter()
            .flat_map(BTreeMap::keys)
            .filter_map(|key| key.parse().ok())
            .collect()
    }

    /// Returns the supported set points for a unit.
    #[must_use]
    pub fn temperatures_for(&self, unit: TemperatureUnit) -> Option<&[i32]> {
        self.temperatures
            .as_ref()?
            .iter()
            .find(|(key, _)| key.parse::<TemperatureUnit>().ok() == Some(unit))
            .map(|(_, range)| range.values.as_slice())
    }
}

/// Set points supported for one unit of measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureRange {
    /// Whether this is the air conditioner's native unit.
    #[serde(default)]
    pub is_native: bool,
    /// Accepted set points.
    #[serde(default)]
    pub values: Vec<i32>,
}

/// Builder for creating capabilities by hand.
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    modes: BTreeMap<String, ModeCapabilities>,
}

impl CapabilitiesBuilder {
    /// Creates a new builder with no modes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a mode.
    #[must_use]
    pub fn mode(mut self, name: impl Into<String>, capabilities: ModeCapabilities) -> Self {
        self.modes.insert(name.into(), capabilities);
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        Capabilities { modes: self.modes }
    }
}
