// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level pod handles.
//!
//! A [`Pod`] reads and changes the state of one air conditioner, exposes its
//! room readings and lets callers bind to its change events. Pods are
//! obtained from a [`Client`](crate::Client), which keeps one shared handle
//! per pod in a [`PodRegistry`].
//!
//! Every setter validates the value against the active [`Mode`] before
//! sending it, so an unsupported value fails locally with a
//! [`DeviceError`].
//!
//! ```no_run
//! use sensibo_lib::Client;
//! use std::time::Duration;
//!
//! # async fn example() -> sensibo_lib::Result<()> {
//! let client = Client::new("my-api-key")?;
//! let pod = client.device("Living Room").await?;
//!
//! pod.set_power(true).await?;
//! pod.set_mode("cool").await?;
//! pod.set_temp(22).await?;
//! pod.set_temp_unit("celsius").await?;
//!
//! pod.bind("room_temp", |n| println!("room is now {}", n.value()))?;
//! pod.start_polling(Duration::from_secs(10)).await?;
//! # Ok(())
//! # }
//! ```

mod mode;
mod registry;

pub use mode::Mode;
pub use registry::PodRegistry;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use crate::capabilities::Capabilities;
use crate::error::{DeviceError, SubscriptionError};
use crate::event::{Notification, property};
use crate::poll::PollController;
use crate::protocol::SkyApi;
use crate::state::{AcState, Measurements, psychrometrics};
use crate::subscription::{NotificationRouter, SubscriptionId};
use crate::types::{PodId, PodInfo, TemperatureUnit};

/// A single Sensibo pod.
///
/// Capabilities and the product model are fetched once and cached. Every
/// other read goes to the API.
pub struct Pod<A> {
    info: PodInfo,
    api: Arc<A>,
    controller: Arc<PollController<A>>,
    capabilities: OnceCell<Capabilities>,
    model: OnceCell<String>,
    /// Last unit of measure reported, for readings taken while the state
    /// omits it.
    last_unit: Mutex<Option<TemperatureUnit>>,
}

impl<A: SkyApi> Pod<A> {
    pub(crate) fn new(info: PodInfo, api: Arc<A>, controller: Arc<PollController<A>>) -> Self {
        Self {
            info,
            api,
            controller,
            capabilities: OnceCell::new(),
            model: OnceCell::new(),
            last_unit: Mutex::new(None),
        }
    }

    /// Returns the pod's room name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.info.name()
    }

    /// Returns the pod id.
    #[must_use]
    pub fn id(&self) -> &PodId {
        self.info.id()
    }

    /// Returns the pod's id and name.
    #[must_use]
    pub fn info(&self) -> &PodInfo {
        &self.info
    }

    fn router(&self) -> &Arc<NotificationRouter> {
        self.controller.router()
    }

    // ========== State ==========

    /// Reads the current operating state.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn state(&self) -> crate::Result<AcState> {
        let state = self.api.fetch_state(self.id()).await?;
        if let Some(unit) = state.temperature_unit {
            *self.last_unit.lock() = Some(unit);
        }
        Ok(state)
    }

    /// Reads the latest room readings.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn measurements(&self) -> crate::Result<Measurements> {
        self.api.fetch_measurements(self.id()).await
    }

    /// Returns the capabilities of the pod, fetching them on first use.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn capabilities(&self) -> crate::Result<&Capabilities> {
        self.capabilities
            .get_or_try_init(|| self.api.fetch_capabilities(self.info.id()))
            .await
    }

    /// Returns the product model, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn model(&self) -> crate::Result<&str> {
        self.model
            .get_or_try_init(|| self.api.fetch_model(self.info.id()))
            .await
            .map(String::as_str)
    }

    /// Reads the firmware version.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the pod does not report
    /// one, or the API error.
    pub async fn firmware_version(&self) -> crate::Result<String> {
        self.api
            .fetch_firmware_version(self.id())
            .await?
            .ok_or_else(|| DeviceError::unsupported("firmware_version").into())
    }

    // ========== Power and mode ==========

    /// Returns `true` if the air conditioner is on.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the state has no power field.
    pub async fn power(&self) -> crate::Result<bool> {
        self.state()
            .await?
            .on
            .ok_or_else(|| DeviceError::unsupported(property::POWER).into())
    }

    /// Switches the air conditioner on or off.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn set_power(&self, on: bool) -> crate::Result<()> {
        let state = self.state().await?;
        self.patch("on", &state, json!(on)).await
    }

    /// Returns the active mode.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails, the state has no mode, or the
    /// mode is not in the pod's capabilities.
    pub async fn mode(&self) -> crate::Result<Mode> {
        let state = self.state().await?;
        self.mode_of(&state).await
    }

    /// Switches to another mode.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnknownMode`] if the pod does not offer the
    /// mode, or the API error.
    pub async fn set_mode(&self, name: &str) -> crate::Result<()> {
        if !self.capabilities().await?.supports_mode(name) {
            return Err(DeviceError::UnknownMode(name.to_string()).into());
        }
        let state = self.state().await?;
        self.patch("mode", &state, json!(name)).await
    }

    /// Returns every mode the pod offers, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns error if the capabilities cannot be fetched.
    pub async fn supported_modes(&self) -> crate::Result<Vec<Mode>> {
        Ok(self
            .capabilities()
            .await?
            .modes
            .iter()
            .map(|(name, caps)| Mode::new(name.as_str(), caps.clone()))
            .collect())
    }

    /// Looks up a mode by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnknownMode`] if the pod does not offer the
    /// mode, or the API error.
    pub async fn mode_descriptor(&self, name: &str) -> crate::Result<Mode> {
        self.capabilities()
            .await?
            .mode(name)
            .map(|caps| Mode::new(name, caps.clone()))
            .ok_or_else(|| DeviceError::UnknownMode(name.to_string()).into())
    }

    async fn mode_of(&self, state: &AcState) -> crate::Result<Mode> {
        let name = state
            .mode
            .as_deref()
            .ok_or_else(|| DeviceError::unsupported(property::MODE))?;
        self.mode_descriptor(name).await
    }

    // ========== Mode-scoped settings ==========

    /// Reads the swing position.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the state has none, or
    /// the API error.
    pub async fn swing(&self) -> crate::Result<String> {
        self.state()
            .await?
            .swing
            .ok_or_else(|| DeviceError::unsupported(property::SWING).into())
    }

    /// Reads the set point, in the pod's current unit.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the state has none, or
    /// the API error.
    pub async fn temp(&self) -> crate::Result<i32> {
        self.state()
            .await?
            .target_temperature
            .ok_or_else(|| DeviceError::unsupported(property::TEMP).into())
    }

    /// Reads the fan level.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the state has none, or
    /// the API error.
    pub async fn fan_level(&self) -> crate::Result<String> {
        self.state()
            .await?
            .fan_level
            .ok_or_else(|| DeviceError::unsupported(property::FAN_LEVEL).into())
    }

    /// Reads the unit of measure.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the state has none, or
    /// the API error.
    pub async fn temp_unit(&self) -> crate::Result<TemperatureUnit> {
        self.state()
            .await?
            .temperature_unit
            .ok_or_else(|| DeviceError::unsupported(property::TEMP_UNIT).into())
    }

    /// Sets the swing position.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the active mode does not accept the
    /// position, or the API error.
    pub async fn set_swing(&self, swing: &str) -> crate::Result<()> {
        let state = self.state().await?;
        self.mode_of(&state).await?.check_swing(swing)?;
        self.patch("swing", &state, json!(swing)).await
    }

    /// Sets the set point, in the pod's current unit.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the active mode does not accept the set
    /// point, or the API error.
    pub async fn set_temp(&self, temp: i32) -> crate::Result<()> {
        let state = self.state().await?;
        let mode = self.mode_of(&state).await?;
        let unit = match self.resolve_unit(&state) {
            Some(unit) => unit,
            None => mode
                .supported_temp_units()?
                .first()
                .copied()
                .ok_or_else(|| DeviceError::unsupported(property::TEMP_UNIT))?,
        };
        mode.check_temp(unit, temp)?;
        self.patch("targetTemperature", &state, json!(temp)).await
    }

    /// Sets the fan level.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the active mode does not accept the level,
    /// or the API error.
    pub async fn set_fan_level(&self, level: &str) -> crate::Result<()> {
        let state = self.state().await?;
        self.mode_of(&state).await?.check_fan_level(level)?;
        self.patch("fanLevel", &state, json!(level)).await
    }

    /// Sets the unit of measure.
    ///
    /// Accepts `C`, `F`, `celsius` or `fahrenheit` in any case.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidTemperatureUnit`](crate::error::ValueError)
    /// for an unknown unit, [`DeviceError`] if the active mode does not
    /// accept it, or the API error.
    pub async fn set_temp_unit(&self, unit: &str) -> crate::Result<()> {
        let unit: TemperatureUnit = unit.parse()?;
        let state = self.state().await?;
        self.mode_of(&state).await?.check_temp_unit(unit)?;
        self.patch("temperatureUnit", &state, json!(unit.code())).await
    }

    async fn patch(&self, property: &str, current: &AcState, value: Value) -> crate::Result<()> {
        tracing::debug!(pod = %self.name(), property, value = %value, "Changing pod setting");
        self.api
            .set_property(self.id(), property, current, value)
            .await
    }

    // ========== Room readings ==========

    /// Reads the room temperature, in the pod's current unit.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the pod reports none, or
    /// the API error.
    pub async fn room_temp(&self) -> crate::Result<f64> {
        self.measurements()
            .await?
            .temperature
            .ok_or_else(|| DeviceError::unsupported(property::ROOM_TEMP).into())
    }

    /// Reads the relative humidity, in percent.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if the pod reports none, or
    /// the API error.
    pub async fn room_humidity(&self) -> crate::Result<f64> {
        self.measurements()
            .await?
            .humidity
            .ok_or_else(|| DeviceError::unsupported(property::ROOM_HUMIDITY).into())
    }

    /// Reads the battery voltage.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] for pods without a battery,
    /// or the API error.
    pub async fn battery_voltage(&self) -> crate::Result<f64> {
        self.measurements()
            .await?
            .battery_voltage
            .ok_or_else(|| DeviceError::unsupported(property::BATTERY_VOLTAGE).into())
    }

    /// Computes the room dew point, in the pod's current unit.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if a reading or the unit is
    /// unknown, or the API error.
    pub async fn room_dew_point(&self) -> crate::Result<f64> {
        let (t, h, unit) = self.climate(property::ROOM_DEW_POINT).await?;
        psychrometrics::dew_point(t, h, unit)
            .ok_or_else(|| DeviceError::unsupported(property::ROOM_DEW_POINT).into())
    }

    /// Computes the room heat index, in the pod's current unit.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedField`] if a reading or the unit is
    /// unknown, or the API error.
    pub async fn room_heat_index(&self) -> crate::Result<f64> {
        let (t, h, unit) = self.climate(property::ROOM_HEAT_INDEX).await?;
        Ok(psychrometrics::heat_index(t, h, unit))
    }

    async fn climate(&self, derived: &str) -> crate::Result<(f64, f64, TemperatureUnit)> {
        let (state, measurements) = tokio::try_join!(self.state(), self.measurements())?;
        let t = measurements
            .temperature
            .ok_or_else(|| DeviceError::unsupported(property::ROOM_TEMP))?;
        let h = measurements
            .humidity
            .ok_or_else(|| DeviceError::unsupported(property::ROOM_HUMIDITY))?;
        let unit = self
            .resolve_unit(&state)
            .ok_or_else(|| DeviceError::unsupported(derived))?;
        Ok((t, h, unit))
    }

    fn resolve_unit(&self, state: &AcState) -> Option<TemperatureUnit> {
        state.temperature_unit.or(*self.last_unit.lock())
    }

    // ========== Events ==========

    /// Binds a callback to a device-level property of this pod.
    ///
    /// `property` is one of `mode`, `power`, `room_temp`, `room_humidity`,
    /// `room_dew_point`, `room_heat_index`, `battery_voltage`, or `*` for
    /// every event of the pod. Callbacks only fire while the pod is polled.
    ///
    /// The pattern is built from the room name, so the name must be usable
    /// as an exact event-name prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::InvalidProperty`] for any other property,
    /// or [`SubscriptionError::InvalidPattern`] if the room name contains `*`
    /// or `?`, or has leading or trailing whitespace.
    pub fn bind<F>(&self, property: &str, callback: F) -> crate::Result<SubscriptionId>
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        if property != property::ANY && !property::DEVICE_PROPERTIES.contains(&property) {
            return Err(SubscriptionError::InvalidProperty(property.to_string()).into());
        }
        let pattern = self.event_pattern(property)?;
        Ok(self.router().subscribe(&pattern, callback)?)
    }

    /// Binds a callback to a setting of one mode of this pod.
    ///
    /// `property` is one of `swing`, `temp`, `fan_level`, `temp_unit`, or
    /// `*` for every setting of the mode. `mode` may itself be a glob, such
    /// as `*` for every mode.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::InvalidProperty`] for any other property,
    /// or [`SubscriptionError::InvalidPattern`] under the same room name
    /// rules as [`Pod::bind`].
    pub fn bind_mode<F>(&self, mode: &str, property: &str, callback: F) -> crate::Result<SubscriptionId>
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        if property != property::ANY && !property::MODE_PROPERTIES.contains(&property) {
            return Err(SubscriptionError::InvalidProperty(property.to_string()).into());
        }
        let pattern = self.event_pattern(&format!("{mode}.{property}"))?;
        Ok(self.router().subscribe(&pattern, callback)?)
    }

    /// Prefixes `suffix` with the room name, refusing names that would turn
    /// into glob syntax.
    fn event_pattern(&self, suffix: &str) -> Result<String, SubscriptionError> {
        let name = self.name();
        let pattern = format!("{name}.{suffix}");
        if name.contains(['*', '?']) {
            return Err(SubscriptionError::InvalidPattern {
                pattern,
                reason: "room name contains a wildcard character",
            });
        }
        if name.trim() != name {
            return Err(SubscriptionError::InvalidPattern {
                pattern,
                reason: "room name has leading or trailing whitespace",
            });
        }
        Ok(pattern)
    }

    // ========== Polling ==========

    /// Starts polling this pod every `interval`.
    ///
    /// # Errors
    ///
    /// See [`PollLoop::start`](crate::poll::PollLoop::start).
    pub async fn start_polling(&self, interval: Duration) -> crate::Result<()> {
        self.controller.start_polling(&self.info, interval).await
    }

    /// Stops polling this pod.
    pub async fn stop_polling(&self) {
        self.controller.stop_polling(self.id()).await;
    }

    /// Returns `true` while this pod is polled.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.controller.is_polling(self.id())
    }
}

impl<A> std::fmt::Debug for Pod<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pod")
            .field("info", &self.info)
            .field("capabilities_cached", &self.capabilities.initialized())
            .finish_non_exhaustive()
    }
}
