// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Baseline tracking and snapshot diffing.

use crate::capabilities::{Capabilities, ModeCapabilities};
use crate::types::TemperatureUnit;

use super::psychrometrics;
use super::{AcState, Measurements, StateChange};

/// Last-known state of one pod, diffed against each fresh snapshot.
///
/// The tracker only ever learns from known values: a field missing from a
/// fresh snapshot is not a change and leaves the last-known value in place.
/// Values are compared raw, without unit normalization.
///
/// # Examples
///
/// ```
/// use sensibo_lib::Capabilities;
/// use sensibo_lib::state::{AcState, Measurements, StateChange, StateTracker};
///
/// let baseline = AcState::new().with_mode("cool").with_power(false);
/// let mut tracker = StateTracker::new(Capabilities::default(), baseline.clone(), Measurements::new());
///
/// let changes = tracker.update(&baseline.clone().with_power(true), &Measurements::new());
/// assert_eq!(changes, vec![StateChange::Power(true)]);
///
/// // Same snapshot again: nothing to report.
/// assert!(tracker.update(&baseline.with_power(true), &Measurements::new()).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct StateTracker {
    capabilities: Capabilities,
    state: AcState,
    measurements: Measurements,
    /// Descriptor of the active mode, if the pod advertises it.
    mode: Option<ModeCapabilities>,
    /// Last unit of measure seen, used when a snapshot omits it.
    unit: Option<TemperatureUnit>,
}

impl StateTracker {
    /// Creates a tracker seeded with a baseline. No changes are reported for
    /// the baseline itself.
    #[must_use]
    pub fn new(capabilities: Capabilities, state: AcState, measurements: Measurements) -> Self {
        let mode = state
            .mode
            .as_deref()
            .and_then(|name| capabilities.mode(name))
            .cloned();
        let unit = state.temperature_unit;
        Self {
            capabilities,
            state,
            measurements,
            mode,
            unit,
        }
    }

    /// Returns the last-known operating state.
    #[must_use]
    pub fn state(&self) -> &AcState {
        &self.state
    }

    /// Returns the last-known sensor readings.
    #[must_use]
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Returns the name of the active mode.
    #[must_use]
    pub fn mode_name(&self) -> Option<&str> {
        self.state.mode.as_deref()
    }

    /// Returns the last-known unit of measure.
    #[must_use]
    pub fn unit(&self) -> Option<TemperatureUnit> {
        self.unit
    }

    /// Diffs a fresh snapshot against the baseline and rebaselines.
    ///
    /// Changes are returned in publication order: mode, mode-scoped settings,
    /// power, temperature and humidity with their derived values, battery.
    pub fn update(&mut self, state: &AcState, measurements: &Measurements) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if let Some(mode) = changed(state.mode.as_ref(), &mut self.state.mode) {
            self.mode = self.capabilities.mode(&mode).cloned();
            changes.push(StateChange::Mode(mode));
        }

        self.diff_mode_scoped(state, &mut changes);

        if let Some(on) = changed(state.on.as_ref(), &mut self.state.on) {
            changes.push(StateChange::Power(on));
        }

        if let Some(unit) = state.temperature_unit {
            self.unit = Some(unit);
        }
        self.diff_climate(measurements, &mut changes);

        if let Some(voltage) = changed(
            measurements.battery_voltage.as_ref(),
            &mut self.measurements.battery_voltage,
        ) {
            changes.push(StateChange::BatteryVoltage(voltage));
        }

        if measurements.time.is_some() {
            self.measurements.time.clone_from(&measurements.time);
        }
        self.state.extra.clone_from(&state.extra);

        changes
    }

    fn diff_mode_scoped(&mut self, state: &AcState, changes: &mut Vec<StateChange>) {
        let Some(mode) = self.state.mode.clone() else {
            return;
        };
        // Fields the active mode does not offer are treated as unknown.
        let (swing_ok, temp_ok, fan_ok) = match &self.mode {
            Some(caps) => (
                caps.supports_swing(),
                caps.supports_temperature(),
                caps.supports_fan_level(),
            ),
            None => (true, true, true),
        };

        if swing_ok && let Some(swing) = changed(state.swing.as_ref(), &mut self.state.swing) {
            changes.push(StateChange::Swing {
                mode: mode.clone(),
                swing,
            });
        }

        if temp_ok
            && let Some(temperature) = changed(
                state.target_temperature.as_ref(),
                &mut self.state.target_temperature,
            )
        {
            changes.push(StateChange::TargetTemperature {
                mode: mode.clone(),
                temperature,
            });
        }

        if fan_ok && let Some(level) = changed(state.fan_level.as_ref(), &mut self.state.fan_level) {
            changes.push(StateChange::FanLevel {
                mode: mode.clone(),
                level,
            });
        }

        if temp_ok
            && let Some(unit) = changed(
                state.temperature_unit.as_ref(),
                &mut self.state.temperature_unit,
            )
        {
            changes.push(StateChange::TemperatureUnit { mode, unit });
        }
    }

    fn diff_climate(&mut self, measurements: &Measurements, changes: &mut Vec<StateChange>) {
        let temperature = changed(
            measurements.temperature.as_ref(),
            &mut self.measurements.temperature,
        );
        let humidity = changed(
            measurements.humidity.as_ref(),
            &mut self.measurements.humidity,
        );

        if temperature.is_none() && humidity.is_none() {
            return;
        }
        if let Some(t) = temperature {
            changes.push(StateChange::RoomTemperature(t));
        }
        if let Some(h) = humidity {
            changes.push(StateChange::RoomHumidity(h));
        }

        let (Some(t), Some(h), Some(unit)) = (
            self.measurements.temperature,
            self.measurements.humidity,
            self.unit,
        ) else {
            return;
        };
        if let Some(dp) = psychrometrics::dew_point(t, h, unit) {
            changes.push(StateChange::RoomDewPoint(dp));
        }
        let hi = psychrometrics::heat_index(t, h, unit);
        if hi.is_finite() {
            changes.push(StateChange::RoomHeatIndex(hi));
        }
    }
}

/// Records `fresh` into `known` and returns it if it is a known, different value.
fn changed<T: PartialEq + Clone>(fresh: Option<&T>, known: &mut Option<T>) -> Option<T> {
    let fresh = fresh?;
    if known.as_ref() == Some(fresh) {
        return None;
    }
    *known = Some(fresh.clone());
    Some(fresh.clone())
}
