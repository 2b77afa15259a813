// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pod state snapshots and change detection.
//!
//! A pod is read as two snapshots: its operating state ([`AcState`]) and its
//! room sensor readings ([`Measurements`]). A [`StateTracker`] keeps the
//! last-known values and turns each fresh pair of snapshots into an ordered
//! list of [`StateChange`]s.
//!
//! # Examples
//!
//! ```
//! use sensibo_lib::Capabilities;
//! use sensibo_lib::state::{AcState, Measurements, StateChange, StateTracker};
//! use sensibo_lib::types::TemperatureUnit;
//!
//! let state = AcState::new()
//!     .with_mode("cool")
//!     .with_temperature_unit(TemperatureUnit::Celsius);
//! let mut tracker = StateTracker::new(
//!     Capabilities::default(),
//!     state.clone(),
//!     Measurements::new().with_temperature(24.0).with_humidity(50.0),
//! );
//!
//! let changes = tracker.update(&state, &Measurements::new().with_temperature(25.0));
//! assert_eq!(changes[0], StateChange::RoomTemperature(25.0));
//! assert_eq!(changes[1].property(), "room_dew_point");
//! ```

mod ac_state;
mod measurements;
pub mod psychrometrics;
mod state_change;
mod tracker;

pub use ac_state::AcState;
pub use measurements::{MeasurementTime, Measurements};
pub use state_change::StateChange;
pub use tracker::StateTracker;
