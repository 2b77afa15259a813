// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the library.
//!
//! # Types
//!
//! - [`PodId`] - Opaque pod identifier assigned by the API
//! - [`PodInfo`] - Pod id plus room name
//! - [`TemperatureUnit`] - Celsius or Fahrenheit, with conversions

mod pod;
mod temperature;

pub use pod::{PodId, PodInfo};
pub use temperature::{TemperatureUnit, celsius_to_fahrenheit, fahrenheit_to_celsius};
