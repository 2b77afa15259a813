// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Values derived from room temperature and relative humidity.
//!
//! Both functions take and return temperatures in the given unit.

use crate::types::TemperatureUnit;

/// Computes the dew point with the Magnus approximation.
///
/// Returns `None` when the value is not defined (humidity of zero or below).
///
/// # Examples
///
/// ```
/// use sensibo_lib::state::psychrometrics::dew_point;
/// use sensibo_lib::types::TemperatureUnit;
///
/// let dp = dew_point(25.0, 60.0, TemperatureUnit::Celsius).unwrap();
/// assert!((dp - 16.7).abs() < 0.1);
/// ```
#[must_use]
pub fn dew_point(temperature: f64, humidity: f64, unit: TemperatureUnit) -> Option<f64> {
    let t = unit.to_celsius(temperature);
    let (a, b) = if t > 0.0 { (17.368, 238.88) } else { (17.966, 247.15) };

    let pa = humidity / 100.0 * (a * t / (b + t)).exp();
    if pa <= 0.0 {
        return None;
    }

    let ln_pa = pa.ln();
    let dp = b * ln_pa / (a - ln_pa);
    dp.is_finite().then(|| unit.from_celsius(dp))
}

/// Computes the heat index.
///
/// Uses the simple NWS formula, switching to the Rothfusz regression when
/// the simple result reaches 80 °F.
///
/// # Examples
///
/// ```
/// use sensibo_lib::state::psychrometrics::heat_index;
/// use sensibo_lib::types::TemperatureUnit;
///
/// let hi = heat_index(95.0, 80.0, TemperatureUnit::Fahrenheit);
/// assert!(hi > 130.0);
/// ```
#[must_use]
pub fn heat_index(temperature: f64, humidity: f64, unit: TemperatureUnit) -> f64 {
    let t = unit.to_fahrenheit(temperature);
    let h = humidity;

    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + h * 0.094);
    let hi = if simple >= 80.0 { rothfusz(t, h) } else { simple };

    unit.from_fahrenheit(hi)
}

fn rothfusz(t: f64, h: f64) -> f64 {
    let (t2, h2) = (t * t, h * h);
    -42.379 + 2.049_015_23 * t + 10.143_331_27 * h
        - 0.224_755_41 * t * h
        - 6.837_83e-3 * t2
        - 5.481_717e-2 * h2
        + 1.228_74e-3 * t2 * h
        + 8.5282e-4 * t * h2
        - 1.99e-6 * t2 * h2
}
