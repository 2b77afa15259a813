// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport to the Sensibo Sky cloud API.
//!
//! The rest of the crate talks to the cloud through the [`SkyApi`] trait, so
//! the poll loop and the device API can run against any implementation.
//!
//! # Implementations
//!
//! - [`HttpClient`]: the REST API over HTTPS (feature `http`, enabled by default)

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::state::{AcState, Measurements};
use crate::types::{PodId, PodInfo};

/// A pod as listed for the authenticated user.
///
/// # Examples
///
/// ```
/// use sensibo_lib::protocol::PodSummary;
///
/// let pod: PodSummary = serde_json::from_str(
///     r#"{"id": "a1b2c3", "room": {"name": "Bedroom", "icon": "bedroom"}}"#,
/// ).unwrap();
/// assert_eq!(pod.name(), "Bedroom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSummary {
    /// Pod id.
    pub id: PodId,
    /// Room the pod is installed in.
    pub room: Room,
}

impl PodSummary {
    /// Returns the room name, used as the pod's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.room.name
    }
}

impl From<PodSummary> for PodInfo {
    fn from(summary: PodSummary) -> Self {
        PodInfo::new(summary.id, summary.room.name)
    }
}

/// Room metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room name.
    pub name: String,
}

/// Operations the library needs from the cloud API.
///
/// Every call is independent; implementations hold no per-pod state.
pub trait SkyApi: Send + Sync + 'static {
    /// Lists the pods of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    fn list_pods(&self) -> impl Future<Output = crate::Result<Vec<PodSummary>>> + Send;

    /// Reads the current operating state of a pod.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    fn fetch_state(&self, pod: &PodId) -> impl Future<Output = crate::Result<AcState>> + Send;

    /// Reads the latest sensor readings of a pod.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    fn fetch_measurements(
        &self,
        pod: &PodId,
    ) -> impl Future<Output = crate::Result<Measurements>> + Send;

    /// Reads the per-mode capabilities of a pod.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    fn fetch_capabilities(
        &self,
        pod: &PodId,
    ) -> impl Future<Output = crate::Result<Capabilities>> + Send;

    /// Reads the product model of a pod.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    fn fetch_model(&self, pod: &PodId) -> impl Future<Output = crate::Result<String>> + Send;

    /// Reads the firmware version of a pod, if it reports one.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    fn fetch_firmware_version(
        &self,
        pod: &PodId,
    ) -> impl Future<Output = crate::Result<Option<String>>> + Send;

    /// Changes one operating-state property.
    ///
    /// `property` is the wire name (`on`, `mode`, `targetTemperature`, ...)
    /// and `current` the state the change applies to.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the API rejects the value.
    fn set_property(
        &self,
        pod: &PodId,
        property: &str,
        current: &AcState,
        value: serde_json::Value,
    ) -> impl Future<Output = crate::Result<()>> + Send;
}
