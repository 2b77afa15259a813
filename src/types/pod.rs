// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pod identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a pod as assigned by the cloud API.
///
/// This is a wrapper around the opaque id string that provides a distinct
/// type for pod identification, preventing accidental confusion with room
/// names or other strings.
///
/// # Examples
///
/// ```
/// use sensibo_lib::types::PodId;
///
/// let id = PodId::new("a1B2c3D4");
/// assert_eq!(id.as_str(), "a1B2c3D4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PodId(String);

impl PodId {
    /// Creates a pod identifier from the API's id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PodId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A pod's identity: its API id and its room name.
///
/// The room name is the first segment of every event name the pod emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodInfo {
    id: PodId,
    name: String,
}

impl PodInfo {
    /// Creates pod info from an id and a room name.
    #[must_use]
    pub fn new(id: impl Into<PodId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Returns the pod id.
    #[must_use]
    pub fn id(&self) -> &PodId {
        &self.id
    }

    /// Returns the room name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
