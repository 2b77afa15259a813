// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory API for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::capabilities::Capabilities;
use crate::error::ProtocolError;
use crate::protocol::{PodSummary, Room, SkyApi};
use crate::state::{AcState, Measurements};
use crate::types::PodId;

/// A recorded `set_property` call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Patch {
    pub pod: PodId,
    pub property: String,
    pub current: AcState,
    pub value: serde_json::Value,
}

/// Single-account fake whose state tests mutate directly.
#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    pods: Mutex<Vec<PodSummary>>,
    capabilities: Mutex<Capabilities>,
    state: Mutex<AcState>,
    measurements: Mutex<Measurements>,
    model: Mutex<String>,
    firmware: Mutex<Option<String>>,
    patches: Mutex<Vec<Patch>>,
    /// Number of upcoming fetches that fail.
    failures: AtomicUsize,
    /// Delay applied once to the next state fetch.
    stall: Mutex<Option<Duration>>,
    state_fetches: AtomicUsize,
    capability_fetches: AtomicUsize,
}

impl FakeApi {
    pub fn new(capabilities: Capabilities, state: AcState, measurements: Measurements) -> Self {
        Self {
            capabilities: Mutex::new(capabilities),
            state: Mutex::new(state),
            measurements: Mutex::new(measurements),
            model: Mutex::new("skyv2".to_string()),
            ..Self::default()
        }
    }

    pub fn with_pod(self, id: &str, name: &str) -> Self {
        self.pods.lock().push(PodSummary {
            id: PodId::new(id),
            room: Room {
                name: name.to_string(),
            },
        });
        self
    }

    pub fn with_firmware(self, version: &str) -> Self {
        *self.firmware.lock() = Some(version.to_string());
        self
    }

    pub fn set_measurements(&self, measurements: Measurements) {
        *self.measurements.lock() = measurements;
    }

    pub fn update_state(&self, f: impl FnOnce(&mut AcState)) {
        f(&mut self.state.lock());
    }

    pub fn stall_next(&self, delay: Duration) {
        *self.stall.lock() = Some(delay);
    }

    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub fn state_fetches(&self) -> usize {
        self.state_fetches.load(Ordering::SeqCst)
    }

    pub fn capability_fetches(&self) -> usize {
        self.capability_fetches.load(Ordering::SeqCst)
    }

    pub fn patches(&self) -> Vec<Patch> {
        self.patches.lock().clone()
    }

    fn check_failure(&self) -> crate::Result<()> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ProtocolError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl SkyApi for FakeApi {
    async fn list_pods(&self) -> crate::Result<Vec<PodSummary>> {
        self.check_failure()?;
        Ok(self.pods.lock().clone())
    }

    async fn fetch_state(&self, _pod: &PodId) -> crate::Result<AcState> {
        self.state_fetches.fetch_add(1, Ordering::SeqCst);
        let stall = self.stall.lock().take();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;
        Ok(self.state.lock().clone())
    }

    async fn fetch_measurements(&self, _pod: &PodId) -> crate::Result<Measurements> {
        Ok(self.measurements.lock().clone())
    }

    async fn fetch_capabilities(&self, _pod: &PodId) -> crate::Result<Capabilities> {
        self.capability_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.capabilities.lock().clone())
    }

    async fn fetch_model(&self, _pod: &PodId) -> crate::Result<String> {
        Ok(self.model.lock().clone())
    }

    async fn fetch_firmware_version(&self, _pod: &PodId) -> crate::Result<Option<String>> {
        Ok(self.firmware.lock().clone())
    }

    async fn set_property(
        &self,
        pod: &PodId,
        property: &str,
        current: &AcState,
        value: serde_json::Value,
    ) -> crate::Result<()> {
        self.state.lock().apply(property, &value);
        self.patches.lock().push(Patch {
            pod: pod.clone(),
            property: property.to_string(),
            current: current.clone(),
            value,
        });
        Ok(())
    }
}
