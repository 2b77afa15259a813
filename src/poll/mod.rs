// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background polling of pod state.
//!
//! The cloud API has no push channel, so changes are detected by polling.
//! Each pod gets at most one [`PollLoop`]: a tokio task that periodically
//! fetches the pod's state and readings, diffs them against the previous
//! snapshot and publishes every change through the shared
//! [`NotificationRouter`](crate::subscription::NotificationRouter).
//!
//! A loop moves through [`PollState::Idle`], [`PollState::Running`] and
//! [`PollState::Stopping`]. The [`PollController`] keeps one loop per pod id.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sensibo_lib::poll::{PollConfig, PollController};
//! use sensibo_lib::protocol::{HttpClient, SkyApi};
//! use sensibo_lib::subscription::NotificationRouter;
//! use sensibo_lib::types::PodInfo;
//!
//! # async fn example() -> sensibo_lib::Result<()> {
//! let api = Arc::new(HttpClient::new("my-api-key")?);
//! let router = Arc::new(NotificationRouter::new());
//! router.subscribe("*.power", |n| println!("{} -> {}", n.name(), n.value()))?;
//!
//! let controller = PollController::new(Arc::clone(&api), router, PollConfig::default());
//! for pod in api.list_pods().await? {
//!     controller.start_polling(&PodInfo::from(pod), Duration::from_secs(30)).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod controller;
mod poll_loop;

pub use controller::PollController;
pub use poll_loop::PollLoop;

use std::fmt;
use std::time::Duration;

/// Lifecycle state of a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PollState {
    /// No task is running.
    #[default]
    Idle,
    /// The task is polling.
    Running,
    /// Cancellation was requested and the task has not exited yet.
    Stopping,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running => f.write_str("running"),
            Self::Stopping => f.write_str("stopping"),
        }
    }
}

/// Configuration for poll loops.
///
/// # Examples
///
/// ```
/// use sensibo_lib::poll::PollConfig;
/// use std::time::Duration;
///
/// let config = PollConfig::new().with_stop_timeout(Duration::from_secs(1));
/// assert_eq!(config.stop_timeout(), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct PollConfig {
    stop_timeout: Duration,
}

impl PollConfig {
    /// Default time `stop` waits for the task to exit.
    pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(3);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stop_timeout: Self::DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Sets how long `stop` waits for the task to exit.
    #[must_use]
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Returns the stop timeout.
    #[must_use]
    pub fn stop_timeout(&self) -> Duration {
        self.stop_timeout
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}
