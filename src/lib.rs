// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `sensibo_lib` - A Rust client for Sensibo Sky air conditioner controllers.
//!
//! This library talks to the Sensibo cloud API to list your pods, read and
//! change their operating state, and watch them for changes.
//!
//! # Supported Features
//!
//! - **State control**: Power, mode, set point, fan level, swing, unit of measure
//! - **Validation**: Setters are checked against the pod's per-mode capabilities
//! - **Room readings**: Temperature, humidity, battery voltage, dew point, heat index
//! - **Change events**: Background polling with callbacks bound to event-name patterns
//!
//! # Quick Start
//!
//! ```no_run
//! use sensibo_lib::Client;
//!
//! #[tokio::main]
//! async fn main() -> sensibo_lib::Result<()> {
//!     let client = Client::new("my-api-key")?;
//!
//!     let pod = client.device("Bedroom").await?;
//!     pod.set_power(true).await?;
//!     pod.set_mode("cool").await?;
//!     pod.set_temp(23).await?;
//!
//!     println!("{} is {:.1} degrees", pod.name(), pod.room_temp().await?);
//!     Ok(())
//! }
//! ```
//!
//! # Change Events
//!
//! Events are named `{pod}.{property}` for pod-level values and
//! `{pod}.{mode}.{property}` for settings that belong to a mode. Callbacks
//! bind to exact names (compared ignoring case) or glob patterns.
//!
//! ```no_run
//! use std::time::Duration;
//! use sensibo_lib::Client;
//!
//! #[tokio::main]
//! async fn main() -> sensibo_lib::Result<()> {
//!     let client = Client::new("my-api-key")?;
//!     let pod = client.device("Bedroom").await?;
//!
//!     pod.bind("power", |n| println!("power is now {}", n.value()))?;
//!     pod.bind_mode("cool", "temp", |n| println!("cool set point {}", n.value()))?;
//!     client.router().subscribe("*.room_*", |n| println!("{} = {}", n.name(), n.value()))?;
//!
//!     pod.start_polling(Duration::from_secs(30)).await?;
//!     tokio::signal::ctrl_c().await.ok();
//!     client.stop_all().await;
//!     Ok(())
//! }
//! ```

mod capabilities;
mod client;
pub mod device;
pub mod error;
pub mod event;
pub mod poll;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;

pub use capabilities::{Capabilities, CapabilitiesBuilder, ModeCapabilities, TemperatureRange};
pub use client::Client;
pub use device::{Mode, Pod, PodRegistry};
pub use error::{
    DeviceError, Error, ParseError, ProtocolError, Result, SubscriptionError, ValueError,
};
pub use event::{EventName, EventSource, EventValue, Notification};
pub use poll::{PollConfig, PollController, PollState};
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use protocol::SkyApi;
pub use state::{AcState, Measurements, StateChange};
pub use subscription::{EventPattern, NotificationRouter, SubscriptionId};
pub use types::{PodId, PodInfo, TemperatureUnit};
