// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for pod state changes.
//!
//! Poll loops publish every detected change through a shared
//! [`NotificationRouter`]. Applications register callbacks under an
//! [`EventPattern`] and receive each matching [`Notification`](crate::event::Notification).
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`EventPattern`] - Exact (case-insensitive) or glob pattern over event names
//! - [`NotificationRouter`] - The subscription table and dispatcher
//!
//! # Usage
//!
//! ```no_run
//! use sensibo_lib::Client;
//! use std::time::Duration;
//!
//! # async fn example() -> sensibo_lib::Result<()> {
//! let client = Client::new("my-api-key")?;
//! let pod = client.device("Bedroom").await?;
//!
//! // Everything the bedroom pod emits
//! let sub_id = pod.bind("*", |n| println!("{} = {}", n.name(), n.value()))?;
//!
//! pod.start_polling(Duration::from_secs(5)).await?;
//!
//! // Later, unsubscribe
//! client.unbind(sub_id)?;
//! # Ok(())
//! # }
//! ```

mod pattern;
mod router;

pub use pattern::EventPattern;
pub use router::{NotificationRouter, SubscriptionId};
