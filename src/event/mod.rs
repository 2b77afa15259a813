// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event naming and notification payloads.
//!
//! Every change detected by a poll loop is published as a [`Notification`]:
//! an [`EventName`] such as `Bedroom.power` or `Bedroom.cool.temp`, the new
//! [`EventValue`], and the [`EventSource`] it belongs to.
//!
//! # Examples
//!
//! ```
//! use sensibo_lib::event::{EventName, EventSource, Notification, property};
//! use sensibo_lib::types::PodId;
//!
//! let notification = Notification::new(
//!     EventName::device("Bedroom", property::POWER),
//!     true,
//!     EventSource::Pod { id: PodId::new("abc"), name: "Bedroom".into() },
//! );
//! assert_eq!(notification.value().as_bool(), Some(true));
//! ```

mod event_name;
mod notification;

pub use event_name::{EventName, property};
pub use notification::{EventSource, EventValue, Notification};
