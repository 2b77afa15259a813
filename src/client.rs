// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entry point of the library.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::device::{Pod, PodRegistry};
use crate::error::{Error, SubscriptionError};
use crate::event::{Notification, property};
use crate::poll::{PollConfig, PollController};
use crate::protocol::{PodSummary, SkyApi};
#[cfg(feature = "http")]
use crate::protocol::{HttpClient, HttpConfig};
use crate::subscription::{NotificationRouter, SubscriptionId};
use crate::types::{PodId, PodInfo};

/// Properties accepted by [`Client::bind`].
const CLIENT_PROPERTIES: &[&str] = &[
    property::MODE,
    property::POWER,
    property::ROOM_TEMP,
    property::ROOM_HUMIDITY,
    property::BATTERY_VOLTAGE,
    property::SWING,
    property::TEMP,
    property::FAN_LEVEL,
    property::TEMP_UNIT,
];

/// An authenticated session with the Sensibo cloud.
///
/// The client owns the notification router and the poll loops shared by
/// every [`Pod`] it hands out. Looking up the same pod twice returns the
/// same handle.
///
/// # Examples
///
/// ```no_run
/// use sensibo_lib::Client;
///
/// # async fn example() -> sensibo_lib::Result<()> {
/// let client = Client::new("my-api-key")?;
///
/// for (name, id) in client.devices().await? {
///     println!("{name}: {id}");
/// }
///
/// // Every power change of every polled pod.
/// let id = client.bind("power", |n| println!("{} -> {}", n.name(), n.value()))?;
/// client.unbind(id)?;
/// # Ok(())
/// # }
/// ```
pub struct Client<A> {
    api: Arc<A>,
    controller: Arc<PollController<A>>,
    registry: PodRegistry<A>,
}

#[cfg(feature = "http")]
impl Client<HttpClient> {
    /// Creates a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be
    /// created.
    pub fn new(api_key: impl Into<String>) -> crate::Result<Self> {
        Self::with_config(HttpConfig::new(api_key))
    }

    /// Creates a client from an HTTP configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn with_config(config: HttpConfig) -> crate::Result<Self> {
        let api = config.into_client()?;
        Ok(Self::with_api(api, Arc::new(NotificationRouter::new())))
    }
}

impl<A: SkyApi> Client<A> {
    /// Creates a client over any [`SkyApi`] implementation.
    ///
    /// The router may be shared with other clients.
    #[must_use]
    pub fn with_api(api: A, router: Arc<NotificationRouter>) -> Self {
        Self::with_poll_config(api, router, PollConfig::default())
    }

    /// Creates a client with a custom poll configuration.
    #[must_use]
    pub fn with_poll_config(api: A, router: Arc<NotificationRouter>, config: PollConfig) -> Self {
        let api = Arc::new(api);
        let controller = Arc::new(PollController::new(Arc::clone(&api), router, config));
        Self {
            api,
            controller,
            registry: PodRegistry::new(),
        }
    }

    /// Returns the underlying API client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the notification router.
    #[must_use]
    pub fn router(&self) -> &Arc<NotificationRouter> {
        self.controller.router()
    }

    /// Returns the poll controller.
    #[must_use]
    pub fn poll_controller(&self) -> &Arc<PollController<A>> {
        &self.controller
    }

    /// Lists the pods of the account, by room name.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn devices(&self) -> crate::Result<BTreeMap<String, PodId>> {
        Ok(self
            .api
            .list_pods()
            .await?
            .into_iter()
            .map(|pod| (pod.room.name, pod.id))
            .collect())
    }

    /// Lists the room names of the account's pods, sorted.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn device_names(&self) -> crate::Result<Vec<String>> {
        Ok(self.devices().await?.into_keys().collect())
    }

    /// Looks up a pod by room name.
    ///
    /// An exact match wins; otherwise the name is compared ignoring case.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn get_device(&self, name: &str) -> crate::Result<Option<Arc<Pod<A>>>> {
        let pods = self.api.list_pods().await?;
        let found = match pods.iter().position(|p| p.name() == name) {
            Some(index) => Some(index),
            None => pods.iter().position(|p| p.name().eq_ignore_ascii_case(name)),
        };
        Ok(found.map(|index| self.pod(pods[index].clone())))
    }

    /// Looks up a pod by room name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if no pod has that name, or the API
    /// error.
    pub async fn device(&self, name: &str) -> crate::Result<Arc<Pod<A>>> {
        self.get_device(name)
            .await?
            .ok_or_else(|| Error::DeviceNotFound(name.to_string()))
    }

    /// Returns every pod of the account.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn pods(&self) -> crate::Result<Vec<Arc<Pod<A>>>> {
        Ok(self
            .api
            .list_pods()
            .await?
            .into_iter()
            .map(|summary| self.pod(summary))
            .collect())
    }

    fn pod(&self, summary: PodSummary) -> Arc<Pod<A>> {
        let info = PodInfo::from(summary);
        self.registry.get_or_insert_with(info.id(), || {
            Pod::new(info.clone(), Arc::clone(&self.api), Arc::clone(&self.controller))
        })
    }

    /// Binds a callback to a property across all pods.
    ///
    /// `property` is one of `mode`, `power`, `room_temp`, `room_humidity`,
    /// `battery_voltage`, `swing`, `temp`, `fan_level`, `temp_unit`, or `*`.
    /// The pattern is a suffix match, so `temp` also receives `room_temp`.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::InvalidProperty`] for any other property.
    pub fn bind<F>(&self, property: &str, callback: F) -> crate::Result<SubscriptionId>
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        if property != property::ANY && !CLIENT_PROPERTIES.contains(&property) {
            return Err(SubscriptionError::InvalidProperty(property.to_string()).into());
        }
        Ok(self.router().subscribe(&format!("*{property}"), callback)?)
    }

    /// Removes a subscription made through this client or any of its pods.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::UnknownSubscription`] if the id is not
    /// registered.
    pub fn unbind(&self, id: SubscriptionId) -> crate::Result<()> {
        Ok(self.router().unsubscribe(id)?)
    }

    /// Stops every poll loop.
    pub async fn stop_all(&self) {
        self.controller.stop_all().await;
    }
}

impl<A> std::fmt::Debug for Client<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
