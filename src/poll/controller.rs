// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One poll loop per pod.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::protocol::SkyApi;
use crate::subscription::NotificationRouter;
use crate::types::{PodId, PodInfo};

use super::{PollConfig, PollLoop};

/// Starts and stops poll loops, keeping at most one per pod id.
///
/// All loops share the controller's API client and notification router.
pub struct PollController<A> {
    api: Arc<A>,
    router: Arc<NotificationRouter>,
    config: PollConfig,
    loops: Mutex<HashMap<PodId, Arc<PollLoop<A>>>>,
}

impl<A: SkyApi> PollController<A> {
    /// Creates a controller with no loops.
    #[must_use]
    pub fn new(api: Arc<A>, router: Arc<NotificationRouter>, config: PollConfig) -> Self {
        Self {
            api,
            router,
            config,
            loops: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the shared notification router.
    #[must_use]
    pub fn router(&self) -> &Arc<NotificationRouter> {
        &self.router
    }

    /// Returns the loop of a pod, creating it on first use.
    pub fn poll_loop(&self, pod: &PodInfo) -> Arc<PollLoop<A>> {
        let mut loops = self.loops.lock();
        let poll = loops.entry(pod.id().clone()).or_insert_with(|| {
            Arc::new(PollLoop::new(
                pod.clone(),
                Arc::clone(&self.api),
                Arc::clone(&self.router),
                self.config.clone(),
            ))
        });
        Arc::clone(poll)
    }

    /// Starts polling a pod. Does nothing if it is already polled.
    ///
    /// # Errors
    ///
    /// See [`PollLoop::start`].
    pub async fn start_polling(&self, pod: &PodInfo, interval: Duration) -> crate::Result<()> {
        let poll = self.poll_loop(pod);
        poll.start(interval).await
    }

    /// Stops polling a pod. Does nothing if it is not polled.
    pub async fn stop_polling(&self, id: &PodId) {
        let poll = self.loops.lock().get(id).cloned();
        if let Some(poll) = poll {
            poll.stop().await;
        }
    }

    /// Returns `true` while the pod's loop is running.
    #[must_use]
    pub fn is_polling(&self, id: &PodId) -> bool {
        self.loops.lock().get(id).is_some_and(|poll| poll.is_polling())
    }

    /// Returns the ids of the pods currently polled.
    #[must_use]
    pub fn polling_pods(&self) -> Vec<PodId> {
        self.loops
            .lock()
            .iter()
            .filter(|(_, poll)| poll.is_polling())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Stops every loop.
    pub async fn stop_all(&self) {
        let loops: Vec<_> = self.loops.lock().values().cloned().collect();
        for poll in loops {
            poll.stop().await;
        }
    }
}

impl<A> std::fmt::Debug for PollController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollController")
            .field("loops", &self.loops.lock().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::protocol::fake::FakeApi;
    use crate::state::{AcState, Measurements};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_secs(2);

    fn controller() -> (PollController<FakeApi>, Arc<FakeApi>) {
        let api = Arc::new(FakeApi::new(
            Capabilities::default(),
            AcState::new().with_power(false).with_mode("cool"),
            Measurements::new(),
        ));
        let router = Arc::new(NotificationRouter::new());
        (
            PollController::new(Arc::clone(&api), router, PollConfig::default()),
            api,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn one_loop_per_pod() {
        let (controller, api) = controller();
        let pod = PodInfo::new("p1", "Office");

        controller.start_polling(&pod, INTERVAL).await.unwrap();
        controller.start_polling(&pod, INTERVAL).await.unwrap();

        assert!(controller.is_polling(pod.id()));
        assert_eq!(controller.polling_pods(), vec![PodId::new("p1")]);
        assert!(Arc::ptr_eq(&controller.poll_loop(&pod), &controller.poll_loop(&pod)));
        assert_eq!(api.state_fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_polling_unknown_pod_is_a_no_op() {
        let (controller, _api) = controller();
        controller.stop_polling(&PodId::new("missing")).await;
        assert!(!controller.is_polling(&PodId::new("missing")));
    }

    #[tokio::test(start_paused = true)]
    async fn loops_publish_independently() {
        let (controller, api) = controller();
        let office = PodInfo::new("p1", "Office");
        let bedroom = PodInfo::new("p2", "Bedroom");

        let office_hits = Arc::new(AtomicUsize::new(0));
        let all_hits = Arc::new(AtomicUsize::new(0));
        let (o, a) = (Arc::clone(&office_hits), Arc::clone(&all_hits));
        controller
            .router()
            .subscribe("Office.*", move |_| {
                o.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        controller
            .router()
            .subscribe("*.power", move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        controller.start_polling(&office, INTERVAL).await.unwrap();
        controller.start_polling(&bedroom, INTERVAL).await.unwrap();

        api.update_state(|s| s.on = Some(true));
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(office_hits.load(Ordering::SeqCst), 1);
        assert_eq!(all_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_stops_every_loop() {
        let (controller, _api) = controller();
        controller
            .start_polling(&PodInfo::new("p1", "Office"), INTERVAL)
            .await
            .unwrap();
        controller
            .start_polling(&PodInfo::new("p2", "Bedroom"), INTERVAL)
            .await
            .unwrap();
        assert_eq!(controller.polling_pods().len(), 2);

        controller.stop_all().await;
        assert!(controller.polling_pods().is_empty());
    }
}
