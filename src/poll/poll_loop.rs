// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-pod polling task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::error::{Error, ValueError};
use crate::protocol::SkyApi;
use crate::state::StateTracker;
use crate::subscription::NotificationRouter;
use crate::types::PodInfo;

use super::{PollConfig, PollState};

/// Cancellation signal and task of a started loop.
struct PollHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Resets the loop to `Idle` when the task exits, including on panic.
struct IdleOnExit(Arc<watch::Sender<PollState>>);

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        self.0.send_replace(PollState::Idle);
    }
}

/// Background polling of a single pod.
///
/// Each tick fetches the pod's state and readings, diffs them against the
/// previous tick and publishes the changes in order. Ticks are strictly
/// sequential. A failed fetch skips the tick and the loop carries on.
///
/// `start` and `stop` are serialized: while one runs, the other waits.
pub struct PollLoop<A> {
    pod: PodInfo,
    api: Arc<A>,
    router: Arc<NotificationRouter>,
    config: PollConfig,
    state: Arc<watch::Sender<PollState>>,
    handle: Mutex<Option<PollHandle>>,
}

impl<A: SkyApi> PollLoop<A> {
    /// Creates an idle loop for a pod.
    #[must_use]
    pub fn new(
        pod: PodInfo,
        api: Arc<A>,
        router: Arc<NotificationRouter>,
        config: PollConfig,
    ) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            pod,
            api,
            router,
            config,
            state: Arc::new(state),
            handle: Mutex::new(None),
        }
    }

    /// Returns the pod this loop polls.
    #[must_use]
    pub fn pod(&self) -> &PodInfo {
        &self.pod
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes lifecycle transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.state() == PollState::Running
    }

    /// Starts polling every `interval`.
    ///
    /// Does nothing if the loop is already running. If a previous stop is
    /// still draining, waits for it to finish first. The baseline snapshot
    /// is fetched before the task starts and produces no notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidInterval`] for a zero interval, or the
    /// fetch error if the baseline cannot be read. The loop stays idle.
    pub async fn start(&self, interval: Duration) -> crate::Result<()> {
        if interval.is_zero() {
            return Err(ValueError::InvalidInterval.into());
        }

        let mut handle = self.handle.lock().await;

        if self.state() == PollState::Running {
            tracing::debug!(pod = %self.pod.name(), "Poll loop already running");
            return Ok(());
        }

        self.state
            .subscribe()
            .wait_for(|state| *state == PollState::Idle)
            .await
            .map_err(|e| Error::PollTaskFailed(e.to_string()))?;

        if let Some(previous) = handle.take()
            && let Err(e) = previous.task.await
        {
            tracing::warn!(pod = %self.pod.name(), error = %e, "Previous poll task ended abnormally");
        }

        let id = self.pod.id();
        let capabilities = self.api.fetch_capabilities(id).await?;
        let state = self.api.fetch_state(id).await?;
        let measurements = self.api.fetch_measurements(id).await?;
        let tracker = StateTracker::new(capabilities, state, measurements);

        let (cancel, cancel_rx) = watch::channel(false);
        self.state.send_replace(PollState::Running);

        let guard = IdleOnExit(Arc::clone(&self.state));
        let task = tokio::spawn(run(
            self.pod.clone(),
            Arc::clone(&self.api),
            Arc::clone(&self.router),
            tracker,
            interval,
            cancel_rx,
            guard,
        ));

        tracing::info!(pod = %self.pod.name(), interval = ?interval, "Started polling");

        *handle = Some(PollHandle { cancel, task });
        Ok(())
    }

    /// Stops polling.
    ///
    /// Does nothing unless the loop is running. Waits up to the configured
    /// stop timeout for the task to exit, then returns either way.
    pub async fn stop(&self) {
        let mut handle = self.handle.lock().await;

        if self.state() != PollState::Running {
            return;
        }
        let Some(running) = handle.take() else {
            return;
        };

        self.state.send_replace(PollState::Stopping);
        running.cancel.send_replace(true);

        let mut state_rx = self.state.subscribe();
        let exited = tokio::time::timeout(
            self.config.stop_timeout(),
            state_rx.wait_for(|state| *state == PollState::Idle),
        )
        .await
        .is_ok_and(|result| result.is_ok());

        if exited {
            if let Err(e) = running.task.await {
                tracing::warn!(pod = %self.pod.name(), error = %e, "Poll task ended abnormally");
            }
            tracing::info!(pod = %self.pod.name(), "Stopped polling");
        } else {
            tracing::warn!(
                pod = %self.pod.name(),
                timeout = ?self.config.stop_timeout(),
                "Poll task did not stop in time"
            );
            *handle = Some(running);
        }
    }
}

impl<A> Drop for PollLoop<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.cancel.send_replace(true);
        }
    }
}

impl<A> std::fmt::Debug for PollLoop<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollLoop")
            .field("pod", &self.pod)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

async fn run<A: SkyApi>(
    pod: PodInfo,
    api: Arc<A>,
    router: Arc<NotificationRouter>,
    mut tracker: StateTracker,
    interval: Duration,
    mut cancel: watch::Receiver<bool>,
    _guard: IdleOnExit,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            () = tokio::time::sleep(interval) => {}
        }

        tick(&pod, api.as_ref(), &router, &mut tracker).await;
    }

    tracing::debug!(pod = %pod.name(), "Poll task exiting");
}

async fn tick<A: SkyApi>(
    pod: &PodInfo,
    api: &A,
    router: &NotificationRouter,
    tracker: &mut StateTracker,
) {
    let fetched = tokio::try_join!(api.fetch_state(pod.id()), api.fetch_measurements(pod.id()));
    let (state, measurements) = match fetched {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(pod = %pod.name(), error = %e, "Poll tick failed, keeping previous state");
            return;
        }
    };

    let changes = tracker.update(&state, &measurements);
    if !changes.is_empty() {
        tracing::debug!(pod = %pod.name(), changes = changes.len(), "Publishing state changes");
    }
    for change in &changes {
        router.publish(&change.to_notification(pod));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Capabilities, ModeCapabilities};
    use crate::event::Notification;
    use crate::protocol::fake::FakeApi;
    use crate::state::{AcState, Measurements};
    use crate::types::TemperatureUnit;
    use tokio::sync::mpsc;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn fake() -> Arc<FakeApi> {
        let caps = Capabilities::builder()
            .mode(
                "cool",
                ModeCapabilities::new()
                    .with_swing(["stopped", "rangeFull"])
                    .with_temperatures(TemperatureUnit::Celsius, 18..=30),
            )
            .mode(
                "heat",
                ModeCapabilities::new()
                    .with_swing(["stopped", "rangeFull"])
                    .with_temperatures(TemperatureUnit::Celsius, 10..=30),
            )
            .build();
        let state = AcState::new()
            .with_power(true)
            .with_mode("cool")
            .with_swing("stopped")
            .with_target_temperature(22)
            .with_temperature_unit(TemperatureUnit::Celsius);
        let measurements = Measurements::new().with_temperature(24.0).with_humidity(50.0);
        Arc::new(FakeApi::new(caps, state, measurements))
    }

    fn setup(
        api: &Arc<FakeApi>,
    ) -> (PollLoop<FakeApi>, Arc<NotificationRouter>, mpsc::UnboundedReceiver<Notification>) {
        let router = Arc::new(NotificationRouter::new());
        let (tx, rx) = mpsc::unbounded_channel();
        router
            .subscribe("Bedroom.*", move |n| {
                let _ = tx.send(n.clone());
            })
            .unwrap();
        let poll = PollLoop::new(
            PodInfo::new("pod1", "Bedroom"),
            Arc::clone(api),
            Arc::clone(&router),
            PollConfig::default(),
        );
        (poll, router, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn baseline_emits_nothing() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);

        poll.start(INTERVAL).await.unwrap();
        assert!(poll.is_polling());

        tokio::time::sleep(Duration::from_secs(17)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(api.state_fetches(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn power_change_is_published() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();

        api.update_state(|s| s.on = Some(false));

        let n = rx.recv().await.unwrap();
        assert_eq!(n.name().as_str(), "Bedroom.power");
        assert_eq!(n.value().as_bool(), Some(false));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn mode_change_precedes_scoped_events() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();

        api.update_state(|s| {
            s.mode = Some("heat".to_string());
            s.swing = Some("rangeFull".to_string());
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.name().as_str(), "Bedroom.mode");
        assert_eq!(first.value().as_str(), Some("heat"));
        assert_eq!(second.name().as_str(), "Bedroom.heat.swing");
        assert_eq!(second.source().mode_name(), Some("heat"));
    }

    #[tokio::test(start_paused = true)]
    async fn measurement_change_publishes_derived_values() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();

        api.set_measurements(Measurements::new().with_temperature(26.0).with_humidity(50.0));

        let mut names = Vec::new();
        for _ in 0..3 {
            names.push(rx.recv().await.unwrap().name().to_string());
        }
        assert_eq!(
            names,
            ["Bedroom.room_temp", "Bedroom.room_dew_point", "Bedroom.room_heat_index"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_is_a_no_op() {
        let api = fake();
        let (poll, _router, _rx) = setup(&api);

        poll.start(INTERVAL).await.unwrap();
        poll.start(INTERVAL).await.unwrap();

        assert!(poll.is_polling());
        assert_eq!(api.state_fetches(), 1);
        assert_eq!(api.capability_fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_idle_loop_is_a_no_op() {
        let api = fake();
        let (poll, _router, _rx) = setup(&api);

        poll.stop().await;
        assert_eq!(poll.state(), PollState::Idle);
        assert_eq!(api.state_fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_returns_to_idle_and_silences_loop() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();

        poll.stop().await;
        assert_eq!(poll.state(), PollState::Idle);
        assert!(!poll.is_polling());

        api.update_state(|s| s.on = Some(false));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(api.state_fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_takes_a_fresh_baseline() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();
        poll.stop().await;

        // Changed while stopped: becomes the new baseline, not an event.
        api.update_state(|s| s.on = Some(false));
        poll.start(INTERVAL).await.unwrap();
        assert!(poll.is_polling());

        api.update_state(|s| s.target_temperature = Some(25));
        let n = rx.recv().await.unwrap();
        assert_eq!(n.name().as_str(), "Bedroom.cool.temp");
        assert_eq!(n.value().as_i64(), Some(25));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_times_out_on_stuck_tick_and_start_waits_for_it() {
        let api = fake();
        let router = Arc::new(NotificationRouter::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        router
            .subscribe("Bedroom.*", move |n| {
                let _ = tx.send(n.clone());
            })
            .unwrap();
        let poll = PollLoop::new(
            PodInfo::new("pod1", "Bedroom"),
            Arc::clone(&api),
            router,
            PollConfig::new().with_stop_timeout(Duration::from_secs(2)),
        );

        poll.start(INTERVAL).await.unwrap();
        // The first tick (t = 5 s) hangs until t = 15 s.
        api.stall_next(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(6)).await;

        let begun = tokio::time::Instant::now();
        poll.stop().await;
        let waited = begun.elapsed();
        assert!(waited >= Duration::from_secs(2) && waited < Duration::from_secs(3));
        assert_eq!(poll.state(), PollState::Stopping);
        assert!(!poll.is_polling());

        let begun = tokio::time::Instant::now();
        poll.start(INTERVAL).await.unwrap();
        assert!(begun.elapsed() >= Duration::from_secs(7));
        assert_eq!(poll.state(), PollState::Running);
        // Baseline, stuck tick, fresh baseline.
        assert_eq!(api.state_fetches(), 3);
        assert!(rx.try_recv().is_err());

        api.update_state(|s| s.on = Some(false));
        let n = rx.recv().await.unwrap();
        assert_eq!(n.name().as_str(), "Bedroom.power");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_rejected() {
        let api = fake();
        let (poll, _router, _rx) = setup(&api);

        let result = poll.start(Duration::ZERO).await;
        assert!(matches!(result, Err(Error::Value(ValueError::InvalidInterval))));
        assert_eq!(poll.state(), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn baseline_failure_leaves_loop_idle() {
        let api = fake();
        let (poll, _router, _rx) = setup(&api);
        api.fail_next(1);

        assert!(poll.start(INTERVAL).await.is_err());
        assert_eq!(poll.state(), PollState::Idle);

        poll.start(INTERVAL).await.unwrap();
        assert!(poll.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_skips_tick_only() {
        let api = fake();
        let (poll, _router, mut rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();

        api.fail_next(1);
        api.update_state(|s| s.on = Some(false));

        let n = rx.recv().await.unwrap();
        assert_eq!(n.name().as_str(), "Bedroom.power");
        assert!(poll.is_polling());
        // Baseline, failed tick, successful tick.
        assert_eq!(api.state_fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_callback_does_not_stop_loop() {
        let api = fake();
        let (poll, router, mut rx) = setup(&api);
        router
            .subscribe("Bedroom.power", |_| panic!("subscriber bug"))
            .unwrap();
        poll.start(INTERVAL).await.unwrap();

        api.update_state(|s| s.on = Some(false));
        assert_eq!(rx.recv().await.unwrap().name().as_str(), "Bedroom.power");

        api.update_state(|s| s.on = Some(true));
        assert_eq!(rx.recv().await.unwrap().value().as_bool(), Some(true));
        assert!(poll.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn watch_state_observes_transitions() {
        let api = fake();
        let (poll, _router, _rx) = setup(&api);
        let states = poll.watch_state();

        poll.start(INTERVAL).await.unwrap();
        assert_eq!(*states.borrow(), PollState::Running);

        poll.stop().await;
        assert_eq!(*states.borrow(), PollState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_loop_cancels_task() {
        let api = fake();
        let (poll, _router, _rx) = setup(&api);
        poll.start(INTERVAL).await.unwrap();
        let mut states = poll.watch_state();

        drop(poll);
        tokio::time::timeout(
            Duration::from_secs(1),
            states.wait_for(|s| *s == PollState::Idle),
        )
        .await
        .unwrap()
        .unwrap();
    }
}
