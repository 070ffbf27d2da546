// Refresh scheduler - Startup sequence and the two periodic refresh timers
use crate::application::command_dispatcher::CommandDispatcher;
use crate::application::device_registry::DeviceRegistry;
use crate::application::readings_poller::ReadingsPoller;
use crate::application::selection::DeviceSelection;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    pub readings_interval: Duration,
    pub devices_interval: Duration,
    pub latest_points: u32,
    pub chart_points: u32,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            readings_interval: Duration::from_secs(5),
            devices_interval: Duration::from_secs(30),
            latest_points: 1,
            chart_points: 50,
        }
    }
}

/// Handles of the running timers. They run until aborted or the runtime stops;
/// aborting a timer also cancels the refreshes it started.
pub struct RefreshTasks {
    pub readings: JoinHandle<()>,
    pub devices: JoinHandle<()>,
}

impl RefreshTasks {
    pub fn abort(&self) {
        self.readings.abort();
        self.devices.abort();
    }
}

#[derive(Clone)]
pub struct RefreshScheduler {
    registry: Arc<DeviceRegistry>,
    poller: Arc<ReadingsPoller>,
    dispatcher: Arc<CommandDispatcher>,
    selection: Arc<DeviceSelection>,
    settings: RefreshSettings,
}

impl RefreshScheduler {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        poller: Arc<ReadingsPoller>,
        dispatcher: Arc<CommandDispatcher>,
        selection: Arc<DeviceSelection>,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            registry,
            poller,
            dispatcher,
            selection,
            settings,
        }
    }

    /// Run the startup sequence, then start both timers.
    ///
    /// Only the first device list fetch is awaited. The first readings poll
    /// runs on the readings task so a stalled backend cannot hold the timers back.
    pub async fn start(&self) -> RefreshTasks {
        // 1. Device list first so there is something to poll.
        // Failures are logged by the registry.
        let _ = self.registry.refresh().await;

        // 2. Saved thresholds back into their inputs
        self.dispatcher.restore_thresholds();

        tracing::info!(
            readings_secs = self.settings.readings_interval.as_secs_f64(),
            devices_secs = self.settings.devices_interval.as_secs_f64(),
            "Starting refresh timers"
        );

        // 3. to 5. Immediate poll plus the two independent timers
        RefreshTasks {
            readings: tokio::spawn(self.clone().run_readings_timer()),
            devices: tokio::spawn(self.clone().run_devices_timer()),
        }
    }

    fn spawn_poll(&self, in_flight: &mut JoinSet<()>) {
        let poller = self.poller.clone();
        let (latest, chart) = (self.settings.latest_points, self.settings.chart_points);
        in_flight.spawn(async move { poller.refresh(latest, chart).await });
    }

    // Polls live in a JoinSet owned by the timer task, so aborting the timer
    // cancels whatever is still in flight.
    async fn run_readings_timer(self) {
        let period = self.settings.readings_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        if self.selection.current().is_some() {
            self.spawn_poll(&mut in_flight);
        }

        loop {
            ticker.tick().await;
            while in_flight.try_join_next().is_some() {}

            if self.selection.current().is_none() {
                tracing::trace!("No device selected, skipping readings tick");
                continue;
            }

            if !in_flight.is_empty() {
                tracing::debug!(pending = in_flight.len(), "Previous readings poll still running");
            }

            // A slow poll must not hold back the next tick
            self.spawn_poll(&mut in_flight);
        }
    }

    async fn run_devices_timer(self) {
        let period = self.settings.devices_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            ticker.tick().await;
            while in_flight.try_join_next().is_some() {}
            tracing::debug!("Refreshing device list");

            let registry = self.registry.clone();
            in_flight.spawn(async move {
                // Failures are logged by the registry
                let _ = registry.refresh().await;
            });
        }
    }
}
