// Readings poller - Fetches the latest samples and hands them to the view
use crate::application::dashboard_api::DashboardApi;
use crate::application::selection::DeviceSelection;
use crate::application::view::PresentationSink;
use crate::domain::device::DeviceId;
use crate::domain::readings::{Channel, GraphsSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic request numbering for one poll stream.
///
/// A response is applied only if no newer response of the same stream has
/// been applied already.
#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestSequence {
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn try_apply(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::AcqRel) < seq
    }
}

pub struct ReadingsPoller {
    api: Arc<dyn DashboardApi>,
    selection: Arc<DeviceSelection>,
    sink: Arc<dyn PresentationSink>,
    latest: RequestSequence,
    series: RequestSequence,
}

impl ReadingsPoller {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        selection: Arc<DeviceSelection>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            api,
            selection,
            sink,
            latest: RequestSequence::default(),
            series: RequestSequence::default(),
        }
    }

    /// Tiles and charts together.
    pub async fn refresh(&self, latest_points: u32, chart_points: u32) {
        futures::join!(
            self.fetch_latest_point(latest_points),
            self.fetch_series(chart_points)
        );
    }

    /// Update every tile that has a fresh value. Empty channels keep their old tile.
    pub async fn fetch_latest_point(&self, points: u32) {
        let Some(snapshot) = self.fetch("latest", &self.latest, points).await else {
            return;
        };

        for channel in Channel::ALL {
            let Some(value) = snapshot.series(channel).latest() else {
                continue;
            };
            if let Err(e) = self.sink.show_tile(channel, &channel.format_value(value)) {
                tracing::debug!(error = %e, channel = channel.as_str(), "Tile not rendered");
            }
        }
    }

    /// Redraw every chart that has both values and time labels.
    pub async fn fetch_series(&self, points: u32) {
        let Some(snapshot) = self.fetch("series", &self.series, points).await else {
            return;
        };

        for channel in Channel::ALL {
            let values = &snapshot.series(channel).values;
            let labels = snapshot.chart_labels(channel);
            if values.is_empty() || labels.is_empty() {
                tracing::debug!(channel = channel.as_str(), "No chart data, skipping");
                continue;
            }
            if let Err(e) = self.sink.draw_chart(channel, values, labels) {
                tracing::debug!(error = %e, channel = channel.as_str(), "Chart not rendered");
            }
        }
    }

    // Returns None when there is nothing to apply: no device, a failed
    // request, or a response that a newer one or a device switch superseded
    async fn fetch(&self, stream: &'static str, sequence: &RequestSequence, points: u32) -> Option<GraphsSnapshot> {
        let device_id = self.selection.current()?;
        let seq = sequence.next();

        let snapshot = match self.api.latest_graphs(device_id, points).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(stream, device_id, error = %e, "Readings request failed");
                return None;
            }
        };

        if !self.is_current(device_id) {
            tracing::debug!(stream, device_id, "Device changed while polling, dropping response");
            return None;
        }
        if !sequence.try_apply(seq) {
            tracing::debug!(stream, seq, "Newer response already applied, dropping");
            return None;
        }

        Some(snapshot)
    }

    fn is_current(&self, device_id: DeviceId) -> bool {
        self.selection.current() == Some(device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_api::DashboardApiError;
    use crate::application::testing::{status_error, FakeApi, FakeView};
    use crate::domain::readings::ReadingSeries;

    fn snapshot() -> GraphsSnapshot {
        GraphsSnapshot {
            temperature: ReadingSeries::new(vec![21.3, 22.47], vec!["12:00", "12:01"]),
            humidity: ReadingSeries::new(vec![48.04, 51.96], vec!["12:00", "12:01"]),
            soil: ReadingSeries::default(),
            light: ReadingSeries::new(vec![640.0, 702.4], vec![]),
        }
    }

    fn poller(api: Arc<FakeApi>, selected: Option<DeviceId>) -> (ReadingsPoller, Arc<FakeView>, Arc<DeviceSelection>) {
        let selection = Arc::new(DeviceSelection::new());
        selection.set(selected);
        let view = Arc::new(FakeView::default());
        (ReadingsPoller::new(api, selection.clone(), view.clone()), view, selection)
    }

    #[test]
    fn test_request_sequence_rejects_older() {
        let sequence = RequestSequence::default();
        let first = sequence.next();
        let second = sequence.next();

        assert!(sequence.try_apply(second));
        assert!(!sequence.try_apply(first));
        assert!(sequence.try_apply(sequence.next()));
    }

    #[tokio::test]
    async fn test_no_device_is_a_no_op() {
        let api = Arc::new(FakeApi::default());
        let (poller, view, _) = poller(api.clone(), None);

        poller.refresh(1, 50).await;

        assert!(api.graph_calls().is_empty());
        assert!(view.tile(Channel::Temperature).is_none());
    }

    #[tokio::test]
    async fn test_latest_point_formats_tiles() {
        let api = Arc::new(FakeApi::default());
        api.push_graphs(Ok(snapshot()));
        let (poller, view, _) = poller(api.clone(), Some(3));

        poller.fetch_latest_point(1).await;

        assert_eq!(api.graph_calls(), vec![(3, 1)]);
        assert_eq!(view.tile(Channel::Temperature).as_deref(), Some("22.5"));
        assert_eq!(view.tile(Channel::Humidity).as_deref(), Some("52.0"));
        assert_eq!(view.tile(Channel::Light).as_deref(), Some("702"));
        assert_eq!(view.tile(Channel::Soil), None);
    }

    #[tokio::test]
    async fn test_failures_keep_stale_values() {
        let api = Arc::new(FakeApi::default());
        api.push_graphs(Ok(snapshot()));
        api.push_graphs(Err(status_error(500)));
        api.push_graphs(Err(DashboardApiError::Transport("timeout".into())));
        let (poller, view, _) = poller(api.clone(), Some(3));

        poller.fetch_latest_point(1).await;
        poller.fetch_latest_point(1).await;
        poller.fetch_latest_point(1).await;

        assert_eq!(api.graph_calls().len(), 3);
        assert_eq!(view.tile(Channel::Temperature).as_deref(), Some("22.5"));
    }

    #[tokio::test]
    async fn test_series_skips_empty_channels() {
        let api = Arc::new(FakeApi::default());
        api.push_graphs(Ok(snapshot()));
        let (poller, view, _) = poller(api.clone(), Some(3));

        poller.fetch_series(50).await;

        assert_eq!(api.graph_calls(), vec![(3, 50)]);
        assert!(view.chart(Channel::Soil).is_none());
        let (values, labels) = view.chart(Channel::Temperature).unwrap();
        assert_eq!(values, vec![21.3, 22.47]);
        assert_eq!(labels, vec!["12:00", "12:01"]);
        // light has no labels of its own
        let (_, labels) = view.chart(Channel::Light).unwrap();
        assert_eq!(labels, vec!["12:00", "12:01"]);
    }

    #[tokio::test]
    async fn test_missing_sink_elements_do_not_stop_other_channels() {
        let api = Arc::new(FakeApi::default());
        api.push_graphs(Ok(snapshot()));
        let (poller, view, _) = poller(api.clone(), Some(3));
        view.remove_element("tempValue");

        poller.fetch_latest_point(1).await;

        assert_eq!(view.tile(Channel::Temperature), None);
        assert_eq!(view.tile(Channel::Humidity).as_deref(), Some("52.0"));
    }

    // Backend double that lets a test act while a request is in flight
    struct InFlightApi {
        calls: AtomicU64,
        gate: tokio::sync::Notify,
        selection: Arc<DeviceSelection>,
        switch_to: Option<DeviceId>,
    }

    #[async_trait::async_trait]
    impl DashboardApi for InFlightApi {
        async fn list_devices(&self) -> Result<Vec<crate::domain::device::Device>, DashboardApiError> {
            Ok(Vec::new())
        }

        async fn latest_graphs(&self, _: DeviceId, _: u32) -> Result<GraphsSnapshot, DashboardApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let value = if let Some(id) = self.switch_to {
                self.selection.set(Some(id));
                10.0
            } else if call == 0 {
                self.gate.notified().await;
                10.0
            } else {
                self.gate.notify_one();
                20.0
            };
            Ok(GraphsSnapshot {
                temperature: ReadingSeries::new(vec![value], vec!["12:00"]),
                ..GraphsSnapshot::default()
            })
        }

        async fn submit_command(
            &self,
            _: &crate::domain::command::Command,
        ) -> Result<serde_json::Value, DashboardApiError> {
            Ok(serde_json::Value::Null)
        }
    }

    fn in_flight(switch_to: Option<DeviceId>) -> (ReadingsPoller, Arc<FakeView>) {
        let selection = Arc::new(DeviceSelection::new());
        selection.set(Some(3));
        let api = Arc::new(InFlightApi {
            calls: AtomicU64::new(0),
            gate: tokio::sync::Notify::new(),
            selection: selection.clone(),
            switch_to,
        });
        let view = Arc::new(FakeView::default());
        (ReadingsPoller::new(api, selection, view.clone()), view)
    }

    #[tokio::test]
    async fn test_older_response_never_overwrites_newer() {
        let (poller, view) = in_flight(None);

        tokio::join!(poller.fetch_latest_point(1), poller.fetch_latest_point(1));

        assert_eq!(view.tile(Channel::Temperature).as_deref(), Some("20.0"));
    }

    #[tokio::test]
    async fn test_response_for_previous_device_is_dropped() {
        let (poller, view) = in_flight(Some(7));

        // issued for device 3, answered after the switch to 7
        poller.fetch_latest_point(1).await;
        assert_eq!(view.tile(Channel::Temperature), None);

        poller.fetch_latest_point(1).await;
        assert_eq!(view.tile(Channel::Temperature).as_deref(), Some("10.0"));
    }
}
