// Dashboard state - Wires the services together once at startup
use crate::application::command_dispatcher::{CommandDispatcher, CommandError};
use crate::application::dashboard_api::DashboardApi;
use crate::application::device_registry::{DeviceRegistry, SelectionError};
use crate::application::readings_poller::ReadingsPoller;
use crate::application::refresh_scheduler::{RefreshScheduler, RefreshSettings, RefreshTasks};
use crate::application::selection::DeviceSelection;
use crate::application::selection_store::SelectionStore;
use crate::application::view::{ControlPanel, PresentationSink};
use crate::domain::command::ControlKind;
use crate::domain::device::DeviceId;
use std::sync::Arc;

pub struct Dashboard {
    pub registry: Arc<DeviceRegistry>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub poller: Arc<ReadingsPoller>,
    pub selection: Arc<DeviceSelection>,
    controls: Arc<dyn ControlPanel>,
    scheduler: RefreshScheduler,
    settings: RefreshSettings,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        store: Arc<dyn SelectionStore>,
        controls: Arc<dyn ControlPanel>,
        sink: Arc<dyn PresentationSink>,
        settings: RefreshSettings,
    ) -> Self {
        let selection = Arc::new(DeviceSelection::new());
        let registry = Arc::new(DeviceRegistry::new(
            api.clone(),
            selection.clone(),
            store.clone(),
            controls.clone(),
        ));
        let dispatcher = Arc::new(CommandDispatcher::new(
            api.clone(),
            selection.clone(),
            store,
            controls.clone(),
        ));
        let poller = Arc::new(ReadingsPoller::new(api, selection.clone(), sink));
        let scheduler = RefreshScheduler::new(
            registry.clone(),
            poller.clone(),
            dispatcher.clone(),
            selection.clone(),
            settings.clone(),
        );

        Self {
            registry,
            dispatcher,
            poller,
            selection,
            controls,
            scheduler,
            settings,
        }
    }

    pub async fn start(&self) -> RefreshTasks {
        self.scheduler.start().await
    }

    /// Dropdown change handler: select, remember, and poll right away.
    pub async fn select_device(&self, id: DeviceId) -> Result<(), SelectionError> {
        self.registry.select(id).await?;
        self.refresh_now().await;
        Ok(())
    }

    /// Threshold input edited.
    pub async fn edit_threshold(&self, kind: ControlKind, value: &str) -> Result<(), CommandError> {
        self.controls.set_threshold_input(kind, value)?;
        self.dispatcher.save_threshold(kind, value).await
    }

    /// Automation switch flipped.
    pub async fn toggle_switch(&self, kind: ControlKind, checked: bool) -> Result<(), CommandError> {
        self.controls.set_switch_checked(kind, checked)?;
        match kind {
            ControlKind::Watering => self.dispatcher.auto().await,
            ControlKind::Lighting => self.dispatcher.manual().await,
        }
    }

    pub async fn refresh_now(&self) {
        self.poller
            .refresh(self.settings.latest_points, self.settings.chart_points)
            .await;
    }
}
