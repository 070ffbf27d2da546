// Main entry point - Dependency injection and refresh loop setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::file_store::FileSelectionStore;
use crate::infrastructure::http_api::HttpDashboardApi;
use crate::presentation::app_state::Dashboard;
use crate::presentation::console_view::ConsoleView;
use crate::presentation::handlers::{run_operator_console, HELP};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Adapters (infrastructure layer)
    let api = Arc::new(HttpDashboardApi::new(&config.backend)?);
    let store = Arc::new(FileSelectionStore::open(&config.storage.path));
    let view = Arc::new(ConsoleView::new());

    // Services (application layer), wired once
    let dashboard = Arc::new(Dashboard::new(
        api,
        store,
        view.clone(),
        view.clone(),
        config.refresh.to_settings(),
    ));

    let mut selection = dashboard.selection.subscribe();
    tokio::spawn(async move {
        while selection.changed().await.is_ok() {
            let current = *selection.borrow_and_update();
            match current {
                Some(id) => tracing::info!(device_id = id, "Current device"),
                None => tracing::info!("No device selected"),
            }
        }
    });

    println!("Polling {}", config.backend.base_url);
    let tasks = dashboard.start().await;
    println!("{}", HELP);

    tokio::select! {
        result = run_operator_console(dashboard.clone(), view) => result?,
        _ = tokio::signal::ctrl_c() => {}
    }

    tasks.abort();
    Ok(())
}
