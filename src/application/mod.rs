// Application layer - Use cases and the ports they depend on
pub mod command_dispatcher;
pub mod dashboard_api;
pub mod device_registry;
pub mod readings_poller;
pub mod refresh_scheduler;
pub mod selection;
pub mod selection_store;
pub mod view;

#[cfg(test)]
pub mod testing;
