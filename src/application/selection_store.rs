// Durable key/value storage for the dashboard's remembered choices

/// Key under which the last user-selected device id is kept.
pub const SELECTED_DEVICE_KEY: &str = "selectedDeviceId";

/// String-valued storage that survives restarts.
///
/// Implementations never fail the caller: write errors are logged and dropped.
pub trait SelectionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);
}
