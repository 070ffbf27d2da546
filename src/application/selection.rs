// Device selection - the single owner of "which device is current"
use crate::domain::device::DeviceId;
use tokio::sync::watch;

/// Holds the currently selected device id.
///
/// Every read and write goes through here. Writers either replace the value
/// outright (`set`) or derive it from the previous value in one atomic step
/// (`resolve`), so a background refresh cannot interleave with a user switch
/// between reading and writing.
#[derive(Debug)]
pub struct DeviceSelection {
    current: watch::Sender<Option<DeviceId>>,
}

impl DeviceSelection {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn current(&self) -> Option<DeviceId> {
        *self.current.borrow()
    }

    pub fn set(&self, id: Option<DeviceId>) {
        self.current.send_replace(id);
    }

    /// Replace the selection with `f(previous)` and return the new value.
    pub fn resolve<F>(&self, f: F) -> Option<DeviceId>
    where
        F: FnOnce(Option<DeviceId>) -> Option<DeviceId>,
    {
        let mut resolved = None;
        self.current.send_modify(|current| {
            *current = f(*current);
            resolved = *current;
        });
        resolved
    }

    /// Watch for selection changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<DeviceId>> {
        self.current.subscribe()
    }
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self::new()
    }
}
