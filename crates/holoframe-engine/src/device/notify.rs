/// Receives device-loss and device-restore notifications.
///
/// Registered with `DeviceResources::register_device_notify` as a weak
/// reference. A registrant must deregister before it is dropped.
pub trait DeviceNotify: Send + Sync {
    /// Called before any device resource is released. Drop every handle
    /// derived from the old device here.
    fn on_device_lost(&self);

    /// Called once the new device, context and interop handle are published.
    fn on_device_restored(&self);
}
