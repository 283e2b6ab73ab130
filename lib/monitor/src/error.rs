use std::collections::TryReserveError;

#[derive(thiserror::Error, Debug)]
/// Failures the monitor cannot degrade around
pub enum MonitorError {
    #[error("Could not allocate a {width}x{height} frame buffer")]
    /// A geometry change needs buffers the allocator will not hand out
    Allocation {
        width: u32,
        height: u32,
        #[source]
        source: TryReserveError,
    },
    #[error("Could not start the refresh scheduler")]
    /// The presentation thread could not be spawned
    Scheduler(#[source] std::io::Error),
    #[error("Monitor has been destroyed")]
    /// The monitor was torn down and will not accept new state
    Destroyed,
}
