//! Real-Time Priority Hints

use tracing::{debug, warn};

/// Ask the OS to run the calling thread under SCHED_FIFO at `priority`
///
/// A hint only: without the needed privileges the request is refused, logged
/// and the thread keeps its normal policy. A priority of 0 is a no-op.
#[cfg(unix)]
pub fn apply_realtime_hint(thread: &str, priority: i32) -> bool {
    if priority <= 0 {
        return false;
    }

    // SAFETY: sched_param is plain data; zero is a valid value for every field
    let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
    param.sched_priority = priority;

    // SAFETY: pthread_self() is the calling thread and param outlives the call
    let ret = unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param) };
    if ret != 0 {
        warn!(
            thread,
            priority,
            error = %std::io::Error::from_raw_os_error(ret),
            "Real-time priority hint rejected"
        );
        return false;
    }

    debug!(thread, priority, "Real-time priority applied");
    true
}

#[cfg(not(unix))]
pub fn apply_realtime_hint(thread: &str, priority: i32) -> bool {
    if priority > 0 {
        debug!(thread, priority, "Real-time priority hints unsupported on this platform");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_priority_is_noop() {
        assert!(!apply_realtime_hint("test", 0));
    }
}
