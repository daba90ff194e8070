use std::{
    thread,
    time::{Duration, Instant},
};

/// Polls `condition` until it holds or `timeout` elapses. Returns whether
/// it held.
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

/// Assert that a condition becomes true within two seconds
#[macro_export]
macro_rules! assert_eventually {
    ($condition:expr) => {
        assert!(
            $crate::wait_until(std::time::Duration::from_secs(2), || $condition),
            "condition never held: {}",
            stringify!($condition)
        );
    };
    ($condition:expr, $($message:tt)+) => {
        assert!(
            $crate::wait_until(std::time::Duration::from_secs(2), || $condition),
            $($message)+
        );
    };
}
