#![deny(missing_docs)]
//! Logging for the benchdesk workspace.
//!
//! The `desk_*` macros wrap the `log` facade and tag each record with the
//! task the calling thread follows, e.g. `[task 7f3a] following task 7f3a`.
//! The tag is per thread: only threads that call [`set_active_task`] carry
//! one, everything else logs `[task -]`.

use std::cell::RefCell;

#[doc(hidden)]
pub use log;

thread_local! {
    static ACTIVE_TASK: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Records the task id the current thread is following.
/// Pass `None` once the task is finished or superseded.
pub fn set_active_task(task_id: Option<&str>) {
    ACTIVE_TASK.with(|v| *v.borrow_mut() = task_id.map(str::to_owned));
}

/// Task label for the current thread, `"-"` when no task is followed.
pub fn active_task_label() -> String {
    ACTIVE_TASK.with(|v| v.borrow().clone().unwrap_or_else(|| "-".to_string()))
}

#[doc(hidden)]
#[macro_export]
macro_rules! __desk_log {
    ($level:expr, $($arg:tt)*) => {
        $crate::log::log!(
            $level,
            "[task {}] {}",
            $crate::active_task_label(),
            format_args!($($arg)*)
        )
    };
}

/// Trace-level record tagged with the active task.
#[macro_export]
macro_rules! desk_trace {
    ($($arg:tt)*) => {
        $crate::__desk_log!($crate::log::Level::Trace, $($arg)*)
    };
}

/// Debug-level record tagged with the active task.
#[macro_export]
macro_rules! desk_debug {
    ($($arg:tt)*) => {
        $crate::__desk_log!($crate::log::Level::Debug, $($arg)*)
    };
}

/// Info-level record tagged with the active task.
#[macro_export]
macro_rules! desk_info {
    ($($arg:tt)*) => {
        $crate::__desk_log!($crate::log::Level::Info, $($arg)*)
    };
}

/// Warn-level record tagged with the active task.
#[macro_export]
macro_rules! desk_warn {
    ($($arg:tt)*) => {
        $crate::__desk_log!($crate::log::Level::Warn, $($arg)*)
    };
}

/// Error-level record tagged with the active task.
#[macro_export]
macro_rules! desk_error {
    ($($arg:tt)*) => {
        $crate::__desk_log!($crate::log::Level::Error, $($arg)*)
    };
}

/// Installs a stderr logger for tests. No-op when a logger already exists.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Error)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Never);
}
