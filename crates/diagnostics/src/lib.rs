//! Logging facade shared by the shellfs crates.
//!
//! The level is read from `SHELLFS_LOG` once, at the first call to [`init`]:
//! - `off` (default) - nothing is emitted
//! - `error`, `warn`, `info`, `debug` - minimum level written to stderr
//!
//! Library code never initializes logging; binaries and tests call [`init`].

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "SHELLFS_LOG";

static INIT: Once = Once::new();

fn min_level(setting: &str) -> Option<emit::Level> {
    match setting {
        "debug" => Some(emit::Level::Debug),
        "info" => Some(emit::Level::Info),
        "warn" => Some(emit::Level::Warn),
        "error" => Some(emit::Level::Error),
        _ => None,
    }
}

/// Initialize diagnostics based on the `SHELLFS_LOG` environment variable.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let setting = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        if setting == "off" {
            return;
        }

        let level = min_level(&setting).unwrap_or(emit::Level::Info);
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if min_level(&setting).is_none() {
            emit::warn!("unknown {var} value {setting}, using info", var: LOG_ENV, setting: setting.as_str());
        }

        // The runtime lives for the rest of the process.
        std::mem::forget(rt);
    });
}

/// Routine operations a user may want to see (seeding, store startup).
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Internal detail: transaction admission, commits, rollbacks.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable conditions worth noting.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that prevent normal operation.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_level_names() {
        assert_eq!(min_level("debug"), Some(emit::Level::Debug));
        assert_eq!(min_level("error"), Some(emit::Level::Error));
        assert_eq!(min_level("verbose"), None);
    }

    #[test]
    fn test_macros_compile() {
        info!("store opened");
        debug!("admitted {ticket}", ticket: 7);
        warn!("fallback");
        error!("backend {reason}", reason: "gone");
    }
}
