//! Logging setup.

use env_logger::Env;

/// Installs the `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` controls the filter; without it, info-level messages and
/// above are shown. Calling this more than once is harmless.
///
/// # Example
///
/// ```
/// streamtrace::init();
/// streamtrace::init();
/// ```
pub fn init() {
    init_with_default_filter("info");
}

/// Like [`init`], with a custom filter used when `RUST_LOG` is unset.
pub fn init_with_default_filter(filter: &str) {
    if env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .try_init()
        .is_ok()
    {
        log::debug!("streamtrace logging initialized");
    }
}
