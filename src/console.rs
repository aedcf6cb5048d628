//! Browser console logging.
//!
//! Engine code is unit-tested natively, where calling a wasm-bindgen import
//! panics. These helpers forward to `web_sys::console` on wasm and are no-ops
//! everywhere else.

const PREFIX: &str = "Night City Hustler";

/// Informational message (`console.log`).
pub fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&format!("{PREFIX}: {message}").into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (PREFIX, message);
}

/// Recoverable problem (`console.warn`).
pub fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("{PREFIX}: {message}").into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (PREFIX, message);
}
