//! This module provides observability and diagnostics hooks for the crate.
//!
//! The `log_metric!` macro emits structured key-value metric lines to stdout.
//! The `#[cfg(debug_assertions)]` attribute ensures that the macro body and
//! all calls to it are completely compiled out of release builds, imposing no
//! performance penalty in production.

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use tessera_record::log_metric;
/// let dropped = 4;
/// log_metric!("event" = "stats_drain", "dropped" = &dropped);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("TESSERA_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}
