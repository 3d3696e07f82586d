//! # Observability & Tracing
//!
//! The injection core logs through the `tracing` crate with structured fields.
//! [`setup_tracing`] installs a compact subscriber filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! | Level | Event |
//! |-------|-------|
//! | `debug` | Bean registration, instance creation, method invocation, member injection |
//! | `trace` | Constructor metadata, every type lookup and its candidate count |
//! | `warn` | A constructor or method body failed |
//!
//! ```bash
//! RUST_LOG=debug cargo run -p webbeans-servlet
//! RUST_LOG=webbeans=trace cargo test
//! ```
//!
//! With `RUST_LOG=debug` a successful creation reads:
//!
//! ```text
//! DEBUG Bean registered bean="Mailer" bean_type="Mailer" qualifiers={@Current} scope=dependent
//! DEBUG Creating new instance with injected parameters target_type="Mailer" parameters=1
//! ```

/// Initializes the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
