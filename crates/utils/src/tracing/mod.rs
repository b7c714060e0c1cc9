use reclaim_config::ReclaimConfig;
use reclaim_core::{
    constants::{DEFAULT_LOG_FILTER, RECLAIM_LOG_VAR},
    ReleaseTrigger, ResourceId,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system
///
/// The filter comes from `RECLAIM_LOG`, then `RUST_LOG`, then falls back to
/// `info`. Returns an error if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(RECLAIM_LOG_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    install(filter)
}

/// Initialize the tracing system with an explicit filter directive
pub fn init_with_filter(
    directive: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    install(EnvFilter::try_new(directive)?)
}

/// Initialize the tracing system with the configured `log_filter`
pub fn init_from_config(
    config: &ReclaimConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    init_with_filter(&config.log_filter)
}

fn install(filter: EnvFilter) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Create a span covering the lifetime of one resource
pub fn resource_span(id: ResourceId, label: &str) -> Span {
    span!(Level::DEBUG, "resource", resource_id = %id, resource = %label)
}

/// Emit a structured event for a successful acquisition
pub fn resource_acquired(id: ResourceId, label: &str) {
    debug!(resource_id = %id, resource = %label, "resource_acquired");
}

/// Emit a structured event for the first, effective release
pub fn resource_released(id: ResourceId, label: &str, trigger: ReleaseTrigger) {
    match trigger {
        ReleaseTrigger::Owner => {
            debug!(resource_id = %id, resource = %label, trigger = %trigger, "resource_released");
        }
        ReleaseTrigger::Fallback => {
            // The owner forgot to release; worth surfacing
            info!(resource_id = %id, resource = %label, trigger = %trigger, "resource_released");
        }
    }
}

/// Emit a structured event for a cleanup step that failed during release
pub fn release_failed(id: ResourceId, label: &str, step: &str, err: &dyn std::error::Error) {
    warn!(
        resource_id = %id,
        resource = %label,
        step = %step,
        error = %err,
        "release_failed"
    );
}

/// Emit a structured event when the live count is over its threshold
pub fn pressure_detected(live: usize, threshold: usize) {
    warn!(live = %live, threshold = %threshold, "live_pressure");
}
