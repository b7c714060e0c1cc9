//! Signal and panic hooks that drain the global reclamation registry

use super::registry::ReclamationRegistry;
use once_cell::sync::OnceCell;
use reclaim_config::ReclaimConfig;

static HANDLER_INSTALLED: OnceCell<()> = OnceCell::new();

/// Initialize reclamation handling (safe to call more than once)
///
/// On unix a watcher thread turns SIGINT/SIGTERM into a drain of the global
/// registry followed by exit. When panics abort the process, a chained panic
/// hook drains it before the original hook runs. Unwinding panics leave the
/// registry alone: they may be recovered, and unwinding drops the wrappers on
/// the panicking stack anyway.
pub fn init_reclamation_handler() {
    HANDLER_INSTALLED.get_or_init(|| {
        install_signal_watcher();
        install_panic_hook();
    });
}

/// Install the handlers unless `install_handlers` is off.
///
/// Returns whether the handlers are installed after the call.
pub fn init_reclamation_handler_with(config: &ReclaimConfig) -> bool {
    if !config.install_handlers {
        log::debug!("Reclamation handlers disabled by configuration");
        return reclamation_handler_installed();
    }
    init_reclamation_handler();
    true
}

/// Whether `init_reclamation_handler` has run
pub fn reclamation_handler_installed() -> bool {
    HANDLER_INSTALLED.get().is_some()
}

#[cfg(unix)]
fn install_signal_watcher() {
    use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};
    use std::thread;

    let registry = std::sync::Arc::downgrade(&ReclamationRegistry::global());

    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to register signal handlers: {e}");
            return;
        }
    };

    let spawned = thread::Builder::new()
        .name("reclaim-signals".to_string())
        .spawn(move || {
            #[allow(clippy::never_loop)]
            for sig in signals.forever() {
                log::info!("Received signal {sig}, reclaiming resources...");

                if let Some(registry) = registry.upgrade() {
                    let count = registry.reclaim_all();
                    log::info!("Reclaimed {count} resources");
                }

                std::process::exit(128 + sig);
            }
        });

    if let Err(e) = spawned {
        log::error!("Failed to spawn signal watcher: {e}");
    }
}

#[cfg(not(unix))]
fn install_signal_watcher() {}

#[cfg(panic = "abort")]
fn install_panic_hook() {
    let registry: std::sync::Arc<ReclamationRegistry> = ReclamationRegistry::global();
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if registry.try_reclaim_all().is_none() {
            eprintln!("Reclamation registry busy, skipping fallback releases");
        }

        original_hook(panic_info);
    }));
}

#[cfg(not(panic = "abort"))]
fn install_panic_hook() {}

/// Run every armed fallback in the global registry
pub fn reclaim_all_resources() -> usize {
    ReclamationRegistry::global().reclaim_all()
}
