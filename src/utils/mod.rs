pub mod persistence;

use std::sync::Once;

use tracing_subscriber::filter::{Directive, LevelFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "money_core=info";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_DIRECTIVE);
}

/// Same as [`init_tracing`] but with a caller supplied default directive,
/// typically `Config::log_filter`. `RUST_LOG` still takes precedence.
pub fn init_tracing_with(directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let directive: Directive = directive
            .parse()
            .or_else(|_| DEFAULT_DIRECTIVE.parse())
            .unwrap_or_else(|_| LevelFilter::INFO.into());
        let filter = EnvFilter::from_default_env().add_directive(directive);

        // A host application may already own the global subscriber.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
