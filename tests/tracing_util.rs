use tracing_subscriber::{fmt, EnvFilter};

/// Per-test tracing guard.
///
/// Installs a fmt subscriber writing through the test harness so `--nocapture`
/// shows structured logs; `RUST_LOG` controls the filter, defaulting to warn.
pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self { _guard: guard }
    }
}
