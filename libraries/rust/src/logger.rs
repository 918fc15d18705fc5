use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "pam=info";

/// Install the global subscriber for request logging. `RUST_LOG` replaces the
/// default `pam=info` directive. Returns `false` when a subscriber was already
/// installed.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_err| eprintln!("Unable to set global default subscriber"))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();

        assert!(!init_tracing());

        tracing::info!("tracing initialized");
    }
}
