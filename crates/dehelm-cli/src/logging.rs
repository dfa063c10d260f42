//! Logging setup
//!
//! Converter events go to stderr so stdout only carries the run summary.
//! `RUST_LOG` overrides the default level.

use tracing::metadata::Level;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directive) => match EnvFilter::try_new(&directive) {
            Ok(filter) => filter,
            Err(err) => {
                eprintln!("invalid log filter: {err}");
                eprintln!("falling back to default logging");
                EnvFilter::new(default_level.to_string().to_ascii_lowercase())
            }
        },
        Err(_) => EnvFilter::new(default_level.to_string().to_ascii_lowercase()),
    };

    let use_color = std::io::IsTerminal::is_terminal(&std::io::stderr());

    // keep an already installed subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .with_target(false)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .try_init();
}
