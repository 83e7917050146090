use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::Directive};

/// Installs the global subscriber. `debug` raises the level to at least
/// `DEBUG` so raw bodies show up.
pub fn init_logging(log_level: Level, debug: bool) {
    let log_level = if debug {
        log_level.max(Level::DEBUG)
    } else {
        log_level
    };
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(log_level))
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter)
        .finish();
    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {error}");
    }
}
