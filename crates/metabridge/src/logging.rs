use crate::config::LoggingConfig;

/// Install an `env_logger` backend at the configured level. `RUST_LOG`, when
/// set, still wins. Hosts that already installed a `log` backend keep it;
/// the second install is ignored.
pub fn init(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    let installed = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok();

    if installed {
        log::debug!(target: "metabridge", "logging initialised at {}", config.level);
    }
}
