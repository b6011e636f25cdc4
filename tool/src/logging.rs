use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger; `RUST_LOG` overrides the chosen level.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let env = Env::default().default_filter_or(level.to_string());
    // a second init (tests) keeps the first logger
    let _ = Builder::from_env(env).format_timestamp(None).try_init();
}
