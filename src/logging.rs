use std::io::Write;

use env_logger::{Builder, Env, Logger, Target};
use log::{Level, LevelFilter, Log, Metadata};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Bare message lines: shader and link diagnostics are read as plain text.
fn configure(env: Env<'_>, target: Target) -> Builder {
    let mut builder = Builder::from_env(env);
    builder
        .target(target)
        .format(|buf, record| writeln!(buf, "{}", record.args()));
    builder
}

/// Builds a logger from `env` whose filter can raise verbosity but never
/// drops this crate's error records.
fn build_logger(env: impl Fn() -> Env<'static>, target: Target) -> Logger {
    let diagnostics = Metadata::builder()
        .level(Level::Error)
        .target(CRATE_TARGET)
        .build();

    let mut builder = configure(env(), target);
    if !configure(env(), Target::Stdout).build().enabled(&diagnostics) {
        builder.filter_module(CRATE_TARGET, LevelFilter::Error);
    }

    builder.build()
}

/// Installs the stdout logger. `RUST_LOG` adjusts verbosity, default `info`.
pub(crate) fn init_logging() {
    let logger = build_logger(|| Env::default().default_filter_or("info"), Target::Stdout);
    let max_level = logger.filter();

    // A logger installed earlier keeps running.
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
        log::debug!("logging initialized");
    }
}
