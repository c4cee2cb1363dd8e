use log::LevelFilter;

/// Initialise env_logger at `level`
///
/// `RUST_LOG`, when set, overrides the level chosen from flags.
pub fn init(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .try_init();
}

/// Map a `-v` count to a level, starting from warnings
pub fn level_from_count(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
