/// Filter directives for the logger: an explicit level (`--log-level` or
/// `RUST_LOG`) wins over the debug flag.
pub fn log_filter(debug: bool, log_level: Option<&str>) -> String {
    match log_level.map(str::trim).filter(|level| !level.is_empty()) {
        Some(level) => level.to_string(),
        None if debug => "debug".to_string(),
        None => "info".to_string(),
    }
}

/// Initializes `env_logger` with `filter` and a timestamped line format.
pub fn init_logging(filter: &str) {
    env_logger::Builder::new()
        .parse_filters(filter)
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}] {} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_overrides_debug_flag() {
        assert_eq!(log_filter(true, Some("warn,agent_mcp=trace")), "warn,agent_mcp=trace");
        assert_eq!(log_filter(false, Some("debug")), "debug");
    }

    #[test]
    fn debug_flag_picks_default_level() {
        assert_eq!(log_filter(true, None), "debug");
        assert_eq!(log_filter(false, None), "info");
        assert_eq!(log_filter(false, Some("  ")), "info");
    }
}
