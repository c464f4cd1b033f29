use s3bulkcopy::Config;

/// The live status line is shown unless tracing is verbose or structured.
pub fn is_progress_indicator_needed(config: &Config) -> bool {
    let Some(tracing_config) = config.tracing_config.as_ref() else {
        return true;
    };

    if log::Level::Warn < tracing_config.tracing_level {
        return false;
    }

    !tracing_config.json_tracing
}

pub fn is_show_result_needed(config: &Config) -> bool {
    config
        .tracing_config
        .as_ref()
        .is_none_or(|tracing_config| !tracing_config.json_tracing)
}

/// With JSON tracing, progress goes to the log instead of the console.
pub fn is_progress_log_needed(config: &Config) -> bool {
    config
        .tracing_config
        .as_ref()
        .is_some_and(|tracing_config| tracing_config.json_tracing)
}
