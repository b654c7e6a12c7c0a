use crate::config::Settings;

/// Load settings, falling back to defaults when the config is unreadable or
/// invalid. The reason for a fallback is returned so it can be logged once
/// tracing is up.
pub fn load_settings() -> (Settings, Option<String>) {
    let loaded = Settings::load()
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });

    match loaded {
        Ok(settings) => (settings, None),
        Err(reason) => {
            eprintln!("audioflow: {reason}, using defaults");
            (Settings::default(), Some(reason))
        }
    }
}
