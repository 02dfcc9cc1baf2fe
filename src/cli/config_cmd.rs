//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, CaptureConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::{ContainerFormat, Duration};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    validate_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;

    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    validate_key(key)?;

    let config = store.load().await?;
    match get_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        let value = get_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn validate_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

fn bool_value(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))
}

/// Validate `value` for `key` and store it in `config`
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "camera" => config.camera = Some(bool_value(key, value)?),
        "microphone" => config.microphone = Some(bool_value(key, value)?),
        "notify" => config.notify = Some(bool_value(key, value)?),
        "audio_cues" => config.audio_cues = Some(bool_value(key, value)?),
        "output_dir" => config.output_dir = Some(value.to_string()),
        "file_prefix" => {
            if value.trim().is_empty() || value.contains(['/', '\\']) {
                return Err(invalid(key, "Prefix must be non-empty and contain no path separators"));
            }
            config.file_prefix = Some(value.to_string());
        }
        "container" => {
            value
                .parse::<ContainerFormat>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.container = Some(value.to_lowercase());
        }
        "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.max_duration = Some(value.to_string());
        }
        _ => {
            let capture = config.capture.get_or_insert_with(CaptureConfig::default);
            match key {
                "capture.display" => capture.display = Some(value.to_string()),
                "capture.audio_source" => capture.audio_source = Some(value.to_string()),
                "capture.camera_device" => capture.camera_device = Some(value.to_string()),
                "capture.framerate" => {
                    let fps = value
                        .parse::<u32>()
                        .ok()
                        .filter(|fps| *fps > 0)
                        .ok_or_else(|| invalid(key, "Value must be a positive integer"))?;
                    capture.framerate = Some(fps);
                }
                _ => return Err(invalid(key, "Unknown key")),
            }
        }
    }
    Ok(())
}

fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    let capture = config.capture.as_ref();
    match key {
        "camera" => config.camera.map(|b| b.to_string()),
        "microphone" => config.microphone.map(|b| b.to_string()),
        "output_dir" => config.output_dir.clone(),
        "file_prefix" => config.file_prefix.clone(),
        "container" => config.container.clone(),
        "max_duration" => config.max_duration.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        "audio_cues" => config.audio_cues.map(|b| b.to_string()),
        "capture.display" => capture.and_then(|c| c.display.clone()),
        "capture.audio_source" => capture.and_then(|c| c.audio_source.clone()),
        "capture.camera_device" => capture.and_then(|c| c.camera_device.clone()),
        "capture.framerate" => capture.and_then(|c| c.framerate).map(|f| f.to_string()),
        _ => None,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("NO"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn set_and_get_booleans() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "camera", "yes").unwrap();
        set_value(&mut config, "microphone", "false").unwrap();
        assert_eq!(get_value(&config, "camera"), Some("true".to_string()));
        assert_eq!(get_value(&config, "microphone"), Some("false".to_string()));
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let mut config = AppConfig::empty();
        let err = set_value(&mut config, "notify", "sometimes").unwrap_err();
        assert!(err.to_string().contains("'true' or 'false'"));
        assert!(config.notify.is_none());
    }

    #[test]
    fn container_is_validated_and_normalised() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "container", "MKV").unwrap();
        assert_eq!(get_value(&config, "container"), Some("mkv".to_string()));
        assert!(set_value(&mut config, "container", "avi").is_err());
    }

    #[test]
    fn max_duration_is_validated() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "max_duration", "2m30s").unwrap();
        assert!(set_value(&mut config, "max_duration", "forever").is_err());
        assert_eq!(get_value(&config, "max_duration"), Some("2m30s".to_string()));
    }

    #[test]
    fn capture_keys_create_section() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "capture.framerate", "60").unwrap();
        set_value(&mut config, "capture.display", ":1.0").unwrap();
        assert_eq!(get_value(&config, "capture.framerate"), Some("60".to_string()));
        assert_eq!(get_value(&config, "capture.display"), Some(":1.0".to_string()));
        assert!(get_value(&config, "capture.camera_device").is_none());
    }

    #[test]
    fn framerate_must_be_positive() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "capture.framerate", "0").is_err());
        assert!(set_value(&mut config, "capture.framerate", "fast").is_err());
    }

    #[test]
    fn file_prefix_rejects_paths() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "file_prefix", "../escape").is_err());
        assert!(set_value(&mut config, "file_prefix", " ").is_err());
        set_value(&mut config, "file_prefix", "demo").unwrap();
        assert_eq!(config.file_prefix_or_default(), "demo");
    }

    #[test]
    fn unknown_key_fails_validation() {
        assert!(validate_key("api_key").is_err());
        assert!(validate_key("container").is_ok());
    }
}
