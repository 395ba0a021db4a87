//! # Tracking Configuration
//!
//! Policy knobs for tracking sessions. Every value has a default, so an empty
//! environment yields a working [`TrackingConfig`].
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TRACKING_ROUTE_INTERVAL_SECS` | `30` |
//! | `TRACKING_IO_TIMEOUT_SECS` | `10` |
//! | `TRACKING_VIEWPORT_MIN_SPAN` | `0.01` |
//! | `TRACKING_DEFAULT_LAT` / `TRACKING_DEFAULT_LNG` | `19.4517` / `-70.6970` |
//! | `TRACKING_KEEP_OBSERVING` | `false` |
//! | `TRACKING_ROUTER_URL` | `https://router.project-osrm.org` |
//! | `TRACKING_ROUTER_PROFILE` | `driving` |

use crate::model::Coordinate;
use crate::route::osrm::DEFAULT_PROFILE;
use crate::viewport::DEFAULT_MIN_SPAN;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// What a session does after emitting the view for a delivered or cancelled order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalPolicy {
    /// Emit the final view, then terminate.
    #[default]
    StopAfterFinalView,
    /// Keep emitting views until the caller stops the session.
    KeepObserving,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum time between routing requests for one session.
    pub route_interval_secs: u64,
    /// Upper bound on every lookup and routing call.
    pub io_timeout_secs: u64,
    /// Smallest viewport span in degrees.
    pub viewport_min_span: f64,
    /// Map center used when no point of interest is known.
    pub default_center: Coordinate,
    pub terminal_policy: TerminalPolicy,
    pub router_url: String,
    pub router_profile: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            route_interval_secs: 30,
            io_timeout_secs: 10,
            viewport_min_span: DEFAULT_MIN_SPAN,
            default_center: Coordinate::new(19.4517, -70.6970),
            terminal_policy: TerminalPolicy::default(),
            router_url: "https://router.project-osrm.org".to_string(),
            router_profile: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl TrackingConfig {
    pub fn route_interval(&self) -> Duration {
        Duration::from_secs(self.route_interval_secs)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}

/// Load tracking configuration from `.env` and the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an unparseable or out-of-range value.
pub fn load_tracking_config() -> Result<TrackingConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_tracking_config(|key| std::env::var(key))
}

/// Build tracking configuration from the provided env-var lookup function.
///
/// Unset variables take their defaults from [`TrackingConfig::default`].
pub fn build_tracking_config<F>(lookup: F) -> Result<TrackingConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = TrackingConfig::default();

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => {
                let value = raw.trim().parse::<f64>().map_err(|e| invalid(var, e.to_string()))?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(invalid(var, "must be finite".to_string()))
                }
            }
            Err(_) => Ok(default),
        }
    };

    let parse_bool = |var: &str| -> Result<Option<bool>, ConfigError> {
        match lookup(var) {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" => Ok(Some(false)),
                other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
            },
            Err(_) => Ok(None),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let route_interval_secs = parse_u64("TRACKING_ROUTE_INTERVAL_SECS", defaults.route_interval_secs)?;

    let io_timeout_secs = parse_u64("TRACKING_IO_TIMEOUT_SECS", defaults.io_timeout_secs)?;
    if io_timeout_secs == 0 {
        return Err(invalid("TRACKING_IO_TIMEOUT_SECS", "must be at least 1".to_string()));
    }

    let viewport_min_span = parse_f64("TRACKING_VIEWPORT_MIN_SPAN", defaults.viewport_min_span)?;
    if viewport_min_span <= 0.0 {
        return Err(invalid("TRACKING_VIEWPORT_MIN_SPAN", "must be positive".to_string()));
    }

    let lat = parse_f64("TRACKING_DEFAULT_LAT", defaults.default_center.lat)?;
    let lng = parse_f64("TRACKING_DEFAULT_LNG", defaults.default_center.lng)?;
    let default_center = Coordinate::checked(lat, lng).ok_or_else(|| {
        invalid(
            "TRACKING_DEFAULT_LAT",
            format!("({lat}, {lng}) is not a valid coordinate"),
        )
    })?;

    let terminal_policy = match parse_bool("TRACKING_KEEP_OBSERVING")? {
        Some(true) => TerminalPolicy::KeepObserving,
        Some(false) => TerminalPolicy::StopAfterFinalView,
        None => defaults.terminal_policy,
    };

    let router_url = or_default("TRACKING_ROUTER_URL", &defaults.router_url);
    let router_profile = or_default("TRACKING_ROUTER_PROFILE", &defaults.router_profile);

    Ok(TrackingConfig {
        route_interval_secs,
        io_timeout_secs,
        viewport_min_span,
        default_center,
        terminal_policy,
        router_url,
        router_profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn lookup_from_map<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(|v| (*v).to_string()).ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_empty_environment_yields_defaults() {
        let map = HashMap::new();
        let config = build_tracking_config(lookup_from_map(&map)).unwrap();
        assert_eq!(config, TrackingConfig::default());
        assert_eq!(config.route_interval(), Duration::from_secs(30));
        assert_eq!(config.io_timeout(), Duration::from_secs(10));
        assert_eq!(config.terminal_policy, TerminalPolicy::StopAfterFinalView);
    }

    #[test]
    fn test_overrides_are_applied() {
        let map = HashMap::from([
            ("TRACKING_ROUTE_INTERVAL_SECS", "45"),
            ("TRACKING_IO_TIMEOUT_SECS", " 5 "),
            ("TRACKING_VIEWPORT_MIN_SPAN", "0.02"),
            ("TRACKING_DEFAULT_LAT", "18.4861"),
            ("TRACKING_DEFAULT_LNG", "-69.9312"),
            ("TRACKING_KEEP_OBSERVING", "yes"),
            ("TRACKING_ROUTER_URL", "http://osrm.internal:5000"),
            ("TRACKING_ROUTER_PROFILE", "bike"),
        ]);
        let config = build_tracking_config(lookup_from_map(&map)).unwrap();

        assert_eq!(config.route_interval_secs, 45);
        assert_eq!(config.io_timeout_secs, 5);
        assert_eq!(config.viewport_min_span, 0.02);
        assert_eq!(config.default_center, Coordinate::new(18.4861, -69.9312));
        assert_eq!(config.terminal_policy, TerminalPolicy::KeepObserving);
        assert_eq!(config.router_url, "http://osrm.internal:5000");
        assert_eq!(config.router_profile, "bike");
    }

    #[test]
    fn test_unparseable_number_names_the_variable() {
        let map = HashMap::from([("TRACKING_ROUTE_INTERVAL_SECS", "soon")]);
        let result = build_tracking_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRACKING_ROUTE_INTERVAL_SECS"),
            "got: {result:?}"
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for (var, value) in [
            ("TRACKING_IO_TIMEOUT_SECS", "0"),
            ("TRACKING_VIEWPORT_MIN_SPAN", "-1"),
            ("TRACKING_DEFAULT_LAT", "120"),
            ("TRACKING_KEEP_OBSERVING", "maybe"),
        ] {
            let map = HashMap::from([(var, value)]);
            assert!(build_tracking_config(lookup_from_map(&map)).is_err(), "{var}={value}");
        }
    }

    #[test]
    fn test_config_deserializes_with_partial_fields() {
        let config: TrackingConfig = serde_json::from_value(serde_json::json!({
            "route_interval_secs": 15,
            "terminal_policy": "keep_observing"
        }))
        .unwrap();
        assert_eq!(config.route_interval_secs, 15);
        assert_eq!(config.terminal_policy, TerminalPolicy::KeepObserving);
        assert_eq!(config.io_timeout_secs, 10);
    }
}
