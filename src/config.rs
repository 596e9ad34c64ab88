use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://worldcup-backend-s7ej.onrender.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Api,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub source: SourceKind,
    pub tournament_id: Option<String>,
    pub refresh: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |key: &str| {
            lookup(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let api_base_url = opt("WC_API_BASE_URL")
            .map(|url| trim_base_url(&url))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let source = match opt("WC_SOURCE").map(|s| s.to_lowercase()).as_deref() {
            Some("demo") | Some("offline") => SourceKind::Demo,
            _ => SourceKind::Api,
        };
        let refresh = Duration::from_secs(
            opt("WC_REFRESH_SECS")
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(60)
                .max(10),
        );

        Self {
            api_base_url,
            source,
            tournament_id: opt("WC_TOURNAMENT_ID"),
            refresh,
        }
    }
}

pub fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// `.env.local` takes precedence over `.env`; neither is required.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.source, SourceKind::Api);
        assert_eq!(cfg.tournament_id, None);
        assert_eq!(cfg.refresh, Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_normalised() {
        let cfg = config_from(&[
            ("WC_API_BASE_URL", "http://localhost:8000//"),
            ("WC_SOURCE", "Demo"),
            ("WC_TOURNAMENT_ID", " 7 "),
            ("WC_REFRESH_SECS", "2"),
        ]);
        assert_eq!(cfg.api_base_url, "http://localhost:8000");
        assert_eq!(cfg.source, SourceKind::Demo);
        assert_eq!(cfg.tournament_id.as_deref(), Some("7"));
        assert_eq!(cfg.refresh, Duration::from_secs(10));
    }
}
