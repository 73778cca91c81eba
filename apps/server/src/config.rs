use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use passfinder_catalog::{CatalogConfig, ThrottleConfig, DEFAULT_BASE_URL};

const DEFAULT_PORT: u16 = 3000;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port: u16 = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let host: IpAddr = parse_or(&lookup, "PASSFINDER_BIND_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let cors_allow = lookup("PASSFINDER_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = ThrottleConfig::default();
        let throttle = ThrottleConfig {
            base_delay: millis_or(&lookup, "PASSFINDER_BASE_DELAY_MS", defaults.base_delay),
            penalty_increment: millis_or(
                &lookup,
                "PASSFINDER_PENALTY_INCREMENT_MS",
                defaults.penalty_increment,
            ),
            max_penalty: lookup("PASSFINDER_MAX_PENALTY_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis),
        };

        let base_url = lookup("PASSFINDER_UPSTREAM_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let concurrency: usize = parse_or(&lookup, "PASSFINDER_CONCURRENCY", 1usize).max(1);
        let request_timeout = lookup("PASSFINDER_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis);

        Self {
            listen_addr: SocketAddr::new(host, port),
            cors_allow,
            catalog: CatalogConfig {
                base_url,
                throttle,
                concurrency,
                request_timeout,
            },
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

fn millis_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    lookup(key)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
