//! Service configuration
//!
//! Loaded from environment variables; anything unset or unparsable falls
//! back to its default (with a warning for unparsable values).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::allocator::AllocationPolicy;
use crate::registry::RegistryConfig;
use crate::relay::{FfmpegConfig, RelayOptions};

/// Top-level configuration of the relay service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP API listens on
    pub listen_addr: SocketAddr,

    /// Host put into the `ws_url` handed back to callers
    pub public_host: String,

    /// Registry settings (endpoint range, allocation, worker timeouts)
    pub registry: RegistryConfig,

    /// ffmpeg worker settings
    pub ffmpeg: FfmpegConfig,

    /// Transcoding options applied to every stream
    pub relay: RelayOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000),
            public_host: "localhost".to_string(),
            registry: RegistryConfig::default(),
            ffmpeg: FfmpegConfig::default(),
            relay: RelayOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let defaults = Self::default();

        let host = env.parse("BIND_ADDR", defaults.listen_addr.ip());
        let port = env.parse("PORT", defaults.listen_addr.port());

        let base_port = env.parse("RELAY_BASE_PORT", defaults.registry.base_port);
        let mut port_limit = env.parse("RELAY_PORT_LIMIT", defaults.registry.port_limit);
        if port_limit < base_port {
            tracing::warn!(
                base_port,
                port_limit,
                "RELAY_PORT_LIMIT below RELAY_BASE_PORT, using base port as limit"
            );
            port_limit = base_port;
        }

        let registry = RegistryConfig {
            base_port,
            port_limit,
            allocation: env.parse("RELAY_ALLOCATOR", AllocationPolicy::default()),
            start_timeout: env.millis("RELAY_START_TIMEOUT_MS"),
            stop_timeout: env.millis("RELAY_STOP_TIMEOUT_MS"),
        };

        let ffmpeg = FfmpegConfig {
            ffmpeg_path: env
                .get("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg.ffmpeg_path.clone()),
            bind_host: env.parse("RELAY_BIND_HOST", defaults.ffmpeg.bind_host),
            startup_grace: env
                .millis("RELAY_STARTUP_GRACE_MS")
                .unwrap_or(defaults.ffmpeg.startup_grace),
            ..defaults.ffmpeg
        };

        let relay = RelayOptions {
            frame_rate: env.parse("RELAY_FRAME_RATE", defaults.relay.frame_rate),
            quality: env.parse("RELAY_QUALITY", defaults.relay.quality),
            ..defaults.relay
        };

        Self {
            listen_addr: SocketAddr::new(host, port),
            public_host: env.get("RELAY_PUBLIC_HOST").unwrap_or(defaults.public_host),
            registry,
            ffmpeg,
            relay,
        }
    }

    /// Set the API listen address
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the public host used in WebSocket URLs
    pub fn public_host(mut self, host: impl Into<String>) -> Self {
        self.public_host = host.into();
        self
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + std::fmt::Display,
    {
        match self.get(key) {
            None => default,
            Some(raw) => match raw.parse() {
                Ok(value) => value,
                Err(_) => {
                    tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
                    default
                }
            },
        }
    }

    fn millis(&self, key: &str) -> Option<Duration> {
        let raw = self.get(key)?;
        match raw.parse::<u64>() {
            Ok(ms) => Some(Duration::from_millis(ms)),
            Err(_) => {
                tracing::warn!(key, value = %raw, "Invalid duration, ignoring");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> ServiceConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]);

        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.public_host, "localhost");
        assert_eq!(config.registry.base_port, 9999);
        assert_eq!(config.registry.port_limit, 65535);
        assert_eq!(config.registry.allocation, AllocationPolicy::Monotonic);
        assert_eq!(config.ffmpeg.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffmpeg.startup_grace, Duration::from_millis(500));
        assert_eq!(config.relay.frame_rate, 30);
        assert_eq!(config.relay.quality, 3);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1"),
            ("RELAY_BASE_PORT", "20000"),
            ("RELAY_PORT_LIMIT", "20999"),
            ("RELAY_ALLOCATOR", "free-list"),
            ("RELAY_PUBLIC_HOST", "relay.example.com"),
            ("FFMPEG_PATH", "/opt/ffmpeg/bin/ffmpeg"),
            ("RELAY_FRAME_RATE", "25"),
            ("RELAY_QUALITY", "5"),
            ("RELAY_START_TIMEOUT_MS", "10000"),
            ("RELAY_STOP_TIMEOUT_MS", "3000"),
            ("RELAY_STARTUP_GRACE_MS", "0"),
        ]);

        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.public_host, "relay.example.com");
        assert_eq!(config.registry.base_port, 20000);
        assert_eq!(config.registry.port_limit, 20999);
        assert_eq!(config.registry.allocation, AllocationPolicy::FreeList);
        assert_eq!(config.registry.start_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.registry.stop_timeout, Some(Duration::from_secs(3)));
        assert_eq!(
            config.ffmpeg.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert!(config.ffmpeg.startup_grace.is_zero());
        assert_eq!(config.relay.frame_rate, 25);
        assert_eq!(config.relay.quality, 5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = load(&[
            ("PORT", "http"),
            ("RELAY_BASE_PORT", "70000"),
            ("RELAY_ALLOCATOR", "random"),
            ("RELAY_START_TIMEOUT_MS", "soon"),
            ("RELAY_PUBLIC_HOST", "   "),
        ]);

        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.registry.base_port, 9999);
        assert_eq!(config.registry.allocation, AllocationPolicy::Monotonic);
        assert!(config.registry.start_timeout.is_none());
        assert_eq!(config.public_host, "localhost");
    }

    #[test]
    fn test_limit_below_base_is_clamped() {
        let config = load(&[("RELAY_BASE_PORT", "30000"), ("RELAY_PORT_LIMIT", "20000")]);

        assert_eq!(config.registry.base_port, 30000);
        assert_eq!(config.registry.port_limit, 30000);
    }
}
