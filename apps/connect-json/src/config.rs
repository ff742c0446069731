use std::fmt;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// The peer a session connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Endpoint {
        Endpoint {
            host: host.into(),
            port,
        }
    }

    /// Builds an endpoint from positional `[host] [port]` arguments, the
    /// program name already stripped. Missing values fall back to
    /// [`DEFAULT_HOST`] and [`DEFAULT_PORT`].
    pub fn from_args<I>(args: I) -> Result<Endpoint, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let host = args.next().unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match args.next() {
            Some(value) => value
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        Ok(Endpoint::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Endpoint {
    fn default() -> Endpoint {
        Endpoint::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_args() {
        let endpoint = Endpoint::from_args(args(&[])).unwrap();
        assert_eq!(endpoint, Endpoint::default());
        assert_eq!(endpoint.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn host_and_port_from_args() {
        let endpoint = Endpoint::from_args(args(&["localhost", "6142"])).unwrap();
        assert_eq!(endpoint.host(), "localhost");
        assert_eq!(endpoint.port(), 6142);
    }

    #[test]
    fn host_only_keeps_default_port() {
        let endpoint = Endpoint::from_args(args(&["10.0.2.15"])).unwrap();
        assert_eq!(endpoint.port(), DEFAULT_PORT);
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        let err = Endpoint::from_args(args(&["localhost", "65536"])).unwrap_err();
        match err {
            ConfigError::InvalidPort { value, .. } => assert_eq!(value, "65536"),
        }
    }
}
