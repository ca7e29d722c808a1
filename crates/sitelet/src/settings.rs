use std::net::{Ipv4Addr, SocketAddr};

use crate::SiteError;

/// Environment variable overriding [`ServerSettings::addr`].
pub const ADDR_VAR: &str = "SITELET_ADDR";

/// Where and how the server listens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    /// Address the HTTP listener binds to.
    ///
    /// Default: `127.0.0.1:8080`
    pub addr: SocketAddr,

    /// Path that accepts `POST`ed remoting packets.
    ///
    /// Default: `/rpc`
    pub remoting_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            remoting_path: String::from("/rpc"),
        }
    }
}

impl ServerSettings {
    /// Defaults, with the address taken from `SITELET_ADDR` when set.
    pub fn from_env() -> Result<Self, SiteError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, SiteError> {
        let mut settings = Self::default();
        if let Some(value) = lookup(ADDR_VAR) {
            settings.addr = value.trim().parse().map_err(|_| SiteError::InvalidSetting {
                name: ADDR_VAR,
                value,
            })?;
        }
        Ok(settings)
    }
}
