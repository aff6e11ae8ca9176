//! Settings, read from the environment
//!
//! A `.env` file is loaded before the settings are read

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use anyhow::bail;

use crate::utils::env_var_or_else;
use crate::utils::parse_env_var_or;

const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_EXPIRY_MINUTES: u32 = 30;
const DEFAULT_SHORTCODE_LENGTH: usize = 8;
const DEFAULT_SHORTCODE_ATTEMPTS: u32 = 5;
const DEFAULT_PURGE_INTERVAL_SECONDS: u64 = 300;
const DEFAULT_PURGE_GRACE_MINUTES: u32 = 24 * 60;

/// All settings of the service
#[derive(Clone, Debug)]
pub struct Settings {
    /// Address to listen on
    pub address: SocketAddr,

    /// Base URL short URLs are composed with, without trailing slash
    pub base_url: String,

    /// Minutes a short link lives when no expiry is given
    pub default_expiry_minutes: u32,

    /// Length of generated shortcodes
    pub shortcode_length: usize,

    /// Number of generated shortcodes tried before giving up
    pub shortcode_attempts: u32,

    /// How often expired short links are purged, `None` disables purging
    pub purge_interval: Option<Duration>,

    /// How long an expired short link is kept around for its statistics
    pub purge_grace_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_expiry_minutes: DEFAULT_EXPIRY_MINUTES,
            shortcode_length: DEFAULT_SHORTCODE_LENGTH,
            shortcode_attempts: DEFAULT_SHORTCODE_ATTEMPTS,
            purge_interval: Some(Duration::from_secs(DEFAULT_PURGE_INTERVAL_SECONDS)),
            purge_grace_minutes: DEFAULT_PURGE_GRACE_MINUTES,
        }
    }
}

impl Settings {
    /// Read the settings from the environment
    ///
    /// # Errors
    ///
    /// Will return `Err` when a variable is set to an invalid value
    pub fn from_env() -> Result<Self> {
        let base_url = env_var_or_else("BASE_URL", || String::from(DEFAULT_BASE_URL))
            .trim_end_matches('/')
            .to_string();

        let default_expiry_minutes =
            parse_env_var_or("DEFAULT_EXPIRY_MINUTES", DEFAULT_EXPIRY_MINUTES)?;
        if default_expiry_minutes == 0 {
            bail!("`DEFAULT_EXPIRY_MINUTES` must be a positive number");
        }

        let shortcode_length = parse_env_var_or("SHORTCODE_LENGTH", DEFAULT_SHORTCODE_LENGTH)?;
        if shortcode_length == 0 {
            bail!("`SHORTCODE_LENGTH` must be a positive number");
        }

        let shortcode_attempts =
            parse_env_var_or("SHORTCODE_ATTEMPTS", DEFAULT_SHORTCODE_ATTEMPTS)?;
        if shortcode_attempts == 0 {
            bail!("`SHORTCODE_ATTEMPTS` must be a positive number");
        }

        let purge_interval =
            parse_env_var_or("PURGE_INTERVAL_SECONDS", DEFAULT_PURGE_INTERVAL_SECONDS)?;
        let purge_interval = (purge_interval > 0).then(|| Duration::from_secs(purge_interval));

        Ok(Self {
            address: setup_address()?,
            base_url,
            default_expiry_minutes,
            shortcode_length,
            shortcode_attempts,
            purge_interval,
            purge_grace_minutes: parse_env_var_or(
                "PURGE_GRACE_MINUTES",
                DEFAULT_PURGE_GRACE_MINUTES,
            )?,
        })
    }
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
