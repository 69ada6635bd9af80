use std::env;

use chrono::Duration;
use log::*;
use srg_common::helpers::parse_boolean_flag;

const DEFAULT_SRG_HOST: &str = "127.0.0.1";
const DEFAULT_SRG_PORT: u16 = 8370;
const DEFAULT_SRG_DATABASE_URL: &str = "sqlite://data/srg_store.db";
const DEFAULT_PAYMENT_WINDOW: Duration = Duration::seconds(900);
const DEFAULT_EXPIRY_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
const DEFAULT_EXPIRY_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The time a new order stays in `WaitingPayment` before the expiry worker returns its stock.
    pub payment_window: Duration,
    /// How often the expiry worker checks the in-process timer queue for due orders.
    pub expiry_poll_interval: std::time::Duration,
    /// How often the expiry worker re-scans the database for overdue orders the timer queue missed.
    pub expiry_sweep_interval: std::time::Duration,
    /// If true, the expiry worker is not started and reservations only expire via explicit API calls. **DANGER**
    pub disable_expiry_worker: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SRG_HOST.to_string(),
            port: DEFAULT_SRG_PORT,
            database_url: String::default(),
            payment_window: DEFAULT_PAYMENT_WINDOW,
            expiry_poll_interval: DEFAULT_EXPIRY_POLL_INTERVAL,
            expiry_sweep_interval: DEFAULT_EXPIRY_SWEEP_INTERVAL,
            disable_expiry_worker: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SRG_HOST").ok().unwrap_or_else(|| DEFAULT_SRG_HOST.into());
        let port = env::var("SRG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SRG_PORT. {e} Using the default, {DEFAULT_SRG_PORT}, \
                         instead."
                    );
                    DEFAULT_SRG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SRG_PORT);
        let database_url = env::var("SRG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!(
                "🪛️ SRG_DATABASE_URL is not set. Using the default, {DEFAULT_SRG_DATABASE_URL}. Set it to the URL \
                 of the reservation database to silence this warning."
            );
            DEFAULT_SRG_DATABASE_URL.into()
        });
        let payment_window = configure_payment_window();
        let (expiry_poll_interval, expiry_sweep_interval) = configure_expiry_intervals();
        let disable_expiry_worker = parse_boolean_flag(env::var("SRG_DISABLE_EXPIRY_WORKER").ok(), false);
        if disable_expiry_worker {
            warn!(
                "🪛️ SRG_DISABLE_EXPIRY_WORKER is set. Orders will NOT expire on their own and reserved stock will \
                 only be returned by explicit cancellations."
            );
        }
        Self {
            host,
            port,
            database_url,
            payment_window,
            expiry_poll_interval,
            expiry_sweep_interval,
            disable_expiry_worker,
        }
    }
}

fn configure_payment_window() -> Duration {
    env::var("SRG_PAYMENT_WINDOW_SECONDS")
        .map_err(|_| {
            info!(
                "🪛️ SRG_PAYMENT_WINDOW_SECONDS is not set. Using the default value of {} s.",
                DEFAULT_PAYMENT_WINDOW.num_seconds()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::seconds)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SRG_PAYMENT_WINDOW_SECONDS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_PAYMENT_WINDOW)
}

fn configure_expiry_intervals() -> (std::time::Duration, std::time::Duration) {
    let expiry_poll_interval = env::var("SRG_EXPIRY_POLL_SECONDS")
        .map_err(|_| {
            info!(
                "🪛️ SRG_EXPIRY_POLL_SECONDS is not set. Using the default value of {} s.",
                DEFAULT_EXPIRY_POLL_INTERVAL.as_secs()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(std::time::Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SRG_EXPIRY_POLL_SECONDS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_EXPIRY_POLL_INTERVAL);
    let expiry_sweep_interval = env::var("SRG_EXPIRY_SWEEP_SECONDS")
        .map_err(|_| {
            info!(
                "🪛️ SRG_EXPIRY_SWEEP_SECONDS is not set. Using the default value of {} s.",
                DEFAULT_EXPIRY_SWEEP_INTERVAL.as_secs()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(std::time::Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SRG_EXPIRY_SWEEP_SECONDS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_EXPIRY_SWEEP_INTERVAL);
    (expiry_poll_interval, expiry_sweep_interval)
}
