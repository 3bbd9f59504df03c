use std::{env::var, str::FromStr, sync::Arc, time::Duration};

use dotenv::dotenv;
use eyre::{eyre, Context, Error};
use log::info;

const DEFAULT_TRIGGER_WORKERS: usize = 4;
const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

#[derive(Clone)]
pub struct EnvInner {
    mongo_url: String,
    rust_log: String,
    trigger_workers: usize,
    reconcile_timeout: Duration,
    sweep_on_start: bool,
}

impl Env {
    pub fn mongo_url(&self) -> &str {
        &self.0.mongo_url
    }

    pub fn rust_log(&self) -> &str {
        &self.0.rust_log
    }

    pub fn trigger_workers(&self) -> usize {
        self.0.trigger_workers
    }

    pub fn reconcile_timeout(&self) -> Duration {
        self.0.reconcile_timeout
    }

    pub fn sweep_on_start(&self) -> bool {
        self.0.sweep_on_start
    }

    pub fn load() -> Result<Env, Error> {
        if let Err(err) = dotenv() {
            info!("Failed to load .env file: {}", err);
        }
        Env::from_lookup(|key| var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Env, Error> {
        let trigger_workers = parse_or(&lookup, "TRIGGER_WORKERS", DEFAULT_TRIGGER_WORKERS)?;
        if trigger_workers == 0 {
            return Err(eyre!("TRIGGER_WORKERS must be positive"));
        }
        let timeout_secs = parse_or(
            &lookup,
            "RECONCILE_TIMEOUT_SECS",
            DEFAULT_RECONCILE_TIMEOUT_SECS,
        )?;

        Ok(Env(Arc::new(EnvInner {
            mongo_url: lookup("MONGO_URL").ok_or_else(|| eyre!("MONGO_URL is not set"))?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_owned()),
            trigger_workers,
            reconcile_timeout: Duration::from_secs(timeout_secs),
            sweep_on_start: parse_or(&lookup, "SWEEP_ON_START", true)?,
        })))
    }
}

fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Result<Env, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Env::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let env = env(&[("MONGO_URL", "mongodb://localhost:27017")]).unwrap();
        assert_eq!(env.mongo_url(), "mongodb://localhost:27017");
        assert_eq!(env.rust_log(), "info");
        assert_eq!(env.trigger_workers(), 4);
        assert_eq!(env.reconcile_timeout(), Duration::from_secs(30));
        assert!(env.sweep_on_start());
    }

    #[test]
    fn test_overrides() {
        let env = env(&[
            ("MONGO_URL", "mongodb://db"),
            ("TRIGGER_WORKERS", "8"),
            ("RECONCILE_TIMEOUT_SECS", "5"),
            ("SWEEP_ON_START", "false"),
        ])
        .unwrap();
        assert_eq!(env.trigger_workers(), 8);
        assert_eq!(env.reconcile_timeout(), Duration::from_secs(5));
        assert!(!env.sweep_on_start());
    }

    #[test]
    fn test_invalid() {
        assert!(env(&[]).is_err());
        assert!(env(&[("MONGO_URL", "mongodb://db"), ("TRIGGER_WORKERS", "0")]).is_err());
        assert!(env(&[("MONGO_URL", "mongodb://db"), ("TRIGGER_WORKERS", "many")]).is_err());
        assert!(env(&[("MONGO_URL", "mongodb://db"), ("SWEEP_ON_START", "yes")]).is_err());
    }
}
