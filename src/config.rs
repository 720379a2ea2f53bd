use std::env;
use std::net::SocketAddr;

use crate::error::{config_error, Error};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_COMPLETIONS_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub completions: CompletionsConfig,
}

#[derive(Clone, Debug)]
pub struct CompletionsConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub customer_id: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
            .parse()
            .map_err(config_error)?;

        let timeout_secs = match env::var("COMPLETIONS_TIMEOUT_SECS") {
            Ok(value) => value.parse().map_err(config_error)?,
            Err(_) => DEFAULT_COMPLETIONS_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            jwt_secret: env::var("JWT_SECRET")?,
            completions: CompletionsConfig {
                api_base: env::var("COMPLETIONS_API_BASE")?,
                api_key: env::var("COMPLETIONS_API_KEY")?,
                model: env::var("COMPLETIONS_MODEL")?,
                customer_id: env::var("COMPLETIONS_CUSTOMER_ID").ok(),
                timeout_secs,
            },
        })
    }
}

#[test]
fn reads_environment_with_defaults() {
    env::remove_var("BIND_ADDR");
    env::remove_var("COMPLETIONS_TIMEOUT_SECS");
    env::remove_var("COMPLETIONS_CUSTOMER_ID");
    env::set_var("JWT_SECRET", "secret");
    env::set_var("COMPLETIONS_API_BASE", "http://localhost:9000/v1");
    env::set_var("COMPLETIONS_API_KEY", "key");
    env::set_var("COMPLETIONS_MODEL", "route-model");

    let config = Config::from_env().unwrap();

    assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    assert_eq!(config.jwt_secret, "secret");
    assert_eq!(config.completions.model, "route-model");
    assert_eq!(config.completions.customer_id, None);
    assert_eq!(config.completions.timeout_secs, DEFAULT_COMPLETIONS_TIMEOUT_SECS);

    env::set_var("COMPLETIONS_TIMEOUT_SECS", "soon");
    let err = Config::from_env().unwrap_err();
    assert_eq!(err.code, 1);
    env::remove_var("COMPLETIONS_TIMEOUT_SECS");
}
