#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;

use clap::ArgMatches;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Eq, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Host,
    Model,
    Port,
    RelayUrl,
    UpstreamKey,
    UpstreamUrl,
    Username,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        if key == ConfigKey::Username {
            let mut user = env::var("USER").unwrap_or_else(|_| return "".to_string());
            if user.is_empty() {
                user = "you".to_string();
            }

            return user;
        }

        let res = match key {
            ConfigKey::Host => "127.0.0.1",
            ConfigKey::Model => "",
            ConfigKey::Port => "8787",
            ConfigKey::RelayUrl => "http://127.0.0.1:8787",
            ConfigKey::UpstreamKey => "",
            ConfigKey::UpstreamUrl => "https://api.inworld.ai",
            ConfigKey::Username => "",
        };

        return res.to_string();
    }

    /// Seeds every key with its default, then applies any overrides present
    /// in the provided matches. Keys a subcommand does not define are left
    /// at their defaults.
    pub fn load(clap_arg_matches: Vec<&ArgMatches>) {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key));
        }

        for matches in clap_arg_matches.as_slice() {
            for key in ConfigKey::iter() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    Config::set(key, val);
                }
            }
        }
    }
}
