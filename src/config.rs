use crate::registry::{CacheTarget, RegistryCatalog};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs, path::Path};
use tracing::info;

pub static DEFAULT_CONFIG_PATH: &str = "/conf/registries.yaml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registries: Vec<String>,
    #[serde(default, rename = "awsAccountId", deserialize_with = "string_or_number")]
    pub aws_account_id: String,
    #[serde(default, rename = "awsRegion")]
    pub aws_region: String,
    #[serde(default)]
    pub webserver: Webserver,
    #[serde(default)]
    pub tls: Tls,
}

#[derive(Debug, Deserialize)]
pub struct Webserver {
    pub port: u16,
}

impl Default for Webserver {
    fn default() -> Self {
        Webserver { port: 8443 }
    }
}

#[derive(Debug, Deserialize)]
pub struct Tls {
    #[serde(default = "default_cert_path", rename = "certPath")]
    pub cert_path: PathBuf,
    #[serde(default = "default_key_path", rename = "keyPath")]
    pub key_path: PathBuf,
}

impl Default for Tls {
    fn default() -> Self {
        Tls {
            cert_path: default_cert_path(),
            key_path: default_key_path(),
        }
    }
}

// Account ids are often written unquoted in YAML.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(u64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Number(n) => n.to_string(),
    })
}

fn default_cert_path() -> PathBuf {
    PathBuf::from("/tls/tls.crt")
}

fn default_key_path() -> PathBuf {
    PathBuf::from("/tls/tls.key")
}

impl Config {
    /// Configured registries, or `docker.io` alone when none are set.
    pub fn registry_catalog(&self) -> RegistryCatalog {
        RegistryCatalog::new(&self.registries)
    }

    pub fn cache_target(&self) -> CacheTarget {
        CacheTarget::new(&self.aws_account_id, &self.aws_region)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    info!("Loading config from file {}", path.as_ref().display());
    let yaml_str = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let expanded = expand_env_vars(&yaml_str)?;

    let config = serde_yaml_ng::from_str(&expanded)
        .context("Failed to parse YAML config after environment variable expansion")?;

    Ok(config)
}

/// Replaces `${VAR}` placeholders with environment variables values.
/// Returns an error naming the first missing variable.
fn expand_env_vars(input: &str) -> Result<String> {
    let re =
        Regex::new(r"\$\{([^}]+)}").context("Invalid regex pattern for env var substitution")?;

    if let Some(missing) = re
        .captures_iter(input)
        .map(|caps| caps[1].to_string())
        .find(|var_name| env::var(var_name).is_err())
    {
        anyhow::bail!("Missing environment variable: {}", missing);
    }

    let result = re.replace_all(input, |caps: &regex::Captures| {
        env::var(&caps[1]).unwrap_or_default()
    });

    Ok(result.into_owned())
}
