use std::path::Path;

use anyhow::Context;
use clap::Args;
use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "CERTDIR";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/";

/// Username the certificate API accepts as the admin token.
pub const DEFAULT_ADMIN_IDENTITY: &str = "skzry";

#[derive(Debug, Clone, Deserialize)]
pub struct CtlConfig {
    /// Certificate collection endpoint.
    pub api_url: String,

    /// Webhook-setup endpoint. The webhook commands are unavailable without
    /// it.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Value sent in the admin token header on create, update and delete.
    pub admin_identity: String,
}

/// Settings given on the command line. These win over every other source.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Certificate API endpoint
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Webhook-setup endpoint
    #[arg(long, global = true)]
    pub webhook_url: Option<String>,

    /// Admin identity sent with mutating requests
    #[arg(long, global = true)]
    pub admin_identity: Option<String>,
}

impl CtlConfig {
    /// Resolves the configuration from built-in defaults, the optional TOML
    /// file at `path`, `CERTDIR_*` environment variables and `overrides`, in
    /// increasing precedence.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let file = path.map(|path| File::from(path).format(FileFormat::Toml).required(true));

        Self::resolve(file, Environment::with_prefix(ENV_PREFIX), overrides).with_context(|| {
            match path {
                Some(path) => format!("Failed to load config from {}", path.display()),
                None => "Failed to load config".to_string(),
            }
        })
    }

    fn resolve<S>(
        file: Option<S>,
        env: Environment,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("admin_identity", DEFAULT_ADMIN_IDENTITY)?;

        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        builder
            .add_source(env)
            .set_override_option("api_url", overrides.api_url.clone())?
            .set_override_option("webhook_url", overrides.webhook_url.clone())?
            .set_override_option("admin_identity", overrides.admin_identity.clone())?
            .build()?
            .try_deserialize()
    }
}
