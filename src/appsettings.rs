use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    /// Bot token; usually supplied via the `APP_TELEGRAM__TOKEN` environment
    /// variable. When absent, `token_file` is read instead.
    pub token: Option<String>,
    pub token_file: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub path: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DigestSettings {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub telegram: TelegramSettings,
    pub storage: StorageSettings,
    pub timezone: chrono_tz::Tz,
    pub digest: DigestSettings,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("telegram.token_file", "token.txt")?
            .set_default("storage.path", "reminders.json")?
            .set_default("timezone", "Europe/Istanbul")?
            .set_default("digest.hour", 9)?
            .set_default("digest.minute", 0)?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// The configured token, falling back to the token file. Missing both is
    /// fatal at startup.
    pub fn resolve_token(&self) -> anyhow::Result<String> {
        if let Some(token) = &self.telegram.token {
            return Ok(token.clone());
        }

        let raw = std::fs::read_to_string(&self.telegram.token_file).with_context(|| {
            format!(
                "no telegram token configured and token file {} is unreadable",
                self.telegram.token_file.display()
            )
        })?;
        Ok(raw.trim().to_string())
    }

    pub fn digest_time(&self) -> anyhow::Result<NaiveTime> {
        NaiveTime::from_hms_opt(self.digest.hour, self.digest.minute, 0)
            .with_context(|| format!("{}:{} is not a valid digest time", self.digest.hour, self.digest.minute))
    }
}
