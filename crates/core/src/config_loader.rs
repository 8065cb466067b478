use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment prefix; nested keys use `__`, e.g. `CAPFUND_SERVER__PORT`.
pub const ENV_PREFIX: &str = "CAPFUND_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, the TOML file at `path`,
    /// and `CAPFUND_` environment variables. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or environment cannot be parsed into `AppConfig`.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Self::base(path.as_ref())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Loads configuration with a profile overlay (`Config.<profile>.toml`
    /// next to `path`) applied before environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any source cannot be parsed into `AppConfig`.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        let path = path.as_ref();
        let overlay = path.with_file_name(format!("Config.{profile}.toml"));

        let config: AppConfig = Self::base(path)
            .merge(Toml::file(overlay))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    fn base(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("config/Config.toml").expect("defaults");
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.server.addr(), "0.0.0.0:8000");
            Ok(())
        });
    }

    #[test]
    fn toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Config.toml",
                r#"
                [server]
                host = "127.0.0.1"
                port = 9100

                [allocation]
                max_assets = 50
                "#,
            )?;

            let config = ConfigLoader::load("config/Config.toml").expect("toml config");
            assert_eq!(config.server.addr(), "127.0.0.1:9100");
            assert_eq!(config.allocation.max_assets, 50);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", "[server]\nport = 9100\n")?;
            jail.set_env("CAPFUND_SERVER__PORT", "9200");

            let config = ConfigLoader::load("Config.toml").expect("env config");
            assert_eq!(config.server.port, 9200);
            assert_eq!(config.server.host, "0.0.0.0");
            Ok(())
        });
    }

    #[test]
    fn profile_overlay_applies_after_base_file() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", "[allocation]\nmax_assets = 50\n")?;
            jail.create_file("Config.prod.toml", "[allocation]\nmax_assets = 200\n")?;

            let config = ConfigLoader::load_with_profile("Config.toml", "prod").expect("profile");
            assert_eq!(config.allocation.max_assets, 200);
            Ok(())
        });
    }

    #[test]
    fn malformed_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", "[server]\nport = \"not a port\"\n")?;
            assert!(ConfigLoader::load("Config.toml").is_err());
            Ok(())
        });
    }
}
