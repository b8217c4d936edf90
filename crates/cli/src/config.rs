use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use eyre::Result;
use novella_core::{IdStability, LibraryOptions, ProviderCapabilities};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RefreshConfig {
    /// Stored metadata younger than this is served without contacting the provider.
    pub expiry_hours: u64,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ViewsConfig {
    pub cooldown_secs: u64,
}

/// A provider served from a directory of scraped snapshots.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub id: String,
    pub snapshot_dir: String,
    #[serde(default)]
    pub id_stability: IdStability,
    #[serde(default)]
    pub refresh_exempt: bool,
}

impl ProviderConfig {
    pub fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            id_stability: self.id_stability,
            refresh_exempt: self.refresh_exempt,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: get_default_data_dir()
                .join("library")
                .to_string_lossy()
                .to_string(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            expiry_hours: 24,
            fetch_timeout_secs: 30,
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self { cooldown_secs: 300 }
    }
}

impl RefreshConfig {
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_hours.saturating_mul(3600))
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse::<bool>()
        .map_err(|_| eyre::eyre!("Invalid boolean value: {}", value))
}

fn parse_u64(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| eyre::eyre!("Invalid number: {}", value))
}

fn parse_stability(value: &str) -> Result<IdStability> {
    match value.to_lowercase().as_str() {
        "stable" => Ok(IdStability::Stable),
        "unstable" => Ok(IdStability::Unstable),
        _ => Err(eyre::eyre!(
            "Invalid id stability: {} (expected stable or unstable)",
            value
        )),
    }
}

fn stability_str(stability: IdStability) -> &'static str {
    match stability {
        IdStability::Stable => "stable",
        IdStability::Unstable => "unstable",
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    pub fn library_options(&self) -> LibraryOptions {
        LibraryOptions {
            fetch_timeout: Duration::from_secs(self.refresh.fetch_timeout_secs),
            view_cooldown: Duration::from_secs(self.views.cooldown_secs),
        }
    }

    /// Load the configuration, writing the defaults on first use.
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            let default_config = Self::default();
            default_config.save(path).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    fn provider_mut(&mut self, id: &str) -> Result<&mut ProviderConfig> {
        self.providers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| eyre::eyre!("Unknown provider: {}", id))
    }

    fn provider(&self, id: &str) -> Result<&ProviderConfig> {
        self.providers
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| eyre::eyre!("Unknown provider: {}", id))
    }

    /// Set a value by dotted key.
    ///
    /// Setting `providers.<id>.snapshot_dir` on an unknown id registers the
    /// provider.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["storage", "path"] => {
                self.storage.path = value.to_string();
            }
            ["refresh", "expiry_hours"] => {
                self.refresh.expiry_hours = parse_u64(value)?;
            }
            ["refresh", "fetch_timeout_secs"] => {
                let secs = parse_u64(value)?;
                if secs == 0 {
                    return Err(eyre::eyre!("Fetch timeout must be positive"));
                }
                self.refresh.fetch_timeout_secs = secs;
            }
            ["views", "cooldown_secs"] => {
                self.views.cooldown_secs = parse_u64(value)?;
            }
            ["providers", id, "snapshot_dir"] => match self.provider_mut(id) {
                Ok(provider) => provider.snapshot_dir = value.to_string(),
                Err(_) => self.providers.push(ProviderConfig {
                    id: id.to_string(),
                    snapshot_dir: value.to_string(),
                    id_stability: IdStability::default(),
                    refresh_exempt: false,
                }),
            },
            ["providers", id, "id_stability"] => {
                let stability = parse_stability(value)?;
                self.provider_mut(id)?.id_stability = stability;
            }
            ["providers", id, "refresh_exempt"] => {
                let exempt = parse_bool(value)?;
                self.provider_mut(id)?.refresh_exempt = exempt;
            }
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["storage", "path"] => self.storage.path.clone(),
            ["refresh", "expiry_hours"] => self.refresh.expiry_hours.to_string(),
            ["refresh", "fetch_timeout_secs"] => self.refresh.fetch_timeout_secs.to_string(),
            ["views", "cooldown_secs"] => self.views.cooldown_secs.to_string(),
            ["providers", id, "snapshot_dir"] => self.provider(id)?.snapshot_dir.clone(),
            ["providers", id, "id_stability"] => {
                stability_str(self.provider(id)?.id_stability).to_string()
            }
            ["providers", id, "refresh_exempt"] => self.provider(id)?.refresh_exempt.to_string(),
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        let providers = if self.providers.is_empty() {
            "└─ (none configured)".to_string()
        } else {
            self.providers
                .iter()
                .map(|p| {
                    format!(
                        "├─ {}: {} ({}{})",
                        p.id,
                        p.snapshot_dir,
                        stability_str(p.id_stability),
                        if p.refresh_exempt { ", exempt" } else { "" }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Configuration:\n\
             Storage:\n\
             └─ path: {}\n\
             Refresh:\n\
             ├─ expiry_hours: {}\n\
             └─ fetch_timeout_secs: {}\n\
             Views:\n\
             └─ cooldown_secs: {}\n\
             Providers:\n\
             {}",
            self.storage.path,
            self.refresh.expiry_hours,
            self.refresh.fetch_timeout_secs,
            self.views.cooldown_secs,
            providers
        )
    }

    pub async fn reset(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save(path).await?;
        Ok(config)
    }
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "novella", "novella") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        PathBuf::from(".novella").join("config")
    }
}

/// Get the default data directory
pub fn get_default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "novella", "novella") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".novella").join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.refresh.expiry_hours, 24);
        assert_eq!(config.views.cooldown_secs, 300);
        assert!(path.exists());

        assert_eq!(Config::load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"providers":[{"id":"syosetu","snapshot_dir":"/tmp/s","id_stability":"unstable"}]}"#,
        )
        .await
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.refresh.fetch_timeout_secs, 30);
        assert_eq!(config.providers[0].id_stability, IdStability::Unstable);
        assert!(!config.providers[0].refresh_exempt);
    }

    #[test]
    fn test_set_and_get_values() {
        let mut config = Config::default();

        config.set_value("refresh.expiry_hours", "6").unwrap();
        assert_eq!(config.get_value("refresh.expiry_hours").unwrap(), "6");
        assert_eq!(config.refresh.expiry(), Duration::from_secs(6 * 3600));

        config
            .set_value("providers.kakuyomu.snapshot_dir", "/data/kakuyomu")
            .unwrap();
        config
            .set_value("providers.kakuyomu.refresh_exempt", "true")
            .unwrap();
        assert_eq!(config.providers.len(), 1);
        assert!(config.providers[0].capabilities().refresh_exempt);
        assert_eq!(
            config.get_value("providers.kakuyomu.id_stability").unwrap(),
            "stable"
        );

        assert!(config.set_value("refresh.expiry_hours", "soon").is_err());
        assert!(config.set_value("refresh.fetch_timeout_secs", "0").is_err());
        assert!(config.set_value("providers.other.refresh_exempt", "true").is_err());
        assert!(config.get_value("export.format").is_err());
    }
}
