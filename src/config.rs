use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::cms::CmsSettings;
use crate::scene::SceneConfig;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Serves the folio blog and portfolio", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Run the HTTP service (default)
    #[default]
    Serve,
    /// Validate every content collection and exit
    Check,
    /// Print the CMS admin configuration as JSON
    Cms,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".folio")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct Site {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    #[serde(default = "default_public_folder")]
    pub public_folder: String,
}

fn default_port() -> u16 {
    4321
}

fn default_content_dir() -> String {
    "src/content".to_string()
}

fn default_public_folder() -> String {
    "public".to_string()
}

impl Site {
    pub fn get_port(&self) -> u16 {
        return self.port;
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub site: Site,
    #[serde(default)]
    pub cms: CmsSettings,
    #[serde(default)]
    pub scene: SceneConfig,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!(var = var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_yaml("site:\n  title: My site\n").unwrap();
        assert_eq!(cfg.site.get_port(), 4321);
        assert_eq!(cfg.site.content_dir, "src/content");
        assert_eq!(cfg.site.public_folder, "public");
        assert_eq!(cfg.cms.output_folder, "admin");
        assert_eq!(cfg.scene.canvas, ".zdog-canvas");
        assert_eq!(cfg.scene.star_count, 12);
        assert_eq!(cfg.scene.seed, None);
    }

    #[test]
    fn test_substitute_env_vars() {
        let yaml = "site:\n  title: ${FOLIO_TEST_UNSET_TITLE:-Fallback}\n  port: ${FOLIO_TEST_UNSET_PORT:-8080}\ncms:\n  token: \"${FOLIO_TEST_UNSET_TOKEN}\"\nscene:\n  seed: 9\n";
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.site.title, "Fallback");
        assert_eq!(cfg.site.get_port(), 8080);
        assert_eq!(cfg.cms.token.as_deref(), Some(""));
        assert_eq!(cfg.scene.seed, Some(9));
    }

    #[test]
    fn test_missing_site_section() {
        assert!(Config::from_yaml("scene:\n  star_count: 3\n").is_err());
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::parse_from(["folio", "-c", "/tmp/folio.yaml", "check"]);
        assert_eq!(cli.config_path.as_deref(), Some("/tmp/folio.yaml"));
        assert_eq!(cli.command, Some(Command::Check));

        let cli = Cli::parse_from(["folio"]);
        assert_eq!(cli.command.unwrap_or_default(), Command::Serve);
    }
}
