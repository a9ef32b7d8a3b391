// ABOUTME: Configuration structures and TOML parsing for terminal, ssh config paths and command templates
// ABOUTME: Users pick the terminal that runs rendered commands and may override both ssh templates

use crate::ssh::scanner::{DEFAULT_MAX_INCLUDE_DEPTH, SYSTEM_CONFIG_PATH, USER_CONFIG_PATH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SSH_COMMAND_PLACEHOLDER: &str = "{ssh_command}";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub terminal: TerminalConfig,
    pub ssh: SshConfig,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TerminalConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SshConfig {
    /// Scanned in order; hosts are merged.
    pub config_paths: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ParsingConfig {
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
}

/// Overrides for the two command templates. Unset means built-in default.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TemplatesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_commandline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_remote_commandline: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UiConfig {
    /// Cap on returned matches. Unset returns every match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            terminal: TerminalConfig {
                program: "x-terminal-emulator".to_string(),
                args: vec![
                    "-e".to_string(),
                    "sh".to_string(),
                    "-c".to_string(),
                    SSH_COMMAND_PLACEHOLDER.to_string(),
                ],
            },
            ssh: SshConfig {
                config_paths: vec![SYSTEM_CONFIG_PATH.to_string(), USER_CONFIG_PATH.to_string()],
            },
            parsing: ParsingConfig::default(),
            templates: TemplatesConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# sshq SSH Launcher Configuration

[terminal]
# Terminal program that runs the rendered ssh command line.
# {ssh_command} is replaced by the full command, passed as a single argument.
program = "x-terminal-emulator"
args = ["-e", "sh", "-c", "{ssh_command}"]

# Alacritty:
# program = "alacritty"
# args = ["-e", "sh", "-c", "{ssh_command}"]

# Kitty:
# program = "kitty"
# args = ["sh", "-c", "{ssh_command}"]

[ssh]
# SSH client config files scanned for Host aliases, in order
config_paths = ["/etc/ssh/ssh_config", "~/.ssh/config"]

[parsing]
# Maximum nesting of Include directives
max_include_depth = 16

[templates]
# Local command line. %1 = [user@]host, %2 = remote command
# ssh_commandline = "ssh -t %1 %2 || exec $SHELL"
# Remote command. %1 = script typed after the host, or "true"
# ssh_remote_commandline = "'$SHELL -i -c \"%1 ; exec $SHELL\" || true'"

[ui]
# Cap on returned matches; every match is returned when unset
# max_results = 20
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// Load `path`, falling back to defaults when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("sshq").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.terminal.program.is_empty() {
            anyhow::bail!("Terminal program cannot be empty");
        }

        let has_placeholder = self
            .terminal
            .args
            .iter()
            .any(|arg| arg.contains(SSH_COMMAND_PLACEHOLDER));
        if !has_placeholder && !self.terminal.args.is_empty() {
            anyhow::bail!("Terminal args must contain {{ssh_command}} placeholder");
        }

        if self.ssh.config_paths.is_empty() {
            anyhow::bail!("At least one ssh config path must be set");
        }

        if self.ui.max_results == Some(0) {
            anyhow::bail!("max_results must be greater than 0");
        }

        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        write_creating_parent(path, &content)
    }

    pub fn save_default_config(path: &Path) -> Result<()> {
        write_creating_parent(path, Self::default_config_content())
    }
}

fn write_creating_parent(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write configuration to: {}", path.display()))
}
