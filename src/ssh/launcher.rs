// ABOUTME: Terminal launcher running rendered ssh command lines in the user-configured terminal program
// ABOUTME: Substitutes the command into the terminal args and spawns it; nothing here builds ssh commands

use crate::config::{SSH_COMMAND_PLACEHOLDER, TerminalConfig};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, error, info};

/// Something that can open an interactive terminal running a command line.
pub trait CommandRunner {
    fn run_terminal(&self, command: &str) -> Result<()>;
}

pub struct TerminalLauncher {
    config: TerminalConfig,
}

impl TerminalLauncher {
    pub fn new(config: TerminalConfig) -> Self {
        Self { config }
    }

    /// Terminal args with `{ssh_command}` replaced. The command travels as
    /// one argv entry, so it is not escaped. With no args at all the command
    /// is appended as the only argument.
    fn terminal_args(&self, command: &str) -> Vec<String> {
        if self.config.args.is_empty() {
            return vec![command.to_string()];
        }
        self.config
            .args
            .iter()
            .map(|arg| arg.replace(SSH_COMMAND_PLACEHOLDER, command))
            .collect()
    }

    fn resolve_program(&self) -> Result<PathBuf> {
        which::which(&self.config.program).with_context(|| {
            format!(
                "Terminal program not found: {}. Check [terminal] in your configuration",
                self.config.program
            )
        })
    }
}

impl CommandRunner for TerminalLauncher {
    fn run_terminal(&self, command: &str) -> Result<()> {
        let program = self.resolve_program()?;
        let args = self.terminal_args(command);

        debug!("Launching terminal: {} with args: {:?}", program.display(), args);

        match Command::new(&program).args(&args).spawn() {
            Ok(_) => {
                info!("Launched terminal running: {}", command);
                Ok(())
            }
            Err(e) => {
                error!("Failed to launch terminal '{}': {}", program.display(), e);
                Err(e).with_context(|| {
                    format!(
                        "Failed to launch terminal: {} with args: {:?}",
                        program.display(),
                        args
                    )
                })
            }
        }
    }
}
