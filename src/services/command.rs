// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Command-backed collaborator
//!
//! The camera and frying collectors run as external processes on the rig;
//! this collaborator drives them through configured shell commands.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use super::ServiceAction;
use crate::config::CommandConfig;

pub struct CommandService {
    name: String,
    start_command: String,
    stop_command: Option<String>,
}

impl CommandService {
    pub fn new(name: &str, cfg: &CommandConfig) -> Self {
        Self {
            name: name.to_string(),
            start_command: cfg.start.clone(),
            stop_command: cfg.stop.clone(),
        }
    }

    async fn run(&self, command: &str) -> Result<()> {
        info!("{}: running `{}`", self.name, command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .await
            .with_context(|| format!("failed to spawn `{}`", command))?;

        if !status.success() {
            bail!("`{}` exited with {}", command, status);
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceAction for CommandService {
    async fn start(&self) -> Result<()> {
        self.run(&self.start_command).await
    }

    async fn stop(&self) -> Result<()> {
        match &self.stop_command {
            Some(command) => self.run(command).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let service = CommandService::new(
            "camera",
            &CommandConfig {
                start: "true".into(),
                stop: Some("true".into()),
            },
        );
        service.start().await.unwrap();
        service.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_command_surfaces_exit_status() {
        let service = CommandService::new(
            "camera",
            &CommandConfig {
                start: "exit 3".into(),
                stop: None,
            },
        );
        let err = service.start().await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
        // Missing stop command is a successful no-op
        service.stop().await.unwrap();
    }
}
