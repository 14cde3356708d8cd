//! Always-succeeding collaborator for demo mode

use async_trait::async_trait;
use tracing::info;

use super::ServiceAction;

/// Stand-in for a collaborator that is not wired up on this host.
pub struct DemoService {
    name: String,
}

impl DemoService {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl ServiceAction for DemoService {
    async fn start(&self) -> anyhow::Result<()> {
        info!("{} started (demo)", self.name);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        info!("{} stopped (demo)", self.name);
        Ok(())
    }
}
