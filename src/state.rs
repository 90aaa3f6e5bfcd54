use std::sync::Arc;

use crate::config::Config;
use crate::provider::GroqClient;
use crate::relay::ConversationRelay;
use crate::scratch::DiskScratch;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ConversationRelay>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let provider = GroqClient::new(&config.provider_config)?;
        let relay = ConversationRelay::new(Arc::new(provider), Arc::new(DiskScratch));

        Ok(Self {
            relay: Arc::new(relay),
        })
    }
}
