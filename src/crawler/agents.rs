//! Rotating user agent strings

use crate::config::UserAgentConfig;
use rand::seq::IndexedRandom;

/// Pool of client identities, one picked at random per request
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    pub fn new(config: &UserAgentConfig) -> Self {
        Self {
            agents: config.pool.clone(),
        }
    }

    /// Picks a user agent, or `None` when the pool is empty
    pub fn pick(&self) -> Option<&str> {
        self.agents.choose(&mut rand::rng()).map(String::as_str)
    }
}
