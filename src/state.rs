use std::path::PathBuf;

use crate::config::ProviderConfig;
use crate::rate_limit::Throttle;

// app's shared state
pub struct AppState {
    pub client: reqwest::Client,
    pub throttle: Throttle,
    pub provider: ProviderConfig,
    pub template_path: PathBuf,
}
