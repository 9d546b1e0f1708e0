//! Where a session reads its provider configuration from.

use surfer_ai::ProviderConfig;

/// Supplies the provider configuration, read fresh at the start of every call
/// so settings edits apply to the next request.
pub trait SettingsSource: Send + Sync {
    fn provider_config(&self) -> ProviderConfig;
}

impl SettingsSource for ProviderConfig {
    fn provider_config(&self) -> ProviderConfig {
        self.clone()
    }
}

impl SettingsSource for parking_lot::RwLock<ProviderConfig> {
    fn provider_config(&self) -> ProviderConfig {
        self.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_settings_see_updates() {
        let settings = parking_lot::RwLock::new(ProviderConfig::new("https://a.com/v1", "k", "m1"));
        assert_eq!(settings.provider_config().model_name, "m1");
        settings.write().model_name = "m2".into();
        assert_eq!(settings.provider_config().model_name, "m2");
    }
}
