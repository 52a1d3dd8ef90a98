#![forbid(unsafe_code)]

//! Reconciler configuration.
//!
//! | Field | Default | Env |
//! |-------|---------|-----|
//! | `animations_enabled` | `true` | `NAVKIT_ANIMATIONS` |
//! | `sync_on_did_show` | `true` | `NAVKIT_STACK_SYNC` |
//! | `resolve_lazy_on_did_show` | `true` | |
//!
//! Boolean variables accept `1`/`true`/`on`/`yes` and `0`/`false`/`off`/`no`,
//! case-insensitively. Anything else is ignored with a warning.

/// Environment variable toggling animated stack commands.
pub const ENV_ANIMATIONS: &str = "NAVKIT_ANIMATIONS";
/// Environment variable toggling stack-to-path synchronization.
pub const ENV_STACK_SYNC: &str = "NAVKIT_STACK_SYNC";

/// Behavior switches for a [`NavigationStack`](crate::NavigationStack).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    /// When false, every stack command is issued without animation.
    pub animations_enabled: bool,
    /// Truncate the path when the container pops screens on its own, for
    /// example after a back gesture.
    pub sync_on_did_show: bool,
    /// Resolve the unresolved element right above the top screen after
    /// each appearance.
    pub resolve_lazy_on_did_show: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            sync_on_did_show: true,
            resolve_lazy_on_did_show: true,
        }
    }
}

impl StackConfig {
    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(on) = lookup(ENV_ANIMATIONS).and_then(|v| parse_flag(ENV_ANIMATIONS, &v)) {
            config.animations_enabled = on;
        }
        if let Some(on) = lookup(ENV_STACK_SYNC).and_then(|v| parse_flag(ENV_STACK_SYNC, &v)) {
            config.sync_on_did_show = on;
        }
        config
    }

    /// Set [`animations_enabled`](Self::animations_enabled).
    #[must_use]
    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }

    /// Set [`sync_on_did_show`](Self::sync_on_did_show).
    #[must_use]
    pub fn with_sync_on_did_show(mut self, enabled: bool) -> Self {
        self.sync_on_did_show = enabled;
        self
    }

    /// Set [`resolve_lazy_on_did_show`](Self::resolve_lazy_on_did_show).
    #[must_use]
    pub fn with_resolve_lazy_on_did_show(mut self, enabled: bool) -> Self {
        self.resolve_lazy_on_did_show = enabled;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            tracing::warn!(key, value, "ignoring unrecognized boolean");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = StackConfig::default();
        assert!(config.animations_enabled);
        assert!(config.sync_on_did_show);
        assert!(config.resolve_lazy_on_did_show);
        assert_eq!(StackConfig::from_env_with(env(&[])), config);
    }

    #[test]
    fn env_overrides() {
        let config = StackConfig::from_env_with(env(&[
            (ENV_ANIMATIONS, "off"),
            (ENV_STACK_SYNC, " FALSE "),
        ]));
        assert!(!config.animations_enabled);
        assert!(!config.sync_on_did_show);
        assert!(config.resolve_lazy_on_did_show);
    }

    #[test]
    fn unrecognized_values_keep_defaults() {
        let config = StackConfig::from_env_with(env(&[(ENV_ANIMATIONS, "sometimes")]));
        assert!(config.animations_enabled);
    }

    #[test]
    fn builders() {
        let config = StackConfig::default()
            .with_animations(false)
            .with_sync_on_did_show(false)
            .with_resolve_lazy_on_did_show(false);
        assert!(!config.animations_enabled);
        assert!(!config.sync_on_did_show);
        assert!(!config.resolve_lazy_on_did_show);
    }
}
