use crate::device::UsageHint;

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix for keys generated when `create` is called without one.
    ///
    /// Generated keys are `<prefix><n>`; pick a prefix callers never use for
    /// their own keys to keep the two namespaces apart.
    pub auto_key_prefix: String,

    /// Usage hint passed to the device for every geometry buffer.
    pub buffer_usage: UsageHint,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            auto_key_prefix: "geometry_".to_string(),
            buffer_usage: UsageHint::Static,
        }
    }
}
