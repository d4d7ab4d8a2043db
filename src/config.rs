use time::Duration;

/// Settings shared by the session manager and the record store.
///
/// ```
/// use studio_store::StoreConfig;
///
/// let config = StoreConfig::new()
///     .with_namespace("staging")
///     .with_session_ttl(time::Duration::hours(8));
/// assert_eq!(config.namespace(), "staging");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    namespace: String,
    session_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: "studio".to_string(),
            session_ttl: Duration::seconds(3600),
        }
    }
}

impl StoreConfig {
    /// Default settings: namespace `studio`, one-hour sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for every storage key. Two stores with different namespaces
    /// can share one persistence provider without seeing each other's data.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Lifetime of newly issued sessions.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Prefix of every storage key.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Lifetime of newly issued sessions.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}
