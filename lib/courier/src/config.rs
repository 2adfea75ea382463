//! Settings of the hyper transport.
//!
//! These only shape single network exchanges. How many attempts a request
//! gets and how long it waits between them are request options, see
//! [`RequestOptions`](crate::RequestOptions).

use std::time::Duration;

/// Budget of one exchange, from sending the request to the last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for opening a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle pooled connections kept per host.
pub const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;

/// How long an idle pooled connection is kept.
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Settings applied by [`HyperClient`](crate::HyperClient).
///
/// `timeout` is granted anew to every attempt: a request retried on `408`
/// three times may spend up to three timeouts plus the retry intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Exchange budget, per attempt.
    pub timeout: Duration,
    /// Connect budget, part of the exchange budget.
    pub connect_timeout: Duration,
    /// Idle pooled connections per host.
    pub pool_idle_per_host: usize,
    /// Lifetime of an idle pooled connection.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pool_idle_per_host: DEFAULT_POOL_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`], seeded with the defaults.
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Exchange budget, per attempt.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Connect budget.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Idle pooled connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config.pool_idle_per_host = count;
        self
    }

    /// Lifetime of an idle pooled connection.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Finish the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn defaults() {
        let config = TransportConfig::default();
        check!(config.timeout == Duration::from_secs(30));
        check!(config.connect_timeout == Duration::from_secs(10));
        check!(config.pool_idle_per_host == 32);
        check!(config.pool_idle_timeout == Duration::from_secs(90));
    }

    #[test]
    fn builder_changes_only_what_is_set() {
        let config = TransportConfig::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_per_host(4)
            .build();

        check!(
            config
                == TransportConfig {
                    timeout: Duration::from_secs(5),
                    pool_idle_per_host: 4,
                    ..TransportConfig::default()
                }
        );
    }
}
