//! Scoped connection acquisition.
//!
//! A [`ConnectionProvider`] hands out one connection per call to
//! [`acquire`](ConnectionProvider::acquire). The returned value owns the
//! connection: dropping it closes the connection or returns it to its pool,
//! whichever way the surrounding code exits.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_postgres::NoTls;

use crate::client::GenericClient;
use crate::config::ConnectionConfig;
use crate::error::{OrmError, OrmResult};

/// Source of database connections for model operations.
pub trait ConnectionProvider: Send + Sync {
    type Connection: GenericClient;

    /// Acquire a connection, released when the returned value drops.
    fn acquire(&self) -> impl std::future::Future<Output = OrmResult<Self::Connection>> + Send;
}

impl<P: ConnectionProvider> ConnectionProvider for &P {
    type Connection = P::Connection;

    fn acquire(&self) -> impl std::future::Future<Output = OrmResult<Self::Connection>> + Send {
        (**self).acquire()
    }
}

impl<P: ConnectionProvider> ConnectionProvider for Arc<P> {
    type Connection = P::Connection;

    fn acquire(&self) -> impl std::future::Future<Output = OrmResult<Self::Connection>> + Send {
        (**self).acquire()
    }
}

/// Opens single connections with `tokio_postgres::connect`.
///
/// Without `keep_alive` every acquisition opens a new connection that closes
/// once the last handle to it drops. With `keep_alive` one connection is
/// shared and reopened only after it closes.
pub struct ConnectionManager {
    config: ConnectionConfig,
    cached: Mutex<Option<Arc<tokio_postgres::Client>>>,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            cached: Mutex::new(None),
        }
    }

    pub fn from_url(database_url: impl Into<String>) -> Self {
        Self::new(ConnectionConfig::new(database_url))
    }

    /// Settings read from the environment, see [`ConnectionConfig::from_env`].
    pub fn from_env() -> Self {
        Self::new(ConnectionConfig::from_env())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Drop the shared connection, if one is cached. Handles already
    /// acquired stay usable until they drop.
    pub async fn close(&self) {
        if self.cached.lock().await.take().is_some() {
            tracing::trace!(target: "pgmodel.connection", "released shared connection");
        }
    }

    async fn connect(&self) -> OrmResult<tokio_postgres::Client> {
        let pg_config = self.config.pg_config()?;
        let (client, connection) = pg_config
            .connect(NoTls)
            .await
            .map_err(|e| OrmError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(target: "pgmodel.connection", error = %e, "connection error");
            }
        });
        tracing::trace!(target: "pgmodel.connection", keep_alive = self.config.keep_alive, "opened connection");
        Ok(client)
    }
}

impl ConnectionProvider for ConnectionManager {
    type Connection = Arc<tokio_postgres::Client>;

    async fn acquire(&self) -> OrmResult<Self::Connection> {
        if !self.config.keep_alive {
            return Ok(Arc::new(self.connect().await?));
        }

        let mut cached = self.cached.lock().await;
        if let Some(client) = cached.as_ref().filter(|c| !c.is_closed()) {
            tracing::trace!(target: "pgmodel.connection", "reusing shared connection");
            return Ok(Arc::clone(client));
        }
        let client = Arc::new(self.connect().await?);
        *cached = Some(Arc::clone(&client));
        Ok(client)
    }
}

#[cfg(feature = "pool")]
pub use pooled::PoolManager;

#[cfg(feature = "pool")]
mod pooled {
    use std::sync::OnceLock;

    use deadpool_postgres::{Client, Pool};

    use super::ConnectionProvider;
    use crate::config::ConnectionConfig;
    use crate::error::OrmResult;
    use crate::pool::create_pool_with_config;

    /// Hands out pooled connections. The pool is built on first use.
    pub struct PoolManager {
        config: ConnectionConfig,
        pool: OnceLock<Pool>,
    }

    impl PoolManager {
        pub fn new(config: ConnectionConfig) -> Self {
            Self {
                config,
                pool: OnceLock::new(),
            }
        }

        pub fn from_url(database_url: impl Into<String>) -> Self {
            Self::new(ConnectionConfig::new(database_url))
        }

        pub fn from_env() -> Self {
            Self::new(ConnectionConfig::from_env())
        }

        /// Wrap an existing pool.
        pub fn from_pool(pool: Pool) -> Self {
            let manager = Self::new(ConnectionConfig::default());
            let _ = manager.pool.set(pool);
            manager
        }

        pub fn config(&self) -> &ConnectionConfig {
            &self.config
        }

        /// The pool, built from the configuration if it does not exist yet.
        pub fn pool(&self) -> OrmResult<&Pool> {
            if let Some(pool) = self.pool.get() {
                return Ok(pool);
            }
            let pool = create_pool_with_config(&self.config)?;
            tracing::trace!(
                target: "pgmodel.connection",
                max_size = self.config.max_pool_size,
                "created pool"
            );
            Ok(self.pool.get_or_init(|| pool))
        }

        /// Close the pool if it was built. Later acquisitions fail.
        pub fn close(&self) {
            if let Some(pool) = self.pool.get() {
                pool.close();
            }
        }
    }

    impl ConnectionProvider for PoolManager {
        type Connection = Client;

        async fn acquire(&self) -> OrmResult<Client> {
            let pool = self.pool()?;
            let client = pool.get().await?;
            let status = pool.status();
            tracing::trace!(
                target: "pgmodel.connection",
                size = status.size,
                available = status.available,
                "acquired pooled connection"
            );
            Ok(client)
        }
    }

    impl ConnectionProvider for Pool {
        type Connection = Client;

        async fn acquire(&self) -> OrmResult<Client> {
            Ok(self.get().await?)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_pool_is_lazy_and_reused() {
            let manager = PoolManager::new(
                ConnectionConfig::new("postgres://u:p@localhost:5432/app").with_max_pool_size(2),
            );
            let first = manager.pool().unwrap() as *const Pool;
            let second = manager.pool().unwrap() as *const Pool;
            assert_eq!(first, second);
            assert_eq!(manager.pool().unwrap().status().max_size, 2);
        }

        #[test]
        fn test_bad_url_surfaces_on_first_use() {
            let manager = PoolManager::from_url("postgres://host:notaport/db");
            assert!(manager.pool().is_err());
        }
    }
}
