// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`RemoteClient`] over a blocking Redis or Valkey connection.

use std::time::Duration;

use parking_lot::Mutex;
use redis::{Connection, RedisError, RedisResult};
use strata_tier::{Error, Result};

use crate::client::{RemoteClient, SetCondition};

/// A client for Redis-compatible servers.
///
/// The connection is established lazily on first use or eagerly through
/// [`RemoteClient::connect`], and shared by all callers behind a mutex.
/// Batch reads and deletes are pipelined into a single round trip.
///
/// # Examples
///
/// ```no_run
/// use strata_remote::{RedisClient, RemoteBackend, RemoteClient, RemoteOptions};
///
/// let options = RemoteOptions::new("redis://127.0.0.1:6379").with_manage_types(true);
/// let client = RedisClient::open(options.url())?;
/// client.connect()?;
/// let backend = RemoteBackend::new(client, options);
/// # Ok::<(), strata_tier::Error>(())
/// ```
pub struct RedisClient {
    client: redis::Client,
    connection: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("addr", &self.client.get_connection_info().addr)
            .field("connected", &self.connection.lock().is_some())
            .finish()
    }
}

impl RedisClient {
    /// Creates a client for the server at `url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](strata_tier::ErrorKind::InvalidConfiguration)
    /// when `url` is not a valid connection string.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(Error::invalid_configuration)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    fn run<T>(&self, operation: &'static str, key: &str, f: impl FnOnce(&mut Connection) -> RedisResult<T>) -> Result<T> {
        let mut guard = self.connection.lock();
        if guard.is_none() {
            let connection = self
                .client
                .get_connection()
                .map_err(|e| Error::backend("connect", key, e))?;
            tracing::debug!(server = ?self.client.get_connection_info().addr, "connected to remote cache");
            *guard = Some(connection);
        }
        let connection = guard
            .as_mut()
            .ok_or_else(|| Error::backend(operation, key, "connection unavailable"))?;

        f(connection).map_err(|e| {
            if e.is_io_error() || e.is_connection_dropped() {
                tracing::debug!(error = %e, "dropping remote cache connection");
                *guard = None;
            }
            translate(operation, key, e)
        })
    }
}

fn translate(operation: &'static str, key: &str, error: RedisError) -> Error {
    let message = error.to_string();
    if message.contains("not an integer") || message.contains("overflow") {
        Error::conversion(error).with_key(key)
    } else {
        Error::backend(operation, key, error)
    }
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl RemoteClient for RedisClient {
    fn connect(&self) -> Result<()> {
        self.run("connect", "", |connection| redis::cmd("PING").query::<String>(connection).map(|_| ()))
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.run("get", key, |connection| redis::cmd("GET").arg(key).query(connection))
    }

    fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let Some(first) = keys.first() else {
            return Ok(Vec::new());
        };
        self.run("get_many", first, |connection| {
            let mut pipe = redis::pipe();
            for key in keys {
                pipe.cmd("GET").arg(key);
            }
            pipe.query(connection)
        })
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>, condition: SetCondition) -> Result<bool> {
        self.run("set", key, |connection| {
            let mut cmd = redis::cmd("SET");
            cmd.arg(key).arg(value);
            match condition {
                SetCondition::Always => {}
                SetCondition::IfAbsent => {
                    cmd.arg("NX");
                }
                SetCondition::IfPresent => {
                    cmd.arg("XX");
                }
            }
            if let Some(ttl) = ttl {
                cmd.arg("PX").arg(millis(ttl));
            }
            cmd.query::<Option<String>>(connection).map(|reply| reply.is_some())
        })
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.run("exists", key, |connection| {
            redis::cmd("EXISTS").arg(key).query::<i64>(connection).map(|count| count > 0)
        })
    }

    fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<bool> {
        let Some(ttl) = ttl else {
            return self.run("expire", key, |connection| {
                redis::pipe()
                    .atomic()
                    .cmd("PERSIST")
                    .arg(key)
                    .ignore()
                    .cmd("EXISTS")
                    .arg(key)
                    .query::<(i64,)>(connection)
                    .map(|(count,)| count > 0)
            });
        };
        self.run("expire", key, |connection| {
            redis::cmd("PEXPIRE")
                .arg(key)
                .arg(millis(ttl))
                .query::<i64>(connection)
                .map(|updated| updated == 1)
        })
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.run("delete", key, |connection| {
            redis::cmd("DEL").arg(key).query::<i64>(connection).map(|count| count > 0)
        })
    }

    fn delete_many(&self, keys: &[String]) -> Result<Vec<bool>> {
        let Some(first) = keys.first() else {
            return Ok(Vec::new());
        };
        self.run("delete_many", first, |connection| {
            let mut pipe = redis::pipe();
            for key in keys {
                pipe.cmd("DEL").arg(key);
            }
            pipe.query::<Vec<i64>>(connection)
                .map(|counts| counts.into_iter().map(|count| count > 0).collect())
        })
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        self.run("incr_by", key, |connection| redis::cmd("INCRBY").arg(key).arg(delta).query(connection))
    }

    fn close(&self) -> Result<()> {
        if self.connection.lock().take().is_some() {
            tracing::debug!("closed remote cache connection");
        }
        Ok(())
    }
}
