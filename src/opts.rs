//! Session engine options.

use url::form_urlencoded;

use crate::error::Error;

/// Options shared by every connection of a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Server identification sent in the HELLO response.
    ///
    /// Default: `"zero-bolt/<crate version>"`
    pub server_agent: String,

    /// Prefix of the connection ids sent in the HELLO response.
    ///
    /// Default: `"bolt-"`
    pub connection_id_prefix: String,

    /// Number of decoded messages a worker buffers before `send` blocks.
    ///
    /// Default: `64`
    pub worker_queue_capacity: usize,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            server_agent: format!("zero-bolt/{}", env!("CARGO_PKG_VERSION")),
            connection_id_prefix: "bolt-".to_string(),
            worker_queue_capacity: 64,
        }
    }
}

impl Opts {
    /// Get the worker queue capacity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUsage` if the capacity is zero.
    pub fn queue_capacity(&self) -> Result<usize, Error> {
        match self.worker_queue_capacity {
            0 => Err(Error::InvalidUsage(
                "worker_queue_capacity must be positive".into(),
            )),
            n => Ok(n),
        }
    }
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    /// Parse options from a query string.
    ///
    /// Format: `key1=value1&key2=value2`, percent-encoded.
    ///
    /// Supported keys:
    /// - `server_agent`: server identification
    /// - `connection_id_prefix`: prefix of connection ids
    /// - `worker_queue_capacity`: messages buffered per worker (positive integer)
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut opts = Opts::default();

        for (key, value) in form_urlencoded::parse(s.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "server_agent" => {
                    opts.server_agent = value.to_string();
                }
                "connection_id_prefix" => {
                    opts.connection_id_prefix = value.to_string();
                }
                "worker_queue_capacity" => {
                    opts.worker_queue_capacity = match value.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => {
                            return Err(Error::InvalidUsage(format!(
                                "Invalid worker_queue_capacity: {}",
                                value
                            )));
                        }
                    };
                }
                _ => {
                    return Err(Error::InvalidUsage(format!("Unknown option: {}", key)));
                }
            }
        }

        Ok(opts)
    }
}
