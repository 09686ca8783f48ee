//! The network a task container joins.

use std::fmt;

/// Network mode argument handed to the daemon for every non-host task.
pub const BRIDGE_MODE: &str = "bridge";
/// Network mode argument for tasks sharing the network namespace of the host.
pub const HOST_MODE: &str = "host";

/// Describes which network a [Task](crate::Task) container is attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetMode {
    /// Share the network namespace of the host.
    Host,
    /// Join the user-defined network with the given name.
    Network(String),
}

impl NetMode {
    /// The network mode passed to the daemon when creating the container.
    ///
    /// A named network still yields `bridge` here; the container is attached to the named
    /// network afterwards, when it has a static address configured.
    pub fn runtime_mode(&self) -> &'static str {
        match self {
            NetMode::Host => HOST_MODE,
            NetMode::Network(_) => BRIDGE_MODE,
        }
    }

    /// Name of the user-defined network, if any.
    pub fn network_name(&self) -> Option<&str> {
        match self {
            NetMode::Host => None,
            NetMode::Network(name) => Some(name),
        }
    }
}

impl From<&str> for NetMode {
    fn from(mode: &str) -> NetMode {
        if mode == HOST_MODE {
            NetMode::Host
        } else {
            NetMode::Network(mode.to_string())
        }
    }
}

impl From<String> for NetMode {
    fn from(mode: String) -> NetMode {
        NetMode::from(mode.as_str())
    }
}

impl fmt::Display for NetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetMode::Host => f.write_str(HOST_MODE),
            NetMode::Network(name) => f.write_str(name),
        }
    }
}
