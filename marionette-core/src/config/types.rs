//! Configuration type definitions
//!
//! These types describe one node of the prop. Values are fixed at build time
//! (see the firmware build script) and validated here so the build script
//! and the firmware agree on what a valid node looks like.

use marionette_protocol::Address;

/// Highest supported playback rate
pub const MAX_TICK_HZ: u32 = 240;

/// Role a node plays on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Issues choreography to all workers
    Dispatcher,
    /// Drives the eye and mouth LED strings
    #[default]
    Worker,
}

impl Role {
    /// Parse a role name (`dispatcher` or `worker`, case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("dispatcher") {
            Some(Role::Dispatcher)
        } else if name.eq_ignore_ascii_case("worker") {
            Some(Role::Worker)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Dispatcher => "dispatcher",
            Role::Worker => "worker",
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Role name not recognised
    UnknownRole,
    /// Address name not recognised
    UnknownAddress,
    /// Worker role with the dispatch address, or the reverse
    RoleAddressMismatch { role: Role, address: Address },
    /// Baud rate of zero
    InvalidBaud,
    /// Playback rate is zero or above `MAX_TICK_HZ`
    InvalidTickRate(u32),
    /// Delay range with `min > max` or `min == 0`
    InvalidRange { min: u32, max: u32 },
}

/// Identity of this node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    pub role: Role,
    pub address: Address,
}

impl NodeConfig {
    /// Build a node identity from role and address names
    pub fn from_names(role: &str, address: &str) -> Result<Self, ConfigError> {
        let config = Self {
            role: Role::from_name(role).ok_or(ConfigError::UnknownRole)?,
            address: Address::from_name(address).ok_or(ConfigError::UnknownAddress)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Workers need a worker address; the dispatcher owns the dispatch address
    pub fn validate(&self) -> Result<(), ConfigError> {
        let consistent = match self.role {
            Role::Dispatcher => self.address == Address::Dispatch,
            Role::Worker => self.address.is_worker(),
        };
        if consistent {
            Ok(())
        } else {
            Err(ConfigError::RoleAddressMismatch {
                role: self.role,
                address: self.address,
            })
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Worker,
            address: Address::Worker0,
        }
    }
}

/// Serial bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub baud: u32,
    /// Idle time after each written packet
    pub packet_gap_ms: u32,
    /// Age at which a partial packet is dropped (0 disables)
    pub rx_timeout_ms: u32,
}

impl BusConfig {
    pub const fn new() -> Self {
        Self {
            baud: 38_400,
            packet_gap_ms: 5,
            rx_timeout_ms: 50,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud == 0 {
            return Err(ConfigError::InvalidBaud);
        }
        Ok(())
    }

    /// Receiver timeout, `None` when disabled
    pub fn rx_timeout(&self) -> Option<u32> {
        (self.rx_timeout_ms > 0).then_some(self.rx_timeout_ms)
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker playback settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackConfig {
    /// Frame rate of both channels
    pub tick_hz: u32,
    /// Blink on a local timer instead of waiting for the dispatcher
    pub autonomous_blink: bool,
    pub blink_min_ms: u32,
    pub blink_max_ms: u32,
}

impl PlaybackConfig {
    pub const fn new() -> Self {
        Self {
            tick_hz: 47,
            autonomous_blink: false,
            blink_min_ms: 5000,
            blink_max_ms: 7000,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz == 0 || self.tick_hz > MAX_TICK_HZ {
            return Err(ConfigError::InvalidTickRate(self.tick_hz));
        }
        validate_range(self.blink_min_ms, self.blink_max_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatcher pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChoreographyConfig {
    /// Shortest rest between blinks
    pub min_delay_ms: u32,
    /// Longest rest between blinks
    pub max_delay_ms: u32,
}

impl ChoreographyConfig {
    pub const fn new() -> Self {
        Self {
            min_delay_ms: 2000,
            max_delay_ms: 6000,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_range(self.min_delay_ms, self.max_delay_ms)
    }
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_range(min: u32, max: u32) -> Result<(), ConfigError> {
    if min == 0 || min > max {
        return Err(ConfigError::InvalidRange { min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(Role::from_name("Dispatcher"), Some(Role::Dispatcher));
        assert_eq!(Role::from_name(" worker "), Some(Role::Worker));
        assert_eq!(Role::from_name("leader"), None);
        assert_eq!(Role::Worker.name(), "worker");
    }

    #[test]
    fn test_node_from_names() {
        let node = NodeConfig::from_names("worker", "worker-2").unwrap();
        assert_eq!(node.address, Address::Worker2);

        let node = NodeConfig::from_names("dispatcher", "dispatch").unwrap();
        assert_eq!(node.role, Role::Dispatcher);

        assert_eq!(
            NodeConfig::from_names("worker", "worker-9"),
            Err(ConfigError::UnknownAddress)
        );
        assert_eq!(
            NodeConfig::from_names("boss", "dispatch"),
            Err(ConfigError::UnknownRole)
        );
    }

    #[test]
    fn test_role_address_mismatch() {
        assert_eq!(
            NodeConfig::from_names("worker", "dispatch"),
            Err(ConfigError::RoleAddressMismatch {
                role: Role::Worker,
                address: Address::Dispatch
            })
        );
        assert!(NodeConfig::from_names("dispatcher", "worker-0").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(NodeConfig::default().validate().is_ok());
        assert!(BusConfig::default().validate().is_ok());
        assert!(PlaybackConfig::default().validate().is_ok());
        assert!(ChoreographyConfig::default().validate().is_ok());
        assert_eq!(BusConfig::default().rx_timeout(), Some(50));
    }

    #[test]
    fn test_rejects_bad_values() {
        let playback = PlaybackConfig {
            tick_hz: 0,
            ..PlaybackConfig::default()
        };
        assert_eq!(playback.validate(), Err(ConfigError::InvalidTickRate(0)));

        let choreo = ChoreographyConfig {
            min_delay_ms: 7000,
            max_delay_ms: 6000,
        };
        assert_eq!(
            choreo.validate(),
            Err(ConfigError::InvalidRange {
                min: 7000,
                max: 6000
            })
        );

        let bus = BusConfig {
            rx_timeout_ms: 0,
            ..BusConfig::default()
        };
        assert_eq!(bus.rx_timeout(), None);
    }
}
