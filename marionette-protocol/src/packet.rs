//! Packet encoding and decoding.
//!
//! Packet format:
//! - HEADER (1 byte): 0xAA synchronization byte
//! - ADDRESS (1 byte): destination node
//! - COMMAND (1 byte): command identifier
//! - EYE ID (1 byte): animation index for the eye channel, 0 if unused
//! - MOUTH ID (1 byte): animation index for the mouth channel, 0 if unused
//! - CHECKSUM (1 byte): wrapping sum of ADDRESS, COMMAND, EYE ID and MOUTH ID

/// Packet synchronization byte
pub const HEADER: u8 = 0xAA;

/// Size of every packet on the wire
pub const PACKET_LEN: usize = 6;

/// A packet as it appears on the wire
pub type RawPacket = [u8; PACKET_LEN];

/// Errors that can occur while decoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// First byte was not the header byte
    InvalidHeader(u8),
    /// Checksum mismatch
    InvalidChecksum {
        /// Checksum computed over the received payload
        expected: u8,
        /// Checksum byte that was received
        received: u8,
    },
    /// Command byte outside the known command range
    UnknownCommand(u8),
}

/// Bus node addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    /// The choreography controller
    Dispatch,
    Worker0,
    Worker1,
    Worker2,
    Worker3,
}

// Wire format values
const ADDR_DISPATCH: u8 = 0x00;
const ADDR_WORKER_0: u8 = 0x01;
const ADDR_WORKER_1: u8 = 0x02;
const ADDR_WORKER_2: u8 = 0x03;
const ADDR_WORKER_3: u8 = 0x04;

impl Address {
    /// Every address, in wire order
    pub const ALL: [Address; 5] = [
        Address::Dispatch,
        Address::Worker0,
        Address::Worker1,
        Address::Worker2,
        Address::Worker3,
    ];

    /// Worker addresses, in wire order
    pub const WORKERS: [Address; 4] = [
        Address::Worker0,
        Address::Worker1,
        Address::Worker2,
        Address::Worker3,
    ];

    /// Parse an address from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ADDR_DISPATCH => Some(Address::Dispatch),
            ADDR_WORKER_0 => Some(Address::Worker0),
            ADDR_WORKER_1 => Some(Address::Worker1),
            ADDR_WORKER_2 => Some(Address::Worker2),
            ADDR_WORKER_3 => Some(Address::Worker3),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Address::Dispatch => ADDR_DISPATCH,
            Address::Worker0 => ADDR_WORKER_0,
            Address::Worker1 => ADDR_WORKER_1,
            Address::Worker2 => ADDR_WORKER_2,
            Address::Worker3 => ADDR_WORKER_3,
        }
    }

    /// Parse an address from its configuration name (`dispatch`, `worker-0`..`worker-3`)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|addr| addr.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Configuration name of this address
    pub fn name(self) -> &'static str {
        match self {
            Address::Dispatch => "dispatch",
            Address::Worker0 => "worker-0",
            Address::Worker1 => "worker-1",
            Address::Worker2 => "worker-2",
            Address::Worker3 => "worker-3",
        }
    }

    /// Returns true for the four worker addresses
    pub fn is_worker(self) -> bool {
        !matches!(self, Address::Dispatch)
    }
}

/// Commands carried in the COMMAND byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    NoOp,
    /// Drive the status LED high
    LedOn,
    /// Drive the status LED low
    LedOff,
    /// Queue new eye/mouth animations
    DisplayAnim,
}

const CMD_NOOP: u8 = 0x00;
const CMD_LED_ON: u8 = 0x01;
const CMD_LED_OFF: u8 = 0x02;
const CMD_DISPLAY_ANIM: u8 = 0x03;

impl Command {
    /// Parse a command from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_NOOP => Some(Command::NoOp),
            CMD_LED_ON => Some(Command::LedOn),
            CMD_LED_OFF => Some(Command::LedOff),
            CMD_DISPLAY_ANIM => Some(Command::DisplayAnim),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::NoOp => CMD_NOOP,
            Command::LedOn => CMD_LED_ON,
            Command::LedOff => CMD_LED_OFF,
            Command::DisplayAnim => CMD_DISPLAY_ANIM,
        }
    }
}

/// Wrapping 8-bit sum over a payload
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}

/// A decoded packet
///
/// Address and command are kept as raw bytes; range validation belongs to
/// the consumer (see [`Packet::address`] and [`Packet::command`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    pub address: u8,
    pub command: u8,
    pub eye_anim_id: u8,
    pub mouth_anim_id: u8,
}

impl Packet {
    /// Create a packet from validated fields
    pub fn new(address: Address, command: Command, eye_anim_id: u8, mouth_anim_id: u8) -> Self {
        Self {
            address: address.to_byte(),
            command: command.to_byte(),
            eye_anim_id,
            mouth_anim_id,
        }
    }

    /// `DisplayAnim` packet for the given worker
    pub fn display(address: Address, eye_anim_id: u8, mouth_anim_id: u8) -> Self {
        Self::new(address, Command::DisplayAnim, eye_anim_id, mouth_anim_id)
    }

    fn payload(&self) -> [u8; 4] {
        [
            self.address,
            self.command,
            self.eye_anim_id,
            self.mouth_anim_id,
        ]
    }

    /// Checksum this packet carries on the wire
    pub fn checksum(&self) -> u8 {
        checksum(&self.payload())
    }

    /// Destination address, if it is a known one
    pub fn address(&self) -> Option<Address> {
        Address::from_byte(self.address)
    }

    /// Command, if it is a known one
    pub fn command(&self) -> Option<Command> {
        Command::from_byte(self.command)
    }

    /// Encode this packet for the wire
    pub fn encode(&self) -> RawPacket {
        let [address, command, eye, mouth] = self.payload();
        [HEADER, address, command, eye, mouth, self.checksum()]
    }

    /// Decode a packet from the wire
    pub fn decode(raw: &RawPacket) -> Result<Self, PacketError> {
        let [header, address, command, eye_anim_id, mouth_anim_id, received] = *raw;
        if header != HEADER {
            return Err(PacketError::InvalidHeader(header));
        }

        let packet = Self {
            address,
            command,
            eye_anim_id,
            mouth_anim_id,
        };

        let expected = packet.checksum();
        if expected != received {
            return Err(PacketError::InvalidChecksum { expected, received });
        }

        Ok(packet)
    }
}

/// Encode a packet from its fields
pub fn encode(address: Address, command: Command, eye_anim_id: u8, mouth_anim_id: u8) -> RawPacket {
    Packet::new(address, command, eye_anim_id, mouth_anim_id).encode()
}

/// Decode a packet from the wire
pub fn decode(raw: &RawPacket) -> Result<Packet, PacketError> {
    Packet::decode(raw)
}
