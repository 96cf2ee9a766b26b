//! Commands carried to workers
//!
//! A worker only reacts to packets carrying its own address; everything
//! else on the bus is decoded (for checksum bookkeeping) and ignored.

use crate::packet::{Address, Command, Packet, PacketError};

/// Commands parsed from packets addressed to a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkerCommand {
    NoOp,
    /// Turn the status LED on
    LedOn,
    /// Turn the status LED off
    LedOff,
    /// Queue an animation per channel (registry indices)
    DisplayAnim { eye: u8, mouth: u8 },
}

impl WorkerCommand {
    /// Parse a command from a packet
    pub fn from_packet(packet: &Packet) -> Result<Self, PacketError> {
        match packet.command() {
            Some(Command::NoOp) => Ok(WorkerCommand::NoOp),
            Some(Command::LedOn) => Ok(WorkerCommand::LedOn),
            Some(Command::LedOff) => Ok(WorkerCommand::LedOff),
            Some(Command::DisplayAnim) => Ok(WorkerCommand::DisplayAnim {
                eye: packet.eye_anim_id,
                mouth: packet.mouth_anim_id,
            }),
            None => Err(PacketError::UnknownCommand(packet.command)),
        }
    }

    /// Parse a command if the packet is addressed to `me`
    ///
    /// Returns `Ok(None)` for packets meant for another node.
    pub fn for_address(packet: &Packet, me: Address) -> Result<Option<Self>, PacketError> {
        if packet.address != me.to_byte() {
            return Ok(None);
        }
        Self::from_packet(packet).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_anim() {
        let packet = Packet::display(Address::Worker0, 1, 2);
        let cmd = WorkerCommand::from_packet(&packet).unwrap();
        assert_eq!(cmd, WorkerCommand::DisplayAnim { eye: 1, mouth: 2 });
    }

    #[test]
    fn test_other_address_ignored() {
        let packet = Packet::display(Address::Worker1, 1, 2);
        assert_eq!(WorkerCommand::for_address(&packet, Address::Worker0), Ok(None));
        assert_eq!(
            WorkerCommand::for_address(&packet, Address::Worker1),
            Ok(Some(WorkerCommand::DisplayAnim { eye: 1, mouth: 2 }))
        );
    }

    #[test]
    fn test_unknown_command() {
        let packet = Packet {
            address: Address::Worker0.to_byte(),
            command: 0x09,
            eye_anim_id: 0,
            mouth_anim_id: 0,
        };
        assert_eq!(
            WorkerCommand::from_packet(&packet),
            Err(PacketError::UnknownCommand(0x09))
        );
        // Not our packet: no error, just ignored
        assert_eq!(WorkerCommand::for_address(&packet, Address::Worker2), Ok(None));
    }

    #[test]
    fn test_led_commands() {
        for (command, expected) in [
            (Command::LedOn, WorkerCommand::LedOn),
            (Command::LedOff, WorkerCommand::LedOff),
            (Command::NoOp, WorkerCommand::NoOp),
        ] {
            let packet = Packet::new(Address::Worker2, command, 0, 0);
            assert_eq!(WorkerCommand::from_packet(&packet), Ok(expected));
        }
    }
}
