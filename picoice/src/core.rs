//! The core types and functions for configuring a pico-ice
use crate::{
    client::RegisterClient,
    error::ProtocolError,
    transport::Transport,
};
use tracing::info;

pub use picoice_wire::Variant;

/// The address of a device register. Which addresses mean something is up to the gateware.
pub type RegisterAddress = u8;

/// The contents of a register. Writes always carry 16 bits, reads carry 16 or 8 depending on the
/// [`Variant`].
pub type RegisterValue = u16;

/// One write in a bring-up sequence
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BringupStep {
    pub address: RegisterAddress,
    pub value: RegisterValue,
}

/// The writes the board needs after power-on, in order
pub const PICO_ICE_BRINGUP: [BringupStep; 4] = [
    BringupStep {
        address: 0x00,
        value: 0,
    },
    BringupStep {
        address: 0x02,
        value: 1,
    },
    BringupStep {
        address: 0x04,
        value: 0,
    },
    BringupStep {
        address: 0x06,
        value: 0b0000_0000_0011_1111,
    },
];

/// Apply `steps` in order, stopping at the first one that fails
/// # Errors
/// Returns the error of the first failed write
pub fn run_bringup<T>(
    client: &mut RegisterClient<T>,
    steps: &[BringupStep],
) -> Result<(), ProtocolError>
where
    T: Transport,
{
    for (idx, step) in steps.iter().enumerate() {
        info!(
            step = idx,
            address = step.address,
            value = step.value,
            "Bring-up write"
        );
        client.write_register(step.address, step.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{
        Fault,
        Mock,
    };

    #[test]
    fn test_bringup_frames() {
        let mut client = RegisterClient::new(Mock::new(Variant::Wide), Variant::Wide);
        run_bringup(&mut client, &PICO_ICE_BRINGUP).unwrap();
        let transport = client.into_inner();
        assert_eq!(
            transport.received().to_vec(),
            vec![
                vec![0xAAu8, 0x00, 0x00, 0x00],
                vec![0xAA, 0x02, 0x00, 0x01],
                vec![0xAA, 0x04, 0x00, 0x00],
                vec![0xAA, 0x06, 0x00, 0x3F],
            ]
        );
        assert_eq!(transport.register(0x06), Some(0x3F));
    }

    #[test]
    fn test_bringup_stops_on_failure() {
        let mut transport = Mock::new(Variant::Wide);
        transport.inject(Fault::Silent);
        transport.inject(Fault::Status(0x01));
        let mut client = RegisterClient::new(transport, Variant::Wide);
        assert!(matches!(
            run_bringup(&mut client, &PICO_ICE_BRINGUP),
            Err(ProtocolError::ShortResponse { .. })
        ));
        // Only the first write went out
        assert_eq!(client.into_inner().received().len(), 1);
    }
}
