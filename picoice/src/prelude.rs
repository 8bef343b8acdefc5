//! Prelude (helpful reexports) for this package

pub use crate::{
    client::RegisterClient,
    core::{
        run_bringup,
        RegisterAddress,
        RegisterValue,
        Variant,
        PICO_ICE_BRINGUP,
    },
    error::ProtocolError,
    transport::{
        serial::{
            Serial,
            SerialConfig,
        },
        Transport,
    },
};
