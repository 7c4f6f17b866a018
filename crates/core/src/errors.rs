use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ConfigError;
use crate::reference::ReferenceTableError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("room size must be greater than zero (got {room_size} m²)")]
    InvalidRoomSize { room_size: Decimal },
    #[error("room size {room_size} m² exceeds the supported maximum of {max} m²")]
    RoomSizeTooLarge { room_size: Decimal, max: Decimal },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    ReferenceTables(#[from] ReferenceTableError),
    #[error("invalid input: {0}")]
    Input(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(
                DomainError::InvalidRoomSize { .. } | DomainError::RoomSizeTooLarge { .. },
            ) => "invalid_room_size",
            Self::Domain(DomainError::InvariantViolation(_)) => "pricing_invariant",
            Self::Configuration(_) => "config_validation",
            Self::ReferenceTables(_) => "reference_tables",
            Self::Input(_) => "invalid_input",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Input(_) => 3,
            Self::ReferenceTables(_) => 4,
            Self::Domain(_) => 5,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) | Self::Input(_) => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Configuration(_) | Self::ReferenceTables(_) => {
                "Pricing configuration is invalid. Fix it before generating quotes."
            }
        }
    }
}
