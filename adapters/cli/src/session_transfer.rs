#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gem_cascade_system_cascade::SessionSnapshot;

const TRANSFER_DOMAIN: &str = "gems";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded session payload.
pub(crate) const TRANSFER_HEADER: &str = "gems:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a session snapshot into a single-line resumable code.
pub(crate) fn encode(snapshot: &SessionSnapshot) -> Result<String, SessionTransferError> {
    let json = serde_json::to_vec(snapshot).map_err(SessionTransferError::Serialization)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a session snapshot from a transfer code.
pub(crate) fn decode(value: &str) -> Result<SessionSnapshot, SessionTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(SessionTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(SessionTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(SessionTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(SessionTransferError::UnsupportedVersion(version.to_owned()));
    }
    if payload.is_empty() {
        return Err(SessionTransferError::MissingPayload);
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SessionTransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(SessionTransferError::InvalidPayload)
}

/// Errors that can occur while producing or reading transfer codes.
#[derive(Debug)]
pub(crate) enum SessionTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The code did not contain a version segment.
    MissingVersion,
    /// The code did not include the payload segment.
    MissingPayload,
    /// The code used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The snapshot could not be serialised.
    Serialization(serde_json::Error),
}

impl fmt::Display for SessionTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "session code was empty"),
            Self::MissingVersion => write!(f, "session code is missing the version"),
            Self::MissingPayload => write!(f, "session code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "session prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "session version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode session payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse session payload: {error}")
            }
            Self::Serialization(error) => {
                write!(f, "could not serialise session: {error}")
            }
        }
    }
}

impl Error for SessionTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) | Self::Serialization(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_cascade_board::Board;
    use gem_cascade_core::{ColorTally, Coord, GemColor, Goal, LevelConfig, LevelId};

    fn snapshot() -> SessionSnapshot {
        let mut collected = ColorTally::new(5);
        collected.add(GemColor::new(2), 7);
        SessionSnapshot {
            level: LevelConfig {
                id: LevelId::new(4),
                moves: 20,
                goals: vec![
                    Goal::Score { target: 900 },
                    Goal::Collect {
                        color: GemColor::new(2),
                        amount: 12,
                    },
                ],
                walls: vec![Coord::new(1, 1)],
                ice: Vec::new(),
                initial_grid: None,
                star_thresholds: None,
            },
            board: Board::parse("0 1 2\n3i2 # 0\nH B 1", 5).expect("valid board"),
            score: 340,
            moves_used: 6,
            collected,
        }
    }

    #[test]
    fn round_trip_preserves_walls_ice_and_progress() {
        let snapshot = snapshot();

        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&encoded).expect("snapshot decodes");
        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.board.to_string(), "0 1 2\n3i2 # 0\nH B 1");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = encode(&snapshot()).expect("snapshot encodes");
        let padded = format!("  {encoded}\n");
        assert_eq!(decode(&padded).expect("snapshot decodes"), snapshot());
    }

    #[test]
    fn malformed_codes_report_distinct_errors() {
        assert!(matches!(decode("   "), Err(SessionTransferError::EmptyPayload)));
        assert!(matches!(
            decode("gems"),
            Err(SessionTransferError::MissingVersion)
        ));
        assert!(matches!(
            decode("gems:v1"),
            Err(SessionTransferError::MissingPayload)
        ));
        assert!(matches!(
            decode(":v1:e30"),
            Err(SessionTransferError::InvalidPrefix(prefix)) if prefix.is_empty()
        ));
        assert!(matches!(
            decode("jewels:v1:e30"),
            Err(SessionTransferError::InvalidPrefix(prefix)) if prefix == "jewels"
        ));
        assert!(matches!(
            decode("gems:v9:e30"),
            Err(SessionTransferError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            decode("gems:v1:***"),
            Err(SessionTransferError::InvalidEncoding(_))
        ));
        assert!(matches!(
            decode("gems:v1:e30"),
            Err(SessionTransferError::InvalidPayload(_))
        ));
    }
}
