//! Uplink payload decoding.
//!
//! The payload follows the usual protocol layering:
//! - `hex`: hexadecimal record value -> raw bytes
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and byte-order conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! The demo distance sensor sends its time-of-flight reading in millimetres as
//! a signed 16-bit big-endian integer at offset 0. Trailing bytes are ignored.
//!
//! Version française (résumé):
//! Le module convertit la valeur hexadécimale en octets puis lit la distance
//! (entier signé 16 bits gros-boutiste, position 0, en mm). Les positions
//! sont dans `layout`, les lectures sûres dans `reader`.

pub mod error;
pub mod hex;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::{HexError, PayloadError};
pub use hex::{decode_hex, hex_text};
pub use parser::{DistanceReading, parse_distance};
