// AsInfer: AS-path inference from partial BGP observations
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Module containing all type definitions

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::store::StoreError;

/// Offset at which the dotted AS range starts. Plain AS numbers must stay below this value, as
/// everything above encodes a dotted `H.L` pair.
pub(crate) const DOTTED_BASE: u32 = 500_000;

/// AS Number.
///
/// An `Asn` packs both plain AS numbers and dotted (`H.L`) AS numbers into a single `u32` domain:
/// a plain number `N` (with `0 < N < 500000`) is encoded as itself, and a dotted number `H.L` as
/// `500000 + 10000 * H + L`, where `L` is left-aligned to four decimal digits (`"3.1"` encodes the
/// low part as `1000`, `"3.1234"` as `1234`). The encoding is a bijection on that domain:
/// [`Asn::from_str`] is the only way in, and [`std::fmt::Display`] writes the canonical text back
/// out (dotted numbers always carry a zero-padded four-digit low part).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Asn(pub u32);

impl Asn {
    /// Returns `true` if this identifier encodes a dotted (`H.L`) AS number.
    pub fn is_dotted(&self) -> bool {
        self.0 > DOTTED_BASE
    }
}

impl From<u32> for Asn {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl FromStr for Asn {
    type Err = AsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((high, low)) = s.split_once('.') {
            if low.is_empty() || low.len() > 4 || !low.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AsnError::Invalid(s.to_string()));
            }
            let h: u32 = high.parse().map_err(|_| AsnError::Invalid(s.to_string()))?;
            if h == 0 {
                return Err(AsnError::Invalid(s.to_string()));
            }
            let l: u32 = low.parse().map_err(|_| AsnError::Invalid(s.to_string()))?;
            // left-align the low part to four digits: "3.1" -> 1000, "3.12" -> 1200, ...
            let l = l * 10u32.pow(4 - low.len() as u32);
            h.checked_mul(10_000)
                .and_then(|x| x.checked_add(DOTTED_BASE))
                .and_then(|x| x.checked_add(l))
                .map(Asn)
                .ok_or_else(|| AsnError::OutOfRange(s.to_string()))
        } else {
            let n: u32 = s.parse().map_err(|_| AsnError::Invalid(s.to_string()))?;
            if n == 0 {
                Err(AsnError::Invalid(s.to_string()))
            } else if n >= DOTTED_BASE {
                Err(AsnError::OutOfRange(s.to_string()))
            } else {
                Ok(Asn(n))
            }
        }
    }
}

impl std::fmt::Display for Asn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 > DOTTED_BASE {
            let x = self.0 - DOTTED_BASE;
            write!(f, "{}.{:04}", x / 10_000, x % 10_000)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Business relationship of a neighboring AS, seen from the perspective of the AS under which the
/// tag is stored: `rel[a][b] == Customer` means that `b` is a customer of `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsRelation {
    /// The neighbor is a peer (`p2p`).
    Peer,
    /// The neighbor is a customer (`p2c`).
    Customer,
    /// The neighbor is a provider (`c2p`).
    Provider,
    /// The neighbor belongs to the same operator (`sibling`).
    Sibling,
    /// The relationship is not known. Unknown edges are never stored; they are counted and
    /// dropped while loading the topology.
    Unknown,
}

impl AsRelation {
    /// Parse the relation tag as stored in the `as:<A>:rel` hashes. Anything that is not one of
    /// the four known tags maps to [`AsRelation::Unknown`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "p2p" => Self::Peer,
            "p2c" => Self::Customer,
            "c2p" => Self::Provider,
            "sibling" => Self::Sibling,
            _ => Self::Unknown,
        }
    }

    /// Returns `true` for [`AsRelation::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for AsRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AsRelation::Peer => write!(f, "p2p"),
            AsRelation::Customer => write!(f, "p2c"),
            AsRelation::Provider => write!(f, "c2p"),
            AsRelation::Sibling => write!(f, "sibling"),
            AsRelation::Unknown => write!(f, "unknown"),
        }
    }
}

/// Errors raised by the AS identifier codec.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AsnError {
    /// The token is neither a plain AS number nor a well-formed dotted one.
    #[error("Invalid AS number: {0:?}")]
    Invalid(String),
    /// The token parses, but falls outside the encodable domain.
    #[error("AS number out of range: {0:?}")]
    OutOfRange(String),
}

/// Inference Errors
#[derive(Error, Debug)]
pub enum InferError {
    /// The external store misbehaved (connection, reply shape, or script error).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// An AS token read from the store could not be decoded.
    #[error("{0}")]
    Asn(#[from] AsnError),
    /// The store holds no topology data for the requested rib tag.
    #[error("No RIB data available for tag {0:?}")]
    NoRibData(String),
}
