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

use std::collections::HashSet;
use std::str::FromStr;

use pretty_assertions::assert_eq;

use crate::types::{Asn, AsnError, AsRelation};

#[test]
fn encode_plain() {
    assert_eq!(Asn::from_str("12342"), Ok(Asn(12342)));
}

#[test]
fn decode_plain() {
    assert_eq!(Asn(12342).to_string(), "12342");
}

#[test]
fn encode_dotted() {
    assert_eq!(Asn::from_str("3.123"), Ok(Asn(531230)));
}

#[test]
fn decode_dotted() {
    assert_eq!(Asn(720123).to_string(), "22.0123");
}

#[test]
fn dotted_low_part_is_left_aligned() {
    assert_eq!(Asn::from_str("3.1"), Ok(Asn(531000)));
    assert_eq!(Asn::from_str("3.12"), Ok(Asn(531200)));
    assert_eq!(Asn::from_str("3.123"), Ok(Asn(531230)));
    assert_eq!(Asn::from_str("3.1234"), Ok(Asn(531234)));
}

#[test]
fn dotted_round_trips_with_padding() {
    for text in ["3.1", "22.0123", "5.3224", "1.0001"] {
        let asn: Asn = text.parse().unwrap();
        let canonical = asn.to_string();
        // the canonical form carries a four-digit low part and re-parses to the same value
        assert_eq!(canonical.parse::<Asn>().unwrap(), asn);
    }
    assert_eq!(Asn::from_str("3.1").unwrap().to_string(), "3.1000");
    assert_eq!(Asn::from_str("22.0123").unwrap().to_string(), "22.0123");
}

#[test]
fn plain_encoding_is_injective() {
    let mut seen = HashSet::new();
    for n in 1u32..150_000 {
        let asn = Asn::from_str(&n.to_string()).unwrap();
        assert!(seen.insert(asn), "{n} encoded to a duplicate value");
    }
}

#[test]
fn rejects_malformed_tokens() {
    assert_eq!(Asn::from_str(""), Err(AsnError::Invalid(String::new())));
    assert_eq!(Asn::from_str("0"), Err(AsnError::Invalid("0".to_string())));
    assert!(Asn::from_str("abc").is_err());
    assert!(Asn::from_str("12 34").is_err());
    assert!(Asn::from_str("3.").is_err());
    assert!(Asn::from_str(".3").is_err());
    assert!(Asn::from_str("0.1").is_err());
    assert!(Asn::from_str("3.12345").is_err());
    assert!(Asn::from_str("3.12a").is_err());
    assert!(Asn::from_str("-5").is_err());
}

#[test]
fn rejects_plain_numbers_in_the_dotted_range() {
    assert_eq!(
        Asn::from_str("500000"),
        Err(AsnError::OutOfRange("500000".to_string()))
    );
    assert_eq!(
        Asn::from_str("600000"),
        Err(AsnError::OutOfRange("600000".to_string()))
    );
    assert!(Asn::from_str("499999").is_ok());
}

#[test]
fn dotted_detection() {
    assert!(!Asn::from_str("12342").unwrap().is_dotted());
    assert!(Asn::from_str("3.123").unwrap().is_dotted());
}

#[test]
fn relation_tags() {
    assert_eq!(AsRelation::from_tag("p2p"), AsRelation::Peer);
    assert_eq!(AsRelation::from_tag("p2c"), AsRelation::Customer);
    assert_eq!(AsRelation::from_tag("c2p"), AsRelation::Provider);
    assert_eq!(AsRelation::from_tag("sibling"), AsRelation::Sibling);
    assert_eq!(AsRelation::from_tag(""), AsRelation::Unknown);
    assert_eq!(AsRelation::from_tag("peer"), AsRelation::Unknown);
    assert!(AsRelation::from_tag("bogus").is_unknown());
}
