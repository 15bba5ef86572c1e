//! Protobuf wire format for configurations
//!
//! The payload is persisted in log entries and snapshots and exchanged
//! between replicas running independently built binaries, so the encoding
//! must stay byte-stable: the wire record uses `BTreeMap` so the same
//! configuration always serializes to the same bytes regardless of map
//! insertion order.

use crate::common::Result;
use crate::membership::Configuration;
use prost::Message;
use std::collections::{BTreeMap, HashMap};

/// On-wire configuration record. Exactly three fields; an `is_voter` entry
/// missing for a member defaults to non-voter on read.
#[derive(Clone, PartialEq, Message)]
struct ConfigurationRecord {
    #[prost(btree_map = "string, string", tag = "1")]
    members: BTreeMap<String, String>,

    #[prost(btree_map = "string, bool", tag = "2")]
    is_voter: BTreeMap<String, bool>,

    #[prost(uint64, tag = "3")]
    log_index: u64,
}

impl Configuration {
    /// Serialize to the wire format
    pub fn encode(&self) -> Vec<u8> {
        let record = ConfigurationRecord {
            members: self
                .members
                .iter()
                .map(|(id, addr)| (id.clone(), addr.clone()))
                .collect(),
            is_voter: self
                .is_voter
                .iter()
                .map(|(id, voter)| (id.clone(), *voter))
                .collect(),
            log_index: self.index,
        };
        record.encode_to_vec()
    }

    /// Deserialize from the wire format.
    ///
    /// Fails with [`Error::MalformedConfiguration`](crate::Error) on
    /// truncated or structurally invalid bytes. Members without an
    /// `is_voter` entry come back as non-voters.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let record = ConfigurationRecord::decode(bytes)?;

        let mut is_voter: HashMap<String, bool> = record.is_voter.into_iter().collect();
        for id in record.members.keys() {
            is_voter.entry(id.clone()).or_insert(false);
        }

        Ok(Self {
            members: record.members.into_iter().collect(),
            is_voter,
            index: record.log_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn sample(index: u64) -> Configuration {
        let members = [("n1", "a1"), ("n2", "a2"), ("n3", "a3")]
            .iter()
            .map(|(id, addr)| (id.to_string(), addr.to_string()))
            .collect();
        Configuration::new(index, members).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cfg = sample(42);
        let decoded = Configuration::decode(&cfg.encode()).unwrap();
        assert_eq!(decoded, cfg);
    }

    #[test]
    fn test_round_trip_with_non_voters() {
        let cfg = sample(9)
            .apply(
                10,
                &crate::membership::MembershipChange::Demote { id: "n2".to_string() },
            )
            .unwrap();
        let decoded = Configuration::decode(&cfg.encode()).unwrap();
        assert_eq!(decoded, cfg);
        assert!(!decoded.is_voter("n2"));
        assert!(decoded.is_voter("n1"));
    }

    #[test]
    fn test_encoding_is_byte_stable() {
        // Same membership, different insertion order
        let forward = sample(7);
        let mut reversed = Configuration::default();
        reversed.index = 7;
        for (id, addr) in [("n3", "a3"), ("n2", "a2"), ("n1", "a1")] {
            reversed.members.insert(id.to_string(), addr.to_string());
            reversed.is_voter.insert(id.to_string(), true);
        }

        assert_eq!(forward.encode(), reversed.encode());
        assert_eq!(forward.encode(), forward.encode());
    }

    #[test]
    fn test_decode_truncated_fails() {
        // cutting one byte leaves the trailing log_index tag with no varint
        let bytes = sample(3).encode();
        let err = Configuration::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, Error::MalformedConfiguration(_)));
    }

    #[test]
    fn test_decode_garbage_fails() {
        // Field 1 declared length-delimited but with a length past the end
        let err = Configuration::decode(&[0x0a, 0xff, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, Error::MalformedConfiguration(_)));
    }

    #[test]
    fn test_missing_voter_entries_default_to_non_voter() {
        // A record written by a peer that never filled the voter map
        let record = ConfigurationRecord {
            members: [("n1".to_string(), "a1".to_string())].into_iter().collect(),
            is_voter: BTreeMap::new(),
            log_index: 4,
        };

        let decoded = Configuration::decode(&record.encode_to_vec()).unwrap();
        assert_eq!(decoded.index, 4);
        assert!(decoded.members.contains_key("n1"));
        assert!(!decoded.is_voter("n1"));
        // the entry is materialized, not just defaulted on lookup
        assert_eq!(decoded.is_voter.get("n1"), Some(&false));
    }

    #[test]
    fn test_decode_empty_bytes_is_default_record() {
        // An empty buffer is a structurally valid, all-defaults message
        let decoded = Configuration::decode(&[]).unwrap();
        assert_eq!(decoded, Configuration::default());
    }
}
