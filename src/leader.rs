//! MARC record leader parsing.
//!
//! The leader is a 24-character fixed-length string at the start of every
//! MARC record. The crosswalk only reads a handful of its positions, but a
//! leader of the expected length is the structural precondition for mapping
//! a record at all.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, e = cartographic, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Position 8: Control record type
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Positions 10-11: Indicator and subfield code counts
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Entry map (usually "4500")

use crate::error::{CrosswalkError, Result};
use serde::{Deserialize, Serialize};

/// Length of a well-formed leader.
pub const LEADER_LEN: usize = 24;

/// Bibliographic level code for a monograph or single item (leader/07).
pub const LEVEL_MONOGRAPH: char = 'm';

/// Bibliographic level code for a serial (leader/07).
pub const LEVEL_SERIAL: char = 's';

/// MARC Leader - 24 characters at the start of every MARC record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Record length - positions 0-4. Zero when harvested data left it blank.
    pub record_length: u32,
    /// Record status (1 char) - position 5
    pub record_status: char,
    /// Type of record (1 char) - position 6
    pub record_type: char,
    /// Bibliographic level (1 char) - position 7
    pub bibliographic_level: char,
    /// Type of control record (1 char) - position 8
    pub control_record_type: char,
    /// Character coding scheme (1 char) - position 9
    pub character_coding: char,
    /// Base address of data - positions 12-16
    pub data_base_address: u32,
    /// Encoding level (1 char) - position 17
    pub encoding_level: char,
    /// Cataloging form (1 char) - position 18
    pub cataloging_form: char,
    /// Multipart resource record level (1 char) - position 19
    pub multipart_level: char,
    raw: String,
}

impl Leader {
    /// Parse a leader from its string form.
    ///
    /// Strings longer than 24 characters are accepted and truncated;
    /// harvested records sometimes carry trailing padding.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::InvalidLeader`] if the string is shorter than
    /// 24 characters or is not ASCII. Numeric positions that do not parse
    /// read as zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_crosswalk::Leader;
    ///
    /// let leader = Leader::parse("01026cas a2200301 i 4500")?;
    /// assert!(leader.is_serial());
    /// # Ok::<(), marc_crosswalk::CrosswalkError>(())
    /// ```
    pub fn parse(leader: &str) -> Result<Self> {
        if !leader.is_ascii() {
            return Err(CrosswalkError::InvalidLeader(format!(
                "Leader must be ASCII: '{leader}'"
            )));
        }
        if leader.len() < LEADER_LEN {
            return Err(CrosswalkError::InvalidLeader(format!(
                "Leader must be at least {LEADER_LEN} characters, got {}",
                leader.len()
            )));
        }

        let raw = &leader[..LEADER_LEN];
        let bytes = raw.as_bytes();

        Ok(Leader {
            record_length: parse_digits(&raw[0..5]),
            record_status: bytes[5] as char,
            record_type: bytes[6] as char,
            bibliographic_level: bytes[7] as char,
            control_record_type: bytes[8] as char,
            character_coding: bytes[9] as char,
            data_base_address: parse_digits(&raw[12..17]),
            encoding_level: bytes[17] as char,
            cataloging_form: bytes[18] as char,
            multipart_level: bytes[19] as char,
            raw: raw.to_string(),
        })
    }

    /// Character at a leader position, if within the 24-character range.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<char> {
        self.raw.as_bytes().get(index).map(|&b| b as char)
    }

    /// Whether leader/07 marks the record as a serial.
    #[must_use]
    pub fn is_serial(&self) -> bool {
        self.bibliographic_level == LEVEL_SERIAL
    }

    /// Whether leader/07 marks the record as a monograph.
    #[must_use]
    pub fn is_monograph(&self) -> bool {
        self.bibliographic_level == LEVEL_MONOGRAPH
    }

    /// The leader as its original 24-character string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for Leader {
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'a',
            bibliographic_level: LEVEL_MONOGRAPH,
            control_record_type: ' ',
            character_coding: 'a',
            data_base_address: 0,
            encoding_level: ' ',
            cataloging_form: 'a',
            multipart_level: ' ',
            raw: "00000nam a2200000 a 4500".to_string(),
        }
    }
}

/// Parse a 5-character numeric leader field.
///
/// Blank or garbled values read as zero: the crosswalk never uses them.
fn parse_digits(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}
