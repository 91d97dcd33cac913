//! Newtypes and parsers for location tokens and run identifiers.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CoreError;

/// Allow only safe token chars and length (1..=64).
fn is_token(s: &str) -> bool {
    let len = s.len();
    if !(1..=64).contains(&len) {
        return false;
    }
    s.bytes().all(|b| matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
        b'_' | b'-' | b':' | b'.'
    ))
}

macro_rules! def_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str { &self.0 }

            /// For compile-time literals already known to be valid tokens.
            pub(crate) fn from_static(s: &'static str) -> Self {
                debug_assert!(is_token(s));
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken(s.to_string())) }
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

def_token!(
    /// Location identifier (FIPS-like code: "01", "06", "US").
    LocationId
);

/// Run identifier within one ensemble. Unique per ensemble, not globally.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RunId(pub i64);

impl RunId {
    pub fn get(self) -> i64 { self.0 }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_tokens_accept_fips_and_country() {
        assert_eq!("06".parse::<LocationId>().unwrap().as_str(), "06");
        assert_eq!(" US ".parse::<LocationId>().unwrap().as_str(), "US");
    }

    #[test]
    fn location_tokens_reject_bad_charset() {
        assert!("".parse::<LocationId>().is_err());
        assert!("New York".parse::<LocationId>().is_err());
        assert!("a/b".parse::<LocationId>().is_err());
    }

    #[test]
    fn run_ids_order_numerically() {
        let mut ids = vec![RunId(10), RunId(2), RunId(-1)];
        ids.sort();
        assert_eq!(ids, vec![RunId(-1), RunId(2), RunId(10)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn location_id_deserialize_validates() {
        let ok: LocationId = serde_json::from_str("\"72\"").unwrap();
        assert_eq!(ok.as_str(), "72");
        assert!(serde_json::from_str::<LocationId>("\"x y\"").is_err());
    }
}
