//! Chain primitives with their canonical string forms.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

const NAME_CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Milliseconds between the unix epoch and 2000-01-01, the origin of block timestamps.
const BLOCK_TIMESTAMP_EPOCH_MS: i64 = 946_684_800_000;
const BLOCK_INTERVAL_MS: i64 = 500;

/// Account, action, table and scope identifier packed into 64 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u64);

impl Name {
	pub const fn from_u64(value: u64) -> Self {
		Name(value)
	}

	pub const fn as_u64(&self) -> u64 {
		self.0
	}
}

fn name_symbol(c: u8) -> Option<u64> {
	match c {
		b'a'..=b'z' => Some((c - b'a') as u64 + 6),
		b'1'..=b'5' => Some((c - b'1') as u64 + 1),
		b'.' => Some(0),
		_ => None,
	}
}

impl FromStr for Name {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let bytes = s.as_bytes();
		if bytes.is_empty() || bytes.len() > 13 {
			return Err(Error::InvalidName(s.to_owned()))
		}
		let mut value = 0u64;
		for (i, c) in bytes.iter().enumerate() {
			let symbol = name_symbol(*c).ok_or_else(|| Error::InvalidName(s.to_owned()))?;
			if i < 12 {
				value |= symbol << (64 - 5 * (i + 1));
			} else {
				// the 13th character only has 4 bits left
				if symbol > 0x0f {
					return Err(Error::InvalidName(s.to_owned()))
				}
				value |= symbol;
			}
		}
		// trailing dots do not survive the round trip and the chain refuses them
		let name = Name(value);
		if name.to_string() != s {
			return Err(Error::InvalidName(s.to_owned()))
		}
		Ok(name)
	}
}

impl fmt::Display for Name {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut out = [b'.'; 13];
		let mut tmp = self.0;
		for i in 0..13 {
			let mask = if i == 0 { 0x0f } else { 0x1f };
			out[12 - i] = NAME_CHARMAP[(tmp & mask) as usize];
			tmp >>= if i == 0 { 4 } else { 5 };
		}
		let s = std::str::from_utf8(&out).map_err(|_| fmt::Error)?;
		f.write_str(s.trim_end_matches('.'))
	}
}

impl Serialize for Name {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Name {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

/// Up to seven upper case letters, e.g. `TLOS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymbolCode(u64);

impl SymbolCode {
	pub const fn as_u64(&self) -> u64 {
		self.0
	}
}

impl FromStr for SymbolCode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		if s.is_empty() || s.len() > 7 || !s.bytes().all(|c| c.is_ascii_uppercase()) {
			return Err(Error::InvalidSymbol(s.to_owned()))
		}
		let value = s.bytes().enumerate().fold(0u64, |acc, (i, c)| acc | (c as u64) << (8 * i));
		Ok(SymbolCode(value))
	}
}

impl fmt::Display for SymbolCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tmp = self.0;
		while tmp > 0 {
			write!(f, "{}", (tmp & 0xff) as u8 as char)?;
			tmp >>= 8;
		}
		Ok(())
	}
}

/// Symbol code plus decimal precision, written `4,TLOS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Symbol {
	pub precision: u8,
	pub code: SymbolCode,
}

impl Symbol {
	pub const fn as_u64(&self) -> u64 {
		(self.code.0 << 8) | self.precision as u64
	}
}

impl FromStr for Symbol {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let (precision, code) =
			s.trim().split_once(',').ok_or_else(|| Error::InvalidSymbol(s.to_owned()))?;
		let precision: u8 =
			precision.trim().parse().map_err(|_| Error::InvalidSymbol(s.to_owned()))?;
		if precision > 18 {
			return Err(Error::InvalidSymbol(s.to_owned()))
		}
		Ok(Symbol { precision, code: code.trim().parse()? })
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{},{}", self.precision, self.code)
	}
}

/// A token quantity such as `1.0000 TLOS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Asset {
	pub amount: i64,
	pub symbol: Symbol,
}

impl FromStr for Asset {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let invalid = || Error::InvalidAsset(s.to_owned());
		let (quantity, code) = s.trim().split_once(' ').ok_or_else(invalid)?;
		let (negative, digits) = match quantity.strip_prefix('-') {
			Some(rest) => (true, rest),
			None => (false, quantity),
		};
		let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
		if int_part.is_empty() ||
			!int_part.bytes().all(|c| c.is_ascii_digit()) ||
			!frac_part.bytes().all(|c| c.is_ascii_digit()) ||
			frac_part.len() > 18
		{
			return Err(invalid())
		}
		let amount: i64 = format!("{int_part}{frac_part}").parse().map_err(|_| invalid())?;
		let symbol = Symbol { precision: frac_part.len() as u8, code: code.trim().parse()? };
		Ok(Asset { amount: if negative { -amount } else { amount }, symbol })
	}
}

impl fmt::Display for Asset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let precision = self.symbol.precision as u32;
		let sign = if self.amount < 0 { "-" } else { "" };
		let abs = self.amount.unsigned_abs();
		if precision == 0 {
			return write!(f, "{sign}{abs} {}", self.symbol.code)
		}
		let scale = 10u64.pow(precision);
		write!(
			f,
			"{sign}{}.{:0width$} {}",
			abs / scale,
			abs % scale,
			self.symbol.code,
			width = precision as usize
		)
	}
}

fn parse_chain_time(s: &str) -> Result<NaiveDateTime> {
	let trimmed = s.trim().trim_end_matches('Z');
	NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
		.map_err(|_| Error::InvalidTime(s.to_owned()))
}

/// Microseconds since the unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimePoint(pub i64);

impl FromStr for TimePoint {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Ok(TimePoint(parse_chain_time(s)?.and_utc().timestamp_micros()))
	}
}

impl fmt::Display for TimePoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let dt = DateTime::from_timestamp_micros(self.0).ok_or(fmt::Error)?;
		write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3f"))
	}
}

/// Seconds since the unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
	pub fn checked_add_secs(self, secs: u32) -> Option<Self> {
		self.0.checked_add(secs).map(TimePointSec)
	}
}

impl FromStr for TimePointSec {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let secs = parse_chain_time(s)?.and_utc().timestamp();
		u32::try_from(secs).map(TimePointSec).map_err(|_| Error::InvalidTime(s.to_owned()))
	}
}

impl fmt::Display for TimePointSec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let dt = DateTime::from_timestamp(self.0 as i64, 0).ok_or(fmt::Error)?;
		write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))
	}
}

/// Half-second slot counted from 2000-01-01.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockTimestamp(pub u32);

impl FromStr for BlockTimestamp {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let ms = parse_chain_time(s)?.and_utc().timestamp_millis();
		let slot = (ms - BLOCK_TIMESTAMP_EPOCH_MS) / BLOCK_INTERVAL_MS;
		u32::try_from(slot).map(BlockTimestamp).map_err(|_| Error::InvalidTime(s.to_owned()))
	}
}

/// 32 byte digest, used for chain ids and transaction ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Checksum256(pub [u8; 32]);

impl Checksum256 {
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl FromStr for Checksum256 {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let mut out = [0u8; 32];
		hex::decode_to_slice(s, &mut out).map_err(|_| Error::InvalidChecksum(s.to_owned()))?;
		Ok(Checksum256(out))
	}
}

impl fmt::Display for Checksum256 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

impl Serialize for Checksum256 {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Checksum256 {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn name_encodes_known_values() {
		assert_eq!(Name::from_str("eosio").unwrap().as_u64(), 6138663577826885632);
		assert_eq!(Name::from_str("active").unwrap().as_u64(), 3617214756542218240);
		assert_eq!(Name::from_str("eosio.token").unwrap().as_u64(), 6138663591592764928);
		assert_eq!(Name::from_str("telos.decide").unwrap().as_u64(), 14601597984753029792);
	}

	#[test]
	fn name_displays_back() {
		for s in ["eosio", "mygenericdao", "telos.decide", "proposal", "a1b2c3d4e5"] {
			assert_eq!(Name::from_str(s).unwrap().to_string(), s);
		}
		assert_eq!(Name::default().to_string(), "");
	}

	#[test]
	fn name_rejects_invalid_input() {
		assert!(Name::from_str("UPPER").is_err());
		assert!(Name::from_str("has6digit").is_err());
		assert!(Name::from_str("fourteenchars1").is_err());
		// 13th character must fit into four bits
		assert!(Name::from_str("aaaaaaaaaaaaz").is_err());
		assert!(Name::from_str("aaaaaaaaaaaaj").is_ok());
	}

	#[test]
	fn name_rejects_empty_and_trailing_dots() {
		assert!(Name::from_str("").is_err());
		assert!(Name::from_str(".").is_err());
		assert!(Name::from_str("a.").is_err());
		assert!(Name::from_str("mygenericdao.").is_err());
		assert!(Name::from_str("a.b").is_ok());
	}

	#[test]
	fn name_serde_uses_string_form() {
		let name: Name = serde_json::from_str("\"closeprop\"").unwrap();
		assert_eq!(name.as_u64(), 4929617875652050944);
		assert_eq!(serde_json::to_string(&name).unwrap(), "\"closeprop\"");
	}

	#[test]
	fn asset_parses_and_prints() {
		let asset = Asset::from_str("1.0000 EOS").unwrap();
		assert_eq!(asset.amount, 10000);
		assert_eq!(asset.symbol.precision, 4);
		assert_eq!(asset.symbol.as_u64(), 1397703940);
		assert_eq!(asset.to_string(), "1.0000 EOS");

		let negative = Asset::from_str("-0.05 USD").unwrap();
		assert_eq!(negative.amount, -5);
		assert_eq!(negative.to_string(), "-0.05 USD");

		assert_eq!(Asset::from_str("12 VOTE").unwrap().to_string(), "12 VOTE");
	}

	#[test]
	fn asset_rejects_garbage() {
		assert!(Asset::from_str("1.0000").is_err());
		assert!(Asset::from_str("abc EOS").is_err());
		assert!(Asset::from_str("1.0 eos").is_err());
		assert!(Asset::from_str(".5 EOS").is_err());
	}

	#[test]
	fn symbol_round_trips_through_display() {
		let symbol = Symbol::from_str("2,REWARD").unwrap();
		assert_eq!(symbol.precision, 2);
		assert_eq!(symbol.to_string(), "2,REWARD");
		assert!(Symbol::from_str("19,TOOPRECISE").is_err());
	}

	#[test]
	fn time_points_parse_chain_format() {
		assert_eq!(
			TimePoint::from_str("2021-01-01T00:00:00.000").unwrap(),
			TimePoint(1_609_459_200_000_000)
		);
		assert_eq!(
			TimePoint::from_str("2021-01-01T00:00:00.5Z").unwrap(),
			TimePoint(1_609_459_200_500_000)
		);
		assert_eq!(TimePoint(1_609_459_200_000_000).to_string(), "2021-01-01T00:00:00.000");
		assert_eq!(TimePointSec::from_str("2021-01-01T00:00:00").unwrap(), TimePointSec(1_609_459_200));
		assert_eq!(BlockTimestamp::from_str("2000-01-01T00:00:01.000").unwrap(), BlockTimestamp(2));
		assert!(TimePoint::from_str("yesterday").is_err());
	}

	#[test]
	fn checksum_hex_round_trip() {
		let hex_id = "4667b205c6838ef70ff7988f6e8257e8be0e1284a2f59699054a018f743b1d11";
		let id = Checksum256::from_str(hex_id).unwrap();
		assert_eq!(id.to_string(), hex_id);
		assert!(Checksum256::from_str("abcd").is_err());
	}
}
