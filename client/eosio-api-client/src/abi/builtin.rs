//! Built-in ABI types.

use super::Encoder;
use crate::{
	keys::{PublicKey, Signature, KEY_TYPE_K1},
	types::BlockTimestamp,
	Asset, Error, Name, Result, Symbol, SymbolCode, TimePoint, TimePointSec,
};
use serde_json::Value;
use std::str::FromStr;

pub(super) fn encode(type_name: &str, value: &Value, path: &str, enc: &mut Encoder) -> Result<()> {
	match type_name {
		"bool" => {
			let b = value.as_bool().ok_or_else(|| Error::abi(path, "expected a boolean"))?;
			enc.write_u8(b as u8);
		},
		"int8" => enc.write_raw(&int::<i8>(value, path)?.to_le_bytes()),
		"uint8" => enc.write_u8(int::<u8>(value, path)?),
		"int16" => enc.write_raw(&int::<i16>(value, path)?.to_le_bytes()),
		"uint16" => enc.write_u16(int::<u16>(value, path)?),
		"int32" => enc.write_raw(&int::<i32>(value, path)?.to_le_bytes()),
		"uint32" => enc.write_u32(int::<u32>(value, path)?),
		"int64" => enc.write_i64(int::<i64>(value, path)?),
		"uint64" => enc.write_u64(int::<u64>(value, path)?),
		"int128" => enc.write_raw(&int::<i128>(value, path)?.to_le_bytes()),
		"uint128" => enc.write_raw(&int::<u128>(value, path)?.to_le_bytes()),
		"varuint32" => enc.write_varuint32(int::<u32>(value, path)?),
		"varint32" => enc.write_varint32(int::<i32>(value, path)?),
		"float32" => enc.write_raw(&(float(value, path)? as f32).to_le_bytes()),
		"float64" => enc.write_raw(&float(value, path)?.to_le_bytes()),
		"name" => enc.write_name(name(value, path)?),
		"string" => enc.write_string(string(value, path)?),
		"bytes" => enc.write_bytes(&hex_bytes(value, path)?),
		"time_point" => match value {
			Value::Number(_) => enc.write_i64(int::<i64>(value, path)?),
			_ => enc.write_i64(parse::<TimePoint>(value, path)?.0),
		},
		"time_point_sec" => match value {
			Value::Number(_) => enc.write_u32(int::<u32>(value, path)?),
			_ => enc.write_u32(parse::<TimePointSec>(value, path)?.0),
		},
		"block_timestamp_type" => enc.write_u32(parse::<BlockTimestamp>(value, path)?.0),
		"checksum160" => enc.write_raw(&fixed_hex(value, path, 20)?),
		"checksum256" => enc.write_raw(&fixed_hex(value, path, 32)?),
		"checksum512" => enc.write_raw(&fixed_hex(value, path, 64)?),
		"public_key" => {
			enc.write_u8(KEY_TYPE_K1);
			enc.write_raw(&parse::<PublicKey>(value, path)?.to_bytes());
		},
		"signature" => {
			enc.write_u8(KEY_TYPE_K1);
			enc.write_raw(parse::<Signature>(value, path)?.as_bytes());
		},
		"symbol" => enc.write_u64(parse::<Symbol>(value, path)?.as_u64()),
		"symbol_code" => enc.write_u64(parse::<SymbolCode>(value, path)?.as_u64()),
		"asset" => write_asset(parse::<Asset>(value, path)?, enc),
		"extended_asset" => {
			let quantity = value.get("quantity").ok_or_else(|| Error::abi(path, "missing quantity"))?;
			let contract = value.get("contract").ok_or_else(|| Error::abi(path, "missing contract"))?;
			write_asset(parse::<Asset>(quantity, path)?, enc);
			enc.write_name(parse::<Name>(contract, path)?);
		},
		other => return Err(Error::abi(path, format!("unknown type {other}"))),
	}
	Ok(())
}

fn write_asset(asset: Asset, enc: &mut Encoder) {
	enc.write_i64(asset.amount);
	enc.write_u64(asset.symbol.as_u64());
}

fn string<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
	value.as_str().ok_or_else(|| Error::abi(path, "expected a string"))
}

fn parse<T>(value: &Value, path: &str) -> Result<T>
where
	T: FromStr<Err = Error>,
{
	string(value, path)?.parse().map_err(|e: Error| Error::abi(path, e.to_string()))
}

/// An empty string is the zero name in action data.
fn name(value: &Value, path: &str) -> Result<Name> {
	match string(value, path)? {
		"" => Ok(Name::default()),
		_ => parse(value, path),
	}
}

/// Integers arrive as JSON numbers or, for 64 bit and wider values, as decimal strings.
fn int<T>(value: &Value, path: &str) -> Result<T>
where
	T: FromStr + TryFrom<i128>,
{
	let out_of_range = || Error::abi(path, format!("integer out of range: {value}"));
	match value {
		Value::Number(n) =>
			if let Some(v) = n.as_u64() {
				T::try_from(v as i128).map_err(|_| out_of_range())
			} else if let Some(v) = n.as_i64() {
				T::try_from(v as i128).map_err(|_| out_of_range())
			} else {
				Err(Error::abi(path, format!("expected an integer, got {n}")))
			},
		Value::String(s) => s.trim().parse::<T>().map_err(|_| out_of_range()),
		_ => Err(Error::abi(path, "expected an integer")),
	}
}

fn float(value: &Value, path: &str) -> Result<f64> {
	match value {
		Value::Number(n) => n.as_f64().ok_or_else(|| Error::abi(path, "expected a number")),
		Value::String(s) =>
			s.trim().parse().map_err(|_| Error::abi(path, format!("not a number: {s}"))),
		_ => Err(Error::abi(path, "expected a number")),
	}
}

fn hex_bytes(value: &Value, path: &str) -> Result<Vec<u8>> {
	hex::decode(string(value, path)?).map_err(|e| Error::abi(path, format!("bad hex: {e}")))
}

fn fixed_hex(value: &Value, path: &str, len: usize) -> Result<Vec<u8>> {
	let bytes = hex_bytes(value, path)?;
	if bytes.len() != len {
		return Err(Error::abi(path, format!("expected {len} bytes, got {}", bytes.len())))
	}
	Ok(bytes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn encoded(type_name: &str, value: Value) -> Result<String> {
		let mut enc = Encoder::new();
		encode(type_name, &value, "t", &mut enc)?;
		Ok(hex::encode(enc.into_bytes()))
	}

	#[test]
	fn integers_check_range() {
		assert_eq!(encoded("uint8", json!(255)).unwrap(), "ff");
		assert!(encoded("uint8", json!(256)).is_err());
		assert!(encoded("uint32", json!(-1)).is_err());
		assert_eq!(encoded("int16", json!(-2)).unwrap(), "feff");
		assert_eq!(encoded("uint64", json!("18446744073709551615")).unwrap(), "ffffffffffffffff");
		assert!(encoded("uint64", json!(1.5)).is_err());
	}

	#[test]
	fn floats_accept_numbers_and_strings() {
		assert_eq!(encoded("float32", json!(1.5)).unwrap(), "0000c03f");
		assert_eq!(encoded("float32", json!("1.5")).unwrap(), "0000c03f");
	}

	#[test]
	fn assets_and_symbols() {
		assert_eq!(encoded("asset", json!("1.0000 EOS")).unwrap(), "102700000000000004454f5300000000");
		assert_eq!(encoded("symbol", json!("4,EOS")).unwrap(), "04454f5300000000");
		assert_eq!(
			encoded("extended_asset", json!({ "quantity": "1.0000 EOS", "contract": "eosio.token" }))
				.unwrap(),
			"102700000000000004454f530000000000a6823403ea3055"
		);
	}

	#[test]
	fn public_key_carries_type_tag() {
		let hex = encoded("public_key", json!("EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV"))
			.unwrap();
		assert_eq!(hex.len(), 2 * 34);
		assert!(hex.starts_with("00"));
	}

	#[test]
	fn checksums_need_exact_length() {
		assert!(encoded("checksum256", json!("00")).is_err());
		assert_eq!(encoded("checksum160", json!("00".repeat(20))).unwrap(), "00".repeat(20));
	}

	#[test]
	fn names_accept_empty_but_not_trailing_dots() {
		assert_eq!(encoded("name", json!("")).unwrap(), "0000000000000000");
		assert_eq!(encoded("name", json!("eosio")).unwrap(), "0000000000ea3055");
		assert!(encoded("name", json!("eosio.")).is_err());
	}

	#[test]
	fn unknown_types_are_errors() {
		assert!(encoded("uint256", json!(1)).is_err());
	}
}
