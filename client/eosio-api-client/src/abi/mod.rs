//! Contract ABI definitions and JSON to binary action data conversion.

mod builtin;
mod encoder;

pub use encoder::Encoder;

use crate::{Error, Name, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Nesting limit for typedef chains, arrays and structs.
const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiDef {
	#[serde(default)]
	pub version: String,
	#[serde(default)]
	pub types: Vec<TypeDef>,
	#[serde(default)]
	pub structs: Vec<StructDef>,
	#[serde(default)]
	pub actions: Vec<ActionDef>,
	#[serde(default)]
	pub tables: Vec<TableDef>,
	#[serde(default)]
	pub variants: Vec<VariantDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
	pub new_type_name: String,
	#[serde(rename = "type")]
	pub type_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructDef {
	pub name: String,
	#[serde(default)]
	pub base: String,
	#[serde(default)]
	pub fields: Vec<FieldDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
	pub name: Name,
	#[serde(rename = "type")]
	pub type_name: String,
	#[serde(default)]
	pub ricardian_contract: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
	pub name: Name,
	#[serde(default)]
	pub index_type: String,
	#[serde(default)]
	pub key_names: Vec<String>,
	#[serde(default)]
	pub key_types: Vec<String>,
	#[serde(rename = "type")]
	pub type_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantDef {
	pub name: String,
	#[serde(default)]
	pub types: Vec<String>,
}

/// An [`AbiDef`] indexed for serialization.
#[derive(Clone, Debug)]
pub struct Abi {
	typedefs: HashMap<String, String>,
	structs: HashMap<String, StructDef>,
	variants: HashMap<String, VariantDef>,
	actions: HashMap<Name, String>,
}

impl From<AbiDef> for Abi {
	fn from(def: AbiDef) -> Self {
		Abi {
			typedefs: def.types.into_iter().map(|t| (t.new_type_name, t.type_name)).collect(),
			structs: def.structs.into_iter().map(|s| (s.name.clone(), s)).collect(),
			variants: def.variants.into_iter().map(|v| (v.name.clone(), v)).collect(),
			actions: def.actions.into_iter().map(|a| (a.name, a.type_name)).collect(),
		}
	}
}

impl Abi {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str::<AbiDef>(json)?.into())
	}

	/// The struct type carrying the arguments of `action`.
	pub fn action_type(&self, action: Name) -> Option<&str> {
		self.actions.get(&action).map(String::as_str)
	}

	/// Serializes `data` as the argument struct of `action`.
	///
	/// Returns `Ok(None)` if the ABI does not declare the action.
	pub fn encode_action_data(&self, action: Name, data: &Value) -> Result<Option<Vec<u8>>> {
		match self.action_type(action) {
			Some(type_name) => self.encode(type_name, data).map(Some),
			None => Ok(None),
		}
	}

	pub fn encode(&self, type_name: &str, value: &Value) -> Result<Vec<u8>> {
		let mut enc = Encoder::new();
		self.encode_type(type_name, value, type_name, &mut enc, 0)?;
		Ok(enc.into_bytes())
	}

	fn encode_type(
		&self,
		type_name: &str,
		value: &Value,
		path: &str,
		enc: &mut Encoder,
		depth: usize,
	) -> Result<()> {
		if depth > MAX_DEPTH {
			return Err(Error::abi(path, "type nesting too deep"))
		}

		if let Some(inner) = type_name.strip_suffix("[]") {
			let items =
				value.as_array().ok_or_else(|| Error::abi(path, "expected an array"))?;
			let len = u32::try_from(items.len()).map_err(|_| Error::abi(path, "array too long"))?;
			enc.write_varuint32(len);
			for (i, item) in items.iter().enumerate() {
				self.encode_type(inner, item, &format!("{path}[{i}]"), enc, depth + 1)?;
			}
			return Ok(())
		}

		if let Some(inner) = type_name.strip_suffix('?') {
			if value.is_null() {
				enc.write_u8(0);
				return Ok(())
			}
			enc.write_u8(1);
			return self.encode_type(inner, value, path, enc, depth + 1)
		}

		// presence of a binary extension is decided by the enclosing struct
		if let Some(inner) = type_name.strip_suffix('$') {
			return self.encode_type(inner, value, path, enc, depth + 1)
		}

		if let Some(target) = self.typedefs.get(type_name) {
			return self.encode_type(target, value, path, enc, depth + 1)
		}

		if let Some(def) = self.structs.get(type_name) {
			return self.encode_struct(def, value, path, enc, depth + 1)
		}

		if let Some(def) = self.variants.get(type_name) {
			return self.encode_variant(def, value, path, enc, depth + 1)
		}

		builtin::encode(type_name, value, path, enc)
	}

	fn encode_struct(
		&self,
		def: &StructDef,
		value: &Value,
		path: &str,
		enc: &mut Encoder,
		depth: usize,
	) -> Result<()> {
		let object = value
			.as_object()
			.ok_or_else(|| Error::abi(path, format!("expected an object for struct {}", def.name)))?;

		if !def.base.is_empty() {
			let base = self
				.structs
				.get(&def.base)
				.ok_or_else(|| Error::abi(path, format!("unknown base struct {}", def.base)))?;
			self.encode_struct(base, value, path, enc, depth + 1)?;
		}

		for field in &def.fields {
			let field_path = format!("{path}.{}", field.name);
			match object.get(&field.name) {
				Some(field_value) =>
					self.encode_type(&field.type_name, field_value, &field_path, enc, depth + 1)?,
				// trailing binary extensions may be left out
				None if field.type_name.ends_with('$') => return Ok(()),
				None => return Err(Error::abi(field_path, "missing field")),
			}
		}
		Ok(())
	}

	fn encode_variant(
		&self,
		def: &VariantDef,
		value: &Value,
		path: &str,
		enc: &mut Encoder,
		depth: usize,
	) -> Result<()> {
		let (tag, inner) = match value.as_array().map(Vec::as_slice) {
			Some([Value::String(tag), inner]) => (tag, inner),
			_ => return Err(Error::abi(path, "expected a [type, value] pair")),
		};
		let index = def
			.types
			.iter()
			.position(|t| t == tag)
			.ok_or_else(|| Error::abi(path, format!("{tag} is not a case of {}", def.name)))?;
		enc.write_varuint32(index as u32);
		self.encode_type(tag, inner, path, enc, depth + 1)
	}
}
