//! secp256k1 (`K1`) keys and signatures in their chain string encodings.
//!
//! Private keys are accepted as legacy WIF or `PVT_K1_`. Public keys print in
//! the legacy `EOS` form and parse from both `EOS` and `PUB_K1_`. Signatures
//! are always `SIG_K1_`.

use crate::{Error, Result};
use k256::ecdsa::{
	signature::hazmat::RandomizedPrehashSigner, RecoveryId, Signature as EcdsaSignature,
	SigningKey, VerifyingKey,
};
use log::debug;
use rand::rngs::OsRng;
use ripemd::Ripemd160;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{fmt, str::FromStr};

const LEGACY_PUBLIC_PREFIX: &str = "EOS";
const K1_PUBLIC_PREFIX: &str = "PUB_K1_";
const K1_PRIVATE_PREFIX: &str = "PVT_K1_";
const K1_SIGNATURE_PREFIX: &str = "SIG_K1_";
const WIF_VERSION: u8 = 0x80;
const K1_SUFFIX: &[u8] = b"K1";

/// Upper bound on re-signing attempts while looking for a canonical signature.
const MAX_SIGNING_ATTEMPTS: usize = 64;

/// Key type tag used by the binary encoding of keys and signatures.
pub const KEY_TYPE_K1: u8 = 0;

fn ripemd160_checksum(data: &[u8], suffix: &[u8]) -> [u8; 4] {
	let mut hasher = Ripemd160::new();
	hasher.update(data);
	hasher.update(suffix);
	let digest = hasher.finalize();
	[digest[0], digest[1], digest[2], digest[3]]
}

fn double_sha256_checksum(data: &[u8]) -> [u8; 4] {
	let digest = Sha256::digest(Sha256::digest(data));
	[digest[0], digest[1], digest[2], digest[3]]
}

fn encode_with_checksum(data: &[u8], checksum: [u8; 4]) -> String {
	let mut buf = Vec::with_capacity(data.len() + 4);
	buf.extend_from_slice(data);
	buf.extend_from_slice(&checksum);
	bs58::encode(buf).into_string()
}

/// Decodes base58 and splits off a trailing 4 byte checksum.
fn decode_with_checksum(encoded: &str, expected_len: usize) -> Result<(Vec<u8>, [u8; 4])> {
	let mut raw = bs58::decode(encoded)
		.into_vec()
		.map_err(|e| Error::InvalidKey(format!("base58: {e}")))?;
	if raw.len() != expected_len + 4 {
		return Err(Error::InvalidKey(format!(
			"expected {} bytes, got {}",
			expected_len + 4,
			raw.len()
		)))
	}
	let tail = raw.split_off(expected_len);
	Ok((raw, [tail[0], tail[1], tail[2], tail[3]]))
}

pub struct PrivateKey(SigningKey);

impl PrivateKey {
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		SigningKey::from_slice(bytes).map(PrivateKey).map_err(|e| Error::InvalidKey(e.to_string()))
	}

	pub fn public_key(&self) -> PublicKey {
		PublicKey(self.0.verifying_key().clone())
	}

	pub fn to_wif(&self) -> String {
		let mut payload = Vec::with_capacity(33);
		payload.push(WIF_VERSION);
		payload.extend_from_slice(&self.0.to_bytes());
		let checksum = double_sha256_checksum(&payload);
		encode_with_checksum(&payload, checksum)
	}

	/// Signs a 32 byte digest, producing a signature the chain accepts as canonical.
	pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature> {
		let sig_err = |e: k256::ecdsa::Error| Error::InvalidSignature(e.to_string());
		let mut attempt = 0;
		loop {
			// deterministic on the first try, extra entropy afterwards
			let sig: EcdsaSignature = if attempt == 0 {
				self.0.sign_prehash_recoverable(digest).map_err(sig_err)?.0
			} else {
				self.0.sign_prehash_with_rng(&mut OsRng, digest).map_err(sig_err)?
			};
			let sig = sig.normalize_s().unwrap_or(sig);
			let recid = RecoveryId::trial_recovery_from_prehash(self.0.verifying_key(), digest, &sig)
				.map_err(sig_err)?;

			let signature = Signature::from_parts(&sig, recid);
			if signature.is_canonical() {
				return Ok(signature)
			}
			attempt += 1;
			debug!("signature not canonical, retrying (attempt {attempt})");
			if attempt >= MAX_SIGNING_ATTEMPTS {
				return Err(Error::InvalidSignature("no canonical signature found".into()))
			}
		}
	}
}

impl FromStr for PrivateKey {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		if let Some(encoded) = s.strip_prefix(K1_PRIVATE_PREFIX) {
			let (key, checksum) = decode_with_checksum(encoded, 32)?;
			if ripemd160_checksum(&key, K1_SUFFIX) != checksum {
				return Err(Error::InvalidKey("checksum mismatch".into()))
			}
			return PrivateKey::from_bytes(&key)
		}

		let (payload, checksum) = decode_with_checksum(s, 33)?;
		if payload[0] != WIF_VERSION {
			return Err(Error::InvalidKey(format!("unexpected wif version {:#x}", payload[0])))
		}
		if double_sha256_checksum(&payload) != checksum {
			return Err(Error::InvalidKey("checksum mismatch".into()))
		}
		PrivateKey::from_bytes(&payload[1..])
	}
}

impl fmt::Debug for PrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PrivateKey({})", self.public_key())
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
	/// SEC1 compressed point.
	pub fn to_bytes(&self) -> [u8; 33] {
		let point = self.0.to_encoded_point(true);
		let mut out = [0u8; 33];
		out.copy_from_slice(point.as_bytes());
		out
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		VerifyingKey::from_sec1_bytes(bytes)
			.map(PublicKey)
			.map_err(|e| Error::InvalidKey(e.to_string()))
	}

	pub fn to_k1_string(&self) -> String {
		let bytes = self.to_bytes();
		format!("{K1_PUBLIC_PREFIX}{}", encode_with_checksum(&bytes, ripemd160_checksum(&bytes, K1_SUFFIX)))
	}

	pub fn to_legacy_string(&self) -> String {
		let bytes = self.to_bytes();
		format!("{LEGACY_PUBLIC_PREFIX}{}", encode_with_checksum(&bytes, ripemd160_checksum(&bytes, &[])))
	}
}

impl FromStr for PublicKey {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		let (encoded, suffix) = if let Some(rest) = s.strip_prefix(K1_PUBLIC_PREFIX) {
			(rest, K1_SUFFIX)
		} else if let Some(rest) = s.strip_prefix(LEGACY_PUBLIC_PREFIX) {
			(rest, &[][..])
		} else {
			return Err(Error::InvalidKey(format!("unsupported public key format `{s}`")))
		};
		let (bytes, checksum) = decode_with_checksum(encoded, 33)?;
		if ripemd160_checksum(&bytes, suffix) != checksum {
			return Err(Error::InvalidKey("checksum mismatch".into()))
		}
		PublicKey::from_bytes(&bytes)
	}
}

impl fmt::Display for PublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_legacy_string())
	}
}

impl Serialize for PublicKey {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for PublicKey {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

/// Compact recoverable signature: recovery byte followed by `r` and `s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; 65]);

impl Signature {
	fn from_parts(sig: &EcdsaSignature, recid: RecoveryId) -> Self {
		let mut out = [0u8; 65];
		// 27 marks a recoverable signature, +4 a compressed public key
		out[0] = 27 + 4 + recid.to_byte();
		out[1..].copy_from_slice(&sig.to_bytes());
		Signature(out)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let bytes: [u8; 65] = bytes
			.try_into()
			.map_err(|_| Error::InvalidSignature(format!("expected 65 bytes, got {}", bytes.len())))?;
		Ok(Signature(bytes))
	}

	pub fn as_bytes(&self) -> &[u8; 65] {
		&self.0
	}

	/// The chain rejects signatures whose `r` or `s` are not minimally encoded.
	pub fn is_canonical(&self) -> bool {
		let c = &self.0;
		c[1] & 0x80 == 0 &&
			!(c[1] == 0 && c[2] & 0x80 == 0) &&
			c[33] & 0x80 == 0 &&
			!(c[33] == 0 && c[34] & 0x80 == 0)
	}

	/// Recovers the public key that produced this signature over `digest`.
	pub fn recover(&self, digest: &[u8; 32]) -> Result<PublicKey> {
		let recid = self.0[0]
			.checked_sub(27 + 4)
			.and_then(RecoveryId::from_byte)
			.ok_or_else(|| Error::InvalidSignature("bad recovery byte".into()))?;
		let sig = EcdsaSignature::from_slice(&self.0[1..])
			.map_err(|e| Error::InvalidSignature(e.to_string()))?;
		VerifyingKey::recover_from_prehash(digest, &sig, recid)
			.map(PublicKey)
			.map_err(|e| Error::InvalidSignature(e.to_string()))
	}
}

impl FromStr for Signature {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let encoded = s
			.trim()
			.strip_prefix(K1_SIGNATURE_PREFIX)
			.ok_or_else(|| Error::InvalidSignature(format!("unsupported format `{s}`")))?;
		let (bytes, checksum) = decode_with_checksum(encoded, 65)
			.map_err(|e| Error::InvalidSignature(e.to_string()))?;
		if ripemd160_checksum(&bytes, K1_SUFFIX) != checksum {
			return Err(Error::InvalidSignature("checksum mismatch".into()))
		}
		Signature::from_bytes(&bytes)
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{K1_SIGNATURE_PREFIX}{}",
			encode_with_checksum(&self.0, ripemd160_checksum(&self.0, K1_SUFFIX))
		)
	}
}

impl Serialize for Signature {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}
