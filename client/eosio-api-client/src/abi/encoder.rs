use crate::Name;

/// Little endian byte sink matching the chain's binary layout.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
	buf: Vec<u8>,
}

impl Encoder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}

	pub fn write_raw(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	pub fn write_u8(&mut self, v: u8) {
		self.buf.push(v);
	}

	pub fn write_u16(&mut self, v: u16) {
		self.write_raw(&v.to_le_bytes());
	}

	pub fn write_u32(&mut self, v: u32) {
		self.write_raw(&v.to_le_bytes());
	}

	pub fn write_u64(&mut self, v: u64) {
		self.write_raw(&v.to_le_bytes());
	}

	pub fn write_i64(&mut self, v: i64) {
		self.write_raw(&v.to_le_bytes());
	}

	pub fn write_varuint32(&mut self, mut v: u32) {
		loop {
			let mut byte = (v & 0x7f) as u8;
			v >>= 7;
			if v > 0 {
				byte |= 0x80;
			}
			self.buf.push(byte);
			if v == 0 {
				break
			}
		}
	}

	pub fn write_varint32(&mut self, v: i32) {
		// zigzag
		self.write_varuint32(((v << 1) ^ (v >> 31)) as u32);
	}

	/// Length prefixed byte string.
	pub fn write_bytes(&mut self, bytes: &[u8]) {
		self.write_varuint32(bytes.len() as u32);
		self.write_raw(bytes);
	}

	pub fn write_string(&mut self, s: &str) {
		self.write_bytes(s.as_bytes());
	}

	pub fn write_name(&mut self, name: Name) {
		self.write_u64(name.as_u64());
	}
}
