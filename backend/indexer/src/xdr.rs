//! Reader for the base64 XDR `ScVal`s that `getEvents` returns as topics and
//! event values.
//!
//! Only the value types campaign events can carry are understood; anything
//! else makes the whole value undecodable. Addresses are rendered as strkeys
//! (`G...` accounts, `C...` contracts) so they compare equal to the addresses
//! users see elsewhere.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use serde_json::{Map, Value};

// XDR `SCValType` discriminants.
const SCV_BOOL: u32 = 0;
const SCV_VOID: u32 = 1;
const SCV_U32: u32 = 3;
const SCV_I32: u32 = 4;
const SCV_U64: u32 = 5;
const SCV_I64: u32 = 6;
const SCV_TIMEPOINT: u32 = 7;
const SCV_DURATION: u32 = 8;
const SCV_U128: u32 = 9;
const SCV_I128: u32 = 10;
const SCV_BYTES: u32 = 13;
const SCV_STRING: u32 = 14;
const SCV_SYMBOL: u32 = 15;
const SCV_VEC: u32 = 16;
const SCV_MAP: u32 = 17;
const SCV_ADDRESS: u32 = 18;

// `SCAddressType` and `PublicKeyType` discriminants.
const SC_ADDRESS_ACCOUNT: u32 = 0;
const SC_ADDRESS_CONTRACT: u32 = 1;
const PUBLIC_KEY_ED25519: u32 = 0;

/// Nesting limit for vectors and maps.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScValue {
    Bool(bool),
    Void,
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    U128(u128),
    I128(i128),
    Bytes(Vec<u8>),
    String(String),
    Symbol(String),
    Vec(Vec<ScValue>),
    Map(Vec<(ScValue, ScValue)>),
    Address(String),
}

impl ScValue {
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            ScValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// JSON view of the value. Maps become objects keyed by their symbol
    /// keys; 128-bit integers become decimal strings.
    pub fn into_json(self) -> Value {
        match self {
            ScValue::Bool(b) => Value::Bool(b),
            ScValue::Void => Value::Null,
            ScValue::U32(n) => Value::from(n),
            ScValue::I32(n) => Value::from(n),
            ScValue::U64(n) => Value::from(n),
            ScValue::I64(n) => Value::from(n),
            ScValue::U128(n) => Value::String(n.to_string()),
            ScValue::I128(n) => Value::String(n.to_string()),
            ScValue::Bytes(b) => Value::String(hex::encode(b)),
            ScValue::String(s) | ScValue::Symbol(s) | ScValue::Address(s) => Value::String(s),
            ScValue::Vec(items) => Value::Array(items.into_iter().map(ScValue::into_json).collect()),
            ScValue::Map(entries) => {
                let mut map = Map::new();
                for (key, val) in entries {
                    let key = match key {
                        ScValue::Symbol(s) | ScValue::String(s) => s,
                        other => other.into_json().to_string(),
                    };
                    map.insert(key, val.into_json());
                }
                Value::Object(map)
            }
        }
    }
}

/// Decode one base64 `ScVal`. Trailing bytes make the input invalid.
pub fn decode_base64(raw: &str) -> Option<ScValue> {
    let bytes = BASE64_STANDARD.decode(raw.trim()).ok()?;
    let mut reader = Reader {
        bytes: &bytes,
        pos: 0,
    };
    let value = reader.sc_val(0)?;
    (reader.pos == bytes.len()).then_some(value)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let out = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(out)
    }

    fn u32(&mut self) -> Option<u32> {
        Some(u32::from_be_bytes(self.take(4)?.try_into().ok()?))
    }

    fn u64(&mut self) -> Option<u64> {
        Some(u64::from_be_bytes(self.take(8)?.try_into().ok()?))
    }

    fn fixed32(&mut self) -> Option<[u8; 32]> {
        self.take(32)?.try_into().ok()
    }

    /// Variable-length opaque data, padded to a multiple of four bytes.
    fn opaque(&mut self) -> Option<&'a [u8]> {
        let len = self.u32()? as usize;
        let body = self.take(len)?;
        self.take((4 - len % 4) % 4)?;
        Some(body)
    }

    fn text(&mut self) -> Option<String> {
        String::from_utf8(self.opaque()?.to_vec()).ok()
    }

    fn sc_val(&mut self, depth: usize) -> Option<ScValue> {
        if depth > MAX_DEPTH {
            return None;
        }
        let value = match self.u32()? {
            SCV_BOOL => ScValue::Bool(self.u32()? != 0),
            SCV_VOID => ScValue::Void,
            SCV_U32 => ScValue::U32(self.u32()?),
            SCV_I32 => ScValue::I32(self.u32()? as i32),
            SCV_U64 | SCV_TIMEPOINT | SCV_DURATION => ScValue::U64(self.u64()?),
            SCV_I64 => ScValue::I64(self.u64()? as i64),
            SCV_U128 => {
                let hi = self.u64()?;
                let lo = self.u64()?;
                ScValue::U128((u128::from(hi) << 64) | u128::from(lo))
            }
            SCV_I128 => {
                let hi = self.u64()? as i64;
                let lo = self.u64()?;
                ScValue::I128((i128::from(hi) << 64) | i128::from(lo))
            }
            SCV_BYTES => ScValue::Bytes(self.opaque()?.to_vec()),
            SCV_STRING => ScValue::String(self.text()?),
            SCV_SYMBOL => ScValue::Symbol(self.text()?),
            SCV_VEC => {
                let mut items = Vec::new();
                if self.u32()? != 0 {
                    for _ in 0..self.u32()? {
                        items.push(self.sc_val(depth + 1)?);
                    }
                }
                ScValue::Vec(items)
            }
            SCV_MAP => {
                let mut entries = Vec::new();
                if self.u32()? != 0 {
                    for _ in 0..self.u32()? {
                        let key = self.sc_val(depth + 1)?;
                        let val = self.sc_val(depth + 1)?;
                        entries.push((key, val));
                    }
                }
                ScValue::Map(entries)
            }
            SCV_ADDRESS => ScValue::Address(self.address()?),
            _ => return None,
        };
        Some(value)
    }

    fn address(&mut self) -> Option<String> {
        match self.u32()? {
            SC_ADDRESS_ACCOUNT => {
                if self.u32()? != PUBLIC_KEY_ED25519 {
                    return None;
                }
                Some(stellar_strkey::ed25519::PublicKey(self.fixed32()?).to_string())
            }
            SC_ADDRESS_CONTRACT => Some(stellar_strkey::Contract(self.fixed32()?).to_string()),
            _ => None,
        }
    }
}
