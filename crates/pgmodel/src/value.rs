//! Dynamic SQL values.
//!
//! Model fields, statement arguments and decoded rows all carry [`Value`],
//! which binds to whatever parameter type the server reports for a `$n`
//! placeholder.

use std::error::Error;
use std::fmt;

use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type};
use uuid::Uuid;

#[cfg(feature = "bit_vec")]
use bit_vec::BitVec;
#[cfg(feature = "cidr")]
use cidr::{IpCidr, IpInet};
#[cfg(feature = "eui48")]
use eui48::MacAddress;
#[cfg(feature = "rust_decimal")]
use rust_decimal::Decimal;

/// A dynamically-typed SQL value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value, narrowed on encode to the parameter's width
    Int(i64),

    /// Floating point value
    Float(f64),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// UUID
    Uuid(Uuid),

    /// JSON document (json or jsonb)
    Json(serde_json::Value),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Timestamp without time zone
    Timestamp(NaiveDateTime),

    /// Timestamp with time zone, normalized to UTC
    TimestampTz(DateTime<Utc>),

    /// Time of day with a UTC offset
    TimeTz(TimeTz),

    /// Interval in months, days and microseconds
    Interval(Interval),

    /// One-dimensional array; elements may be NULL
    Array(Vec<Value>),

    /// Arbitrary precision numeric
    #[cfg(feature = "rust_decimal")]
    Decimal(#[serde(with = "as_string")] Decimal),

    /// Host address with optional netmask (`inet`)
    #[cfg(feature = "cidr")]
    Inet(#[serde(with = "as_string")] IpInet),

    /// Network address (`cidr`)
    #[cfg(feature = "cidr")]
    Cidr(#[serde(with = "as_string")] IpCidr),

    /// MAC address (`macaddr`)
    #[cfg(feature = "eui48")]
    MacAddr(#[serde(with = "mac_string")] MacAddress),

    /// Bit string (`bit` or `varbit`)
    #[cfg(feature = "bit_vec")]
    Bits(#[serde(with = "bit_string")] BitVec),
}

/// A PostgreSQL `interval`, kept as the three fields the server stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}

impl Interval {
    pub fn new(months: i32, days: i32, microseconds: i64) -> Self {
        Self {
            months,
            days,
            microseconds,
        }
    }

    fn encode(&self, out: &mut BytesMut) {
        out.extend_from_slice(&self.microseconds.to_be_bytes());
        out.extend_from_slice(&self.days.to_be_bytes());
        out.extend_from_slice(&self.months.to_be_bytes());
    }

    fn decode(raw: &[u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        if raw.len() != 16 {
            return Err(format!("invalid interval length {}", raw.len()).into());
        }
        Ok(Self {
            microseconds: i64::from_be_bytes(raw[..8].try_into()?),
            days: i32::from_be_bytes(raw[8..12].try_into()?),
            months: i32::from_be_bytes(raw[12..].try_into()?),
        })
    }
}

impl From<TimeDelta> for Interval {
    fn from(delta: TimeDelta) -> Self {
        // days stay in the microsecond field, as `interval '36 hours'` does
        Self::new(0, 0, delta.num_microseconds().unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Interval {
    /// ISO 8601 duration, e.g. `P1M2DT3.5S`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.microseconds < 0 { "-" } else { "" };
        let micros = self.microseconds.unsigned_abs();
        write!(
            f,
            "P{}M{}DT{sign}{}",
            self.months,
            self.days,
            micros / 1_000_000
        )?;
        let frac = micros % 1_000_000;
        if frac != 0 {
            let digits = format!("{frac:06}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        f.write_str("S")
    }
}

/// A PostgreSQL `timetz`: a time of day and its offset east of UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTz {
    pub time: NaiveTime,
    pub offset_seconds: i32,
}

impl TimeTz {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            time,
            offset_seconds: offset.local_minus_utc(),
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.offset_seconds)
    }

    // The server counts the zone in seconds west of UTC.
    fn encode(&self, out: &mut BytesMut) {
        let micros = i64::from(self.time.num_seconds_from_midnight()) * 1_000_000
            + i64::from(self.time.nanosecond() / 1_000);
        out.extend_from_slice(&micros.to_be_bytes());
        out.extend_from_slice(&(-self.offset_seconds).to_be_bytes());
    }

    fn decode(raw: &[u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        if raw.len() != 12 {
            return Err(format!("invalid timetz length {}", raw.len()).into());
        }
        let micros = i64::from_be_bytes(raw[..8].try_into()?);
        Ok(Self {
            time: NaiveTime::default() + TimeDelta::microseconds(micros),
            offset_seconds: -i32::from_be_bytes(raw[8..].try_into()?),
        })
    }
}

impl fmt::Display for TimeTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.offset_seconds < 0 { '-' } else { '+' };
        let secs = self.offset_seconds.unsigned_abs();
        write!(f, "{}{sign}{:02}:{:02}", self.time, secs / 3600, secs % 3600 / 60)
    }
}

#[cfg(any(feature = "rust_decimal", feature = "cidr"))]
mod as_string {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(feature = "eui48")]
mod mac_string {
    use eui48::MacAddress;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(mac: &MacAddress, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&mac.to_hex_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MacAddress, D::Error> {
        let s = String::deserialize(deserializer)?;
        MacAddress::parse_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(feature = "bit_vec")]
mod bit_string {
    use bit_vec::BitVec;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bits: &BitVec, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::bits_to_string(bits))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BitVec, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bits = BitVec::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => return Err(de::Error::custom(format!("invalid bit '{other}'"))),
            }
        }
        Ok(bits)
    }
}

#[cfg(feature = "bit_vec")]
fn bits_to_string(bits: &BitVec) -> String {
    bits.iter().map(|b| if b { '1' } else { '0' }).collect()
}

impl Value {
    /// Returns `true` for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness, as used when filtering WHERE pairs.
    ///
    /// NULL, `false`, zero, and empty text/bytes/JSON containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Text(v) => !v.is_empty(),
            Value::Bytes(v) => !v.is_empty(),
            Value::Json(v) => match v {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                serde_json::Value::String(s) => !s.is_empty(),
                serde_json::Value::Array(a) => !a.is_empty(),
                serde_json::Value::Object(o) => !o.is_empty(),
            },
            Value::Array(v) => !v.is_empty(),
            Value::Interval(v) => *v != Interval::default(),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => !v.is_zero(),
            #[cfg(feature = "bit_vec")]
            Value::Bits(v) => !v.is_empty(),
            _ => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    #[cfg(feature = "rust_decimal")]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            Value::Int(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    /// Render for model descriptions: text is single-quoted, everything else
    /// uses [`Display`](fmt::Display).
    pub fn repr(&self) -> String {
        match self {
            Value::Text(v) => format!("'{v}'"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => {
                f.write_str("\\x")?;
                for b in v {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{v}"),
            Value::TimeTz(v) => write!(f, "{v}"),
            Value::Interval(v) => write!(f, "{v}"),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => write!(f, "{v}"),
            #[cfg(feature = "cidr")]
            Value::Inet(v) => write!(f, "{v}"),
            #[cfg(feature = "cidr")]
            Value::Cidr(v) => write!(f, "{v}"),
            #[cfg(feature = "eui48")]
            Value::MacAddr(v) => f.write_str(&v.to_hex_string()),
            #[cfg(feature = "bit_vec")]
            Value::Bits(v) => f.write_str(&bits_to_string(v)),
        }
    }
}

// ===== conversions =====

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    serde_json::Value => Json,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    TimeTz => TimeTz,
    Interval => Interval,
    Vec<Value> => Array,
}

#[cfg(feature = "rust_decimal")]
impl_from! { Decimal => Decimal }

#[cfg(feature = "cidr")]
impl_from! { IpInet => Inet, IpCidr => Cidr }

#[cfg(feature = "eui48")]
impl_from! { MacAddress => MacAddr }

#[cfg(feature = "bit_vec")]
impl_from! { BitVec => Bits }

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ===== postgres binding =====

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if let Kind::Domain(inner) = ty.kind() {
            return self.to_sql(inner, out);
        }
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::OID => u32::try_from(*v)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql_checked(ty, out),
                // money travels as an integer count of the currency's minor unit
                Type::MONEY => write_raw(&v.to_be_bytes(), out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => Decimal::from(*v).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Text(v) => match *ty {
                Type::XML => write_raw(v.as_bytes(), out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => v.parse::<Decimal>()?.to_sql_checked(ty, out),
                #[cfg(feature = "cidr")]
                Type::INET => v.parse::<IpInet>()?.to_sql_checked(ty, out),
                #[cfg(feature = "cidr")]
                Type::CIDR => v.parse::<IpCidr>()?.to_sql_checked(ty, out),
                _ if matches!(ty.kind(), Kind::Enum(_)) => write_raw(v.as_bytes(), out),
                _ => v.to_sql_checked(ty, out),
            },
            // Bytes bound to a type without a variant are its raw wire form,
            // as decoded by `FromSql`.
            Value::Bytes(v) if !has_variant(ty) => write_raw(v, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Time(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::TimestampTz(v) => v.to_sql_checked(ty, out),
            Value::TimeTz(v) => match *ty {
                Type::TIMETZ => {
                    v.encode(out);
                    Ok(IsNull::No)
                }
                _ => Err(cannot_encode("timetz", ty)),
            },
            Value::Interval(v) => match *ty {
                Type::INTERVAL => {
                    v.encode(out);
                    Ok(IsNull::No)
                }
                _ => Err(cannot_encode("interval", ty)),
            },
            Value::Array(v) => v.to_sql_checked(ty, out),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => v.to_sql_checked(ty, out),
            #[cfg(feature = "cidr")]
            Value::Inet(v) => v.to_sql_checked(ty, out),
            #[cfg(feature = "cidr")]
            Value::Cidr(v) => v.to_sql_checked(ty, out),
            #[cfg(feature = "eui48")]
            Value::MacAddr(v) => v.to_sql_checked(ty, out),
            #[cfg(feature = "bit_vec")]
            Value::Bits(v) => v.to_sql_checked(ty, out),
        }
    }

    // Every variant checks the concrete parameter type itself.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::CHAR => Value::Int(i8::from_sql(ty, raw)?.into()),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::MONEY => Value::Int(i64::from_be_bytes(raw.try_into()?)),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN | Type::XML => {
                Value::Text(String::from_utf8(raw.to_vec())?)
            }
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::TIME => Value::Time(NaiveTime::from_sql(ty, raw)?),
            Type::TIMETZ => Value::TimeTz(TimeTz::decode(raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::INTERVAL => Value::Interval(Interval::decode(raw)?),
            #[cfg(feature = "rust_decimal")]
            Type::NUMERIC => Value::Decimal(Decimal::from_sql(ty, raw)?),
            #[cfg(feature = "cidr")]
            Type::INET => Value::Inet(IpInet::from_sql(ty, raw)?),
            #[cfg(feature = "cidr")]
            Type::CIDR => Value::Cidr(IpCidr::from_sql(ty, raw)?),
            #[cfg(feature = "eui48")]
            Type::MACADDR => Value::MacAddr(MacAddress::from_sql(ty, raw)?),
            #[cfg(feature = "bit_vec")]
            Type::BIT | Type::VARBIT => Value::Bits(BitVec::from_sql(ty, raw)?),
            _ => match ty.kind() {
                Kind::Array(_) => Value::Array(Vec::<Value>::from_sql(ty, raw)?),
                Kind::Domain(inner) => Value::from_sql(inner, raw)?,
                Kind::Enum(_) => Value::Text(String::from_utf8(raw.to_vec())?),
                // ranges, geometry and extension types stay in wire form
                _ => Value::Bytes(raw.to_vec()),
            },
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Value::Null)
    }

    // Types without a variant decode to their raw bytes instead of failing
    // the row.
    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Whether `FromSql` decodes `ty` into a dedicated variant rather than raw
/// bytes.
fn has_variant(ty: &Type) -> bool {
    if matches!(ty.kind(), Kind::Array(_) | Kind::Domain(_) | Kind::Enum(_)) {
        return true;
    }
    match *ty {
        Type::BOOL
        | Type::CHAR
        | Type::INT2
        | Type::INT4
        | Type::INT8
        | Type::OID
        | Type::MONEY
        | Type::FLOAT4
        | Type::FLOAT8
        | Type::TEXT
        | Type::VARCHAR
        | Type::BPCHAR
        | Type::NAME
        | Type::UNKNOWN
        | Type::XML
        | Type::BYTEA
        | Type::UUID
        | Type::JSON
        | Type::JSONB
        | Type::DATE
        | Type::TIME
        | Type::TIMETZ
        | Type::TIMESTAMP
        | Type::TIMESTAMPTZ
        | Type::INTERVAL => true,
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => true,
        #[cfg(feature = "cidr")]
        Type::INET | Type::CIDR => true,
        #[cfg(feature = "eui48")]
        Type::MACADDR => true,
        #[cfg(feature = "bit_vec")]
        Type::BIT | Type::VARBIT => true,
        _ => false,
    }
}

fn write_raw(bytes: &[u8], out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    out.extend_from_slice(bytes);
    Ok(IsNull::No)
}

fn cannot_encode(what: &str, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot encode {what} as {ty}").into()
}

// ===== ordered keyword values =====

/// An insertion-ordered map of names to values.
///
/// Names may be attribute names or column keys; the statement builder
/// resolves them against the bound model. Re-inserting a name replaces its
/// value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn extend_from(&mut self, other: ValueMap) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build a [`ValueMap`] from `name => value` pairs.
///
/// ```ignore
/// let filters = pgmodel::values! { "id" => 123, "name" => "alice" };
/// ```
#[macro_export]
macro_rules! values {
    () => {
        $crate::ValueMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $( map.insert($name, $value); )+
        map
    }};
}
