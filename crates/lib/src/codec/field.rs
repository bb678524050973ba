//! Per-type Riak representations.
//!
//! Scalar Registers are read leniently: a stored value that does not parse as the
//! field's type leaves the field unchanged. Set members and map entries are read
//! strictly and fail the decode instead.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::Result;
use crate::codec::timestamp;
use crate::codec::{CodecError, Decoder, EncodeMode, Encoder};
use crate::handle::{Handle, HandleKind};

/// The Riak Map entry type a field is stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Register,
    Counter,
    Set,
    Flag,
    Map,
    /// No Riak representation; carries the name of the offending type.
    Unsupported(&'static str),
}

impl From<HandleKind> for FieldKind {
    fn from(kind: HandleKind) -> Self {
        match kind {
            HandleKind::Counter => FieldKind::Counter,
            HandleKind::Set => FieldKind::Set,
            HandleKind::Flag => FieldKind::Flag,
            HandleKind::Register => FieldKind::Register,
        }
    }
}

/// A struct field that can be stored in a Riak Map.
pub trait Field {
    /// The Riak entry type this field is stored as.
    fn kind() -> FieldKind
    where
        Self: Sized;

    /// Emit the operations storing this value under `name`.
    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Like [`encode`](Field::encode), but may bind handles inside the value.
    fn encode_mut(&mut self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        self.encode(name, encoder)
    }

    /// Update this value from the entry `name`. A missing entry leaves it unchanged.
    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()>;

    /// Build a value from the entry `name`, failing on data that does not parse.
    ///
    /// Used for the values of map fields.
    fn decode_entry(name: &str, decoder: &Decoder<'_>) -> Result<Self>
    where
        Self: Sized + Default,
    {
        let mut value = Self::default();
        value.decode(name, decoder)?;
        Ok(value)
    }
}

/// How an element type behaves inside a `Vec` or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementShape {
    /// A single byte; the collection is a Register.
    Byte,
    /// One Set member per element.
    Scalar,
    /// A byte collection; one Set member per element.
    Nested,
    /// Not storable.
    Unsupported,
}

/// A type that can appear inside a `Vec` or fixed-size array field.
pub trait Element: Sized {
    const SHAPE: ElementShape;
    /// Type name used in error messages.
    const KIND: &'static str;

    fn to_byte(&self) -> Option<u8> {
        None
    }

    fn from_byte(_byte: u8) -> Option<Self> {
        None
    }

    /// The Set member for this element.
    fn to_member(&self, field: &str) -> Result<Vec<u8>>;

    /// Read an element back from a Set member.
    fn from_member(field: &str, member: &[u8]) -> Result<Self>;
}

/// A type usable as the key of a map field. Keys are stored as entry names.
pub trait MapKey: Sized {
    /// Type name used in error messages.
    const KIND: &'static str;

    fn to_key(&self) -> String;

    fn from_key(key: &str) -> Option<Self>;
}

fn parse_integer<T: std::str::FromStr>(bytes: &[u8]) -> Option<T> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn invalid_integer(field: &str, bytes: &[u8]) -> crate::Error {
    CodecError::InvalidInteger {
        field: field.to_string(),
        value: String::from_utf8_lossy(bytes).into_owned(),
    }
    .into()
}

macro_rules! integer_field {
    ($($ty:ty),* $(,)?) => {$(
        impl Field for $ty {
            fn kind() -> FieldKind {
                FieldKind::Register
            }

            fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
                encoder.node().set_register(name, self.to_string());
                Ok(())
            }

            fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
                if let Some(bytes) = decoder.register(name) {
                    match parse_integer(bytes) {
                        Some(value) => *self = value,
                        None => warn!(
                            field = name,
                            path = %decoder.path(),
                            kind = stringify!($ty),
                            "Ignoring register that does not parse as an integer"
                        ),
                    }
                }
                Ok(())
            }

            fn decode_entry(name: &str, decoder: &Decoder<'_>) -> Result<Self> {
                let bytes = decoder.register(name).unwrap_or_default();
                parse_integer(bytes).ok_or_else(|| invalid_integer(name, bytes))
            }
        }

        impl MapKey for $ty {
            const KIND: &'static str = stringify!($ty);

            fn to_key(&self) -> String {
                self.to_string()
            }

            fn from_key(key: &str) -> Option<Self> {
                key.parse().ok()
            }
        }
    )*};
}

integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! integer_element {
    ($($ty:ty),* $(,)?) => {$(
        impl Element for $ty {
            const SHAPE: ElementShape = ElementShape::Scalar;
            const KIND: &'static str = stringify!($ty);

            fn to_member(&self, _field: &str) -> Result<Vec<u8>> {
                Ok(self.to_string().into_bytes())
            }

            fn from_member(field: &str, member: &[u8]) -> Result<Self> {
                parse_integer(member).ok_or_else(|| invalid_integer(field, member))
            }
        }
    )*};
}

integer_element!(i8, i16, i32, i64, isize, u16, u32, u64, usize);

impl Element for u8 {
    const SHAPE: ElementShape = ElementShape::Byte;
    const KIND: &'static str = "u8";

    fn to_byte(&self) -> Option<u8> {
        Some(*self)
    }

    fn from_byte(byte: u8) -> Option<Self> {
        Some(byte)
    }

    fn to_member(&self, _field: &str) -> Result<Vec<u8>> {
        Ok(vec![*self])
    }

    fn from_member(field: &str, member: &[u8]) -> Result<Self> {
        match member {
            [byte] => Ok(*byte),
            _ => Err(CodecError::ArrayLength {
                field: field.to_string(),
                expected: 1,
                actual: member.len(),
            }
            .into()),
        }
    }
}

impl Field for String {
    fn kind() -> FieldKind {
        FieldKind::Register
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.node().set_register(name, self.as_bytes());
        Ok(())
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        if let Some(bytes) = decoder.register(name) {
            match std::str::from_utf8(bytes) {
                Ok(text) => *self = text.to_string(),
                Err(_) => warn!(
                    field = name,
                    path = %decoder.path(),
                    "Ignoring register that is not valid UTF-8"
                ),
            }
        }
        Ok(())
    }

    fn decode_entry(name: &str, decoder: &Decoder<'_>) -> Result<Self> {
        let bytes = decoder.register(name).unwrap_or_default();
        String::from_member(name, bytes)
    }
}

impl Element for String {
    const SHAPE: ElementShape = ElementShape::Scalar;
    const KIND: &'static str = "String";

    fn to_member(&self, _field: &str) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }

    fn from_member(field: &str, member: &[u8]) -> Result<Self> {
        String::from_utf8(member.to_vec()).map_err(|_| {
            CodecError::InvalidText {
                field: field.to_string(),
            }
            .into()
        })
    }
}

impl MapKey for String {
    const KIND: &'static str = "String";

    fn to_key(&self) -> String {
        self.clone()
    }

    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

impl Field for bool {
    fn kind() -> FieldKind {
        FieldKind::Flag
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.node().set_flag(name, *self);
        Ok(())
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        if let Some(value) = decoder.flag(name) {
            *self = value;
        }
        Ok(())
    }
}

impl Field for DateTime<Utc> {
    fn kind() -> FieldKind {
        FieldKind::Register
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.node().set_register(name, timestamp::to_binary(self));
        Ok(())
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        if let Some(bytes) = decoder.register(name) {
            *self = timestamp::from_binary(bytes).map_err(|reason| CodecError::InvalidTimestamp {
                field: name.to_string(),
                reason,
            })?;
        }
        Ok(())
    }
}

// Types without a Riak representation. They compile as fields so that the failure
// names the field and the type.
macro_rules! unsupported {
    ($($ty:ty => $kind:literal),* $(,)?) => {$(
        impl Field for $ty {
            fn kind() -> FieldKind {
                FieldKind::Unsupported($kind)
            }

            fn encode(&self, name: &str, _encoder: &mut Encoder<'_>) -> Result<()> {
                Err(CodecError::UnexpectedFieldKind {
                    field: name.to_string(),
                    kind: $kind.to_string(),
                }
                .into())
            }

            fn decode(&mut self, name: &str, _decoder: &Decoder<'_>) -> Result<()> {
                Err(CodecError::UnknownFieldKind {
                    field: name.to_string(),
                    kind: $kind.to_string(),
                }
                .into())
            }
        }
    )*};
}

unsupported!(f32 => "f32", f64 => "f64", char => "char");

macro_rules! unsupported_element {
    ($($ty:ty => $kind:literal),* $(,)?) => {$(
        impl Element for $ty {
            const SHAPE: ElementShape = ElementShape::Unsupported;
            const KIND: &'static str = $kind;

            fn to_member(&self, field: &str) -> Result<Vec<u8>> {
                Err(CodecError::UnexpectedFieldKind {
                    field: field.to_string(),
                    kind: $kind.to_string(),
                }
                .into())
            }

            fn from_member(field: &str, _member: &[u8]) -> Result<Self> {
                Err(CodecError::UnknownFieldKind {
                    field: field.to_string(),
                    kind: $kind.to_string(),
                }
                .into())
            }
        }
    )*};
}

unsupported_element!(bool => "bool", f32 => "f32", f64 => "f64", char => "char");

fn to_bytes<E: Element>(elements: &[E]) -> Vec<u8> {
    elements.iter().filter_map(Element::to_byte).collect()
}

/// Collect the bytes of a byte collection used as a Set member.
fn nested_member<E: Element>(field: &str, elements: &[E]) -> Result<Vec<u8>> {
    if E::SHAPE != ElementShape::Byte {
        return Err(CodecError::UnsupportedNestedSliceKind {
            field: field.to_string(),
            kind: E::KIND.to_string(),
        }
        .into());
    }
    Ok(to_bytes(elements))
}

fn unsupported_nested<E: Element>(field: &str) -> crate::Error {
    CodecError::UnsupportedNestedSliceKind {
        field: field.to_string(),
        kind: E::KIND.to_string(),
    }
    .into()
}

impl<E: Element> Element for Vec<E> {
    const SHAPE: ElementShape = ElementShape::Nested;
    const KIND: &'static str = "Vec";

    fn to_member(&self, field: &str) -> Result<Vec<u8>> {
        nested_member(field, self)
    }

    fn from_member(field: &str, member: &[u8]) -> Result<Self> {
        if E::SHAPE != ElementShape::Byte {
            return Err(unsupported_nested::<E>(field));
        }
        Ok(member.iter().filter_map(|byte| E::from_byte(*byte)).collect())
    }
}

impl<E: Element + Default, const N: usize> Element for [E; N] {
    const SHAPE: ElementShape = ElementShape::Nested;
    const KIND: &'static str = "array";

    fn to_member(&self, field: &str) -> Result<Vec<u8>> {
        nested_member(field, self)
    }

    fn from_member(field: &str, member: &[u8]) -> Result<Self> {
        if E::SHAPE != ElementShape::Byte {
            return Err(unsupported_nested::<E>(field));
        }
        byte_array(field, member)
    }
}

fn byte_array<E: Element + Default, const N: usize>(field: &str, bytes: &[u8]) -> Result<[E; N]> {
    if bytes.len() != N {
        return Err(CodecError::ArrayLength {
            field: field.to_string(),
            expected: N,
            actual: bytes.len(),
        }
        .into());
    }
    Ok(std::array::from_fn(|i| E::from_byte(bytes[i]).unwrap_or_default()))
}

/// `Vec<u8>` is a Register; other vectors are Sets.
impl<E: Element> Field for Vec<E> {
    fn kind() -> FieldKind {
        match E::SHAPE {
            ElementShape::Byte => FieldKind::Register,
            ElementShape::Scalar | ElementShape::Nested => FieldKind::Set,
            ElementShape::Unsupported => FieldKind::Unsupported(E::KIND),
        }
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        match E::SHAPE {
            ElementShape::Byte => {
                encoder.node().set_register(name, to_bytes(self));
            }
            ElementShape::Scalar => {
                for element in self {
                    let member = element.to_member(name)?;
                    encoder.node().add_to_set(name, member);
                }
            }
            ElementShape::Nested => {
                // Nothing is checked for an empty vector.
                for element in self {
                    let member = element.to_member(name)?;
                    encoder.node().add_to_set(name, member);
                }
            }
            ElementShape::Unsupported => {
                return Err(CodecError::UnexpectedFieldKind {
                    field: name.to_string(),
                    kind: E::KIND.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        match E::SHAPE {
            ElementShape::Byte => {
                if let Some(bytes) = decoder.register(name) {
                    *self = bytes.iter().filter_map(|byte| E::from_byte(*byte)).collect();
                }
            }
            ElementShape::Scalar | ElementShape::Nested => {
                if let Some(members) = decoder.set(name) {
                    *self = members
                        .iter()
                        .map(|member| E::from_member(name, member))
                        .collect::<Result<Vec<_>>>()?;
                }
            }
            ElementShape::Unsupported => {
                return Err(CodecError::UnknownFieldKind {
                    field: name.to_string(),
                    kind: E::KIND.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Byte arrays are Registers. Arrays of anything else are rejected unless empty.
impl<E: Element + Default, const N: usize> Field for [E; N] {
    fn kind() -> FieldKind {
        if N == 0 || E::SHAPE == ElementShape::Byte {
            FieldKind::Register
        } else {
            FieldKind::Unsupported(E::KIND)
        }
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        if N > 0 && E::SHAPE != ElementShape::Byte {
            return Err(unsupported_array::<E>(name));
        }
        encoder.node().set_register(name, to_bytes(self));
        Ok(())
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        if N == 0 {
            return Ok(());
        }
        if E::SHAPE != ElementShape::Byte {
            return Err(unsupported_array::<E>(name));
        }
        if let Some(bytes) = decoder.register(name) {
            match byte_array(name, bytes) {
                Ok(value) => *self = value,
                Err(_) => warn!(
                    field = name,
                    path = %decoder.path(),
                    expected = N,
                    actual = bytes.len(),
                    "Ignoring register with the wrong length for a byte array"
                ),
            }
        }
        Ok(())
    }

    fn decode_entry(name: &str, decoder: &Decoder<'_>) -> Result<Self> {
        if E::SHAPE != ElementShape::Byte && N > 0 {
            return Err(unsupported_array::<E>(name));
        }
        byte_array(name, decoder.register(name).unwrap_or_default())
    }
}

fn unsupported_array<E: Element>(field: &str) -> crate::Error {
    CodecError::UnsupportedArrayElementKind {
        field: field.to_string(),
        kind: E::KIND.to_string(),
    }
    .into()
}

/// A handle slot. `None` creates the CRDT; `Some` sends the handle's pending changes.
impl<H: Handle> Field for Option<H> {
    fn kind() -> FieldKind {
        H::KIND.into()
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        match self {
            Some(handle) => handle.write_pending(name, encoder.node()),
            None => H::placeholder(name, encoder.node()),
        }
        Ok(())
    }

    fn encode_mut(&mut self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        self.encode(name, encoder)?;
        if self.is_none() && encoder.mode() == EncodeMode::Mutable {
            *self = Some(H::bound(encoder.binding(name)));
        }
        Ok(())
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        *self = Some(H::load(decoder.binding(name), decoder.map()));
        Ok(())
    }
}

fn decode_map_entries<K, V, F>(name: &str, decoder: &Decoder<'_>, mut insert: F) -> Result<()>
where
    K: MapKey,
    V: Field + Default,
    F: FnMut(K, V),
{
    if let FieldKind::Unsupported(kind) = V::kind() {
        return Err(CodecError::UnknownMapValueKind {
            field: name.to_string(),
            kind: kind.to_string(),
        }
        .into());
    }

    for entry in decoder.entry_names(V::kind()).unwrap_or_default() {
        let key = K::from_key(entry).ok_or_else(|| CodecError::UnknownMapKeyKind {
            field: name.to_string(),
            key: entry.to_string(),
            kind: K::KIND.to_string(),
        })?;
        insert(key, V::decode_entry(entry, decoder)?);
    }
    Ok(())
}

/// Map fields are child Maps with one entry per key. Their values are never bound
/// to handles while encoding.
impl<K, V, S> Field for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Field + Default,
    S: BuildHasher + Default,
{
    fn kind() -> FieldKind {
        FieldKind::Map
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.nested_read_only(name, |child| {
            for (key, value) in self {
                value.encode(&key.to_key(), child)?;
            }
            Ok(())
        })
    }

    fn encode_mut(&mut self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.nested_read_only(name, |child| {
            for (key, value) in self.iter_mut() {
                value.encode_mut(&key.to_key(), child)?;
            }
            Ok(())
        })
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        decoder.nested(name, |child| {
            let mut rebuilt = HashMap::with_hasher(S::default());
            decode_map_entries(name, child, |key, value| {
                rebuilt.insert(key, value);
            })?;
            *self = rebuilt;
            Ok(())
        })
    }
}

impl<K, V> Field for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Field + Default,
{
    fn kind() -> FieldKind {
        FieldKind::Map
    }

    fn encode(&self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.nested_read_only(name, |child| {
            for (key, value) in self {
                value.encode(&key.to_key(), child)?;
            }
            Ok(())
        })
    }

    fn encode_mut(&mut self, name: &str, encoder: &mut Encoder<'_>) -> Result<()> {
        encoder.nested_read_only(name, |child| {
            for (key, value) in self.iter_mut() {
                value.encode_mut(&key.to_key(), child)?;
            }
            Ok(())
        })
    }

    fn decode(&mut self, name: &str, decoder: &Decoder<'_>) -> Result<()> {
        decoder.nested(name, |child| {
            let mut rebuilt = BTreeMap::new();
            decode_map_entries(name, child, |key, value| {
                rebuilt.insert(key, value);
            })?;
            *self = rebuilt;
            Ok(())
        })
    }
}
