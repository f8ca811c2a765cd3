//! Wire model for the module schema payload.
//!
//! The remote encodes algebraic types as single-key JSON objects whose key is
//! the type tag. Optional values arrive either bare or wrapped as
//! `{"some": ..}` / `{"none": []}`, so the decoders here accept both.

use std::{error::Error, fmt};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Error type for schema payloads that cannot be decoded.
#[derive(Debug)]
pub struct SchemaDecodeError {
    message: String,
}

impl SchemaDecodeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure reason without the error prefix.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for SchemaDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema decode error: {}", self.message)
    }
}

impl Error for SchemaDecodeError {}

impl From<serde_json::Error> for SchemaDecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Leaf types with no payload beyond their tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    I128,
    U128,
    U256,
    F32,
    F64,
    String,
}

impl PrimitiveType {
    pub const ALL: [Self; 15] = [
        Self::Bool,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::I128,
        Self::U128,
        Self::U256,
        Self::F32,
        Self::F64,
        Self::String,
    ];

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|primitive| primitive.as_str() == tag)
    }

    /// Canonical short name, identical to the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::I8 => "I8",
            Self::U8 => "U8",
            Self::I16 => "I16",
            Self::U16 => "U16",
            Self::I32 => "I32",
            Self::U32 => "U32",
            Self::I64 => "I64",
            Self::U64 => "U64",
            Self::I128 => "I128",
            Self::U128 => "U128",
            Self::U256 => "U256",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::String => "String",
        }
    }
}

/// Recursive description of a value's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgebraicType {
    Primitive(PrimitiveType),
    Array(Box<Self>),
    /// Index into the schema's type table; kept at full width so any index
    /// can be rendered.
    Ref(u64),
    Product(Vec<NamedField>),
    Sum(Vec<NamedField>),
    Option(Box<Self>),
    /// No tag present.
    Unknown,
    /// A tag this decoder does not know, kept verbatim.
    Other(String),
}

impl AlgebraicType {
    /// Decodes a single-tag JSON object into an algebraic type.
    ///
    /// # Errors
    /// Returns `SchemaDecodeError` if the object carries more than one tag or
    /// a payload does not match its tag.
    pub fn from_value(value: &Value) -> Result<Self, SchemaDecodeError> {
        match value {
            Value::Null => Ok(Self::Unknown),
            Value::String(tag) => Self::from_tag(tag, &Value::Null),
            Value::Object(map) => {
                let mut entries = map.iter();
                let Some((tag, payload)) = entries.next() else {
                    return Ok(Self::Unknown);
                };
                if entries.next().is_some() {
                    let tags: Vec<&str> = map.keys().map(String::as_str).collect();
                    return Err(SchemaDecodeError::new(format!(
                        "algebraic type must carry exactly one tag, found [{}]",
                        tags.join(", ")
                    )));
                }
                Self::from_tag(tag, payload)
            }
            other => Err(SchemaDecodeError::new(format!(
                "algebraic type must be an object, found {other}"
            ))),
        }
    }

    fn from_tag(tag: &str, payload: &Value) -> Result<Self, SchemaDecodeError> {
        if let Some(primitive) = PrimitiveType::from_tag(tag) {
            return Ok(Self::Primitive(primitive));
        }
        let ty = match tag {
            "Array" => Self::Array(Box::new(Self::from_value(unwrap_key(payload, "elem_ty"))?)),
            "Option" => Self::Option(Box::new(Self::from_value(payload)?)),
            "Ref" => Self::Ref(decode_index(payload)?),
            "Product" => Self::Product(decode_fields(payload, "elements")?),
            "Sum" => Self::Sum(decode_fields(payload, "variants")?),
            other => Self::Other(other.to_string()),
        };
        Ok(ty)
    }

    /// Decodes a type, degrading anything undecodable to [`Self::Unknown`].
    #[must_use]
    pub fn from_value_lossy(value: &Value) -> Self {
        Self::from_value(value).unwrap_or(Self::Unknown)
    }
}

impl<'de> Deserialize<'de> for AlgebraicType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value_lossy(&value))
    }
}

/// A product element or sum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: Option<String>,
    pub algebraic_type: AlgebraicType,
}

impl NamedField {
    #[must_use]
    pub fn new(name: Option<&str>, algebraic_type: AlgebraicType) -> Self {
        Self {
            name: name.map(str::to_string),
            algebraic_type,
        }
    }

    /// Decodes one element; a missing or undecodable type becomes `Unknown`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let algebraic_type = ["algebraic_type", "type", "ty"]
            .into_iter()
            .find_map(|key| value.get(key))
            .map_or(AlgebraicType::Unknown, AlgebraicType::from_value_lossy);
        Self {
            name: value.get("name").and_then(optional_name),
            algebraic_type,
        }
    }
}

impl<'de> Deserialize<'de> for NamedField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Entry of the type table mapping an index to a declared name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TypeDef {
    #[serde(default, alias = "name", deserialize_with = "deserialize_optional_name")]
    pub declared_name: Option<String>,
    #[serde(default, alias = "ty", deserialize_with = "deserialize_index")]
    pub typespace_index: Option<u64>,
}

/// Ordered table of structural type bodies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Typespace {
    #[serde(default)]
    pub types: Vec<AlgebraicType>,
}

/// A table and the type-table index of its row type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawTable {
    #[serde(alias = "table_name")]
    pub name: String,
    /// `None` when absent or not a non-negative integer.
    #[serde(default, deserialize_with = "deserialize_index")]
    pub product_type_ref: Option<u64>,
}

/// Lifecycle role of a reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Init,
    OnConnect,
    OnDisconnect,
    Other(String),
}

impl Lifecycle {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Init" => Self::Init,
            "OnConnect" => Self::OnConnect,
            "OnDisconnect" => Self::OnDisconnect,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Init => "Init",
            Self::OnConnect => "OnConnect",
            Self::OnDisconnect => "OnDisconnect",
            Self::Other(tag) => tag,
        }
    }
}

/// A remotely invocable function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawReducer {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lifecycle")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(default, deserialize_with = "deserialize_params")]
    pub params: Vec<NamedField>,
}

/// Schema payload as returned by the remote schema endpoint.
///
/// Entries of `tables`, `reducers` and `types` that cannot be decoded are
/// dropped individually.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RawSchema {
    #[serde(deserialize_with = "deserialize_entries")]
    pub tables: Vec<RawTable>,
    #[serde(deserialize_with = "deserialize_entries")]
    pub reducers: Vec<RawReducer>,
    pub typespace: Typespace,
    #[serde(default, deserialize_with = "deserialize_entries")]
    pub types: Vec<TypeDef>,
}

impl RawSchema {
    /// Decodes a schema payload.
    ///
    /// # Errors
    /// Returns `SchemaDecodeError` if a top-level section is missing or is not
    /// a list.
    pub fn from_value(value: &Value) -> Result<Self, SchemaDecodeError> {
        Ok(Self::deserialize(value)?)
    }
}

fn unwrap_key<'a>(payload: &'a Value, key: &str) -> &'a Value {
    match payload {
        Value::Object(map) if map.len() == 1 => map.get(key).unwrap_or(payload),
        _ => payload,
    }
}

fn decode_index(payload: &Value) -> Result<u64, SchemaDecodeError> {
    payload
        .as_u64()
        .ok_or_else(|| SchemaDecodeError::new(format!("invalid type reference: {payload}")))
}

fn decode_fields(payload: &Value, key: &str) -> Result<Vec<NamedField>, SchemaDecodeError> {
    match unwrap_key(payload, key) {
        Value::Null => Ok(Vec::new()),
        Value::Array(entries) => Ok(entries.iter().map(NamedField::from_value).collect()),
        other => Err(SchemaDecodeError::new(format!(
            "expected a list of {key}, found {other}"
        ))),
    }
}

fn optional_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map
            .get("some")
            .or_else(|| map.get("name"))
            .and_then(optional_name),
        _ => None,
    }
}

fn lifecycle_from_map(map: &Map<String, Value>) -> Option<Lifecycle> {
    if let Some(inner) = map.get("some") {
        return lifecycle_from_value(inner);
    }
    if map.contains_key("none") {
        return None;
    }
    map.keys().next().map(|tag| Lifecycle::from_tag(tag))
}

fn lifecycle_from_value(value: &Value) -> Option<Lifecycle> {
    match value {
        Value::String(tag) => Some(Lifecycle::from_tag(tag)),
        Value::Object(map) => lifecycle_from_map(map),
        _ => None,
    }
}

fn deserialize_optional_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(optional_name(&value))
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64())
}

fn deserialize_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

fn deserialize_lifecycle<'de, D>(deserializer: D) -> Result<Option<Lifecycle>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lifecycle_from_value(&value))
}

fn deserialize_params<'de, D>(deserializer: D) -> Result<Vec<NamedField>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decode_fields(&value, "elements").map_err(|err| serde::de::Error::custom(err.message()))
}
