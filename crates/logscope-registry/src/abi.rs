//! Ethereum ABI → `EventSchema` conversion.
//!
//! Accepts three input shapes:
//! - a single event entry: `{"type":"event","name":"Transfer","inputs":[...]}`
//! - a contract ABI: a JSON array, or a compiler artifact object carrying
//!   the array under `"abi"`
//! - a human-readable declaration: `event Transfer(address indexed from, ...)`
//!
//! Only events are kept. Functions, constructors, errors, fallback and
//! receive entries are skipped.

use alloy_json_abi::Event;
use logscope_core::{
    error::SchemaError,
    schema::{EventField, EventSchema},
    types::FieldType,
};
use serde::Deserialize;
use tracing::debug;

// ─── Raw ABI serde types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiInput>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Debug, Deserialize)]
struct AbiInput {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: bool,
}

// Solidity ABI: an entry without "type" is a function.
fn default_entry_type() -> String {
    "function".into()
}

// ─── Parser ───────────────────────────────────────────────────────────────────

pub struct AbiParser;

impl AbiParser {
    /// Parse one event entry.
    pub fn parse_event(json: &str) -> Result<EventSchema, SchemaError> {
        let entry: AbiEntry = serde_json::from_str(json)?;
        if entry.kind != "event" {
            return Err(SchemaError::InvalidAbi(format!(
                "expected an event entry, found '{}'",
                entry.kind
            )));
        }
        Self::entry_to_schema(entry)
    }

    /// Parse every non-anonymous event in a contract ABI, in ABI order.
    pub fn parse_abi(json: &str) -> Result<Vec<EventSchema>, SchemaError> {
        Self::parse_abi_filtered(json, |_| true)
    }

    /// Like `parse_abi`, but only events called `name` are converted.
    /// Other events are never type-checked, so an unsupported input in one
    /// of them does not reject the ABI.
    pub fn parse_abi_named(json: &str, name: &str) -> Result<Vec<EventSchema>, SchemaError> {
        Self::parse_abi_filtered(json, |event| event == name)
    }

    fn parse_abi_filtered(
        json: &str,
        keep: impl Fn(&str) -> bool,
    ) -> Result<Vec<EventSchema>, SchemaError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let entries = match value {
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(mut obj) => obj.remove("abi").ok_or_else(|| {
                SchemaError::InvalidAbi("object has no \"abi\" array".into())
            })?,
            _ => {
                return Err(SchemaError::InvalidAbi(
                    "expected a JSON array of ABI entries".into(),
                ))
            }
        };
        let entries: Vec<AbiEntry> = serde_json::from_value(entries)?;

        let mut schemas = Vec::new();
        for entry in entries {
            if entry.kind != "event" {
                continue;
            }
            // Unnamed entries still reach `entry_to_schema` and fail there.
            if entry.name.as_deref().is_some_and(|name| !keep(name)) {
                continue;
            }
            if entry.anonymous {
                debug!(
                    event = entry.name.as_deref().unwrap_or_default(),
                    "skipping anonymous event"
                );
                continue;
            }
            schemas.push(Self::entry_to_schema(entry)?);
        }
        Ok(schemas)
    }

    /// Parse a human-readable Solidity event declaration.
    pub fn parse_declaration(decl: &str) -> Result<EventSchema, SchemaError> {
        let event = Event::parse(decl.trim())
            .map_err(|e| SchemaError::InvalidAbi(format!("'{decl}': {e}")))?;
        if event.anonymous {
            return Err(SchemaError::Anonymous { event: event.name });
        }

        let fields = event
            .inputs
            .iter()
            .map(|p| field(&p.name, &p.ty, p.indexed))
            .collect::<Result<Vec<_>, _>>()?;
        EventSchema::new(event.name, fields)
    }

    fn entry_to_schema(entry: AbiEntry) -> Result<EventSchema, SchemaError> {
        let name = entry.name.ok_or(SchemaError::MissingName)?;
        if entry.anonymous {
            return Err(SchemaError::Anonymous { event: name });
        }

        let fields = entry
            .inputs
            .iter()
            .map(|i| field(&i.name, &i.ty, i.indexed))
            .collect::<Result<Vec<_>, _>>()?;
        EventSchema::new(name, fields)
    }
}

fn field(name: &str, ty: &str, indexed: bool) -> Result<EventField, SchemaError> {
    let parsed: FieldType = ty.parse().map_err(|reason| SchemaError::UnknownType {
        field: name.to_string(),
        ty: ty.to_string(),
        reason,
    })?;
    Ok(EventField::new(name, parsed, indexed))
}
