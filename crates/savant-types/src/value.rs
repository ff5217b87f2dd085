//! Name/type/value triples.
//!
//! Init parameters, contract state and transition parameters all share the
//! same shape on the wire: an ordered list of `{ vname, type, value }`
//! objects. Values stay as raw JSON because the interpreter returns nested
//! ADT values (maps, lists, constructors) for non-primitive fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `{ vname, type, value }` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamValue {
    pub vname: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: Value,
}

impl ParamValue {
    /// Build a triple with a plain string value.
    pub fn new(vname: &str, ty: &str, value: &str) -> Self {
        Self {
            vname: vname.to_string(),
            ty: ty.to_string(),
            value: Value::String(value.to_string()),
        }
    }

    /// The value as a string slice, when it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Find a field by `vname` in an ordered field list.
pub fn find_field<'a>(fields: &'a [ParamValue], vname: &str) -> Option<&'a ParamValue> {
    fields.iter().find(|f| f.vname == vname)
}
