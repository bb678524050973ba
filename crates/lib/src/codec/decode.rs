use tracing::debug;

use crate::Result;
use crate::codec::{FieldKind, MapDocument};
use crate::handle::Binding;
use crate::path::PathKey;
use crate::transport::{FetchMapResponse, MapValue};

/// Cursor over a fetched Map while a document is decoded.
pub struct Decoder<'a> {
    map: &'a MapValue,
    path: PathKey,
    context: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// The Map this decoder reads from.
    pub fn map(&self) -> &'a MapValue {
        self.map
    }

    /// Path of the current Map.
    pub fn path(&self) -> &PathKey {
        &self.path
    }

    /// Causal context of the fetched document.
    pub fn causal_context(&self) -> &'a [u8] {
        self.context
    }

    pub fn register(&self, name: &str) -> Option<&'a [u8]> {
        self.map.registers.get(name).map(Vec::as_slice)
    }

    pub fn counter(&self, name: &str) -> Option<i64> {
        self.map.counters.get(name).copied()
    }

    pub fn set(&self, name: &str) -> Option<&'a [Vec<u8>]> {
        self.map.sets.get(name).map(Vec::as_slice)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.map.flags.get(name).copied()
    }

    /// A binding for the field `name`, carrying the document's causal context.
    pub fn binding(&self, name: &str) -> Binding {
        Binding::new(self.path.clone(), name).with_context(self.context.to_vec())
    }

    /// Names of the entries of one CRDT kind in the current Map.
    ///
    /// Returns `None` for [`FieldKind::Unsupported`].
    pub fn entry_names(&self, kind: FieldKind) -> Option<Vec<&'a str>> {
        let map = self.map;
        let names = match kind {
            FieldKind::Register => map.registers.keys().map(String::as_str).collect(),
            FieldKind::Counter => map.counters.keys().map(String::as_str).collect(),
            FieldKind::Set => map.sets.keys().map(String::as_str).collect(),
            FieldKind::Flag => map.flags.keys().map(String::as_str).collect(),
            FieldKind::Map => map.maps.keys().map(String::as_str).collect(),
            FieldKind::Unsupported(_) => return None,
        };
        Some(names)
    }

    /// Run `f` against the child Map `name`. Does nothing if the child is missing.
    pub fn nested<F>(&self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&Decoder<'_>) -> Result<()>,
    {
        match self.map.maps.get(name) {
            Some(child) => f(&Decoder {
                map: child,
                path: self.path.child(name),
                context: self.context,
            }),
            None => Ok(()),
        }
    }
}

/// Populate `value` from a fetched Map.
///
/// Fields are updated in place: anything missing from the Map keeps its current value,
/// while handle slots are always replaced with handles bound below `root`.
pub fn decode_document<T: MapDocument + ?Sized>(
    response: &FetchMapResponse,
    value: &mut T,
    root: &PathKey,
) -> Result<()> {
    let empty = MapValue::default();
    let map = response.map.at_path(&root.segments).unwrap_or(&empty);

    let decoder = Decoder {
        map,
        path: root.clone(),
        context: &response.context,
    };
    value.decode_fields(&decoder)?;

    debug!(
        path = %root,
        context = %hex::encode(&response.context),
        "Decoded document"
    );
    Ok(())
}
