use tracing::debug;

use crate::Result;
use crate::codec::MapDocument;
use crate::handle::Binding;
use crate::operation::OperationNode;
use crate::path::PathKey;

/// Whether the encoder may write back into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Empty handle slots are filled with handles bound to their field.
    Mutable,
    /// The document is only read.
    ReadOnly,
}

/// Output of one encode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedDocument {
    /// Operations for every encoded field
    pub tree: OperationNode,
    /// Causal context taken from the root document's context field, empty if it has none
    pub context: Vec<u8>,
}

/// Cursor over the operation tree while a document is encoded.
///
/// Each nested Map gets its own encoder pointing at the child node and the child path.
pub struct Encoder<'a> {
    node: &'a mut OperationNode,
    path: PathKey,
    mode: EncodeMode,
    /// Only the root encoder collects the causal context.
    context: Option<&'a mut Vec<u8>>,
}

impl<'a> Encoder<'a> {
    /// The current encode mode.
    pub fn mode(&self) -> EncodeMode {
        self.mode
    }

    /// Path of the Map this encoder writes into.
    pub fn path(&self) -> &PathKey {
        &self.path
    }

    /// The operation node for the current Map.
    pub fn node(&mut self) -> &mut OperationNode {
        &mut *self.node
    }

    /// Record the causal context. Ignored below the document root.
    pub fn set_causal_context(&mut self, context: &[u8]) {
        if let Some(sink) = self.context.as_deref_mut() {
            *sink = context.to_vec();
        }
    }

    /// A binding for the field `name` in the current Map.
    pub fn binding(&self, name: &str) -> Binding {
        Binding::new(self.path.clone(), name)
    }

    /// Run `f` against the child Map `name`, keeping the current mode.
    pub fn nested<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<'_>) -> Result<()>,
    {
        let mode = self.mode;
        self.nested_with_mode(name, mode, f)
    }

    /// Run `f` against the child Map `name` in [`EncodeMode::ReadOnly`].
    pub fn nested_read_only<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<'_>) -> Result<()>,
    {
        self.nested_with_mode(name, EncodeMode::ReadOnly, f)
    }

    fn nested_with_mode<F>(&mut self, name: &str, mode: EncodeMode, f: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<'_>) -> Result<()>,
    {
        let mut child = Encoder {
            node: self.node.map(name),
            path: self.path.child(name),
            mode,
            context: None,
        };
        f(&mut child)
    }
}

/// Encode `value` without modifying it.
///
/// Empty handle slots still create their CRDT on the server but stay `None`.
pub fn encode_document<T: MapDocument + ?Sized>(value: &T, root: &PathKey) -> Result<EncodedDocument> {
    encode_with(root, EncodeMode::ReadOnly, |encoder| value.encode_fields(encoder))
}

/// Encode `value`, filling empty handle slots with handles bound to `root`'s location.
pub fn encode_document_mut<T: MapDocument + ?Sized>(
    value: &mut T,
    root: &PathKey,
) -> Result<EncodedDocument> {
    encode_with(root, EncodeMode::Mutable, |encoder| value.encode_fields_mut(encoder))
}

fn encode_with<F>(root: &PathKey, mode: EncodeMode, f: F) -> Result<EncodedDocument>
where
    F: FnOnce(&mut Encoder<'_>) -> Result<()>,
{
    let mut tree = OperationNode::new();
    let mut context = Vec::new();

    let mut encoder = Encoder {
        node: tree.at_path_mut(&root.segments),
        path: root.clone(),
        mode,
        context: Some(&mut context),
    };
    f(&mut encoder)?;

    debug!(
        path = %root,
        ?mode,
        has_context = !context.is_empty(),
        "Encoded document"
    );

    Ok(EncodedDocument { tree, context })
}
