//! Typed syntax nodes.
//!
//! Nodes live in a [`SyntaxTree`](super::SyntaxTree) arena and refer to each
//! other by [`NodeId`]. Ownership flows from container to child through the
//! id lists in [`NodeData`]; `parent` is a plain back-reference.

use smol_str::SmolStr;

use super::annotation::Annotation;
use crate::base::Span;

/// Index of a node inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Document,
    Namespace,
    Include,
    Const,
    Typedef,
    Enum,
    EnumMember,
    Struct,
    Union,
    Exception,
    Field,
    Service,
    Function,
    Comment,
    Annotation,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Namespace => "namespace",
            Self::Include => "include",
            Self::Const => "const",
            Self::Typedef => "typedef",
            Self::Enum => "enum",
            Self::EnumMember => "enum member",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Exception => "exception",
            Self::Field => "field",
            Self::Service => "service",
            Self::Function => "function",
            Self::Comment => "comment",
            Self::Annotation => "annotation",
        }
    }

    /// Struct, union and exception share the field-list shape
    pub fn is_struct_like(self) -> bool {
        matches!(self, Self::Struct | Self::Union | Self::Exception)
    }

    /// Kinds that declare a named type other declarations can refer to
    pub fn is_type_definition(self) -> bool {
        matches!(
            self,
            Self::Struct | Self::Union | Self::Exception | Self::Enum | Self::Typedef
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field requiredness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Requiredness {
    #[default]
    Default,
    Required,
    Optional,
}

impl Requiredness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Required => "required",
            Self::Optional => "optional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommentStyle {
    /// `// ...`
    Line,
    /// `# ...`
    Hash,
    /// `/* ... */`
    Block,
}

/// Names the structural child collections a node can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildCollection {
    Body,
    Fields,
    Members,
    Functions,
    Arguments,
    Throws,
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document {
        body: Vec<NodeId>,
    },
    /// `namespace <scope> <name>`; the target namespace is the node name
    Namespace {
        scope: SmolStr,
    },
    Include {
        path: SmolStr,
        cpp: bool,
    },
    Const {
        value_type: SmolStr,
        value: String,
    },
    Typedef {
        target_type: SmolStr,
    },
    Enum {
        members: Vec<NodeId>,
        /// `senum` with string members
        string_enum: bool,
    },
    EnumMember {
        value: Option<String>,
    },
    Struct {
        fields: Vec<NodeId>,
    },
    Union {
        fields: Vec<NodeId>,
    },
    Exception {
        fields: Vec<NodeId>,
    },
    Field {
        field_id: Option<i64>,
        requiredness: Requiredness,
        field_type: SmolStr,
        default_value: Option<String>,
    },
    Service {
        extends: Option<SmolStr>,
        functions: Vec<NodeId>,
    },
    Function {
        return_type: SmolStr,
        oneway: bool,
        arguments: Vec<NodeId>,
        throws: Vec<NodeId>,
    },
    Comment {
        text: String,
        style: CommentStyle,
    },
    /// An annotation block with no declaration to attach to
    Annotation(Annotation),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document { .. } => NodeKind::Document,
            Self::Namespace { .. } => NodeKind::Namespace,
            Self::Include { .. } => NodeKind::Include,
            Self::Const { .. } => NodeKind::Const,
            Self::Typedef { .. } => NodeKind::Typedef,
            Self::Enum { .. } => NodeKind::Enum,
            Self::EnumMember { .. } => NodeKind::EnumMember,
            Self::Struct { .. } => NodeKind::Struct,
            Self::Union { .. } => NodeKind::Union,
            Self::Exception { .. } => NodeKind::Exception,
            Self::Field { .. } => NodeKind::Field,
            Self::Service { .. } => NodeKind::Service,
            Self::Function { .. } => NodeKind::Function,
            Self::Comment { .. } => NodeKind::Comment,
            Self::Annotation(_) => NodeKind::Annotation,
        }
    }

    /// Every structural child collection, in source order of appearance.
    pub fn collections(&self) -> impl Iterator<Item = (ChildCollection, &[NodeId])> {
        let (first, second): (
            Option<(ChildCollection, &[NodeId])>,
            Option<(ChildCollection, &[NodeId])>,
        ) = match self {
            Self::Document { body } => (Some((ChildCollection::Body, body.as_slice())), None),
            Self::Enum { members, .. } => (Some((ChildCollection::Members, members.as_slice())), None),
            Self::Struct { fields } | Self::Union { fields } | Self::Exception { fields } => {
                (Some((ChildCollection::Fields, fields.as_slice())), None)
            }
            Self::Service { functions, .. } => {
                (Some((ChildCollection::Functions, functions.as_slice())), None)
            }
            Self::Function {
                arguments, throws, ..
            } => (
                Some((ChildCollection::Arguments, arguments.as_slice())),
                Some((ChildCollection::Throws, throws.as_slice())),
            ),
            Self::Namespace { .. }
            | Self::Include { .. }
            | Self::Const { .. }
            | Self::Typedef { .. }
            | Self::EnumMember { .. }
            | Self::Field { .. }
            | Self::Comment { .. }
            | Self::Annotation(_) => (None, None),
        };
        first.into_iter().chain(second)
    }

    pub(crate) fn collections_mut(&mut self) -> impl Iterator<Item = &mut Vec<NodeId>> {
        let (first, second): (Option<&mut Vec<NodeId>>, Option<&mut Vec<NodeId>>) = match self {
            Self::Document { body } => (Some(body), None),
            Self::Enum { members, .. } => (Some(members), None),
            Self::Struct { fields } | Self::Union { fields } | Self::Exception { fields } => {
                (Some(fields), None)
            }
            Self::Service { functions, .. } => (Some(functions), None),
            Self::Function {
                arguments, throws, ..
            } => (Some(arguments), Some(throws)),
            Self::Namespace { .. }
            | Self::Include { .. }
            | Self::Const { .. }
            | Self::Typedef { .. }
            | Self::EnumMember { .. }
            | Self::Field { .. }
            | Self::Comment { .. }
            | Self::Annotation(_) => (None, None),
        };
        first.into_iter().chain(second)
    }

    /// A one-line summary of the payload, used by snapshots and hovers.
    pub fn detail(&self) -> String {
        match self {
            Self::Document { .. }
            | Self::Struct { .. }
            | Self::Union { .. }
            | Self::Exception { .. } => String::new(),
            Self::Namespace { scope } => scope.to_string(),
            Self::Include { path, cpp } => {
                if *cpp {
                    format!("cpp_include {path}")
                } else {
                    path.to_string()
                }
            }
            Self::Const { value_type, value } => format!("{value_type} = {value}"),
            Self::Typedef { target_type } => target_type.to_string(),
            Self::Enum { string_enum, .. } => {
                if *string_enum { "senum" } else { "enum" }.to_string()
            }
            Self::EnumMember { value } => value.clone().unwrap_or_default(),
            Self::Field {
                field_id,
                requiredness,
                field_type,
                default_value,
            } => {
                let mut out = String::new();
                if let Some(id) = field_id {
                    out.push_str(&format!("{id}: "));
                }
                if *requiredness != Requiredness::Default {
                    out.push_str(requiredness.as_str());
                    out.push(' ');
                }
                out.push_str(field_type);
                if let Some(default) = default_value {
                    out.push_str(" = ");
                    out.push_str(default);
                }
                out
            }
            Self::Service { extends, .. } => extends
                .as_ref()
                .map(|base| format!("extends {base}"))
                .unwrap_or_default(),
            Self::Function {
                return_type,
                oneway,
                ..
            } => {
                if *oneway {
                    format!("oneway {return_type}")
                } else {
                    return_type.to_string()
                }
            }
            Self::Comment { text, .. } => text.clone(),
            Self::Annotation(annotation) => annotation.raw_text.clone(),
        }
    }
}

/// A syntax node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub range: Span,
    pub name: Option<SmolStr>,
    pub name_range: Option<Span>,
    /// Syntactic container; `None` only on the root document
    pub parent: Option<NodeId>,
    pub annotations: Vec<Annotation>,
    pub data: NodeData,
}

impl Node {
    pub fn new(data: NodeData, range: Span) -> Self {
        Self {
            range,
            name: None,
            name_range: None,
            parent: None,
            annotations: Vec::new(),
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// All child ids across every structural collection
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.data
            .collections()
            .flat_map(|(_, ids)| ids.iter().copied())
    }

    /// `fields` for struct, union and exception nodes
    pub fn fields(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Struct { fields } | NodeData::Union { fields } | NodeData::Exception { fields } => {
                fields
            }
            _ => &[],
        }
    }

    /// `members` for enum nodes
    pub fn members(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Enum { members, .. } => members,
            _ => &[],
        }
    }

    /// `functions` for service nodes
    pub fn functions(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Service { functions, .. } => functions,
            _ => &[],
        }
    }

    pub fn arguments(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Function { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub fn throws(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Function { throws, .. } => throws,
            _ => &[],
        }
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.iter().find_map(|a| a.get(key))
    }
}
