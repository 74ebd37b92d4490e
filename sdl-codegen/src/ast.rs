//! Schema node model: the immutable data-shape tree the SDL compiler walks.
//! Nodes are shared through `Schema` handles. Identity, not structure,
//! decides whether two occurrences are the same type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

/// Opaque identity of one schema instance, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SchemaId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Base category of a scalar before refinement checks are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarBase {
    String,
    Number,
    Boolean,
}

impl ScalarBase {
    pub fn parse(s: &str) -> Option<ScalarBase> {
        match s {
            "string" => Some(ScalarBase::String),
            "number" => Some(ScalarBase::Number),
            "boolean" => Some(ScalarBase::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarBase::String => "string",
            ScalarBase::Number => "number",
            ScalarBase::Boolean => "boolean",
        }
    }
}

/// A refinement check attached to a scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Uuid,
    Datetime,
    Date,
    Int,
    Email,
    Url,
    MinLength(u64),
    MaxLength(u64),
    Min(f64),
    Max(f64),
}

/// Check discriminant, used to query a scalar without caring about arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Uuid,
    Datetime,
    Date,
    Int,
    Email,
    Url,
    MinLength,
    MaxLength,
    Min,
    Max,
}

impl Check {
    pub fn kind(&self) -> CheckKind {
        match self {
            Check::Uuid => CheckKind::Uuid,
            Check::Datetime => CheckKind::Datetime,
            Check::Date => CheckKind::Date,
            Check::Int => CheckKind::Int,
            Check::Email => CheckKind::Email,
            Check::Url => CheckKind::Url,
            Check::MinLength(_) => CheckKind::MinLength,
            Check::MaxLength(_) => CheckKind::MaxLength,
            Check::Min(_) => CheckKind::Min,
            Check::Max(_) => CheckKind::Max,
        }
    }

    /// Parse an argument-free check name.
    pub fn parse(s: &str) -> Option<Check> {
        match s {
            "uuid" => Some(Check::Uuid),
            "datetime" => Some(Check::Datetime),
            "date" => Some(Check::Date),
            "int" => Some(Check::Int),
            "email" => Some(Check::Email),
            "url" => Some(Check::Url),
            _ => None,
        }
    }
}

/// The scalar subtypes the compiler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Uuid,
    Datetime,
    Date,
    Int,
    Float,
    Boolean,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Uuid => "uuid",
            ScalarType::Datetime => "datetime",
            ScalarType::Date => "date",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
        }
    }

    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            ScalarType::String | ScalarType::Uuid | ScalarType::Datetime | ScalarType::Date
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub base: ScalarBase,
    pub checks: Vec<Check>,
}

impl Scalar {
    pub fn new(base: ScalarBase) -> Self {
        Self {
            base,
            checks: Vec::new(),
        }
    }

    pub fn has_check(&self, kind: CheckKind) -> bool {
        self.checks.iter().any(|c| c.kind() == kind)
    }

    /// Subtype derived from the base category and its checks.
    /// For strings, uuid wins over datetime, which wins over date.
    pub fn subtype(&self) -> ScalarType {
        match self.base {
            ScalarBase::String if self.has_check(CheckKind::Uuid) => ScalarType::Uuid,
            ScalarBase::String if self.has_check(CheckKind::Datetime) => ScalarType::Datetime,
            ScalarBase::String if self.has_check(CheckKind::Date) => ScalarType::Date,
            ScalarBase::String => ScalarType::String,
            ScalarBase::Number if self.has_check(CheckKind::Int) => ScalarType::Int,
            ScalarBase::Number => ScalarType::Float,
            ScalarBase::Boolean => ScalarType::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    Optional,
    Nullable,
    Default,
}

impl WrapperKind {
    /// Optional and Nullable make a field nullable. A defaulted value is
    /// always materialized, so Default does not.
    pub fn marks_nullable(&self) -> bool {
        matches!(self, WrapperKind::Optional | WrapperKind::Nullable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
}

impl Literal {
    /// True for integer literals and for floats without a fractional part.
    pub fn is_integer(&self) -> bool {
        match self {
            Literal::Int(_) => true,
            Literal::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Literal::Int(_) | Literal::Float(_))
    }

    /// The scalar subtype a literal of this value stands in for.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Literal::String(_) => ScalarType::String,
            Literal::Boolean(_) => ScalarType::Boolean,
            _ if self.is_integer() => ScalarType::Int,
            _ => ScalarType::Float,
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Float(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

/// One schema form.
#[derive(Debug, Clone)]
pub enum Node {
    Scalar(Scalar),
    Wrapper { kind: WrapperKind, inner: Schema },
    List { element: Schema },
    /// Field order is significant and preserved in the emitted SDL.
    Object { fields: IndexMap<String, Schema> },
    Enum { values: Vec<String> },
    Literal(Literal),
    Union { members: Vec<Schema> },
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Wrapper { .. } => "wrapper",
            Node::List { .. } => "list",
            Node::Object { .. } => "object",
            Node::Enum { .. } => "enum",
            Node::Literal(_) => "literal",
            Node::Union { .. } => "union",
        }
    }
}

struct SchemaInner {
    id: SchemaId,
    node: Node,
}

/// Shared handle to an immutable schema node.
///
/// Cloning yields the same instance. Two schemas built separately are
/// different instances even when their nodes are structurally equal.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    pub fn new(node: Node) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                id: SchemaId::next(),
                node,
            }),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.inner.id
    }

    pub fn node(&self) -> &Node {
        &self.inner.node
    }

    pub fn same_instance(&self, other: &Schema) -> bool {
        self.inner.id == other.inner.id
    }

    pub fn scalar(base: ScalarBase, checks: impl IntoIterator<Item = Check>) -> Self {
        Self::new(Node::Scalar(Scalar {
            base,
            checks: checks.into_iter().collect(),
        }))
    }

    pub fn string() -> Self {
        Self::new(Node::Scalar(Scalar::new(ScalarBase::String)))
    }

    pub fn uuid() -> Self {
        Self::scalar(ScalarBase::String, [Check::Uuid])
    }

    pub fn datetime() -> Self {
        Self::scalar(ScalarBase::String, [Check::Datetime])
    }

    pub fn date() -> Self {
        Self::scalar(ScalarBase::String, [Check::Date])
    }

    pub fn number() -> Self {
        Self::new(Node::Scalar(Scalar::new(ScalarBase::Number)))
    }

    pub fn int() -> Self {
        Self::scalar(ScalarBase::Number, [Check::Int])
    }

    pub fn boolean() -> Self {
        Self::new(Node::Scalar(Scalar::new(ScalarBase::Boolean)))
    }

    pub fn list(element: Schema) -> Self {
        Self::new(Node::List { element })
    }

    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Self::new(Node::Object {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    pub fn enumeration<V: Into<String>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::new(Node::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        Self::new(Node::Literal(value.into()))
    }

    pub fn union(members: impl IntoIterator<Item = Schema>) -> Self {
        Self::new(Node::Union {
            members: members.into_iter().collect(),
        })
    }

    pub fn wrap(self, kind: WrapperKind) -> Self {
        Self::new(Node::Wrapper { kind, inner: self })
    }

    pub fn optional(self) -> Self {
        self.wrap(WrapperKind::Optional)
    }

    pub fn nullable(self) -> Self {
        self.wrap(WrapperKind::Nullable)
    }

    pub fn with_default(self) -> Self {
        self.wrap(WrapperKind::Default)
    }

    /// Strip the wrapper chain. Returns the innermost non-wrapper schema and
    /// whether any Optional/Nullable layer was crossed.
    pub fn unwrap_wrappers(&self) -> (&Schema, bool) {
        let mut current = self;
        let mut nullable = false;
        while let Node::Wrapper { kind, inner } = current.node() {
            nullable |= kind.marks_nullable();
            current = inner;
        }
        (current, nullable)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.inner.id)
            .field("node", &self.inner.node)
            .finish()
    }
}
