use crate::expr::{IdRef, Integer, IntegerList, LengthConstraint};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IntWidth {
    U8,
    U16,
    U32,
    U64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::U8 => 8,
            IntWidth::U16 => 16,
            IntWidth::U32 => 32,
            IntWidth::U64 => 64,
        }
    }

    pub fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub fn max_value(self) -> u64 {
        match self {
            IntWidth::U8 => u8::MAX as u64,
            IntWidth::U16 => u16::MAX as u64,
            IntWidth::U32 => u32::MAX as u64,
            IntWidth::U64 => u64::MAX,
        }
    }

    /// Whether `value` is representable at this width.
    pub fn contains(self, value: i64) -> bool {
        value >= 0 && (value as u64) <= self.max_value()
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct IntType {
    pub width: IntWidth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<IntegerList>,
}

impl IntType {
    pub fn plain(width: IntWidth) -> Self {
        Self {
            width,
            constraint: None,
        }
    }

    pub fn constrained(width: IntWidth, constraint: IntegerList) -> Self {
        Self {
            width,
            constraint: Some(constraint),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FixedArrayType {
    pub base: Box<Type>,
    pub size: Integer,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct VarArrayType {
    pub base: Box<Type>,
    /// `None` consumes elements until the enclosing input is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthConstraint>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum Type {
    Int(IntType),
    /// A character byte; an alias for an unconstrained 8-bit integer.
    Char,
    NulTermString,
    /// Number of bytes of the enclosing input consumed before this point.
    /// Computed on decode, never encoded.
    RemainingOffset,
    StructRef(String),
    FixedArray(FixedArrayType),
    VarArray(VarArrayType),
}

impl Type {
    pub fn int(width: IntWidth) -> Self {
        Type::Int(IntType::plain(width))
    }

    pub fn fixed_array(base: Type, size: Integer) -> Self {
        Type::FixedArray(FixedArrayType {
            base: Box::new(base),
            size,
        })
    }

    pub fn var_array(base: Type, length: Option<LengthConstraint>) -> Self {
        Type::VarArray(VarArrayType {
            base: Box::new(base),
            length,
        })
    }

    /// Width of the integer this type decodes to, if it is one.
    pub fn int_width(&self) -> Option<IntWidth> {
        match self {
            Type::Int(int_type) => Some(int_type.width),
            Type::Char => Some(IntWidth::U8),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.int_width().is_some()
    }

    /// The struct named by this type or by its (possibly nested) element type.
    pub fn referenced_struct(&self) -> Option<&str> {
        match self {
            Type::StructRef(name) => Some(name),
            Type::FixedArray(array) => array.base.referenced_struct(),
            Type::VarArray(array) => array.base.referenced_struct(),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: Type) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct UnionCase {
    /// `None` marks the catch-all default case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<IntegerList>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl UnionCase {
    pub fn is_default(&self) -> bool {
        self.case.is_none()
    }

    /// A case whose body contains `fail` can never be decoded.
    pub fn is_disallowed(&self) -> bool {
        self.members.iter().any(|m| matches!(m, Member::Fail))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct UnionMember {
    pub name: String,
    pub tag: IdRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthConstraint>,
    pub cases: Vec<UnionCase>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum Member {
    Field(Field),
    Union(UnionMember),
    /// Assert that no input remains at this point.
    Eos,
    /// Consume the remaining input of the current region without interpreting it.
    Ignore,
    /// This branch is structurally impossible.
    Fail,
}

impl Member {
    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Field(field) => Some(&field.name),
            Member::Union(union) => Some(&union.name),
            Member::Eos | Member::Ignore | Member::Fail => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    pub name: String,
    #[serde(default, with = "serde_yml::with::singleton_map_recursive")]
    pub fields: Vec<Field>,
}

impl Context {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Struct {
    pub name: String,
    /// Names of the contexts threaded into this struct's decode, in order.
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default, with = "serde_yml::with::singleton_map_recursive")]
    pub members: Vec<Member>,
    #[serde(rename = "extern", default)]
    pub is_extern: bool,
}

impl Struct {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            contexts: Vec::new(),
            members,
            is_extern: false,
        }
    }

    pub fn with_contexts(mut self, contexts: Vec<String>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn is_extern(&self) -> bool {
        self.is_extern
    }

    /// Top-level fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Constant {
    pub name: String,
    pub value: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct File {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub structs: Vec<Struct>,
}

impl File {
    pub fn find_struct(&self, name: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }
}
