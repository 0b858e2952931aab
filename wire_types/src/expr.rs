use serde_derive::{Deserialize, Serialize};
use std::fmt;

pub trait ConstantExpression {
    fn is_constant(&self) -> bool;
}

/// A named reference to an integer known only at decode time.
///
/// Without a scope the reference names a sibling field of the enclosing
/// struct that has already been decoded. With a scope it names a field of the
/// context parameter of that name.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
#[serde(rename_all = "kebab-case")]
pub struct IdRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub name: String,
}

impl IdRef {
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            scope: None,
            name: name.into(),
        }
    }

    pub fn context(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}.{}", scope, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// An integer appearing in a format description.
///
/// In documents a literal is a bare number, a named constant is a bare string
/// and a reference is a `{scope?, name}` map.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(untagged)]
pub enum Integer {
    Literal(i64),
    Const(String),
    Ref(IdRef),
}

impl ConstantExpression for Integer {
    fn is_constant(&self) -> bool {
        match self {
            Integer::Literal(_) => true,
            Integer::Const(_) => true,
            Integer::Ref(_) => false, // Field and context references are never constant
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::Literal(value) => write!(f, "{}", value),
            Integer::Const(name) => f.write_str(name),
            Integer::Ref(id_ref) => write!(f, "{}", id_ref),
        }
    }
}

/// An inclusive range, or a single value when `high` is absent.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct IntegerRange {
    pub low: Integer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Integer>,
}

impl IntegerRange {
    pub fn single(value: Integer) -> Self {
        Self {
            low: value,
            high: None,
        }
    }

    pub fn span(low: Integer, high: Integer) -> Self {
        Self {
            low,
            high: Some(high),
        }
    }
}

/// A union of ranges and singleton values. Used both for integer range
/// constraints and for union case labels.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct IntegerList {
    pub ranges: Vec<IntegerRange>,
}

impl IntegerList {
    pub fn new(ranges: Vec<IntegerRange>) -> Self {
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl ConstantExpression for IntegerList {
    fn is_constant(&self) -> bool {
        self.ranges.iter().all(|range| {
            range.low.is_constant() && range.high.as_ref().map_or(true, |high| high.is_constant())
        })
    }
}

/// Length policy for variable arrays and length-delimited regions. Absence of
/// a constraint (`None` at the use site) means "consume until input ends".
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum LengthConstraint {
    /// Exactly this many elements or bytes; constant or a runtime reference.
    Count(Integer),
    /// Everything except this many trailing bytes.
    Leftover(Integer),
}

impl ConstantExpression for LengthConstraint {
    fn is_constant(&self) -> bool {
        match self {
            LengthConstraint::Count(count) => count.is_constant(),
            LengthConstraint::Leftover(reserved) => reserved.is_constant(),
        }
    }
}
