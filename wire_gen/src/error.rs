use thiserror::Error;

/// Errors raised while compiling a format description. Each one aborts
/// generation for the whole compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("{owner}.{field}: reference to undeclared struct '{name}'")]
    UnresolvedStructReference {
        owner: String,
        field: String,
        name: String,
    },

    #[error("{owner}.{field}: unresolved integer reference '{name}'")]
    UnresolvedIntegerReference {
        owner: String,
        field: String,
        name: String,
    },

    #[error("{owner}.{field}: context '{context}' is not a parameter of '{owner}'")]
    MissingContextArgument {
        owner: String,
        field: String,
        context: String,
    },

    #[error("{owner}: declares unknown context '{context}'")]
    UnknownContext { owner: String, context: String },

    #[error("context {context}.{field}: context fields must be integers")]
    InvalidContextField { context: String, field: String },

    #[error("duplicate {kind} '{name}'")]
    DuplicateDefinition { kind: &'static str, name: String },

    #[error("{owner}: duplicate member '{name}'")]
    DuplicateMember { owner: String, name: String },

    #[error("{owner}: member name '{name}' is reserved")]
    ReservedName { owner: String, name: String },

    #[error("{owner}.{field}: '{name}' must be a generation-time constant")]
    ExpectedConstant {
        owner: String,
        field: String,
        name: String,
    },

    #[error("{owner}.{field}: value {value} does not fit in {bits} bits")]
    ConstantOutOfRange {
        owner: String,
        field: String,
        value: i64,
        bits: u32,
    },

    #[error("{owner}.{field}: empty range {low}..{high}")]
    InvalidRange {
        owner: String,
        field: String,
        low: i64,
        high: i64,
    },

    #[error("{owner}.{field}: default case must be the last case")]
    MisplacedDefault { owner: String, field: String },

    #[error("{owner}.{field}: {reason}")]
    InvalidMember {
        owner: String,
        field: String,
        reason: String,
    },

    #[error("{owner}.{field}: elements may occupy no bytes, so a count read while decoding cannot bound the array")]
    ZeroSizedElement { owner: String, field: String },

    #[error("no struct named '{name}'")]
    UnknownStruct { name: String },

    #[error("structs contain each other unconditionally: {}", cycle.join(" -> "))]
    InfiniteStruct { cycle: Vec<String> },
}

pub type GenResult<T> = Result<T, GenError>;

/// Names the struct member a generation step is working on, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site<'a> {
    pub owner: &'a str,
    pub field: &'a str,
}

impl<'a> Site<'a> {
    pub fn new(owner: &'a str, field: &'a str) -> Self {
        Self { owner, field }
    }

    pub fn unresolved_struct(&self, name: &str) -> GenError {
        GenError::UnresolvedStructReference {
            owner: self.owner.to_string(),
            field: self.field.to_string(),
            name: name.to_string(),
        }
    }

    pub fn unresolved_integer(&self, name: impl ToString) -> GenError {
        GenError::UnresolvedIntegerReference {
            owner: self.owner.to_string(),
            field: self.field.to_string(),
            name: name.to_string(),
        }
    }

    pub fn missing_context(&self, context: &str) -> GenError {
        GenError::MissingContextArgument {
            owner: self.owner.to_string(),
            field: self.field.to_string(),
            context: context.to_string(),
        }
    }

    pub fn expected_constant(&self, name: impl ToString) -> GenError {
        GenError::ExpectedConstant {
            owner: self.owner.to_string(),
            field: self.field.to_string(),
            name: name.to_string(),
        }
    }

    pub fn invalid(&self, reason: impl Into<String>) -> GenError {
        GenError::InvalidMember {
            owner: self.owner.to_string(),
            field: self.field.to_string(),
            reason: reason.into(),
        }
    }
}
