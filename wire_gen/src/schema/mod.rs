pub mod resolved;

// Re-export from wire_types so generator code has one import root
pub use wire_types::{
    ConstantExpression, Constant, Context, Field, File, FixedArrayType, IdRef, IntType, IntWidth,
    Integer, IntegerList, IntegerRange, LengthConstraint, Member, Struct, Type, UnionCase,
    UnionMember, VarArrayType,
};
