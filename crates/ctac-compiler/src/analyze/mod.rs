//! Semantic analysis passes.
//!
//! - `symbol_table` - name to symbol bindings with linkage and init state
//! - `type_table` - struct/union tag to layout bindings
//! - `types` - size/alignment/classification predicates and conversions
//! - `resolve` - scope-disciplined identifier and tag validation
//! - `typecheck` - expression/statement/declaration typing and cast insertion
//! - `static_init` - initializer lowering to flat init records
//! - `const_convert` - literal conversion between arithmetic types

pub mod const_convert;
pub mod resolve;
pub mod static_init;
pub mod symbol_table;
pub mod type_table;
pub mod typecheck;
pub mod types;

#[cfg(test)]
mod resolve_tests;
#[cfg(test)]
mod static_init_tests;
#[cfg(test)]
mod symbol_table_tests;
#[cfg(test)]
mod type_table_tests;
#[cfg(test)]
mod types_tests;

pub use resolve::Resolver;
pub use symbol_table::{InitState, Symbol, SymbolKind, SymbolTable};
pub use type_table::{FieldDef, StructDef, TypeTable};
pub use typecheck::TypeChecker;

/// A fatal semantic-analysis error.
///
/// Every failure during resolution, type checking, or initializer lowering
/// is carried as one of these; the driver prints it to stderr and exits
/// with status 1.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SemanticError {
    // Lookup failures
    #[error("Symbol '{0}' not found")]
    SymbolNotFound(String),
    #[error("Undeclared variable {0}")]
    UndeclaredVariable(String),
    #[error("Undeclared function {0}")]
    UndeclaredFunction(String),
    #[error("Undeclared structure type {0}")]
    UndeclaredStructure(String),

    // Redeclarations
    #[error("Duplicate variable declaration {0}")]
    DuplicateVariable(String),
    #[error("Duplicate declaration {0}")]
    DuplicateDeclaration(String),
    #[error("Re-declared structure type {0}")]
    RedeclaredStructure(String),
    #[error("Variable {0} redeclared with different type")]
    RedeclaredDifferentType(String),
    #[error("Redeclared function {0} with different type")]
    RedeclaredFunctionType(String),
    #[error("Defined function {0} twice")]
    FunctionDefinedTwice(String),
    #[error("Static function declaration follows non-static")]
    StaticAfterNonStatic,
    #[error("Conflicting variable linkage")]
    ConflictingLinkage,
    #[error("Conflicting global variable definition")]
    ConflictingDefinition,

    // Type mismatches
    #[error("Cannot convert type for assignment")]
    AssignmentConversion,
    #[error("Invalid operands for {0}")]
    InvalidOperands(&'static str),
    #[error("Can only {0} arithmetic types")]
    ArithmeticOnly(&'static str),
    #[error("Bitwise complement only valid for integer types")]
    ComplementNonInteger,
    #[error("Can't apply % to double")]
    RemainderOnDouble,
    #[error("Invalid types for comparison")]
    InvalidComparison,
    #[error("Incompatible pointer types")]
    IncompatiblePointers,
    #[error("Invalid types for subscript operation")]
    InvalidSubscript,
    #[error("Cannot cast between pointer and double")]
    CastBetweenPointerAndDouble,
    #[error("Can only cast scalar types")]
    CastNonScalar,
    #[error("Switch condition must have integer type")]
    SwitchNotInteger,

    // Lvalue and value-category failures
    #[error("Left hand side of assignment is invalid lvalue")]
    InvalidLvalue,
    #[error("Cannot take address of non-lvalue")]
    AddressOfNonLvalue,
    #[error("Target of increment is not an lvalue")]
    IncrementNonLvalue,
    #[error("Tried to dereference non-pointer")]
    DerefNonPointer,
    #[error("Can't dereference pointer to void")]
    DerefVoidPointer,
    #[error("A scalar operand is required")]
    ScalarRequired,

    // Completeness
    #[error("Array of incomplete type")]
    IncompleteArrayElement,
    #[error("Can't apply sizeof to incomplete type")]
    SizeofIncomplete,
    #[error("Cannot define a variable with incomplete type")]
    IncompleteVariable,
    #[error("Incomplete structure type not permitted")]
    IncompleteStructExpr,

    // Structure rules
    #[error("Can't declare structure member with function type")]
    MemberFunctionType,
    #[error("Cannot declare structure member with incomplete type")]
    MemberIncomplete,
    #[error("Duplicate member {member} in structure {tag}")]
    DuplicateMember { tag: String, member: String },
    #[error("Struct {tag} has no member {member}")]
    NoSuchMember { tag: String, member: String },
    #[error("Dot operator requires structure type")]
    DotOnNonStruct,
    #[error("Arrow operator requires pointer to structure")]
    ArrowOnNonStructPtr,

    // Initializers
    #[error("Too many values in initializer")]
    TooManyInitializers,
    #[error("Too many values in static initializer")]
    TooManyStaticInitializers,
    #[error("Too many elements in structure initializer")]
    TooManyStructInitializers,
    #[error("Too many characters in string literal")]
    TooManyChars,
    #[error("Can't initialize array of non-character type with string literal")]
    StringIntoNonCharArray,
    #[error("String literal can only initialize char *")]
    StringIntoWrongPointer,
    #[error("Can't initialize array from scalar value")]
    ArrayFromScalar,
    #[error("Can't initialize scalar value from compound initializer")]
    ScalarFromCompound,
    #[error("Invalid static initializer for type {0}")]
    InvalidStaticInitializer(String),
    #[error("Initializer on local extern declaration")]
    ExternInitializer,

    // Function rules
    #[error("A function cannot return an array")]
    FunctionReturnsArray,
    #[error("No void params allowed")]
    VoidParam,
    #[error("Void function cannot return a value")]
    VoidReturn,
    #[error("Function called with wrong number of arguments")]
    WrongArgCount,
    #[error("Tried to use function name as variable")]
    FunctionAsVariable,
    #[error("Tried to use variable as function name")]
    VariableAsFunction,
    #[error("Function call requires variable name")]
    CallNotVariable,
    #[error("Can't define function with incomplete types")]
    FunctionIncomplete,
    #[error("Function has non-function type")]
    NonFunctionType,
    #[error("Parameter name omitted in function definition")]
    ParamNameOmitted,
    #[error("No void declarations")]
    VoidDeclaration,
    #[error("Storage class not permitted in for loop header")]
    StorageClassInForInit,

    // Loop labelling
    #[error("Break statement outside of loop or switch")]
    BreakOutside,
    #[error("Continue statement outside of loop")]
    ContinueOutside,
    #[error("Case label outside of switch")]
    CaseOutsideSwitch,
    #[error("Default label outside of switch")]
    DefaultOutsideSwitch,
    #[error("Duplicate case value {0}")]
    DuplicateCase(i64),
    #[error("Duplicate default label")]
    DuplicateDefault,
    #[error("Case expression is not constant")]
    CaseNotConstant,

    // Type-utility failures
    #[error("Type {0} has no size")]
    NoSize(String),
    #[error("Type {0} has no alignment")]
    NoAlignment(String),
    #[error("Signedness doesn't make sense for non-integral type {0}")]
    SignednessNonIntegral(String),
    #[error("Array size not specified")]
    ArraySizeMissing,
    #[error("Array size is not literal")]
    ArraySizeNotLiteral,
    #[error("Can't convert constant to non-scalar type {0}")]
    ConstConvertNonScalar(String),

    // Unsupported constructs and internal limits
    #[error("Unsupported type kind {0}")]
    UnsupportedType(String),
    #[error("{0} are not supported")]
    Unsupported(&'static str),
    #[error("Static assertion failed")]
    StaticAssertFailed,
}
