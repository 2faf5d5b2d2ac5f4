use super::error_code::{ErrorCode, ErrorType};

// Scope resolution

pub const DUPLICATE_DECLARATION: ErrorCode = ErrorCode {
    code: "E101",
    title: "DUPLICATE DECLARATION",
    error_type: ErrorType::Compiler,
    message: "`{}` is already declared in this scope.",
    hint: Some("Rename one of the declarations or remove the earlier one."),
};

pub const IDENTIFIER_NOT_DECLARED: ErrorCode = ErrorCode {
    code: "E102",
    title: "IDENTIFIER NOT DECLARED",
    error_type: ErrorType::Compiler,
    message: "Identifier `{}` is not declared.",
    hint: None,
};

// Module construction

pub const DUPLICATE_EXPORT: ErrorCode = ErrorCode {
    code: "E110",
    title: "DUPLICATE EXPORT",
    error_type: ErrorType::Compiler,
    message: "`{}` is exported more than once.",
    hint: Some("Each public name of a module must be exported exactly once."),
};

pub const INVALID_MODULE: ErrorCode = ErrorCode {
    code: "E111",
    title: "INVALID MODULE",
    error_type: ErrorType::Compiler,
    message: "Module is invalid: {}.",
    hint: None,
};

pub const UNSUITABLE_MODULE_NAME: ErrorCode = ErrorCode {
    code: "E112",
    title: "UNSUITABLE MODULE NAME",
    error_type: ErrorType::Compiler,
    message: "`{}` is not a suitable module name.",
    hint: Some("Module names must be qualified, for example `com.example.clock`."),
};

pub const UNSUITABLE_DEFINITION_NAME: ErrorCode = ErrorCode {
    code: "W113",
    title: "UNSUITABLE DEFINITION NAME",
    error_type: ErrorType::Compiler,
    message: "`{}` is not a suitable definition name.",
    hint: Some("Names made only of lowercase letters are reserved for keywords."),
};

// Literals

pub const INTEGER_LITERAL_MALFORMED: ErrorCode = ErrorCode {
    code: "E120",
    title: "MALFORMED INTEGER",
    error_type: ErrorType::Compiler,
    message: "`{}` is not a valid integer literal.",
    hint: None,
};

pub const INTEGER_LITERAL_TOO_BIG: ErrorCode = ErrorCode {
    code: "E121",
    title: "INTEGER TOO BIG",
    error_type: ErrorType::Compiler,
    message: "Integer literal `{}` does not fit in 32 bits.",
    hint: None,
};

pub const REAL_LITERAL_MALFORMED: ErrorCode = ErrorCode {
    code: "E122",
    title: "MALFORMED REAL",
    error_type: ErrorType::Compiler,
    message: "`{}` is not a valid real literal.",
    hint: None,
};

pub const REAL_LITERAL_TOO_BIG: ErrorCode = ErrorCode {
    code: "E123",
    title: "REAL TOO BIG",
    error_type: ErrorType::Compiler,
    message: "Real literal `{}` is too big.",
    hint: None,
};

pub const ILLEGAL_STRING_ESCAPE: ErrorCode = ErrorCode {
    code: "E124",
    title: "ILLEGAL ESCAPE",
    error_type: ErrorType::Compiler,
    message: "Illegal escape sequence in string literal at byte {}.",
    hint: Some("Supported escapes are \\q, \\n, \\r, \\t, \\\\ and \\u{...}."),
};

pub const EMPTY_UNICODE_ESCAPE: ErrorCode = ErrorCode {
    code: "W125",
    title: "EMPTY UNICODE ESCAPE",
    error_type: ErrorType::Compiler,
    message: "Empty unicode escape at byte {} decodes to U+0000.",
    hint: None,
};

pub const UNICODE_ESCAPE_OUT_OF_RANGE: ErrorCode = ErrorCode {
    code: "W126",
    title: "UNICODE ESCAPE OUT OF RANGE",
    error_type: ErrorType::Compiler,
    message: "Unicode escape at byte {} is not a valid code point and decodes to U+FFFD.",
    hint: None,
};

// Loading

pub const MALFORMED_MODULE_IMAGE: ErrorCode = ErrorCode {
    code: "E130",
    title: "MALFORMED MODULE",
    error_type: ErrorType::Loader,
    message: "Cannot read module image: {}.",
    hint: None,
};

pub const PACKAGE_UNREADABLE: ErrorCode = ErrorCode {
    code: "E131",
    title: "PACKAGE UNREADABLE",
    error_type: ErrorType::Loader,
    message: "Cannot load package: {}.",
    hint: None,
};

pub const UNRESOLVED_DEPENDENCY: ErrorCode = ErrorCode {
    code: "E132",
    title: "UNRESOLVED DEPENDENCY",
    error_type: ErrorType::Loader,
    message: "Module `{}` depends on `{}`, which cannot be found.",
    hint: None,
};

pub const MISSING_IMPORT: ErrorCode = ErrorCode {
    code: "E133",
    title: "MISSING IMPORT",
    error_type: ErrorType::Loader,
    message: "Module `{}` imports `{}` from `{}`, which does not export it.",
    hint: None,
};

pub const IMPORT_KIND_MISMATCH: ErrorCode = ErrorCode {
    code: "E134",
    title: "IMPORT KIND MISMATCH",
    error_type: ErrorType::Loader,
    message: "Module `{}` imports {} `{}` from `{}`, which exports a {}.",
    hint: None,
};

pub const DEPENDENCY_CYCLE: ErrorCode = ErrorCode {
    code: "E135",
    title: "DEPENDENCY CYCLE",
    error_type: ErrorType::Loader,
    message: "Module `{}` depends on itself.",
    hint: None,
};

pub const MODULE_NOT_USABLE: ErrorCode = ErrorCode {
    code: "E136",
    title: "MODULE NOT USABLE",
    error_type: ErrorType::Loader,
    message: "{}.",
    hint: None,
};
