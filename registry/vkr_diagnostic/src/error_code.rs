use std::fmt;

/// Error codes for all registry diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Document errors
/// - E2xxx: Name resolution errors
/// - E3xxx: Version/extension directive errors
/// - E9xxx: Internal consistency errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Document Errors (E1xxx)
    /// Malformed document structure
    E1001,
    /// Required top-level section missing
    E1002,
    /// Registry document unreadable
    E1003,

    // Name Resolution Errors (E2xxx)
    /// Unknown type name
    E2001,
    /// Unknown command name
    E2002,
    /// Alias-to-alias cycle
    E2003,
    /// Dynamic array length reference cannot be resolved
    E2004,
    /// Unknown enumeration value name
    E2005,
    /// Unknown API constant
    E2006,
    /// Unknown platform name
    E2007,

    // Directive Errors (E3xxx)
    /// Require/remove directive names an unknown entity
    E3001,

    // Internal Errors (E9xxx)
    /// Command matches no dispatch class rule
    E9001,
}

impl ErrorCode {
    pub fn is_document_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_internal(&self) -> bool {
        self.as_str().starts_with("E9")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            // Document
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            // Names
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            // Directives
            ErrorCode::E3001 => "E3001",
            // Internal
            ErrorCode::E9001 => "E9001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
