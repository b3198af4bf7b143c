//! Unitscape error codes following a structured numbering system
//!
//! Error code ranges:
//! - UNS0001-UNS0099: Structural errors (required or well-formed property missing)
//! - UNS0100-UNS0199: Referential errors (a named reference does not resolve)
//! - UNS0200-UNS0299: Graph errors (cyclic or dangling dependency chains)
//! - UNS0300-UNS0399: Contradiction and redundancy (conflicting or repeated declarations)
//! - UNS0400-UNS0499: System errors (I/O, manifest loading)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a structural error (0001-0099)
    pub const fn is_structural(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a referential error (0100-0199)
    pub const fn is_referential(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a graph error (0200-0299)
    pub const fn is_graph(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a contradiction or redundancy (0300-0399)
    pub const fn is_contradiction(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNS{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Structural errors (0001-0099)
    map.insert(1, ErrorInfo::new("Required property not set"));
    map.insert(2, ErrorInfo::new("Invalid unit instance name"));
    map.insert(3, ErrorInfo::new("Invalid unit instance plural form"));
    map.insert(4, ErrorInfo::new("Invalid expression"));
    map.insert(5, ErrorInfo::new("Invalid derivation expression")
        .with_help("Reference every signature element with a {index} placeholder"));
    map.insert(6, ErrorInfo::new("Invalid derivation signature"));
    map.insert(7, ErrorInfo::new("Expected a non-empty list"));
    map.insert(8, ErrorInfo::new("Invalid constant name"));
    map.insert(9, ErrorInfo::new("Unexpected vector dimension"));
    map.insert(10, ErrorInfo::new("Invalid vector dimension"));
    map.insert(11, ErrorInfo::new("Invalid process name"));

    // Referential errors (0100-0199)
    map.insert(100, ErrorInfo::new("Original quantity not recognized")
        .with_help("The original quantity of a specialization must be declared as a quantity of the same kind"));
    map.insert(101, ErrorInfo::new("Expected a unit"));
    map.insert(102, ErrorInfo::new("Expected a scalar quantity"));
    map.insert(103, ErrorInfo::new("Expected a vector quantity"));
    map.insert(104, ErrorInfo::new("Expected a quantity"));
    map.insert(105, ErrorInfo::new("Unrecognized unit instance name"));
    map.insert(106, ErrorInfo::new("Unrecognized derivation ID"));
    map.insert(107, ErrorInfo::new("Derived unit instance does not match the derivation signature"));
    map.insert(108, ErrorInfo::new("Unit does not include a bias term"));

    // Graph errors (0200-0299)
    map.insert(200, ErrorInfo::new("Unresolvable unit instance")
        .with_help("The instance depends on itself, directly or indirectly, or on an instance that is not declared by the unit"));
    map.insert(201, ErrorInfo::new("Circular specialization"));

    // Contradiction and redundancy (0300-0399)
    map.insert(300, ErrorInfo::new("Duplicate definition"));
    map.insert(301, ErrorInfo::new("Type already defined as another kind"));
    map.insert(302, ErrorInfo::new("Contradictory attributes"));
    map.insert(303, ErrorInfo::new("Duplicate unit instance name"));
    map.insert(304, ErrorInfo::new("Duplicate unit instance plural form"));
    map.insert(305, ErrorInfo::new("Derivable unit includes a bias term"));
    map.insert(306, ErrorInfo::new("Ambiguous derivation")
        .with_help("Name every derivation when a unit declares more than one"));
    map.insert(307, ErrorInfo::new("Duplicate derivation ID"));
    map.insert(308, ErrorInfo::new("Duplicate derivation signature"));
    map.insert(309, ErrorInfo::new("Item has already been listed"));
    map.insert(310, ErrorInfo::new("Inclusion or exclusion had no effect"));
    map.insert(311, ErrorInfo::new("Duplicate constant name"));
    map.insert(312, ErrorInfo::new("Constant shares name with unit instance"));
    map.insert(313, ErrorInfo::new("Quantity convertible to itself"));
    map.insert(314, ErrorInfo::new("Difference disabled but quantity specified"));
    map.insert(315, ErrorInfo::new("Duplicate process name"));
    map.insert(316, ErrorInfo::new("Duplicate quantity operation"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Invalid declaration manifest"));
    map.insert(403, ErrorInfo::new("File not found"));

    map
});

// Structural errors
pub const MISSING_REQUIRED_PROPERTY: ErrorCode = ErrorCode::new(1);
pub const INVALID_UNIT_INSTANCE_NAME: ErrorCode = ErrorCode::new(2);
pub const INVALID_UNIT_INSTANCE_PLURAL_FORM: ErrorCode = ErrorCode::new(3);
pub const INVALID_EXPRESSION: ErrorCode = ErrorCode::new(4);
pub const INVALID_DERIVATION_EXPRESSION: ErrorCode = ErrorCode::new(5);
pub const INVALID_DERIVATION_SIGNATURE: ErrorCode = ErrorCode::new(6);
pub const EMPTY_LIST: ErrorCode = ErrorCode::new(7);
pub const INVALID_CONSTANT_NAME: ErrorCode = ErrorCode::new(8);
pub const VECTOR_UNEXPECTED_DIMENSION: ErrorCode = ErrorCode::new(9);
pub const INVALID_VECTOR_DIMENSION: ErrorCode = ErrorCode::new(10);
pub const INVALID_PROCESS_NAME: ErrorCode = ErrorCode::new(11);

// Referential errors
pub const UNRECOGNIZED_ORIGINAL_QUANTITY: ErrorCode = ErrorCode::new(100);
pub const TYPE_NOT_UNIT: ErrorCode = ErrorCode::new(101);
pub const TYPE_NOT_SCALAR: ErrorCode = ErrorCode::new(102);
pub const TYPE_NOT_VECTOR: ErrorCode = ErrorCode::new(103);
pub const TYPE_NOT_QUANTITY: ErrorCode = ErrorCode::new(104);
pub const UNRECOGNIZED_UNIT_INSTANCE_NAME: ErrorCode = ErrorCode::new(105);
pub const UNRECOGNIZED_DERIVATION_ID: ErrorCode = ErrorCode::new(106);
pub const DERIVATION_ARITY_MISMATCH: ErrorCode = ErrorCode::new(107);
pub const UNIT_NOT_INCLUDING_BIAS_TERM: ErrorCode = ErrorCode::new(108);

// Graph errors
pub const UNRESOLVABLE_UNIT_INSTANCE: ErrorCode = ErrorCode::new(200);
pub const CIRCULAR_SPECIALIZATION: ErrorCode = ErrorCode::new(201);

// Contradiction and redundancy
pub const DUPLICATE_DEFINITION: ErrorCode = ErrorCode::new(300);
pub const TYPE_ALREADY_DEFINED: ErrorCode = ErrorCode::new(301);
pub const CONTRADICTORY_ATTRIBUTES: ErrorCode = ErrorCode::new(302);
pub const DUPLICATE_UNIT_INSTANCE_NAME: ErrorCode = ErrorCode::new(303);
pub const DUPLICATE_UNIT_INSTANCE_PLURAL_FORM: ErrorCode = ErrorCode::new(304);
pub const UNIT_INCLUDES_BIAS_TERM: ErrorCode = ErrorCode::new(305);
pub const AMBIGUOUS_DERIVATION: ErrorCode = ErrorCode::new(306);
pub const DUPLICATE_DERIVATION_ID: ErrorCode = ErrorCode::new(307);
pub const DUPLICATE_DERIVATION_SIGNATURE: ErrorCode = ErrorCode::new(308);
pub const DUPLICATE_LISTING: ErrorCode = ErrorCode::new(309);
pub const INCLUSION_OR_EXCLUSION_HAD_NO_EFFECT: ErrorCode = ErrorCode::new(310);
pub const DUPLICATE_CONSTANT_NAME: ErrorCode = ErrorCode::new(311);
pub const CONSTANT_SHARES_NAME_WITH_UNIT: ErrorCode = ErrorCode::new(312);
pub const QUANTITY_CONVERTIBLE_TO_SELF: ErrorCode = ErrorCode::new(313);
pub const DIFFERENCE_DISABLED_BUT_QUANTITY_SPECIFIED: ErrorCode = ErrorCode::new(314);
pub const DUPLICATE_PROCESS_NAME: ErrorCode = ErrorCode::new(315);
pub const DUPLICATE_QUANTITY_OPERATION: ErrorCode = ErrorCode::new(316);

// System errors
pub const INTERNAL_ERROR: ErrorCode = ErrorCode::new(400);
pub const IO_ERROR: ErrorCode = ErrorCode::new(401);
pub const INVALID_MANIFEST: ErrorCode = ErrorCode::new(402);
pub const FILE_NOT_FOUND: ErrorCode = ErrorCode::new(403);
