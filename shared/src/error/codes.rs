//! Unified error codes for Cantine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Client profile errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog and media errors
//! - 7xxx: Event request errors
//! - 8xxx: Document errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the ordering UI can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Email is already registered
    EmailAlreadyRegistered = 1008,
    /// Password too short
    PasswordTooShort = 1009,
    /// Too many attempts
    TooManyAttempts = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Admins cannot demote themselves
    CannotModifySelf = 2004,

    // ==================== 3xxx: Client ====================
    /// Client not found
    ClientNotFound = 3001,
    /// Profile must be completed before ordering
    ProfileIncomplete = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is empty
    OrderEmpty = 4007,
    /// Status change not allowed from the current status
    OrderInvalidTransition = 4008,
    /// Order can no longer be cancelled by the client
    OrderNotCancellable = 4009,
    /// Pickup time is in the past
    OrderPickupInPast = 4010,
    /// Line quantity out of range
    OrderInvalidQuantity = 4011,
    /// Idempotency key reused with a different payload
    OrderIdempotencyMismatch = 4012,

    // ==================== 5xxx: Payment ====================
    /// Payment status change not allowed
    PaymentInvalidTransition = 5001,

    // ==================== 6xxx: Catalog ====================
    /// Dish not found
    DishNotFound = 6001,
    /// Dish has invalid price
    DishInvalidPrice = 6002,
    /// Dish is sold out or outside its availability windows
    DishUnavailable = 6003,
    /// Configuration option not found
    OptionNotFound = 6101,
    /// Configuration option value already exists in category
    OptionValueExists = 6102,

    // ==================== 65xx: Media ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// File storage failed
    FileStorageFailed = 6509,
    /// Media item not found
    MediaNotFound = 6510,

    // ==================== 7xxx: Event ====================
    /// Event request not found
    EventRequestNotFound = 7001,
    /// Event status change not allowed
    EventInvalidTransition = 7002,
    /// Event date is in the past
    EventDateInPast = 7003,

    // ==================== 8xxx: Document ====================
    /// Document not found
    DocumentNotFound = 8001,
    /// Document has no lines
    DocumentEmpty = 8002,
    /// PDF rendering failed
    DocumentRenderFailed = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Integration not configured on this deployment
    ServiceDisabled = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default English message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::TooManyAttempts => "Too many attempts",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifySelf => "Cannot change your own role",

            // Client
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::ProfileIncomplete => "Please complete your profile before ordering",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderInvalidTransition => "Order status change is not allowed",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::OrderPickupInPast => "Pickup time must be in the future",
            ErrorCode::OrderInvalidQuantity => "Quantity is out of range",
            ErrorCode::OrderIdempotencyMismatch => {
                "An order with this idempotency key exists with different content"
            }

            // Payment
            ErrorCode::PaymentInvalidTransition => "Payment status change is not allowed",

            // Catalog
            ErrorCode::DishNotFound => "Dish not found",
            ErrorCode::DishInvalidPrice => "Dish has invalid price",
            ErrorCode::DishUnavailable => "Dish is not available at the requested time",
            ErrorCode::OptionNotFound => "Configuration option not found",
            ErrorCode::OptionValueExists => "Configuration option already exists",

            // Media
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::MediaNotFound => "Media not found",

            // Event
            ErrorCode::EventRequestNotFound => "Event request not found",
            ErrorCode::EventInvalidTransition => "Event request status change is not allowed",
            ErrorCode::EventDateInPast => "Event date must be in the future",

            // Document
            ErrorCode::DocumentNotFound => "Document not found",
            ErrorCode::DocumentEmpty => "Document has no lines",
            ErrorCode::DocumentRenderFailed => "Document rendering failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ServiceDisabled => "Service is not configured",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::EmailAlreadyRegistered),
            1009 => Ok(ErrorCode::PasswordTooShort),
            1010 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifySelf),

            // Client
            3001 => Ok(ErrorCode::ClientNotFound),
            3002 => Ok(ErrorCode::ProfileIncomplete),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidTransition),
            4009 => Ok(ErrorCode::OrderNotCancellable),
            4010 => Ok(ErrorCode::OrderPickupInPast),
            4011 => Ok(ErrorCode::OrderInvalidQuantity),
            4012 => Ok(ErrorCode::OrderIdempotencyMismatch),

            // Payment
            5001 => Ok(ErrorCode::PaymentInvalidTransition),

            // Catalog
            6001 => Ok(ErrorCode::DishNotFound),
            6002 => Ok(ErrorCode::DishInvalidPrice),
            6003 => Ok(ErrorCode::DishUnavailable),
            6101 => Ok(ErrorCode::OptionNotFound),
            6102 => Ok(ErrorCode::OptionValueExists),

            // Media
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6509 => Ok(ErrorCode::FileStorageFailed),
            6510 => Ok(ErrorCode::MediaNotFound),

            // Event
            7001 => Ok(ErrorCode::EventRequestNotFound),
            7002 => Ok(ErrorCode::EventInvalidTransition),
            7003 => Ok(ErrorCode::EventDateInPast),

            // Document
            8001 => Ok(ErrorCode::DocumentNotFound),
            8002 => Ok(ErrorCode::DocumentEmpty),
            8003 => Ok(ErrorCode::DocumentRenderFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ServiceDisabled),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
