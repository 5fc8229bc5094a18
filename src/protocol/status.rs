//! Response status codes and their error classification

use std::fmt;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Status {
    Success = 0x0000,
    KeyNotFound = 0x0001,
    KeyExists = 0x0002,
    ValueTooLarge = 0x0003,
    InvalidArguments = 0x0004,
    NotStored = 0x0005,
    DeltaBadval = 0x0006,
    NotMyVbucket = 0x0007,
    AuthError = 0x0020,
    AuthContinue = 0x0021,
    AccessDenied = 0x0024,
    UnknownCommand = 0x0081,
    OutOfMemory = 0x0082,
    NotSupported = 0x0083,
    InternalError = 0x0084,
    Busy = 0x0085,
    TemporaryFailure = 0x0086,
}

impl Status {
    /// Every defined status, in code order
    pub const ALL: [Status; 17] = [
        Status::Success,
        Status::KeyNotFound,
        Status::KeyExists,
        Status::ValueTooLarge,
        Status::InvalidArguments,
        Status::NotStored,
        Status::DeltaBadval,
        Status::NotMyVbucket,
        Status::AuthError,
        Status::AuthContinue,
        Status::AccessDenied,
        Status::UnknownCommand,
        Status::OutOfMemory,
        Status::NotSupported,
        Status::InternalError,
        Status::Busy,
        Status::TemporaryFailure,
    ];

    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|status| *status as u16 == value)
    }

    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::KeyNotFound => "Not found",
            Status::KeyExists => "Data exists for key",
            Status::ValueTooLarge => "Too large",
            Status::InvalidArguments => "Invalid arguments",
            Status::NotStored => "Not stored",
            Status::DeltaBadval => "Non-numeric server-side value for incr or decr",
            Status::NotMyVbucket => "I'm not responsible for this vbucket",
            Status::AuthError => "Auth failure",
            Status::AuthContinue => "Auth continue",
            Status::AccessDenied => "No access",
            Status::UnknownCommand => "Unknown command",
            Status::OutOfMemory => "Out of memory",
            Status::NotSupported => "Not supported",
            Status::InternalError => "Internal error",
            Status::Busy => "Server too busy",
            Status::TemporaryFailure => "Temporary failure",
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> u16 {
        status as u16
    }
}

/// Text for a raw status code, including codes this client does not know
pub fn status_text(code: u16) -> &'static str {
    Status::from_u16(code)
        .map(|status| status.as_str())
        .unwrap_or("Unknown error code")
}

/// A non-success response status.
///
/// The classification predicates are mutually exclusive: at most one is true,
/// and codes outside those eight classes leave all of them false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    reason: u16,
    context: String,
}

impl StatusError {
    pub fn new(reason: u16, context: impl Into<String>) -> Self {
        Self {
            reason,
            context: context.into(),
        }
    }

    /// Raw status code as received
    pub fn reason(&self) -> u16 {
        self.reason
    }

    pub fn status(&self) -> Option<Status> {
        Status::from_u16(self.reason)
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Human-readable text for known codes
    pub fn message(&self) -> Option<&'static str> {
        self.status().map(|status| status.as_str())
    }

    fn is(&self, status: Status) -> bool {
        self.reason == status as u16
    }

    pub fn is_invalid_arguments(&self) -> bool {
        self.is(Status::InvalidArguments)
    }

    pub fn is_already_exists(&self) -> bool {
        self.is(Status::KeyExists)
    }

    pub fn is_not_found(&self) -> bool {
        self.is(Status::KeyNotFound)
    }

    pub fn is_not_my_vbucket(&self) -> bool {
        self.is(Status::NotMyVbucket)
    }

    pub fn is_not_stored(&self) -> bool {
        self.is(Status::NotStored)
    }

    pub fn is_access_denied(&self) -> bool {
        self.is(Status::AccessDenied)
    }

    pub fn is_delta_badval(&self) -> bool {
        self.is(Status::DeltaBadval)
    }

    pub fn is_auth_error(&self) -> bool {
        self.is(Status::AuthError)
    }

    /// Transient server conditions worth retrying
    pub fn is_temporary(&self) -> bool {
        self.is(Status::Busy) || self.is(Status::TemporaryFailure)
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.context, status_text(self.reason), self.reason)
    }
}

impl std::error::Error for StatusError {}

/// Map a status code to `Ok` on success, `Err` otherwise
pub fn check_status(code: u16, context: impl Into<String>) -> Result<(), StatusError> {
    if code == Status::Success as u16 {
        Ok(())
    } else {
        Err(StatusError::new(code, context))
    }
}
