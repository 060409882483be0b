use serde::{Deserialize, Serialize};

/// Errors and translation faults raised by vmsim. Faults carry the virtual page number that
/// caused them so an external handler can decide between page-in and termination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    /// The mapping exists but access to it is forbidden.
    ProtectionFault { vpn: u64 },
    /// No valid mapping exists for the page.
    SegmentationFault { vpn: u64 },
    /// The page is mapped and accessible but not resident in physical memory.
    PageFault { vpn: u64 },
    /// Invalid data, typically a malformed page table image.
    InvalidData(String),
    /// Invalid user input, typically a bad configuration value.
    InvalidInput(String),
    /// An IO error.
    IO(String),
    ArithmeticOverflow,
}

impl Error {
    /// Whether this is one of the translation faults rather than an operational error.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Error::ProtectionFault { .. } | Error::SegmentationFault { .. } | Error::PageFault { .. }
        )
    }

    /// The faulting virtual page number, if this is a translation fault.
    pub fn fault_vpn(&self) -> Option<u64> {
        match self {
            Error::ProtectionFault { vpn }
            | Error::SegmentationFault { vpn }
            | Error::PageFault { vpn } => Some(*vpn),
            _ => None,
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ProtectionFault { vpn } => write!(f, "protection fault at vpn {vpn:#x}"),
            Error::SegmentationFault { vpn } => write!(f, "segmentation fault at vpn {vpn:#x}"),
            Error::PageFault { vpn } => write!(f, "page fault at vpn {vpn:#x}"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::IO(msg) => write!(f, "io error: {msg}"),
            Error::ArithmeticOverflow => write!(f, "arithmetic overflow"),
        }
    }
}

/// Constructs an Error::InvalidData for the given format string.
#[macro_export]
macro_rules! errdata {
    ($($args:tt)*) => { $crate::Error::InvalidData(format!($($args)*)).into() };
}

/// Constructs an Error::InvalidInput for the given format string.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => { $crate::Error::InvalidInput(format!($($args)*)).into() };
}

/// A vmsim Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err.to_string())
    }
}
