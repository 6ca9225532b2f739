//! Crate-level error taxonomy.
use core::fmt;

/// Errors returned synchronously by [`crate::session::ClientSession`] operations.
///
/// Asynchronous failures (a non-zero provider write status, or a transport
/// failure reported after a command has already been dispatched) are not
/// returned here — they are surfaced to the event sink as
/// [`crate::event::Event::NpError`] instead.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// An argument was out of range, or a malformed input was supplied
    /// (e.g. an app id with `len == 0`, or a storage buffer with
    /// `max_len` outside `1..=32`).
    Invalid,
    /// The ANCS service uuid did not match at handle assignment.
    NotSupported,
    /// A subscription enable was requested twice.
    AlreadyDone,
    /// A subscription disable was requested on a channel that was never enabled.
    NotEnabled,
    /// The Control Point mutex could not be acquired within the caller's timeout.
    Busy,
    /// Encoding the command would have exceeded the Control Point staging buffer.
    NoSpace,
    /// The transport reported a failure with its own error type.
    Transport(E),
    /// The connection was lost while this operation was in flight.
    Disconnected,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid argument"),
            Self::NotSupported => write!(f, "service not supported"),
            Self::AlreadyDone => write!(f, "already done"),
            Self::NotEnabled => write!(f, "not enabled"),
            Self::Busy => write!(f, "control point busy"),
            Self::NoSpace => write!(f, "no space in staging buffer"),
            Self::Transport(e) => write!(f, "transport error: {e:?}"),
            Self::Disconnected => write!(f, "connection lost"),
        }
    }
}

impl<E> From<CodecError> for Error<E> {
    fn from(_: CodecError) -> Self {
        Self::NoSpace
    }
}

/// Raised by [`crate::cursor::WriteCursor`] when a write would overflow its buffer.
///
/// Kept distinct from [`Error`] so that leaf encoders (which do not know about
/// transport error types) can return it and let callers convert with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecError;
