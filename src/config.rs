//! Compile-time sizing for session buffers.
//!
//! A module of named constants: sizes are fixed at build time and never
//! grow at runtime.

/// Number of notification attribute kinds defined by ANCS
/// (`AppIdentifier` through `NegativeActionLabel`).
pub const NOTIF_ATTR_COUNT: usize = 8;

/// Number of app attribute kinds defined by ANCS (`DisplayName`).
pub const APP_ATTR_COUNT: usize = 1;

/// Maximum bytes a caller may request for a single attribute's storage.
///
/// The last byte of a full buffer is reserved for the NUL terminator
/// the parser writes on completion (the NUL-termination quirk).
pub const MAX_ATTR_LEN: usize = 32;

/// Default width, in bytes, of the Control Point staging buffer.
///
/// At least 18 bytes is recommended; this default comfortably fits
/// the largest fixed command (`GetNotifAttrs` with all eight attribute
/// ids, three of them length-qualified) while leaving room for a short
/// app identifier in `GetAppAttrs`.
pub const DEFAULT_CP_BUFFER_LEN: usize = 32;
