//! External collaborator interface: the thin surface a session needs
//! from a GATT client that has already discovered the ANCS service.
//!
//! Discovery, CCCD mechanics, and pairing are handled entirely on the other
//! side of this trait — a session only ever writes to, or subscribes on, a
//! handle it was told about through [`crate::session::ClientSession::handles_assign`].
use core::future::Future;

/// A connected GATT link capable of writing the Control Point and
/// subscribing to the Notification Source / Data Source characteristics.
///
/// Implementations are expected to be cheap to clone or borrow-share; a
/// session holds a reference to one for its entire lifetime.
pub trait Transport {
    /// Transport-specific failure (disconnection, an ATT error response, a
    /// stack-level error).
    type Error;
    /// An opaque handle identifying a characteristic on the connected peer.
    type Handle: Copy + PartialEq;

    /// Write `data` to `handle` and wait for the peer's write response.
    fn write_with_response(
        &self,
        handle: Self::Handle,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Enable notifications on `handle` (write the CCCD to `0x0001`).
    fn subscribe(&self, handle: Self::Handle) -> impl Future<Output = Result<(), Self::Error>>;

    /// Disable notifications on `handle` (write the CCCD to `0x0000`).
    fn unsubscribe(&self, handle: Self::Handle) -> impl Future<Output = Result<(), Self::Error>>;

    /// If `error` represents a non-zero provider write-response status
    /// (rather than a lower-level transport failure such as a disconnect),
    /// return that status code so the session can surface it as
    /// [`crate::event::Event::NpError`].
    fn provider_status(error: &Self::Error) -> Option<u8>;
}

/// One characteristic found by the collaborator's own service discovery,
/// handed to [`crate::session::ClientSession::handles_assign`].
#[derive(Clone, Copy)]
pub struct DiscoveredCharacteristic<H> {
    pub uuid: crate::uuid::Uuid,
    pub value_handle: H,
    /// The handle of this characteristic's Client Characteristic
    /// Configuration Descriptor, if it has one.
    pub cccd_handle: Option<H>,
}
