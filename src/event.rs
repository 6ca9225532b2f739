//! Event Sink Contract: the single entry point notifications flow through.
use crate::attributes::{AppAttributeId, NotifAttributeId};
use crate::notification_source::NotifSummary;

/// A single event delivered to the caller-supplied sink.
///
/// `NotifAttribute`/`AppAttribute` carry a reference into the caller's own
/// storage buffer (the one passed to `attr_add`); it is valid until the next
/// event for the same attribute id is delivered.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event<'d> {
    /// A decoded notification summary from the Notification Source.
    Notif(NotifSummary),
    /// An NS record that was malformed (wrong length, or an out-of-range enum field).
    InvalidNotif,
    /// A completed notification attribute from a `GetNotifAttrs` response.
    NotifAttribute {
        notif_uid: u32,
        attr_id: NotifAttributeId,
        data: &'d [u8],
    },
    /// A completed app attribute from a `GetAppAttrs` response.
    AppAttribute { attr_id: AppAttributeId, data: &'d [u8] },
    /// A provider-reported non-zero write status on the Control Point.
    NpError { code: ProviderErrorCode },
}

/// Callback invoked for every decoded event.
///
/// Implementations must not block: any longer-running work is the caller's
/// responsibility to offload, since the sink runs from whatever context
/// delivers the underlying transport callback.
pub trait EventSink {
    fn on_event(&mut self, event: Event<'_>);
}

impl<F> EventSink for F
where
    F: FnMut(Event<'_>),
{
    fn on_event(&mut self, event: Event<'_>) {
        (self)(event)
    }
}

/// Provider error codes defined by ANCS; any other non-zero write
/// status is surfaced verbatim via [`Event::NpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProviderErrorCode {
    UnknownCommand,
    InvalidCommand,
    InvalidParameter,
    ActionFailed,
    Other(u8),
}

impl From<u8> for ProviderErrorCode {
    fn from(code: u8) -> Self {
        match code {
            0xA0 => Self::UnknownCommand,
            0xA1 => Self::InvalidCommand,
            0xA2 => Self::InvalidParameter,
            0xA3 => Self::ActionFailed,
            other => Self::Other(other),
        }
    }
}
