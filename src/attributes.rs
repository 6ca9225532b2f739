//! Attribute identifiers and the per-session attribute-subscription tables.
use crate::config::{APP_ATTR_COUNT, MAX_ATTR_LEN, NOTIF_ATTR_COUNT};
use crate::error::Error;

/// Identifier of a notification attribute, indices `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NotifAttributeId {
    AppIdentifier = 0,
    Title = 1,
    Subtitle = 2,
    Message = 3,
    MessageSize = 4,
    Date = 5,
    PositiveActionLabel = 6,
    NegativeActionLabel = 7,
}

impl NotifAttributeId {
    /// Whether this attribute carries a caller-chosen `max_len` on the wire
    /// when requested (Title, Subtitle, Message).
    pub fn is_length_qualified(self) -> bool {
        matches!(self, Self::Title | Self::Subtitle | Self::Message)
    }

    pub(crate) fn all() -> [Self; NOTIF_ATTR_COUNT] {
        [
            Self::AppIdentifier,
            Self::Title,
            Self::Subtitle,
            Self::Message,
            Self::MessageSize,
            Self::Date,
            Self::PositiveActionLabel,
            Self::NegativeActionLabel,
        ]
    }
}

impl TryFrom<u8> for NotifAttributeId {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::AppIdentifier),
            1 => Ok(Self::Title),
            2 => Ok(Self::Subtitle),
            3 => Ok(Self::Message),
            4 => Ok(Self::MessageSize),
            5 => Ok(Self::Date),
            6 => Ok(Self::PositiveActionLabel),
            7 => Ok(Self::NegativeActionLabel),
            _ => Err(()),
        }
    }
}

/// Identifier of an app attribute, indices `0..1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AppAttributeId {
    DisplayName = 0,
}

impl AppAttributeId {
    pub(crate) fn all() -> [Self; APP_ATTR_COUNT] {
        [Self::DisplayName]
    }
}

impl TryFrom<u8> for AppAttributeId {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::DisplayName),
            _ => Err(()),
        }
    }
}

/// The action a `PerformNotifAction` command invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Action {
    Positive = 0,
    Negative = 1,
}

/// One entry in an attribute-subscription table.
///
/// An entry is "registered" when `storage` holds a buffer and `max_len` is
/// in `1..=32`; a non-registered entry still has its bytes traversed on the
/// wire but never emits an event and is never counted towards
/// `expected_attr_count`.
pub(crate) struct AttrEntry<'d> {
    pub(crate) requested: bool,
    pub(crate) max_len: u16,
    pub(crate) storage: Option<&'d mut [u8]>,
}

impl<'d> AttrEntry<'d> {
    const fn empty() -> Self {
        Self {
            requested: false,
            max_len: 0,
            storage: None,
        }
    }

    pub(crate) fn registered(&self) -> bool {
        self.storage.is_some() && (1..=MAX_ATTR_LEN as u16).contains(&self.max_len)
    }
}

/// Table of notification-attribute subscriptions, indexed by [`NotifAttributeId`].
pub struct NotifAttributeTable<'d> {
    pub(crate) entries: [AttrEntry<'d>; NOTIF_ATTR_COUNT],
}

impl<'d> Default for NotifAttributeTable<'d> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> NotifAttributeTable<'d> {
    /// An empty table: no attribute requested.
    pub const fn new() -> Self {
        Self {
            entries: [
                AttrEntry::empty(),
                AttrEntry::empty(),
                AttrEntry::empty(),
                AttrEntry::empty(),
                AttrEntry::empty(),
                AttrEntry::empty(),
                AttrEntry::empty(),
                AttrEntry::empty(),
            ],
        }
    }

    /// Mark `id` as requested, backed by `buf`.
    ///
    /// `buf.len()` must be in `1..=32`.
    pub fn add<E>(&mut self, id: NotifAttributeId, buf: &'d mut [u8]) -> Result<(), Error<E>> {
        let len = buf.len();
        if !(1..=MAX_ATTR_LEN).contains(&len) {
            return Err(Error::Invalid);
        }
        let entry = &mut self.entries[id as usize];
        entry.requested = true;
        entry.max_len = len as u16;
        entry.storage = Some(buf);
        Ok(())
    }

    /// Number of attributes currently marked `requested`, in ascending id order.
    pub(crate) fn requested_count(&self) -> usize {
        self.entries.iter().filter(|e| e.requested).count()
    }
}

/// Table of app-attribute subscriptions, indexed by [`AppAttributeId`].
pub struct AppAttributeTable<'d> {
    pub(crate) entries: [AttrEntry<'d>; APP_ATTR_COUNT],
}

impl<'d> Default for AppAttributeTable<'d> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'d> AppAttributeTable<'d> {
    /// An empty table: no attribute requested.
    pub const fn new() -> Self {
        Self {
            entries: [AttrEntry::empty()],
        }
    }

    /// Mark `id` as requested, backed by `buf`.
    pub fn add<E>(&mut self, id: AppAttributeId, buf: &'d mut [u8]) -> Result<(), Error<E>> {
        let len = buf.len();
        if !(1..=MAX_ATTR_LEN).contains(&len) {
            return Err(Error::Invalid);
        }
        let entry = &mut self.entries[id as usize];
        entry.requested = true;
        entry.max_len = len as u16;
        entry.storage = Some(buf);
        Ok(())
    }

    pub(crate) fn requested_count(&self) -> usize {
        self.entries.iter().filter(|e| e.requested).count()
    }
}
