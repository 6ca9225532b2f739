//! Notification Source Decoder: decodes the fixed 8-byte NS summary record.
use crate::event::Event;

/// Kind of change a summary notification represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventId {
    Added,
    Modified,
    Removed,
}

impl EventId {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Added),
            1 => Some(Self::Modified),
            2 => Some(Self::Removed),
            _ => None,
        }
    }
}

/// ANCS notification category, `Other` through `Entertainment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    Other,
    IncomingCall,
    MissedCall,
    Voicemail,
    Social,
    Schedule,
    Email,
    News,
    HealthAndFitness,
    BusinessAndFinance,
    Location,
    Entertainment,
}

impl Category {
    fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::Other,
            1 => Self::IncomingCall,
            2 => Self::MissedCall,
            3 => Self::Voicemail,
            4 => Self::Social,
            5 => Self::Schedule,
            6 => Self::Email,
            7 => Self::News,
            8 => Self::HealthAndFitness,
            9 => Self::BusinessAndFinance,
            10 => Self::Location,
            11 => Self::Entertainment,
            _ => return None,
        })
    }
}

/// Event flag bits carried in byte 1 of the NS record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventFlags {
    pub silent: bool,
    pub important: bool,
    pub pre_existing: bool,
    pub positive_action: bool,
    pub negative_action: bool,
}

impl EventFlags {
    fn from_u8(v: u8) -> Self {
        Self {
            silent: v & 0x01 != 0,
            important: v & 0x02 != 0,
            pre_existing: v & 0x04 != 0,
            positive_action: v & 0x08 != 0,
            negative_action: v & 0x10 != 0,
        }
    }
}

/// A decoded notification summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotifSummary {
    pub evt_id: EventId,
    pub flags: EventFlags,
    pub category_id: Category,
    pub category_count: u8,
    pub notif_uid: u32,
}

/// Decode exactly one inbound Notification Source record and deliver it to `sink`.
///
/// A record whose length is not 8, or whose `evt_id`/`category` fall
/// outside their defined ranges, is surfaced as exactly one
/// [`Event::InvalidNotif`] instead of a [`Event::Notif`] — double emission
/// on short/long records is deliberately not reproduced here.
pub fn decode_ns_record(record: &[u8], sink: &mut impl FnMut(Event)) {
    if record.len() != 8 {
        sink(Event::InvalidNotif);
        return;
    }

    let evt_id = EventId::from_u8(record[0]);
    let category_id = Category::from_u8(record[2]);

    let (Some(evt_id), Some(category_id)) = (evt_id, category_id) else {
        sink(Event::InvalidNotif);
        return;
    };

    let summary = NotifSummary {
        evt_id,
        flags: EventFlags::from_u8(record[1]),
        category_id,
        category_count: record[3],
        notif_uid: u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
    };
    sink(Event::Notif(summary));
}
