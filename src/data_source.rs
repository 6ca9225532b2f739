//! Data Source Parser: a re-entrant byte-stream reassembler for
//! attribute responses that may span any number of inbound records.
use crate::attributes::{AppAttributeId, AppAttributeTable, NotifAttributeId, NotifAttributeTable};
use crate::config::{APP_ATTR_COUNT, NOTIF_ATTR_COUNT};
use crate::event::Event;

/// Length of the internal scratch buffer the `APP_ID` state copies into.
///
/// Only used to traverse the NUL-terminated app identifier embedded in a
/// `GetAppAttrs` response; bytes beyond capacity are still counted (so the
/// parser stays in sync) but no longer copied.
const APP_ID_SCRATCH_LEN: usize = 32;

/// Which command the in-flight response answers; bound at dispatch time and
/// consumed by the parser the moment the response's `CMD_ID` byte arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    GetNotifAttrs,
    GetAppAttrs,
}

impl Command {
    fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::GetNotifAttrs),
            0x01 => Some(Self::GetAppAttrs),
            _ => None,
        }
    }

    fn attr_id_range(self) -> usize {
        match self {
            Self::GetNotifAttrs => NOTIF_ATTR_COUNT,
            Self::GetAppAttrs => APP_ATTR_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    CommandId,
    NotifUid,
    AppId,
    AttrId,
    AttrLen1,
    AttrLen2,
    AttrData,
    AttrSkip,
    Done,
}

/// Snapshot of an attribute's requested-ness and capacity, cached at `ATTR_ID`
/// time so `ATTR_DATA`/`ATTR_SKIP` do not need to keep a borrow of the table
/// across byte-by-byte, possibly multi-record, processing.
#[derive(Clone, Copy)]
struct CurrentAttr {
    id: u8,
    requested: bool,
    /// `max_len - 1` if registered (room reserved for the NUL terminator), else 0.
    copy_cap: u16,
}

/// Re-entrant parser for one logical Data Source response.
///
/// Bytes are fed as they arrive, in order, across any number of records; the
/// parser reassembles them into [`Event::NotifAttribute`] /
/// [`Event::AppAttribute`] events, one per completed (or confirmed-empty)
/// requested attribute, in the exact order their terminating byte arrived.
pub struct DataSourceParser {
    state: ParserState,
    primed: Option<(Command, usize)>,
    command: Command,
    expected_attr_count: usize,
    notif_uid: u32,
    notif_uid_idx: u8,
    app_id_scratch: [u8; APP_ID_SCRATCH_LEN],
    app_id_idx: usize,
    current: CurrentAttr,
    current_attr_len: u16,
    current_attr_write_index: u16,
}

impl Default for DataSourceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceParser {
    /// A freshly constructed, idle parser (terminal, like a completed response).
    pub const fn new() -> Self {
        Self {
            state: ParserState::Done,
            primed: None,
            command: Command::GetNotifAttrs,
            expected_attr_count: 0,
            notif_uid: 0,
            notif_uid_idx: 0,
            app_id_scratch: [0; APP_ID_SCRATCH_LEN],
            app_id_idx: 0,
            current: CurrentAttr {
                id: 0,
                requested: false,
                copy_cap: 0,
            },
            current_attr_len: 0,
            current_attr_write_index: 0,
        }
    }

    /// Arm the parser for the response to a command dispatched *right now*.
    ///
    /// `expected_attr_count` must be the count of `requested == true` entries
    /// in the table the dispatched command addresses, computed at this exact
    /// instant — the session computes it immediately before
    /// handing the encoded command to the transport, so that a later
    /// `attr_add` call cannot retroactively change the budget for a response
    /// already in flight.
    pub(crate) fn prime(&mut self, command: Command, expected_attr_count: usize) {
        *self = Self::new();
        self.state = ParserState::CommandId;
        self.primed = Some((command, expected_attr_count));
    }

    /// Whether this response has been fully parsed (or abandoned).
    pub(crate) fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Feed every byte of one inbound Data Source record, in order.
    pub fn feed(
        &mut self,
        data: &[u8],
        notif_table: &mut NotifAttributeTable<'_>,
        app_table: &mut AppAttributeTable<'_>,
        sink: &mut dyn FnMut(Event<'_>),
    ) {
        for &byte in data {
            if self.state == ParserState::Done {
                break;
            }
            self.feed_byte(byte, notif_table, app_table, sink);
        }
    }

    fn next_attr_state(&self) -> ParserState {
        if self.expected_attr_count == 0 {
            ParserState::Done
        } else {
            ParserState::AttrId
        }
    }

    fn feed_byte(
        &mut self,
        byte: u8,
        notif_table: &mut NotifAttributeTable<'_>,
        app_table: &mut AppAttributeTable<'_>,
        sink: &mut dyn FnMut(Event<'_>),
    ) {
        match self.state {
            ParserState::Done => {}

            ParserState::CommandId => {
                let wire_command = Command::from_wire(byte);
                match (wire_command, self.primed.take()) {
                    (Some(wire_cmd), Some((primed_cmd, count))) if wire_cmd == primed_cmd => {
                        self.command = wire_cmd;
                        self.expected_attr_count = count;
                        self.state = match wire_cmd {
                            Command::GetNotifAttrs => {
                                self.notif_uid_idx = 0;
                                ParserState::NotifUid
                            }
                            Command::GetAppAttrs => {
                                self.app_id_idx = 0;
                                ParserState::AppId
                            }
                        };
                    }
                    _ => self.state = ParserState::Done,
                }
            }

            ParserState::NotifUid => {
                let shift = 8 * self.notif_uid_idx as u32;
                self.notif_uid &= !(0xFFu32 << shift);
                self.notif_uid |= (byte as u32) << shift;
                self.notif_uid_idx += 1;
                if self.notif_uid_idx == 4 {
                    self.state = ParserState::AttrId;
                }
            }

            ParserState::AppId => {
                if byte == 0 {
                    self.state = ParserState::AttrId;
                } else {
                    if self.app_id_idx < APP_ID_SCRATCH_LEN {
                        self.app_id_scratch[self.app_id_idx] = byte;
                    }
                    self.app_id_idx += 1;
                }
            }

            ParserState::AttrId => {
                if (byte as usize) >= self.command.attr_id_range() {
                    self.state = ParserState::Done;
                    return;
                }

                let (requested, max_len) = match self.command {
                    Command::GetNotifAttrs => {
                        let e = &notif_table.entries[byte as usize];
                        (e.requested, e.max_len)
                    }
                    Command::GetAppAttrs => {
                        let e = &app_table.entries[byte as usize];
                        (e.requested, e.max_len)
                    }
                };

                self.current = CurrentAttr {
                    id: byte,
                    requested,
                    copy_cap: if requested { max_len.saturating_sub(1) } else { 0 },
                };

                if self.expected_attr_count == 0 {
                    self.state = ParserState::Done;
                    return;
                }
                if requested {
                    self.expected_attr_count -= 1;
                }
                self.current_attr_len = 0;
                self.state = ParserState::AttrLen1;
            }

            ParserState::AttrLen1 => {
                self.current_attr_len = byte as u16;
                self.state = ParserState::AttrLen2;
            }

            ParserState::AttrLen2 => {
                self.current_attr_len |= (byte as u16) << 8;
                self.current_attr_write_index = 0;

                if self.current_attr_len == 0 {
                    if self.current.requested {
                        self.emit_empty(notif_table, app_table, sink);
                    }
                    self.state = self.next_attr_state();
                    return;
                }

                if !self.current.requested {
                    self.state = ParserState::AttrSkip;
                    return;
                }

                if self.current.copy_cap == 0 {
                    self.emit_empty(notif_table, app_table, sink);
                    self.state = ParserState::AttrSkip;
                } else {
                    self.state = ParserState::AttrData;
                }
            }

            ParserState::AttrData => {
                let idx = self.current_attr_write_index;
                self.write_storage_byte(idx, byte, notif_table, app_table);
                self.current_attr_write_index += 1;

                let completion_len = self.current_attr_len.min(self.current.copy_cap);
                if self.current_attr_write_index == completion_len {
                    self.terminate_and_emit(notif_table, app_table, sink);

                    self.state = if completion_len < self.current_attr_len {
                        ParserState::AttrSkip
                    } else {
                        self.next_attr_state()
                    };
                }
            }

            ParserState::AttrSkip => {
                self.current_attr_write_index += 1;
                if self.current_attr_write_index == self.current_attr_len {
                    self.state = self.next_attr_state();
                }
            }
        }
    }

    fn write_storage_byte(
        &mut self,
        idx: u16,
        byte: u8,
        notif_table: &mut NotifAttributeTable<'_>,
        app_table: &mut AppAttributeTable<'_>,
    ) {
        let storage = match self.command {
            Command::GetNotifAttrs => notif_table.entries[self.current.id as usize].storage.as_deref_mut(),
            Command::GetAppAttrs => app_table.entries[self.current.id as usize].storage.as_deref_mut(),
        };
        if let Some(storage) = storage {
            storage[idx as usize] = byte;
        }
    }

    fn terminate_and_emit(
        &mut self,
        notif_table: &mut NotifAttributeTable<'_>,
        app_table: &mut AppAttributeTable<'_>,
        sink: &mut dyn FnMut(Event<'_>),
    ) {
        let len = self.current_attr_write_index as usize;
        let storage = match self.command {
            Command::GetNotifAttrs => notif_table.entries[self.current.id as usize].storage.as_deref_mut(),
            Command::GetAppAttrs => app_table.entries[self.current.id as usize].storage.as_deref_mut(),
        };
        let Some(storage) = storage else { return };
        storage[len] = 0;
        let data = &storage[..len];
        Self::emit(self.command, self.notif_uid, self.current.id, data, sink);
    }

    fn emit_empty(
        &mut self,
        notif_table: &mut NotifAttributeTable<'_>,
        app_table: &mut AppAttributeTable<'_>,
        sink: &mut dyn FnMut(Event<'_>),
    ) {
        let storage = match self.command {
            Command::GetNotifAttrs => notif_table.entries[self.current.id as usize].storage.as_deref_mut(),
            Command::GetAppAttrs => app_table.entries[self.current.id as usize].storage.as_deref_mut(),
        };
        let Some(storage) = storage else { return };
        storage[0] = 0;
        Self::emit(self.command, self.notif_uid, self.current.id, &storage[..0], sink);
    }

    fn emit(command: Command, notif_uid: u32, id: u8, data: &[u8], sink: &mut dyn FnMut(Event<'_>)) {
        match command {
            Command::GetNotifAttrs => {
                let attr_id = NotifAttributeId::try_from(id).expect("id was range-checked at ATTR_ID");
                sink(Event::NotifAttribute {
                    notif_uid,
                    attr_id,
                    data,
                });
            }
            Command::GetAppAttrs => {
                let attr_id = AppAttributeId::try_from(id).expect("id was range-checked at ATTR_ID");
                sink(Event::AppAttribute { attr_id, data });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Captured {
        title: [u8; 32],
        message: [u8; 32],
        app_id: [u8; 32],
    }

    fn notif_table_for(c: &mut Captured) -> NotifAttributeTable<'_> {
        let mut table = NotifAttributeTable::new();
        let _: Result<(), crate::error::Error<()>> =
            table.add(NotifAttributeId::Title, &mut c.title);
        let _: Result<(), crate::error::Error<()>> =
            table.add(NotifAttributeId::Message, &mut c.message);
        let _: Result<(), crate::error::Error<()>> =
            table.add(NotifAttributeId::AppIdentifier, &mut c.app_id);
        table
    }

    #[derive(Debug, Clone)]
    enum Captured2 {
        NotifAttribute { notif_uid: u32, attr_id: NotifAttributeId, data: heapless::Vec<u8, 32> },
        AppAttribute { attr_id: AppAttributeId, data: heapless::Vec<u8, 32> },
        Other,
    }

    fn capture(e: Event<'_>) -> Captured2 {
        match e {
            Event::NotifAttribute { notif_uid, attr_id, data } => Captured2::NotifAttribute {
                notif_uid,
                attr_id,
                data: heapless::Vec::from_slice(data).unwrap(),
            },
            Event::AppAttribute { attr_id, data } => Captured2::AppAttribute {
                attr_id,
                data: heapless::Vec::from_slice(data).unwrap(),
            },
            _ => Captured2::Other,
        }
    }

    #[test]
    fn scenario_4_ds_parse_across_two_records() {
        let mut cap = Captured {
            title: [0xFF; 32],
            message: [0xFF; 32],
            app_id: [0xFF; 32],
        };
        let mut notif_table = notif_table_for(&mut cap);
        let mut app_table = AppAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetNotifAttrs, notif_table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        let record1 = [0x00, 0x01, 0x02, 0x03, 0x04, 0x01, 0x03, 0x00, 0x6E, 0x52, 0x46, 0x03, 0x02, 0x00, 0x35, 0x32];
        let record2 = [0x00, 0x03, 0x00, 0x63, 0x6F, 0x6D];

        parser.feed(&record1, &mut notif_table, &mut app_table, &mut sink);
        parser.feed(&record2, &mut notif_table, &mut app_table, &mut sink);

        assert_eq!(events.len(), 3);
        match &events[0] {
            Captured2::NotifAttribute { notif_uid, attr_id, data } => {
                assert_eq!(*notif_uid, 0x04030201);
                assert_eq!(*attr_id, NotifAttributeId::Title);
                assert_eq!(data.as_slice(), b"nRF");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match &events[1] {
            Captured2::NotifAttribute { attr_id, data, .. } => {
                assert_eq!(*attr_id, NotifAttributeId::Message);
                assert_eq!(data.as_slice(), b"52");
            }
            other => panic!("unexpected: {other:?}"),
        }
        match &events[2] {
            Captured2::NotifAttribute { attr_id, data, .. } => {
                assert_eq!(*attr_id, NotifAttributeId::AppIdentifier);
                assert_eq!(data.as_slice(), b"com");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn any_partition_of_the_byte_stream_yields_the_same_events() {
        let full: [u8; 22] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x01, 0x03, 0x00, 0x6E, 0x52, 0x46, 0x03, 0x02, 0x00, 0x35, 0x32, 0x00,
            0x03, 0x00, 0x63, 0x6F, 0x6D,
        ];

        // Try every single-byte-at-a-time feed, and the "two records" feed, and confirm
        // identical event sequences result regardless of how the bytes were chopped up.
        let run = |chunks: &[&[u8]]| -> heapless::Vec<Captured2, 8> {
            let mut cap = Captured {
                title: [0xFF; 32],
                message: [0xFF; 32],
                app_id: [0xFF; 32],
            };
            let mut notif_table = notif_table_for(&mut cap);
            let mut app_table = AppAttributeTable::new();
            let mut parser = DataSourceParser::new();
            parser.prime(Command::GetNotifAttrs, notif_table.requested_count());
            let mut events = heapless::Vec::<Captured2, 8>::new();
            let mut sink = |e: Event<'_>| {
                events.push(capture(e)).ok();
            };
            for chunk in chunks {
                parser.feed(chunk, &mut notif_table, &mut app_table, &mut sink);
            }
            events
        };

        let whole = run(&[&full]);
        let byte_at_a_time: heapless::Vec<&[u8], 32> = full.iter().map(core::slice::from_ref).collect();
        let one_by_one = run(&byte_at_a_time);
        let two_records = run(&[&full[..16], &full[16..]]);

        assert_eq!(format!("{whole:?}"), format!("{one_by_one:?}"));
        assert_eq!(format!("{whole:?}"), format!("{two_records:?}"));
    }

    #[test]
    fn unrequested_attribute_is_consumed_but_not_emitted() {
        let mut cap = Captured {
            title: [0xFF; 32],
            message: [0xFF; 32],
            app_id: [0xFF; 32],
        };
        // Only request Title; Message (id 3) appears on the wire but is unrequested.
        let mut table = NotifAttributeTable::new();
        let _: Result<(), crate::error::Error<()>> = table.add(NotifAttributeId::Title, &mut cap.title);
        let mut app_table = AppAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetNotifAttrs, table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        // uid, Message(id=3) len=2 "52", Title(id=1) len=3 "nRF"
        let stream = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x03, 0x02, 0x00, 0x35, 0x32, 0x01, 0x03, 0x00, 0x6E, 0x52, 0x46,
        ];
        parser.feed(&stream, &mut table, &mut app_table, &mut sink);

        assert_eq!(events.len(), 1);
        match &events[0] {
            Captured2::NotifAttribute { attr_id, data, .. } => {
                assert_eq!(*attr_id, NotifAttributeId::Title);
                assert_eq!(data.as_slice(), b"nRF");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn zero_length_requested_attribute_emits_empty_event() {
        let mut cap = Captured {
            title: [0xFF; 32],
            message: [0xFF; 32],
            app_id: [0xFF; 32],
        };
        let mut table = NotifAttributeTable::new();
        let _: Result<(), crate::error::Error<()>> = table.add(NotifAttributeId::Title, &mut cap.title);
        let mut app_table = AppAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetNotifAttrs, table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        let stream = [0x00, 0x01, 0x02, 0x03, 0x04, 0x01, 0x00, 0x00];
        parser.feed(&stream, &mut table, &mut app_table, &mut sink);

        assert_eq!(events.len(), 1);
        match &events[0] {
            Captured2::NotifAttribute { attr_id, data, .. } => {
                assert_eq!(*attr_id, NotifAttributeId::Title);
                assert!(data.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn data_longer_than_buffer_is_truncated_and_nul_terminated() {
        let mut cap = Captured {
            title: [0xFF; 32],
            message: [0xFF; 32],
            app_id: [0xFF; 32],
        };
        let mut small = [0u8; 4]; // max_len=4, so only 3 data bytes fit, 4th is the NUL
        let mut table = NotifAttributeTable::new();
        let _: Result<(), crate::error::Error<()>> = table.add(NotifAttributeId::Title, &mut small);
        let mut app_table = AppAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetNotifAttrs, table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        // Title (id 1), len=6, "abcdef"
        let stream = [0x00, 0x01, 0x02, 0x03, 0x04, 0x01, 0x06, 0x00, b'a', b'b', b'c', b'd', b'e', b'f'];
        parser.feed(&stream, &mut table, &mut app_table, &mut sink);

        assert_eq!(events.len(), 1);
        match &events[0] {
            Captured2::NotifAttribute { data, .. } => assert_eq!(data.as_slice(), b"abc"),
            other => panic!("unexpected: {other:?}"),
        }
        let _ = cap; // silence unused-field warnings in this scenario
    }

    #[test]
    fn app_attrs_response_parses_app_id_and_display_name() {
        let mut display_name = [0xFFu8; 32];
        let mut app_table = AppAttributeTable::new();
        let _: Result<(), crate::error::Error<()>> =
            app_table.add(AppAttributeId::DisplayName, &mut display_name);
        let mut notif_table = NotifAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetAppAttrs, app_table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        // cmd=0x01, app_id="com"\0, DisplayName(id=0) len=4 "nRF5"
        let stream = [0x01, b'c', b'o', b'm', 0x00, 0x00, 0x04, 0x00, b'n', b'R', b'F', b'5'];
        parser.feed(&stream, &mut notif_table, &mut app_table, &mut sink);

        assert_eq!(events.len(), 1);
        match &events[0] {
            Captured2::AppAttribute { attr_id, data } => {
                assert_eq!(*attr_id, AppAttributeId::DisplayName);
                assert_eq!(data.as_slice(), b"nRF5");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_attr_id_discards_rest_of_response() {
        let mut cap = Captured {
            title: [0xFFu8; 32],
            message: [0xFFu8; 32],
            app_id: [0xFFu8; 32],
        };
        let mut table = notif_table_for(&mut cap);
        let mut app_table = AppAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetNotifAttrs, table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        // attr id 200 is out of range (only 0..8 defined)
        let stream = [0x00, 0x01, 0x02, 0x03, 0x04, 200u8, 0x01, 0x02, 0x00, 0x63, 0x6F, 0x6D];
        parser.feed(&stream, &mut table, &mut app_table, &mut sink);

        assert!(events.is_empty());
    }

    #[test]
    fn requesting_zero_attributes_discards_entire_response_immediately() {
        let mut table = NotifAttributeTable::new(); // nothing requested
        let mut app_table = AppAttributeTable::new();

        let mut parser = DataSourceParser::new();
        parser.prime(Command::GetNotifAttrs, table.requested_count());

        let mut events = heapless::Vec::<Captured2, 8>::new();
        let mut sink = |e: Event<'_>| {
            events.push(capture(e)).ok();
        };

        let stream = [0x00, 0x01, 0x02, 0x03, 0x04, 0x01, 0x03, 0x00, b'n', b'R', b'F'];
        parser.feed(&stream, &mut table, &mut app_table, &mut sink);

        assert!(events.is_empty());
    }
}
