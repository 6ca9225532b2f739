//! Control Point Encoder: the three outbound commands.
use crate::attributes::{Action, AppAttributeId, AppAttributeTable, NotifAttributeId, NotifAttributeTable};
use crate::cursor::WriteCursor;
use crate::error::CodecError;

const CMD_GET_NOTIF_ATTRS: u8 = 0x00;
const CMD_GET_APP_ATTRS: u8 = 0x01;
const CMD_PERFORM_NOTIF_ACTION: u8 = 0x02;

/// Encode a `GetNotifAttrs` command requesting every attribute currently
/// marked `requested` in `table`, in ascending id order.
pub(crate) fn encode_get_notif_attrs(
    w: &mut WriteCursor<'_>,
    notif_uid: u32,
    table: &NotifAttributeTable<'_>,
) -> Result<(), CodecError> {
    w.write_u8(CMD_GET_NOTIF_ATTRS)?;
    w.write_u32_le(notif_uid)?;
    for id in NotifAttributeId::all() {
        let entry = &table.entries[id as usize];
        if entry.requested {
            w.write_u8(id as u8)?;
            if id.is_length_qualified() {
                w.write_u16_le(entry.max_len)?;
            }
        }
    }
    Ok(())
}

/// Encode a `GetAppAttrs` command: command id, the app identifier string
/// (NUL-terminated), then every requested app attribute id in ascending order.
///
/// `app_id` must be a non-empty, NUL-terminated byte string (the NUL is
/// included in `app_id`, not appended separately) — the `{CMD_ID -> APP_ID
/// -> ATTR_ID -> DONE}` shape described for this command.
pub(crate) fn encode_get_app_attrs(
    w: &mut WriteCursor<'_>,
    app_id: &[u8],
    table: &AppAttributeTable<'_>,
) -> Result<(), CodecError> {
    if app_id.is_empty() || *app_id.last().unwrap() != 0 {
        return Err(CodecError);
    }
    w.write_u8(CMD_GET_APP_ATTRS)?;
    w.append(app_id)?;
    for id in AppAttributeId::all() {
        let entry = &table.entries[id as usize];
        if entry.requested {
            w.write_u8(id as u8)?;
        }
    }
    Ok(())
}

/// Encode a `PerformNotifAction` command: a fixed six bytes.
pub(crate) fn encode_perform_notif_action(
    w: &mut WriteCursor<'_>,
    notif_uid: u32,
    action: Action,
) -> Result<(), CodecError> {
    w.write_u8(CMD_PERFORM_NOTIF_ACTION)?;
    w.write_u32_le(notif_uid)?;
    w.write_u8(action as u8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn get_notif_attrs_encodes_requested_ids_ascending_with_length_qualifiers() {
        let mut title_buf = [0u8; 32];
        let mut date_buf = [0u8; 16];
        let mut table = NotifAttributeTable::new();
        let _: Result<(), Error<()>> = table.add(NotifAttributeId::Title, &mut title_buf);
        let _: Result<(), Error<()>> = table.add(NotifAttributeId::Date, &mut date_buf);

        let mut buf = [0u8; 32];
        let mut w = WriteCursor::new(&mut buf);
        encode_get_notif_attrs(&mut w, 0x04030201, &table).unwrap();

        assert_eq!(
            w.as_slice(),
            &[0x00, 0x01, 0x02, 0x03, 0x04, 0x01, 0x20, 0x00, 0x05, 0x10, 0x00]
        );
    }

    #[test]
    fn get_notif_attrs_overflows_a_too_small_buffer() {
        let mut title_buf = [0u8; 32];
        let mut table = NotifAttributeTable::new();
        let _: Result<(), Error<()>> = table.add(NotifAttributeId::Title, &mut title_buf);

        let mut buf = [0u8; 4];
        let mut w = WriteCursor::new(&mut buf);
        assert_eq!(encode_get_notif_attrs(&mut w, 1, &table), Err(CodecError));
    }

    #[test]
    fn get_app_attrs_encodes_app_id_and_requested_ids() {
        let mut name_buf = [0u8; 32];
        let mut table = AppAttributeTable::new();
        let _: Result<(), Error<()>> = table.add(AppAttributeId::DisplayName, &mut name_buf);

        let mut buf = [0u8; 32];
        let mut w = WriteCursor::new(&mut buf);
        encode_get_app_attrs(&mut w, b"com\0", &table).unwrap();

        assert_eq!(w.as_slice(), &[0x01, b'c', b'o', b'm', 0x00, 0x00]);
    }

    #[test]
    fn get_app_attrs_rejects_missing_nul_terminator() {
        let table = AppAttributeTable::new();
        let mut buf = [0u8; 32];
        let mut w = WriteCursor::new(&mut buf);
        assert_eq!(encode_get_app_attrs(&mut w, b"com", &table), Err(CodecError));
    }

    #[test]
    fn get_app_attrs_rejects_empty_app_id() {
        let table = AppAttributeTable::new();
        let mut buf = [0u8; 32];
        let mut w = WriteCursor::new(&mut buf);
        assert_eq!(encode_get_app_attrs(&mut w, b"", &table), Err(CodecError));
    }

    #[test]
    fn perform_notif_action_encodes_six_bytes() {
        let mut buf = [0u8; 8];
        let mut w = WriteCursor::new(&mut buf);
        encode_perform_notif_action(&mut w, 0x04030201, Action::Positive).unwrap();
        assert_eq!(w.as_slice(), &[0x02, 0x01, 0x02, 0x03, 0x04, 0x00]);
    }
}
