//! Minimal UUID type for matching GATT service/characteristic identifiers.
use core::fmt;

/// A Bluetooth UUID, either the 16-bit short form or the full 128-bit form.
///
/// Wire representation is always little-endian, matching the ATT/GATT
/// convention.
#[derive(Clone, Copy, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uuid {
    /// 16-bit short form, little-endian.
    Uuid16([u8; 2]),
    /// Full 128-bit form, little-endian.
    Uuid128([u8; 16]),
}

impl Uuid {
    /// Construct a 16-bit uuid.
    pub const fn uuid16(value: u16) -> Self {
        Self::Uuid16(value.to_le_bytes())
    }

    /// Construct a 128-bit uuid from its little-endian wire bytes.
    pub const fn uuid128(bytes: [u8; 16]) -> Self {
        Self::Uuid128(bytes)
    }

    /// Raw little-endian byte view of this uuid.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Uuid16(b) => b,
            Self::Uuid128(b) => b,
        }
    }

    /// Construct a uuid from a raw little-endian byte slice.
    ///
    /// Returns `None` if the slice is neither 2 nor 16 bytes.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        match data.len() {
            2 => Some(Self::Uuid16([data[0], data[1]])),
            16 => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(data);
                Some(Self::Uuid128(bytes))
            }
            _ => None,
        }
    }
}

impl PartialEq for Uuid {
    fn eq(&self, other: &Self) -> bool {
        self.as_raw() == other.as_raw()
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid16(b) => write!(f, "Uuid16({:02x}{:02x})", b[1], b[0]),
            Self::Uuid128(b) => {
                write!(f, "Uuid128(")?;
                for byte in b.iter().rev() {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// ANCS service uuid: `7905F431-B5CE-4E99-A40F-4B1E122D00D0`.
pub const ANCS_SERVICE_UUID: Uuid = Uuid::uuid128([
    0xD0, 0x00, 0x2D, 0x12, 0x1E, 0x4B, 0x0F, 0xA4, 0x99, 0x4E, 0xCE, 0xB5, 0x31, 0xF4, 0x05, 0x79,
]);

/// Notification Source characteristic uuid: `9FBF120D-6301-42D9-8C58-25E699A21DBD`.
pub const NOTIFICATION_SOURCE_UUID: Uuid = Uuid::uuid128([
    0xBD, 0x1D, 0xA2, 0x99, 0xE6, 0x25, 0x58, 0x8C, 0xD9, 0x42, 0x01, 0x63, 0x0D, 0x12, 0xBF, 0x9F,
]);

/// Control Point characteristic uuid: `69D1D8F3-45E1-49A8-9821-9BBDFDAAD9D9`.
pub const CONTROL_POINT_UUID: Uuid = Uuid::uuid128([
    0xD9, 0xD9, 0xAA, 0xFD, 0xBD, 0x9B, 0x21, 0x98, 0xA8, 0x49, 0xE1, 0x45, 0xF3, 0xD8, 0xD1, 0x69,
]);

/// Data Source characteristic uuid: `22EAC6E9-24D6-4BB5-BE44-B36ACE7C7BFB`.
pub const DATA_SOURCE_UUID: Uuid = Uuid::uuid128([
    0xFB, 0x7B, 0x7C, 0xCE, 0x6A, 0xB3, 0x44, 0xBE, 0xB5, 0x4B, 0xD6, 0x24, 0xE9, 0xC6, 0xEA, 0x22,
]);

/// Client Characteristic Configuration Descriptor uuid (16-bit): `0x2902`.
pub const CCCD_UUID: Uuid = Uuid::uuid16(0x2902);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancs_service_uuid_round_trips_big_endian_form() {
        let be: [u8; 16] = [
            0x79, 0x05, 0xF4, 0x31, 0xB5, 0xCE, 0x4E, 0x99, 0xA4, 0x0F, 0x4B, 0x1E, 0x12, 0x2D, 0x00, 0xD0,
        ];
        let mut le = be;
        le.reverse();
        assert_eq!(ANCS_SERVICE_UUID, Uuid::uuid128(le));
    }

    #[test]
    fn uuid16_and_uuid128_are_not_equal_even_with_matching_prefix() {
        let short = Uuid::uuid16(0x1234);
        let long = Uuid::from_slice(&[0x34, 0x12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_ne!(short, long);
    }
}
