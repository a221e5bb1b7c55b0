//! EMVCo Merchant Presented Mode building blocks: TLV fields and the CRC16 trailer.

use crate::error::{VietQrError, VietQrResult};

pub const TAG_PAYLOAD_FORMAT: &str = "00";
pub const TAG_POINT_OF_INITIATION: &str = "01";
pub const TAG_MERCHANT_ACCOUNT: &str = "38";
pub const TAG_CURRENCY: &str = "53";
pub const TAG_AMOUNT: &str = "54";
pub const TAG_COUNTRY: &str = "58";
pub const TAG_ADDITIONAL_DATA: &str = "62";

// Sub-tags of the merchant account template (38)
pub const TAG_GUID: &str = "00";
pub const TAG_BENEFICIARY: &str = "01";
pub const TAG_SERVICE_CODE: &str = "02";

// Sub-tags of the beneficiary organisation (38/01)
pub const TAG_BANK_BIN: &str = "00";
pub const TAG_ACCOUNT_NUMBER: &str = "01";

// Sub-tag of the additional data template (62)
pub const TAG_PURPOSE: &str = "08";

/// Longest value a two-digit length prefix can describe.
pub const MAX_VALUE_LEN: usize = 99;

/// CRC tag plus its fixed length, the checksum is computed over this prefix too.
pub const CRC_PREFIX: &str = "6304";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvField {
    pub tag: String,
    pub value: String,
}

impl TlvField {
    pub fn new(tag: &str, value: impl Into<String>) -> Self {
        Self {
            tag: tag.to_string(),
            value: value.into(),
        }
    }

    /// Serialize as `tag + 2-digit byte length + value`.
    pub fn encode(&self) -> VietQrResult<String> {
        let len = self.value.len();
        if len > MAX_VALUE_LEN {
            return Err(VietQrError::FieldTooLong {
                tag: self.tag.clone(),
                len,
            });
        }
        Ok(format!("{}{:02}{}", self.tag, len, self.value))
    }
}

/// Shorthand for `TlvField::new(tag, value).encode()`.
pub fn field(tag: &str, value: &str) -> VietQrResult<String> {
    TlvField::new(tag, value).encode()
}

/// CRC16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no final xor.
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Checksum formatted the way it is appended to a payload.
pub fn checksum_hex(data: &str) -> String {
    format!("{:04X}", crc16_ccitt_false(data.as_bytes()))
}

/// Check that the trailing 4 hex digits match the checksum of everything before them.
pub fn verify_crc(payload: &str) -> bool {
    if payload.len() < CRC_PREFIX.len() + 4 || !payload.is_char_boundary(payload.len() - 4) {
        return false;
    }
    let (body, crc) = payload.split_at(payload.len() - 4);
    body.ends_with(CRC_PREFIX) && checksum_hex(body) == crc
}

/// Split a flat TLV string into its top-level fields.
pub fn split_fields(data: &str) -> Option<Vec<TlvField>> {
    let mut fields = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let tag = rest.get(0..2)?;
        let len: usize = rest.get(2..4)?.parse().ok()?;
        let value = rest.get(4..4 + len)?;
        fields.push(TlvField::new(tag, value));
        rest = &rest[4 + len..];
    }

    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_matches_standard_check_value() {
        assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
        assert_eq!(checksum_hex("123456789"), "29B1");
    }

    #[test]
    fn crc_of_empty_input_is_init_value() {
        assert_eq!(crc16_ccitt_false(b""), 0xFFFF);
    }

    #[test]
    fn checksum_is_zero_padded() {
        let hex = checksum_hex("A");
        assert_eq!(hex.len(), 4);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn field_encodes_two_digit_length() {
        assert_eq!(field("58", "VN").unwrap(), "5802VN");
        assert_eq!(field("00", "").unwrap(), "0000");
        assert_eq!(field("00", "A000000727").unwrap(), "0010A000000727");
    }

    #[test]
    fn field_accepts_exactly_99_bytes() {
        let value = "x".repeat(99);
        let encoded = field("08", &value).unwrap();
        assert!(encoded.starts_with("0899"));
        assert_eq!(encoded.len(), 4 + 99);
    }

    #[test]
    fn field_rejects_100_bytes() {
        let err = field("08", &"x".repeat(100)).unwrap_err();
        match err {
            VietQrError::FieldTooLong { tag, len } => {
                assert_eq!(tag, "08");
                assert_eq!(len, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn length_counts_bytes_not_chars() {
        // "đ" is two bytes in UTF-8
        assert_eq!(field("08", "đ").unwrap(), "0802đ");
    }

    #[test]
    fn split_fields_reads_nested_values() {
        let fields = split_fields("0010A00000072701240006970436011099091413110208QRIBFTTA").unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], TlvField::new("00", "A000000727"));
        assert_eq!(fields[1].value, "000697043601109909141311");
        assert_eq!(fields[2], TlvField::new("02", "QRIBFTTA"));
    }

    #[test]
    fn split_fields_rejects_truncated_input() {
        assert!(split_fields("0005ab").is_none());
        assert!(split_fields("00").is_none());
        assert!(split_fields("00xxab").is_none());
    }

    #[test]
    fn verify_crc_detects_tampering() {
        let body = "5802VN6304";
        let payload = format!("{}{}", body, checksum_hex(body));
        assert!(verify_crc(&payload));

        let tampered = payload.replace("VN", "VM");
        assert!(!verify_crc(&tampered));
        assert!(!verify_crc("6304"));
    }
}
