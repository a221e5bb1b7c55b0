use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::emv::{self, field};
use crate::error::VietQrResult;

/// VietQR registered GUID (NAPAS)
pub const VIETQR_GUID: &str = "A000000727";
/// Fast transfer to account number
pub const SERVICE_TO_ACCOUNT: &str = "QRIBFTTA";
/// ISO 4217 numeric code for VND
pub const CURRENCY_VND: &str = "704";
pub const COUNTRY_VN: &str = "VN";

const PAYLOAD_FORMAT_VERSION: &str = "01";
/// Dynamic (one-time) QR
const POINT_OF_INITIATION_DYNAMIC: &str = "12";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodingRequest {
    pub bank_code: String,
    pub account: String,
    pub amount: Option<String>,
    pub description: Option<String>,
}

impl EncodingRequest {
    pub fn new(bank_code: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            bank_code: bank_code.into(),
            account: account.into(),
            amount: None,
            description: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Builds VietQR (EMVCo MPM) payload strings. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadEncoder;

impl PayloadEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Field order: header, 38, 53, [54], 58, [62], then `6304` and the CRC.
    pub fn build_payload(&self, request: &EncodingRequest) -> VietQrResult<String> {
        let mut payload = String::with_capacity(160);

        payload.push_str(&field(emv::TAG_PAYLOAD_FORMAT, PAYLOAD_FORMAT_VERSION)?);
        payload.push_str(&field(
            emv::TAG_POINT_OF_INITIATION,
            POINT_OF_INITIATION_DYNAMIC,
        )?);
        payload.push_str(&self.merchant_account(&request.bank_code, &request.account)?);
        payload.push_str(&field(emv::TAG_CURRENCY, CURRENCY_VND)?);

        match request.amount.as_deref().and_then(normalize_amount) {
            Some(amount) => payload.push_str(&field(emv::TAG_AMOUNT, &amount.to_string())?),
            None => {
                if let Some(raw) = &request.amount {
                    log::debug!("Amount {:?} is not a positive number, omitting tag 54", raw);
                }
            }
        }

        payload.push_str(&field(emv::TAG_COUNTRY, COUNTRY_VN)?);

        if let Some(description) = request.description.as_deref().filter(|d| !d.is_empty()) {
            let purpose = field(emv::TAG_PURPOSE, description)?;
            payload.push_str(&field(emv::TAG_ADDITIONAL_DATA, &purpose)?);
        }

        payload.push_str(emv::CRC_PREFIX);
        let crc = emv::checksum_hex(&payload);
        payload.push_str(&crc);

        Ok(payload)
    }

    /// Convenience wrapper over [`PayloadEncoder::build_payload`].
    pub fn build(
        &self,
        bank_code: &str,
        account: &str,
        amount: Option<&str>,
        description: Option<&str>,
    ) -> VietQrResult<String> {
        self.build_payload(&EncodingRequest {
            bank_code: bank_code.to_string(),
            account: account.to_string(),
            amount: amount.map(str::to_string),
            description: description.map(str::to_string),
        })
    }

    fn merchant_account(&self, bank_code: &str, account: &str) -> VietQrResult<String> {
        let beneficiary = format!(
            "{}{}",
            field(emv::TAG_BANK_BIN, bank_code)?,
            field(emv::TAG_ACCOUNT_NUMBER, account)?
        );

        let template = format!(
            "{}{}{}",
            field(emv::TAG_GUID, VIETQR_GUID)?,
            field(emv::TAG_BENEFICIARY, &beneficiary)?,
            field(emv::TAG_SERVICE_CODE, SERVICE_TO_ACCOUNT)?
        );

        field(emv::TAG_MERCHANT_ACCOUNT, &template)
    }
}

/// Parse a user supplied amount like `" 1,000.50 "` into whole dong.
///
/// Returns `None` when the input is not a number or is not positive after
/// truncation; the caller omits the amount field in that case.
pub fn normalize_amount(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    if value <= Decimal::ZERO {
        return None;
    }

    value.trunc().to_u64().filter(|v| *v > 0)
}
