use serde::{Deserialize, Serialize};

use crate::assets::AssetStore;
use crate::composer::{Composer, CompositionOptions};
use crate::config::VietQrConfig;
use crate::error::{VietQrError, VietQrResult};
use crate::payload::{EncodingRequest, PayloadEncoder};

pub const STYLE_TEMPLATE: &str = "template";

/// Raw query parameters of the `/vietqr` endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VietQrQuery {
    pub bankcode: Option<String>,
    pub account: Option<String>,
    pub amount: Option<String>,
    /// Transfer description ("nội dung")
    pub noidung: Option<String>,
    pub style: Option<String>,
    pub logo: Option<String>,
    pub logo_size: Option<String>,
}

/// A validated request, ready for the encoder and composer.
#[derive(Debug, Clone)]
pub struct VietQrRequest {
    pub encoding: EncodingRequest,
    pub composition: CompositionOptions,
}

#[derive(Debug, Clone)]
pub struct GeneratedQr {
    pub payload: String,
    pub png: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct VietQrResponse {
    pub success: bool,
    pub data: Option<VietQrData>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VietQrData {
    pub payload: String,
    pub qr_code: String,
}

#[derive(Debug, Clone)]
pub struct VietQrService {
    encoder: PayloadEncoder,
    composer: Composer,
    config: VietQrConfig,
}

impl VietQrService {
    pub fn new(config: VietQrConfig) -> Self {
        let assets = AssetStore::new(config.assets_dir.clone());

        Self {
            encoder: PayloadEncoder::new(),
            composer: Composer::new(assets),
            config,
        }
    }

    pub fn encoder(&self) -> &PayloadEncoder {
        &self.encoder
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Validate query parameters into a request
    pub fn prepare(&self, query: VietQrQuery) -> VietQrResult<VietQrRequest> {
        let bank_code = non_empty(query.bankcode).ok_or(VietQrError::MissingField("bankcode"))?;
        let account = non_empty(query.account).ok_or(VietQrError::MissingField("account"))?;

        let logo_ratio = match non_empty(query.logo_size) {
            Some(raw) => parse_ratio(&raw)?,
            None => self.config.logo_ratio,
        };

        let template = match query.style.as_deref() {
            Some(STYLE_TEMPLATE) => Some(self.config.template.clone()),
            _ => None,
        };

        Ok(VietQrRequest {
            encoding: EncodingRequest {
                bank_code,
                account,
                amount: query.amount,
                description: non_empty(query.noidung),
            },
            composition: CompositionOptions {
                template,
                logo: non_empty(query.logo),
                qr_size: self.config.qr_size,
                logo_ratio,
            },
        })
    }

    /// Build the payload and the composed PNG
    pub fn generate(&self, request: &VietQrRequest) -> VietQrResult<GeneratedQr> {
        let payload = self.encoder.build_payload(&request.encoding)?;

        log::info!(
            "Generating VietQR for bank {} account {} (template: {}, logo: {})",
            request.encoding.bank_code,
            request.encoding.account,
            request.composition.template.as_deref().unwrap_or("-"),
            request.composition.logo.as_deref().unwrap_or("-")
        );

        let image = self.composer.compose(&payload, &request.composition)?;
        let png = self.composer.qr_service().encode_png(&image)?;

        Ok(GeneratedQr { payload, png })
    }

    pub fn generate_from_query(&self, query: VietQrQuery) -> VietQrResult<GeneratedQr> {
        let request = self.prepare(query)?;
        self.generate(&request)
    }

    /// Payload plus the image as a base64 data URL
    pub fn generate_data(&self, query: VietQrQuery) -> VietQrResult<VietQrData> {
        let generated = self.generate_from_query(query)?;
        let qr_code = self.composer.qr_service().to_data_url(&generated.png);

        Ok(VietQrData {
            payload: generated.payload,
            qr_code,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_ratio(raw: &str) -> VietQrResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(ratio) if ratio > 0.0 && ratio <= 1.0 => Ok(ratio),
        _ => Err(VietQrError::InvalidLogoRatio(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn service() -> VietQrService {
        VietQrService::new(Config::default().vietqr)
    }

    fn query(bank: &str, account: &str) -> VietQrQuery {
        VietQrQuery {
            bankcode: Some(bank.to_string()),
            account: Some(account.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn requires_bank_and_account() {
        let svc = service();
        let err = svc.prepare(VietQrQuery::default()).unwrap_err();
        assert!(matches!(err, VietQrError::MissingField("bankcode")));

        let err = svc.prepare(query("970436", " ")).unwrap_err();
        assert!(matches!(err, VietQrError::MissingField("account")));
    }

    #[test]
    fn style_template_selects_configured_template() {
        let svc = service();
        let mut q = query("970436", "9909141311");
        q.style = Some("template".to_string());
        let request = svc.prepare(q).unwrap();
        assert_eq!(request.composition.template.as_deref(), Some("VietQR.png"));

        let mut q = query("970436", "9909141311");
        q.style = Some("plain".to_string());
        assert!(svc.prepare(q).unwrap().composition.template.is_none());
    }

    #[test]
    fn logo_size_is_validated() {
        let svc = service();

        let mut q = query("970436", "9909141311");
        q.logo_size = Some("0.2".to_string());
        assert_eq!(svc.prepare(q).unwrap().composition.logo_ratio, 0.2);

        for bad in ["abc", "0", "-1", "3"] {
            let mut q = query("970436", "9909141311");
            q.logo_size = Some(bad.to_string());
            assert!(matches!(
                svc.prepare(q),
                Err(VietQrError::InvalidLogoRatio(_))
            ));
        }

        let q = query("970436", "9909141311");
        assert_eq!(svc.prepare(q).unwrap().composition.logo_ratio, 0.15);
    }

    #[test]
    fn generates_png_for_bare_request() {
        let generated = service()
            .generate_from_query(query("970436", "9909141311"))
            .unwrap();
        assert_eq!(
            generated.payload,
            "00020101021238540010A00000072701240006970436011099091413110208QRIBFTTA53037045802VN63049AFE"
        );
        assert_eq!(&generated.png[1..4], b"PNG");
    }

    #[test]
    fn data_url_response() {
        let mut q = query("970436", "9909141311");
        q.amount = Some("abc".to_string());
        let data = service().generate_data(q).unwrap();
        let fields = crate::emv::split_fields(&data.payload).unwrap();
        assert!(fields.iter().all(|f| f.tag != "54"));
        assert!(data.qr_code.starts_with("data:image/png;base64,"));
    }
}
