use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::assets::AssetStore;
use crate::error::{VietQrError, VietQrResult};
use crate::qr::QrService;

pub const DEFAULT_QR_SIZE: u32 = 360;
pub const DEFAULT_LOGO_RATIO: f64 = 0.15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionOptions {
    /// Template asset name; the QR is centered on it at `qr_size` pixels.
    pub template: Option<String>,
    /// Logo asset name, centered over the result.
    pub logo: Option<String>,
    pub qr_size: u32,
    /// Logo side as a fraction of the displayed QR side.
    pub logo_ratio: f64,
}

impl Default for CompositionOptions {
    fn default() -> Self {
        Self {
            template: None,
            logo: None,
            qr_size: DEFAULT_QR_SIZE,
            logo_ratio: DEFAULT_LOGO_RATIO,
        }
    }
}

/// Renders a payload and lays it out on an optional template with an optional logo.
#[derive(Debug, Clone)]
pub struct Composer {
    qr: QrService,
    assets: AssetStore,
}

impl Composer {
    pub fn new(assets: AssetStore) -> Self {
        Self {
            qr: QrService::new(),
            assets,
        }
    }

    pub fn qr_service(&self) -> &QrService {
        &self.qr
    }

    /// Compose using asset names resolved against the asset root.
    pub fn compose(&self, payload: &str, options: &CompositionOptions) -> VietQrResult<RgbaImage> {
        let template = self.lookup(options.template.as_deref())?;
        let logo = self.lookup(options.logo.as_deref())?;

        self.compose_paths(
            payload,
            template.as_deref(),
            logo.as_deref(),
            options.qr_size,
            options.logo_ratio,
        )
    }

    /// Compose using filesystem paths directly.
    ///
    /// A template or logo that cannot be opened is skipped and the result
    /// falls back to the simpler layout.
    pub fn compose_paths(
        &self,
        payload: &str,
        template: Option<&Path>,
        logo: Option<&Path>,
        qr_size: u32,
        logo_ratio: f64,
    ) -> VietQrResult<RgbaImage> {
        if qr_size == 0 {
            return Err(VietQrError::InvalidQrSize);
        }
        if !(logo_ratio > 0.0 && logo_ratio <= 1.0) {
            return Err(VietQrError::InvalidLogoRatio(logo_ratio.to_string()));
        }

        // Decide on the template first: the quiet zone depends on it
        let template = template.and_then(load_rgba);
        let qr_img = self.qr.render(payload, template.is_none())?;

        let (mut base, displayed_qr_side) = match template {
            Some(mut background) => {
                let resized = imageops::resize(&qr_img, qr_size, qr_size, FilterType::Lanczos3);
                let (x, y) = center_offset(background.dimensions(), resized.dimensions());
                imageops::overlay(&mut background, &resized, x, y);
                (background, qr_size)
            }
            None => {
                let side = qr_img.width();
                (qr_img, side)
            }
        };

        if let Some(logo) = logo.and_then(load_rgba) {
            let side = logo_size(displayed_qr_side, logo_ratio);
            if side == 0 {
                log::warn!("Logo size rounds to 0 px, skipping logo");
            } else {
                let resized = imageops::resize(&logo, side, side, FilterType::Lanczos3);
                let (x, y) = center_offset(base.dimensions(), resized.dimensions());
                imageops::overlay(&mut base, &resized, x, y);
            }
        }

        Ok(base)
    }

    fn lookup(&self, name: Option<&str>) -> VietQrResult<Option<std::path::PathBuf>> {
        match name {
            Some(name) => self.assets.resolve(name),
            None => Ok(None),
        }
    }
}

/// Top-left offset that centers `inner` on `outer`, floor-divided.
pub fn center_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    let x = (outer.0 as i64 - inner.0 as i64).div_euclid(2);
    let y = (outer.1 as i64 - inner.1 as i64).div_euclid(2);
    (x, y)
}

pub fn logo_size(qr_side: u32, ratio: f64) -> u32 {
    (qr_side as f64 * ratio).floor() as u32
}

fn load_rgba(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            log::warn!("Cannot open image {}: {}, skipping", path.display(), e);
            None
        }
    }
}
