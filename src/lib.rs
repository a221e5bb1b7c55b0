//! VietQR payment QR generator.
//!
//! [`payload::PayloadEncoder`] builds the EMVCo Merchant Presented Mode string,
//! [`composer::Composer`] renders it and lays it out on an optional bank template
//! with an optional centered logo.

pub mod api;
pub mod assets;
pub mod composer;
pub mod config;
pub mod emv;
pub mod error;
pub mod payload;
pub mod qr;
pub mod vietqr;

pub use composer::{Composer, CompositionOptions};
pub use error::{VietQrError, VietQrResult};
pub use payload::{EncodingRequest, PayloadEncoder};
pub use vietqr::VietQrService;
