//! Product data shown on a tag, and its validation rules.

use std::fmt;

use image::Rgba;
use url::Url;

use crate::csv_input::RawRow;
use crate::{Result, TagError};

/// Quality-control status of a product.
///
/// Unrecognised text is kept verbatim in [`QcStatus::Other`] so it can be
/// rendered with the fallback indicator colour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QcStatus {
    #[default]
    Approved,
    NotApproved,
    Prototype,
    Other(String),
}

impl QcStatus {
    /// Display labels of the recognised statuses, in form order.
    pub const KNOWN: [&'static str; 3] = ["Approved", "Not Approved", "Prototype"];

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Approved" => Self::Approved,
            "Not Approved" => Self::NotApproved,
            "Prototype" => Self::Prototype,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "Approved",
            Self::NotApproved => "Not Approved",
            Self::Prototype => "Prototype",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Fill colour of the round status indicator.
    pub fn indicator_color(&self) -> Rgba<u8> {
        match self {
            Self::Approved => Rgba([0x2e, 0xcc, 0x71, 255]),
            Self::NotApproved => Rgba([0xe7, 0x4c, 0x3c, 255]),
            Self::Prototype => Rgba([0xe6, 0x7e, 0x22, 255]),
            Self::Other(_) => Rgba([0x08, 0x38, 0x38, 255]),
        }
    }
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product's tag fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductRecord {
    pub product_name: String,
    pub part_number: String,
    pub qc_status: QcStatus,
    pub made_in: String,
    pub catalog_url: String,
}

impl ProductRecord {
    /// Build a record from form values, trimming surrounding whitespace.
    pub fn new(
        product_name: &str,
        part_number: &str,
        qc_status: &str,
        made_in: &str,
        catalog_url: &str,
    ) -> Self {
        Self {
            product_name: product_name.trim().to_string(),
            part_number: part_number.trim().to_string(),
            qc_status: QcStatus::parse(qc_status),
            made_in: made_in.trim().to_string(),
            catalog_url: catalog_url.trim().to_string(),
        }
    }

    /// Build and validate a record from a CSV row.
    ///
    /// Rows are held to [`validate_fields`](Self::validate_fields); an
    /// unrecognised QC status is accepted and rendered with the fallback
    /// indicator.
    pub fn from_row(row: &RawRow) -> Result<Self> {
        let get = |key: &str| row.get(key).map(String::as_str).unwrap_or_default();
        let record = Self::new(
            get("product_name"),
            get("part_number"),
            get("qc_status"),
            get("made_in"),
            get("catalog_url"),
        );
        record.validate_fields()?;
        Ok(record)
    }

    /// Validate everything except the QC status.
    pub fn validate_fields(&self) -> Result<()> {
        if self.product_name.trim().is_empty() {
            return Err(TagError::Validation("Product Name must not be empty.".into()));
        }
        if self.part_number.trim().is_empty() {
            return Err(TagError::Validation("Part Number must not be empty.".into()));
        }
        let url = self.catalog_url.trim();
        if !url.is_empty() && !is_valid_url(url) {
            return Err(TagError::Validation(
                "Catalog / Product Information Link must be a valid URL.".into(),
            ));
        }
        Ok(())
    }

    /// Full validation used before rendering form input.
    pub fn validate(&self) -> Result<()> {
        self.validate_fields()?;
        if !self.qc_status.is_known() {
            return Err(TagError::Validation(format!(
                "QC Status must be one of {:?}.",
                QcStatus::KNOWN
            )));
        }
        Ok(())
    }

    /// Text encoded in the tag's QR code: the part number, then the
    /// catalog URL on its own line when present.
    pub fn qr_payload(&self) -> String {
        let mut payload = format!("Part Number: {}", self.part_number.trim());
        let url = self.catalog_url.trim();
        if !url.is_empty() {
            payload.push('\n');
            payload.push_str(url);
        }
        payload
    }
}

/// Absolute http(s) URL with a host.
fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
