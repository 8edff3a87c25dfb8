//! Barcode validation, format detection, and lookup.

use chrono::Utc;

use crate::error::{CurioError, Result};
use crate::item::{BarcodeFormat, MediaItem};

fn is_digits(code: &str, len: usize) -> bool {
    code.len() == len && code.bytes().all(|b| b.is_ascii_digit())
}

/// UPC-A: exactly 12 digits.
pub fn is_valid_upc(code: &str) -> bool {
    is_digits(code, 12)
}

/// EAN-13: exactly 13 digits.
pub fn is_valid_ean(code: &str) -> bool {
    is_digits(code, 13)
}

/// ISBN-10 or ISBN-13, dashes allowed. ISBN-13 must carry a 978/979
/// prefix; ISBN-10 may end in the X check character.
pub fn is_valid_isbn(code: &str) -> bool {
    let cleaned: String = code.chars().filter(|c| *c != '-').collect();
    let bytes = cleaned.as_bytes();

    let body = match bytes.len() {
        10 => bytes,
        13 if bytes.starts_with(b"978") || bytes.starts_with(b"979") => &bytes[3..],
        _ => return false,
    };

    let (digits, check) = match body.split_last() {
        Some((check, digits)) => (digits, *check),
        None => return false,
    };
    digits.iter().all(u8::is_ascii_digit) && (check.is_ascii_digit() || check == b'X')
}

/// Classify a scanned code by shape, dashes ignored.
///
/// An all-digit ISBN-13 is indistinguishable from an EAN-13 and reads
/// as EAN; the ISBN shape catches ISBN-10s and codes with an X check
/// character.
pub fn detect_format(code: &str) -> BarcodeFormat {
    let cleaned: String = code.chars().filter(|c| *c != '-').collect();
    if is_valid_upc(&cleaned) {
        BarcodeFormat::Upc
    } else if is_valid_ean(&cleaned) {
        BarcodeFormat::Ean
    } else if is_valid_isbn(&cleaned) {
        BarcodeFormat::Isbn
    } else {
        BarcodeFormat::Other
    }
}

fn is_valid_for(code: &str, format: BarcodeFormat) -> bool {
    match format {
        BarcodeFormat::Upc => is_valid_upc(code),
        BarcodeFormat::Ean => is_valid_ean(code),
        BarcodeFormat::Isbn => is_valid_isbn(code),
        BarcodeFormat::Qr | BarcodeFormat::Other => !code.trim().is_empty(),
    }
}

/// A scan result ready to attach to an item.
#[derive(Debug, Clone)]
pub struct BarcodeScan {
    /// Raw scanned code
    pub code: String,

    /// Detected or caller-supplied format
    pub format: BarcodeFormat,
}

impl BarcodeScan {
    /// Build a scan, detecting the format from the code's shape.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::InvalidInput`] when the code is empty.
    pub fn detect(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(CurioError::InvalidInput("Barcode is empty".to_string()));
        }
        let format = detect_format(&code);
        Ok(Self { code, format })
    }

    /// Build a scan with an explicit format.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::InvalidInput`] when the code does not
    /// match the named format.
    pub fn with_format(code: impl Into<String>, format: BarcodeFormat) -> Result<Self> {
        let code = code.into();
        if !is_valid_for(&code, format) {
            return Err(CurioError::InvalidInput(format!(
                "Invalid {format:?} barcode: {code}"
            )));
        }
        Ok(Self { code, format })
    }

    /// Write the scan onto an item. Lifecycle stamping is the
    /// collection manager's job.
    pub fn apply(&self, item: &mut MediaItem) {
        item.barcode = Some(self.code.clone());
        item.barcode_type = Some(self.format);
        item.scanned_at = Some(Utc::now());
    }
}

/// First non-deleted item carrying exactly this code.
pub fn find_by_barcode<'a>(items: &'a [MediaItem], code: &str) -> Option<&'a MediaItem> {
    items
        .iter()
        .find(|item| !item.is_deleted() && item.barcode.as_deref() == Some(code))
}

/// All items that have a barcode attached.
pub fn items_with_barcodes(items: &[MediaItem]) -> Vec<&MediaItem> {
    items.iter().filter(|item| item.barcode.is_some()).collect()
}
