//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Light-gray header fill.
pub const C_COLOR_HEADER_FILL: &str = "#CCCCCC";
/// Brand-blue header fill used by highlighted sheets.
pub const C_COLOR_HEADER_FILL_BRAND: &str = "#4472C4";
/// Font color paired with the brand-blue fill.
pub const C_COLOR_HEADER_FONT_BRAND: &str = "#FFFFFF";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Generic text cell format.
    Text,
    /// Numeric cell format.
    Number,
    /// Light-gray header cell format.
    Header,
    /// Brand-blue header cell format.
    HeaderBrand,
}

impl EnumFmtKey {
    /// Preset map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Header => "header",
            Self::HeaderBrand => "header_brand",
        }
    }
}

/// Build default named format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Text.as_str().to_string(),
        cfg_base_fmt_spec.clone(),
    );
    dict_fmt.insert(
        EnumFmtKey::Number.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("General".to_string()),
            ..Default::default()
        }),
    );

    let cfg_header_fmt_spec = cfg_base_fmt_spec.with_(SpecCellFormat {
        bold: Some(true),
        bg_color: Some(C_COLOR_HEADER_FILL.to_string()),
        ..Default::default()
    });
    dict_fmt.insert(
        EnumFmtKey::HeaderBrand.as_str().to_string(),
        cfg_header_fmt_spec.with_(SpecCellFormat {
            bg_color: Some(C_COLOR_HEADER_FILL_BRAND.to_string()),
            font_color: Some(C_COLOR_HEADER_FONT_BRAND.to_string()),
            align: Some("center".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_header_fmt_spec,
    );

    dict_fmt
}

/// Look up one preset from [`derive_default_xlsx_formats`].
pub fn derive_default_xlsx_format(key: EnumFmtKey) -> SpecCellFormat {
    derive_default_xlsx_formats()
        .remove(key.as_str())
        .unwrap_or_default()
}
