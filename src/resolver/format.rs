//! kpathsea format code table
//!
//! Clients send the integer values of kpathsea's `kpse_file_format_type`
//! enum; `kpsewhich` wants the corresponding `--format` name. This table
//! covers the formats a pdfTeX engine actually requests. Codes outside the
//! table resolve without a `--format` argument, which makes kpsewhich fall
//! back to a plain filename search.

/// Map a `kpse_file_format_type` value to its `kpsewhich --format` name.
#[must_use]
pub fn kpse_format_name(code: i64) -> Option<&'static str> {
    match code {
        0 => Some("gf"),
        1 => Some("pk"),
        3 => Some("tfm"),
        4 => Some("afm"),
        10 => Some("fmt"),
        11 => Some("map"),
        20 => Some("ofm"),
        23 => Some("ovf"),
        25 => Some("graphic/figure"),
        26 => Some("tex"),
        30 => Some("PostScript header"),
        32 => Some("type1 fonts"),
        33 => Some("vf"),
        36 => Some("truetype fonts"),
        41 => Some("misc fonts"),
        44 => Some("enc files"),
        45 => Some("cmap files"),
        46 => Some("subfont definition files"),
        47 => Some("opentype fonts"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdftex_core_formats() {
        assert_eq!(kpse_format_name(3), Some("tfm"));
        assert_eq!(kpse_format_name(10), Some("fmt"));
        assert_eq!(kpse_format_name(11), Some("map"));
        assert_eq!(kpse_format_name(26), Some("tex"));
        assert_eq!(kpse_format_name(33), Some("vf"));
        assert_eq!(kpse_format_name(44), Some("enc files"));
    }

    #[test]
    fn test_font_file_formats() {
        assert_eq!(kpse_format_name(32), Some("type1 fonts"));
        assert_eq!(kpse_format_name(36), Some("truetype fonts"));
        assert_eq!(kpse_format_name(47), Some("opentype fonts"));
        assert_eq!(kpse_format_name(1), Some("pk"));
    }

    #[test]
    fn test_unknown_codes_have_no_name() {
        assert_eq!(kpse_format_name(-1), None);
        assert_eq!(kpse_format_name(2), None);
        assert_eq!(kpse_format_name(999), None);
    }
}
