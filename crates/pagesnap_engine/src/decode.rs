use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use pagesnap_logging::snap_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode raw bytes into UTF-8. Encoding precedence: BOM, Content-Type charset,
/// `<meta charset>` in the first kilobyte, then chardetng.
///
/// Never fails; the raw bytes are archived untouched, this text only feeds extraction.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> DecodedHtml {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    if let Some(enc) = meta_charset(bytes) {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
        .next()
}

/// Prescan for `charset=` inside the leading bytes, covering both
/// `<meta charset="...">` and the `http-equiv` form.
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    const PRESCAN_LEN: usize = 1024;
    let window = &bytes[..bytes.len().min(PRESCAN_LEN)];
    let lowered = String::from_utf8_lossy(window).to_ascii_lowercase();
    let start = lowered.find("charset=")? + "charset=".len();
    let label: String = lowered[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedHtml {
    let (text, used, had_errors) = enc.decode(bytes);
    if had_errors {
        snap_warn!("lossy decode of {} bytes as {}", bytes.len(), used.name());
    }
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: used.name().to_string(),
        had_errors,
    }
}
