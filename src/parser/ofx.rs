//! OFX/QFX extractor (spec.md §4.1): accepts both SGML-style header+body
//! tag-soup and well-formed XML; both reduce to one record per `<STMTTRN>`
//! with keys `{DTPOSTED, TRNAMT, NAME, MEMO, FITID, TRNTYPE, CHECKNUM}`.

use crate::errors::AppError;
use crate::parser::RawRecord;

const TRANSACTION_TAGS: [&str; 7] = [
    "DTPOSTED", "TRNAMT", "NAME", "MEMO", "FITID", "TRNTYPE", "CHECKNUM",
];

pub fn extract(text: &str) -> Result<Vec<RawRecord>, AppError> {
    let body = strip_sgml_header(text);
    let mut records = Vec::new();
    let mut current: Option<RawRecord> = None;

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line_is_open_tag(line, "STMTTRN") {
            current = Some(RawRecord::new());
            continue;
        }
        if line_is_close_tag(line, "STMTTRN") {
            if let Some(record) = current.take() {
                if !record.is_empty() {
                    records.push(record);
                }
            }
            continue;
        }

        if let Some(record) = current.as_mut() {
            if let Some((tag, value)) = split_tag(line) {
                let tag_upper = tag.to_ascii_uppercase();
                if TRANSACTION_TAGS.contains(&tag_upper.as_str()) {
                    record.insert(tag_upper, value.to_string());
                }
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::DataQuality(
            "OFX/QFX file contains no STMTTRN blocks".to_string(),
        ));
    }
    Ok(records)
}

/// SGML OFX files carry a header block (`OFXHEADER:100` ... blank line)
/// before the `<OFX>` body; XML OFX files start directly with `<?xml` or
/// `<OFX>`. Stripping any header leaves a uniform tag-soup body either way.
fn strip_sgml_header(text: &str) -> &str {
    if let Some(pos) = text.find("<OFX>") {
        return &text[pos..];
    }
    if let Some(pos) = text.find("<ofx>") {
        return &text[pos..];
    }
    text
}

fn line_is_open_tag(line: &str, tag: &str) -> bool {
    let expected = format!("<{tag}>");
    line.eq_ignore_ascii_case(&expected)
}

fn line_is_close_tag(line: &str, tag: &str) -> bool {
    let expected = format!("</{tag}>");
    line.eq_ignore_ascii_case(&expected)
}

/// Handles both SGML (`<TAG>value`, unclosed) and XML (`<TAG>value</TAG>`)
/// leaf elements.
fn split_tag(line: &str) -> Option<(&str, &str)> {
    if !line.starts_with('<') {
        return None;
    }
    let end = line.find('>')?;
    let name = &line[1..end];
    if name.starts_with('/') {
        return None;
    }
    let rest = &line[end + 1..];
    let value = if let Some(close_start) = rest.find("</") {
        &rest[..close_start]
    } else {
        rest
    };
    Some((name, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgml_style_ofx_extracts_transactions() {
        let ofx = "OFXHEADER:100\nDATA:OFXSGML\n\n<OFX>\n<BANKMSGSRSV1>\n<STMTTRN>\n<TRNTYPE>DEBIT\n<DTPOSTED>20240115\n<TRNAMT>-12.50\n<FITID>1001\n<NAME>ACME STORE\n</STMTTRN>\n</BANKMSGSRSV1>\n</OFX>\n";
        let records = extract(ofx).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("DTPOSTED").unwrap(), "20240115");
        assert_eq!(records[0].get("TRNAMT").unwrap(), "-12.50");
        assert_eq!(records[0].get("NAME").unwrap(), "ACME STORE");
    }

    #[test]
    fn xml_style_ofx_extracts_transactions() {
        let ofx = "<?xml version=\"1.0\"?>\n<OFX>\n<STMTTRN>\n<TRNTYPE>CREDIT</TRNTYPE>\n<DTPOSTED>20240116</DTPOSTED>\n<TRNAMT>100.00</TRNAMT>\n<FITID>1002</FITID>\n<NAME>PAYROLL</NAME>\n</STMTTRN>\n</OFX>\n";
        let records = extract(ofx).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("TRNAMT").unwrap(), "100.00");
    }

    #[test]
    fn no_stmttrn_blocks_errors() {
        let ofx = "<OFX><BANKMSGSRSV1></BANKMSGSRSV1></OFX>";
        assert!(extract(ofx).is_err());
    }
}
