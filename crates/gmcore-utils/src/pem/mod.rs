//! PEM document parsing and generation.

use gmcore_types::CryptoError;

/// A parsed PEM block.
#[derive(Debug, Clone)]
pub struct PemBlock {
    /// The label between BEGIN/END (e.g. "SM9 SIGN MASTER PUBLIC KEY").
    pub label: String,
    /// The Base64-decoded body.
    pub data: Vec<u8>,
}

const BEGIN: &str = "-----BEGIN ";
const END: &str = "-----END ";
const DASHES: &str = "-----";

/// Parse every PEM block in `input`.
pub fn parse(input: &str) -> Result<Vec<PemBlock>, CryptoError> {
    let mut blocks = Vec::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        let line = line.trim();
        let Some(label) = line
            .strip_prefix(BEGIN)
            .and_then(|rest| rest.strip_suffix(DASHES))
        else {
            continue;
        };
        let end_marker = format!("{END}{label}{DASHES}");

        let mut body = String::new();
        let mut closed = false;
        for inner in lines.by_ref() {
            let inner = inner.trim();
            if inner == end_marker {
                closed = true;
                break;
            }
            body.push_str(inner);
        }
        if !closed {
            return Err(CryptoError::InvalidPem);
        }
        let data = crate::base64::decode(&body).map_err(|_| CryptoError::InvalidPem)?;
        blocks.push(PemBlock {
            label: label.to_string(),
            data,
        });
    }
    Ok(blocks)
}

/// Parse `input` and return its first PEM block.
pub fn parse_first(input: &str) -> Result<PemBlock, CryptoError> {
    parse(input)?
        .into_iter()
        .next()
        .ok_or(CryptoError::InvalidPem)
}

/// Encode `data` as a PEM document with the given label, wrapping the
/// body at 64 columns.
pub fn encode(label: &str, data: &[u8]) -> String {
    let body = crate::base64::encode(data);
    let mut out = format!("{BEGIN}{label}{DASHES}\n");
    for chunk in body.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(chunk).unwrap());
        out.push('\n');
    }
    out.push_str(&format!("{END}{label}{DASHES}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data: Vec<u8> = (0..100).collect();
        let doc = encode("TEST KEY", &data);
        let block = parse_first(&doc).unwrap();
        assert_eq!(block.label, "TEST KEY");
        assert_eq!(block.data, data);
    }

    #[test]
    fn multiple_blocks() {
        let doc = "\
-----BEGIN FIRST-----
AQID
-----END FIRST-----
-----BEGIN SECOND-----
BAUG
-----END SECOND-----
";
        let blocks = parse(doc).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].label, "FIRST");
        assert_eq!(blocks[0].data, [1, 2, 3]);
        assert_eq!(blocks[1].label, "SECOND");
        assert_eq!(blocks[1].data, [4, 5, 6]);
    }

    #[test]
    fn missing_end_marker() {
        let doc = "-----BEGIN X-----\nAQID\n";
        assert!(parse(doc).is_err());
    }

    #[test]
    fn no_block_found() {
        assert!(parse_first("not pem at all").is_err());
    }
}
