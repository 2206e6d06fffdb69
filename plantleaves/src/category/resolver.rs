use super::labels::{LabelMapping, CODE_LEN};

const SUFFIX: &str = ".JPG";

/// Extracts the 4-digit code from a file name shaped like `DDDD_*.JPG`.
///
/// The match is anchored on both ends and case sensitive, so `0001_a.jpg`
/// does not match. Names spanning several lines never match.
pub fn parse_code(filename: &str) -> Option<&str> {
    let bytes = filename.as_bytes();
    if bytes.len() < CODE_LEN + 1 + SUFFIX.len() || !filename.ends_with(SUFFIX) {
        return None;
    }
    let (code, rest) = bytes.split_at(CODE_LEN);
    if !code.iter().all(u8::is_ascii_digit) || rest[0] != b'_' || rest.contains(&b'\n') {
        return None;
    }
    // The leading bytes are ASCII, so this is a char boundary.
    Some(&filename[..CODE_LEN])
}

/// Assigns labels to downloaded files from their names.
#[derive(Debug, Clone, Copy)]
pub struct FilenameLabeler<'a> {
    labels: &'a LabelMapping,
}

impl<'a> FilenameLabeler<'a> {
    pub fn new(labels: &'a LabelMapping) -> Self {
        Self { labels }
    }

    pub fn resolve(&self, filename: &str) -> Option<&'a str> {
        self.labels.label(parse_code(filename)?)
    }

    /// Label together with its class index.
    pub fn resolve_indexed(&self, filename: &str) -> Option<(&'a str, usize)> {
        let code = parse_code(filename)?;
        Some((self.labels.label(code)?, self.labels.class_index(code)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::labels::PLANT_LEAVES_LABELS;

    #[test]
    fn parses_well_formed_names() {
        assert_eq!(parse_code("0001_leaf.JPG"), Some("0001"));
        assert_eq!(parse_code("0019_0123.JPG"), Some("0019"));
        // `.*` may be empty.
        assert_eq!(parse_code("0003_.JPG"), Some("0003"));
        assert_eq!(parse_code("0003_a_b.c.JPG"), Some("0003"));
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "0001_leaf.jpg",
            "0001_leaf.Jpg",
            "0001leaf.JPG",
            "001_leaf.JPG",
            "00001_leaf.JPG",
            "a001_leaf.JPG",
            "0001_leaf.JPG.bak",
            "x0001_leaf.JPG",
            "0001_.JP",
            "",
            "\u{0661}\u{0662}_leaf.JPG",
            "0001_leaf\n.JPG",
            "0001_\n.JPG",
        ] {
            assert_eq!(parse_code(name), None, "{name}");
        }
    }

    #[test]
    fn every_known_code_resolves_to_its_label() {
        let labels = LabelMapping::plant_leaves();
        let labeler = FilenameLabeler::new(&labels);
        for (idx, (code, label)) in PLANT_LEAVES_LABELS.iter().enumerate() {
            let name = format!("{code}_0042.JPG");
            assert_eq!(labeler.resolve(&name), Some(*label));
            assert_eq!(labeler.resolve_indexed(&name), Some((*label, idx)));
        }
    }

    #[test]
    fn unknown_codes_have_no_label() {
        let labels = LabelMapping::plant_leaves();
        let labeler = FilenameLabeler::new(&labels);
        assert_eq!(labeler.resolve("0099_leaf.JPG"), None);
        assert_eq!(labeler.resolve("0000_leaf.JPG"), None);
        assert_eq!(labeler.resolve("0001_leaf.jpg"), None);
    }
}
