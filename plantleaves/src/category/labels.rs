use std::collections::HashMap;

use crate::error::Error;

/// File name prefix to label mapping for the Plant Leaves dataset.
pub const PLANT_LEAVES_LABELS: [(&str, &str); 22] = [
    ("0014", "Alstonia Scholaris (P2) diseased"),
    ("0003", "Alstonia Scholaris (P2) healthy"),
    ("0013", "Arjun (P1) diseased"),
    ("0002", "Arjun (P1) healthy"),
    ("0016", "Bael (P4) diseased"),
    ("0008", "Basil (P8) healthy"),
    ("0022", "Chinar (P11) diseased"),
    ("0011", "Chinar (P11) healthy"),
    ("0015", "Gauva (P3) diseased"),
    ("0004", "Gauva (P3) healthy"),
    ("0017", "Jamun (P5) diseased"),
    ("0005", "Jamun (P5) healthy"),
    ("0018", "Jatropha (P6) diseased"),
    ("0006", "Jatropha (P6) healthy"),
    ("0021", "Lemon (P10) diseased"),
    ("0010", "Lemon (P10) healthy"),
    ("0012", "Mango (P0) diseased"),
    ("0001", "Mango (P0) healthy"),
    ("0020", "Pomegranate (P9) diseased"),
    ("0009", "Pomegranate (P9) healthy"),
    ("0019", "Pongamia Pinnata (P7) diseased"),
    ("0007", "Pongamia Pinnata (P7) healthy"),
];

pub const CODE_LEN: usize = 4;

/// Ordered, immutable association from a 4-digit file name code to a class
/// name. The order of the entries defines the class indices.
#[derive(Debug, Clone)]
pub struct LabelMapping {
    entries: Vec<(String, String)>,
    by_code: HashMap<String, usize>,
}

impl LabelMapping {
    pub fn new<C, L>(pairs: impl IntoIterator<Item = (C, L)>) -> Result<Self, Error>
    where
        C: Into<String>,
        L: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut by_code = HashMap::new();
        for (code, label) in pairs {
            let (code, label) = (code.into(), label.into());
            if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidLabelMapping(format!(
                    "code '{code}' is not {CODE_LEN} digits"
                )));
            }
            if entries.iter().any(|(_, l)| *l == label) {
                return Err(Error::InvalidLabelMapping(format!(
                    "label '{label}' appears twice"
                )));
            }
            if by_code.insert(code.clone(), entries.len()).is_some() {
                return Err(Error::InvalidLabelMapping(format!(
                    "code '{code}' appears twice"
                )));
            }
            entries.push((code, label));
        }
        Ok(Self { entries, by_code })
    }

    pub fn plant_leaves() -> Self {
        let entries: Vec<_> = PLANT_LEAVES_LABELS
            .iter()
            .map(|&(code, label)| (code.to_owned(), label.to_owned()))
            .collect();
        let by_code = entries
            .iter()
            .enumerate()
            .map(|(idx, (code, _))| (code.clone(), idx))
            .collect();
        Self { entries, by_code }
    }

    pub fn label(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(code)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Class index of `code`, in table order.
    pub fn class_index(&self, code: &str) -> Option<usize> {
        self.by_code.get(code).copied()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, label)| label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, label)| (code.as_str(), label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
