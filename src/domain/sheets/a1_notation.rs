use std::fmt::Formatter;

/// Covers every row of columns A through ZZZ.
pub const WHOLE_SHEET_RANGE: &str = "A1:ZZZ";

/// An A1-style range such as `Sheet1!B2:D10`.
///
/// The text is handed to the Sheets API as-is; malformed ranges are reported
/// by the service, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(String);

impl A1Notation {
    pub fn whole_sheet() -> Self {
        A1Notation(WHOLE_SHEET_RANGE.to_string())
    }
}

impl Default for A1Notation {
    fn default() -> Self {
        A1Notation::whole_sheet()
    }
}

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for A1Notation {
    fn from(s: String) -> Self {
        A1Notation(s)
    }
}

impl From<&str> for A1Notation {
    fn from(s: &str) -> Self {
        A1Notation(s.to_string())
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
