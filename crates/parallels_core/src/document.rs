use std::fmt;

use crate::ValidationError;

/// Opaque identifier assigned to a text by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication year. Negative values are BCE, positive values CE; there is no year 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Year(i32);

impl Year {
    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::YearZero);
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn is_bce(self) -> bool {
        self.0 < 0
    }
}

impl Default for Year {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let era = if self.is_bce() { "BCE" } else { "CE" };
        write!(f, "{} {era}", self.0.unsigned_abs())
    }
}

/// A text available in the remote corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    author: String,
    title: String,
    year: Year,
    is_prose: bool,
    language: String,
}

impl Document {
    pub fn new(
        id: DocumentId,
        author: impl Into<String>,
        title: impl Into<String>,
        year: Year,
        is_prose: bool,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            title: title.into(),
            year,
            is_prose,
            language: language.into(),
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn is_prose(&self) -> bool {
        self.is_prose
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn genre_label(&self) -> &'static str {
        if self.is_prose {
            "Prose"
        } else {
            "Poetry"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_zero_is_rejected() {
        assert_eq!(Year::new(0), Err(ValidationError::YearZero));
    }

    #[test]
    fn bce_years_order_before_ce_years() {
        let bce = Year::new(-200).unwrap();
        let ce = Year::new(1).unwrap();
        assert!(bce < ce);
    }

    #[test]
    fn year_display_uses_era_suffix() {
        assert_eq!(Year::new(-200).unwrap().to_string(), "200 BCE");
        assert_eq!(Year::new(14).unwrap().to_string(), "14 CE");
    }

    #[test]
    fn blank_document_id_is_rejected() {
        assert_eq!(DocumentId::new("  "), Err(ValidationError::EmptyField("id")));
    }
}
