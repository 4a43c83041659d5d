use std::path::PathBuf;

use crate::{ValidationError, Year};

/// Metadata form for adding a text to the corpus, as the user fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestDraft {
    pub author: String,
    pub title: String,
    year: Year,
    pub is_prose: bool,
    pub language: String,
    pub file: Option<PathBuf>,
}

impl IngestDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(&self) -> Year {
        self.year
    }

    /// Year 0 does not exist: entering it steps past zero away from the
    /// previous value (1 becomes -1, anything else becomes 1).
    pub fn set_year(&mut self, raw: i32) {
        self.year = match Year::new(raw) {
            Ok(year) => year,
            Err(_) if self.year.get() == 1 => Year::new(-1).unwrap_or_default(),
            Err(_) => Year::default(),
        };
    }

    /// Every required field is filled in and a file is chosen.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    fn missing_field(&self) -> Option<&'static str> {
        if self.author.trim().is_empty() {
            Some("author")
        } else if self.title.trim().is_empty() {
            Some("title")
        } else if self.language.trim().is_empty() {
            Some("language")
        } else if self.file.is_none() {
            Some("file")
        } else {
            None
        }
    }

    pub fn build(&self) -> Result<IngestRequest, ValidationError> {
        if let Some(field) = self.missing_field() {
            return Err(ValidationError::EmptyField(field));
        }
        let file = self.file.clone().ok_or(ValidationError::EmptyField("file"))?;
        Ok(IngestRequest {
            metadata: IngestMetadata {
                author: self.author.trim().to_string(),
                title: self.title.trim().to_string(),
                year: self.year,
                is_prose: self.is_prose,
                language: self.language.trim().to_string(),
            },
            file,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestMetadata {
    pub author: String,
    pub title: String,
    pub year: Year,
    pub is_prose: bool,
    pub language: String,
}

/// Validated request to upload one text file with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub metadata: IngestMetadata,
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> IngestDraft {
        IngestDraft {
            author: "Statius".to_string(),
            title: "Thebaid".to_string(),
            language: "latin".to_string(),
            file: Some(PathBuf::from("thebaid.tess")),
            ..IngestDraft::default()
        }
    }

    #[test]
    fn complete_draft_requires_non_empty_title() {
        assert!(filled().is_complete());

        let draft = IngestDraft {
            title: String::new(),
            ..filled()
        };
        assert!(!draft.is_complete());
        assert_eq!(draft.build(), Err(ValidationError::EmptyField("title")));
    }

    #[test]
    fn missing_file_blocks_submission() {
        let draft = IngestDraft {
            file: None,
            ..filled()
        };
        assert!(!draft.is_complete());
        assert_eq!(draft.build(), Err(ValidationError::EmptyField("file")));
    }

    #[test]
    fn year_input_skips_zero() {
        let mut draft = filled();
        assert_eq!(draft.year().get(), 1);

        draft.set_year(0);
        assert_eq!(draft.year().get(), -1);

        draft.set_year(0);
        assert_eq!(draft.year().get(), 1);

        draft.set_year(-43);
        assert_eq!(draft.year().get(), -43);
        draft.set_year(0);
        assert_eq!(draft.year().get(), 1);
    }

    #[test]
    fn build_trims_metadata() {
        let draft = IngestDraft {
            author: "  Statius ".to_string(),
            ..filled()
        };
        let request = draft.build().unwrap();
        assert_eq!(request.metadata.author, "Statius");
        assert_eq!(request.file, PathBuf::from("thebaid.tess"));
    }
}
