use std::fmt;

use shared::domain::{DisasterType, Location};

#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Unsaved report-form state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub disaster_type: Option<DisasterType>,
    pub description: String,
    pub image: Option<ImageUpload>,
    pub location: Option<Location>,
}

impl Draft {
    pub fn is_complete(&self) -> bool {
        self.disaster_type
            .as_ref()
            .is_some_and(|kind| !kind.as_str().trim().is_empty())
            && !self.description.trim().is_empty()
            && self.image.as_ref().is_some_and(|image| !image.bytes.is_empty())
            && self.location.is_some()
    }

    /// A draft with every field present becomes a submittable report.
    pub fn to_new_report(&self) -> Option<NewReport> {
        if !self.is_complete() {
            return None;
        }
        Some(NewReport {
            disaster_type: self.disaster_type.clone()?,
            description: self.description.clone(),
            image: self.image.clone()?,
            location: self.location?,
        })
    }

    /// Empties the user-entered fields; the session location stays attached.
    pub fn clear(&mut self) {
        let location = self.location;
        *self = Self {
            location,
            ..Self::default()
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub disaster_type: DisasterType,
    pub description: String,
    pub image: ImageUpload,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Draft {
        Draft {
            disaster_type: Some(DisasterType::new("flood")),
            description: "Street flooding".into(),
            image: Some(ImageUpload {
                filename: "street.jpg".into(),
                mime_type: Some("image/jpeg".into()),
                bytes: vec![0xff, 0xd8],
            }),
            location: Location::new(40.0, -75.0),
        }
    }

    #[test]
    fn every_field_is_required() {
        assert!(complete().is_complete());

        let mut missing_type = complete();
        missing_type.disaster_type = None;
        assert!(missing_type.to_new_report().is_none());

        let mut blank_description = complete();
        blank_description.description = "   ".into();
        assert!(!blank_description.is_complete());

        let mut empty_image = complete();
        empty_image.image.as_mut().expect("image").bytes.clear();
        assert!(!empty_image.is_complete());

        let mut no_location = complete();
        no_location.location = None;
        assert!(!no_location.is_complete());
    }

    #[test]
    fn clear_keeps_location() {
        let mut draft = complete();
        draft.clear();
        assert_eq!(draft.location, Location::new(40.0, -75.0));
        assert!(draft.disaster_type.is_none());
        assert!(draft.description.is_empty());
        assert!(draft.image.is_none());
    }
}
