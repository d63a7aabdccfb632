use super::upload::PhotoFile;
use super::FormError;
use chrono::NaiveDate;
use entities::locations::{Category, Location, PhotoUrl};

/// The user's input while the form is open.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocationDraft {
    pub name: String,
    pub category: Category,
    pub visited_date: Option<NaiveDate>,
    pub notes: String,
    pub album_link: String,
    existing_photos: Vec<PhotoUrl>,
    new_photos: Vec<PhotoFile>,
}

impl LocationDraft {
    pub fn named(name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn from_location(location: &Location) -> Self {
        Self {
            name: location.name.inner(),
            category: location.category,
            visited_date: location.visited_date,
            notes: location.notes.clone().unwrap_or_default(),
            album_link: location.album_link.clone().unwrap_or_default(),
            existing_photos: location.photo_urls.clone(),
            new_photos: vec![],
        }
    }

    pub fn set_category(&mut self, tag: &str) -> Result<(), FormError> {
        self.category = tag
            .parse()
            .map_err(|err: entities::locations::UnknownCategory| {
                FormError::Validation(err.to_string())
            })?;
        Ok(())
    }

    pub fn attach_photos(&mut self, photos: impl IntoIterator<Item = PhotoFile>) {
        self.new_photos.extend(photos);
    }

    pub fn remove_new_photo(&mut self, index: usize) -> Option<PhotoFile> {
        (index < self.new_photos.len()).then(|| self.new_photos.remove(index))
    }

    pub fn remove_existing_photo(&mut self, index: usize) -> Option<PhotoUrl> {
        (index < self.existing_photos.len()).then(|| self.existing_photos.remove(index))
    }

    pub fn existing_photos(&self) -> &[PhotoUrl] {
        &self.existing_photos
    }

    pub fn new_photos(&self) -> &[PhotoFile] {
        &self.new_photos
    }
}

/// Blank optional text is stored as absent.
/// Kept exactly as typed. Only an empty field is absent.
pub(super) fn optional_text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}
