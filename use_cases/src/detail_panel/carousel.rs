use entities::locations::PhotoUrl;

/// Manual cursor over a location's photos. Wraps at both ends and never moves
/// on its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhotoCarousel {
    photos: Vec<PhotoUrl>,
    position: usize,
}

impl PhotoCarousel {
    pub fn new(photos: Vec<PhotoUrl>) -> Self {
        Self {
            photos,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&PhotoUrl> {
        self.photos.get(self.position)
    }

    pub fn photos(&self) -> &[PhotoUrl] {
        &self.photos
    }

    pub fn advance(&mut self) -> Option<&PhotoUrl> {
        if !self.is_empty() {
            self.position = (self.position + 1) % self.len();
        }
        self.current()
    }

    pub fn go_back(&mut self) -> Option<&PhotoUrl> {
        if !self.is_empty() {
            self.position = (self.position + self.len() - 1) % self.len();
        }
        self.current()
    }

    /// Out of range indexes leave the cursor where it is.
    pub fn jump_to(&mut self, index: usize) -> Option<&PhotoUrl> {
        if index < self.len() {
            self.position = index;
        }
        self.current()
    }

    pub fn restart(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::PhotoCarousel;
    use entities::locations::PhotoUrl;

    fn carousel() -> PhotoCarousel {
        PhotoCarousel::new(vec![
            PhotoUrl::from("https://cdn/1.jpg"),
            PhotoUrl::from("https://cdn/2.jpg"),
            PhotoUrl::from("https://cdn/3.jpg"),
        ])
    }

    #[test]
    fn test_navigation_wraps_at_both_ends() {
        let mut carousel = carousel();
        assert_eq!(carousel.go_back(), Some(&PhotoUrl::from("https://cdn/3.jpg")));
        assert_eq!(carousel.advance(), Some(&PhotoUrl::from("https://cdn/1.jpg")));
        carousel.advance();
        carousel.advance();
        assert_eq!(carousel.position(), 2);
        assert_eq!(carousel.advance(), Some(&PhotoUrl::from("https://cdn/1.jpg")));
    }

    #[test]
    fn test_jump_and_restart() {
        let mut carousel = carousel();
        assert_eq!(carousel.jump_to(1), Some(&PhotoUrl::from("https://cdn/2.jpg")));
        assert_eq!(carousel.jump_to(9), Some(&PhotoUrl::from("https://cdn/2.jpg")));
        carousel.restart();
        assert_eq!(carousel.position(), 0);
    }

    #[test]
    fn test_empty_carousel_has_nothing_to_show() {
        let mut carousel = PhotoCarousel::default();
        assert_eq!(carousel.advance(), None);
        assert_eq!(carousel.go_back(), None);
        assert!(carousel.is_empty());
    }
}
