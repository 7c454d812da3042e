use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(ArtistId, String);
id_newtype!(GameId, Uuid);

impl ArtistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GameId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A catalog artist as the game sees it.
///
/// Providers only hand out artists with a usable image; `image_url` is the
/// largest image the catalog offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub image_url: String,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: ArtistId::new(id),
            name: name.into(),
            image_url: image_url.into(),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_id_serializes_as_plain_string() {
        let artist = Artist::new("4Z8W4fKeB5YxbusRsdQVPb", "Radiohead", "https://i.scdn.co/a.jpg");
        let json = serde_json::to_value(&artist).expect("json");
        assert_eq!(json["id"], "4Z8W4fKeB5YxbusRsdQVPb");
        assert_eq!(json["image_url"], "https://i.scdn.co/a.jpg");
    }

    #[test]
    fn blank_image_url_is_not_an_image() {
        assert!(!Artist::new("x", "X", "   ").has_image());
        assert!(Artist::new("x", "X", "img.png").has_image());
    }
}
