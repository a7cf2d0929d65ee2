//! Storefront typography.
//!
//! Each tenant picks one of a fixed set of Google fonts for their storefront.
//! The set is closed on purpose: the storefront frontend preloads stylesheets
//! and we do not want merchants pasting arbitrary font URLs.

use serde::{Deserialize, Serialize};

/// Fonts a merchant can select for their storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StoreFont {
    #[default]
    Roboto,
    #[serde(rename = "Open Sans")]
    OpenSans,
    Montserrat,
    Lato,
    Poppins,
}

impl StoreFont {
    /// All selectable fonts, in display order.
    pub const ALL: [Self; 5] = [
        Self::Roboto,
        Self::OpenSans,
        Self::Montserrat,
        Self::Lato,
        Self::Poppins,
    ];

    /// The display name merchants see (and the value stored in the database).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Roboto => "Roboto",
            Self::OpenSans => "Open Sans",
            Self::Montserrat => "Montserrat",
            Self::Lato => "Lato",
            Self::Poppins => "Poppins",
        }
    }

    /// CSS `font-family` value.
    #[must_use]
    pub const fn family(self) -> &'static str {
        match self {
            Self::Roboto => "Roboto, sans-serif",
            Self::OpenSans => "Open Sans, sans-serif",
            Self::Montserrat => "Montserrat, sans-serif",
            Self::Lato => "Lato, sans-serif",
            Self::Poppins => "Poppins, sans-serif",
        }
    }

    /// Google Fonts stylesheet URL (weights 400 and 700).
    #[must_use]
    pub const fn stylesheet_url(self) -> &'static str {
        match self {
            Self::Roboto => {
                "https://fonts.googleapis.com/css2?family=Roboto:wght@400;700&display=swap"
            }
            Self::OpenSans => {
                "https://fonts.googleapis.com/css2?family=Open+Sans:wght@400;700&display=swap"
            }
            Self::Montserrat => {
                "https://fonts.googleapis.com/css2?family=Montserrat:wght@400;700&display=swap"
            }
            Self::Lato => {
                "https://fonts.googleapis.com/css2?family=Lato:wght@400;700&display=swap"
            }
            Self::Poppins => {
                "https://fonts.googleapis.com/css2?family=Poppins:wght@400;700&display=swap"
            }
        }
    }

    /// Look up a font by its display name, falling back to `None` for
    /// anything outside the catalog.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_roboto() {
        assert_eq!(StoreFont::default(), StoreFont::Roboto);
    }

    #[test]
    fn test_from_name_roundtrip() {
        for font in StoreFont::ALL {
            assert_eq!(StoreFont::from_name(font.name()), Some(font));
        }
        assert_eq!(StoreFont::from_name("Comic Sans"), None);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&StoreFont::OpenSans).expect("serialize");
        assert_eq!(json, "\"Open Sans\"");
    }

    #[test]
    fn test_stylesheet_urls_are_google_fonts() {
        for font in StoreFont::ALL {
            assert!(font.stylesheet_url().starts_with("https://fonts.googleapis.com/"));
        }
    }
}
