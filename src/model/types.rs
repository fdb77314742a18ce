//! Leaf records shared across the description sections.

use std::fmt;

use serde::Serialize;

/// A person: book author, translator, document author or publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Author {
    #[serde(rename = "first-name")]
    pub first_name: String,
    #[serde(rename = "middle-name", skip_serializing_if = "String::is_empty")]
    pub middle_name: String,
    #[serde(rename = "last-name")]
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    #[serde(rename = "home-page", skip_serializing_if = "Vec::is_empty")]
    pub home_pages: Vec<String>,
    #[serde(rename = "email", skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// Parse a display name: the last word is the last name, everything
    /// before it the first name. A single word becomes the first name.
    pub fn from_display_name(name: &str) -> Self {
        match name.trim().rsplit_once(char::is_whitespace) {
            Some((first, last)) => Self::new(first.trim(), last),
            None => Self::new(name.trim(), ""),
        }
    }

    pub fn with_middle_name(mut self, middle_name: impl Into<String>) -> Self {
        self.middle_name = middle_name.into();
        self
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    pub fn with_home_page(mut self, url: impl Into<String>) -> Self {
        self.home_pages.push(url.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }
}

/// First name, a space, last name.
impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A date with a machine-readable `value` attribute and display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Date {
    #[serde(rename = "@value", skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(rename = "$text")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Genre {
    #[serde(rename = "@match", skip_serializing_if = "Option::is_none")]
    pub match_percent: Option<u32>,
    #[serde(rename = "$text")]
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            match_percent: None,
            name: name.into(),
        }
    }
}

/// A named book series and the book's position in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sequence {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@number", skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

/// `Name #3`, or just the name when the position is unknown.
impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(number) => write!(f, "{} #{}", self.name, number),
            None => f.write_str(&self.name),
        }
    }
}

/// An image reference inside metadata, e.g. a coverpage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineImage {
    #[serde(rename = "@l:href")]
    pub href: String,
    #[serde(rename = "@alt", skip_serializing_if = "String::is_empty")]
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Coverpage {
    pub image: InlineImage,
}

/// A base64-encoded embedded resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Binary {
    #[serde(rename = "@content-type")]
    pub content_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "$text")]
    pub data: String,
}

/// A stylesheet reference, written as an `xml-stylesheet` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub mime_type: String,
    pub href: String,
}

/// Free-form `custom-info` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomInfo {
    #[serde(rename = "@info-type")]
    pub info_type: String,
    #[serde(rename = "$text")]
    pub text: String,
}
