use std::str::FromStr;

use crate::error::XmlReadError;

/// One element with its text and children, built while a record is open.
#[derive(Debug, Clone, Default)]
pub(super) struct Node {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            ..Default::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of child `name`, empty when absent.
    pub fn text_of(&self, name: &str) -> &str {
        self.child(name).map(|c| c.text.trim()).unwrap_or("")
    }

    /// Non-empty text of child `name`.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let text = self.text_of(name);
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Number in child `name`; absent or empty reads as the default.
    pub fn number<T: FromStr + Default>(&self, name: &str) -> Result<T, XmlReadError> {
        let text = self.text_of(name);
        if text.is_empty() {
            return Ok(T::default());
        }
        text.parse().map_err(|_| XmlReadError::Content {
            element: name.to_string(),
            value: text.to_string(),
        })
    }

    pub fn boolean(&self, name: &str) -> Result<bool, XmlReadError> {
        match self.text_of(name) {
            "" | "false" => Ok(false),
            "true" => Ok(true),
            other => Err(XmlReadError::Content {
                element: name.to_string(),
                value: other.to_string(),
            }),
        }
    }
}
