use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// AttributeTypeDefCategory
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum AttributeTypeDefCategory {
    Primitive,
    Collection,
    Enum,
}

///
/// EnumElement
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumElement {
    pub ordinal: i32,
    pub symbolic_name: String,
}

///
/// AttributeTypeDef
///
/// Type of a single attribute value. Only enum definitions carry elements.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AttributeTypeDef {
    pub guid: String,
    pub name: String,
    pub category: AttributeTypeDefCategory,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<EnumElement>,
}

impl AttributeTypeDef {
    #[must_use]
    pub fn new(
        guid: impl Into<String>,
        name: impl Into<String>,
        category: AttributeTypeDefCategory,
    ) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            category,
            elements: Vec::new(),
        }
    }

    /// Enum elements, numbered in the order given.
    #[must_use]
    pub fn with_elements(mut self, symbolic_names: &[&str]) -> Self {
        self.elements = (0..)
            .zip(symbolic_names)
            .map(|(ordinal, name)| EnumElement {
                ordinal,
                symbolic_name: (*name).to_string(),
            })
            .collect();
        self
    }

    #[must_use]
    pub fn element(&self, symbolic_name: &str) -> Option<&EnumElement> {
        self.elements.iter().find(|e| e.symbolic_name == symbolic_name)
    }
}
