//! Per-object-type attribute descriptors.

use serde::{Deserialize, Serialize};

/// Value type of an attribute, as declared by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    Text,
    Integer,
    Boolean,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Timestamp, RFC 3339 or `YYYY-MM-DD HH:MM:SS`.
    DateTime,
    /// One of `select_options`.
    Select,
    /// One of `status_values`.
    Status,
    /// Key of another object (`ABC-123`) or its numeric ID.
    Reference,
    /// Anything the inventory reports that we don't model.
    #[serde(untagged)]
    Other(String),
}

impl DataType {
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Text => "text",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::DateTime => "date_time",
            DataType::Select => "select",
            DataType::Status => "status",
            DataType::Reference => "reference",
            DataType::Other(name) => name,
        }
    }
}

/// Field descriptor for one attribute of an object type.
///
/// Owned by the inventory and fetched fresh for every validation or
/// completion; never disk-cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_editable")]
    pub editable: bool,
    /// Managed by the inventory itself (created, updated, key, ...).
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub select_options: Vec<String>,
    #[serde(default)]
    pub status_values: Vec<String>,
}

fn default_editable() -> bool {
    true
}

impl AttributeMetadata {
    /// An optional, editable text attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            editable: true,
            system: false,
            data_type: DataType::Text,
            select_options: Vec::new(),
            status_values: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn system(mut self) -> Self {
        self.system = true;
        self.editable = false;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Make this a select attribute with the given options.
    pub fn select<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_type = DataType::Select;
        self.select_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Make this a status attribute with the given values.
    pub fn status<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_type = DataType::Status;
        self.status_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Enumerated values a caller may choose from, if any.
    pub fn options(&self) -> &[String] {
        if !self.select_options.is_empty() {
            &self.select_options
        } else {
            &self.status_values
        }
    }
}

/// Find an attribute by case-insensitive name.
pub fn find_attribute<'a>(attributes: &'a [AttributeMetadata], name: &str) -> Option<&'a AttributeMetadata> {
    attributes.iter().find(|a| a.is_named(name))
}
