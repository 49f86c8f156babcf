use {super::field::Field, std::collections::HashMap};

/// One raw form value, as decoded by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Upload { filename: String, bytes: Vec<u8> },
}

impl RawValue {
    /// Text view of the value. Uploads in a text slot are read as lossy UTF-8.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Upload { bytes, .. } => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Untyped donation form as received. Unknown keys are kept but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    values: HashMap<String, RawValue>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), RawValue::Text(value.into()));
    }

    pub fn insert_upload(
        &mut self,
        key: impl Into<String>,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) {
        self.values.insert(
            key.into(),
            RawValue::Upload {
                filename: filename.into(),
                bytes,
            },
        );
    }

    pub fn get(&self, field: Field) -> Option<&RawValue> {
        self.values.get(field.as_str())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(field.as_str())
    }
}
