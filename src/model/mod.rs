use serde::{Deserialize, Serialize};

/// Snapshot of the tables present after all migrations ran.
///
/// Tables keep the order they were produced in by the introspection provider
/// (name order for the native provider). Renderers never reorder them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    /// Ordinal (declaration) order.
    pub columns: Vec<Column>,
    /// Secondary indexes only; the primary key is carried on the columns.
    pub indexes: Vec<Index>,
}

/// A column as reported by introspection.
///
/// `data_type` is the raw catalog type name (`character varying`,
/// `timestamp with time zone`, ...). `character_length` only matters for the
/// character family and `numeric_precision`/`numeric_scale` only for
/// `numeric`/`decimal`; see [`crate::render::display_type`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub character_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

impl Schema {
    pub fn new() -> Self {
        Schema { tables: Vec::new() }
    }

    pub fn from_tables(tables: Vec<Table>) -> Self {
        Schema { tables }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Hex-encoded SHA-256 of the snapshot's JSON form. Identical snapshots
    /// always produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let json = serde_json::to_string(self).expect("Schema must serialize");
        let hash = Sha256::digest(json.as_bytes());
        hex::encode(hash)
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Primary key column names in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl Column {
    /// A nullable, non-key column with no default and no size modifiers.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default_value: None,
            is_primary_key: false,
            character_length: None,
            numeric_precision: None,
            numeric_scale: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn with_length(mut self, length: i32) -> Self {
        self.character_length = Some(length);
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.numeric_precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: i32) -> Self {
        self.numeric_scale = Some(scale);
        self
    }
}

impl Index {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Index {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            is_unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }
}
