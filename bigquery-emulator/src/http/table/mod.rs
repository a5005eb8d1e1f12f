use std::collections::HashMap;

pub mod get;
pub mod insert;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    /// Required. The ID of the project containing this table.
    pub project_id: String,
    /// Required. The ID of the dataset containing this table.
    pub dataset_id: String,
    /// Required. The ID of the table.
    pub table_id: String,
}

impl TableReference {
    /// Standard SQL path of the table, `project.dataset.table` quoted with backticks.
    pub fn sql_path(&self) -> String {
        format!("`{}.{}.{}`", self.project_id, self.dataset_id, self.table_id)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableFieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

#[derive(Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableFieldType {
    #[default]
    String,
    Bytes,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Record,
    Date,
    Time,
    Datetime,
    Numeric,
    Bignumeric,
    Json,
    // aliases
    Int64,
    Float64,
    Bool,
    Struct,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldSchema {
    /// Required. The field name.
    pub name: String,
    /// Required. The field data type.
    /// Use of RECORD/STRUCT indicates that the field contains a nested schema.
    #[serde(rename(serialize = "type", deserialize = "type"))]
    pub data_type: TableFieldType,
    /// Optional. The field mode. The default value is NULLABLE.
    pub mode: Option<TableFieldMode>,
    /// Optional. Describes the nested schema fields if the type property is set to RECORD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<TableFieldSchema>>,
    /// Optional. The field description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TableFieldSchema {
    pub fn nullable(name: &str, data_type: TableFieldType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            mode: Some(TableFieldMode::Nullable),
            ..Default::default()
        }
    }

    /// A nullable RECORD field holding the given sub fields.
    pub fn record(name: &str, fields: Vec<TableFieldSchema>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::nullable(name, TableFieldType::Record)
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.data_type, TableFieldType::Record | TableFieldType::Struct)
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Describes the fields in a table.
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

impl TableSchema {
    /// Finds a field by its dotted path, e.g. `labels.event_id`.
    pub fn field(&self, path: &str) -> Option<&TableFieldSchema> {
        let mut fields = &self.fields;
        let mut found = None;
        for name in path.split('.') {
            let field = fields.iter().find(|f| f.name == name)?;
            found = Some(field);
            fields = match &field.fields {
                Some(children) => children,
                None => &EMPTY,
            };
        }
        found
    }
}

static EMPTY: Vec<TableFieldSchema> = Vec::new();

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Output only. The resource type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Output only. A hash of the resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
    /// Output only. An opaque ID uniquely identifying the table.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Output only. A URL that can be used to access this resource again.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub self_link: String,
    /// Required. Reference describing the ID of this table.
    pub table_reference: TableReference,
    /// Optional. A descriptive name for this table.
    pub friendly_name: Option<String>,
    /// Optional. A user-friendly description of this table.
    pub description: Option<String>,
    /// The labels associated with this table.
    pub labels: Option<HashMap<String, String>>,
    /// Optional. Describes the schema of this table.
    pub schema: Option<TableSchema>,
    /// Output only. The number of rows of data in this table, excluding any data in the streaming buffer.
    #[serde(default, deserialize_with = "crate::http::from_str_option", skip_serializing)]
    pub num_rows: Option<u64>,
    /// Output only. The time when this table was created, in milliseconds since the epoch.
    #[serde(default, deserialize_with = "crate::http::from_str_option", skip_serializing)]
    pub creation_time: Option<i64>,
    /// Output only. The geographic location where the table resides.
    #[serde(default, skip_serializing)]
    pub location: Option<String>,
}

impl Table {
    pub fn new(table_reference: TableReference, schema: TableSchema) -> Self {
        Self {
            table_reference,
            schema: Some(schema),
            ..Default::default()
        }
    }
}
