use std::collections::HashMap;

pub mod delete;
pub mod get;
pub mod insert;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    /// Required. A unique ID for this dataset, without the project name.
    /// The ID must contain only letters (a-z, A-Z), numbers (0-9), or underscores (_).
    pub dataset_id: String,
    /// Required. The ID of the project containing this dataset.
    pub project_id: String,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Output only. The resource type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Output only. A hash of the resource.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
    /// Output only. The fully-qualified unique name of the dataset in the format projectId:datasetId.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Output only. A URL that can be used to access the resource again.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub self_link: String,
    /// Required. A reference that identifies the dataset.
    pub dataset_reference: DatasetReference,
    /// Optional. A descriptive name for the dataset.
    pub friendly_name: Option<String>,
    /// Optional. A user-friendly description of the dataset.
    pub description: Option<String>,
    /// The labels associated with this dataset.
    pub labels: Option<HashMap<String, String>>,
    /// The geographic location where the dataset should reside.
    pub location: Option<String>,
    /// Output only. The time when this dataset was created, in milliseconds since the epoch.
    #[serde(default, deserialize_with = "crate::http::from_str_option", skip_serializing)]
    pub creation_time: Option<i64>,
    /// Output only. The date when this dataset was last modified, in milliseconds since the epoch.
    #[serde(default, deserialize_with = "crate::http::from_str_option", skip_serializing)]
    pub last_modified_time: Option<i64>,
}

impl Dataset {
    pub fn new(project_id: &str, dataset_id: &str) -> Self {
        Self {
            dataset_reference: DatasetReference {
                dataset_id: dataset_id.to_string(),
                project_id: project_id.to_string(),
            },
            ..Default::default()
        }
    }
}

#[derive(Clone, PartialEq, Eq, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDatasetRequest {
    /// If true, delete all the tables in the dataset.
    /// If false and the dataset contains tables, the request will fail.
    pub delete_contents: bool,
}

#[cfg(test)]
mod tests {
    use crate::http::dataset::Dataset;

    #[test]
    fn test_serialize_new_dataset() {
        let value = serde_json::to_value(Dataset::new("test-project", "test_dataset")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "datasetReference": {"datasetId": "test_dataset", "projectId": "test-project"},
                "friendlyName": null,
                "description": null,
                "labels": null,
                "location": null,
            })
        );
    }

    #[test]
    fn test_deserialize_dataset() {
        let body = r#"{
            "kind": "bigquery#dataset",
            "id": "test-project:test_dataset",
            "datasetReference": {"datasetId": "test_dataset", "projectId": "test-project"},
            "creationTime": "1690000000000",
            "location": "US"
        }"#;
        let dataset: Dataset = serde_json::from_str(body).unwrap();
        assert_eq!(dataset.id, "test-project:test_dataset");
        assert_eq!(dataset.creation_time, Some(1690000000000));
        assert_eq!(dataset.last_modified_time, None);
        assert_eq!(dataset.location.as_deref(), Some("US"));
    }
}
