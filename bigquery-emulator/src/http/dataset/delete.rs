use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::dataset::DeleteDatasetRequest;

pub fn build(
    base_url: &str,
    client: &Client,
    project_id: &str,
    dataset_id: &str,
    data: &DeleteDatasetRequest,
) -> RequestBuilder {
    let url = format!("{}/projects/{}/datasets/{}", base_url, project_id, dataset_id);
    client.delete(url).query(data)
}
