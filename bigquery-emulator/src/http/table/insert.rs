use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::table::Table;

pub fn build(base_url: &str, client: &Client, data: &Table) -> RequestBuilder {
    let reference = &data.table_reference;
    let url = format!(
        "{}/projects/{}/datasets/{}/tables",
        base_url, reference.project_id, reference.dataset_id
    );
    client.post(url).json(data)
}
