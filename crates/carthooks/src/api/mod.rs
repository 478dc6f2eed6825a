//! Resource endpoints.
//!
//! Every method performs one protected call and reports its outcome as an
//! [`ApiResponse`](crate::ApiResponse); none of them return `Err`.

mod apps;
mod connections;
mod items;
mod tokens;
mod users;
mod watch;

fn collection_path(app_id: u64, collection_id: u64) -> String {
    format!("/v1/apps/{app_id}/collections/{collection_id}")
}

fn item_path(app_id: u64, collection_id: u64, item_id: u64) -> String {
    format!("{}/items/{item_id}", collection_path(app_id, collection_id))
}
