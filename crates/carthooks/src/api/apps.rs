use super::collection_path;
use crate::client::Client;
use crate::response::ApiResponse;
use crate::transport::Request;

impl Client {
    /// Lists apps visible to the current token.
    pub async fn get_apps(&self) -> ApiResponse {
        self.call(Request::get("/v1/apps")).await
    }

    /// Fetches an app.
    pub async fn get_app(&self, app_id: u64) -> ApiResponse {
        self.call(Request::get(format!("/v1/apps/{app_id}"))).await
    }

    /// Lists collections of an app.
    pub async fn get_collections(&self, app_id: u64) -> ApiResponse {
        self.call(Request::get(format!("/v1/apps/{app_id}/collections")))
            .await
    }

    /// Fetches a collection.
    pub async fn get_collection(&self, app_id: u64, collection_id: u64) -> ApiResponse {
        self.call(Request::get(collection_path(app_id, collection_id)))
            .await
    }
}
