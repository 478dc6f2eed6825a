use crate::client::Client;
use crate::models::WatchDataOptions;
use crate::response::ApiResponse;
use crate::transport::Request;

impl Client {
    /// Registers an endpoint to be notified of changes in a collection.
    pub async fn start_watch_data(&self, options: &WatchDataOptions) -> ApiResponse {
        self.call_json(Request::post("/v1/watch-data"), options)
            .await
    }
}
