use crate::client::Client;
use crate::models::{
    CreateConnectionLogRequest, CreateConnectionRequest, CreateConnectionUsageRequest,
    UpdateConnectionRequest,
};
use crate::response::ApiResponse;
use crate::transport::Request;

fn connection_path(app_id: u64, connection_id: u64) -> String {
    format!("/v1/apps/{app_id}/connections/{connection_id}")
}

impl Client {
    /// Creates a hooklet connection.
    pub async fn create_connection(
        &self,
        app_id: u64,
        request: &CreateConnectionRequest,
    ) -> ApiResponse {
        let path = format!("/v1/apps/{app_id}/connections");
        self.call_json(Request::post(path), request).await
    }

    /// Updates a connection.
    pub async fn update_connection(
        &self,
        app_id: u64,
        connection_id: u64,
        request: &UpdateConnectionRequest,
    ) -> ApiResponse {
        self.call_json(Request::put(connection_path(app_id, connection_id)), request)
            .await
    }

    /// Fetches a connection.
    pub async fn get_connection(&self, app_id: u64, connection_id: u64) -> ApiResponse {
        self.call(Request::get(connection_path(app_id, connection_id)))
            .await
    }

    /// Deletes a connection.
    pub async fn delete_connection(&self, app_id: u64, connection_id: u64) -> ApiResponse {
        self.call(Request::delete(connection_path(app_id, connection_id)))
            .await
    }

    /// Appends a log entry to a connection.
    pub async fn create_connection_log(
        &self,
        app_id: u64,
        connection_id: u64,
        request: &CreateConnectionLogRequest,
    ) -> ApiResponse {
        let path = format!("{}/logs", connection_path(app_id, connection_id));
        self.call_json(Request::post(path), request).await
    }

    /// Reports usage of a connection.
    pub async fn create_connection_usage(
        &self,
        app_id: u64,
        connection_id: u64,
        request: &CreateConnectionUsageRequest,
    ) -> ApiResponse {
        let path = format!("{}/usage", connection_path(app_id, connection_id));
        self.call_json(Request::post(path), request).await
    }
}
