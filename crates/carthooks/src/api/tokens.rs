use super::{collection_path, item_path};
use crate::client::Client;
use crate::models::{SubmissionTokenOptions, UpdateTokenOptions};
use crate::response::ApiResponse;
use crate::transport::Request;

impl Client {
    /// Issues a token for submitting a new item through a public form.
    pub async fn get_submission_token(
        &self,
        app_id: u64,
        collection_id: u64,
        options: &SubmissionTokenOptions,
    ) -> ApiResponse {
        let path = format!("{}/submission-token", collection_path(app_id, collection_id));
        self.call_json(Request::post(path), options).await
    }

    /// Issues a token for updating an existing item through a public form.
    pub async fn update_submission_token(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        options: &UpdateTokenOptions,
    ) -> ApiResponse {
        let path = format!("{}/update-token", item_path(app_id, collection_id, item_id));
        self.call_json(Request::post(path), options).await
    }

    /// Issues a file upload token.
    pub async fn get_upload_token(&self) -> ApiResponse {
        self.call(Request::post("/v1/uploads/token")).await
    }
}
