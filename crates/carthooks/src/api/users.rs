use crate::client::Client;
use crate::models::AuthorizeCodeRequest;
use crate::response::ApiResponse;
use crate::transport::Request;

impl Client {
    /// Returns the user and tenant the current token acts for.
    ///
    /// Decode the payload with
    /// [`extract_as::<UserInfo>`](crate::ApiResponse::extract_as).
    pub async fn get_current_user(&self) -> ApiResponse {
        self.call(Request::get("/v1/me")).await
    }

    /// Requests an authorization code for another client on behalf of the
    /// current user.
    pub async fn get_oauth_authorize_code(&self, request: &AuthorizeCodeRequest) -> ApiResponse {
        self.call_json(Request::post("/oauth/get-authorize-code"), request)
            .await
    }

    /// Fetches a user by id.
    pub async fn get_user(&self, user_id: u64) -> ApiResponse {
        self.call(Request::get(format!("/v1/users/{user_id}"))).await
    }

    /// Resolves the user owning a user token.
    pub async fn get_user_by_token(&self, token: &str) -> ApiResponse {
        self.call(Request::get(format!("/v1/user-token/{token}")))
            .await
    }
}
