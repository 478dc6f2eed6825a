use serde_json::{Map, Value, json};

use super::{collection_path, item_path};
use crate::client::Client;
use crate::models::{LockOptions, QueryOptions};
use crate::response::ApiResponse;
use crate::transport::Request;

impl Client {
    /// Lists items of a collection.
    ///
    /// `limit` and `start` are sent as `pagination[limit]` and
    /// `pagination[start]`; `options` are appended as extra query parameters.
    pub async fn get_items(
        &self,
        app_id: u64,
        collection_id: u64,
        limit: u32,
        start: u32,
        options: &[(&str, &str)],
    ) -> ApiResponse {
        let request = Request::get(format!("{}/items", collection_path(app_id, collection_id)))
            .query("pagination[start]", start.to_string())
            .query("pagination[limit]", limit.to_string())
            .queries(options.iter().copied());
        self.call(request).await
    }

    /// Fetches one item, optionally restricted to `fields`.
    pub async fn get_item_by_id(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        fields: &[&str],
    ) -> ApiResponse {
        let mut request = Request::get(item_path(app_id, collection_id, item_id));
        if !fields.is_empty() {
            request = request.query("fields", fields.join(","));
        }
        self.call(request).await
    }

    /// Queries items with filters, sorting and pagination.
    pub async fn query_items(
        &self,
        app_id: u64,
        collection_id: u64,
        options: &QueryOptions,
    ) -> ApiResponse {
        let path = format!("{}/items/query", collection_path(app_id, collection_id));
        self.call_json(Request::post(path), options).await
    }

    /// Creates an item from field values.
    pub async fn create_item(
        &self,
        app_id: u64,
        collection_id: u64,
        data: &Map<String, Value>,
    ) -> ApiResponse {
        let path = format!("{}/items", collection_path(app_id, collection_id));
        self.call_json(Request::post(path), &json!({ "data": data }))
            .await
    }

    /// Updates field values of an item.
    pub async fn update_item(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        data: &Map<String, Value>,
    ) -> ApiResponse {
        let request = Request::put(item_path(app_id, collection_id, item_id));
        self.call_json(request, &json!({ "data": data })).await
    }

    /// Deletes an item.
    pub async fn delete_item(&self, app_id: u64, collection_id: u64, item_id: u64) -> ApiResponse {
        self.call(Request::delete(item_path(app_id, collection_id, item_id)))
            .await
    }

    /// Locks an item against concurrent modification.
    pub async fn lock_item(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        options: &LockOptions,
    ) -> ApiResponse {
        let path = format!("{}/lock", item_path(app_id, collection_id, item_id));
        self.call_json(Request::post(path), options).await
    }

    /// Releases a lock. An empty `lock_id` sends an empty body.
    pub async fn unlock_item(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        lock_id: &str,
    ) -> ApiResponse {
        let path = format!("{}/unlock", item_path(app_id, collection_id, item_id));
        let mut body = Map::new();
        if !lock_id.is_empty() {
            body.insert("lockId".to_string(), Value::from(lock_id));
        }
        self.call_json(Request::post(path), &body).await
    }

    /// Adds a row to a subform field of an item.
    pub async fn create_sub_item(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        field_id: u64,
        data: &Map<String, Value>,
    ) -> ApiResponse {
        let path = subform_path(app_id, collection_id, item_id, field_id);
        self.call_json(Request::post(path), &json!({ "data": data }))
            .await
    }

    /// Updates a subform row.
    pub async fn update_sub_item(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        field_id: u64,
        sub_item_id: u64,
        data: &Map<String, Value>,
    ) -> ApiResponse {
        let path = format!(
            "{}/items/{sub_item_id}",
            subform_path(app_id, collection_id, item_id, field_id)
        );
        self.call_json(Request::put(path), &json!({ "data": data }))
            .await
    }

    /// Deletes a subform row.
    pub async fn delete_sub_item(
        &self,
        app_id: u64,
        collection_id: u64,
        item_id: u64,
        field_id: u64,
        sub_item_id: u64,
    ) -> ApiResponse {
        let path = format!(
            "{}/items/{sub_item_id}",
            subform_path(app_id, collection_id, item_id, field_id)
        );
        self.call(Request::delete(path)).await
    }
}

fn subform_path(app_id: u64, collection_id: u64, item_id: u64, field_id: u64) -> String {
    format!("{}/subform/{field_id}", item_path(app_id, collection_id, item_id))
}
