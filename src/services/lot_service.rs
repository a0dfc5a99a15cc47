//! Typed wrappers around the lot methods of the inventory model

use crate::models::{
    HoldRequest, HoldResponse, LotHistory, LotNotes, LotPhotos, Partner, PhotoUploadRequest,
    SaveResponse,
};
use crate::rpc::{reject_error_payload, OrmService, RpcError};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub struct LotService<S> {
    orm: Arc<S>,
    model: String,
}

impl<S: OrmService> LotService<S> {
    pub fn new(orm: Arc<S>, model: impl Into<String>) -> Self {
        Self {
            orm,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Photos attached to the lot of a quant
    pub async fn get_lot_photos(&self, quant_id: i64) -> Result<LotPhotos, RpcError> {
        let value = self
            .call("get_lot_photos", kwargs(json!({ "quant_id": quant_id })))
            .await?;
        let photos: LotPhotos = decode(reject_error_payload(value)?)?;
        log::debug!(
            "Loaded {} photos for lot {}",
            photos.photos.len(),
            photos.lot_name
        );
        Ok(photos)
    }

    pub async fn save_lot_photo(
        &self,
        request: &PhotoUploadRequest,
    ) -> Result<SaveResponse, RpcError> {
        let value = self
            .call("save_lot_photo", kwargs(serde_json::to_value(request)?))
            .await?;
        decode(value)
    }

    pub async fn get_lot_notes(&self, quant_id: i64) -> Result<LotNotes, RpcError> {
        let value = self
            .call("get_lot_notes", kwargs(json!({ "quant_id": quant_id })))
            .await?;
        decode(reject_error_payload(value)?)
    }

    pub async fn save_lot_notes(&self, quant_id: i64, notes: &str) -> Result<SaveResponse, RpcError> {
        let value = self
            .call(
                "save_lot_notes",
                kwargs(json!({ "quant_id": quant_id, "notes": notes })),
            )
            .await?;
        decode(value)
    }

    pub async fn get_lot_history(&self, quant_id: i64) -> Result<LotHistory, RpcError> {
        let value = self
            .call("get_lot_history", kwargs(json!({ "quant_id": quant_id })))
            .await?;
        decode(reject_error_payload(value)?)
    }

    /// Customers matching `name`, for the hold dialog
    pub async fn search_partners(&self, name: &str) -> Result<Vec<Partner>, RpcError> {
        let value = self
            .call("search_partners", kwargs(json!({ "name": name })))
            .await?;
        decode(reject_error_payload(value)?)
    }

    pub async fn create_lot_hold(&self, request: &HoldRequest) -> Result<HoldResponse, RpcError> {
        let value = self
            .call("create_lot_hold", kwargs(serde_json::to_value(request)?))
            .await?;
        let response: HoldResponse = decode(value)?;
        if let Some(hold_id) = response.hold_id {
            log::info!("Hold {} created on quant {}", hold_id, request.quant_id);
        }
        Ok(response)
    }

    async fn call(&self, method: &str, kwargs: Map<String, Value>) -> Result<Value, RpcError> {
        self.orm.call(&self.model, method, Vec::new(), kwargs).await
    }
}

pub(super) fn kwargs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(super) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::JsonError(format!("Unexpected result: {}", e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records calls and answers each method with a canned value
    #[derive(Default)]
    pub(crate) struct MockOrm {
        pub calls: Mutex<Vec<(String, String, Map<String, Value>)>>,
        pub responses: Mutex<Vec<(String, Result<Value, RpcError>)>>,
    }

    impl MockOrm {
        pub fn respond(&self, method: &str, result: Result<Value, RpcError>) {
            self.responses
                .lock()
                .unwrap()
                .push((method.to_string(), result));
        }

        pub fn call_count(&self, method: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, m, _)| m == method)
                .count()
        }

        pub fn last_kwargs(&self) -> Option<Map<String, Value>> {
            self.calls.lock().unwrap().last().map(|(_, _, k)| k.clone())
        }
    }

    impl OrmService for MockOrm {
        async fn call(
            &self,
            model: &str,
            method: &str,
            _args: Vec<Value>,
            kwargs: Map<String, Value>,
        ) -> Result<Value, RpcError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), method.to_string(), kwargs));
            // Yield so concurrent callers can interleave
            tokio::task::yield_now().await;
            let responses = self.responses.lock().unwrap();
            responses
                .iter()
                .rev()
                .find(|(m, _)| m == method)
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| Err(RpcError::NetworkError(format!("no response for {}", method))))
        }
    }

    fn service(orm: &Arc<MockOrm>) -> LotService<MockOrm> {
        LotService::new(Arc::clone(orm), "stock.quant")
    }

    #[tokio::test]
    async fn test_get_lot_photos() {
        let orm = Arc::new(MockOrm::default());
        orm.respond(
            "get_lot_photos",
            Ok(json!({
                "lot_name": "LOT-1",
                "product_name": "Granite",
                "photos": [{"id": 3, "name": "A", "image": "iVBORw0", "fecha_captura": "", "notas": ""}]
            })),
        );

        let photos = service(&orm).get_lot_photos(7).await.unwrap();
        assert_eq!(photos.lot_name, "LOT-1");
        assert_eq!(photos.photos[0].id, 3);

        let calls = orm.calls.lock().unwrap();
        assert_eq!(calls[0].0, "stock.quant");
        assert_eq!(calls[0].2["quant_id"], 7);
    }

    #[tokio::test]
    async fn test_error_payload_becomes_remote_error() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("get_lot_notes", Ok(json!({"error": "Lot not found"})));

        let err = service(&orm).get_lot_notes(1).await.unwrap_err();
        assert_eq!(err, RpcError::Remote("Lot not found".to_string()));
    }

    #[tokio::test]
    async fn test_save_lot_photo_sends_keyword_args() {
        let orm = Arc::new(MockOrm::default());
        orm.respond(
            "save_lot_photo",
            Ok(json!({"success": true, "message": "Photo \"A.jpg\" saved"})),
        );
        let request = PhotoUploadRequest {
            quant_id: 9,
            photo_name: "A.jpg".into(),
            photo_data: "QUJD".into(),
            sequence: 10,
            note: String::new(),
        };

        let response = service(&orm).save_lot_photo(&request).await.unwrap();
        assert!(response.success);

        let kwargs = orm.last_kwargs().unwrap();
        let mut keys: Vec<&str> = kwargs.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["notas", "photo_data", "photo_name", "quant_id", "sequence"]);
    }

    #[tokio::test]
    async fn test_save_lot_notes() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_notes", Ok(json!({"success": false, "error": "Denied"})));

        let response = service(&orm).save_lot_notes(4, "cracked corner").await.unwrap();
        assert_eq!(response.error_message(), Some("Denied"));
        assert_eq!(orm.last_kwargs().unwrap()["notes"], "cracked corner");
    }

    #[tokio::test]
    async fn test_get_lot_history() {
        let orm = Arc::new(MockOrm::default());
        orm.respond(
            "get_lot_history",
            Ok(json!({
                "general_info": {"lot_name": "L-1", "product_name": "Calacatta"},
                "statistics": {"total_movimientos": 2},
                "movements": [{"tipo": "Entrada"}, {"tipo": "Salida"}],
                "has_purchase_permissions": true
            })),
        );

        let history = service(&orm).get_lot_history(5).await.unwrap();
        assert_eq!(history.general_info.lot_name, "L-1");
        assert_eq!(history.movements.len(), 2);
        assert_eq!(orm.last_kwargs().unwrap()["quant_id"], 5);

        orm.respond("get_lot_history", Ok(json!({"error": "Quant not found"})));
        let err = service(&orm).get_lot_history(5).await.unwrap_err();
        assert_eq!(err.server_message(), Some("Quant not found"));
    }

    #[tokio::test]
    async fn test_search_partners() {
        let orm = Arc::new(MockOrm::default());
        orm.respond(
            "search_partners",
            Ok(json!([
                {"id": 7, "name": "ACME", "display_name": "ACME, Inc.", "vat": false, "ref": false, "email": false}
            ])),
        );

        let partners = service(&orm).search_partners("acm").await.unwrap();
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].label(), "ACME, Inc.");
        assert_eq!(orm.last_kwargs().unwrap()["name"], "acm");
    }

    #[tokio::test]
    async fn test_create_lot_hold_sends_keyword_args() {
        let orm = Arc::new(MockOrm::default());
        orm.respond(
            "create_lot_hold",
            Ok(json!({"success": true, "message": "Hold created", "hold_id": 3})),
        );
        let request = HoldRequest {
            quant_id: 11,
            partner_id: 7,
            notes: "Kitchen".into(),
        };

        let response = service(&orm).create_lot_hold(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(response.hold_id, Some(3));

        let kwargs = orm.last_kwargs().unwrap();
        assert_eq!(kwargs["partner_id"], 7);
        assert_eq!(kwargs["notas"], "Kitchen");
    }
}
