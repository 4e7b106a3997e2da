//! DOM operations for CDP page session.

use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{BoxModel, RemoteObject};

use super::core::PageSession;

impl PageSession {
    /// Node id of the document root.
    ///
    /// Node ids handed out earlier stay valid only until the next
    /// `DOM.documentUpdated`, so callers cache this and refetch after one.
    pub async fn document_root(&self) -> Result<i64, CdpError> {
        let result = self
            .call("DOM.getDocument", Some(json!({"depth": 0})))
            .await?;

        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing root nodeId".to_string()))
    }

    /// Query selector all, under `root`.
    pub async fn query_selector_all(&self, root: i64, selector: &str) -> Result<Vec<i64>, CdpError> {
        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({
                    "nodeId": root,
                    "selector": selector,
                })),
            )
            .await?;

        let node_ids: Vec<i64> = result["nodeIds"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();

        Ok(node_ids)
    }

    /// Get box model for node, or `None` when it is not rendered.
    pub async fn get_box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await;

        match result {
            Ok(r) => {
                let model: BoxModel = serde_json::from_value(r["model"].clone())?;
                Ok(Some(model))
            }
            Err(e) if e.is_layout_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Attributes of a node as a flat `[name, value, name, value, ...]` list.
    pub async fn get_attributes(&self, node_id: i64) -> Result<Vec<String>, CdpError> {
        let result = self
            .call("DOM.getAttributes", Some(json!({"nodeId": node_id})))
            .await?;

        let attributes: Vec<String> =
            serde_json::from_value(result["attributes"].clone()).unwrap_or_default();
        Ok(attributes)
    }

    /// Resolve node to runtime object, grouped for bulk release.
    pub async fn resolve_node(&self, node_id: i64, object_group: &str) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "DOM.resolveNode",
                Some(json!({"nodeId": node_id, "objectGroup": object_group})),
            )
            .await?;

        let obj: RemoteObject = serde_json::from_value(result["object"].clone())?;
        Ok(obj)
    }

    /// Node id for a runtime object. The node must be in the tracked document.
    pub async fn request_node(&self, object_id: &str) -> Result<i64, CdpError> {
        let result = self
            .call("DOM.requestNode", Some(json!({"objectId": object_id})))
            .await?;

        match result["nodeId"].as_i64() {
            Some(0) | None => Err(CdpError::InvalidResponse(
                "Object is not a tracked node".to_string(),
            )),
            Some(id) => Ok(id),
        }
    }
}
