//! JavaScript execution operations for CDP page session.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::RemoteObject;

use super::core::PageSession;

fn exception_text(result: &Value) -> Option<String> {
    result.get("exceptionDetails").map(|exception| {
        exception["exception"]["description"]
            .as_str()
            .or_else(|| exception["text"].as_str())
            .unwrap_or("Unknown error")
            .to_string()
    })
}

fn wrap_args(args: Vec<Value>) -> Value {
    json!(args.into_iter().map(|v| json!({"value": v})).collect::<Vec<_>>())
}

impl PageSession {
    /// Evaluate JavaScript expression.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(text) = exception_text(&result) {
            return Err(CdpError::JavaScript(text));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Call function on remote object.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<Value, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": true,
            "awaitPromise": true,
        });

        if let Some(a) = args {
            params["arguments"] = wrap_args(a);
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        if let Some(text) = exception_text(&result) {
            return Err(CdpError::JavaScript(text));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Call function on remote object and keep the result as a remote object.
    pub async fn call_function_on_handle(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
        object_group: &str,
    ) -> Result<RemoteObject, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": false,
            "objectGroup": object_group,
        });

        if let Some(a) = args {
            params["arguments"] = wrap_args(a);
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        if let Some(text) = exception_text(&result) {
            return Err(CdpError::JavaScript(text));
        }

        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    /// Release every remote object in a group.
    pub async fn release_object_group(&self, object_group: &str) -> Result<(), CdpError> {
        self.call(
            "Runtime.releaseObjectGroup",
            Some(json!({"objectGroup": object_group})),
        )
        .await?;
        Ok(())
    }

    /// Expose `window[name](payload)` to the page; calls arrive as
    /// `Runtime.bindingCalled` events.
    pub async fn add_binding(&self, name: &str) -> Result<(), CdpError> {
        self.call("Runtime.addBinding", Some(json!({"name": name})))
            .await?;
        Ok(())
    }

    /// Run `source` in every document the tab loads from now on.
    pub async fn add_script_on_new_document(&self, source: &str) -> Result<String, CdpError> {
        let result = self
            .call(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(json!({"source": source})),
            )
            .await?;

        result["identifier"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing script identifier".to_string()))
    }
}
