use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "DOM.querySelectorAll".to_string(),
        params: Some(serde_json::json!({"nodeId": 1, "selector": "video"})),
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("DOM.querySelectorAll"));
    assert!(json.contains("\"sessionId\":\"S1\""));
}

#[test]
fn test_cdp_request_omits_empty_fields() {
    let req = CdpRequest {
        id: 2,
        method: "Target.getTargets".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"nodeIds": [4, 5]}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Video",
        "url": "https://www.youtube.com/watch?v=abc",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert!(info.is_page());
    assert_eq!(info.hostname().as_deref(), Some("www.youtube.com"));
}

#[test]
fn test_page_info_without_host() {
    let json = r#"{"id": "p", "type": "page", "title": "", "url": "about:blank"}"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.hostname(), None);
}

#[test]
fn test_box_model_border_rect() {
    let json = r#"{
        "content": [12, 12, 88, 12, 88, 38, 12, 38],
        "padding": [11, 11, 89, 11, 89, 39, 11, 39],
        "border": [10, 10, 90, 10, 90, 40, 10, 40],
        "margin": [10, 10, 90, 10, 90, 40, 10, 40],
        "width": 80,
        "height": 30
    }"#;
    let model: BoxModel = serde_json::from_str(json).unwrap();
    assert_eq!(model.border_rect(), Some(Rect::new(10.0, 10.0, 80.0, 30.0)));
}

#[test]
fn test_binding_called_deserialize() {
    let json = r#"{"name": "__skiprampKey", "payload": "s", "executionContextId": 3}"#;
    let call: BindingCalled = serde_json::from_str(json).unwrap();
    assert_eq!(call.name, "__skiprampKey");
    assert_eq!(call.payload, "s");
}

#[test]
fn test_mouse_event_type_serialize() {
    let json = serde_json::to_string(&MouseEventType::MousePressed).unwrap();
    assert_eq!(json, "\"mousePressed\"");
    let json = serde_json::to_string(&MouseButton::Left).unwrap();
    assert_eq!(json, "\"left\"");
}
