use super::*;

#[test]
fn test_dom_type_names() {
    assert_eq!(PointerEventKind::PointerDown.dom_type(), "pointerdown");
    assert_eq!(PointerEventKind::MouseEnter.dom_type(), "mouseenter");
    assert_eq!(PointerEventKind::Click.dom_type(), "click");
}

#[test]
fn test_pointer_event_constructor_split() {
    assert!(PointerEventKind::PointerEnter.is_pointer_event());
    assert!(PointerEventKind::PointerUp.is_pointer_event());
    assert!(!PointerEventKind::MouseOver.is_pointer_event());
    assert!(!PointerEventKind::Click.is_pointer_event());
}

#[test]
fn test_phases() {
    assert_eq!(PointerEventKind::MouseMove.phase(), InteractionPhase::Hover);
    assert_eq!(PointerEventKind::PointerDown.phase(), InteractionPhase::Press);
    assert_eq!(PointerEventKind::PointerUp.phase(), InteractionPhase::Release);
    assert_eq!(PointerEventKind::Click.phase(), InteractionPhase::Activate);
}

#[test]
fn test_plan_keeps_order() {
    let at = Point::new(5.0, 5.0);
    let plan = InteractionPlan::new()
        .push(PointerEventKind::PointerOver, at)
        .push(PointerEventKind::PointerDown, at)
        .push(PointerEventKind::Click, at);

    let kinds: Vec<_> = plan.steps().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PointerEventKind::PointerOver,
            PointerEventKind::PointerDown,
            PointerEventKind::Click
        ]
    );
    assert_eq!(plan.len(), 3);
}

#[test]
fn test_skip_method_parse() {
    assert_eq!("pointer".parse::<SkipMethod>().unwrap(), SkipMethod::Pointer);
    assert_eq!("INPUT".parse::<SkipMethod>().unwrap(), SkipMethod::Input);
    assert!("click".parse::<SkipMethod>().is_err());
}

#[test]
fn test_skip_method_serde() {
    let json = serde_json::to_string(&SkipMethod::Input).unwrap();
    assert_eq!(json, "\"input\"");
    assert_eq!(SkipMethod::default(), SkipMethod::Pointer);
}

#[test]
fn test_event_kind_serde() {
    let json = serde_json::to_string(&PointerEventKind::PointerEnter).unwrap();
    assert_eq!(json, "\"pointerenter\"");
}
