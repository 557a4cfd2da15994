use shapekit_types::{ProcessKind, TransactionProcess};

#[test]
fn process_kind_parses_known_names() {
    assert_eq!("preauthorize".parse::<ProcessKind>().unwrap(), ProcessKind::Preauthorize);
    assert_eq!("postpay".parse::<ProcessKind>().unwrap(), ProcessKind::Postpay);
    assert_eq!("none".parse::<ProcessKind>().unwrap(), ProcessKind::None);
}

#[test]
fn process_kind_rejects_unknown_name() {
    let err = "braintree".parse::<ProcessKind>().unwrap_err();
    assert_eq!(err.to_string(), "unknown transaction process: braintree");
}

#[test]
fn process_kind_display_matches_parse() {
    for kind in [ProcessKind::Preauthorize, ProcessKind::Postpay, ProcessKind::None] {
        assert_eq!(kind.to_string().parse::<ProcessKind>().unwrap(), kind);
    }
}

#[test]
fn transaction_process_json_shape() {
    let p = TransactionProcess::new(ProcessKind::Preauthorize);
    let json = serde_json::to_value(p).unwrap();
    assert_eq!(json, serde_json::json!({"process": "preauthorize"}));
}
