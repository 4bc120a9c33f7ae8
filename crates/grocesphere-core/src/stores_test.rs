use super::*;

fn make_store(id: &str, lat: f64, lng: f64) -> Store {
    Store {
        id: id.to_string(),
        name: format!("Store {id}"),
        address: String::new(),
        lat,
        lng,
        kind: StoreKind::General,
        rating: 4.5,
        is_open: true,
        available_product_ids: vec![],
        upi_id: None,
    }
}

fn file_of(stores: Vec<Store>) -> StoresFile {
    StoresFile {
        stores,
        ..StoresFile::default()
    }
}

#[test]
fn parse_stores_reads_yaml_directory() {
    let yaml = r"
stores:
  - id: blr-1
    name: Fresh Basket Supermarket
    address: 12, Main Road
    lat: 12.9716
    lng: 77.5946
    type: general
    rating: 4.6
    available_product_ids: [milk, bread]
    upi_id: freshbasket@oksbi
  - id: blr-2
    name: Green Leaf Organics
    lat: 12.9650
    lng: 77.6000
    type: produce
";
    let file = parse_stores(yaml).expect("valid stores yaml");
    assert_eq!(file.stores.len(), 2);

    let first = &file.stores[0];
    assert_eq!(first.kind, StoreKind::General);
    assert!(first.stocks("milk"));
    assert!(!first.stocks("apples"));
    assert_eq!(first.upi_id.as_deref(), Some("freshbasket@oksbi"));

    let second = &file.stores[1];
    assert_eq!(second.kind, StoreKind::Produce);
    assert!(second.is_open, "is_open defaults to true");
    assert!(second.address.is_empty());
    assert!(second.upi_id.is_none());
}

#[test]
fn parse_stores_rejects_unknown_kind() {
    let yaml = r"
stores:
  - id: x
    name: X
    lat: 1.0
    lng: 1.0
    type: bakery
";
    assert!(matches!(
        parse_stores(yaml),
        Err(ConfigError::StoresFileParse(_))
    ));
}

#[test]
fn validate_rejects_duplicate_ids() {
    let file = file_of(vec![make_store("a", 12.0, 77.0), make_store("a", 12.1, 77.1)]);
    let err = validate_stores(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate store id")));
}

#[test]
fn validate_rejects_empty_id() {
    let file = file_of(vec![make_store("  ", 12.0, 77.0)]);
    assert!(matches!(
        validate_stores(&file),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn validate_rejects_sentinel_coordinates() {
    let file = file_of(vec![make_store("a", 0.0, 0.0)]);
    let err = validate_stores(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("invalid coordinates")));
}

#[test]
fn validate_rejects_out_of_range_coordinates() {
    let file = file_of(vec![make_store("a", 95.0, 77.0)]);
    assert!(matches!(
        validate_stores(&file),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn validate_rejects_rating_above_five() {
    let mut store = make_store("a", 12.0, 77.0);
    store.rating = 7.0;
    let file = file_of(vec![store]);
    let err = validate_stores(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("invalid rating")));
}

#[test]
fn load_stores_reports_missing_file() {
    let err = load_stores(Path::new("/nonexistent/stores.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::StoresFileIo { .. }));
}

#[test]
fn external_prefixes_are_detected() {
    assert!(make_store("demo-gen-1", 1.0, 1.0).is_external());
    assert!(make_store("osm-123", 1.0, 1.0).is_external());
    assert!(!make_store("6f1c2a", 1.0, 1.0).is_external());
}

#[test]
fn kind_display_matches_serde_name() {
    assert_eq!(StoreKind::Dairy.to_string(), "dairy");
    let json = serde_json::to_string(&StoreKind::Produce).unwrap();
    assert_eq!(json, "\"produce\"");
}

#[test]
fn parse_stores_reads_optional_catalog() {
    let yaml = r#"
stores:
  - id: blr-dairy-1
    name: Nandini Milk Parlour
    lat: 12.9784
    lng: 77.6408
    type: dairy
    available_product_ids: [milk]
products:
  - id: milk
    name: Toned Milk
    price: "27"
    category: Dairy
    brands:
      - name: Nandini
        price: "24"
    variants:
      - name: 1 L
        multiplier: "2"
"#;
    let file = parse_stores(yaml).expect("valid stores yaml");
    let milk = file.product("milk").expect("catalog entry");
    assert_eq!(milk.brands.len(), 1);
    assert_eq!(milk.variants[0].name, "1 L");
    assert!(file.product("bread").is_none());
}

#[test]
fn validate_rejects_duplicate_product_ids() {
    let yaml = r#"
stores: []
products:
  - {id: milk, name: Milk, price: "27", category: Dairy}
  - {id: milk, name: Milk 2, price: "30", category: Dairy}
"#;
    let err = parse_stores(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate product id")));
}

#[test]
fn validate_rejects_zero_variant_multiplier() {
    let yaml = r#"
stores: []
products:
  - id: rice
    name: Rice
    price: "60"
    category: Staples
    variants:
      - {name: Free, multiplier: "0"}
"#;
    let err = parse_stores(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("variant multiplier")));
}
