use serde_json::{Value, json};
use stockchart_rs::ChartError;
use stockchart_rs::api::{
    ChartPanelObject, HIGHLIGHTED_COLUMN_CLASS_NAME, MarkerShape, PanelObjectKind, SpreadOptions,
    panel_object_registry,
};
use stockchart_rs::core::ChartPoint;
use stockchart_rs::error::ErrorCategory;
use stockchart_rs::price_style::{BoxSize, PriceStyle, PriceStyleKind, RenkoOptions};
use stockchart_rs::state::{
    ClassRegistry, Stateful, date_calibrator_registry, deserialize, deserialize_optional,
    price_style_registry, value_calibrator_registry,
};

#[test]
fn registering_a_name_twice_keeps_the_last_factory() {
    let mut registry: ClassRegistry<PriceStyle> = ClassRegistry::new();
    registry
        .register("renko", || PriceStyleKind::Candle.create_default())
        .expect("first registration");
    registry
        .register("renko", || PriceStyleKind::Renko.create_default())
        .expect("second registration");

    assert_eq!(registry.len(), 1);
    let style = registry.create_instance("renko").expect("instance");
    assert_eq!(style.kind(), PriceStyleKind::Renko);
}

#[test]
fn unknown_class_name_is_not_registered() {
    let registry = price_style_registry();
    let err = registry.create_instance("unknown").expect_err("unknown class");

    assert!(matches!(err, ChartError::NotRegistered(ref name) if name == "unknown"));
    assert_eq!(err.to_string(), "'unknown' is not registered.");
    assert_eq!(err.category(), ErrorCategory::Lookup);
}

#[test]
fn empty_class_name_is_rejected() {
    let mut registry: ClassRegistry<PriceStyle> = ClassRegistry::new();
    assert!(matches!(
        registry.register("", PriceStyle::default),
        Err(ChartError::InvalidConfig(_))
    ));
    assert!(registry.create_instance("").is_err());
    assert!(registry.is_empty());
}

#[test]
fn built_in_registries_list_every_class() {
    let styles = price_style_registry();
    assert_eq!(styles.len(), PriceStyleKind::ALL.len());
    for kind in PriceStyleKind::ALL {
        assert!(styles.contains(kind.class_name()), "{} missing", kind.class_name());
    }

    assert!(date_calibrator_registry().contains("StockChartX.AutoDateScaleCalibrator"));
    assert_eq!(value_calibrator_registry().len(), 3);

    let objects: Vec<String> = panel_object_registry()
        .registered_names()
        .map(str::to_owned)
        .collect();
    assert_eq!(
        objects,
        [
            "StockChartX.HighlightedColumn",
            "StockChartX.Spread",
            "StockChartX.GeometricMarker",
        ]
    );
}

#[test]
fn price_style_state_round_trips() {
    let style = PriceStyle::Renko(RenkoOptions {
        box_size: BoxSize::Fixed { price: 2.5 },
        ..RenkoOptions::default()
    });
    let state = style.save_state().expect("save");
    assert_eq!(state["className"], "renko");
    assert_eq!(state["options"]["boxSize"]["kind"], "fixed");

    let restored = deserialize(&price_style_registry(), &state).expect("deserialize");
    assert_eq!(restored, style);
}

#[test]
fn missing_options_fall_back_to_defaults() {
    let restored =
        deserialize(&price_style_registry(), &json!({ "className": "lineBreak" })).expect("load");
    assert_eq!(restored, PriceStyleKind::LineBreak.create_default());
}

#[test]
fn missing_class_name_fails_deserialize() {
    let err = deserialize(&price_style_registry(), &json!({ "options": {} })).expect_err("no class");
    assert!(matches!(err, ChartError::MissingClassName));

    let err = deserialize(&price_style_registry(), &json!({ "className": 5 })).expect_err("bad class");
    assert!(matches!(err, ChartError::InvalidConfig(_)));
}

#[test]
fn optional_blob_may_be_absent() {
    let registry = price_style_registry();
    assert!(deserialize_optional(&registry, None).expect("none").is_none());
    assert!(deserialize_optional(&registry, Some(&Value::Null)).expect("null").is_none());
    let style = deserialize_optional(&registry, Some(&json!({ "className": "kagi" })))
        .expect("kagi")
        .expect("present");
    assert_eq!(style.kind(), PriceStyleKind::Kagi);
}

#[test]
fn load_state_without_class_name_keeps_the_kind() {
    let mut style = PriceStyleKind::Mountain.create_default();
    style
        .load_state(&json!({ "options": { "showValueLines": true } }))
        .expect("load");
    assert_eq!(style.kind(), PriceStyleKind::Mountain);
    assert!(style.value_lines().show_value_lines);
}

#[test]
fn load_state_rejects_unknown_style_and_invalid_options() {
    let mut style = PriceStyle::default();
    assert!(matches!(
        style.load_state(&json!({ "className": "spiral" })),
        Err(ChartError::NotRegistered(_))
    ));

    let bad_box = json!({ "className": "renko", "options": { "boxSize": { "kind": "fixed", "price": 0.0 } } });
    assert!(style.load_state(&bad_box).is_err());
    assert_eq!(style, PriceStyle::default());
}

#[test]
fn panel_object_state_round_trips() {
    let object = ChartPanelObject::geometric_marker(ChartPoint::from_date(120_000, 42.0), MarkerShape::ArrowUp)
        .expect("marker")
        .with_z_index(3);
    let state = object.save_state().expect("save");
    assert_eq!(state["className"], "StockChartX.GeometricMarker");
    assert_eq!(state["options"]["zIndex"], 3);

    let restored = deserialize(&panel_object_registry(), &state).expect("deserialize");
    assert_eq!(restored, object);
    assert_eq!(restored.z_index(), 3);
    assert!(restored.id().is_none());
}

#[test]
fn panel_object_load_switches_kind_by_class_name() {
    let mut object = ChartPanelObject::spread(101.0, 100.5).expect("spread");
    object
        .load_state(&json!({ "className": HIGHLIGHTED_COLUMN_CLASS_NAME, "options": { "date": 60_000 } }))
        .expect("load");
    assert!(matches!(object.kind(), PanelObjectKind::HighlightedColumn(options) if options.date == 60_000));

    let mut object = ChartPanelObject::spread(101.0, 100.5).expect("spread");
    object
        .load_state(&json!({ "options": { "ask": 99.0, "visible": false } }))
        .expect("load");
    assert_eq!(object.kind(), &PanelObjectKind::Spread(SpreadOptions { ask: 99.0, bid: 0.0 }));
    assert!(!object.is_visible());
}

#[test]
fn invalid_objects_are_rejected() {
    assert!(ChartPanelObject::spread(f64::INFINITY, 1.0).is_err());
    assert!(ChartPanelObject::geometric_marker(ChartPoint::default(), MarkerShape::Dot).is_err());
}
