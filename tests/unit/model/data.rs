use super::*;

#[test]
fn motion3_meta_is_read() {
    let clip = MotionClip::from_motion3(
        br#"{"Version":3,"Meta":{"Duration":2.5,"Fps":30.0,"Loop":true},"Curves":[]}"#,
    )
    .unwrap();
    assert_eq!(clip.duration, Duration::from_millis(2500));
    assert!(clip.looped);

    let bare = MotionClip::from_motion3(br#"{}"#).unwrap();
    assert_eq!(bare.duration, Duration::ZERO);
    assert!(!bare.looped);
}

#[test]
fn exp3_fade_defaults_to_one_second() {
    let e = ExpressionClip::from_exp3(br#"{"Type":"Live2D Expression","FadeInTime":0.25}"#).unwrap();
    assert_eq!(e.fade_in, Duration::from_millis(250));
    let e = ExpressionClip::from_exp3(br#"{"Type":"Live2D Expression"}"#).unwrap();
    assert_eq!(e.fade_in, Duration::from_secs(1));
}

#[test]
fn build_data_and_catalog_parse_pascal_case() {
    let build: ModelBuildData = serde_json::from_str(
        r#"{"Moc3FileName":"m.moc3","TextureNames":["t0.png","t1.png"],"PhysicsFileName":"p.json"}"#,
    )
    .unwrap();
    assert_eq!(build.texture_names.len(), 2);
    let cat: MotionCatalog =
        serde_json::from_str(r#"{"Motions":["a","b"],"Expressions":["e"]}"#).unwrap();
    assert!(cat.has_motion("b"));
    assert!(!cat.has_motion("e"));
    assert!(cat.has_expression("e"));
}

#[test]
fn library_keys_by_costume() {
    let mut lib = ModelLibrary::new();
    lib.insert(ModelBundle {
        costume: "c1".into(),
        ..ModelBundle::default()
    });
    assert_eq!(lib.len(), 1);
    assert!(lib.get("c1").is_some());
    assert!(lib.get("c2").is_none());
    assert_eq!(lib.costumes().collect::<Vec<_>>(), vec!["c1"]);
}
