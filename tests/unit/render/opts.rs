use super::*;

#[test]
fn empty_json_is_the_default() {
    let opts = RenderOpts::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(opts, RenderOpts::default());
    opts.validate().unwrap();
}

#[test]
fn nested_sections_parse_partially() {
    let json = r#"{
        "refine_mode": "blur_only",
        "background": { "rgba": [10, 20, 30, 255] },
        "smoothing": { "z_weight": 0.3 },
        "display": { "ipd_mm": 60.0 },
        "output": { "width": 320, "height": 200 }
    }"#;
    let opts = RenderOpts::from_reader(json.as_bytes()).unwrap();
    assert_eq!(opts.refine_mode, Some(RefineMode::BlurOnly));
    assert_eq!(opts.background.rgba, [10, 20, 30, 255]);
    assert_eq!(opts.smoothing.xy_weight, 0.5);
    assert_eq!(opts.smoothing.z_weight, 0.3);
    assert_eq!(opts.display.ipd_mm, 60.0);
    assert_eq!(opts.display.viewing_distance_mm, 600.0);
    assert_eq!(opts.output, Some(Resolution { width: 320, height: 200 }));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = RenderOpts::from_reader("{ nope".as_bytes()).unwrap_err();
    assert!(matches!(err, LdiError::Serde(_)));
}

#[test]
fn env_overrides_apply_and_ignore_garbage() {
    let opts = RenderOpts::default().with_overrides_from(|k| match k {
        "LDIVIEW_REFINE_MODE" => Some("bypass".to_owned()),
        "LDIVIEW_PARALLEL" => Some("true".to_owned()),
        _ => None,
    });
    assert_eq!(opts.refine_mode, Some(RefineMode::Bypass));
    assert!(opts.parallel);

    let kept = opts.with_overrides_from(|_| Some("garbage".to_owned()));
    assert_eq!(kept.refine_mode, Some(RefineMode::Bypass));
    assert!(kept.parallel);
}

#[test]
fn out_of_range_values_fail_validation() {
    let bad = [
        RenderOpts {
            reveal: 1.5,
            ..RenderOpts::default()
        },
        RenderOpts {
            threads: Some(0),
            ..RenderOpts::default()
        },
        RenderOpts {
            smoothing: SmoothingOpts {
                xy_weight: 0.0,
                z_weight: 0.1,
            },
            ..RenderOpts::default()
        },
        RenderOpts {
            display: DisplayOpts {
                ipd_mm: -1.0,
                ..DisplayOpts::default()
            },
            ..RenderOpts::default()
        },
    ];
    for opts in bad {
        assert!(opts.validate().is_err(), "{opts:?}");
    }
}
