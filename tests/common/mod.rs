#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ldiview_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_rgba(path: &Path, w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) {
    image::RgbaImage::from_fn(w, h, |x, y| image::Rgba(f(x, y)))
        .save(path)
        .unwrap();
}

fn write_gray(path: &Path, w: u32, h: u32, f: impl Fn(u32, u32) -> u8) {
    image::GrayImage::from_fn(w, h, |x, y| image::Luma([f(x, y)]))
        .save(path)
        .unwrap();
}

/// 32×32 two-layer view: red foreground matted to the left half over a blue backdrop.
pub fn write_two_layer_manifest(dir: &Path) -> PathBuf {
    write_rgba(&dir.join("front.png"), 32, 32, |_, _| [255, 0, 0, 255]);
    write_gray(&dir.join("front_depth.png"), 32, 32, |_, _| 128);
    write_gray(&dir.join("front_mask.png"), 32, 32, |x, _| {
        if x < 16 { 255 } else { 0 }
    });
    write_rgba(&dir.join("back.png"), 32, 32, |_, _| [0, 0, 255, 255]);
    write_gray(&dir.join("back_depth.png"), 32, 32, |_, _| 51);

    let manifest = r#"{
      "views": [{
        "width_px": 32, "height_px": 32, "focal_px": 32.0,
        "layers": [
          {
            "image": "front.png",
            "inv_depth": { "image": "front_depth.png", "min": 0.1, "max": 0.0 },
            "mask": "front_mask.png",
            "width_px": 32, "height_px": 32, "focal_px": 32.0
          },
          {
            "image": "back.png",
            "inv_depth": { "image": "back_depth.png", "min": 0.05, "max": 0.0 },
            "width_px": 32, "height_px": 32, "focal_px": 32.0
          }
        ]
      }]
    }"#;
    let path = dir.join("view.json");
    std::fs::write(&path, manifest).unwrap();
    path
}

/// 16×16 stereo pair of solid single-layer views: green left, magenta right.
pub fn write_stereo_manifest(dir: &Path) -> PathBuf {
    write_rgba(&dir.join("left.png"), 16, 16, |_, _| [0, 255, 0, 255]);
    write_rgba(&dir.join("right.png"), 16, 16, |_, _| [255, 0, 255, 255]);
    write_gray(&dir.join("depth.png"), 16, 16, |_, _| 255);

    let view = |image: &str, x: f64| {
        format!(
            r#"{{
              "width_px": 16, "height_px": 16, "focal_px": 16.0,
              "position": {{ "x": {x}, "y": 0.0, "z": 0.0 }},
              "layers": [{{
                "image": "{image}",
                "inv_depth": {{ "image": "depth.png", "min": 0.1, "max": 0.02 }},
                "width_px": 16, "height_px": 16, "focal_px": 16.0
              }}]
            }}"#
        )
    };
    let manifest = format!(
        r#"{{ "views": [{}, {}] }}"#,
        view("left.png", -0.5),
        view("right.png", 0.5)
    );
    let path = dir.join("stereo.json");
    std::fs::write(&path, manifest).unwrap();
    path
}
