use std::fs;
use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use factpost::fonts::{default_font_candidates, resolve_face};
use factpost::sources::{DirectoryTemplates, StaticTemplates, TemplateStore};
use factpost::{PostBuilder, PostConfig, RenderRequest, Topic};

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(16, 9, Rgba(rgba));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).expect("encode fixture");
    buf
}

fn template_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let general = dir.path().join("general");
    fs::create_dir_all(&general).unwrap();
    fs::write(general.join("b.png"), png([0, 0, 255, 255])).unwrap();
    fs::write(general.join("a.PNG"), png([255, 0, 0, 255])).unwrap();
    fs::write(general.join("notes.txt"), "not a template").unwrap();

    let yachts = dir.path().join("yachts");
    fs::create_dir_all(&yachts).unwrap();
    fs::write(yachts.join("broken.jpg"), b"not really a jpeg").unwrap();
    dir
}

#[test]
fn directory_store_lists_only_images_sorted() {
    let dir = template_dir();
    let store = DirectoryTemplates::new(dir.path());
    let files = store.list(Topic::General).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.PNG", "b.png"]);
}

#[test]
fn directory_store_pick_is_deterministic() {
    let dir = template_dir();
    let store = DirectoryTemplates::new(dir.path());
    let first = store.background(Topic::General, b"OCTOPUSES").unwrap();
    for _ in 0..5 {
        assert_eq!(store.background(Topic::General, b"OCTOPUSES").unwrap(), first);
    }
    assert!(first == png([0, 0, 255, 255]) || first == png([255, 0, 0, 255]));
}

#[test]
fn missing_topic_directory_is_template_error() {
    let dir = template_dir();
    let store = DirectoryTemplates::new(dir.path());
    let err = store.background(Topic::RealEstate, b"x").unwrap_err();
    assert_eq!(err.kind(), "template");
}

#[test]
fn builder_uses_template_store_and_reports_bad_templates() {
    let Ok(face) = resolve_face(&default_font_candidates()) else {
        println!("No font available; skipping");
        return;
    };
    let dir = template_dir();
    let builder = PostBuilder::with_face(PostConfig::default(), face)
        .unwrap()
        .with_templates(DirectoryTemplates::new(dir.path()));

    let ok = RenderRequest {
        topic: Topic::General,
        fact: "A group of flamingos is called a flamboyance".into(),
        ..Default::default()
    };
    let post = builder.build(&ok).expect("render from template");
    assert_eq!((post.width, post.height), (1080, 1080));

    let broken = RenderRequest {
        topic: Topic::Yachts,
        ..ok
    };
    let err = builder.build(&broken).unwrap_err();
    assert_eq!(err.kind(), "image_decode");
}

#[test]
fn builder_without_store_or_background_fails() {
    let Ok(face) = resolve_face(&default_font_candidates()) else {
        println!("No font available; skipping");
        return;
    };
    let builder = PostBuilder::with_face(PostConfig::default(), face).unwrap();
    let err = builder.build(&RenderRequest::default()).unwrap_err();
    assert_eq!(err.kind(), "template");
}

#[test]
fn static_store_serves_inserted_bytes() {
    let mut store = StaticTemplates::new();
    store.insert(Topic::Yachts, png([1, 2, 3, 255]));
    assert_eq!(store.background(Topic::Yachts, b"seed").unwrap(), png([1, 2, 3, 255]));
    assert!(store.background(Topic::General, b"seed").is_err());
}
