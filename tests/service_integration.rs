#![cfg(feature = "service")]

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use factpost::fonts::{default_font_candidates, resolve_face};
use factpost::sources::StaticTemplates;
use factpost::{PostBuilder, PostConfig, RenderRequest, RenderService, Topic};

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(40, 30, Rgba(rgba));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).expect("encode fixture");
    buf
}

fn builder() -> Option<PostBuilder> {
    let face = resolve_face(&default_font_candidates()).ok()?;
    let templates = StaticTemplates::new().with(Topic::General, png([30, 60, 90, 255]));
    Some(
        PostBuilder::with_face(PostConfig::default(), face)
            .expect("builder")
            .with_templates(templates),
    )
}

fn request(fact: &str) -> RenderRequest {
    RenderRequest {
        fact: fact.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn concurrent_renders_match_sequential_output() {
    let (Some(reference), Some(service_builder)) = (builder(), builder()) else {
        println!("No font available; skipping");
        return;
    };
    let service = RenderService::new(service_builder, Some(3)).expect("service");
    assert_eq!(service.workers(), 3);

    let facts = [
        "OCTOPUSES HAVE THREE HEARTS AND BLUE BLOOD",
        "SHARKS HAVE BEEN AROUND LONGER THAN TREES",
        "",
        "BANANAS ARE BERRIES BUT STRAWBERRIES AREN'T",
        "OCTOPUSES HAVE THREE HEARTS AND BLUE BLOOD",
    ];

    let futures = facts.iter().map(|f| {
        let service = service.clone();
        let req = request(f);
        async move { service.render(req).await }
    });
    let results = futures::future::join_all(futures).await;

    for (fact, res) in facts.iter().zip(results) {
        let post = res.expect("render");
        let expected = reference.build(&request(fact)).expect("sequential render");
        assert_eq!(post.digest(), expected.digest(), "fact {:?}", fact);
    }
}

#[tokio::test]
async fn service_reports_render_errors_per_request() {
    let Some(builder) = builder() else {
        println!("No font available; skipping");
        return;
    };
    let service = RenderService::new(builder, Some(2)).expect("service");

    let bad = service
        .render_with_background(request("HELLO"), b"garbage".to_vec())
        .await
        .unwrap_err();
    assert_eq!(bad.kind(), "image_decode");

    // The failure did not poison the workers.
    let ok = service
        .render_with_background(request("HELLO"), png([0, 0, 0, 255]))
        .await
        .expect("render after failure");
    assert_eq!((ok.width, ok.height), (1080, 1080));
}
