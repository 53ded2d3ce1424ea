use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{ImageFormat, Rgba, RgbaImage};

use factpost::fonts::{default_font_candidates, resolve_face, MonospaceMetrics};
use factpost::rendering::layout::{Label, LayoutEngine, PositionHints};
use factpost::rendering::wrap::wrap_text;
use factpost::{PostBuilder, PostConfig, RenderRequest};

const HEADLINE: &str = "A DAY ON VENUS IS LONGER THAN A YEAR ON VENUS AND IT SPINS BACKWARDS";

fn bench_wrap_and_layout(c: &mut Criterion) {
    let config = PostConfig::default();
    let metrics = MonospaceMetrics::new(50, 98);
    let small = MonospaceMetrics::new(20, 40);
    let engine = LayoutEngine::new(&config);

    c.bench_function("wrap_text_monospace", |b| {
        b.iter(|| wrap_text(black_box(HEADLINE), &metrics, config.max_text_width()))
    });

    let wrapped = wrap_text(HEADLINE, &metrics, config.max_text_width());
    c.bench_function("layout_plan_monospace", |b| {
        b.iter(|| {
            engine
                .layout(
                    black_box(&wrapped),
                    &metrics,
                    Some(Label::new("VIRAL", &small)),
                    Some(Label::new("FACTS", &small)),
                    PositionHints::default(),
                )
                .unwrap()
        })
    });
}

// Full pipeline; skipped when no system font resolves.
fn bench_full_post(c: &mut Criterion) {
    let Ok(face) = resolve_face(&default_font_candidates()) else {
        return;
    };
    let builder = PostBuilder::with_face(PostConfig::default(), face).expect("builder");

    let img = RgbaImage::from_pixel(640, 360, Rgba([40, 80, 120, 255]));
    let mut background = Vec::new();
    img.write_to(&mut Cursor::new(&mut background), ImageFormat::Png)
        .expect("encode background");

    let request = RenderRequest {
        fact: HEADLINE.to_string(),
        ..Default::default()
    };

    c.bench_function("build_post", |b| {
        b.iter(|| builder.build_with_background(black_box(&request), &background).unwrap())
    });
}

criterion_group!(benches, bench_wrap_and_layout, bench_full_post);
criterion_main!(benches);
