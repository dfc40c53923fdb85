use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use xmpdom::{ArrayType, IterOptions, XmpMeta, XmpPath};

fn create_populated_meta() -> XmpMeta {
    let mut meta = XmpMeta::new();
    meta.set_property("xmp:CreatorTool", "TestApp").unwrap();
    meta.set_property("xmp:CreateDate", "2006-04-25T15:32:01+02:00")
        .unwrap();
    meta.set_property("exif:PixelXDimension", 200i64).unwrap();

    // Add array items
    for i in 0..10 {
        meta.append_array_item("dc:subject", ArrayType::Unordered, format!("item{}", i))
            .unwrap();
    }
    meta.set_localized_text("dc:title", "", "x-default", "Default")
        .unwrap();
    meta.set_localized_text("dc:title", "en", "en-US", "Color")
        .unwrap();
    meta.set_localized_text("dc:title", "de", "de-DE", "Farbe")
        .unwrap();

    meta
}

fn bench_path_parse(c: &mut Criterion) {
    let meta = XmpMeta::new();
    c.bench_function("path_parse", |b| {
        b.iter(|| {
            let _path = XmpPath::parse(
                black_box("xmpMM:History[stEvt:action='saved']/stEvt:when"),
                meta.namespaces(),
            );
        });
    });
}

fn bench_set_property(c: &mut Criterion) {
    c.bench_function("set_property", |b| {
        b.iter(|| {
            let mut meta = XmpMeta::new();
            meta.set_property(black_box("xmp:CreatorTool"), black_box("TestApp"))
                .unwrap();
        });
    });
}

fn bench_get_property(c: &mut Criterion) {
    let meta = create_populated_meta();
    c.bench_function("get_property", |b| {
        b.iter(|| {
            let _value = black_box(&meta).get_property(black_box("xmp:CreatorTool"));
        });
    });
}

fn bench_get_array_item(c: &mut Criterion) {
    let meta = create_populated_meta();
    c.bench_function("get_array_item", |b| {
        b.iter(|| {
            let _value = black_box(&meta).get_property(black_box("dc:subject[last()]"));
        });
    });
}

fn bench_delete_property(c: &mut Criterion) {
    c.bench_function("delete_property", |b| {
        b.iter(|| {
            let mut meta = create_populated_meta();
            meta.delete_property(black_box("xmp:CreatorTool")).unwrap();
        });
    });
}

fn bench_append_array_item(c: &mut Criterion) {
    c.bench_function("append_array_item", |b| {
        b.iter(|| {
            let mut meta = XmpMeta::new();
            for i in 0..10 {
                meta.append_array_item("dc:subject", ArrayType::Unordered, format!("item{}", i))
                    .unwrap();
            }
        });
    });
}

fn bench_get_localized_text(c: &mut Criterion) {
    let meta = create_populated_meta();
    c.bench_function("get_localized_text", |b| {
        b.iter(|| {
            let _text = black_box(&meta).get_localized_text(
                black_box("dc:title"),
                black_box("en"),
                black_box("en-GB"),
            );
        });
    });
}

fn bench_set_localized_text(c: &mut Criterion) {
    c.bench_function("set_localized_text", |b| {
        b.iter(|| {
            let mut meta = XmpMeta::new();
            meta.set_localized_text(black_box("dc:title"), "", "en-US", black_box("Title"))
                .unwrap();
        });
    });
}

fn bench_iterate(c: &mut Criterion) {
    let meta = create_populated_meta();
    c.bench_function("iterate", |b| {
        b.iter(|| black_box(&meta).iter_with(IterOptions::default()).count());
    });
}

criterion_group!(
    benches,
    bench_path_parse,
    bench_set_property,
    bench_get_property,
    bench_get_array_item,
    bench_delete_property,
    bench_append_array_item,
    bench_get_localized_text,
    bench_set_localized_text,
    bench_iterate
);
criterion_main!(benches);
