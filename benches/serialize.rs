use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use xmpdom::{ArrayType, SerializeOptions, XmpMeta, XmpValue};

fn create_simple_meta() -> XmpMeta {
    let mut meta = XmpMeta::new();
    meta.set_property("xmp:CreatorTool", XmpValue::from("TestApp"))
        .unwrap();
    meta
}

fn create_complex_meta() -> XmpMeta {
    let mut meta = XmpMeta::new();
    meta.set_property("xmp:CreatorTool", "Adobe Photoshop CS2 Windows")
        .unwrap();
    meta.set_property("xmp:CreateDate", "2006-04-25T15:32:01+02:00")
        .unwrap();
    meta.set_property("exif:PixelXDimension", 200i64).unwrap();
    meta.set_property("exif:Flash/exif:Fired", false).unwrap();
    meta.set_property("exif:Flash/exif:Mode", 2i64).unwrap();

    for tag in ["purple", "square", "Stefan", "XMP", "test"] {
        meta.append_array_item("dc:subject", ArrayType::Unordered, tag)
            .unwrap();
    }
    for name in ["Llywelyn", "Stefan"] {
        meta.append_array_item("dc:creator", ArrayType::Ordered, name)
            .unwrap();
    }
    meta.set_localized_text("dc:title", "", "x-default", "Purple Square")
        .unwrap();
    meta.set_localized_text("dc:title", "de", "de-DE", "Lila Quadrat")
        .unwrap();
    meta.set_property("dc:description", "  edge whitespace  ")
        .unwrap();
    meta.set_qualifier("dc:description", "xmp:Label", "note")
        .unwrap();
    meta
}

fn bench_serialize_simple(c: &mut Criterion) {
    let meta = create_simple_meta();
    c.bench_function("serialize_simple", |b| {
        b.iter(|| {
            let _xml = black_box(&meta).serialize().unwrap();
        });
    });
}

fn bench_serialize_complex(c: &mut Criterion) {
    let meta = create_complex_meta();
    c.bench_function("serialize_complex", |b| {
        b.iter(|| {
            let _xml = black_box(&meta).serialize().unwrap();
        });
    });
}

fn bench_serialize_packet_complex(c: &mut Criterion) {
    let meta = create_complex_meta();
    c.bench_function("serialize_packet_complex", |b| {
        b.iter(|| {
            let _packet = black_box(&meta).serialize_packet().unwrap();
        });
    });
}

fn bench_serialize_exact_length(c: &mut Criterion) {
    let meta = create_complex_meta();
    let options = SerializeOptions::default()
        .indent("\t")
        .exact_packet_length(8192);
    c.bench_function("serialize_exact_length", |b| {
        b.iter(|| {
            let _packet = black_box(&meta).serialize_with(&options).unwrap();
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let packet = create_complex_meta().serialize_packet().unwrap();
    c.bench_function("round_trip", |b| {
        b.iter(|| {
            let meta = XmpMeta::parse(black_box(&packet)).unwrap();
            let _packet = meta.serialize_packet().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_serialize_simple,
    bench_serialize_complex,
    bench_serialize_packet_complex,
    bench_serialize_exact_length,
    bench_round_trip
);
criterion_main!(benches);
