use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use xmpdom::{MergePolicy, ParseOptions, XmpMeta};

// Attribute-only description
const SIMPLE_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="Adobe Photoshop CS2 Windows"/>
</rdf:RDF>
<?xpacket end="w"?>"#;

// Arrays, structures and qualifiers inside an x:xmpmeta wrapper
const COMPLEX_XMP: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:xmpMM="http://ns.adobe.com/xap/1.0/mm/"
         xmlns:stEvt="http://ns.adobe.com/xap/1.0/sType/ResourceEvent#"
         xmlns:tiff="http://ns.adobe.com/tiff/1.0/"
         xmlns:exif="http://ns.adobe.com/exif/1.0/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="Adobe Photoshop CS2 Windows"
                   xmp:CreateDate="2006-04-25T15:32:01+02:00"
                   xmp:ModifyDate="2006-04-27T15:38:36.655+02:00"
                   xmpMM:DocumentID="uuid:FE607D9B5FD4DA118B7787757E22306B"
                   tiff:Orientation="1"
                   exif:PixelXDimension="200"
                   exif:PixelYDimension="200">
    <dc:description>
      <rdf:Alt>
        <rdf:li xml:lang="x-default">a test file (öäüßÖÄÜ€中文)</rdf:li>
        <rdf:li xml:lang="en">A test file with special characters</rdf:li>
      </rdf:Alt>
    </dc:description>
    <dc:creator>
      <rdf:Seq>
        <rdf:li>Llywelyn</rdf:li>
        <rdf:li>Stefan</rdf:li>
      </rdf:Seq>
    </dc:creator>
    <dc:subject>
      <rdf:Bag>
        <rdf:li>purple</rdf:li>
        <rdf:li>square</rdf:li>
        <rdf:li>XMP</rdf:li>
      </rdf:Bag>
    </dc:subject>
    <xmpMM:History>
      <rdf:Seq>
        <rdf:li stEvt:action="created" stEvt:when="2006-04-25T15:32:01+02:00"/>
        <rdf:li rdf:parseType="Resource">
          <stEvt:action>saved</stEvt:action>
          <stEvt:when>2006-04-27T15:38:36+02:00</stEvt:when>
        </rdf:li>
      </rdf:Seq>
    </xmpMM:History>
    <exif:Flash>
      <rdf:Description exif:Fired="False" exif:Mode="2"/>
    </exif:Flash>
    <dc:source rdf:parseType="Resource">
      <rdf:value>scan</rdf:value>
      <xmp:Label>checked</xmp:Label>
    </dc:source>
  </rdf:Description>
</rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

fn bench_parse_simple(c: &mut Criterion) {
    c.bench_function("parse_simple", |b| {
        b.iter(|| {
            let _meta = XmpMeta::parse(black_box(SIMPLE_XMP)).unwrap();
        });
    });
}

fn bench_parse_complex(c: &mut Criterion) {
    c.bench_function("parse_complex", |b| {
        b.iter(|| {
            let _meta = XmpMeta::parse(black_box(COMPLEX_XMP)).unwrap();
        });
    });
}

fn bench_parse_permissive(c: &mut Criterion) {
    let options = ParseOptions::default()
        .permissive()
        .merge_policy(MergePolicy::FirstWins);
    c.bench_function("parse_permissive", |b| {
        b.iter(|| {
            let _meta = XmpMeta::parse_with(black_box(COMPLEX_XMP), options).unwrap();
        });
    });
}

fn bench_parse_incremental(c: &mut Criterion) {
    c.bench_function("parse_incremental", |b| {
        b.iter(|| {
            let mut meta = XmpMeta::new();
            meta.begin_incremental(ParseOptions::default());
            let mut rest = black_box(COMPLEX_XMP);
            while !rest.is_empty() {
                let mut split = rest.len().min(256);
                while !rest.is_char_boundary(split) {
                    split += 1;
                }
                let (chunk, tail) = rest.split_at(split);
                meta.parse_chunk(chunk, tail.is_empty()).unwrap();
                rest = tail;
            }
        });
    });
}

fn bench_parse_from_str_trait(c: &mut Criterion) {
    c.bench_function("parse_from_str_trait", |b| {
        b.iter(|| {
            let _meta: XmpMeta = black_box(SIMPLE_XMP).parse().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_complex,
    bench_parse_permissive,
    bench_parse_incremental,
    bench_parse_from_str_trait
);
criterion_main!(benches);
