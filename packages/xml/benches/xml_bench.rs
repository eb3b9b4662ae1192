use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sigedit_xml::{parse, serialize};

fn signatures_source(rules: usize) -> String {
    let mut source = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<SignaturesFile schema_version=\"7\" version=\"0.0.1\">\n",
    );
    for i in 0..rules {
        source.push_str(&format!(
            "  <SignatureRule id=\"{id}\" actions=\"block,log\" category=\"web-cgi\" enabled=\"ON\" \
             source=\"Snort\" sourceid=\"{i}\" type=\"Pattern\" version=\"1\" cpu=\"0\" year=\"2015\" severity=\"HIGH\">\n    \
             <LogString>rule {i} &amp; friends</LogString>\n    \
             <PatternList><RequestPatterns><Pattern><Location area=\"URL\"/>\
             <Match type=\"Literal\">/probe/{i}</Match></Pattern></RequestPatterns></PatternList>\n  \
             </SignatureRule>\n",
            id = 100_000 + i,
        ));
    }
    source.push_str("</SignaturesFile>\n");
    source
}

fn parse_small_file(c: &mut Criterion) {
    let source = signatures_source(50);

    c.bench_function("parse_50_rules", |b| b.iter(|| parse(black_box(&source))));
}

fn parse_large_file(c: &mut Criterion) {
    let source = signatures_source(5_000);

    c.bench_function("parse_5000_rules", |b| b.iter(|| parse(black_box(&source))));
}

fn serialize_large_file(c: &mut Criterion) {
    let source = signatures_source(5_000);
    let tree = parse(&source).unwrap();

    c.bench_function("serialize_5000_rules", |b| {
        b.iter(|| serialize(black_box(&tree)))
    });
}

criterion_group!(benches, parse_small_file, parse_large_file, serialize_large_file);
criterion_main!(benches);
