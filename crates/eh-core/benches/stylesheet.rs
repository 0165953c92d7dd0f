use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use eh_core::{create_style_sheet, Domains, ElemHide, ElemHideException, ElemHideFilter, StyleSheetOptions};

fn build_engine() -> ElemHide {
    let mut engine = ElemHide::new();

    for i in 0..5_000 {
        engine.add(ElemHideFilter::generic(&format!(".ad-{i}")));
    }

    for i in 0..2_000 {
        let site = format!("site{}.example", i % 200);
        let domains: Domains = [("", false), (site.as_str(), true)].into_iter().collect();
        engine.add(Arc::new(ElemHideFilter::new(
            format!("{site}##.promo-{i}"),
            format!(".promo-{i}"),
            Some(domains),
        )));
    }

    for i in 0..50 {
        let site = format!("site{i}.example");
        let domains: Domains = [("", false), (site.as_str(), true)].into_iter().collect();
        engine.add_exception(Arc::new(ElemHideException::new(
            format!("{site}#@#.ad-{i}"),
            format!(".ad-{i}"),
            Some(domains),
        )));
    }

    engine
}

fn bench_create_style_sheet(c: &mut Criterion) {
    let selectors: Vec<String> = (0..10_000).map(|i| format!("#container > .item-{i}")).collect();

    c.bench_function("create_style_sheet_10k", |b| {
        b.iter(|| create_style_sheet(black_box(&selectors)))
    });
}

fn bench_generate_for_domain(c: &mut Criterion) {
    let mut engine = build_engine();

    c.bench_function("generate_cached_subdomains", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            let host = format!("www{}.site{}.example", i % 7, i % 200);
            engine.generate_style_sheet_for_domain(black_box(&host), StyleSheetOptions::empty())
        })
    });

    c.bench_function("generate_with_selectors", |b| {
        b.iter(|| {
            engine.generate_style_sheet_for_domain(
                black_box("www.site3.example"),
                StyleSheetOptions::INCLUDE_SELECTORS | StyleSheetOptions::INCLUDE_EXCEPTIONS,
            )
        })
    });
}

criterion_group!(benches, bench_create_style_sheet, bench_generate_for_domain);
criterion_main!(benches);
