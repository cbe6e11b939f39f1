//! Benchmarks for request building and cookie propagation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crawlflow::http::{CookieJar, HeaderMap, HeaderValue, RequestSpec};

fn jar(size: usize) -> CookieJar {
    (0..size).map(|i| (format!("cookie{i}"), format!("value{i}"))).collect()
}

fn request_benchmark(c: &mut Criterion) {
    let jar = jar(16);

    let mut get = RequestSpec::get().with_header("Accept", "text/html");
    let mut post = RequestSpec::post();
    for i in 0..16 {
        let _ = get.add_parameter(format!("q{i}"), format!("value {i}&more"));
        let _ = post.add_parameter(format!("field{i}"), format!("välue {i}"));
    }

    c.bench_function("build_get", |b| {
        b.iter(|| black_box(get.build(black_box("http://bench.test/search"), &jar)))
    });

    c.bench_function("build_post", |b| {
        b.iter(|| black_box(post.build(black_box("http://bench.test/submit"), &jar)))
    });
}

fn cookie_benchmark(c: &mut Criterion) {
    let mut headers = HeaderMap::new();
    for i in 0..16 {
        let value = HeaderValue::from_str(&format!("sid{i}=v{i}; Path=/; HttpOnly")).unwrap();
        headers.append("set-cookie", value);
    }

    c.bench_function("merge_set_cookies", |b| {
        b.iter(|| {
            let mut jar = CookieJar::new();
            black_box(jar.merge_set_cookies(black_box(&headers)))
        })
    });

    let jar = jar(32);
    c.bench_function("cookie_header_value", |b| {
        b.iter(|| black_box(jar.to_header_bytes()))
    });
}

criterion_group!(benches, request_benchmark, cookie_benchmark);
criterion_main!(benches);
