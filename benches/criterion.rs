use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gavin::blueprint::{replace, APP_NAME_TOKEN};

pub fn replace_app_name(c: &mut Criterion) {
    let manifest = r#"{
  "name": "{{APP_NAME}}",
  "private": true,
  "workspaces": ["app"],
  "scripts": { "start": "yarn --cwd app start" }
}"#
    .repeat(64);

    c.bench_function("Replace app name token in a package manifest", |b| {
        b.iter(|| {
            replace(
                black_box(manifest.as_bytes()),
                black_box(APP_NAME_TOKEN.as_bytes()),
                black_box(b"demo-app"),
            )
        })
    });

    c.bench_function("Scan a file without the token", |b| {
        let plain = "export default function App() { return null; }\n".repeat(256);
        b.iter(|| replace(black_box(plain.as_bytes()), APP_NAME_TOKEN.as_bytes(), b"demo-app"))
    });
}

criterion_group!(benches, replace_app_name);
criterion_main!(benches);
