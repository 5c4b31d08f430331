use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::media::cloudinary::sign_params;
use service::media::mock::InMemoryMediaHost;
use service::residents::{repository::mock::InMemoryResidentRepository, ResidentInput, ResidentService};

fn input() -> ResidentInput {
    ResidentInput {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        role: Some("Resident".into()),
        ..ResidentInput::default()
    }
}

fn bench_create(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("resident_create_in_memory", |b| {
        // fresh store per batch so the list does not grow without bound
        b.iter_batched(
            || ResidentService::new(Arc::new(InMemoryResidentRepository::new()), Arc::new(InMemoryMediaHost::new())),
            |svc| rt.block_on(svc.create(input(), None)).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_sign(c: &mut Criterion) {
    let params = vec![("folder", "residents".to_string()), ("timestamp", "1700000000".to_string())];
    c.bench_function("cloudinary_sign_params", |b| {
        b.iter(|| sign_params(&params, "api-secret"));
    });
}

criterion_group!(benches, bench_create, bench_sign);
criterion_main!(benches);
