use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use common::metrics::RecordingCounterSink;
use service::cake::repository::mock::MockCakeRepository;
use service::cake::{CakeEntity, CakeRequest, CakeService};

fn bench_service(c: &mut Criterion) {
    let seed = (0..1_000).map(|i| CakeEntity {
        id: None,
        name: format!("cake-{i}"),
        description: Some("bench".into()),
        image_url: None,
    });
    let repo = Arc::new(MockCakeRepository::with_cakes(seed));
    let svc = CakeService::new(repo.clone(), Arc::new(RecordingCounterSink::default()));
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("cake_list_1000", |b| {
        b.to_async(&rt).iter(|| async {
            svc.list().await.unwrap();
        });
    });

    c.bench_function("cake_update_in_transaction", |b| {
        b.to_async(&rt).iter(|| async {
            let req = CakeRequest { name: "updated".into(), description: None, image_url: None };
            svc.update(500, req).await.unwrap();
            // the call log grows on every operation
            repo.clear_calls();
        });
    });
}

criterion_group!(benches, bench_service);
criterion_main!(benches);
