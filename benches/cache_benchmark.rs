//! Performance benchmarks for service-center-kit
//!
//! This benchmark suite measures:
//! - InMemory backend operations (set, get, delete)
//! - RequestCache reads (fresh hit, miss, invalidate)
//! - Invoice computation across job counts
//! - Envelope serialization of model records
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use service_center_kit::backend::{CacheBackend, InMemoryBackend};
use service_center_kit::models::{Job, ServiceRequest, ServiceRequestStatus};
use service_center_kit::serialization::{deserialize_from_cache, serialize_for_cache};
use service_center_kit::{CacheConfig, InvoiceAmounts, ReadStrategy, RequestCache, RequestKey};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// Benchmark Fixtures
// ============================================================================

fn job(id: i64, request_id: i64) -> Job {
    Job {
        id,
        description: Some("Replace worn part".to_string()),
        job_name: format!("Job {}", id),
        cost: 150.0 + id as f64 * 12.25,
        service_request_id: Some(request_id),
        user_id: Some(1),
        user_name: Some("Technician".to_string()),
        service_template_id: None,
        service_template_name: None,
    }
}

fn service_request(job_count: usize) -> ServiceRequest {
    ServiceRequest {
        id: 1,
        description: "Periodic maintenance".to_string(),
        status: ServiceRequestStatus::Completed,
        vehicle_id: Some(7),
        vehicle_number: Some("KA-01-1234".to_string()),
        customer_id: Some(3),
        customer_name: Some("Asha Rao".to_string()),
        jobs: Some((0..job_count as i64).map(|id| job(id, 1)).collect()),
    }
}

fn service_requests(count: usize) -> Vec<ServiceRequest> {
    (0..count)
        .map(|i| ServiceRequest {
            id: i as i64,
            ..service_request(3)
        })
        .collect()
}

// ============================================================================
// Group 1: InMemory Backend Benchmarks
// ============================================================================

fn inmemory_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_backend");
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    for size in [100, 1_000, 10_000].iter() {
        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("set", size), size, |b, &size| {
                let backend = InMemoryBackend::new();
                let value = vec![1u8; size];

                b.to_async(&rt).iter(|| async {
                    backend
                        .set(black_box("GET /customers"), black_box(value.clone()), None)
                        .await
                        .expect("Failed to set")
                });
            });

        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("get_hit", size), size, |b, &size| {
                let backend = InMemoryBackend::new();
                rt.block_on(async {
                    backend
                        .set("GET /customers", vec![1u8; size], None)
                        .await
                        .expect("Failed to set");
                });

                b.to_async(&rt)
                    .iter(|| async { backend.get(black_box("GET /customers")).await });
            });
    }

    group.bench_function("delete", |b| {
        let backend = InMemoryBackend::new();
        let value = vec![1u8; 1000];

        b.to_async(&rt).iter(|| async {
            backend
                .set("GET /vehicles", value.clone(), None)
                .await
                .expect("Failed to set");
            backend.delete(black_box("GET /vehicles")).await
        });
    });

    group.finish();
}

// ============================================================================
// Group 2: RequestCache Benchmarks
// ============================================================================

fn request_cache_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_cache");
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    for count in [10, 100, 1_000].iter() {
        // Fresh hit: lookup + envelope decode, loader never runs
        group.bench_with_input(BenchmarkId::new("fresh_hit", count), count, |b, &count| {
            let cache = RequestCache::new(CacheConfig::default());
            let key = RequestKey::read("/service-requests");
            let payload = service_requests(count);

            rt.block_on(async {
                let seed = payload.clone();
                cache
                    .fetch(&key, move || async move { Ok(seed) })
                    .await
                    .expect("Failed to populate cache");
            });

            b.to_async(&rt).iter(|| async {
                let list: Vec<ServiceRequest> = cache
                    .fetch(black_box(&key), || async {
                        Ok::<Vec<ServiceRequest>, _>(Vec::new())
                    })
                    .await
                    .expect("fresh hit");
                list
            });
        });
    }

    // Miss: new key every iteration, so every read spawns a load
    group.bench_function("miss", |b| {
        let cache = RequestCache::new(CacheConfig::default());
        let counter = Arc::new(AtomicU64::new(0));

        b.to_async(&rt).iter(|| {
            let cache = cache.clone();
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                let key = RequestKey::item("/customers", &n);
                cache
                    .fetch(&key, || async { Ok(service_request(4)) })
                    .await
            }
        });
    });

    group.bench_function("invalidate", |b| {
        let cache = RequestCache::new(CacheConfig::default());
        let key = RequestKey::read("/invoices");

        b.to_async(&rt).iter(|| async {
            cache
                .fetch_with(black_box(&key), ReadStrategy::Invalidate, || async {
                    Ok(service_request(4))
                })
                .await
        });
    });

    group.finish();
}

// ============================================================================
// Group 3: Invoice Computation Benchmarks
// ============================================================================

fn invoice_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoice_amounts");

    for jobs in [1, 10, 100, 1_000].iter() {
        let request = service_request(*jobs);
        let costs = request.job_costs();

        group
            .throughput(Throughput::Elements(*jobs as u64))
            .bench_with_input(BenchmarkId::new("compute", jobs), &costs, |b, costs| {
                b.iter(|| {
                    InvoiceAmounts::compute(
                        black_box(costs.iter().copied()),
                        black_box(18.0),
                        black_box(10.0),
                    )
                });
            });
    }

    group.bench_function("formatted", |b| {
        let amounts = InvoiceAmounts::compute([500.0, 1200.5], 18.0, 10.0);
        b.iter(|| black_box(&amounts).formatted());
    });

    group.finish();
}

// ============================================================================
// Group 4: Serialization Benchmarks
// ============================================================================

fn serialization_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for count in [10, 100, 1_000].iter() {
        let list = service_requests(*count);

        group.bench_with_input(BenchmarkId::new("serialize", count), &list, |b, list| {
            b.iter(|| serialize_for_cache(black_box(list)));
        });

        let bytes = serialize_for_cache(&list).expect("Failed to serialize");
        group
            .throughput(Throughput::Bytes(bytes.len() as u64))
            .bench_with_input(BenchmarkId::new("deserialize", count), &bytes, |b, bytes| {
                b.iter(|| deserialize_from_cache::<Vec<ServiceRequest>>(black_box(bytes)));
            });
    }

    group.finish();
}

// ============================================================================
// Benchmark Registration
// ============================================================================

criterion_group!(
    benches,
    inmemory_benchmarks,
    request_cache_benchmarks,
    invoice_benchmarks,
    serialization_benchmarks
);
criterion_main!(benches);
