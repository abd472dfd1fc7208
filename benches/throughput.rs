//! Throughput benchmarks for the storage core: ziplist encode/decode
//! and database put/get under TTL pressure.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::time::{Duration, Instant};
use zipkv::storage::{DataEntity, Database, ExpireStrategy, ZipList};

fn bench_ziplist_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("ziplist_push");
    group.throughput(Throughput::Elements(1));

    group.bench_function("push_small_int", |b| {
        let mut zl = ZipList::new();
        let mut i = 0u64;
        b.iter(|| {
            zl.push((i % 100).to_string().as_bytes()).unwrap();
            i += 1;
        });
    });

    group.bench_function("push_short_string", |b| {
        let mut zl = ZipList::new();
        b.iter(|| {
            zl.push(b"short-value").unwrap();
        });
    });

    group.bench_function("push_medium_string", |b| {
        let mut zl = ZipList::new();
        let value = vec![b'x'; 1024];
        b.iter(|| {
            zl.push(&value).unwrap();
        });
    });

    group.finish();
}

fn bench_ziplist_index(c: &mut Criterion) {
    let mut zl = ZipList::new();
    for i in 0..1000 {
        zl.push(format!("entry-{}", i).as_bytes()).unwrap();
    }

    let mut group = c.benchmark_group("ziplist_index");
    group.throughput(Throughput::Elements(1));

    group.bench_function("index_front", |b| {
        b.iter(|| black_box(zl.index(0).unwrap()));
    });

    group.bench_function("index_back", |b| {
        b.iter(|| black_box(zl.index(999).unwrap()));
    });

    group.finish();
}

fn bench_database_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("database");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put", |b| {
        let mut db = Database::new(0);
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            db.put_entity(key, DataEntity::Bytes(Bytes::from_static(b"value")));
            i += 1;
        });
    });

    group.bench_function("get_existing", |b| {
        let mut db = Database::new(0);
        for i in 0..100_000u64 {
            let key = Bytes::from(format!("key:{}", i));
            db.put_entity(key, DataEntity::Bytes(Bytes::from_static(b"value")));
        }
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i % 100_000));
            black_box(db.get_entity(&key));
            i += 1;
        });
    });

    group.bench_function("get_with_live_ttl", |b| {
        let mut db = Database::new(0);
        let deadline = Instant::now() + Duration::from_secs(3600);
        for i in 0..10_000u64 {
            let key = Bytes::from(format!("key:{}", i));
            db.put_entity(key.clone(), DataEntity::Bytes(Bytes::from_static(b"value")));
            db.expire(key, deadline);
        }
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i % 10_000));
            black_box(db.get_entity(&key));
            i += 1;
        });
    });

    group.finish();
}

fn bench_active_expire(c: &mut Criterion) {
    c.bench_function("active_expire_heap_cycle", |b| {
        b.iter_batched(
            || {
                let mut db = Database::new(0);
                let deadline = Instant::now() - Duration::from_millis(1);
                for i in 0..1000u64 {
                    let key = Bytes::from(format!("key:{}", i));
                    db.put_entity(key.clone(), DataEntity::Bytes(Bytes::from_static(b"v")));
                    db.expire(key, deadline);
                }
                db
            },
            |mut db| black_box(db.active_expire(ExpireStrategy::HeapDriven)),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_ziplist_push,
    bench_ziplist_index,
    bench_database_ops,
    bench_active_expire
);
criterion_main!(benches);
