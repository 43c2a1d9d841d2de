//! Performance benchmarks for the marketplace hot paths.
//!
//! Measures:
//! - Checkout latency by basket size (validate, reserve, commit)
//! - Catalog replacement by catalog size
//! - Offer listing over a populated store
//! - A one-row basket write as the number of placed orders grows

use std::fmt::Write as _;
use std::sync::Arc;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use procura_auth::Principal;
use procura_catalog::OfferFilter;
use procura_core::{ContactId, StockRecordId, UserId};
use procura_events::NoopNotifier;
use procura_infra::{Marketplace, MarketStore};
use procura_orders::ContactDraft;

fn catalog_yaml(shop: &str, goods: usize, quantity: u32) -> String {
    let mut yaml = format!("shop: {shop}\ncategories:\n  - id: 1\n    name: Bench\ngoods:\n");
    for i in 0..goods {
        let _ = write!(
            yaml,
            "  - id: {i}\n    category: 1\n    name: Good {i}\n    price: 9.99\n    price_rrc: 12\n    quantity: {quantity}\n    parameters:\n      weight: {i}\n"
        );
    }
    yaml
}

fn setup_market(goods: usize) -> (Marketplace, Principal, Vec<StockRecordId>) {
    let market = Marketplace::new(Arc::new(MarketStore::new()), Arc::new(NoopNotifier));
    let supplier = Principal::supplier(UserId::new());
    market
        .import_catalog_yaml(&supplier, &catalog_yaml("Bench Shop", goods, u32::MAX))
        .unwrap();
    let records = market
        .store()
        .read(|t| Ok(t.stock.keys().copied().collect()))
        .unwrap();
    (market, supplier, records)
}

fn buyer_with_basket(market: &Marketplace, records: &[StockRecordId]) -> (UserId, ContactId) {
    let buyer = UserId::new();
    let contact = market
        .add_contact(
            buyer,
            ContactDraft {
                city: "Москва".into(),
                street: "Тверская".into(),
                phone: "+79990000000".into(),
                ..ContactDraft::default()
            },
        )
        .unwrap()
        .id;
    for record in records {
        market.add_item(buyer, *record, 1).unwrap();
    }
    (buyer, contact)
}

fn bench_checkout_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkout_latency");

    for lines in [1usize, 10, 50].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::new("confirm", lines), lines, |b, &lines| {
            let (market, _, records) = setup_market(lines);
            b.iter_batched(
                || buyer_with_basket(&market, &records),
                |(buyer, contact)| black_box(market.confirm(buyer, contact).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_catalog_replacement(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_replacement");

    for goods in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*goods as u64));
        group.bench_with_input(BenchmarkId::new("import_yaml", goods), goods, |b, &goods| {
            let (market, supplier, _) = setup_market(goods);
            let yaml = catalog_yaml("Bench Shop", goods, 10);
            b.iter(|| black_box(market.import_catalog_yaml(&supplier, black_box(&yaml)).unwrap()));
        });
    }

    group.finish();
}

fn bench_offer_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("offer_listing");

    for goods in [100usize, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("list_offers", goods), goods, |b, &goods| {
            let (market, _, _) = setup_market(goods);
            b.iter(|| black_box(market.list_offers(OfferFilter::default()).unwrap()));
        });
    }

    group.finish();
}

fn bench_basket_write_by_store_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket_write");

    for orders in [0usize, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("get_or_create_basket", orders), orders, |b, &orders| {
            let (market, _, records) = setup_market(1);
            for _ in 0..orders {
                let (buyer, contact) = buyer_with_basket(&market, &records);
                market.confirm(buyer, contact).unwrap();
            }
            b.iter(|| black_box(market.get_or_create_basket(UserId::new()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_checkout_latency,
    bench_catalog_replacement,
    bench_offer_listing,
    bench_basket_write_by_store_size
);
criterion_main!(benches);
