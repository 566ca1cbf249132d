use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use shopdesk_core::{EmployeeId, PoolId, ProductId, ShopId};
use shopdesk_infra::{CatalogService, LedgerStore, MovementService, PoolService};
use shopdesk_inventory::{
    Direction, MovementFilter, MovementRequest, MovementType, NewEmployee, NewPool, NewProduct,
    PageRequest, plan_adjustment,
};

struct Ledger {
    movements: MovementService,
    product: ProductId,
    employee: EmployeeId,
    pool: PoolId,
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn setup_ledger() -> Ledger {
    let store = LedgerStore::open_in_memory().await.unwrap();
    let catalog = CatalogService::new(store.clone());
    let shop = ShopId::new();
    let product = catalog
        .register_product(NewProduct {
            shop_id: shop,
            name: "Bench item".to_string(),
            sku: "BENCH-1".to_string(),
            unit_cost: 100,
        })
        .await
        .unwrap();
    let employee = catalog
        .register_employee(NewEmployee {
            shop_id: shop,
            name: "Bench".to_string(),
            role: "clerk".to_string(),
        })
        .await
        .unwrap();
    let pool = PoolService::new(store.clone())
        .create_pool(NewPool {
            shop_id: shop,
            name: "Bench pool".to_string(),
            value: 0,
            description: None,
        })
        .await
        .unwrap();

    Ledger {
        movements: MovementService::new(store),
        product: product.id,
        employee: employee.id,
        pool: pool.id,
    }
}

fn request(
    ledger: &Ledger,
    movement_type: MovementType,
    direction: Direction,
    quantity: i64,
) -> MovementRequest {
    MovementRequest {
        product_id: ledger.product,
        movement_type,
        quantity,
        direction,
        source_pool_id: ledger.pool,
        destination_pool_id: None,
        supplier_id: None,
        reason: None,
        performed_by: ledger.employee,
        cost_per_unit: 100,
        transaction_ref: None,
        idempotency_key: None,
    }
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");

    group.bench_function("movement_request", |b| {
        let req = MovementRequest {
            product_id: ProductId::new(),
            movement_type: MovementType::Transfer,
            quantity: 30,
            direction: Direction::Transfer,
            source_pool_id: PoolId::new(),
            destination_pool_id: Some(PoolId::new()),
            supplier_id: None,
            reason: Some("restock front shelf".to_string()),
            performed_by: EmployeeId::new(),
            cost_per_unit: 250,
            transaction_ref: None,
            idempotency_key: None,
        };
        b.iter(|| black_box(req.clone().validate().unwrap()));
    });

    group.bench_function("plan_adjustment", |b| {
        b.iter(|| black_box(plan_adjustment(black_box(50), black_box(42)).unwrap()));
    });

    group.finish();
}

fn bench_movement_apply(c: &mut Criterion) {
    let rt = runtime();
    let ledger = rt.block_on(setup_ledger());
    let mut group = c.benchmark_group("movement_apply");
    group.throughput(Throughput::Elements(1));

    group.bench_function("receive", |b| {
        b.iter(|| {
            let req = request(&ledger, MovementType::Added, Direction::Inbound, 5);
            black_box(rt.block_on(ledger.movements.create_movement(req)).unwrap());
        });
    });

    // Receive and sell in pairs so the level never runs out.
    group.throughput(Throughput::Elements(2));
    group.bench_function("receive_then_sell", |b| {
        b.iter(|| {
            let receive = request(&ledger, MovementType::Added, Direction::Inbound, 5);
            let sell = request(&ledger, MovementType::Sold, Direction::Outbound, 5);
            rt.block_on(async {
                ledger.movements.create_movement(receive).await.unwrap();
                black_box(ledger.movements.create_movement(sell).await.unwrap());
            });
        });
    });

    group.finish();
}

fn bench_history_query(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("history_query");

    for history in [10, 100, 1000].iter() {
        let ledger = rt.block_on(async {
            let ledger = setup_ledger().await;
            for _ in 0..*history {
                let req = request(&ledger, MovementType::Added, Direction::Inbound, 1);
                ledger.movements.create_movement(req).await.unwrap();
            }
            ledger
        });
        let filter = MovementFilter {
            pool_id: Some(ledger.pool),
            ..MovementFilter::default()
        };

        group.bench_with_input(BenchmarkId::new("first_page", history), history, |b, _| {
            b.iter(|| {
                let page = PageRequest::new(1, 50).unwrap();
                black_box(
                    rt.block_on(ledger.movements.list_movements(filter.clone(), page))
                        .unwrap(),
                );
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validation, bench_movement_apply, bench_history_query);
criterion_main!(benches);
