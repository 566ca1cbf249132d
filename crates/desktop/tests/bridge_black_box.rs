//! Drives the bridge with raw JSON lines, the way the UI process does.

use serde_json::{Value, json};

use shopdesk_desktop::Bridge;
use shopdesk_infra::LedgerStore;

struct Session {
    bridge: Bridge,
    shop: String,
    product: String,
    employee: String,
}

async fn call(bridge: &Bridge, request: Value) -> Value {
    let line = bridge.handle_line(&request.to_string()).await;
    serde_json::from_str(&line).unwrap()
}

async fn session() -> Session {
    let bridge = Bridge::new(LedgerStore::open_in_memory().await.unwrap());
    let shop = uuid_string();

    let product = call(
        &bridge,
        json!({
            "method": "registerProduct",
            "params": { "shopId": shop, "name": "Oat milk 1L", "sku": "OAT-1L", "unitCost": 180 }
        }),
    )
    .await;
    let employee = call(
        &bridge,
        json!({
            "method": "registerEmployee",
            "params": { "shopId": shop, "name": "Robin", "role": "barista" }
        }),
    )
    .await;

    Session {
        shop,
        product: product["product"]["id"].as_str().unwrap().to_string(),
        employee: employee["employee"]["id"].as_str().unwrap().to_string(),
        bridge,
    }
}

fn uuid_string() -> String {
    shopdesk_core::ShopId::new().to_string()
}

impl Session {
    async fn pool(&self, name: &str) -> String {
        let created = call(
            &self.bridge,
            json!({ "method": "createPool", "params": { "shopId": self.shop, "name": name } }),
        )
        .await;
        assert_eq!(created["success"], true, "{created}");
        assert_eq!(created["pool"]["level"], 0);
        created["pool"]["id"].as_str().unwrap().to_string()
    }

    async fn movement(&self, params: Value) -> Value {
        let mut params = params;
        params["productId"] = json!(self.product);
        params["performedById"] = json!(self.employee);
        call(&self.bridge, json!({ "method": "createMovement", "params": params })).await
    }

    async fn receive(&self, pool: &str, quantity: i64) -> Value {
        self.movement(json!({
            "movementType": "added",
            "direction": "inbound",
            "quantity": quantity,
            "sourcePoolId": pool,
            "costPerUnit": 150,
        }))
        .await
    }

    async fn level(&self, pool: &str) -> i64 {
        let request = json!({ "method": "getPool", "params": { "poolId": pool } });
        let found = call(&self.bridge, request).await;
        found["pool"]["level"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn transfer_scenario() {
    let s = session().await;
    let a = s.pool("Stockroom").await;
    let b = s.pool("Fridge").await;
    assert_eq!(s.receive(&a, 100).await["success"], true);

    let moved = s
        .movement(json!({
            "movementType": "transfer",
            "direction": "transfer",
            "quantity": 30,
            "sourcePoolId": a,
            "costPerUnit": 0,
            "destinationPoolId": b,
            "reason": "morning restock",
        }))
        .await;

    assert_eq!(moved["success"], true, "{moved}");
    assert_eq!(moved["movement"]["movementType"], "transfer");
    assert_eq!(moved["movement"]["destinationPoolId"], json!(b));
    assert_eq!(s.level(&a).await, 70);
    assert_eq!(s.level(&b).await, 30);

    let transfers = call(
        &s.bridge,
        json!({
            "method": "listMovements",
            "params": { "movementType": "transfer", "page": 1, "limit": 10 }
        }),
    )
    .await;
    assert_eq!(transfers["totalCount"], 1);
    assert_eq!(transfers["pageCount"], 1);
}

#[tokio::test]
async fn adjustment_scenario() {
    let s = session().await;
    let a = s.pool("Stockroom").await;
    s.receive(&a, 50).await;

    let adjusted = call(
        &s.bridge,
        json!({
            "method": "createAdjustment",
            "params": {
                "productId": s.product,
                "poolId": a,
                "physicalCount": 42,
                "reason": "cycle count",
                "performedById": s.employee,
            }
        }),
    )
    .await;

    assert_eq!(adjusted["success"], true, "{adjusted}");
    assert_eq!(adjusted["level"], 42);
    let record = &adjusted["adjustment"];
    assert_eq!(record["discrepancy"], -8);
    assert_eq!(record["systemCount"], 50);
    assert_eq!(record["physicalCount"], 42);
    assert_eq!(record["direction"], "outbound");
    assert_eq!(record["quantity"], 8);
    assert_eq!(record["reason"], "cycle count");
    assert_eq!(record["costPerUnit"], 180);

    let again = call(
        &s.bridge,
        json!({
            "method": "createAdjustment",
            "params": {
                "productId": s.product,
                "poolId": a,
                "physicalCount": 42,
                "reason": "recount",
                "performedById": s.employee,
            }
        }),
    )
    .await;
    assert_eq!(again["success"], true);
    assert_eq!(again["adjustment"], Value::Null);
    assert_eq!(again["level"], 42);
}

#[tokio::test]
async fn second_page_holds_items_eleven_to_twenty() {
    let s = session().await;
    let a = s.pool("Stockroom").await;
    for quantity in 1..=25 {
        s.receive(&a, quantity).await;
    }

    let first = call(
        &s.bridge,
        json!({ "method": "listMovements", "params": { "poolId": a, "page": 1, "limit": 10 } }),
    )
    .await;
    let second = call(
        &s.bridge,
        json!({ "method": "listMovements", "params": { "poolId": a, "page": 2, "limit": 10 } }),
    )
    .await;

    assert_eq!(second["totalCount"], 25);
    assert_eq!(second["pageCount"], 3);
    let first_ids: Vec<&Value> = first["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| &m["id"])
        .collect();
    let second_items = second["items"].as_array().unwrap();
    assert_eq!(second_items.len(), 10);
    assert!(second_items.iter().all(|m| !first_ids.contains(&&m["id"])));
}

#[tokio::test]
async fn failures_come_back_as_error_kinds() {
    let s = session().await;
    let a = s.pool("Till").await;
    s.receive(&a, 10).await;

    let oversold = s
        .movement(json!({
            "movementType": "sold",
            "direction": "outbound",
            "quantity": 15,
            "sourcePoolId": a,
            "costPerUnit": 0,
        }))
        .await;
    assert_eq!(oversold["success"], false);
    assert_eq!(oversold["errorKind"], "InsufficientStockError");
    assert_eq!(s.level(&a).await, 10);

    let zero = s
        .movement(json!({
            "movementType": "sold",
            "direction": "outbound",
            "quantity": 0,
            "sourcePoolId": a,
            "costPerUnit": 0,
        }))
        .await;
    assert_eq!(zero["errorKind"], "ValidationError");

    let no_cost = s
        .movement(json!({
            "movementType": "sold",
            "direction": "outbound",
            "quantity": 1,
            "sourcePoolId": a,
        }))
        .await;
    assert_eq!(no_cost["errorKind"], "ValidationError");
    assert_eq!(s.level(&a).await, 10);

    let missing = call(
        &s.bridge,
        json!({ "method": "getPool", "params": { "poolId": uuid_string() } }),
    )
    .await;
    assert_eq!(missing["errorKind"], "NotFoundError");

    let bad_id = call(
        &s.bridge,
        json!({ "method": "getPool", "params": { "poolId": "not-a-uuid" } }),
    )
    .await;
    assert_eq!(bad_id["errorKind"], "ValidationError");

    let unknown = call(&s.bridge, json!({ "method": "dropTables", "params": {} })).await;
    assert_eq!(unknown["errorKind"], "ValidationError");

    let garbage: Value = serde_json::from_str(&s.bridge.handle_line("{not json").await).unwrap();
    assert_eq!(garbage["success"], false);
    assert_eq!(garbage["errorKind"], "ValidationError");
}

#[tokio::test]
async fn pools_can_be_renamed_and_retired() {
    let s = session().await;
    let a = s.pool("Window").await;

    let renamed = call(
        &s.bridge,
        json!({ "method": "updatePool", "params": { "poolId": a, "name": "Window display" } }),
    )
    .await;
    assert_eq!(renamed["pool"]["name"], "Window display");

    let retired = call(
        &s.bridge,
        json!({ "method": "deactivatePool", "params": { "poolId": a } }),
    )
    .await;
    assert_eq!(retired["pool"]["active"], false);

    let active = call(
        &s.bridge,
        json!({ "method": "listPools", "params": { "shopId": s.shop } }),
    )
    .await;
    assert_eq!(active["pools"], json!([]));

    let all = call(
        &s.bridge,
        json!({ "method": "listPools", "params": { "shopId": s.shop, "includeInactive": true } }),
    )
    .await;
    assert_eq!(all["pools"].as_array().unwrap().len(), 1);

    let refused = s.receive(&a, 5).await;
    assert_eq!(refused["errorKind"], "ValidationError");
}

#[tokio::test]
async fn supplier_delivery_is_linked() {
    let s = session().await;
    let a = s.pool("Stockroom").await;
    let supplier = call(
        &s.bridge,
        json!({
            "method": "registerSupplier",
            "params": { "shopId": s.shop, "name": "Dairy Direct", "contact": "+44 20 7946 0000" }
        }),
    )
    .await;
    let supplier_id = supplier["supplier"]["id"].clone();

    let delivered = s
        .movement(json!({
            "movementType": "added",
            "direction": "inbound",
            "quantity": 12,
            "sourcePoolId": a,
            "supplierId": supplier_id,
            "costPerUnit": 95,
            "transactionRef": "DN-5521",
        }))
        .await;
    assert_eq!(delivered["movement"]["supplierId"], supplier_id);
    assert_eq!(delivered["movement"]["totalCost"], 12 * 95);

    let id = delivered["movement"]["id"].clone();
    let fetched = call(
        &s.bridge,
        json!({ "method": "getMovement", "params": { "movementId": id } }),
    )
    .await;
    assert_eq!(fetched["movement"], delivered["movement"]);
}
