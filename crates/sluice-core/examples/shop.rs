//! Small shop API served over HTTP
//!
//! ```sh
//! cargo run -p sluice-core --example shop --features native -- crates/sluice-core/examples/shop.toml
//! curl 'localhost:3000/api/items?id=7'
//! curl -X POST localhost:3000/api/orders -d '{"item":7,"qty":2}'
//! ```

use serde::{Deserialize, Serialize};
use sluice_core::{
    logging, AppConfig, Application, Binding, BoxError, Catalog, Controller, Dispatcher, Json,
    Routes, Server,
};

struct ShopApp;

impl Application for ShopApp {
    const COMPONENT_SCAN: Option<&'static str> = Some("");

    fn create() -> Result<Self, BoxError> {
        Ok(ShopApp)
    }
}

#[derive(Serialize)]
struct Item {
    id: i64,
    name: String,
    price: f64,
}

struct Items;

impl Items {
    fn find(&self, id: i64) -> Result<Item, BoxError> {
        Ok(Item {
            id,
            name: format!("item #{id}"),
            price: 4.5 * id as f64,
        })
    }

    fn search(&self, q: Option<String>, limit: Option<i32>) -> Result<Vec<String>, BoxError> {
        let q = q.unwrap_or_else(|| "anything".to_string());
        Ok((1..=limit.unwrap_or(3)).map(|n| format!("{q} {n}")).collect())
    }
}

impl Controller for Items {
    const PATH: Option<&'static str> = Some("/items");

    fn create() -> Result<Self, BoxError> {
        Ok(Items)
    }

    fn routes(routes: &mut Routes<Self>) {
        routes
            .get("", Self::find, &[Binding::query("id")])
            .get("/search", Self::search, &[Binding::optional("q"), Binding::optional("limit")]);
    }
}

#[derive(Deserialize)]
struct NewOrder {
    item: i64,
    qty: u32,
}

#[derive(Serialize)]
struct Receipt {
    item: i64,
    qty: u32,
    total: f64,
}

struct Orders;

impl Orders {
    fn place(&self, order: Json<NewOrder>) -> Result<Receipt, BoxError> {
        if order.qty == 0 {
            return Err("quantity must be positive".into());
        }
        Ok(Receipt {
            item: order.item,
            qty: order.qty,
            total: 4.5 * order.item as f64 * order.qty as f64,
        })
    }
}

impl Controller for Orders {
    const PATH: Option<&'static str> = Some("/orders");

    fn create() -> Result<Self, BoxError> {
        Ok(Orders)
    }

    fn routes(routes: &mut Routes<Self>) {
        routes.post("", Self::place, &[Binding::Body]);
    }
}

struct Health;

impl Health {
    fn status(&self) -> Result<&'static str, BoxError> {
        Ok("ok")
    }
}

impl Controller for Health {
    fn create() -> Result<Self, BoxError> {
        Ok(Health)
    }

    fn routes(routes: &mut Routes<Self>) {
        routes.get("/status", Self::status, &[]);
    }
}

sluice_core::application!(ShopApp);
sluice_core::controller!(Items);
sluice_core::controller!(Orders);
sluice_core::controller!(Health);

fn main() -> Result<(), BoxError> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig {
            entry_point: Some(std::any::type_name::<ShopApp>().to_string()),
            context_path: Some("/api".to_string()),
            ..Default::default()
        },
    };
    logging::init(&config.logging);

    let dispatcher = Dispatcher::bootstrap(&config, &Catalog::discover())?;
    for (method, path, route) in dispatcher.registry().routes() {
        tracing::info!(%method, %path, handler = route.descriptor.method_name(), "Mapped route");
    }
    Server::new(dispatcher, config.server).run()?;
    Ok(())
}
