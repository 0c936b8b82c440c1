//! Example consumer: serves an `items` table through crud-router.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Set `CONFIG_PATH` to a JSON file of resource configs to serve other tables.

use crud_router::{
    common_routes_with_ready, ensure_table, load_resources, openapi, resolve, BearerToken, CrudRoutes,
    FieldConfig, FieldType, Operation, ResourceConfig, ServerSettings,
};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;

fn items() -> ResourceConfig {
    ResourceConfig::new("items")
        .field(FieldConfig::new("id", FieldType::Integer).not_null())
        .field(FieldConfig::new("name", FieldType::Text).not_null())
        .field(FieldConfig::new("value", FieldType::Integer).not_null())
        .tags(["Items"])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crud_router=info,example_consumer=info")),
        )
        .init();

    let settings = ServerSettings::from_env()?;
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    let configs = match &settings.config_path {
        Some(path) => load_resources(path).await?,
        None => vec![items()],
    };

    let mut app = common_routes_with_ready(pool.clone());
    let mut resources = Vec::with_capacity(configs.len());
    for config in configs {
        let resource = resolve(config)?;
        ensure_table(&pool, &resource).await?;
        resources.push(resource.clone());
        let routes = CrudRoutes::new(resource, pool.clone())
            .body_limit(settings.body_limit)
            .guard(Operation::Create, BearerToken::new("fake-token"));
        app = app.merge(routes.into_router());
    }
    let doc = openapi::document("example-consumer", &resources.iter().collect::<Vec<_>>());
    let app = app.merge(openapi::openapi_route(doc));

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
