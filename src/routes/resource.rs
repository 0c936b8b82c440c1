//! Route registration for one resource: only enabled operations get an endpoint,
//! each wrapped in its own guard chain.

use crate::config::{DEFAULT_BODY_LIMIT, Operation, ResolvedResource};
use crate::guard::{enforce_guards, Guard, GuardChain};
use crate::handlers::{create, delete as delete_handler, list, read, update};
use crate::state::CrudState;
use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

pub struct CrudRoutes {
    resource: Arc<ResolvedResource>,
    pool: SqlitePool,
    guards: HashMap<Operation, Vec<Arc<dyn Guard>>>,
    body_limit: usize,
}

impl CrudRoutes {
    pub fn new(resource: ResolvedResource, pool: SqlitePool) -> Self {
        CrudRoutes {
            resource: Arc::new(resource),
            pool,
            guards: HashMap::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Attach a guard to one operation. Guards run in the order they are added.
    pub fn guard<G: Guard>(mut self, op: Operation, guard: G) -> Self {
        self.guards.entry(op).or_default().push(Arc::new(guard));
        self
    }

    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    fn guarded(&self, op: Operation, route: MethodRouter<CrudState>) -> MethodRouter<CrudState> {
        match self.guards.get(&op) {
            Some(guards) if !guards.is_empty() => route.route_layer(middleware::from_fn_with_state(
                GuardChain::new(guards.clone()),
                enforce_guards,
            )),
            _ => route,
        }
    }

    pub fn into_router(self) -> Router {
        let collection = self.resource.collection_path();
        let member = self.resource.member_path();
        let mut by_path: BTreeMap<String, MethodRouter<CrudState>> = BTreeMap::new();

        for &op in &self.resource.operations {
            let route = match op {
                Operation::List => get(list),
                Operation::Create => post(create),
                Operation::Get => get(read),
                Operation::Update => put(update),
                Operation::Delete => delete(delete_handler),
            };
            let route = self.guarded(op, route);
            let paths = match op {
                Operation::List | Operation::Create => vec![collection.clone(), format!("{}/", collection)],
                Operation::Get | Operation::Update | Operation::Delete => vec![member.clone()],
            };
            for path in paths {
                tracing::info!(table = %self.resource.table, operation = %op, path = %path, "registered route");
                let merged = match by_path.remove(&path) {
                    Some(existing) => existing.merge(route.clone()),
                    None => route.clone(),
                };
                by_path.insert(path, merged);
            }
        }

        let state = CrudState {
            pool: self.pool,
            resource: self.resource,
        };
        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, route)| router.route(&path, route))
            .layer(RequestBodyLimitLayer::new(self.body_limit))
            .with_state(state)
    }
}
