//! Router construction: generated resource routes plus health/version.

mod common;
mod resource;

pub use common::{common_routes, common_routes_with_ready};
pub use resource::CrudRoutes;
