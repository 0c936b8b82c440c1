//! OpenAPI document for registered resources, grouped by each resource's tags.

use crate::config::{Operation, ResolvedResource};
use axum::{routing::get, Json, Router};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::openapi::path::{
    Operation as ApiOperation, OperationBuilder, ParameterBuilder, ParameterIn, PathItem, PathsBuilder,
};
use utoipa::openapi::{Info, OpenApi, OpenApiBuilder, Required, Response};

fn query_param(name: &str, description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
}

fn operation(resource: &ResolvedResource, op: Operation) -> ApiOperation {
    let mut builder = OperationBuilder::new()
        .tags(Some(resource.tags.clone()))
        .operation_id(Some(format!("{}_{}", op, resource.prefix.replace('/', "_"))));
    builder = match op {
        Operation::List => builder
            .summary(Some(format!("List {}", resource.table)))
            .parameter(query_param("skip", "Records to skip (default 0)"))
            .parameter(query_param("limit", "Maximum records to return (default 100)"))
            .parameter(query_param("sort_by", "Field to sort by"))
            .parameter(query_param("sort_dir", "asc or desc"))
            .parameter(query_param("filters", "Equality filter as field:value, repeatable"))
            .response("200", Response::new("Matching records")),
        Operation::Create => builder
            .summary(Some(format!("Create a {} record", resource.table)))
            .response("201", Response::new("Created record"))
            .response("422", Response::new("Invalid body")),
        Operation::Get => builder
            .summary(Some(format!("Get a {} record", resource.table)))
            .response("200", Response::new("The record"))
            .response("404", Response::new("Not found")),
        Operation::Update => builder
            .summary(Some(format!("Update a {} record", resource.table)))
            .response("200", Response::new("Updated record"))
            .response("404", Response::new("Not found"))
            .response("422", Response::new("Invalid body")),
        Operation::Delete => builder
            .summary(Some(format!("Delete a {} record", resource.table)))
            .response("204", Response::new("Deleted"))
            .response("404", Response::new("Not found")),
    };
    if matches!(op, Operation::Get | Operation::Update | Operation::Delete) {
        builder = builder.parameter(
            ParameterBuilder::new()
                .name(resource.primary_key.as_str())
                .parameter_in(ParameterIn::Path)
                .required(Required::True),
        );
    }
    builder.build()
}

/// Build the document for a set of resources.
pub fn document(title: &str, resources: &[&ResolvedResource]) -> OpenApi {
    let mut items: BTreeMap<String, PathItem> = BTreeMap::new();
    for resource in resources {
        let collection = format!("/{}", resource.prefix);
        let member = format!("/{}/{{{}}}", resource.prefix, resource.primary_key);
        for &op in &resource.operations {
            let operation = operation(resource, op);
            match op {
                Operation::List => items.entry(collection.clone()).or_default().get = Some(operation),
                Operation::Create => items.entry(collection.clone()).or_default().post = Some(operation),
                Operation::Get => items.entry(member.clone()).or_default().get = Some(operation),
                Operation::Update => items.entry(member.clone()).or_default().put = Some(operation),
                Operation::Delete => items.entry(member.clone()).or_default().delete = Some(operation),
            }
        }
    }
    let paths = items
        .into_iter()
        .fold(PathsBuilder::new(), |paths, (path, item)| paths.path(path, item));
    OpenApiBuilder::new()
        .info(Info::new(title, env!("CARGO_PKG_VERSION")))
        .paths(paths)
        .build()
}

/// GET /openapi.json serving a prebuilt document.
pub fn openapi_route(doc: OpenApi) -> Router {
    let doc = Arc::new(doc);
    Router::new().route(
        "/openapi.json",
        get(move || {
            let doc = doc.clone();
            async move { Json(doc.as_ref().clone()) }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, FieldConfig, FieldType, ResourceConfig};

    #[test]
    fn document_lists_enabled_operations_only() {
        let r = resolve(
            ResourceConfig::new("items")
                .field(FieldConfig::new("id", FieldType::Integer).not_null())
                .operations([Operation::List, Operation::Get])
                .tags(["inventory"]),
        )
        .unwrap();
        let doc = document("test", &[&r]);
        let json = serde_json::to_value(&doc).unwrap();
        let collection = &json["paths"]["/items"];
        assert_eq!(collection["get"]["tags"][0], "inventory");
        assert!(collection.get("post").is_none());
        assert!(json["paths"]["/items/{id}"]["get"].is_object());
        assert!(json["paths"]["/items/{id}"].get("delete").is_none());
    }
}
