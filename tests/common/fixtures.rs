//! Canned catalog API responses and mock helpers

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// JSON body of a product-detail response for the given numeric id
pub fn product_json(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Product {id}"),
        "url_key": format!("product-{id}"),
        "price": 1000.0 * id as f64,
        "description": format!("<p>Description of product {id}</p>"),
        "thumbnail_url": format!("https://cdn.example.com/{id}.jpg"),
    })
}

/// Mount a 200 response for one identifier, expecting `expected` requests
pub async fn mount_product(server: &MockServer, pid: &str, id: i64, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{pid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(id)))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mount a fixed status response for one identifier, expecting `expected` requests
pub async fn mount_status(server: &MockServer, pid: &str, status: u16, expected: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{pid}")))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mount a response that answers 429 for the first `throttled` requests and
/// 200 afterwards
pub async fn mount_throttled_then_product(
    server: &MockServer,
    pid: &str,
    id: i64,
    throttled: u64,
) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{pid}")))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(throttled)
        .expect(throttled)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/products/{pid}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(id)))
        .mount(server)
        .await;
}
