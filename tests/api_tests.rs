mod common;

use reqwest::StatusCode;
use serde_json::json;

use common::{FakeApi, Failure};
use imobportal::properfy::paths;

fn property_fixture() -> serde_json::Value {
    json!({
        "data": [
            {
                "id": 1,
                "chrCondoName": "Residencial Aurora",
                "chrType": "Apartamento",
                "chrAddressStreet": "Rua das Flores, 100",
                "chrAddressPostalCode": "01000-000",
                "chrAddressDistrict": "Centro",
                "chrTransactionType": "Venda",
                "chrPurpose": "Residencial",
                "chrCondition": "Novo",
                "dcmSale": 250000,
                "dcmAreaPrivate": 80,
                "intGarage": 1,
                "intBuiltYear": 2015,
                "dcmAddressLatitude": "-23.55",
                "dcmAddressLongitude": "-46.63"
            },
            {
                "id": 2,
                "chrCondoName": "Edificio Sol",
                "chrType": "Apartamento",
                "chrTransactionType": "Locação",
                "chrCondition": "Usado",
                "dcmSale": 1500000,
                "dcmAreaPrivate": 200,
                "intGarage": 2,
                "intBuiltYear": 1998,
                "dcmAddressLatitude": null,
                "dcmAddressLongitude": "-46.60"
            },
            {
                "id": 3,
                "chrType": "Casa",
                "intGarage": 2,
                "dcmAddressLatitude": -22.9,
                "dcmAddressLongitude": -43.2
            }
        ]
    })
}

// ── Properties ──────────────────────────────────────────────────

#[tokio::test]
async fn property_map_lists_only_located_properties() {
    let app = common::spawn_app_with(FakeApi::new().with(paths::PROPERTIES, property_fixture())).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/properties", &session).await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["condo_name"], "Residencial Aurora");
    assert_eq!(items[0]["type"], "Apartamento");
    assert_eq!(items[0]["latitude"], -23.55);
    assert_eq!(items[0]["longitude"], -46.63);

    common::cleanup(app).await;
}

#[tokio::test]
async fn property_map_charts_count_missing_as_na() {
    let app = common::spawn_app_with(FakeApi::new().with(paths::PROPERTIES, property_fixture())).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/properties/charts", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["labels"], json!(["Venda", "Locação", "N/A"]));
    assert_eq!(body["transaction"]["values"], json!([1, 1, 1]));
    assert_eq!(body["type"]["labels"], json!(["Apartamento", "Casa"]));
    assert_eq!(body["type"]["values"], json!([2, 1]));
    assert_eq!(body["purpose"]["labels"], json!(["Residencial", "N/A"]));
    assert_eq!(body["purpose"]["values"], json!([1, 2]));

    common::cleanup(app).await;
}

#[tokio::test]
async fn property_charts_report_statistics() {
    let app = common::spawn_app_with(FakeApi::new().with(paths::PROPERTIES, property_fixture())).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/charts", &session).await;
    assert_eq!(status, StatusCode::OK);

    let stats = &body["statistics"];
    assert_eq!(stats["total_properties"], 3);
    assert_eq!(stats["average_price"], 875000.0);
    assert_eq!(stats["average_area"], 140.0);
    assert_eq!(stats["average_year"], 2006.5);

    let charts = &body["charts"];
    assert_eq!(charts["garages"]["labels"], json!(["1 space", "2 spaces"]));
    assert_eq!(charts["garages"]["values"], json!([1, 2]));
    assert_eq!(charts["decades"]["labels"], json!(["1990s", "2010s"]));
    assert_eq!(charts["prices"]["values"], json!([0, 1, 0, 0, 1]));
    assert_eq!(charts["area_price"].as_array().unwrap().len(), 2);

    common::cleanup(app).await;
}

#[tokio::test]
async fn property_charts_omit_empty_charts() {
    let app = common::spawn_app_with(FakeApi::new().with(paths::PROPERTIES, json!([]))).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/charts", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["total_properties"], 0);
    assert_eq!(body["statistics"]["average_price"], 0.0);
    assert_eq!(body["charts"], json!({}));

    common::cleanup(app).await;
}

// ── Contracts ───────────────────────────────────────────────────

#[tokio::test]
async fn contracts_normalise_field_aliases() {
    let api = FakeApi::new().with(
        paths::RENTAL_CONTRACTS,
        json!([
            {
                "id": 10,
                "tenantName": "Ana",
                "chrPropertyName": "Apto 12",
                "rent_value": 2500,
                "startDate": "2024-01-01",
                "chrStatus": "Ativo"
            },
            { "id": 11, "tenant_name": "", "chrTenantName": "Bruno" }
        ]),
    );
    let app = common::spawn_app_with(api).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/contracts", &session).await;
    assert_eq!(status, StatusCode::OK);

    let contracts = body.as_array().unwrap();
    assert_eq!(contracts.len(), 2);
    assert_eq!(contracts[0]["tenant_name"], "Ana");
    assert_eq!(contracts[0]["property_name"], "Apto 12");
    assert_eq!(contracts[0]["rent_value"], 2500);
    assert_eq!(contracts[0]["start_date"], "2024-01-01");
    assert_eq!(contracts[0]["status"], "Ativo");
    assert!(contracts[0]["end_date"].is_null());
    assert_eq!(contracts[1]["tenant_name"], "Bruno");
    assert_eq!(contracts[1]["rent_value"], 0);

    common::cleanup(app).await;
}

// ── Leads ───────────────────────────────────────────────────────

#[tokio::test]
async fn lead_report_combines_three_collections() {
    let api = FakeApi::new()
        .with(
            paths::LEADS,
            json!({ "data": [
                { "chrAcquisitionChannel": "Site" },
                { "chrAcquisitionChannel": "Instagram" },
                { "chrAcquisitionChannel": "Site" },
                { "chrAcquisitionChannel": "" }
            ]}),
        )
        .with(
            paths::CARDS,
            json!([
                { "chrStatus": "Concluído" },
                { "chrStatus": "Em andamento" },
                { "chrStatus": "finalizado" },
                { "chrStatus": "Novo" }
            ]),
        )
        .with(
            paths::LEAD_INPUTS,
            json!([
                { "chrTransactionType": "Venda", "chrPipeline": "Funil A" },
                { "chrTransactionType": "Locação", "chrPipeline": "Funil A" }
            ]),
        );
    let app = common::spawn_app_with(api).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/leads", &session).await;
    assert_eq!(status, StatusCode::OK);

    let stats = &body["statistics"];
    assert_eq!(stats["total_leads"], 4);
    assert_eq!(stats["total_cards"], 4);
    assert_eq!(stats["completed_cards"], 2);
    assert_eq!(stats["conversion_rate"], 50.0);

    let charts = &body["charts"];
    assert_eq!(charts["channels"]["labels"], json!(["Site", "Instagram"]));
    assert_eq!(charts["channels"]["values"], json!([2, 1]));
    assert_eq!(charts["transactions"]["labels"], json!(["Venda", "Locação"]));
    assert_eq!(charts["pipeline"]["values"], json!([2]));

    common::cleanup(app).await;
}

#[tokio::test]
async fn lead_report_fails_when_any_collection_fails() {
    // Cards and lead inputs are missing, so the fake answers 404 for them
    let api = FakeApi::new().with(paths::LEADS, json!([]));
    let app = common::spawn_app_with(api).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/leads", &session).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());

    common::cleanup(app).await;
}

// ── Maintenance ─────────────────────────────────────────────────

#[tokio::test]
async fn maintenance_report_counts_statuses() {
    let api = FakeApi::new().with(
        paths::MAINTENANCE,
        json!([
            { "chrPriority": "Alta", "chrStatus": "Pendente", "responsible": "Carlos", "chrCategoryLabel": "Elétrica" },
            { "chrPriority": "Baixa", "chrStatus": "Concluído", "responsible": "Carlos", "chrCategoryLabel": "Hidráulica" },
            { "chrPriority": "alta", "chrStatus": "Finalizado" }
        ]),
    );
    let app = common::spawn_app_with(api).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/maintenance/charts", &session).await;
    assert_eq!(status, StatusCode::OK);

    let stats = &body["statistics"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["high_priority"], 2);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["completed"], 2);

    let charts = &body["charts"];
    assert_eq!(charts["priorities"]["labels"], json!(["Alta", "Baixa", "alta"]));
    assert_eq!(charts["responsibles"]["labels"], json!(["Carlos"]));
    assert_eq!(charts["responsibles"]["values"], json!([2]));
    assert_eq!(charts["categories"]["values"], json!([1, 1]));

    common::cleanup(app).await;
}

// ── Upstream failures ───────────────────────────────────────────

#[tokio::test]
async fn upstream_timeout_is_gateway_timeout() {
    let app = common::spawn_app_with(FakeApi::failing(Failure::Timeout)).await;
    let session = app.bootstrap().await;

    for path in ["/api/properties", "/api/charts", "/api/contracts", "/api/maintenance/charts"] {
        let (body, status) = app.get_json(path, &session).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT, "{path}");
        assert!(body["error"].is_string(), "{path}");
    }

    common::cleanup(app).await;
}

#[tokio::test]
async fn upstream_error_status_is_bad_gateway() {
    let app = common::spawn_app_with(FakeApi::failing(Failure::Status(500))).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/properties/charts", &session).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("500"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn unexpected_body_shape_is_empty() {
    let api = FakeApi::new().with(paths::RENTAL_CONTRACTS, json!({ "message": "ok" }));
    let app = common::spawn_app_with(api).await;
    let session = app.bootstrap().await;

    let (body, status) = app.get_json("/api/contracts", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    common::cleanup(app).await;
}
