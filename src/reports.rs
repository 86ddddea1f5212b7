//! Reshaping of raw Properfy records into the payloads the dashboard
//! pages chart.

use serde::Serialize;
use serde_json::{Value, json};

use crate::stats::{self, Series, Tally};

const NOT_INFORMED: &str = "Not informed";
const MISSING_LABEL: &str = "N/A";
const COMPLETED_STATUSES: [&str; 2] = ["Concluído", "Finalizado"];

#[derive(Debug, Serialize)]
pub struct Report<S, C> {
    pub statistics: S,
    pub charts: C,
}

// ── Property map ────────────────────────────────────────────────

/// A property with usable coordinates, shaped for map markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapProperty {
    pub id: Value,
    pub condo_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub street: String,
    pub postal_code: String,
    pub district: String,
    pub transaction_type: Value,
    pub sale_price: Value,
    pub expected_rent: Value,
    pub condo_fee: Value,
    pub latitude: f64,
    pub longitude: f64,
}

fn present(record: &Value, field: &str) -> bool {
    record.get(field).is_some_and(|v| !v.is_null())
}

fn text_or(record: &Value, field: &str, default: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

fn passthrough(record: &Value, field: &str) -> Value {
    record.get(field).cloned().unwrap_or(Value::Null)
}

/// Properties that carry latitude, longitude and a condo name.
pub fn property_map(records: &[Value]) -> Vec<MapProperty> {
    records
        .iter()
        .filter(|r| {
            present(r, "dcmAddressLatitude")
                && present(r, "dcmAddressLongitude")
                && present(r, "chrCondoName")
        })
        .filter_map(|r| {
            let latitude = stats::number(&r["dcmAddressLatitude"])?;
            let longitude = stats::number(&r["dcmAddressLongitude"])?;
            Some(MapProperty {
                id: passthrough(r, "id"),
                condo_name: text_or(r, "chrCondoName", NOT_INFORMED),
                kind: text_or(r, "chrType", NOT_INFORMED),
                street: text_or(r, "chrAddressStreet", NOT_INFORMED),
                postal_code: text_or(r, "chrAddressPostalCode", NOT_INFORMED),
                district: text_or(r, "chrAddressDistrict", NOT_INFORMED),
                transaction_type: passthrough(r, "chrTransactionType"),
                sale_price: passthrough(r, "dcmSale"),
                expected_rent: passthrough(r, "dcmExpectedRent"),
                condo_fee: passthrough(r, "dcmCondoValue"),
                latitude,
                longitude,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct MapCharts {
    pub transaction: Series,
    #[serde(rename = "type")]
    pub kind: Series,
    pub purpose: Series,
}

/// Tallies behind the map page; absent fields count as `N/A`.
pub fn property_map_charts(records: &[Value]) -> MapCharts {
    let tally = |field: &str| -> Series {
        records
            .iter()
            .map(|r| text_or(r, field, MISSING_LABEL))
            .collect::<Tally>()
            .into_series()
    };

    MapCharts {
        transaction: tally("chrTransactionType"),
        kind: tally("chrType"),
        purpose: tally("chrPurpose"),
    }
}

// ── Rental contracts ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub id: Value,
    pub tenant_name: Value,
    pub property_name: Value,
    pub property_address: Value,
    pub rent_value: Value,
    pub start_date: Value,
    pub end_date: Value,
    pub status: Value,
    pub observations: Value,
}

/// First truthy value among the aliases a field is published under.
fn first_of(record: &Value, aliases: &[&str]) -> Value {
    aliases
        .iter()
        .filter_map(|a| record.get(*a))
        .find(|v| stats::is_truthy(v))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Contracts normalised across the API's snake_case, camelCase and
/// type-prefixed field spellings.
pub fn contracts(records: &[Value]) -> Vec<Contract> {
    records
        .iter()
        .map(|c| {
            let rent_value = match first_of(c, &["rent_value", "rentValue", "dcmRentValue"]) {
                Value::Null => json!(0),
                v => v,
            };
            Contract {
                id: passthrough(c, "id"),
                tenant_name: first_of(c, &["tenant_name", "tenantName", "chrTenantName"]),
                property_name: first_of(c, &["property_name", "propertyName", "chrPropertyName"]),
                property_address: first_of(
                    c,
                    &["property_address", "propertyAddress", "chrPropertyAddress"],
                ),
                rent_value,
                start_date: first_of(c, &["start_date", "startDate", "dtmStartDate"]),
                end_date: first_of(c, &["end_date", "endDate", "dtmEndDate"]),
                status: first_of(c, &["status", "chrStatus"]),
                observations: first_of(c, &["observations", "chrObservations"]),
            }
        })
        .collect()
}

// ── Property charts ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PropertyStatistics {
    pub total_properties: usize,
    pub average_price: f64,
    pub average_area: f64,
    pub average_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Serialize)]
pub struct PropertyCharts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garages: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decades: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_price: Option<Vec<Point>>,
}

fn positive(record: &Value, field: &str) -> Option<f64> {
    record
        .get(field)
        .and_then(stats::number)
        .filter(|v| *v > 0.0)
}

fn non_empty(series: Series) -> Option<Series> {
    (!series.is_empty()).then_some(series)
}

pub fn property_charts(records: &[Value]) -> Report<PropertyStatistics, PropertyCharts> {
    let types = stats::tally_field(records, "chrType");
    let conditions = stats::tally_field(records, "chrCondition");

    let garage_counts: Vec<i64> = records
        .iter()
        .filter_map(|r| r.get("intGarage").and_then(stats::number))
        .map(|n| n as i64)
        .collect();
    let years: Vec<i64> = records
        .iter()
        .filter_map(|r| r.get("intBuiltYear").and_then(stats::number))
        .filter(|y| *y > 1900.0)
        .map(|y| y as i64)
        .collect();
    let prices: Vec<f64> = records.iter().filter_map(|r| positive(r, "dcmSale")).collect();
    let areas: Vec<f64> = records
        .iter()
        .filter_map(|r| positive(r, "dcmAreaPrivate"))
        .collect();

    let year_values: Vec<f64> = years.iter().map(|y| *y as f64).collect();
    let statistics = PropertyStatistics {
        total_properties: records.len(),
        average_price: stats::mean(&prices),
        average_area: stats::mean(&areas),
        average_year: stats::mean(&year_values),
    };

    let area_price = (!areas.is_empty() && !prices.is_empty()).then(|| {
        records
            .iter()
            .filter_map(|r| {
                Some(Point {
                    x: positive(r, "dcmAreaPrivate")?,
                    y: positive(r, "dcmSale")?,
                })
            })
            .collect()
    });

    let charts = PropertyCharts {
        types: non_empty(types.into_series()),
        conditions: non_empty(conditions.into_series()),
        garages: non_empty(stats::garages(&garage_counts)),
        decades: non_empty(stats::decades(&years)),
        prices: (!prices.is_empty()).then(|| stats::price_ranges(&prices)),
        area_price,
    };

    Report { statistics, charts }
}

// ── CRM leads ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LeadStatistics {
    pub total_leads: usize,
    pub total_cards: usize,
    pub completed_cards: u64,
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct LeadCharts {
    pub channels: Series,
    pub card_status: Series,
    pub transactions: Series,
    pub pipeline: Series,
}

pub fn lead_report(
    leads: &[Value],
    cards: &[Value],
    lead_inputs: &[Value],
) -> Report<LeadStatistics, LeadCharts> {
    let card_status = stats::tally_field(cards, "chrStatus");

    let completed_cards = stats::count_any_of(
        cards.iter().filter_map(|c| c.get("chrStatus").and_then(stats::text)),
        &COMPLETED_STATUSES,
    );
    let conversion_rate = if cards.is_empty() {
        0.0
    } else {
        completed_cards as f64 / cards.len() as f64 * 100.0
    };

    Report {
        statistics: LeadStatistics {
            total_leads: leads.len(),
            total_cards: cards.len(),
            completed_cards,
            conversion_rate,
        },
        charts: LeadCharts {
            channels: stats::tally_field(leads, "chrAcquisitionChannel").into_series(),
            card_status: card_status.into_series(),
            transactions: stats::tally_field(lead_inputs, "chrTransactionType").into_series(),
            pipeline: stats::tally_field(lead_inputs, "chrPipeline").into_series(),
        },
    }
}

// ── Maintenance ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MaintenanceStatistics {
    pub total: usize,
    pub high_priority: u64,
    pub pending: u64,
    pub completed: u64,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceCharts {
    pub priorities: Series,
    pub status: Series,
    pub responsibles: Series,
    pub categories: Series,
}

pub fn maintenance_report(records: &[Value]) -> Report<MaintenanceStatistics, MaintenanceCharts> {
    let field_values = |field: &'static str| {
        records
            .iter()
            .filter_map(move |r| r.get(field).and_then(stats::text))
    };

    Report {
        statistics: MaintenanceStatistics {
            total: records.len(),
            high_priority: stats::count_any_of(field_values("chrPriority"), &["Alta"]),
            pending: stats::count_any_of(field_values("chrStatus"), &["Pendente"]),
            completed: stats::count_any_of(field_values("chrStatus"), &COMPLETED_STATUSES),
        },
        charts: MaintenanceCharts {
            priorities: stats::tally_field(records, "chrPriority").into_series(),
            status: stats::tally_field(records, "chrStatus").into_series(),
            responsibles: stats::tally_field(records, "responsible").into_series(),
            categories: stats::tally_field(records, "chrCategoryLabel").into_series(),
        },
    }
}
