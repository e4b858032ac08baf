//! Integration tests for the benefit engine.
//!
//! This test suite covers:
//! - Rate resolution tiers (exact, keyword, region, unresolved)
//! - Working-days resolution and the standard-days default
//! - Exclusion sources and configured labels
//! - Observation flags (admission, leave, termination)
//! - Loading a directory of CSV exports and exporting the report
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use benefit_engine::api::{AppState, create_router};
use benefit_engine::calculation::run_benefit;
use benefit_engine::config::{BenefitConfig, ConfigLoader};
use benefit_engine::error::EngineError;
use benefit_engine::models::{Cell, EmployeeKey, Observation, RateSource, Table, WarningCode};
use benefit_engine::report::{REPORT_HEADERS, assemble_report, report_to_csv};
use benefit_engine::sources::{SourceBundle, SourceKind, load_csv_dir};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/vr_va").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Builds an `active_employees` table from `(key, group)` pairs.
fn active_table(employees: &[(&str, &str)]) -> Value {
    let rows: Vec<Value> = employees
        .iter()
        .map(|(key, group)| json!([key, format!("Employee {}", key), "ANALISTA", group]))
        .collect();
    json!({ "headers": ["MATRICULA", "NOME", "CARGO", "SINDICATO"], "rows": rows })
}

fn ids_table(keys: &[&str]) -> Value {
    let rows: Vec<Value> = keys.iter().map(|key| json!([key])).collect();
    json!({ "headers": ["MATRICULA"], "rows": rows })
}

fn empty_rates() -> Value {
    json!({ "headers": ["SINDICATO", "VALOR"], "rows": [] })
}

fn days_table(days: Value) -> Value {
    json!({ "headers": ["DIAS_UTEIS"], "rows": [[days]] })
}

fn row<'a>(result: &'a Value, key: &str) -> &'a Value {
    result["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["registration"] == key)
        .unwrap_or_else(|| panic!("No report row for {}", key))
}

fn has_row(result: &Value, key: &str) -> bool {
    result["rows"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["registration"] == key)
}

fn amount(value: &Value) -> Decimal {
    decimal(value.as_str().expect("amounts serialize as strings"))
}

fn assert_split(row: &Value, total: &str, employer: &str, discount: &str) {
    assert_eq!(amount(&row["total"]), decimal(total), "total of {}", row);
    assert_eq!(amount(&row["employer_cost"]), decimal(employer), "employer cost of {}", row);
    assert_eq!(
        amount(&row["employee_discount"]),
        decimal(discount),
        "employee discount of {}",
        row
    );
}

// =============================================================================
// SECTION 1: Rate Resolution
// =============================================================================

#[tokio::test]
async fn test_keyword_and_unresolved_groups() {
    // A matches the "SINDPD SP" keyword fallback; B matches nothing.
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("A", "SINDPD SP"), ("B", "UNKNOWN")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!(20))
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_split(row(&result, "A"), "750", "600", "150");
    assert_eq!(row(&result, "A")["observation"], "OK");

    assert_split(row(&result, "B"), "0", "0", "0");
    assert_eq!(row(&result, "B")["observation"], "zero value — check union");
}

#[tokio::test]
async fn test_exact_rate_wins_over_fallbacks() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP")]),
            "union_rates": {
                "headers": ["SINDICATO", "VALOR"],
                "rows": [["SINDPD SP", "R$ 40,00"]]
            },
            "working_days": days_table(json!(20))
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_split(row(&result, "1"), "800", "640", "160");
}

#[tokio::test]
async fn test_region_fallback_when_no_keyword_matches() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SITEPD PR - CURITIBA")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!(20))
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;
    assert_split(row(&result, "1"), "700", "560", "140");
}

#[tokio::test]
async fn test_unparseable_rate_falls_back_and_warns() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPPD RS")]),
            "union_rates": {
                "headers": ["SINDICATO", "VALOR"],
                "rows": [["SINDPPD RS", "a definir"]]
            },
            "working_days": days_table(json!(20))
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_split(row(&result, "1"), "700", "560", "140");
    let warnings = result["summary"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["code"], "unparsable_value");
    assert_eq!(warnings[0]["table"], "union_rates");
}

#[tokio::test]
async fn test_oversized_rate_is_defaulted_and_run_completes() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP"), ("2", "UNKNOWN")]),
            "union_rates": {
                "headers": ["SINDICATO", "VALOR"],
                "rows": [
                    ["SINDPD SP", "79228162514264337593543950335"],
                    ["UNKNOWN", 1.0e28]
                ]
            },
            "working_days": days_table(json!(20))
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_split(row(&result, "1"), "750", "600", "150");
    assert_split(row(&result, "2"), "0", "0", "0");
    assert_eq!(row(&result, "2")["observation"], "zero value — check union");

    let warnings = result["summary"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w["code"] == "unparsable_value"));
    assert_eq!(amount(&result["summary"]["total_value"]), decimal("750"));
}

#[test]
fn test_rate_at_maximum_computes_exactly() {
    let sources = SourceBundle::new()
        .with(
            SourceKind::ActiveEmployees,
            Table::new("", ["MATRICULA", "SINDICATO"])
                .with_row(vec![Cell::from("1"), Cell::from("SINDPD SP")]),
        )
        .with(
            SourceKind::UnionRates,
            Table::new("", ["SINDICATO", "VALOR"])
                .with_row(vec![Cell::from("SINDPD SP"), Cell::from("R$ 10000,00")]),
        )
        .with(
            SourceKind::WorkingDays,
            Table::new("", ["DIAS"]).with_row(vec![Cell::Number(31.0)]),
        );

    let config = BenefitConfig::default();
    let result = run_benefit(&sources, &config).unwrap();
    let report = assemble_report(&result, config.calculation()).unwrap();

    assert_eq!(report.summary.total_value, decimal("310000"));
    assert_eq!(report.summary.employer_cost, decimal("248000"));
    assert_eq!(report.summary.employee_discount, decimal("62000"));
}

// =============================================================================
// SECTION 2: Working Days
// =============================================================================

#[tokio::test]
async fn test_missing_working_days_uses_standard_22() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP"), ("2", "SINDPPD RS")]),
            "union_rates": empty_rates()
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    for r in result["rows"].as_array().unwrap() {
        assert_eq!(r["working_days"], 22);
        assert_eq!(r["observation"], "standard working days (22)");
    }
    assert_split(row(&result, "1"), "825", "660", "165");
}

#[tokio::test]
async fn test_unparseable_working_days_uses_standard_22() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!("vinte"))
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(row(&result, "1")["working_days"], 22);
    assert_eq!(row(&result, "1")["observation"], "standard working days (22)");
    assert_eq!(result["summary"]["warnings"][0]["table"], "working_days");
}

#[tokio::test]
async fn test_working_days_text_value() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!(" 21 "))
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(row(&result, "1")["working_days"], 21);
    assert_split(row(&result, "1"), "787.5", "630", "157.5");
}

// =============================================================================
// SECTION 3: Exclusions
// =============================================================================

#[tokio::test]
async fn test_excluded_employee_is_absent() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("A", "SINDPD SP"), ("B", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "interns": ids_table(&["A"])
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!has_row(&result, "A"));
    assert!(has_row(&result, "B"));
    assert_eq!(result["summary"]["excluded_employees"], 1);
}

#[tokio::test]
async fn test_every_exclusion_source_applies() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[
                ("1", "SINDPD SP"),
                ("2", "SINDPD SP"),
                ("3", "SINDPD SP"),
                ("4", "SINDPD SP"),
                ("5", "SINDPD SP")
            ]),
            "union_rates": empty_rates(),
            "interns": ids_table(&["1"]),
            "apprentices": ids_table(&["2"]),
            "leave_of_absence": ids_table(&["3"]),
            "overseas": { "headers": ["Cadastro", "Valor"], "rows": [[4, null]] }
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    let keys: Vec<&str> = result["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["registration"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["5"]);

    let overseas = result["exclusions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["source"] == "overseas")
        .unwrap();
    assert_eq!(overseas["column"], "Cadastro");
    assert_eq!(overseas["keys"], 1);
}

#[tokio::test]
async fn test_exclusion_source_without_identifier_is_skipped() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "overseas": { "headers": ["VALOR", "DIAS"], "rows": [["1", "2"]] }
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(has_row(&result, "1"));
}

#[tokio::test]
async fn test_configured_labels_exclude_directors_and_interns() {
    let body = json!({
        "sources": {
            "active_employees": {
                "headers": ["MATRICULA", "NOME", "TITULO DO CARGO", "SINDICATO", "DESC. SITUACAO"],
                "rows": [
                    ["1", "Ana", "DIRETOR DE OPERACOES", "SINDPD SP", "Trabalhando"],
                    ["2", "Bia", "ESTAGIARIA", "SINDPD SP", "Trabalhando"],
                    ["3", "Caio", "ANALISTA", "SINDPD SP", "Afastado"],
                    ["4", "Davi", "ANALISTA", "SINDPD SP", "Trabalhando"]
                ]
            },
            "union_rates": empty_rates()
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(result["rows"].as_array().unwrap().len(), 1);
    assert!(has_row(&result, "4"));
    let labels = result["exclusions"].as_array().unwrap().last().unwrap();
    assert_eq!(labels["source"], "configured_labels");
    assert_eq!(labels["keys"], 3);
}

// =============================================================================
// SECTION 4: Observations
// =============================================================================

#[tokio::test]
async fn test_admission_date_and_flag() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP"), ("2", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!(20)),
            "admissions": {
                "headers": ["MATRICULA", "Admissão", "Cargo"],
                "rows": [["1", "2025-04-14", "ANALISTA"]]
            }
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(row(&result, "1")["admission_date"], "14/04/2025");
    assert_eq!(row(&result, "1")["observation"], "recent admission");
    assert_eq!(row(&result, "2")["admission_date"], "N/A");
}

#[tokio::test]
async fn test_vacation_and_termination_flags() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP"), ("2", "UNKNOWN")]),
            "union_rates": empty_rates(),
            "vacations": ids_table(&["1"]),
            "terminations": ids_table(&["2"])
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(
        row(&result, "1")["observation"],
        "standard working days (22); on leave"
    );
    assert_eq!(
        row(&result, "2")["observation"],
        "zero value — check union; standard working days (22); terminated"
    );
}

#[tokio::test]
async fn test_admission_without_usable_date_is_not_flagged() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP"), ("2", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!(20)),
            "admissions": {
                "headers": ["MATRICULA", "Cargo"],
                "rows": [["1", "ANALISTA"]]
            }
        }
    });

    let (status, result) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(row(&result, "1")["admission_date"], "N/A");
    assert_eq!(row(&result, "1")["observation"], "OK");
}

#[tokio::test]
async fn test_admission_flag_agrees_with_admission_field() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP"), ("2", "SINDPD SP"), ("3", "SINDPD SP")]),
            "union_rates": empty_rates(),
            "working_days": days_table(json!(20)),
            "admissions": {
                "headers": ["MATRICULA", "Admissão"],
                "rows": [["1", "2025-04-14"], ["2", "ontem"], ["3", null]]
            }
        }
    });

    let (_, result) = post_calculate(create_router_for_test(), body).await;

    for r in result["rows"].as_array().unwrap() {
        let flagged = r["observation"].as_str().unwrap().contains("recent admission");
        let dated = r["admission_date"] != "N/A";
        assert_eq!(flagged, dated, "row {}", r);
    }
    assert_eq!(row(&result, "1")["observation"], "recent admission");
    assert_eq!(row(&result, "2")["observation"], "OK");
}

// =============================================================================
// SECTION 5: Library and CSV Sources
// =============================================================================

#[test]
fn test_csv_directory_end_to_end() {
    let sources = load_csv_dir("tests/fixtures/sources").unwrap();
    assert_eq!(sources.len(), 9);
    assert!(sources.get(SourceKind::Apprentices).is_none());

    let config = ConfigLoader::load("./config/vr_va").unwrap();
    let result = run_benefit(&sources, config.config()).unwrap();

    let keys: Vec<&str> = result.records.iter().map(|r| r.employee.key.as_str()).collect();
    assert_eq!(keys, vec!["34567", "34569", "34571", "34572"]);
    assert_eq!(result.excluded_employees, 3);

    let sp = result.record(&EmployeeKey::new("34567")).unwrap();
    assert_eq!(sp.total, decimal("787.5"));
    assert_eq!(
        sp.rate_source,
        RateSource::Keyword {
            fragment: "SINDPD SP".to_string()
        }
    );

    let rs = result.record(&EmployeeKey::new("34569")).unwrap();
    assert_eq!(rs.rate_source, RateSource::Exact);
    assert_eq!(rs.observations, vec![Observation::Terminated]);

    let rj = result.record(&EmployeeKey::new("34571")).unwrap();
    assert_eq!(
        rj.rate_source,
        RateSource::Region {
            fragment: "RJ".to_string()
        }
    );
    assert_eq!(rj.observations, vec![Observation::OnLeave]);

    let pr = result.record(&EmployeeKey::new("34572")).unwrap();
    assert_eq!(pr.observations, vec![Observation::RecentAdmission]);
    assert_eq!(pr.admission_date.unwrap().to_string(), "2025-04-14");

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, WarningCode::UnparsableValue);

    let report = assemble_report(&result, config.config().calculation()).unwrap();
    assert_eq!(report.summary.total_value, decimal("2992.5"));
    assert_eq!(report.summary.employer_cost, decimal("2394"));
    assert_eq!(report.summary.employee_discount, decimal("598.5"));
}

#[test]
fn test_report_csv_export() {
    let sources = load_csv_dir("tests/fixtures/sources").unwrap();
    let config = BenefitConfig::default();
    let result = run_benefit(&sources, &config).unwrap();
    let report = assemble_report(&result, config.calculation()).unwrap();

    let csv = report_to_csv(&report).unwrap();
    let mut lines = csv.lines();

    assert_eq!(lines.next().unwrap(), REPORT_HEADERS.join(","));
    let first = lines.next().unwrap();
    assert!(first.starts_with("34567,Ana Souza,ANALISTA DE SISTEMAS,"));
    assert!(first.ends_with(",21,787.50,630.00,157.50,N/A,05/2025,OK"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_result_invariants_hold() {
    let sources = load_csv_dir("tests/fixtures/sources").unwrap();
    let result = run_benefit(&sources, &BenefitConfig::default()).unwrap();

    assert!(result.has_unique_keys());
    for record in &result.records {
        assert_eq!(record.employer_cost + record.employee_discount, record.total);
        if !record.total.is_zero() {
            assert_eq!(record.employer_cost / record.total, decimal("0.8"));
        }
    }
}

#[test]
fn test_scenario_with_library_api() {
    let sources = SourceBundle::new()
        .with(
            SourceKind::ActiveEmployees,
            Table::new("", ["MATRICULA", "SINDICATO"])
                .with_row(vec![Cell::from("A"), Cell::from("SINDPD SP")])
                .with_row(vec![Cell::from("B"), Cell::from("UNKNOWN")]),
        )
        .with(SourceKind::UnionRates, Table::new("", ["SINDICATO", "VALOR"]))
        .with(
            SourceKind::WorkingDays,
            Table::new("", ["DIAS"]).with_row(vec![Cell::Number(20.0)]),
        );

    let result = run_benefit(&sources, &BenefitConfig::default()).unwrap();

    let a = result.record(&EmployeeKey::new("A")).unwrap();
    assert_eq!(a.total, decimal("750"));
    assert_eq!(a.employer_cost, decimal("600"));
    assert_eq!(a.employee_discount, decimal("150"));

    let b = result.record(&EmployeeKey::new("B")).unwrap();
    assert_eq!(b.total, Decimal::ZERO);
    assert!(b.observations.contains(&Observation::ZeroValueRate));
}

// =============================================================================
// SECTION 6: Error Cases
// =============================================================================

#[tokio::test]
async fn test_error_malformed_json() {
    let router = create_router_for_test();

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from("{invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_error_missing_union_rates() {
    let body = json!({
        "sources": { "active_employees": active_table(&[("1", "SINDPD SP")]) }
    });

    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "SOURCE_UNAVAILABLE");
    assert!(error["message"].as_str().unwrap().contains("union_rates"));
}

#[tokio::test]
async fn test_error_empty_active_employees() {
    let body = json!({
        "sources": {
            "active_employees": { "headers": ["MATRICULA"], "rows": [] },
            "union_rates": empty_rates()
        }
    });

    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "SOURCE_UNAVAILABLE");
}

#[tokio::test]
async fn test_error_rate_table_without_rate_column() {
    let body = json!({
        "sources": {
            "active_employees": active_table(&[("1", "SINDPD SP")]),
            "union_rates": { "headers": ["SINDICATO", "ESTADO"], "rows": [] }
        }
    });

    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MISSING_COLUMN");
    assert!(error["details"].as_str().unwrap().contains("ESTADO"));
}

#[tokio::test]
async fn test_error_active_employees_without_identifier() {
    let body = json!({
        "sources": {
            "active_employees": { "headers": ["VALOR", "NOME"], "rows": [["1", "Ana"]] },
            "union_rates": empty_rates()
        }
    });

    let (status, error) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MISSING_COLUMN");
}

#[test]
fn test_error_missing_source_directory() {
    match load_csv_dir("tests/fixtures/does-not-exist") {
        Err(EngineError::SourceParseError { path, .. }) => {
            assert!(path.contains("does-not-exist"))
        }
        other => panic!("Expected SourceParseError, got {:?}", other),
    }
}
