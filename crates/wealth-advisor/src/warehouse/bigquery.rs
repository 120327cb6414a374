//! BigQuery warehouse adapter (`jobs.query` REST endpoint)

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use super::Warehouse;
use crate::config::{AdvisorConfig, ApiKey};
use crate::error::{AdvisorError, Result};
use crate::model::{Holding, PortfolioSnapshot, TOP_HOLDINGS_LIMIT};

/// Holdings warehouse backed by a BigQuery dataset with a `holdings` table
/// (`client_id`, `ticker`, `security_name`, `market_value`).
pub struct BigQueryWarehouse {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    dataset_id: String,
    token: Option<ApiKey>,
    timeout_ms: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    job_complete: Option<bool>,
    #[serde(default)]
    rows: Vec<TableRow>,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Deserialize)]
struct ErrorProto {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Value,
}

impl BigQueryWarehouse {
    /// Requires `project_id` and a well-formed `dataset_id`
    pub fn new(config: &AdvisorConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .ok_or_else(|| AdvisorError::ConfigurationMissing("GCP_PROJECT_ID is not set".into()))?;
        let dataset_id = config
            .dataset_id
            .clone()
            .ok_or_else(|| AdvisorError::ConfigurationMissing("DATASET_ID is not set".into()))?;

        if !is_valid_dataset_id(&dataset_id) {
            return Err(AdvisorError::ConfigurationMissing(format!(
                "DATASET_ID '{dataset_id}' is not a valid dataset identifier"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeouts.warehouse)
            .build()
            .map_err(|e| AdvisorError::Internal(format!("failed to build warehouse client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.endpoints.bigquery.trim_end_matches('/').to_string(),
            project_id,
            dataset_id,
            token: config.gcp_access_token.clone(),
            timeout_ms: u64::try_from(config.timeouts.warehouse.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Aggregation over the holdings table. `@client_id` is bound by the
    /// request, never spliced into the SQL text.
    fn portfolio_sql(&self) -> String {
        format!(
            "SELECT
  SUM(market_value) AS total_market_value,
  ARRAY_AGG(
    STRUCT(ticker, security_name, market_value)
    ORDER BY market_value DESC
    LIMIT {TOP_HOLDINGS_LIMIT}
  ) AS top_holdings
FROM `{}.holdings`
WHERE client_id = @client_id
GROUP BY client_id",
            self.dataset_id
        )
    }

    fn query_body(&self, client_id: &str) -> Value {
        json!({
            "query": self.portfolio_sql(),
            "useLegacySql": false,
            "parameterMode": "NAMED",
            "queryParameters": [{
                "name": "client_id",
                "parameterType": { "type": "STRING" },
                "parameterValue": { "value": client_id }
            }],
            "timeoutMs": self.timeout_ms,
        })
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn fetch_portfolio(&self, client_id: &str) -> Result<Option<PortfolioSnapshot>> {
        let url = format!("{}/bigquery/v2/projects/{}/queries", self.base_url, self.project_id);

        let mut request = self.http.post(url).json(&self.query_body(client_id));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose());
        }

        tracing::debug!(dataset = %self.dataset_id, "Running portfolio query");
        let response: QueryResponse = request.send().await?.error_for_status()?.json().await?;

        if let Some(error) = response.errors.first() {
            return Err(AdvisorError::UpstreamUnavailable(error.message.clone()));
        }
        if response.job_complete == Some(false) {
            return Err(AdvisorError::UpstreamUnavailable(
                "portfolio query did not complete in time".into(),
            ));
        }

        snapshot_from_rows(response.rows)
    }

    fn name(&self) -> &str {
        "BigQuery"
    }
}

fn is_valid_dataset_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Map the first result row (`total_market_value`, `top_holdings`)
fn snapshot_from_rows(rows: Vec<TableRow>) -> Result<Option<PortfolioSnapshot>> {
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };

    let [total, holdings] = row.f.as_slice() else {
        return Err(AdvisorError::Internal(format!(
            "expected 2 columns in portfolio row, got {}",
            row.f.len()
        )));
    };

    let holdings = match &holdings.v {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(holding_from_cell).collect::<Result<_>>()?,
        other => {
            return Err(AdvisorError::Internal(format!(
                "top_holdings is not an array: {other}"
            )));
        }
    };

    Ok(Some(PortfolioSnapshot {
        total_market_value: decimal_value(&total.v)?,
        holdings,
    }))
}

/// One `STRUCT(ticker, security_name, market_value)` array element:
/// `{"v": {"f": [{"v": ..}, {"v": ..}, {"v": ..}]}}`
fn holding_from_cell(cell: &Value) -> Result<Holding> {
    let fields = cell
        .get("v")
        .and_then(|v| v.get("f"))
        .and_then(Value::as_array)
        .ok_or_else(|| AdvisorError::Internal(format!("malformed holding record: {cell}")))?;

    let field = |i: usize| fields.get(i).and_then(|f| f.get("v")).unwrap_or(&Value::Null);

    Ok(Holding {
        ticker: string_value(field(0)),
        security_name: string_value(field(1)),
        market_value: decimal_value(field(2))?,
    })
}

fn string_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Numerics arrive as strings (`"1234.5"`, `"1.2345E7"`); SUM over nulls is null.
fn decimal_value(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::Null => return Ok(Decimal::ZERO),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(AdvisorError::Internal(format!("not a numeric value: {other}")));
        }
    };

    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| AdvisorError::Internal(format!("invalid numeric value '{text}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> AdvisorConfig {
        AdvisorConfig {
            project_id: Some("wealth-prod".into()),
            dataset_id: Some("advisory".into()),
            gcp_access_token: Some(ApiKey::new("token-123")),
            endpoints: crate::config::Endpoints {
                bigquery: base_url.into(),
                ..Default::default()
            },
            ..AdvisorConfig::default()
        }
    }

    fn holding(ticker: &str, name: &str, value: &str) -> Value {
        json!({"v": {"f": [{"v": ticker}, {"v": name}, {"v": value}]}})
    }

    #[test]
    fn requires_project_and_dataset() {
        let missing = AdvisorConfig::default();
        assert!(matches!(
            BigQueryWarehouse::new(&missing),
            Err(AdvisorError::ConfigurationMissing(_))
        ));

        let bad_dataset = AdvisorConfig {
            dataset_id: Some("advisory`; DROP TABLE x; --".into()),
            ..config("http://localhost")
        };
        assert!(matches!(
            BigQueryWarehouse::new(&bad_dataset),
            Err(AdvisorError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn maps_row_with_struct_array() {
        let rows: Vec<TableRow> = serde_json::from_value(json!([{
            "f": [
                {"v": "1.5E3"},
                {"v": [holding("AAPL", "Apple Inc", "900.50"), holding("IBM", "IBM Corp", "599.5")]}
            ]
        }]))
        .unwrap();

        let snapshot = snapshot_from_rows(rows).unwrap().unwrap();
        assert_eq!(snapshot.total_market_value, dec!(1500));
        assert_eq!(
            snapshot.holdings,
            vec![
                Holding::new("AAPL", "Apple Inc", dec!(900.50)),
                Holding::new("IBM", "IBM Corp", dec!(599.5)),
            ]
        );
    }

    #[test]
    fn no_rows_means_no_portfolio() {
        assert!(snapshot_from_rows(Vec::new()).unwrap().is_none());
    }

    #[test]
    fn malformed_numeric_is_internal_error() {
        let rows: Vec<TableRow> =
            serde_json::from_value(json!([{"f": [{"v": "lots"}, {"v": []}]}])).unwrap();
        assert!(matches!(snapshot_from_rows(rows), Err(AdvisorError::Internal(_))));
    }

    #[tokio::test]
    async fn binds_client_id_as_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bigquery/v2/projects/wealth-prod/queries"))
            .and(header("authorization", "Bearer token-123"))
            .and(body_partial_json(json!({
                "useLegacySql": false,
                "parameterMode": "NAMED",
                "queryParameters": [{
                    "name": "client_id",
                    "parameterType": {"type": "STRING"},
                    "parameterValue": {"value": "C-1001' OR '1'='1"}
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobComplete": true,
                "totalRows": "1",
                "rows": [{"f": [{"v": "1000"}, {"v": [holding("AAPL", "Apple Inc", "1000")]}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let warehouse = BigQueryWarehouse::new(&config(&server.uri())).unwrap();
        let snapshot = warehouse
            .fetch_portfolio("C-1001' OR '1'='1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.total_market_value, dec!(1000));

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json().unwrap();
        let sql = body["query"].as_str().unwrap();
        assert!(sql.contains("@client_id"));
        assert!(sql.contains("`advisory.holdings`"));
        assert!(!sql.contains("C-1001"));
    }

    #[tokio::test]
    async fn empty_result_set_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jobComplete": true,
                "totalRows": "0"
            })))
            .mount(&server)
            .await;

        let warehouse = BigQueryWarehouse::new(&config(&server.uri())).unwrap();
        assert!(warehouse.fetch_portfolio("C-0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let warehouse = BigQueryWarehouse::new(&config(&server.uri())).unwrap();
        let err = warehouse.fetch_portfolio("C-1").await.unwrap_err();
        assert!(matches!(err, AdvisorError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn incomplete_job_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobComplete": false})))
            .mount(&server)
            .await;

        let warehouse = BigQueryWarehouse::new(&config(&server.uri())).unwrap();
        let err = warehouse.fetch_portfolio("C-1").await.unwrap_err();
        assert!(matches!(err, AdvisorError::UpstreamUnavailable(_)));
    }
}
