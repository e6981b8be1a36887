use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    GrowthTier, Outcome, SentenceTier, SimulationInput, SimulationResult, classify_growth,
    classify_sentence, compute_freedom_timeline,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliLang {
    En,
    Zh,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum ApiLang {
    En,
    Zh,
}

impl From<ApiLang> for CliLang {
    fn from(value: ApiLang) -> Self {
        match value {
            ApiLang::En => CliLang::En,
            ApiLang::Zh => CliLang::Zh,
        }
    }
}

impl From<CliLang> for ApiLang {
    fn from(value: CliLang) -> Self {
        match value {
            CliLang::En => ApiLang::En,
            CliLang::Zh => ApiLang::Zh,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    #[serde(alias = "assets")]
    current_assets: Option<f64>,
    #[serde(alias = "income")]
    monthly_income: Option<f64>,
    #[serde(alias = "expense")]
    monthly_expense: Option<f64>,
    #[serde(alias = "yieldRate", alias = "annualYieldRatePercent")]
    annual_yield_rate: Option<f64>,
    target_amount: Option<f64>,
    lang: Option<ApiLang>,
}

#[derive(Parser, Debug)]
#[command(
    name = "parole",
    about = "FIRE sentence calculator: years of saving left before assets cover life"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0, help = "Current investable assets")]
    current_assets: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly take-home income")]
    monthly_income: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly living expenses")]
    monthly_expense: f64,
    #[arg(
        long,
        default_value_t = 3.5,
        help = "Expected annual yield in percent, e.g. 3.5"
    )]
    annual_yield_rate: f64,
    #[arg(
        long,
        help = "Nest-egg goal; defaults to monthly-expense x 12 x 25 (rule of 25)"
    )]
    target_amount: Option<f64>,
    #[arg(
        long,
        value_enum,
        default_value_t = CliLang::En,
        help = "Language for chart labels and verdict text"
    )]
    lang: CliLang,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    lang: ApiLang,
}

#[derive(Debug)]
struct ApiRequest {
    input: SimulationInput,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiChartPoint {
    year_offset: u32,
    label: String,
    asset_value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiProjection {
    chart: Vec<ApiChartPoint>,
    balance_at_threshold: f64,
    final_balance: f64,
    growth_rate_percent: f64,
    growth_tier: GrowthTier,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiVerdict {
    tier: SentenceTier,
    status_label: String,
    flavor_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    #[serde(flatten)]
    outcome: Outcome,
    lang: ApiLang,
    final_assets: f64,
    target_amount: f64,
    progress_percent: f64,
    chart: Vec<ApiChartPoint>,
    projection: Option<ApiProjection>,
    verdict: ApiVerdict,
    share_text: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_input(cli: &Cli) -> Result<SimulationInput, String> {
    for (name, value) in [
        ("--current-assets", cli.current_assets),
        ("--monthly-income", cli.monthly_income),
        ("--monthly-expense", cli.monthly_expense),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if !cli.annual_yield_rate.is_finite() || cli.annual_yield_rate <= -100.0 {
        return Err("--annual-yield-rate must be a finite percent > -100".to_string());
    }

    if let Some(target) = cli.target_amount {
        if !target.is_finite() {
            return Err("--target-amount must be a finite number".to_string());
        }
    }

    // Rule-of-25 default applies only when the caller has not overridden
    // the target; an explicit value is honored as-is, zero included.
    let target_amount = cli
        .target_amount
        .unwrap_or(cli.monthly_expense * 12.0 * 25.0);

    Ok(SimulationInput {
        current_assets: cli.current_assets,
        monthly_income: cli.monthly_income,
        monthly_expense: cli.monthly_expense,
        annual_yield_rate_percent: cli.annual_yield_rate,
        target_amount,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Parole HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let response = build_simulate_response(&request.input, request.options.lang);
    json_response(StatusCode::OK, response)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_assets {
        cli.current_assets = v;
    }
    if let Some(v) = payload.monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = payload.monthly_expense {
        cli.monthly_expense = v;
    }
    if let Some(v) = payload.annual_yield_rate {
        cli.annual_yield_rate = v;
    }
    if let Some(v) = payload.target_amount {
        cli.target_amount = Some(v);
    }
    if let Some(v) = payload.lang {
        cli.lang = v.into();
    }

    let input = build_input(&cli)?;
    Ok(ApiRequest {
        input,
        options: ApiOptions {
            lang: cli.lang.into(),
        },
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_assets: 0.0,
        monthly_income: 0.0,
        monthly_expense: 0.0,
        annual_yield_rate: 3.5,
        target_amount: None,
        lang: CliLang::En,
    }
}

fn build_simulate_response(input: &SimulationInput, lang: ApiLang) -> SimulateResponse {
    let result = compute_freedom_timeline(input);
    let tier = classify_sentence(result.outcome);
    let (status_label, flavor_text) = verdict_text(tier, lang);
    let progress_percent = progress_percent(input.current_assets, input.target_amount);

    SimulateResponse {
        outcome: result.outcome,
        lang,
        final_assets: result.final_assets,
        target_amount: input.target_amount,
        progress_percent,
        chart: labeled_chart(&result, lang),
        projection: result.projection.as_ref().map(|p| ApiProjection {
            chart: p
                .chart
                .iter()
                .map(|point| ApiChartPoint {
                    year_offset: point.year_offset,
                    label: year_label(point.year_offset, lang),
                    asset_value: point.asset_value,
                })
                .collect(),
            balance_at_threshold: p.balance_at_threshold,
            final_balance: p.final_balance,
            growth_rate_percent: p.growth_rate_percent,
            growth_tier: classify_growth(p.growth_rate_percent),
        }),
        verdict: ApiVerdict {
            tier,
            status_label: status_label.to_string(),
            flavor_text: flavor_text.to_string(),
        },
        share_text: share_text(result.outcome, progress_percent, lang),
    }
}

fn labeled_chart(result: &SimulationResult, lang: ApiLang) -> Vec<ApiChartPoint> {
    result
        .chart
        .iter()
        .map(|point| ApiChartPoint {
            year_offset: point.year_offset,
            label: year_label(point.year_offset, lang),
            asset_value: point.asset_value,
        })
        .collect()
}

fn progress_percent(current_assets: f64, target_amount: f64) -> f64 {
    if target_amount > 0.0 {
        current_assets / target_amount * 100.0
    } else {
        0.0
    }
}

fn year_label(year_offset: u32, lang: ApiLang) -> String {
    match (lang, year_offset) {
        (ApiLang::En, 0) => "Now".to_string(),
        (ApiLang::En, 1) => "1 year later".to_string(),
        (ApiLang::En, n) => format!("{n} years later"),
        (ApiLang::Zh, 0) => "现在".to_string(),
        (ApiLang::Zh, n) => format!("{n} 年后"),
    }
}

fn verdict_text(tier: SentenceTier, lang: ApiLang) -> (&'static str, &'static str) {
    match (lang, tier) {
        (ApiLang::En, SentenceTier::BornFree) => {
            ("BORN FREE", "Stay free, for the rest of your life.")
        }
        (ApiLang::En, SentenceTier::FinalStretch) => (
            "FINAL STRETCH",
            "Leaving is not for arriving, but for never coming back.",
        ),
        (ApiLang::En, SentenceTier::LongGrind) => (
            "LONG GRIND",
            "Dreaming of the path at night, flipping burgers at dawn.",
        ),
        (ApiLang::En, SentenceTier::LifeSentence) => (
            "LIFE SENTENCE",
            "Compound interest? It's for your boss's Ferrari.",
        ),
        (ApiLang::Zh, SentenceTier::BornFree) => ("生而自由", "躺到老，爽到老。"),
        (ApiLang::Zh, SentenceTier::FinalStretch) => {
            ("最后冲刺", "出发不是为了到达，而是为了不再回来。")
        }
        (ApiLang::Zh, SentenceTier::LongGrind) => {
            ("漫长刑期", "夜里想了千条路，早起还得磨豆腐。")
        }
        (ApiLang::Zh, SentenceTier::LifeSentence) => {
            ("终身监禁", "复利？我看是老板的法拉利。")
        }
    }
}

fn share_text(outcome: Outcome, progress_percent: f64, lang: ApiLang) -> String {
    match (lang, outcome) {
        (ApiLang::En, Outcome::Free) => {
            "Already free: passive income covers my expenses.".to_string()
        }
        (ApiLang::En, Outcome::Calculated { years: 0 }) => {
            "Remaining sentence: 0 years. The freedom fund is full.".to_string()
        }
        (ApiLang::En, Outcome::Calculated { years }) => format!(
            "Remaining sentence: {years} years ({progress_percent:.1}% of the freedom fund saved)."
        ),
        (ApiLang::En, Outcome::LifeSentence) => {
            "Life sentence: the freedom fund is out of reach at this rate.".to_string()
        }
        (ApiLang::Zh, Outcome::Free) => "已经自由：理财收益足以覆盖开销。".to_string(),
        (ApiLang::Zh, Outcome::Calculated { years: 0 }) => {
            "剩余刑期：0 年，赎身金已攒够。".to_string()
        }
        (ApiLang::Zh, Outcome::Calculated { years }) => {
            format!("剩余刑期：{years} 年（赎身金已攒 {progress_percent:.1}%）。")
        }
        (ApiLang::Zh, Outcome::LifeSentence) => {
            "终身监禁：按这个攒法，赎身金永远攒不够。".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_input_derives_rule_of_25_target_when_absent() {
        let mut cli = sample_cli();
        cli.monthly_expense = 10_000.0;

        let input = build_input(&cli).expect("valid input");
        assert_approx(input.target_amount, 3_000_000.0);
    }

    #[test]
    fn build_input_honors_an_explicit_target_even_when_zero() {
        let mut cli = sample_cli();
        cli.monthly_expense = 10_000.0;
        cli.target_amount = Some(0.0);

        let input = build_input(&cli).expect("valid input");
        assert_approx(input.target_amount, 0.0);
    }

    #[test]
    fn build_input_rejects_non_finite_yield() {
        let mut cli = sample_cli();
        cli.annual_yield_rate = f64::INFINITY;

        let err = build_input(&cli).expect_err("must reject non-finite yield");
        assert!(err.contains("--annual-yield-rate"));
    }

    #[test]
    fn build_input_rejects_yield_at_or_below_minus_hundred() {
        let mut cli = sample_cli();
        cli.annual_yield_rate = -100.0;

        let err = build_input(&cli).expect_err("must reject -100 yield");
        assert!(err.contains("--annual-yield-rate"));
    }

    #[test]
    fn api_request_from_json_parses_web_keys_and_aliases() {
        let json = r#"{
          "currentAssets": 50000,
          "income": 20000,
          "monthlyExpense": 10000,
          "yieldRate": 4.2,
          "lang": "zh"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");

        assert_approx(request.input.current_assets, 50_000.0);
        assert_approx(request.input.monthly_income, 20_000.0);
        assert_approx(request.input.monthly_expense, 10_000.0);
        assert_approx(request.input.annual_yield_rate_percent, 4.2);
        assert_approx(request.input.target_amount, 3_000_000.0);
        assert_eq!(request.options.lang, ApiLang::Zh);
    }

    #[test]
    fn api_request_defaults_missing_fields_to_zero() {
        let request = api_request_from_json("{}").expect("empty payload is valid");

        assert_approx(request.input.current_assets, 0.0);
        assert_approx(request.input.monthly_income, 0.0);
        assert_approx(request.input.monthly_expense, 0.0);
        assert_approx(request.input.annual_yield_rate_percent, 3.5);
        assert_approx(request.input.target_amount, 0.0);
        assert_eq!(request.options.lang, ApiLang::En);
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let input = SimulationInput {
            current_assets: 0.0,
            monthly_income: 20_000.0,
            monthly_expense: 10_000.0,
            annual_yield_rate_percent: 3.5,
            target_amount: 3_000_000.0,
        };

        let response = build_simulate_response(&input, ApiLang::En);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"status\":\"calculated\""));
        assert!(json.contains("\"years\":19"));
        assert!(json.contains("\"finalAssets\""));
        assert!(json.contains("\"progressPercent\""));
        assert!(json.contains("\"chart\""));
        assert!(json.contains("\"growthTier\""));
        assert!(json.contains("\"shareText\""));
        assert!(json.contains("\"yearOffset\""));
    }

    #[test]
    fn life_sentence_response_has_empty_chart_and_no_projection() {
        let input = SimulationInput {
            current_assets: 10_000.0,
            monthly_income: 0.0,
            monthly_expense: 1_000.0,
            annual_yield_rate_percent: 1.0,
            target_amount: 1_000_000.0,
        };

        let response = build_simulate_response(&input, ApiLang::En);
        assert_eq!(response.outcome, Outcome::LifeSentence);
        assert!(response.chart.is_empty());
        assert!(response.projection.is_none());
        assert_eq!(response.verdict.tier, SentenceTier::LifeSentence);
        assert!(response.share_text.contains("Life sentence"));
    }

    #[test]
    fn chart_labels_follow_the_requested_language() {
        assert_eq!(year_label(0, ApiLang::En), "Now");
        assert_eq!(year_label(1, ApiLang::En), "1 year later");
        assert_eq!(year_label(15, ApiLang::En), "15 years later");
        assert_eq!(year_label(0, ApiLang::Zh), "现在");
        assert_eq!(year_label(15, ApiLang::Zh), "15 年后");
    }

    #[test]
    fn share_text_includes_years_and_progress() {
        let text = share_text(Outcome::Calculated { years: 19 }, 12.5, ApiLang::En);
        assert!(text.contains("19 years"));
        assert!(text.contains("12.5%"));
    }

    #[test]
    fn progress_percent_guards_non_positive_targets() {
        assert_approx(progress_percent(500.0, 1_000.0), 50.0);
        assert_approx(progress_percent(500.0, 0.0), 0.0);
        assert_approx(progress_percent(500.0, -10.0), 0.0);
    }
}
