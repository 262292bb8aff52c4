use crate::config::Config;
use crate::gif::{GifLookup, GifResult};
use crate::holiday::{resolver::find_holiday, HolidayApiClient, HolidayCache};
use crate::render;
use crate::upstream::UpstreamError;
use axum::http::StatusCode;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("missing input")]
    Missing,
    #[error("not a number: {0}")]
    NonNumeric(String),
    #[error("{0}th day of the week does not exist")]
    OutOfRange(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid day: {0}")]
    Input(#[from] SelectorError),
    #[error("holiday refresh failed: {0}")]
    HolidayRefresh(#[source] UpstreamError),
    #[error("gif lookup failed: {0}")]
    GifLookup(#[source] UpstreamError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Holiday { name: String, gif: Option<GifResult> },
    NoHoliday { weekday: u8 },
}

/// Parse the raw `day` selector into a weekday number 1..=7.
pub fn parse_weekday(raw: Option<&str>) -> Result<u8, SelectorError> {
    let raw = match raw {
        None | Some("") => return Err(SelectorError::Missing),
        Some(raw) => raw,
    };

    match raw.parse::<i64>() {
        Ok(day) if (1..=7).contains(&day) => Ok(day as u8),
        Ok(_) => Err(SelectorError::OutOfRange(raw.to_string())),
        // Integers too large for i64 are still numbers, just not weekdays.
        Err(_) if is_integer_literal(raw) => Err(SelectorError::OutOfRange(raw.to_string())),
        Err(_) => Err(SelectorError::NonNumeric(raw.to_string())),
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl SearchOutcome {
    pub fn render(&self) -> String {
        match self {
            SearchOutcome::Holiday { name, gif } => render::holiday(name, gif.as_ref()),
            SearchOutcome::NoHoliday { weekday } => render::no_holiday(*weekday),
        }
    }
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Input(_) => StatusCode::NOT_FOUND,
            PipelineError::HolidayRefresh(_) | PipelineError::GifLookup(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn render(&self) -> String {
        match self {
            PipelineError::Input(SelectorError::Missing) => render::missing_input(),
            PipelineError::Input(SelectorError::NonNumeric(literal))
            | PipelineError::Input(SelectorError::OutOfRange(literal)) => render::no_such_day(literal),
            PipelineError::HolidayRefresh(e) | PipelineError::GifLookup(e) => {
                render::upstream_unavailable(e.provider())
            }
        }
    }
}

/// Drives one `/search` request: validate, load holidays (cache or refresh),
/// pick the holiday, look up its GIF.
pub struct RequestPipeline {
    cache: HolidayCache,
    gifs: GifLookup,
    country: String,
    year: i32,
}

impl RequestPipeline {
    pub fn new(config: &Config) -> Self {
        let provider = Arc::new(HolidayApiClient::new(config));
        Self {
            cache: HolidayCache::new(config.cache_path.clone(), provider),
            gifs: GifLookup::new(config),
            country: config.holiday_country.clone(),
            year: config.holiday_year,
        }
    }

    pub async fn run(&self, selector: Option<&str>) -> Result<SearchOutcome, PipelineError> {
        let weekday = parse_weekday(selector)?;

        let dataset = match self.cache.get().await {
            Some(dataset) => dataset,
            None => self
                .cache
                .refresh(self.year, &self.country)
                .await
                .map_err(PipelineError::HolidayRefresh)?,
        };

        let Some(holiday) = find_holiday(&dataset, weekday) else {
            tracing::info!(weekday, "no public holiday on this weekday");
            return Ok(SearchOutcome::NoHoliday { weekday });
        };
        let name = holiday.name.clone().unwrap_or_default();
        tracing::info!(weekday, holiday = %name, "holiday found");

        let gif = self.gifs.search(&name).await.map_err(PipelineError::GifLookup)?;
        Ok(SearchOutcome::Holiday { name, gif })
    }

    /// Runs the pipeline and renders whichever way it ended.
    pub async fn respond(&self, selector: Option<&str>) -> (StatusCode, String) {
        match self.run(selector).await {
            Ok(outcome) => (StatusCode::OK, outcome.render()),
            Err(e) => {
                match &e {
                    PipelineError::Input(reason) => tracing::info!("rejected day selector: {}", reason),
                    PipelineError::HolidayRefresh(source) | PipelineError::GifLookup(source) => {
                        tracing::error!(transport = source.is_transport(), "search failed: {}", e)
                    }
                }
                (e.status_code(), e.render())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::holiday::types::HolidayRecord;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Harness {
        server: MockServer,
        pipeline: RequestPipeline,
        _dir: TempDir,
    }

    async fn harness() -> Harness {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let config = test_config(&server.uri(), dir.path().join("BD_holiday_data.json"));
        Harness {
            pipeline: RequestPipeline::new(&config),
            server,
            _dir: dir,
        }
    }

    async fn seed_cache(pipeline: &RequestPipeline, holidays: Vec<HolidayRecord>, fetched_at: chrono::DateTime<Utc>) {
        let dataset = pipeline.cache.stamp(holidays, fetched_at);
        pipeline.cache.put(&dataset).await.unwrap();
    }

    async fn expect_holiday_api(server: &MockServer, times: u64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/holidays"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    async fn expect_gif_api(server: &MockServer, times: u64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/gifs/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    fn one_gif() -> serde_json::Value {
        json!({
            "data": [{
                "images": {
                    "original": {
                        "url": "https://media.giphy.com/media/xyz/giphy.gif",
                        "width": "500",
                        "height": "281"
                    }
                }
            }]
        })
    }

    #[test]
    fn test_parse_weekday() {
        for day in 1..=7u8 {
            assert_eq!(parse_weekday(Some(&day.to_string())), Ok(day));
        }
        assert_eq!(parse_weekday(None), Err(SelectorError::Missing));
        assert_eq!(parse_weekday(Some("")), Err(SelectorError::Missing));
        assert_eq!(parse_weekday(Some("0")), Err(SelectorError::OutOfRange("0".into())));
        assert_eq!(parse_weekday(Some("9")), Err(SelectorError::OutOfRange("9".into())));
        assert_eq!(parse_weekday(Some("-3")), Err(SelectorError::OutOfRange("-3".into())));
        assert_eq!(
            parse_weekday(Some("123456789012345678901234567890")),
            Err(SelectorError::OutOfRange("123456789012345678901234567890".into()))
        );
        assert_eq!(parse_weekday(Some("abc")), Err(SelectorError::NonNumeric("abc".into())));
        assert_eq!(parse_weekday(Some("3.5")), Err(SelectorError::NonNumeric("3.5".into())));
        assert_eq!(parse_weekday(Some("-")), Err(SelectorError::NonNumeric("-".into())));
    }

    #[tokio::test]
    async fn test_cached_holiday_with_gif() {
        let h = harness().await;
        seed_cache(&h.pipeline, vec![HolidayRecord::new("Independence Day", 3, true)], Utc::now()).await;
        expect_holiday_api(&h.server, 0, json!({})).await;
        Mock::given(method("GET"))
            .and(path("/v1/gifs/search"))
            .and(query_param("q", "Bangladesh Independence Day"))
            .respond_with(ResponseTemplate::new(200).set_body_json(one_gif()))
            .expect(1)
            .mount(&h.server)
            .await;

        let (status, body) = h.pipeline.respond(Some("3")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Independence Day</h1>"));
        assert!(body.contains(
            "<img src=\"https://media.giphy.com/media/xyz/giphy.gif\" width=\"500\" height=\"281\">"
        ));
    }

    #[tokio::test]
    async fn test_missing_selector_makes_no_upstream_calls() {
        let h = harness().await;
        expect_holiday_api(&h.server, 0, json!({})).await;
        expect_gif_api(&h.server, 0, one_gif()).await;

        for selector in [None, Some("")] {
            let (status, body) = h.pipeline.respond(selector).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body.contains("<h1>Missing input</h1>"));
        }
    }

    #[tokio::test]
    async fn test_invalid_selectors_make_no_upstream_calls() {
        let h = harness().await;
        expect_holiday_api(&h.server, 0, json!({})).await;
        expect_gif_api(&h.server, 0, one_gif()).await;

        for selector in ["9", "0", "-1", "abc", "3.5", "99999999999999999999999"] {
            let err = h.pipeline.run(Some(selector)).await.unwrap_err();
            assert!(matches!(err, PipelineError::Input(_)), "{selector} should be rejected");
        }

        let (status, body) = h.pipeline.respond(Some("9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<h1>9th Day of The Week Does Not Exist!</h1>"));
        assert!(!h.pipeline.cache.path().exists());
    }

    #[tokio::test]
    async fn test_cache_miss_refreshes_once() {
        let h = harness().await;
        expect_holiday_api(&h.server, 1, json!({
            "status": 200,
            "holidays": [
                { "name": "Victory Day", "public": true, "weekday": { "date": { "numeric": "4" } } }
            ]
        }))
        .await;
        expect_gif_api(&h.server, 1, one_gif()).await;

        let outcome = h.pipeline.run(Some("4")).await.unwrap();
        match outcome {
            SearchOutcome::Holiday { name, gif } => {
                assert_eq!(name, "Victory Day");
                assert_eq!(gif.unwrap().width, 500);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_refresh() {
        let h = harness().await;
        seed_cache(
            &h.pipeline,
            vec![HolidayRecord::new("Old Holiday", 4, true)],
            Utc::now() - Duration::hours(3),
        )
        .await;
        expect_holiday_api(&h.server, 1, json!({
            "status": 200,
            "holidays": [
                { "name": "New Holiday", "public": true, "weekday": { "date": { "numeric": "4" } } }
            ]
        }))
        .await;
        expect_gif_api(&h.server, 1, json!({ "data": [] })).await;

        let (status, body) = h.pipeline.respond(Some("4")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<center><h1>No New Holiday Found!</h1></center>");
    }

    #[tokio::test]
    async fn test_no_matching_holiday_still_responds() {
        let h = harness().await;
        seed_cache(
            &h.pipeline,
            vec![
                HolidayRecord::new("Shab e-Barat", 2, false),
                HolidayRecord::new("Victory Day", 4, true),
            ],
            Utc::now(),
        )
        .await;
        expect_gif_api(&h.server, 0, one_gif()).await;

        assert_eq!(
            h.pipeline.run(Some("2")).await.unwrap(),
            SearchOutcome::NoHoliday { weekday: 2 }
        );
        let (status, body) = h.pipeline.respond(Some("2")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No Public Holiday"));
    }

    #[tokio::test]
    async fn test_holiday_provider_failure_is_bad_gateway() {
        let h = harness().await;
        Mock::given(method("GET"))
            .and(path("/v1/holidays"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&h.server)
            .await;
        expect_gif_api(&h.server, 0, one_gif()).await;

        let err = h.pipeline.run(Some("1")).await.unwrap_err();
        assert!(matches!(err, PipelineError::HolidayRefresh(UpstreamError::Malformed { .. })));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.render().contains("Upstream Service Unavailable"));
    }

    #[tokio::test]
    async fn test_gif_provider_failure_is_bad_gateway() {
        let h = harness().await;
        seed_cache(&h.pipeline, vec![HolidayRecord::new("May Day", 6, true)], Utc::now()).await;
        Mock::given(method("GET"))
            .and(path("/v1/gifs/search"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&h.server)
            .await;

        let (status, body) = h.pipeline.respond(Some("6")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("giphy"));
        assert!(!body.contains("May Day"));
    }
}
