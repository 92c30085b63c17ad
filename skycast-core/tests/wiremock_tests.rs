//! Integration tests for the OpenWeather client using wiremock
//!
//! These tests run the provider and the service against a mock HTTP server,
//! covering successful mapping, upstream errors, timeouts and refused
//! connections on both the current-conditions and forecast paths.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use skycast_core::{
    Config, ForecastPoint, OpenWeatherProvider, WeatherError, WeatherProvider, WeatherService,
};
use tracing_subscriber::{Layer, layer::Context, layer::SubscriberExt};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_KEY: &str = "test-key";

fn sample_current_response() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [
            { "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }
        ],
        "base": "stations",
        "main": {
            "temp": 12.34,
            "feels_like": 11.8,
            "temp_min": 11.0,
            "temp_max": 13.2,
            "pressure": 1012,
            "humidity": 81
        },
        "visibility": 10000,
        "wind": { "speed": 4.63, "deg": 250 },
        "clouds": { "all": 75 },
        "dt": 1_704_067_200,
        "sys": { "country": "GB", "sunrise": 1_704_096_000, "sunset": 1_704_124_000 },
        "timezone": 0,
        "id": 2_643_743,
        "name": "London",
        "cod": 200
    })
}

fn forecast_entry(dt_txt: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "dt": 0,
        "main": { "temp": temp, "feels_like": temp, "humidity": 70 },
        "weather": [{ "description": "clear sky", "icon": "01n" }],
        "wind": { "speed": 1.0 },
        "dt_txt": dt_txt
    })
}

fn sample_forecast_response() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "cnt": 5,
        "list": [
            forecast_entry("2024-01-01 00:00:00", 10.0),
            forecast_entry("2024-01-01 03:00:00", 12.0),
            forecast_entry("2024-01-01 06:00:00", 9.0),
            forecast_entry("2024-01-02 00:00:00", 5.0),
            forecast_entry("2024-01-02 03:00:00", 4.5),
        ],
        "city": { "name": "London", "country": "GB" }
    })
}

fn create_config(base_url: String, timeout_secs: u64) -> Config {
    Config { base_url, timeout_secs, ..Default::default() }
}

fn create_test_provider(mock_server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(API_KEY.to_string(), &create_config(mock_server.uri(), 5))
        .expect("Failed to create provider")
}

fn create_test_service(config: &Config) -> WeatherService {
    let provider = OpenWeatherProvider::new(API_KEY.to_string(), config)
        .expect("Failed to create provider");
    WeatherService::new(Box::new(provider))
}

async fn mount(mock_server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/{endpoint}")))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

/// Counts error-level events while installed as the thread's default subscriber.
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn current_weather_maps_fields_exactly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", API_KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let weather = create_test_provider(&mock_server)
        .current("London")
        .await
        .expect("current weather");

    assert_eq!(weather.city, "London");
    assert_eq!(weather.temperature, 12.34);
    assert_eq!(weather.humidity, 81);
    assert_eq!(weather.wind_speed, 4.63);
    assert_eq!(weather.condition, "Light Rain");
    assert_eq!(weather.icon_url, "http://openweathermap.org/img/wn/10d@2x.png");
    assert_eq!(weather.observed_at_text(), "2024-01-01 00:00:00");
}

#[tokio::test]
async fn forecast_returns_raw_entries_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_forecast_response()))
        .mount(&mock_server)
        .await;

    let entries = create_test_provider(&mock_server)
        .forecast("London")
        .await
        .expect("forecast");

    assert_eq!(entries.len(), 5);
    assert_eq!(entries[1].timestamp_text, "2024-01-01 03:00:00");
    assert_eq!(entries[1].temperature, 12.0);
}

#[tokio::test]
async fn service_reduces_forecast_to_one_point_per_day() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "forecast",
        ResponseTemplate::new(200).set_body_json(sample_forecast_response()),
    )
    .await;

    let counter = ErrorCounter::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

    let service = create_test_service(&create_config(mock_server.uri(), 5));
    let forecast = service.daily_forecast("London").await.expect("forecast");

    assert_eq!(
        forecast,
        vec![
            ForecastPoint { date: "2024-01-01".into(), temperature: 10.0 },
            ForecastPoint { date: "2024-01-02".into(), temperature: 5.0 },
        ]
    );
    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn city_is_trimmed_before_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "New York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = create_test_provider(&mock_server).current("  New York ").await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

// ============================================================================
// Error scenarios
// ============================================================================

#[tokio::test]
async fn empty_city_never_reaches_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = create_test_provider(&mock_server).current("").await.unwrap_err();
    assert!(matches!(err, WeatherError::EmptyCity));
}

#[tokio::test]
async fn current_weather_upstream_error_carries_status() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "weather",
        ResponseTemplate::new(401).set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
    )
    .await;

    let err = create_test_provider(&mock_server).current("London").await.unwrap_err();
    match err {
        WeatherError::Upstream { status, body, .. } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("Expected upstream error, got: {other:?}"),
    }
}

#[tokio::test]
async fn current_weather_malformed_body_is_reported() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "weather",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "London" })),
    )
    .await;

    let err = create_test_provider(&mock_server).current("London").await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedResponse { .. }));
}

#[tokio::test]
async fn current_weather_out_of_range_dt_is_malformed() {
    let mock_server = MockServer::start().await;
    let mut body = sample_current_response();
    body["dt"] = serde_json::json!(i64::MAX);
    mount(&mock_server, "weather", ResponseTemplate::new(200).set_body_json(body)).await;

    let err = create_test_provider(&mock_server).current("London").await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn forecast_malformed_body_yields_no_result_and_one_error_log() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "forecast", ResponseTemplate::new(200).set_body_string("<html>oops")).await;

    let counter = ErrorCounter::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

    let service = create_test_service(&create_config(mock_server.uri(), 5));
    assert!(service.daily_forecast("London").await.is_none());
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn non_200_forecast_yields_no_result() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "forecast",
        ResponseTemplate::new(404).set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let counter = ErrorCounter::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

    let service = create_test_service(&create_config(mock_server.uri(), 5));
    assert!(service.daily_forecast("Atlantis").await.is_none());
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn current_weather_timeout_yields_no_result_and_one_error_log() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "weather",
        ResponseTemplate::new(200)
            .set_body_json(sample_current_response())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let counter = ErrorCounter::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

    let service = create_test_service(&create_config(mock_server.uri(), 1));
    assert!(service.current_weather("London").await.is_none());
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn forecast_timeout_is_bounded_like_current() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "forecast",
        ResponseTemplate::new(200)
            .set_body_json(sample_forecast_response())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let provider = OpenWeatherProvider::new(API_KEY.to_string(), &create_config(mock_server.uri(), 1))
        .expect("Failed to create provider");
    let err = provider.forecast("London").await.unwrap_err();
    assert!(matches!(err, WeatherError::Network { .. }), "Expected network error, got: {err:?}");
}

#[tokio::test]
async fn connection_refused_yields_no_result_and_one_error_log() {
    // Reserve a free port, then release it so nothing is listening there.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}", listener.local_addr().expect("local addr"))
    };

    let counter = ErrorCounter::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(counter.clone()));

    let service = create_test_service(&create_config(uri, 2));
    assert!(service.current_weather("London").await.is_none());
    assert_eq!(counter.count(), 1);

    assert!(service.daily_forecast("London").await.is_none());
    assert_eq!(counter.count(), 2);
}
