pub mod backend;
pub mod mock;

use std::net::TcpListener;
use std::rc::Rc;
use std::time::Duration;

use actix_web::web;
use backend::{Config, RecordedRequest, ScriptedResponse, StubBackend};
use client::{APIClient, RequestConfig, RequestHook, telemetry};
use payloads::{Sensor, SensorId};
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    pub address: String,
    pub client: Rc<APIClient>,
    pub stub: web::Data<StubBackend>,
}

impl TestApp {
    /// Answer `path` with `status` and a JSON `body`.
    pub fn respond_with(
        &self,
        path: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        self.respond_with_raw(path, status, &body.to_string());
    }

    /// Answer `path` with `status` and an arbitrary body.
    pub fn respond_with_raw(&self, path: &str, status: u16, body: &str) {
        self.stub.script(
            path,
            ScriptedResponse {
                status,
                body: body.to_string(),
                delay: None,
            },
        );
    }

    /// Like [`TestApp::respond_with`], but only after `delay`.
    pub fn respond_with_delay(
        &self,
        path: &str,
        status: u16,
        body: serde_json::Value,
        delay: Duration,
    ) {
        self.stub.script(
            path,
            ScriptedResponse {
                status,
                body: body.to_string(),
                delay: Some(delay),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.stub.requests()
    }

    pub fn request_count(&self) -> usize {
        self.stub.requests().len()
    }

    pub fn requests_to(&self, path: &str) -> usize {
        self.stub
            .requests()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }

    /// A hook bound to this app's client.
    pub fn hook<T>(&self, path: &str, config: RequestConfig) -> RequestHook<T> {
        RequestHook::new(self.client.clone(), path, config)
    }

    pub fn seed_sensor(&self, id: i64, name: &str, value: f64) -> Sensor {
        let sensor = Sensor {
            id: SensorId(id),
            name: name.to_string(),
            value,
        };
        self.stub.insert_sensor(sensor.clone());
        sensor
    }
}

pub async fn spawn_app_with(mut config: Config) -> TestApp {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    let stub = web::Data::new(StubBackend::default());
    let server = backend::build(&mut config, stub.clone()).unwrap();
    tokio::spawn(server);

    // 0.0.0.0 is not a connectable address
    let host = if config.ip == "0.0.0.0" {
        "127.0.0.1"
    } else {
        config.ip.as_str()
    };
    let address = format!("http://{host}:{}", config.port);
    TestApp {
        port: config.port,
        client: Rc::new(APIClient::new(address.clone())),
        address,
        stub,
    }
}

pub async fn spawn_app_on_port(port: u16) -> TestApp {
    spawn_app_with(Config {
        ip: "127.0.0.1".into(),
        port,
    })
    .await
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_on_port(0).await
}

/// An address nothing listens on, for exercising transport failures.
pub fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
