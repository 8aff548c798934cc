//! In-process stub of the sensor backend.
//!
//! Serves `GET /`, `GET /sensor/{id}` and `POST /sensor` from memory,
//! records every request it sees, and can be told to answer any path with
//! a fixed status and body instead.

use std::collections::{BTreeMap, HashMap};
use std::net::TcpListener;
use std::sync::Mutex;
use std::time::Duration;

use actix_web::dev::{Server, Service, ServiceRequest};
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, post, web};
use payloads::{
    Sensor, SensorId,
    requests::{CreateSensor, validate_sensor_name},
    responses::{ErrorBody, ErrorDetail, FieldError},
};

/// A canned answer for one path.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    async fn respond(self) -> HttpResponse {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let status = StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status)
            .content_type("application/json")
            .body(self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower case.
    pub headers: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct StubBackend {
    sensors: Mutex<BTreeMap<SensorId, Sensor>>,
    scripted: Mutex<HashMap<String, ScriptedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubBackend {
    /// Answer every request to `path` with `response` from now on.
    pub fn script(&self, path: &str, response: ScriptedResponse) {
        self.scripted
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    pub fn insert_sensor(&self, sensor: Sensor) {
        self.sensors.lock().unwrap().insert(sensor.id, sensor);
    }

    pub fn sensors(&self) -> Vec<Sensor> {
        self.sensors.lock().unwrap().values().cloned().collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, req: &ServiceRequest) {
        let headers = req
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        tracing::debug!(
            method = %req.method(),
            path = req.path(),
            "stub request"
        );
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            path: req.path().to_string(),
            headers,
        });
    }

    fn scripted_for(&self, req: &HttpRequest) -> Option<ScriptedResponse> {
        self.scripted.lock().unwrap().get(req.path()).cloned()
    }
}

pub struct Config {
    /// set to "0.0.0.0" for public access, "127.0.0.1" for local dev
    pub ip: String,
    /// set to 0 to get an os-assigned port
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        use std::env::var;

        Ok(Config {
            ip: var("IP_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: match var("PORT") {
                Ok(port) => port.parse()?,
                Err(_) => 8000,
            },
        })
    }
}

/// Build the server, but not await it.
///
/// Returns the port that the server has bound to by modifying the config.
pub fn build(
    config: &mut Config,
    stub: web::Data<StubBackend>,
) -> std::io::Result<Server> {
    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(format!("{}:{}", config.ip, config.port))?;
    config.port = listener.local_addr()?.port();
    let server = HttpServer::new(move || {
        let recorder = stub.clone();
        App::new()
            .app_data(stub.clone())
            .wrap_fn(move |req, srv| {
                recorder.record(&req);
                srv.call(req)
            })
            .service(list_sensors)
            .service(get_sensor)
            .service(create_sensor)
            .default_service(web::to(scripted_or_not_found))
    })
    .workers(1)
    .listen(listener)?
    .run();
    Ok(server)
}

fn unprocessable(fields: Vec<FieldError>) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorBody::with_fields(fields))
}

fn detail(status: StatusCode, detail: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        message: None,
        detail: Some(ErrorDetail::Message(detail)),
    })
}

#[get("/")]
async fn list_sensors(
    req: HttpRequest,
    stub: web::Data<StubBackend>,
) -> HttpResponse {
    if let Some(scripted) = stub.scripted_for(&req) {
        return scripted.respond().await;
    }
    HttpResponse::Ok().json(stub.sensors())
}

#[get("/sensor/{id}")]
async fn get_sensor(
    req: HttpRequest,
    id: web::Path<String>,
    stub: web::Data<StubBackend>,
) -> HttpResponse {
    if let Some(scripted) = stub.scripted_for(&req) {
        return scripted.respond().await;
    }
    let Ok(id) = id.parse::<i64>().map(SensorId) else {
        return unprocessable(vec![FieldError {
            loc: vec!["path".into(), "id".into()],
            msg: "Input should be a valid integer".into(),
            kind: "int_parsing".into(),
        }]);
    };
    match stub.sensors.lock().unwrap().get(&id) {
        Some(sensor) => HttpResponse::Ok().json(sensor),
        None => detail(StatusCode::NOT_FOUND, "Sensor not found".into()),
    }
}

#[post("/sensor")]
async fn create_sensor(
    req: HttpRequest,
    body: web::Bytes,
    stub: web::Data<StubBackend>,
) -> HttpResponse {
    if let Some(scripted) = stub.scripted_for(&req) {
        return scripted.respond().await;
    }
    let details = match serde_json::from_slice::<CreateSensor>(&body) {
        Ok(details) => details,
        Err(e) => {
            return unprocessable(vec![FieldError {
                loc: vec!["body".into()],
                msg: e.to_string(),
                kind: "json_invalid".into(),
            }]);
        }
    };
    if let Some(msg) = validate_sensor_name(&details.name).error_message() {
        return unprocessable(vec![FieldError::new("name", msg, "value_error")]);
    }

    let mut sensors = stub.sensors.lock().unwrap();
    if sensors.contains_key(&details.id) {
        return detail(
            StatusCode::CONFLICT,
            format!("Sensor {} already exists", details.id),
        );
    }
    let sensor = Sensor {
        id: details.id,
        name: details.name.trim().to_string(),
        value: details.value,
    };
    sensors.insert(sensor.id, sensor.clone());
    HttpResponse::Created().json(sensor)
}

async fn scripted_or_not_found(
    req: HttpRequest,
    stub: web::Data<StubBackend>,
) -> HttpResponse {
    match stub.scripted_for(&req) {
        Some(scripted) => scripted.respond().await,
        None => detail(StatusCode::NOT_FOUND, "Not Found".into()),
    }
}
