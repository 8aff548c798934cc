//! Development dataset for the stub backend
//!
//! Used by the dev-server to give the `sensor` binary something to show.
//! Sensors are created through the API client, so the create endpoint is
//! exercised on every start.

use crate::TestApp;
use anyhow::Result;
use payloads::{Sensor, SensorId, requests};

pub struct DevDataset {
    pub sensors: Vec<Sensor>,
}

impl DevDataset {
    pub async fn create(app: &TestApp) -> Result<Self> {
        let readings = [
            (1, "boiler temperature", 71.5),
            (2, "boiler pressure", 1.8),
            (3, "greenhouse humidity", 64.0),
            (4, "cold room", -18.25),
        ];

        let mut sensors = Vec::with_capacity(readings.len());
        for (id, name, value) in readings {
            let details = requests::CreateSensor {
                id: SensorId(id),
                name: name.to_string(),
                value,
            };
            sensors.push(app.client.create_sensor(&details).await?);
        }

        tracing::info!("📊 Created {} sensors", sensors.len());
        Ok(Self { sensors })
    }

    pub fn print_summary(&self) {
        tracing::info!("📋 Development dataset:");
        for sensor in &self.sensors {
            tracing::info!(
                "   sensor {}: {} = {}",
                sensor.id,
                sensor.name,
                sensor.value
            );
        }
    }
}
