//! Text rendering of a [`ResultSnapshot`], used by the `sensor` binary.

use std::rc::Rc;

use serde::{Serialize, de::DeserializeOwned};

use crate::api_client::APIClient;
use crate::hooks::RequestHook;
use crate::request::RequestConfig;
use crate::state::ResultSnapshot;

/// Render a snapshot the way the sensor panel shows it: a loading line,
/// an error line, or the pretty-printed data.
pub fn render<T: Serialize>(snapshot: &ResultSnapshot<T>) -> String {
    match snapshot {
        ResultSnapshot::Idle => String::new(),
        ResultSnapshot::Loading => "Loading...".to_string(),
        ResultSnapshot::Failure(error) => format!("Error: {error}"),
        ResultSnapshot::Success(data) => {
            match serde_json::to_string_pretty(data) {
                Ok(json) => format!("Data:\n{json}"),
                Err(e) => format!("Error: could not display data ({e})"),
            }
        }
    }
}

/// Mount a hook on `path`, let it fire once, and render what it shows.
///
/// The flag is false when the request failed.
pub async fn show<T>(
    api_client: Rc<APIClient>,
    path: &str,
    config: RequestConfig,
) -> (String, bool)
where
    T: DeserializeOwned + Serialize + Clone,
{
    let mut hook = RequestHook::<T>::new(api_client, path, config.clone());
    hook.invoke_on_change(path, config).await;

    let snapshot = hook.snapshot();
    (render(&snapshot), snapshot.error().is_none())
}
