/// Errors raised while driving a chart surface.
///
/// Empty data, a missing container and stale callbacks are not errors and never
/// show up here.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// The drawing backend refused to create the surface.
    SurfaceCreation(String),
    /// A series rejected a data push.
    DataPush(String),
    /// Host input could not be decoded.
    InvalidInput(String),
    /// A browser API call failed.
    Browser(String),
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartError::SurfaceCreation(msg) => write!(f, "Surface Creation Error: {}", msg),
            ChartError::DataPush(msg) => write!(f, "Data Push Error: {}", msg),
            ChartError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ChartError::Browser(msg) => write!(f, "Browser Error: {}", msg),
        }
    }
}

impl std::error::Error for ChartError {}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        ChartError::InvalidInput(err.to_string())
    }
}

impl From<wasm_bindgen::JsValue> for ChartError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ChartError::Browser(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<ChartError> for wasm_bindgen::JsValue {
    fn from(err: ChartError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

pub type ChartResult<T> = Result<T, ChartError>;
