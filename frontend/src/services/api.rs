use gloo::net::http::Request;
use shared::DataPoint;

/// Client for the static price data served next to the app
#[derive(Clone, PartialEq)]
pub struct DataClient {
    base_url: String,
}

impl DataClient {
    /// Create a client that loads data from the page's own origin
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
        }
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn stock_data_url(&self) -> String {
        format!("{}/stock_data.json", self.base_url.trim_end_matches('/'))
    }

    /// Fetch every data point in the table
    pub async fn get_stock_data(&self) -> Result<Vec<DataPoint>, String> {
        let url = self.stock_data_url();

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch stock data: {}", e))?;

        if !response.ok() {
            return Err(format!(
                "Failed to fetch stock data: {} {}",
                response.status(),
                response.status_text()
            ));
        }

        response
            .json::<Vec<DataPoint>>()
            .await
            .map_err(|e| format!("Failed to parse stock data: {}", e))
    }
}

impl Default for DataClient {
    fn default() -> Self {
        Self::new()
    }
}
