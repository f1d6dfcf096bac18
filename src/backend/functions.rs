//! Serverless function calls (`/functions/v1/<name>`).

use reqwest::Method;

use crate::{
    backend::rest::{map_transport_error, RestBackend},
    domain::summary::{SummaryRequest, SummaryResponse},
    usecases::contracts::{BackendError, InvokeResponse, SummaryInvoker},
};

const FUNCTION_INVOKE_FAILED: &str = "BACKEND_FUNCTION_INVOKE_FAILED";

pub fn function_url(base_url: &str, function_name: &str) -> String {
    format!("{}/functions/v1/{function_name}", base_url.trim_end_matches('/'))
}

/// Error bodies are not always JSON; anything unparseable is dropped.
fn decode_body(bytes: &[u8]) -> Option<SummaryResponse> {
    serde_json::from_slice(bytes).ok()
}

impl SummaryInvoker for RestBackend {
    fn invoke_summary(
        &self,
        function_name: &str,
        request: &SummaryRequest,
    ) -> Result<InvokeResponse, BackendError> {
        let url = function_url(&self.endpoint.base_url, function_name);
        let builder = self.authorized(Method::POST, &url).json(request);

        self.runtime.block_on(async {
            let response = builder.send().await.map_err(|error| {
                tracing::warn!(
                    code = FUNCTION_INVOKE_FAILED,
                    function_name,
                    error = %error,
                    "function call failed"
                );
                map_transport_error(&error)
            })?;

            let status = response.status().as_u16();
            let bytes = response
                .bytes()
                .await
                .map_err(|error| map_transport_error(&error))?;

            tracing::debug!(function_name, status, "function responded");

            Ok(InvokeResponse {
                status,
                body: decode_body(&bytes),
            })
        })
    }
}
