//! `fetch` implementation of [`Transport`].

use async_trait::async_trait;
use formrelay_core::transport::{SubmitRequest, Transport, TransportError, TransportResponse};
use gloo_net::http::{Method, RequestBuilder};
use web_sys::FormData;

fn transport_error(err: gloo_net::Error) -> TransportError {
	match err {
		// `fetch` rejects with a TypeError on network failure
		gloo_net::Error::JsError(js) => TransportError::new(js.message),
		other => TransportError::new(other.to_string()),
	}
}

/// Sends submissions with the browser's `fetch`, body as multipart form data.
///
/// Every settled response is returned, whatever its status; only failures to
/// obtain a response become [`TransportError`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport<FormData> for FetchTransport {
	async fn send(
		&self,
		request: SubmitRequest<FormData>,
	) -> Result<TransportResponse, TransportError> {
		let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
			.map_err(|err| TransportError::new(err.to_string()))?;

		let mut builder = RequestBuilder::new(&request.action).method(method);
		for (name, value) in &request.headers {
			builder = builder.header(name, value);
		}

		let response = builder
			.body(request.body)
			.map_err(transport_error)?
			.send()
			.await
			.map_err(transport_error)?;

		let body = response.text().await.map_err(transport_error)?;
		Ok(TransportResponse::new(
			response.status(),
			response.status_text(),
			body,
		))
	}
}
