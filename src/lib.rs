//! Async USPS pricing API client: cached OAuth 2.0 client-credentials tokens, authenticated
//! JSON calls, and domestic/international rate lookups.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod rates;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		task::{Context, Poll},
	};
	// self
	use crate::{
		auth::Credentials,
		client::Client,
		error::TransportError,
		http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	};

	/// Request captured by [`RecordingTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: http::Method,
		/// Absolute request URL.
		pub url: String,
		/// Request headers.
		pub headers: http::HeaderMap,
		/// Raw request body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Returns a header value as a string slice, if present and valid UTF-8.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(name).and_then(|value| value.to_str().ok())
		}

		/// Returns the body decoded as UTF-8 (lossy).
		pub fn body_text(&self) -> String {
			String::from_utf8_lossy(&self.body).into_owned()
		}
	}

	enum Scripted {
		Reply { status: u16, body: Vec<u8> },
		Fail(&'static str),
	}

	/// In-process [`HttpTransport`] that replays scripted responses per URL fragment and
	/// records every request it receives.
	///
	/// Responses registered for the same fragment are consumed in order; the last one keeps
	/// answering once the queue is drained. Requests that match nothing get a 404 shaped like
	/// a USPS API error.
	#[derive(Clone, Default)]
	pub struct RecordingTransport {
		routes: Arc<Mutex<Vec<(String, VecDeque<Arc<Scripted>>)>>>,
		history: Arc<Mutex<Vec<RecordedRequest>>>,
	}
	impl RecordingTransport {
		/// Queues a raw response for URLs containing `fragment`.
		pub fn reply(&self, fragment: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
			self.push(fragment, Scripted::Reply { status, body: body.into() })
		}

		/// Queues a JSON response for URLs containing `fragment`.
		pub fn reply_json(&self, fragment: &str, status: u16, body: serde_json::Value) -> &Self {
			self.reply(fragment, status, body.to_string())
		}

		/// Queues a transport failure for URLs containing `fragment`.
		pub fn fail(&self, fragment: &str, message: &'static str) -> &Self {
			self.push(fragment, Scripted::Fail(message))
		}

		/// Returns every request recorded so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.history.lock().clone()
		}

		/// Returns the most recent request.
		pub fn last_request(&self) -> Option<RecordedRequest> {
			self.history.lock().last().cloned()
		}

		/// Counts requests whose URL contains `fragment`.
		pub fn count(&self, fragment: &str) -> usize {
			self.history.lock().iter().filter(|req| req.url.contains(fragment)).count()
		}

		/// Drops all scripted responses and recorded requests.
		pub fn reset(&self) {
			self.routes.lock().clear();
			self.history.lock().clear();
		}

		fn push(&self, fragment: &str, scripted: Scripted) -> &Self {
			let mut routes = self.routes.lock();
			let scripted = Arc::new(scripted);

			match routes.iter_mut().find(|(key, _)| key == fragment) {
				Some((_, queue)) => queue.push_back(scripted),
				None => routes.push((fragment.to_owned(), VecDeque::from([scripted]))),
			}

			self
		}

		fn next_for(&self, url: &str) -> Option<Arc<Scripted>> {
			let mut routes = self.routes.lock();
			let (_, queue) = routes.iter_mut().find(|(key, _)| url.contains(key.as_str()))?;

			if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
		}
	}
	impl HttpTransport for RecordingTransport {
		fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				// Suspend like a real round trip so concurrent callers interleave.
				YieldOnce(false).await;

				let url = request.uri().to_string();
				let (parts, body) = request.into_parts();

				self.history.lock().push(RecordedRequest {
					method: parts.method,
					url: url.clone(),
					headers: parts.headers,
					body,
				});

				let (status, body) = match self.next_for(&url).as_deref() {
					Some(Scripted::Reply { status, body }) => (*status, body.clone()),
					Some(Scripted::Fail(message)) =>
						return Err(TransportError::Io(std::io::Error::other(*message))),
					None => (404, br#"{"error":{"message":"Not found"}}"#.to_vec()),
				};
				let mut response = HttpResponse::new(body);

				*response.status_mut() = http::StatusCode::from_u16(status)
					.map_err(|e| TransportError::Io(std::io::Error::other(e)))?;

				Ok(response)
			})
		}
	}

	struct YieldOnce(bool);
	impl Future for YieldOnce {
		type Output = ();

		fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
			if self.0 {
				return Poll::Ready(());
			}

			self.0 = true;
			cx.waker().wake_by_ref();

			Poll::Pending
		}
	}

	/// Builds a sandbox [`Client`] wired to a fresh [`RecordingTransport`].
	pub fn recording_client(client_id: &str, client_secret: &str) -> (Client, RecordingTransport) {
		let transport = RecordingTransport::default();
		let client = Client::builder(Credentials::new(client_id, client_secret))
			.sandbox(true)
			.transport(transport.clone())
			.build()
			.expect("Recording client should build.");

		(client, transport)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
