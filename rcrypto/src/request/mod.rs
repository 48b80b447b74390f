//! Thin request view over a host-provided request whose body can be read
//! once as text.


use async_trait::async_trait;
use std::sync::Arc;

use crate::utilities::error::*;

/// Request descriptor supplied by the embedding runtime.
#[async_trait]
pub trait NativeRequest: Send + Sync {
    fn method(&self) -> &str;

    fn url(&self) -> &str;

    /// Reads the whole body. Whether a second read succeeds is up to the
    /// implementation.
    async fn read_all_text(&self) -> Result<String>;
}

pub struct RequestImpl<R: NativeRequest + ?Sized> {
    method: String,
    url: String,
    native: Arc<R>,
}

impl<R: NativeRequest + ?Sized> RequestImpl<R> {
    pub fn new(native: Arc<R>) -> Self {
        Self {
            method: native.method().to_string(),
            url: native.url().to_string(),
            native,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Body view. Nothing is read until [`Blob::text`].
    pub async fn blob(&self) -> Blob<R> {
        Blob {
            native: Arc::clone(&self.native),
        }
    }
}

pub fn create_request<R: NativeRequest + ?Sized>(native: Arc<R>) -> RequestImpl<R> {
    RequestImpl::new(native)
}

pub struct Blob<R: NativeRequest + ?Sized> {
    native: Arc<R>,
}

impl<R: NativeRequest + ?Sized> Blob<R> {
    pub async fn text(&self) -> Result<String> {
        log::trace!("reading request body");
        self.native.read_all_text().await
    }
}
