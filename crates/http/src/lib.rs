/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod api;
pub mod response;

use classifier::{Model, Pipeline};
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use std::{
    convert::Infallible,
    fs::{File, OpenOptions},
    io,
    net::SocketAddr,
    path::Path,
    sync::Arc,
};
use tokio::net::TcpListener;

/// Serving state shared across connections. The model is loaded once at
/// startup and immutable for the lifetime of the process; inference is
/// read-only, so concurrent requests need no locking. Only the feedback
/// appender is serialized.
pub struct Inner {
    pub pipeline: Pipeline,
    pub model: Arc<Model>,
    pub feedback: Mutex<csv::Writer<File>>,
}

#[derive(Clone)]
pub struct Server {
    pub inner: Arc<Inner>,
}

impl Server {
    pub fn new(model: Arc<Model>, feedback_path: &Path) -> io::Result<Self> {
        let feedback_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(feedback_path)?;

        Ok(Server {
            inner: Arc::new(Inner {
                pipeline: Pipeline::new(),
                model,
                feedback: Mutex::new(
                    csv::WriterBuilder::new()
                        .delimiter(b'\t')
                        .from_writer(feedback_file),
                ),
            }),
        })
    }

    pub async fn serve(self, addr: SocketAddr) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "listening");

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { Ok::<_, Infallible>(server.route(req).await) }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    tracing::debug!(%remote_addr, error = %err, "connection error");
                }
            });
        }
    }
}
