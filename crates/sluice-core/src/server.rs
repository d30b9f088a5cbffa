//! Native HTTP server
//!
//! Thin hyper transport in front of a [`Dispatcher`]:
//! - Multi-threaded tokio runtime sized by `server.workers`
//! - SO_REUSEPORT / TCP_NODELAY listener via socket2
//! - HTTP/1.1 connections, one task each
//! - Dispatch runs on the blocking pool since handlers are synchronous

use crate::config::ServerConfig;
use crate::{Dispatcher, Error, Method, Request, Response, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// HTTP server bound to one dispatcher
#[derive(Debug, Clone)]
pub struct Server {
    dispatcher: Dispatcher,
    config: ServerConfig,
}

impl Server {
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Address from the configured hostname and port
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.config.hostname, self.config.port)
            .parse()
            .map_err(|e| Error::Configuration(format!("invalid listen address: {e}")))
    }

    /// Run until Ctrl+C on a dedicated runtime
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers.max(1))
            .enable_all()
            .build()?;

        runtime.block_on(async move {
            let listener = self.bind()?;
            self.serve(listener, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for shutdown signal");
                }
            })
            .await
        })
    }

    /// Bind the configured address. Must be called inside a tokio runtime.
    pub fn bind(&self) -> Result<TcpListener> {
        let addr = self.addr()?;
        let socket = create_optimized_socket(&addr)?;
        let listener: std::net::TcpListener = socket.into();
        listener.set_nonblocking(true)?;
        Ok(TcpListener::from_std(listener)?)
    }

    /// Accept connections on `listener` until `shutdown` completes
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        info!(%addr, routes = self.dispatcher.registry().len(), "Server listening");

        tokio::select! {
            _ = accept_loop(listener, self.dispatcher) => {}
            _ = shutdown => {
                info!("Shutdown signal received, stopping server");
            }
        }
        Ok(())
    }
}

async fn accept_loop(listener: TcpListener, dispatcher: Dispatcher) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
                continue;
            }
        };

        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let dispatcher = dispatcher.clone();
                async move { handle_request(dispatcher, req).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %e, "Connection closed with error");
            }
        });
    }
}

async fn handle_request(
    dispatcher: Dispatcher,
    req: hyper::Request<Incoming>,
) -> std::result::Result<hyper::Response<Full<Bytes>>, Infallible> {
    let res = match from_hyper_request(req).await {
        Ok(request) => tokio::task::spawn_blocking(move || dispatcher.handle(&request))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Dispatch task failed");
                Response::failure()
            }),
        Err(e) => {
            warn!(error = %e, "Rejected request");
            Response::failure()
        }
    };
    Ok(to_hyper_response(res))
}

/// Create optimized socket with SO_REUSEPORT
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // SO_REUSEPORT - enable kernel load balancing across threads
    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    socket.set_nodelay(true)?;
    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    Ok(socket)
}

/// Convert a hyper request, collecting the whole body
pub async fn from_hyper_request(req: hyper::Request<Incoming>) -> Result<Request> {
    let (parts, body) = req.into_parts();
    let method = Method::from_str(parts.method.as_str())?;
    let body = body
        .collect()
        .await
        .map_err(|e| Error::Hyper(e.to_string()))?
        .to_bytes();

    let mut request = Request::new(method, parts.uri.path());
    request.query = parts.uri.query().map(|q| q.to_string());
    request.body = body;
    Ok(request)
}

/// Convert our Response to hyper Response
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut builder = hyper::Response::builder().status(res.status.as_u16());

    for (name, value) in &res.headers {
        builder = builder.header(*name, value.as_str());
    }

    builder.body(Full::new(res.body)).unwrap_or_else(|e| {
        error!(error = %e, "Invalid response head");
        let mut fallback = hyper::Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
        *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}
