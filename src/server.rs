use crate::api;
use crate::store::Store;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// Where the RPC listener binds, parsed from `tcp://HOST:PORT` or
/// `file:///absolute/socket/path`. Anything else is rejected at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenAddr {
    Tcp(String),
    Unix(PathBuf),
}

impl FromStr for ListenAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| format!("invalid listen address '{s}': {e}"))?;
        match url.scheme() {
            "tcp" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| format!("listen address '{s}' has no host"))?;
                let port = url
                    .port()
                    .ok_or_else(|| format!("listen address '{s}' has no port"))?;
                if host.contains(':') {
                    Ok(ListenAddr::Tcp(format!("[{host}]:{port}")))
                } else {
                    Ok(ListenAddr::Tcp(format!("{host}:{port}")))
                }
            }
            "file" => {
                let path = url.path();
                if path.is_empty() || path == "/" {
                    return Err(format!("listen address '{s}' has no socket path"));
                }
                Ok(ListenAddr::Unix(PathBuf::from(path)))
            }
            other => Err(format!(
                "unsupported listen scheme '{other}': expected tcp://HOST:PORT or file:///path"
            )),
        }
    }
}

/// Shared serving flag behind the health endpoint: NOT_SERVING between
/// bind and run, and again once the server has drained.
#[derive(Debug, Default)]
pub struct ServingState(AtomicBool);

impl ServingState {
    pub fn set_serving(&self, serving: bool) {
        self.0.store(serving, Ordering::SeqCst);
    }

    pub fn is_serving(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Server {
    inner: actix_web::dev::Server,
    state: web::Data<ServingState>,
}

impl Server {
    /// Binds the listener. The health endpoint reports NOT_SERVING until
    /// [`Server::run`] starts accepting.
    pub fn bind(store: Store, addr: &ListenAddr) -> io::Result<Server> {
        let state = web::Data::new(ServingState::default());
        let app_state = state.clone();
        let store = web::Data::new(store);

        let server = HttpServer::new(move || {
            App::new()
                .wrap(tracing_actix_web::TracingLogger::default())
                .wrap(middleware::Compress::default())
                .wrap(middleware::NormalizePath::new(
                    middleware::TrailingSlash::Trim,
                ))
                .app_data(store.clone())
                .app_data(app_state.clone())
                .service(api::health::routes())
                .service(api::routes::routes())
        })
        .workers(1);

        let server = match addr {
            ListenAddr::Tcp(hostport) => server.bind(hostport.as_str())?,
            #[cfg(unix)]
            ListenAddr::Unix(path) => server.bind_uds(path)?,
            #[cfg(not(unix))]
            ListenAddr::Unix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix domain sockets are not supported on this platform",
                ))
            }
        };

        Ok(Server {
            inner: server.run(),
            state,
        })
    }

    /// Handle for a programmatic graceful stop.
    pub fn handle(&self) -> actix_web::dev::ServerHandle {
        self.inner.handle()
    }

    /// Serves until SIGINT/SIGTERM or [`actix_web::dev::ServerHandle::stop`];
    /// in-flight requests drain before this returns.
    pub async fn run(self) -> io::Result<()> {
        let Server { inner, state } = self;
        state.set_serving(true);
        let result = inner.await;
        state.set_serving(false);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_addr() {
        let addr: ListenAddr = "tcp://127.0.0.1:7580".parse().unwrap();
        assert_eq!(addr, ListenAddr::Tcp("127.0.0.1:7580".into()));
    }

    #[test]
    fn test_parse_unix_addr() {
        let addr: ListenAddr = "file:///var/run/roost.sock".parse().unwrap();
        assert_eq!(addr, ListenAddr::Unix(PathBuf::from("/var/run/roost.sock")));
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!("http://127.0.0.1:7580".parse::<ListenAddr>().is_err());
        assert!("7580".parse::<ListenAddr>().is_err());
    }

    #[test]
    fn test_parse_requires_port() {
        assert!("tcp://127.0.0.1".parse::<ListenAddr>().is_err());
    }
}
