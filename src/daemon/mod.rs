//! Daemon orchestration: spawns the tick driver, the Modbus TCP slave, and
//! the HTTP/SSE server as independent tasks sharing one
//! `Arc<RwLock<SimState>>`, tracked in a task registry guarded by a single
//! running flag so shutdown can stop every task the same way.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use rand::Rng;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};

use crate::config::Args;
use crate::http;
use crate::modbus::PlantModbusServer;
use crate::physics;
use crate::state::SimState;

pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    state: Arc<RwLock<SimState>>,
}

impl Daemon {
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            state: Arc::new(RwLock::new(SimState::default())),
        }
    }

    /// Warm up, then spawn the tick driver, Modbus slave, and HTTP server.
    /// Warmup runs `args.warmup_ticks` physics steps before any network
    /// listener is bound, so the first connection a client makes never
    /// observes the all-zero startup transient.
    pub async fn launch(&mut self, args: Args) -> Result<()> {
        let dt = args.tick_duration().as_secs_f64();
        let mut rng = rand::rng();
        {
            let mut state = self.state.write().await;
            for _ in 0..args.warmup_ticks {
                physics::tick(&mut state, dt, &mut rng);
            }
        }
        info!("completed {} warmup ticks", args.warmup_ticks);

        self.spawn_tick_driver(args.tick_duration());
        self.spawn_modbus_server(&args).await?;
        self.spawn_http_server(&args).await?;
        Ok(())
    }

    fn spawn_tick_driver(&mut self, period: Duration) {
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            let mut rng = rand::rng();
            let dt = period.as_secs_f64();
            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                let mut state = state.write().await;
                physics::tick(&mut state, dt, &mut rng);
            }
            info!("tick driver stopped");
            Ok(())
        });
        self.tasks.push(task);
    }

    async fn spawn_modbus_server(&mut self, args: &Args) -> Result<()> {
        let listener = bind_modbus_listener(&args.modbus_address, args.modbus_port).await?;
        let local_addr = listener.local_addr()?;
        info!("modbus slave listening on {local_addr}");

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let idle_timeout = args.modbus_idle_timeout();

        let task = tokio::spawn(async move {
            let server = Server::new(listener);
            let on_connected = move |stream: tokio::net::TcpStream, socket_addr: SocketAddr| {
                let state = Arc::clone(&state);
                async move {
                    debug!("modbus client connected from {socket_addr}, idle timeout {idle_timeout:?}");
                    accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                        Ok(Some(PlantModbusServer::new(Arc::clone(&state))))
                    })
                }
            };
            let on_process_error = |err| error!("modbus server error: {err}");

            let server_handle =
                tokio::spawn(async move { server.serve(&on_connected, on_process_error).await });

            while running.load(Ordering::SeqCst) {
                time::sleep(Duration::from_secs(1)).await;
            }

            info!("shutting down modbus slave");
            server_handle.abort();
            match time::timeout(Duration::from_secs(2), server_handle).await {
                Ok(_) => info!("modbus slave shut down"),
                Err(_) => warn!("modbus slave shutdown timed out"),
            }
            Ok(())
        });
        self.tasks.push(task);
        Ok(())
    }

    async fn spawn_http_server(&mut self, args: &Args) -> Result<()> {
        let figment = rocket::Config::figment()
            .merge(("address", args.http_address.clone()))
            .merge(("port", args.http_port))
            .merge(("log_level", rocket::config::LogLevel::Off));

        let rocket = http::build_rocket(figment, Arc::clone(&self.state), args.tick_duration())
            .ignite()
            .await
            .context("failed to configure HTTP server")?;

        info!(
            "http server listening on {}:{}",
            args.http_address, args.http_port
        );

        let shutdown_handle = rocket.shutdown();
        let running = Arc::clone(&self.running);

        let task = tokio::spawn(async move {
            let watchdog = tokio::spawn(async move {
                while running.load(Ordering::SeqCst) {
                    time::sleep(Duration::from_secs(1)).await;
                }
                shutdown_handle.notify();
            });
            let result = rocket.launch().await;
            watchdog.abort();
            result.map(|_| ()).context("rocket server error")
        });
        self.tasks.push(task);
        Ok(())
    }

    /// Signal every task to stop. Does not wait for completion; call
    /// [`Daemon::join`] afterward.
    pub fn shutdown(&self) {
        info!("shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for all tasks to finish, draining in-flight requests with a
    /// short deadline per task.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match time::timeout(Duration::from_secs(5), task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => error!("daemon task returned an error: {e}"),
                Ok(Err(e)) => error!("daemon task panicked: {e}"),
                Err(_) => warn!("daemon task did not complete within the shutdown deadline"),
            }
        }
        Ok(())
    }
}

/// Bind the Modbus TCP listener, falling back from the privileged default
/// port 502 to 5020 when the process lacks permission to bind it.
async fn bind_modbus_listener(address: &str, port: u16) -> Result<TcpListener> {
    let primary = format!("{address}:{port}");
    match TcpListener::bind(&primary).await {
        Ok(listener) => Ok(listener),
        Err(e) if port == 502 => {
            warn!("failed to bind modbus port 502 ({e}), falling back to 5020");
            let fallback = format!("{address}:5020");
            TcpListener::bind(&fallback)
                .await
                .with_context(|| format!("failed to bind modbus listener on {fallback}"))
        }
        Err(e) => Err(e).with_context(|| format!("failed to bind modbus listener on {primary}")),
    }
}
