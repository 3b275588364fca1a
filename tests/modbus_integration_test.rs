//! Modbus TCP slave integration tests: launch the real daemon on a fixed
//! test port and drive it with `tokio-modbus`'s TCP client.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use ro_plant_twin::config::Args;
use ro_plant_twin::daemon::Daemon;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_modbus::prelude::*;

/// Serializes daemon startup across test binaries so fixed test ports never
/// collide.
static DAEMON_LOCK: Mutex<()> = Mutex::const_new(());

async fn start_daemon(modbus_port: u16, http_port: u16) -> (Daemon, tokio::sync::MutexGuard<'static, ()>) {
    let _lock = DAEMON_LOCK.lock().await;
    let _ = env_logger::builder().is_test(true).try_init();

    let args = Args::parse_from([
        "ro-plant-twin",
        "--modbus-address",
        "127.0.0.1",
        "--modbus-port",
        &modbus_port.to_string(),
        "--http-address",
        "127.0.0.1",
        "--http-port",
        &http_port.to_string(),
        "--tick-ms",
        "50",
        "--warmup-ticks",
        "2",
    ]);

    let mut daemon = Daemon::new();
    daemon.launch(args).await.expect("daemon failed to launch");
    sleep(Duration::from_millis(300)).await;

    (daemon, _lock)
}

#[tokio::test]
async fn read_coils_returns_default_valve_state() -> Result<(), Box<dyn std::error::Error>> {
    let (daemon, _lock) = start_daemon(15502, 18000).await;
    let addr = SocketAddr::from_str("127.0.0.1:15502")?;
    let mut ctx = tcp::connect(addr).await?;

    let coils = ctx.read_coils(0, 10).await??;
    assert_eq!(coils.len(), 10);
    assert!(!coils[0], "wellfield_on defaults off");
    assert!(coils[3], "valve_101_open defaults open");
    assert!(coils[7], "valve_401_open defaults open");

    ctx.disconnect().await?;
    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}

#[tokio::test]
async fn write_single_coil_then_read_back() -> Result<(), Box<dyn std::error::Error>> {
    let (daemon, _lock) = start_daemon(15503, 18001).await;
    let addr = SocketAddr::from_str("127.0.0.1:15503")?;
    let mut ctx = tcp::connect(addr).await?;

    ctx.write_single_coil(0, true).await??;
    let coils = ctx.read_coils(0, 1).await??;
    assert!(coils[0]);

    ctx.disconnect().await?;
    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}

#[tokio::test]
async fn write_single_register_applies_scaled_setpoint() -> Result<(), Box<dyn std::error::Error>> {
    let (daemon, _lock) = start_daemon(15504, 18002).await;
    let addr = SocketAddr::from_str("127.0.0.1:15504")?;
    let mut ctx = tcp::connect(addr).await?;

    // Holding register 1 is Cl_dose, scale 10 -> 2.5 mg/L encodes to 25.
    ctx.write_single_register(1, 25).await??;
    let regs = ctx.read_holding_registers(1, 1).await??;
    assert_eq!(regs[0], 25);

    ctx.disconnect().await?;
    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}

#[tokio::test]
async fn write_to_read_only_holding_register_is_illegal_data_address() -> Result<(), Box<dyn std::error::Error>> {
    let (daemon, _lock) = start_daemon(15505, 18003).await;
    let addr = SocketAddr::from_str("127.0.0.1:15505")?;
    let mut ctx = tcp::connect(addr).await?;

    // Holding register 10 is Q_wellfield, read-only.
    let result = ctx.write_single_register(10, 5).await?;
    assert!(result.is_err());

    ctx.disconnect().await?;
    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}

#[tokio::test]
async fn read_from_unmapped_holding_gap_is_illegal_data_address() -> Result<(), Box<dyn std::error::Error>> {
    let (daemon, _lock) = start_daemon(15506, 18004).await;
    let addr = SocketAddr::from_str("127.0.0.1:15506")?;
    let mut ctx = tcp::connect(addr).await?;

    let result = ctx.read_holding_registers(5, 1).await?;
    assert!(result.is_err());

    ctx.disconnect().await?;
    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}

#[tokio::test]
async fn write_multiple_coils_sets_every_target_address() -> Result<(), Box<dyn std::error::Error>> {
    let (daemon, _lock) = start_daemon(15507, 18005).await;
    let addr = SocketAddr::from_str("127.0.0.1:15507")?;
    let mut ctx = tcp::connect(addr).await?;

    ctx.write_multiple_coils(0, &[true, true, false]).await??;
    let coils = ctx.read_coils(0, 3).await??;
    assert_eq!(coils, vec![true, true, false]);

    ctx.disconnect().await?;
    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}
