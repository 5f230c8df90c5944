use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_client::{
    AutoRefresh, BoundedLog, ClientConfig, DeviceApi, StreamConnection, StreamEvent,
    TelemetrySnapshotBuilder,
};
use gateway_model::format::{format_distance, format_field, format_lat_lon, format_time_to_cpa};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,gateway_client=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.4.1".to_string());
    let config = ClientConfig::for_host(&host);

    tracing::info!("Marine gateway console starting");
    tracing::info!("   Stream:   {}", config.stream_url);
    tracing::info!("   REST API: {}", config.http_base);

    let api = Arc::new(DeviceApi::new(&config)?);

    // Sentence monitor: stream events feed the bounded log, which the
    // summary loop drains to the terminal.
    let monitor = Arc::new(StdMutex::new(BoundedLog::<String>::new(
        config.monitor_capacity,
    )));
    let connection = StreamConnection::over_websocket(&config.stream_url, config.reconnect_delay);
    {
        let monitor = monitor.clone();
        connection.subscribe(move |event| match event {
            StreamEvent::Message(sentence) => {
                println!("{sentence}");
                monitor.lock().unwrap().push(sentence.clone());
            }
            StreamEvent::Connected => tracing::info!("sentence stream connected"),
            StreamEvent::Disconnected => tracing::warn!("sentence stream disconnected"),
            StreamEvent::TransportError(detail) => {
                tracing::warn!("sentence stream error: {}", detail)
            }
        });
    }
    connection.connect();

    // Instrument snapshots on the instrument cadence.
    let builder = Arc::new(Mutex::new(TelemetrySnapshotBuilder::new(api.clone())));
    let refresh = AutoRefresh::spawn(builder.clone(), config.instrument_refresh);

    // Periodic instrument summary.
    let summary_builder = builder.clone();
    let summary = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.status_refresh);
        loop {
            ticker.tick().await;
            let builder = summary_builder.lock().await;
            if let Some(snapshot) = builder.current() {
                print_summary(snapshot);
            }
        }
    });

    // Device status on the status cadence.
    let status_api = api.clone();
    let status = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.status_refresh);
        loop {
            ticker.tick().await;
            match status_api.system_status().await {
                Ok(status) => tracing::info!(
                    "device up {}s, heap {} free, wifi {} ({} dBm), {} uart sentences",
                    status.uptime,
                    status.heap.free,
                    status.wifi.mode,
                    status.wifi.rssi,
                    status.uart.sentences_received,
                ),
                Err(e) => tracing::warn!("status read failed: {}", e),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl+C, shutting down...");

    summary.abort();
    status.abort();
    refresh.stop();
    connection.disconnect();

    let buffered = monitor.lock().unwrap().len();
    tracing::info!("Shutdown complete ({} sentences buffered)", buffered);
    Ok(())
}

fn print_summary(snapshot: &gateway_model::TelemetrySnapshot) {
    let now = Instant::now();
    let sog = format_field(&snapshot.course.speed_over_ground, now);
    let depth = format_field(&snapshot.depth.below_transducer, now);
    let aws = format_field(&snapshot.wind.apparent_speed, now);

    println!(
        "--- {} | pos {} | sog {}{} | depth {}{} | aws {}{} | {} AIS targets ---",
        chrono::Local::now().format("%H:%M:%S"),
        format_lat_lon(&snapshot.position.latitude, &snapshot.position.longitude),
        sog.text,
        stale_marker(sog.stale),
        depth.text,
        stale_marker(depth.stale),
        aws.text,
        stale_marker(aws.stale),
        snapshot.ais_targets.len(),
    );

    for target in snapshot.ais_targets.iter().filter(|t| t.collision_risk()) {
        println!(
            "    CPA WARNING {}: cpa {} in {}",
            target
                .name
                .clone()
                .unwrap_or_else(|| target.mmsi.map_or("unknown".to_string(), |m| m.to_string())),
            format_distance(target.cpa_nm),
            format_time_to_cpa(target.tcpa_minutes),
        );
    }
}

fn stale_marker(stale: bool) -> &'static str {
    if stale {
        " (stale)"
    } else {
        ""
    }
}
