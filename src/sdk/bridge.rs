//! SDK Bridge Connection
//!
//! Persistent TCP link to the process hosting the vendor flight SDK.
//! Reconnects with exponential backoff, correlates service requests with
//! their responses, and forwards telemetry notifications to a channel.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use pilot_shared::{
    codec::{self, FrameDecoder},
    envelope::Payload,
    service_request::Call,
    timing, ArmControlRequest, ControlAuthorityRequest, DroneTask, Envelope,
    QueryVersionRequest, ServiceRequest, ServiceResponse, SetLocalPosRefRequest,
    TaskControlRequest, TelemetryNotification,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{DroneVersion, FlightSdk};
use crate::command::CommandVector;

/// Inbound telemetry notifications, in arrival order
pub type NotificationReceiver = mpsc::Receiver<TelemetryNotification>;

type PendingCalls = Arc<Mutex<HashMap<u64, oneshot::Sender<ServiceResponse>>>>;

/// Configuration for the SDK bridge link
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bridge process address (e.g., "127.0.0.1:9090")
    pub address: String,
    /// Connection attempt timeout
    pub connect_timeout: Duration,
    /// Reconnection delay (initial)
    pub reconnect_delay: Duration,
    /// Maximum reconnection delay
    pub max_reconnect_delay: Duration,
    /// How long a service call waits for its response
    pub service_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9090".into(),
            connect_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_millis(timing::RECONNECT_DELAY_MS),
            max_reconnect_delay: Duration::from_millis(timing::MAX_RECONNECT_DELAY_MS),
            service_timeout: Duration::from_millis(timing::SERVICE_TIMEOUT_MS),
        }
    }
}

/// [`FlightSdk`] backed by the bridge process
pub struct SdkBridge {
    /// Channel for outgoing envelopes
    outbound_tx: mpsc::Sender<Envelope>,
    /// Service calls awaiting a response, by call id
    pending: PendingCalls,
    sequence_id: AtomicU64,
    call_id: AtomicU64,
    connected: Arc<RwLock<bool>>,
    service_timeout: Duration,
    task: JoinHandle<()>,
}

impl SdkBridge {
    /// Start the connection task and return the bridge with its notification stream
    pub fn connect(config: BridgeConfig) -> (Self, NotificationReceiver) {
        let (outbound_tx, outbound_rx) = mpsc::channel::<Envelope>(100);
        let (notification_tx, notification_rx) = mpsc::channel::<TelemetryNotification>(256);
        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(RwLock::new(false));
        let service_timeout = config.service_timeout;

        let task = tokio::spawn(connection_loop(
            config,
            outbound_rx,
            notification_tx,
            pending.clone(),
            connected.clone(),
        ));

        let bridge = Self {
            outbound_tx,
            pending,
            sequence_id: AtomicU64::new(0),
            call_id: AtomicU64::new(0),
            connected,
            service_timeout,
            task,
        };

        (bridge, notification_rx)
    }

    /// Check if the bridge link is up
    pub async fn is_connected(&self) -> bool {
        *self.connected.read().await
    }

    fn next_sequence(&self) -> u64 {
        self.sequence_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Send a service request and wait for the matching response
    async fn call(&self, call: Call) -> Result<ServiceResponse> {
        // A request queued across a reconnect would run after its caller gave up
        if !self.is_connected().await {
            bail!("SDK bridge not connected");
        }

        let call_id = self.call_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(call_id, tx);

        debug!("[BRIDGE] Call {} -> {:?}", call_id, call);
        let envelope = Envelope::new(
            self.next_sequence(),
            Payload::ServiceRequest(ServiceRequest::new(call_id, call)),
        );

        if self.outbound_tx.send(envelope).await.is_err() {
            self.pending.lock().await.remove(&call_id);
            bail!("SDK bridge closed");
        }

        match timeout(self.service_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(anyhow!("SDK bridge disconnected during call {}", call_id)),
            Err(_) => {
                self.pending.lock().await.remove(&call_id);
                Err(anyhow!(
                    "No response to call {} within {:?}",
                    call_id,
                    self.service_timeout
                ))
            }
        }
    }
}

impl Drop for SdkBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl FlightSdk for SdkBridge {
    async fn publish_setpoint(&self, command: CommandVector) -> Result<()> {
        // Setpoints are only meaningful now; never queue them across a reconnect
        if !self.is_connected().await {
            bail!("SDK bridge not connected");
        }

        let envelope = Envelope::new(self.next_sequence(), Payload::Setpoint(command.into()));
        self.outbound_tx
            .try_send(envelope)
            .map_err(|e| anyhow!("Setpoint not queued: {}", e))
    }

    async fn sdk_control_authority(&self, enable: bool) -> Result<bool> {
        let response = self
            .call(Call::ControlAuthority(ControlAuthorityRequest { enable }))
            .await?;
        Ok(response.result)
    }

    async fn drone_task_control(&self, task: DroneTask) -> Result<bool> {
        let response = self
            .call(Call::TaskControl(TaskControlRequest { task: task as u32 }))
            .await?;
        Ok(response.result)
    }

    async fn drone_arm_control(&self, arm: bool) -> Result<bool> {
        let response = self.call(Call::ArmControl(ArmControlRequest { arm })).await?;
        Ok(response.result)
    }

    async fn query_drone_version(&self) -> Result<DroneVersion> {
        let response = self.call(Call::QueryVersion(QueryVersionRequest {})).await?;
        if !response.result {
            bail!("Version query refused by autopilot");
        }
        Ok(DroneVersion {
            version: response.version,
            hardware: response.hardware,
        })
    }

    async fn set_local_pos_ref(&self) -> Result<bool> {
        let response = self
            .call(Call::SetLocalPosRef(SetLocalPosRefRequest {}))
            .await?;
        Ok(response.result)
    }
}

/// Main connection loop
async fn connection_loop(
    config: BridgeConfig,
    mut outbound_rx: mpsc::Receiver<Envelope>,
    notification_tx: mpsc::Sender<TelemetryNotification>,
    pending: PendingCalls,
    connected: Arc<RwLock<bool>>,
) {
    let mut reconnect_delay = config.reconnect_delay;

    loop {
        info!("[BRIDGE] Connecting to SDK bridge at {}", config.address);

        match timeout(config.connect_timeout, TcpStream::connect(&config.address)).await {
            Ok(Ok(stream)) => {
                info!("[BRIDGE] Connected");
                reconnect_delay = config.reconnect_delay;
                *connected.write().await = true;

                if let Err(e) =
                    handle_connection(stream, &mut outbound_rx, &notification_tx, &pending).await
                {
                    warn!("[BRIDGE] Disconnected: {}", e);
                }

                *connected.write().await = false;
                // Dropping the senders fails every call still in flight
                pending.lock().await.clear();
            }
            Ok(Err(e)) => {
                warn!("[BRIDGE] Failed to connect: {}", e);
            }
            Err(_) => {
                warn!("[BRIDGE] Connect timed out after {:?}", config.connect_timeout);
            }
        }

        tokio::time::sleep(reconnect_delay).await;
        reconnect_delay = std::cmp::min(reconnect_delay * 2, config.max_reconnect_delay);
    }
}

/// Handle an active connection until it fails
async fn handle_connection(
    stream: TcpStream,
    outbound_rx: &mut mpsc::Receiver<Envelope>,
    notification_tx: &mpsc::Sender<TelemetryNotification>,
    pending: &PendingCalls,
) -> Result<()> {
    let (mut reader, mut writer) = stream.into_split();
    let mut decoder = FrameDecoder::new();
    let mut read_buf = BytesMut::with_capacity(4096);

    loop {
        tokio::select! {
            Some(envelope) = outbound_rx.recv() => {
                if !still_wanted(&envelope, pending).await {
                    debug!("[BRIDGE] Dropping expired envelope {}", envelope.sequence_id);
                    continue;
                }
                let frame = codec::encode(&envelope)?;
                writer.write_all(&frame).await?;
            }

            result = reader.read_buf(&mut read_buf) => {
                if result? == 0 {
                    return Err(anyhow!("Bridge closed connection"));
                }
                decoder.extend(&read_buf);
                read_buf.clear();

                while let Some(envelope) = decoder.decode_next()? {
                    route_inbound(envelope, notification_tx, pending).await;
                }
            }
        }
    }
}

/// Service requests are only written while their caller is still waiting
async fn still_wanted(envelope: &Envelope, pending: &PendingCalls) -> bool {
    match &envelope.payload {
        Some(Payload::ServiceRequest(request)) => {
            pending.lock().await.contains_key(&request.call_id)
        }
        _ => true,
    }
}

async fn route_inbound(
    envelope: Envelope,
    notification_tx: &mpsc::Sender<TelemetryNotification>,
    pending: &PendingCalls,
) {
    match envelope.payload {
        Some(Payload::ServiceResponse(response)) => {
            match pending.lock().await.remove(&response.call_id) {
                Some(tx) => {
                    let _ = tx.send(response);
                }
                None => debug!("[BRIDGE] Response for unknown call {}", response.call_id),
            }
        }
        Some(Payload::Telemetry(notification)) => match notification_tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("[BRIDGE] Notification dropped, subscriber lagging");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("[BRIDGE] Notification dropped, no subscriber");
            }
        },
        Some(other) => {
            debug!("[BRIDGE] Ignoring unexpected payload: {:?}", other);
        }
        None => {
            debug!("[BRIDGE] Envelope {} without payload", envelope.sequence_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pilot_shared::telemetry_notification::Kind;
    use tokio::net::TcpListener;

    async fn wait_connected(bridge: &SdkBridge) {
        timeout(Duration::from_secs(2), async {
            while !bridge.is_connected().await {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("bridge never connected");
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.service_timeout, Duration::from_secs(3));
        assert!(config.reconnect_delay < config.max_reconnect_delay);
    }

    fn reply_to(request: &ServiceRequest) -> ServiceResponse {
        match &request.call {
            Some(Call::SetLocalPosRef(_)) => ServiceResponse::result(request.call_id, true),
            Some(Call::TaskControl(t)) => {
                ServiceResponse::result(request.call_id, t.task == DroneTask::Land as u32)
            }
            Some(Call::QueryVersion(_)) => ServiceResponse {
                call_id: request.call_id,
                result: true,
                version: 7,
                hardware: "N3".into(),
            },
            _ => ServiceResponse::result(request.call_id, false),
        }
    }

    #[tokio::test]
    async fn test_service_calls_and_notifications_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let push = Envelope::new(
                1,
                Payload::Telemetry(TelemetryNotification::new(Kind::Height(2.5))),
            );
            stream.write_all(&codec::encode(&push).unwrap()).await.unwrap();

            let mut decoder = FrameDecoder::new();
            let mut buf = [0u8; 1024];
            let mut requests = Vec::new();
            while requests.len() < 3 {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                decoder.extend(&buf[..n]);
                while let Some(envelope) = decoder.decode_next().unwrap() {
                    if let Some(Payload::ServiceRequest(request)) = envelope.payload {
                        let reply = Envelope::new(2, Payload::ServiceResponse(reply_to(&request)));
                        stream.write_all(&codec::encode(&reply).unwrap()).await.unwrap();
                        requests.push(request);
                    }
                }
            }
            requests
        });

        let (bridge, mut notifications) = SdkBridge::connect(BridgeConfig {
            address,
            ..Default::default()
        });
        wait_connected(&bridge).await;

        assert!(bridge.set_local_pos_ref().await.unwrap());
        assert!(!bridge.drone_task_control(DroneTask::Takeoff).await.unwrap());
        assert_eq!(
            bridge.query_drone_version().await.unwrap(),
            DroneVersion {
                version: 7,
                hardware: "N3".into()
            }
        );

        let notification = timeout(Duration::from_secs(1), notifications.recv())
            .await
            .expect("no notification")
            .expect("channel closed");
        assert_eq!(notification.kind, Some(Kind::Height(2.5)));

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 3);
        assert!(matches!(requests[0].call, Some(Call::SetLocalPosRef(_))));
        assert!(matches!(
            requests[1].call,
            Some(Call::TaskControl(TaskControlRequest { task: 4 }))
        ));
    }

    #[tokio::test]
    async fn test_setpoint_refused_while_disconnected() {
        let (bridge, _notifications) = SdkBridge::connect(BridgeConfig {
            address: "127.0.0.1:1".into(),
            ..Default::default()
        });

        let result = bridge
            .publish_setpoint(CommandVector::vertical_velocity(0.5))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_service_call_fails_fast_while_disconnected() {
        let (bridge, _notifications) = SdkBridge::connect(BridgeConfig {
            address: "127.0.0.1:1".into(),
            service_timeout: Duration::from_secs(10),
            ..Default::default()
        });

        let result = timeout(Duration::from_secs(1), bridge.sdk_control_authority(true))
            .await
            .expect("call waited for the service timeout");
        assert!(result.is_err());
        assert!(bridge.pending.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_call_not_sent_after_reconnect() {
        // Reserve a port, then leave it closed while the call is made
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let (bridge, _notifications) = SdkBridge::connect(BridgeConfig {
            address: address.to_string(),
            reconnect_delay: Duration::from_millis(50),
            max_reconnect_delay: Duration::from_millis(100),
            service_timeout: Duration::from_millis(100),
            ..Default::default()
        });

        assert!(bridge.drone_task_control(DroneTask::Land).await.is_err());

        let listener = TcpListener::bind(address).await.unwrap();
        let (mut stream, _) = timeout(Duration::from_secs(2), listener.accept())
            .await
            .expect("bridge never reconnected")
            .unwrap();
        wait_connected(&bridge).await;

        let mut buf = [0u8; 64];
        let read = timeout(Duration::from_millis(300), stream.read(&mut buf)).await;
        assert!(read.is_err(), "bridge wrote after reconnect: {:?}", read);
    }

    #[tokio::test]
    async fn test_expired_requests_are_not_written() {
        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));
        let (tx, _rx) = oneshot::channel();
        pending.lock().await.insert(1, tx);

        let request = |call_id| {
            Envelope::new(
                call_id,
                Payload::ServiceRequest(ServiceRequest::new(
                    call_id,
                    Call::TaskControl(TaskControlRequest {
                        task: DroneTask::Land as u32,
                    }),
                )),
            )
        };
        let setpoint = Envelope::new(3, Payload::Setpoint(CommandVector::yaw(0.1).into()));

        assert!(still_wanted(&request(1), &pending).await);
        assert!(!still_wanted(&request(2), &pending).await);
        assert!(still_wanted(&setpoint, &pending).await);
    }

    #[tokio::test]
    async fn test_full_notification_channel_does_not_block() {
        let (notification_tx, mut notification_rx) = mpsc::channel(1);
        let pending: PendingCalls = Arc::new(Mutex::new(HashMap::new()));
        let height = |h| {
            Envelope::new(
                1,
                Payload::Telemetry(TelemetryNotification::new(Kind::Height(h))),
            )
        };

        timeout(Duration::from_secs(1), async {
            route_inbound(height(1.0), &notification_tx, &pending).await;
            route_inbound(height(2.0), &notification_tx, &pending).await;
        })
        .await
        .expect("routing blocked on a full channel");

        let first = notification_rx.recv().await.unwrap();
        assert_eq!(first.kind, Some(Kind::Height(1.0)));
        assert!(notification_rx.try_recv().is_err());
    }
}
