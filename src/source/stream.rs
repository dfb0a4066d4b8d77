//! Device feed source over a WebSocket connection.
//!
//! The connection lifecycle is an explicit state machine: the socket task
//! turns everything it observes into a [`StreamEvent`], feeds it to
//! [`DeviceConnection::apply`], and performs the returned
//! [`StreamAction`]s. Guards live in the state machine, not in the task.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::error::DecodeError;
use crate::monitor::SampleSink;
use crate::vitals::Sample;

/// Close code reported when the peer vanished without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

pub const STATUS_CONNECTING: &str = "Connecting...";
pub const STATUS_CONNECTED: &str = "Real Device Connected";
pub const STATUS_DISCONNECTED: &str = "Disconnected";

/// Lifecycle state of the device connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// Everything the socket task can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    ConnectRequested,
    Opened,
    Message(String),
    Closed { code: Option<u16>, reason: String },
    Failed(String),
    StopRequested,
}

/// Work the socket task must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamAction {
    Status(String),
    Emit(DeviceReading),
    Drop(DecodeError),
    SendClose,
}

/// Readings decoded from one device message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceReading {
    pub heart_rate: f64,
    pub blood_pressure_systolic: f64,
    pub blood_pressure_diastolic: f64,
    pub spo2: f64,
    pub temperature: f64,
    pub glucose: Option<f64>,
}

impl DeviceReading {
    /// Builds a sample, inheriting glucose from `previous` when the device
    /// did not report one.
    pub fn into_sample(self, timestamp: DateTime<Utc>, previous: Option<&Sample>) -> Sample {
        Sample {
            timestamp,
            heart_rate: self.heart_rate,
            blood_pressure_systolic: self.blood_pressure_systolic,
            blood_pressure_diastolic: self.blood_pressure_diastolic,
            spo2: self.spo2,
            glucose: self.glucose.or_else(|| previous.and_then(|p| p.glucose)),
            temperature: self.temperature,
        }
    }
}

const REQUIRED_FIELDS: [&str; 5] = [
    "heart_rate",
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    "spo2",
    "temperature",
];

fn number_field(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, DecodeError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| DecodeError::InvalidField {
                field,
                value: value.to_string(),
            }),
    }
}

/// Decodes one device message.
///
/// The five required fields must be present and numeric; `glucose` is
/// optional. Extra fields are ignored.
pub fn decode_device_message(text: &str) -> Result<DeviceReading, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let mut required = [0.0; 5];
    for (slot, field) in required.iter_mut().zip(REQUIRED_FIELDS) {
        *slot = number_field(object, field)?.ok_or(DecodeError::MissingField(field))?;
    }
    let [heart_rate, blood_pressure_systolic, blood_pressure_diastolic, spo2, temperature] =
        required;

    Ok(DeviceReading {
        heart_rate,
        blood_pressure_systolic,
        blood_pressure_diastolic,
        spo2,
        temperature,
        glucose: number_field(object, "glucose")?,
    })
}

/// Human-readable reason for a closed connection.
pub fn close_reason(code: Option<u16>, reason: &str) -> String {
    let code = code.unwrap_or(ABNORMAL_CLOSURE);
    if reason.is_empty() {
        format!("Disconnected: {} (Abnormal Closure)", code)
    } else {
        format!("Disconnected: {} {}", code, reason)
    }
}

/// Device connection state machine.
#[derive(Debug, Clone)]
pub struct DeviceConnection {
    state: ConnectionState,
}

impl Default for DeviceConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceConnection {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Applies an event and returns the actions it requires.
    ///
    /// Events that make no sense in the current state are ignored and
    /// return no actions.
    pub fn apply(&mut self, event: StreamEvent) -> Vec<StreamAction> {
        use ConnectionState::*;

        match (self.state, event) {
            (Disconnected | Closed, StreamEvent::ConnectRequested) => {
                self.state = Connecting;
                vec![StreamAction::Status(STATUS_CONNECTING.to_string())]
            }
            (Connecting, StreamEvent::Opened) => {
                self.state = Connected;
                vec![StreamAction::Status(STATUS_CONNECTED.to_string())]
            }
            (Connected, StreamEvent::Message(text)) => match decode_device_message(&text) {
                Ok(reading) => vec![StreamAction::Emit(reading)],
                Err(e) => vec![StreamAction::Drop(e)],
            },
            (Connecting | Connected, StreamEvent::Closed { code, reason }) => {
                self.state = Closed;
                vec![StreamAction::Status(close_reason(code, &reason))]
            }
            (Connecting | Connected, StreamEvent::Failed(error)) => {
                self.state = Disconnected;
                vec![StreamAction::Status(format!("Connection Error: {}", error))]
            }
            (Connected, StreamEvent::StopRequested) => {
                self.state = Disconnected;
                vec![
                    StreamAction::SendClose,
                    StreamAction::Status(STATUS_DISCONNECTED.to_string()),
                ]
            }
            (Connecting | Closed, StreamEvent::StopRequested) => {
                self.state = Disconnected;
                vec![StreamAction::Status(STATUS_DISCONNECTED.to_string())]
            }
            (state, event) => {
                tracing::debug!(?state, ?event, "Ignoring device stream event");
                Vec::new()
            }
        }
    }
}

/// WebSocket client feeding device readings into the monitor.
pub struct DeviceStreamSource {
    endpoint: String,
    connect_timeout: Duration,
}

impl DeviceStreamSource {
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout,
        }
    }

    /// Opens the connection and forwards readings until the peer closes,
    /// the connection fails, or `cancel_token` fires.
    pub fn start(self, sink: SampleSink, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(sink, cancel_token).await })
    }

    /// Performs actions; returns true if a close frame must be sent.
    fn perform(&self, actions: Vec<StreamAction>, sink: &SampleSink) -> bool {
        let mut send_close = false;
        for action in actions {
            match action {
                StreamAction::Status(status) => {
                    tracing::info!(endpoint = %self.endpoint, status = %status, "Device connection status");
                    sink.set_connection_status(status);
                }
                StreamAction::Emit(reading) => {
                    let previous = sink.previous();
                    let sample = reading.into_sample(Utc::now(), previous.as_ref());
                    sink.emit(sample);
                }
                StreamAction::Drop(error) => {
                    metrics::counter!(
                        "lifeline_stream_messages_dropped_total",
                        "reason" => error.reason()
                    )
                    .increment(1);
                    tracing::warn!(error = %error, "Dropping malformed device message");
                }
                StreamAction::SendClose => send_close = true,
            }
        }
        send_close
    }

    async fn run(self, sink: SampleSink, cancel_token: CancellationToken) {
        let mut connection = DeviceConnection::new();
        self.perform(connection.apply(StreamEvent::ConnectRequested), &sink);

        let connect = tokio::time::timeout(
            self.connect_timeout,
            tokio_tungstenite::connect_async(self.endpoint.as_str()),
        );

        let socket = tokio::select! {
            _ = cancel_token.cancelled() => {
                self.perform(connection.apply(StreamEvent::StopRequested), &sink);
                return;
            }
            result = connect => match result {
                Ok(Ok((socket, _response))) => socket,
                Ok(Err(e)) => {
                    self.perform(connection.apply(StreamEvent::Failed(e.to_string())), &sink);
                    return;
                }
                Err(_) => {
                    let error = format!(
                        "connect timeout after {}s",
                        self.connect_timeout.as_secs()
                    );
                    self.perform(connection.apply(StreamEvent::Failed(error)), &sink);
                    return;
                }
            }
        };

        self.perform(connection.apply(StreamEvent::Opened), &sink);
        let (mut writer, mut reader) = socket.split();

        loop {
            let event = tokio::select! {
                _ = cancel_token.cancelled() => StreamEvent::StopRequested,
                message = reader.next() => match message {
                    Some(Ok(Message::Text(text))) => StreamEvent::Message(text),
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => StreamEvent::Message(text),
                        Err(_) => {
                            self.perform(vec![StreamAction::Drop(DecodeError::InvalidUtf8)], &sink);
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(frame))) => StreamEvent::Closed {
                        code: frame.as_ref().map(|f| u16::from(f.code)),
                        reason: frame.map(|f| f.reason.into_owned()).unwrap_or_default(),
                    },
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => StreamEvent::Failed(e.to_string()),
                    None => StreamEvent::Closed { code: None, reason: String::new() },
                },
            };

            let terminal = !matches!(event, StreamEvent::Message(_));
            if self.perform(connection.apply(event), &sink) {
                if let Err(e) = writer.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "Failed to send close frame");
                }
            }
            if terminal {
                break;
            }
        }

        tracing::info!(endpoint = %self.endpoint, state = ?connection.state(), "Device stream ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"heart_rate":72,"blood_pressure_systolic":118,"blood_pressure_diastolic":76,"spo2":98,"temperature":36.6}"#;

    fn connected() -> DeviceConnection {
        let mut conn = DeviceConnection::new();
        conn.apply(StreamEvent::ConnectRequested);
        conn.apply(StreamEvent::Opened);
        conn
    }

    #[test]
    fn test_decode_valid_message_without_glucose() {
        let reading = decode_device_message(VALID).unwrap();
        assert_eq!(reading.heart_rate, 72.0);
        assert_eq!(reading.blood_pressure_systolic, 118.0);
        assert_eq!(reading.blood_pressure_diastolic, 76.0);
        assert_eq!(reading.spo2, 98.0);
        assert_eq!(reading.temperature, 36.6);
        assert!(reading.glucose.is_none());
    }

    #[test]
    fn test_decode_with_glucose_and_extra_fields() {
        let reading = decode_device_message(
            r#"{"heart_rate":72,"blood_pressure_systolic":118,"blood_pressure_diastolic":76,"spo2":98,"temperature":36.6,"glucose":104,"device":"esp32"}"#,
        )
        .unwrap();
        assert_eq!(reading.glucose, Some(104.0));
    }

    #[test]
    fn test_decode_missing_field() {
        let err = decode_device_message(
            r#"{"heart_rate":72,"blood_pressure_systolic":118,"spo2":98,"temperature":36.6}"#,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::MissingField("blood_pressure_diastolic"));
    }

    #[test]
    fn test_decode_null_required_field_is_missing() {
        let err = decode_device_message(
            r#"{"heart_rate":null,"blood_pressure_systolic":118,"blood_pressure_diastolic":76,"spo2":98,"temperature":36.6}"#,
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::MissingField("heart_rate"));
    }

    #[test]
    fn test_decode_non_numeric_field() {
        let err = decode_device_message(
            r#"{"heart_rate":"72","blood_pressure_systolic":118,"blood_pressure_diastolic":76,"spo2":98,"temperature":36.6}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "heart_rate", .. }));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_device_message("not json"),
            Err(DecodeError::Json(_))
        ));
        assert_eq!(
            decode_device_message("[1,2,3]").unwrap_err(),
            DecodeError::NotAnObject
        );
    }

    #[test]
    fn test_into_sample_inherits_previous_glucose() {
        let previous = Sample {
            timestamp: Utc::now(),
            heart_rate: 80.0,
            blood_pressure_systolic: 120.0,
            blood_pressure_diastolic: 80.0,
            spo2: 97.0,
            glucose: Some(123.0),
            temperature: 36.9,
        };
        let sample = decode_device_message(VALID)
            .unwrap()
            .into_sample(Utc::now(), Some(&previous));
        assert_eq!(sample.glucose, Some(123.0));
        assert_eq!(sample.heart_rate, 72.0);

        let first = decode_device_message(VALID)
            .unwrap()
            .into_sample(Utc::now(), None);
        assert_eq!(first.glucose, None);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut conn = DeviceConnection::new();
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        let actions = conn.apply(StreamEvent::ConnectRequested);
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert_eq!(actions, vec![StreamAction::Status("Connecting...".to_string())]);

        let actions = conn.apply(StreamEvent::Opened);
        assert_eq!(conn.state(), ConnectionState::Connected);
        assert_eq!(
            actions,
            vec![StreamAction::Status("Real Device Connected".to_string())]
        );

        let actions = conn.apply(StreamEvent::Message(VALID.to_string()));
        assert!(matches!(actions.as_slice(), [StreamAction::Emit(_)]));
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_malformed_message_does_not_change_state() {
        let mut conn = connected();
        let actions = conn.apply(StreamEvent::Message("{oops".to_string()));
        assert!(matches!(actions.as_slice(), [StreamAction::Drop(DecodeError::Json(_))]));
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_messages_ignored_unless_connected() {
        let mut conn = DeviceConnection::new();
        assert!(conn.apply(StreamEvent::Message(VALID.to_string())).is_empty());

        let mut conn = connected();
        conn.apply(StreamEvent::Closed {
            code: Some(1000),
            reason: "bye".to_string(),
        });
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert!(conn.apply(StreamEvent::Message(VALID.to_string())).is_empty());
    }

    #[test]
    fn test_close_without_reason_reports_abnormal_closure() {
        let mut conn = connected();
        let actions = conn.apply(StreamEvent::Closed {
            code: None,
            reason: String::new(),
        });
        assert_eq!(
            actions,
            vec![StreamAction::Status(
                "Disconnected: 1006 (Abnormal Closure)".to_string()
            )]
        );
    }

    #[test]
    fn test_close_with_reason() {
        assert_eq!(
            close_reason(Some(1001), "device rebooting"),
            "Disconnected: 1001 device rebooting"
        );
        assert_eq!(
            close_reason(Some(1000), ""),
            "Disconnected: 1000 (Abnormal Closure)"
        );
    }

    #[test]
    fn test_failure_moves_to_disconnected() {
        let mut conn = DeviceConnection::new();
        conn.apply(StreamEvent::ConnectRequested);
        let actions = conn.apply(StreamEvent::Failed("connection refused".to_string()));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(
            actions,
            vec![StreamAction::Status(
                "Connection Error: connection refused".to_string()
            )]
        );
    }

    #[test]
    fn test_stop_when_connected_sends_close() {
        let mut conn = connected();
        let actions = conn.apply(StreamEvent::StopRequested);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(actions[0], StreamAction::SendClose);
    }

    #[test]
    fn test_stop_when_disconnected_is_noop() {
        let mut conn = DeviceConnection::new();
        assert!(conn.apply(StreamEvent::StopRequested).is_empty());
    }

    #[test]
    fn test_reconnect_after_close() {
        let mut conn = connected();
        conn.apply(StreamEvent::Closed {
            code: None,
            reason: String::new(),
        });
        conn.apply(StreamEvent::ConnectRequested);
        assert_eq!(conn.state(), ConnectionState::Connecting);
    }
}
