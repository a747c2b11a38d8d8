//! Local HTTP endpoint for git hooks and scripts.
//!
//! `POST /trigger` with `{"type": "success" | "big" | ...}` becomes a
//! `celebrate-*` event, the same one the settings window emits.

use std::io::Read;
use std::thread;

use serde::Deserialize;
use tauri::{AppHandle, Emitter};
use tiny_http::{Method, Response, Server};

use crate::events::{Trigger, OVERLAY_WINDOW};

pub const TRIGGER_ADDR: &str = "127.0.0.1:23333";

#[derive(Debug, Deserialize)]
struct TriggerRequest {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: &'static str,
    pub trigger: Option<Trigger>,
}

impl Reply {
    fn error(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            trigger: None,
        }
    }
}

pub fn route(method: &Method, url: &str, body: &str) -> Reply {
    if *method != Method::Post || url != "/trigger" {
        return Reply::error(404, "Not Found");
    }

    match serde_json::from_str::<TriggerRequest>(body) {
        Ok(request) => Reply {
            status: 200,
            body: "OK",
            trigger: Some(Trigger::from_hook_kind(&request.kind)),
        },
        Err(_) => Reply::error(400, "Invalid JSON"),
    }
}

/// Serves on a dedicated thread for the life of the process. A busy port
/// is logged and the app keeps running without the endpoint.
pub fn start_server(app: AppHandle) {
    thread::spawn(move || {
        let server = match Server::http(TRIGGER_ADDR) {
            Ok(server) => server,
            Err(err) => {
                tracing::error!("failed to start trigger server on {TRIGGER_ADDR}: {err}");
                return;
            }
        };
        tracing::info!("trigger server listening on {TRIGGER_ADDR}");

        for mut request in server.incoming_requests() {
            let mut content = String::new();
            let reply = if request.as_reader().read_to_string(&mut content).is_err() {
                Reply::error(400, "Failed to read body")
            } else {
                route(request.method(), request.url(), &content)
            };

            if let Some(trigger) = reply.trigger {
                tracing::debug!(?trigger, "trigger request received");
                if let Err(err) = app.emit_to(OVERLAY_WINDOW, trigger.event_name(), ()) {
                    tracing::warn!("failed to emit {}: {err}", trigger.event_name());
                }
            }

            let response = Response::from_string(reply.body).with_status_code(reply.status);
            if let Err(err) = request.respond(response) {
                tracing::debug!("failed to answer trigger request: {err}");
            }
        }
    });
}
