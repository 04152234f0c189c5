//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{GenerateError, GenerationService};
use crossbeam_channel::{Receiver, Sender};
use shared::protocol::GenerateRequest;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::media::decode_preview;

/// Starts the backend worker thread. Each generate command runs as its own
/// task, so overlapping submissions race and their results arrive in
/// completion order.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: Arc<dyn GenerationService>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Generate {
                        request_id,
                        request,
                    } => {
                        tracing::info!(request_id, "backend: generate");
                        tokio::spawn(run_generation(
                            service.clone(),
                            ui_tx.clone(),
                            request_id,
                            request,
                        ));
                    }
                }
            }
            tracing::info!("backend: command queue closed, worker stopping");
        });
    })
}

async fn run_generation(
    service: Arc<dyn GenerationService>,
    ui_tx: Sender<UiEvent>,
    request_id: u64,
    request: GenerateRequest,
) {
    let outcome = service.generate(&request).await;
    let delivery =
        tokio::task::spawn_blocking(move || deliver_outcome(&ui_tx, request_id, outcome)).await;
    if let Err(err) = delivery {
        tracing::error!(request_id, "backend: result delivery task failed: {err}");
    }
}

/// Decodes the preview and hands the outcome to the UI. Blocks while the UI
/// queue is full so every dispatched request is eventually settled.
fn deliver_outcome(
    ui_tx: &Sender<UiEvent>,
    request_id: u64,
    outcome: Result<Vec<u8>, GenerateError>,
) {
    let event = match outcome {
        Ok(bytes) => {
            let preview = decode_preview(&bytes);
            if let Err(reason) = &preview {
                tracing::warn!(request_id, "backend: preview decode failed: {reason}");
            }
            UiEvent::GenerationSucceeded {
                request_id,
                bytes,
                preview,
            }
        }
        Err(err) => {
            tracing::error!(request_id, "backend: generate failed: {err}");
            UiEvent::GenerationFailed {
                request_id,
                error: UiError::from_generate_error(&err),
            }
        }
    };

    if ui_tx.send(event).is_err() {
        tracing::warn!(request_id, "backend: ui event queue closed, result dropped");
    }
}
