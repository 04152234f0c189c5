//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns `false` (and explains why
/// in `status`) when the command could not be queued.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;
    use shared::{domain::SubmissionParameters, protocol::GenerateRequest};

    use super::*;

    fn generate_command(request_id: u64) -> BackendCommand {
        BackendCommand::Generate {
            request_id,
            request: GenerateRequest::from(&SubmissionParameters {
                text: "hi".to_string(),
                ..SubmissionParameters::default()
            }),
        }
    }

    #[test]
    fn reports_full_queue() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, generate_command(1), &mut status));
        assert!(!dispatch_backend_command(&tx, generate_command(2), &mut status));
        assert_eq!(status, "UI command queue is full; please retry");
    }

    #[test]
    fn reports_disconnected_worker() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(&tx, generate_command(1), &mut status));
        assert!(status.starts_with("Backend command processor disconnected"));
    }
}
