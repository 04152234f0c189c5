//! Backend commands queued from UI to backend worker.

use shared::protocol::GenerateRequest;

pub enum BackendCommand {
    Generate {
        request_id: u64,
        request: GenerateRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
        }
    }

    pub fn request_id(&self) -> u64 {
        match self {
            Self::Generate { request_id, .. } => *request_id,
        }
    }
}
