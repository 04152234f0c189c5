//! Form controller: owns the generator form state, enforces submission
//! preconditions, and swaps in generated results.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
    sync::Arc,
    time::{Duration, Instant},
};

use shared::{
    domain::{download_file_name, OutputFormat, SubmissionParameters},
    protocol::GenerateRequest,
};
use tracing::{debug, info, warn};
use url::Url;

use super::{
    events::{describe_generation_failure, UiError},
    feature_gate::platform_selector_visible,
    notification::{DismissCallback, NotificationChannel, NotificationDisplay},
    reducer::{apply_field_update, FieldUpdate},
    schedule::{Clock, DeferredAction},
};
use crate::{backend_bridge::commands::BackendCommand, media::DecodedPreview};

pub const VALIDATION_MESSAGE: &str = "Please enter text before generating an image.";
pub const HDR_REJECTION_MESSAGE: &str = "!!!!! ERROR !!!! Computer says no.";
pub const HDR_REJECTION_REDIRECT_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const HDR_REJECTION_REDIRECT_DELAY: Duration = Duration::from_millis(2000);
const GENERATION_FAILED_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    MissingText,
    HdrUnconfirmed,
}

pub enum SubmitOutcome {
    Dispatch(BackendCommand),
    Rejected(SubmitRejection),
}

/// Naming details captured when a request is sent, so later edits to the form
/// do not rename a result that is already on its way.
#[derive(Debug, Clone)]
struct PendingSubmission {
    download_name: String,
    format: OutputFormat,
    loop_animation: bool,
}

/// The image currently on display.
pub struct RenderedResult {
    pub request_id: u64,
    pub bytes: Arc<[u8]>,
    pub format: OutputFormat,
    pub download_name: String,
    pub loop_animation: bool,
    pub preview: Result<DecodedPreview, String>,
}

pub struct FormController {
    clock: Arc<dyn Clock>,
    location: Url,
    params: SubmissionParameters,
    validation_toast: NotificationDisplay,
    error_toast: NotificationDisplay,
    failure_toast: NotificationDisplay,
    forced_navigation: Option<DeferredAction<String>>,
    result: Option<RenderedResult>,
    pending: HashMap<u64, PendingSubmission>,
    next_request_id: u64,
    dismissed: Rc<RefCell<Vec<NotificationChannel>>>,
}

fn record_dismissal(dismissed: &Rc<RefCell<Vec<NotificationChannel>>>) -> DismissCallback {
    let dismissed = Rc::clone(dismissed);
    Box::new(move |channel| dismissed.borrow_mut().push(channel))
}

impl FormController {
    pub fn new(location: Url, clock: Arc<dyn Clock>) -> Self {
        let dismissed = Rc::new(RefCell::new(Vec::new()));
        Self {
            clock,
            location,
            params: SubmissionParameters::default(),
            validation_toast: NotificationDisplay::new(NotificationChannel::Validation)
                .with_dismiss_callback(record_dismissal(&dismissed)),
            error_toast: NotificationDisplay::new(NotificationChannel::GenericError)
                .with_dismiss_callback(record_dismissal(&dismissed)),
            failure_toast: NotificationDisplay::new(NotificationChannel::GenerationFailed)
                .with_duration(GENERATION_FAILED_DURATION)
                .with_dismiss_callback(record_dismissal(&dismissed)),
            forced_navigation: None,
            result: None,
            pending: HashMap::new(),
            next_request_id: 1,
            dismissed,
        }
    }

    pub fn params(&self) -> &SubmissionParameters {
        &self.params
    }

    /// Recomputed on every call; depends only on the launch location and the
    /// wall clock.
    pub fn platform_selector_visible(&self) -> bool {
        platform_selector_visible(&self.location, self.clock.wall_clock())
    }

    pub fn update_field(&mut self, update: FieldUpdate) {
        if matches!(update, FieldUpdate::Platform(_)) && !self.platform_selector_visible() {
            debug!("ignoring platform update while selector is hidden");
            return;
        }
        debug!(field = update.field_name(), "form field updated");
        self.params = apply_field_update(&self.params, update);
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        let now = self.clock.now();

        if !self.params.has_text() {
            self.validation_toast.activate(VALIDATION_MESSAGE, now);
            return SubmitOutcome::Rejected(SubmitRejection::MissingText);
        }

        if self.params.hdr_blocked() {
            warn!("hdr requested without confirmation; scheduling redirect");
            self.error_toast.activate(HDR_REJECTION_MESSAGE, now);
            if !self.navigation_scheduled() {
                self.forced_navigation = Some(DeferredAction::schedule(
                    now,
                    HDR_REJECTION_REDIRECT_DELAY,
                    HDR_REJECTION_REDIRECT_URL.to_string(),
                ));
            }
            return SubmitOutcome::Rejected(SubmitRejection::HdrUnconfirmed);
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let request = GenerateRequest::from(&self.params);
        let format = request.output_format();
        self.pending.insert(
            request_id,
            PendingSubmission {
                download_name: download_file_name(&request.text, format),
                format,
                loop_animation: request.loop_animation,
            },
        );
        info!(
            request_id,
            gif = request.gif,
            hdr = request.hdr,
            in_flight = self.pending.len(),
            "submitting generation request"
        );
        SubmitOutcome::Dispatch(BackendCommand::Generate {
            request_id,
            request,
        })
    }

    /// Publishes the new result, then releases the one it replaces.
    pub fn on_generation_succeeded(
        &mut self,
        request_id: u64,
        bytes: Vec<u8>,
        preview: Result<DecodedPreview, String>,
    ) {
        let Some(pending) = self.pending.remove(&request_id) else {
            warn!(request_id, "dropping result for unknown request");
            return;
        };
        info!(request_id, size_bytes = bytes.len(), "generated image received");
        let previous = self.result.replace(RenderedResult {
            request_id,
            bytes: Arc::from(bytes),
            format: pending.format,
            download_name: pending.download_name,
            loop_animation: pending.loop_animation,
            preview,
        });
        if let Some(previous) = previous {
            debug!(request_id = previous.request_id, "released previous result");
            drop(previous);
        }
    }

    pub fn on_generation_failed(&mut self, request_id: u64, error: &UiError) {
        self.pending.remove(&request_id);
        warn!(
            request_id,
            category = error.category().label(),
            "generation failed: {}",
            error.message()
        );
        let now = self.clock.now();
        self.failure_toast.activate(describe_generation_failure(error), now);
    }

    /// Advances timers. Returns the URL to navigate to once the forced
    /// redirect is due.
    pub fn tick(&mut self) -> Option<String> {
        let now = self.clock.now();
        self.validation_toast.tick(now);
        self.error_toast.tick(now);
        self.failure_toast.tick(now);
        self.forced_navigation
            .as_mut()
            .and_then(|navigation| navigation.poll(now))
    }

    pub fn dismiss(&mut self, channel: NotificationChannel) -> bool {
        self.notification_mut(channel).dismiss()
    }

    /// Channels hidden since the last call, by timeout or by the user.
    pub fn take_dismissed(&mut self) -> Vec<NotificationChannel> {
        self.dismissed.take()
    }

    pub fn notification(&self, channel: NotificationChannel) -> &NotificationDisplay {
        match channel {
            NotificationChannel::Validation => &self.validation_toast,
            NotificationChannel::GenericError => &self.error_toast,
            NotificationChannel::GenerationFailed => &self.failure_toast,
        }
    }

    fn notification_mut(&mut self, channel: NotificationChannel) -> &mut NotificationDisplay {
        match channel {
            NotificationChannel::Validation => &mut self.validation_toast,
            NotificationChannel::GenericError => &mut self.error_toast,
            NotificationChannel::GenerationFailed => &mut self.failure_toast,
        }
    }

    pub fn navigation_scheduled(&self) -> bool {
        self.forced_navigation
            .as_ref()
            .is_some_and(DeferredAction::is_pending)
    }

    pub fn navigation_due_at(&self) -> Option<Instant> {
        self.forced_navigation
            .as_ref()
            .and_then(DeferredAction::due_at)
    }

    /// Earliest pending timer, for scheduling the next repaint.
    pub fn next_deadline(&self) -> Option<Instant> {
        NotificationChannel::ALL
            .iter()
            .filter_map(|channel| self.notification(*channel).deadline())
            .chain(self.navigation_due_at())
            .min()
    }

    pub fn result(&self) -> Option<&RenderedResult> {
        self.result.as_ref()
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}
