use std::{
    fs,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{OutputFormat, Platform};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::form::{FormController, RenderedResult, SubmitOutcome};
use crate::controller::notification::NotificationChannel;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::FieldUpdate;
use crate::media::{self, DecodedPreview, PreviewImage};

const IDLE_REPAINT: Duration = Duration::from_millis(100);
const ANIMATION_REPAINT: Duration = Duration::from_millis(16);
const MAX_PREVIEW_HEIGHT: f32 = 360.0;
const MIN_FRAME_DELAY_MS: u32 = 20;
const HDR_CONFIRMATION_LABEL: &str =
    "I accept responsibility for all enemies I make by generating HDR emojis";
const PROJECT_URL: &str = "https://github.com/kamyar/emoji-maker/";
const AUTHOR_URL: &str = "https://kamy.me";

struct ResultFrame {
    texture: egui::TextureHandle,
    delay_ms: u32,
}

/// GPU-side view of the current result. Rebuilt whenever the controller
/// publishes a different result; dropping it frees the textures.
struct ResultView {
    request_id: u64,
    frames: Vec<ResultFrame>,
    current_frame: usize,
    next_frame_at_secs: Option<f64>,
    loop_animation: bool,
}

fn load_frame(
    ctx: &egui::Context,
    name: String,
    image: &PreviewImage,
    delay_ms: u32,
) -> ResultFrame {
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
    ResultFrame {
        texture: ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR),
        delay_ms,
    }
}

impl ResultView {
    fn build(ctx: &egui::Context, result: &RenderedResult) -> Self {
        let frames = match &result.preview {
            Ok(DecodedPreview::Static(image)) => vec![load_frame(
                ctx,
                format!("generated_{}", result.request_id),
                image,
                0,
            )],
            Ok(DecodedPreview::Animated(frames)) => frames
                .iter()
                .enumerate()
                .map(|(index, frame)| {
                    load_frame(
                        ctx,
                        format!("generated_{}_{index}", result.request_id),
                        &frame.image,
                        frame.delay_ms,
                    )
                })
                .collect(),
            Err(_) => Vec::new(),
        };

        Self {
            request_id: result.request_id,
            frames,
            current_frame: 0,
            next_frame_at_secs: None,
            loop_animation: result.loop_animation,
        }
    }

    fn is_animating(&self) -> bool {
        self.frames.len() > 1
            && (self.loop_animation || self.current_frame + 1 < self.frames.len())
    }

    fn frame_delay_secs(&self, index: usize) -> f64 {
        self.frames
            .get(index)
            .map(|frame| frame.delay_ms.max(MIN_FRAME_DELAY_MS) as f64 / 1000.0)
            .unwrap_or(0.1)
    }

    fn current_texture(&mut self, now: f64) -> Option<&egui::TextureHandle> {
        if self.frames.len() > 1 {
            let mut next_at = self
                .next_frame_at_secs
                .unwrap_or_else(|| now + self.frame_delay_secs(0));
            while now >= next_at {
                let is_last = self.current_frame + 1 == self.frames.len();
                if is_last && !self.loop_animation {
                    break;
                }
                self.current_frame = (self.current_frame + 1) % self.frames.len();
                next_at += self.frame_delay_secs(self.current_frame);
            }
            self.next_frame_at_secs = Some(next_at);
        }
        self.frames.get(self.current_frame).map(|frame| &frame.texture)
    }
}

pub struct EmojiGeneratorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    controller: FormController,
    result_view: Option<ResultView>,
    status: String,
    navigating_away: bool,
}

impl EmojiGeneratorApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        controller: FormController,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            controller,
            result_view: None,
            status: "Ready".to_string(),
            navigating_away: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    self.status = match err.context() {
                        UiErrorContext::BackendStartup => {
                            format!("Generation worker unavailable: {}", err.message())
                        }
                        _ => format!("{} error: {}", err.category().label(), err.message()),
                    };
                }
                UiEvent::GenerationSucceeded {
                    request_id,
                    bytes,
                    preview,
                } => {
                    self.status = match preview.as_ref().map(DecodedPreview::frame_count) {
                        Ok(frames) if frames > 1 => {
                            format!("Animation generated ({frames} frames)")
                        }
                        _ => "Image generated".to_string(),
                    };
                    self.controller.on_generation_succeeded(request_id, bytes, preview);
                }
                UiEvent::GenerationFailed { request_id, error } => {
                    self.controller.on_generation_failed(request_id, &error);
                    self.status = format!("Generation failed: {}", error.message());
                }
            }
        }
    }

    fn process_dismissals(&mut self) {
        for channel in self.controller.take_dismissed() {
            tracing::debug!(channel = channel.label(), "toast hidden");
            if channel == NotificationChannel::GenerationFailed
                && self.controller.in_flight() == 0
            {
                self.status = "Ready".to_string();
            }
        }
    }

    fn sync_result_view(&mut self, ctx: &egui::Context) {
        let current = self.controller.result().map(|result| result.request_id);
        let shown = self.result_view.as_ref().map(|view| view.request_id);
        if current == shown {
            return;
        }
        self.result_view = self
            .controller
            .result()
            .map(|result| ResultView::build(ctx, result));
    }

    fn submit(&mut self) {
        match self.controller.submit() {
            SubmitOutcome::Dispatch(cmd) => {
                let request_id = cmd.request_id();
                if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
                    self.status = "Generating…".to_string();
                } else {
                    let error = UiError::from_message(UiErrorContext::General, self.status.clone());
                    self.controller.on_generation_failed(request_id, &error);
                }
            }
            SubmitOutcome::Rejected(reason) => {
                tracing::debug!(?reason, "submission rejected");
            }
        }
    }

    fn navigate_away(&mut self, ctx: &egui::Context, url: &str) {
        tracing::warn!(url, "navigating away from the generator");
        self.navigating_away = true;
        ctx.open_url(egui::OpenUrl::same_tab(url));
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn save_result_as(&mut self) {
        let Some(result) = self.controller.result() else {
            return;
        };
        let bytes = result.bytes.clone();
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(save_dialog_file_name(&result.download_name))
            .save_file()
        {
            match fs::write(&path, &bytes[..]) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "saved generated image");
                    self.status = format!("Saved image to {}", path.display());
                }
                Err(err) => {
                    self.status = format!("Failed to save image: {err}");
                }
            }
        }
    }

    fn copy_result_to_clipboard(&mut self) {
        let Some(result) = self.controller.result() else {
            return;
        };
        self.status = match media::copy_image_to_clipboard(&result.bytes) {
            Ok(()) if result.format == OutputFormat::Gif => {
                format!("Copied first frame of {} to clipboard", result.download_name)
            }
            Ok(()) => format!("Copied {} to clipboard", result.download_name),
            Err(err) => format!("Failed to copy image: {err}"),
        };
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let params = self.controller.params().clone();

        let mut text = params.text.clone();
        let text_response = ui.add(
            egui::TextEdit::multiline(&mut text)
                .id_salt("emoji_text")
                .hint_text("Enter multi line text")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        if text_response.changed() {
            self.controller.update_field(FieldUpdate::Text(text));
        }
        let submit_shortcut = text_response.has_focus()
            && ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.command);

        ui.add_space(6.0);
        egui::Grid::new("generator_options")
            .num_columns(2)
            .spacing([16.0, 8.0])
            .show(ui, |ui| {
                ui.label("Margin");
                let mut margin = params.margin;
                if ui.add(egui::DragValue::new(&mut margin)).changed() {
                    self.controller.update_field(FieldUpdate::Margin(margin));
                }
                ui.end_row();

                if self.controller.platform_selector_visible() {
                    ui.label("Platform");
                    ui.horizontal(|ui| {
                        let mut platform = params.platform;
                        for option in Platform::ALL {
                            ui.selectable_value(&mut platform, Some(option), option.label());
                        }
                        if platform != params.platform {
                            if let Some(selected) = platform {
                                self.controller.update_field(FieldUpdate::Platform(selected));
                            }
                        }
                    });
                    ui.end_row();
                }

                ui.label("HDR");
                let mut hdr = params.hdr;
                if ui.checkbox(&mut hdr, "").changed() {
                    self.controller.update_field(FieldUpdate::Hdr(hdr));
                }
                ui.end_row();

                if params.hdr {
                    ui.label("");
                    let mut confirmed = params.hdr_confirmed;
                    if ui.checkbox(&mut confirmed, HDR_CONFIRMATION_LABEL).changed() {
                        self.controller.update_field(FieldUpdate::HdrConfirmed(confirmed));
                    }
                    ui.end_row();
                }

                ui.label("Make GIF");
                let mut gif = params.gif;
                if ui.checkbox(&mut gif, "").changed() {
                    self.controller.update_field(FieldUpdate::Gif(gif));
                }
                ui.end_row();

                if params.gif {
                    ui.label("Loop");
                    let mut loop_animation = params.loop_animation;
                    if ui.checkbox(&mut loop_animation, "").changed() {
                        self.controller.update_field(FieldUpdate::Loop(loop_animation));
                    }
                    ui.end_row();

                    ui.label("Frame Delay");
                    let mut frame_delay_ms = params.frame_delay_ms;
                    if ui
                        .add(egui::DragValue::new(&mut frame_delay_ms).suffix(" ms"))
                        .changed()
                    {
                        self.controller.update_field(FieldUpdate::FrameDelay(frame_delay_ms));
                    }
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let clicked = ui
                .add_sized([140.0, 32.0], egui::Button::new("Generate"))
                .clicked();
            if clicked || submit_shortcut {
                self.submit();
            }
            let in_flight = self.controller.in_flight();
            if in_flight > 0 {
                ui.spinner();
                ui.weak(format!("Generating… ({in_flight} in flight)"));
            }
        });
    }

    fn show_result(&mut self, ui: &mut egui::Ui) {
        let Some(result) = self.controller.result() else {
            return;
        };
        let download_name = result.download_name.clone();
        let preview_error = result.preview.as_ref().err().cloned();

        ui.separator();
        let now = ui.ctx().input(|i| i.time);
        if let Some(view) = self.result_view.as_mut() {
            if let Some(texture) = view.current_texture(now) {
                let mut size = texture.size_vec2();
                let max_width = ui.available_width().max(64.0);
                if size.x > max_width {
                    size *= max_width / size.x;
                }
                if size.y > MAX_PREVIEW_HEIGHT {
                    size *= MAX_PREVIEW_HEIGHT / size.y;
                }
                ui.add(egui::Image::new(texture).fit_to_exact_size(size))
                    .on_hover_text("Generated emoji");
            }
        }
        if let Some(reason) = preview_error {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                format!("Preview unavailable: {reason}"),
            );
        }

        let mut download = false;
        let mut copy = false;
        ui.horizontal(|ui| {
            download = ui.button("Download").on_hover_text(download_name.as_str()).clicked();
            copy = ui.button("Copy").clicked();
        });
        if download {
            self.save_result_as();
        }
        if copy {
            self.copy_result_to_clipboard();
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let mut offset_y = -48.0;
        for channel in NotificationChannel::ALL {
            let Some(message) = self
                .controller
                .notification(channel)
                .message()
                .map(str::to_string)
            else {
                continue;
            };

            let (fill, stroke) = toast_colors(channel);
            let mut dismiss = false;
            let response = egui::Area::new(egui::Id::new(("toast", channel.label())))
                .order(egui::Order::Foreground)
                .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, offset_y))
                .show(ctx, |ui| {
                    egui::Frame::NONE
                        .fill(fill)
                        .stroke(stroke)
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::symmetric(12, 8))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&message).color(egui::Color32::WHITE));
                                if ui.small_button("Dismiss").clicked() {
                                    dismiss = true;
                                }
                            });
                        });
                })
                .response;
            offset_y -= response.rect.height() + 8.0;

            if dismiss {
                self.controller.dismiss(channel);
            }
        }
    }

    fn show_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.weak(self.status.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.hyperlink_to("Kamyar", AUTHOR_URL);
                    ui.label("| Made with 💙 by");
                    ui.hyperlink_to("GitHub", PROJECT_URL);
                    ui.label("Contribute to the project on");
                });
            });
        });
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        let mut wait = IDLE_REPAINT;
        if self
            .result_view
            .as_ref()
            .is_some_and(ResultView::is_animating)
        {
            wait = ANIMATION_REPAINT;
        }
        if let Some(deadline) = self.controller.next_deadline() {
            wait = wait.min(deadline.saturating_duration_since(Instant::now()));
        }
        ctx.request_repaint_after(wait);
    }
}

/// The save dialog takes a bare file name; separators would turn it into a path.
fn save_dialog_file_name(download_name: &str) -> String {
    download_name.replace(['/', '\\'], "-")
}

fn toast_colors(channel: NotificationChannel) -> (egui::Color32, egui::Stroke) {
    match channel {
        NotificationChannel::Validation => (
            egui::Color32::from_rgb(0, 120, 180),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(90, 180, 230)),
        ),
        NotificationChannel::GenericError | NotificationChannel::GenerationFailed => (
            egui::Color32::from_rgb(111, 53, 53),
            egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
        ),
    }
}

impl eframe::App for EmojiGeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        if let Some(url) = self.controller.tick() {
            self.navigate_away(ctx, &url);
        }
        self.process_dismissals();
        if self.navigating_away {
            return;
        }
        self.sync_result_view(ctx);

        self.show_footer(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("✨ Wolt emoji generator 💙");
                });
                ui.add_space(12.0);
                self.show_form(ui);
                self.show_result(ui);
            });
        });
        self.show_toasts(ctx);

        self.schedule_repaint(ctx);
    }
}
