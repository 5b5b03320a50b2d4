//! Main egui application for the flashweb console

use eframe::egui;
use flashweb_client::{submit, HttpTransport};
use flashweb_core::{
    Action, Console, FieldId, FileUpload, NotificationId, NotificationKind, OperationResult,
    OPTIONAL_FIELDS,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Outcomes delivered by finished submissions, drained on the next frame
type Inbox = Rc<RefCell<Vec<(Action, OperationResult)>>>;

/// Application state
pub struct FlashwebApp {
    /// Form and notification log
    console: Console,
    /// Relay transport, or the reason it could not be built
    transport: Result<HttpTransport, String>,
    /// Completed submissions not yet applied to the console
    inbox: Inbox,
    /// Submissions still waiting for a response
    in_flight: usize,
}

impl FlashwebApp {
    /// Create the application talking to the relay at `origin`
    pub fn new(_cc: &eframe::CreationContext<'_>, origin: &str) -> Self {
        let transport = HttpTransport::new(origin).map_err(|e| {
            log::error!("Cannot reach relay at {:?}: {}", origin, e);
            e.to_string()
        });
        Self {
            console: Console::new(),
            transport,
            inbox: Rc::default(),
            in_flight: 0,
        }
    }

    /// Snapshot the form and send it; the outcome lands in the inbox
    fn start_submit(&mut self, ctx: &egui::Context) {
        let (action, request) = self.console.begin_submit();
        let transport = match &self.transport {
            Ok(transport) => transport.clone(),
            Err(e) => {
                self.console.apply_failure(action, 0, e);
                return;
            }
        };

        log::info!("Submitting {} to {}", action, transport.endpoint());
        self.in_flight += 1;
        let inbox = Rc::clone(&self.inbox);
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = submit(&transport, &request).await;
            inbox.borrow_mut().push((action, outcome));
            ctx.request_repaint();
        });
    }

    fn drain_inbox(&mut self) {
        let finished: Vec<_> = self.inbox.borrow_mut().drain(..).collect();
        for (action, outcome) in finished {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.console.apply(action, outcome);
        }
    }

    /// Attach a file dropped onto the page
    fn take_dropped_file(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.into_iter().find(|f| f.bytes.is_some()) {
            let bytes = file.bytes.map(|b| b.to_vec()).unwrap_or_default();
            log::debug!("Dropped file {:?} ({} bytes)", file.name, bytes.len());
            self.console.form.set_file(FileUpload::new(file.name, bytes));
        }
    }

    /// Absolute download URL for an artifact link
    fn download_url(&self, link: &str) -> String {
        match &self.transport {
            Ok(transport) => transport
                .resolve(link)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| link.to_string()),
            Err(_) => link.to_string(),
        }
    }
}

impl eframe::App for FlashwebApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_inbox();
        self.take_dropped_file(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("flashweb");
                ui.separator();
                ui.label("flashrom console");
            });
        });

        egui::SidePanel::left("controls")
            .min_width(280.0)
            .show(ctx, |ui| {
                self.ui_form(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui_notifications(ui);
        });
    }
}

impl FlashwebApp {
    fn ui_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Operation");
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.label("Programmer:");
            ui.text_edit_singleline(self.console.form.programmer_mut());
        });

        ui.add_space(5.0);

        let mut action = self.console.form.selected_action();
        ui.horizontal_wrapped(|ui| {
            for candidate in Action::ALL {
                ui.radio_value(&mut action, candidate, candidate.as_str());
            }
        });
        if action != self.console.form.selected_action() {
            self.console.form.set_action(action);
        }

        ui.add_space(5.0);

        let visible = self.console.visible_fields();
        for spec in OPTIONAL_FIELDS {
            // Fade fields in and out as the action changes
            let shown = visible.contains(&spec.id);
            let fade_id = egui::Id::new(("field", spec.id));
            let opacity = ui.ctx().animate_bool_with_time(fade_id, shown, 0.2);
            if opacity == 0.0 {
                continue;
            }
            ui.scope(|ui| {
                ui.set_opacity(opacity);
                match spec.id {
                    FieldId::File => self.ui_file_row(ui, spec.label, spec.help),
                    FieldId::Force => {
                        ui.checkbox(&mut self.console.form.flags_mut().force, spec.label)
                            .on_hover_text(spec.help);
                    }
                    FieldId::Verbose => {
                        ui.checkbox(&mut self.console.form.flags_mut().verbose, spec.label)
                            .on_hover_text(spec.help);
                    }
                }
            });
        }

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.button("Submit").clicked() {
                self.start_submit(ui.ctx());
            }
            if self.in_flight > 0 {
                ui.spinner();
                ui.label(format!("{} pending", self.in_flight));
            }
        });
    }

    fn ui_file_row(&mut self, ui: &mut egui::Ui, label: &str, help: &str) {
        ui.label(label).on_hover_text(help);
        let loaded = self
            .console
            .form
            .file()
            .map(|f| format!("{} ({} bytes)", f.name, f.bytes.len()));
        match loaded {
            Some(text) => {
                ui.horizontal(|ui| {
                    ui.label(text);
                    if ui.button("Clear").clicked() {
                        self.console.form.clear_file();
                    }
                });
            }
            None => {
                ui.weak("Drop an image file onto the page");
            }
        }
    }

    fn ui_notifications(&mut self, ui: &mut egui::Ui) {
        ui.heading("Results");
        ui.separator();

        let mut dismissed: Option<NotificationId> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (id, notification) in self.console.log.iter() {
                    let color = match notification.kind {
                        NotificationKind::Success => egui::Color32::GREEN,
                        NotificationKind::Failure => egui::Color32::RED,
                    };
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal(|ui| {
                            let title = egui::RichText::new(&notification.title).strong();
                            ui.colored_label(color, title);
                            if let Some(code) = notification.status_code {
                                ui.colored_label(color, format!("({})", code));
                            }
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.small_button("x").on_hover_text("Dismiss").clicked() {
                                    dismissed = Some(id);
                                }
                            });
                        });
                        ui.label(egui::RichText::new(&notification.message).monospace());
                        if let Some(link) = &notification.link {
                            ui.hyperlink_to("Download", self.download_url(link));
                        }
                    });
                    ui.add_space(4.0);
                }
            });

        if let Some(id) = dismissed {
            self.console.dismiss(id);
        }
    }
}
