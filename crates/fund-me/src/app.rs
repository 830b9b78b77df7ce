//! Main application state and update loop

use eframe::egui;
use std::sync::{Arc, Mutex};

use fund_me_adapters::FunderConfig;
use fund_me_core::FundingSession;

use crate::bridge::{BridgeReply, FundingBridge};
use crate::outcome::{apply_reply, StatusLine};
use crate::ui;

/// Work the two buttons hand to the bridge
#[derive(Debug, Clone)]
enum Operation {
    Connect,
    Fund(String),
}

/// The main application state
pub struct App {
    /// Provider boundary, absent only if the bundled contract ABI failed to load
    bridge: Option<FundingBridge>,
    /// Connected account and connect button label
    session: FundingSession,
    /// ETH amount input
    eth_amount: String,
    /// Finished commands waiting to be applied, in completion order
    replies: Arc<Mutex<Vec<BridgeReply>>>,
    /// Commands dispatched but not yet applied
    in_flight: usize,
    /// Last success or error message
    status: Option<StatusLine>,
}

impl App {
    /// Create a new App instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = FunderConfig::from_env();
        let (bridge, status) = match FundingBridge::new(&config) {
            Ok(bridge) => {
                tracing::info!(
                    provider = bridge.provider_mode(),
                    contract = %bridge.contract_address(),
                    rpc_url = %config.rpc_url,
                    "funding bridge ready"
                );
                (Some(bridge), None)
            }
            Err(e) => {
                tracing::error!("failed to initialize funding bridge: {e}");
                (None, Some(StatusLine::Error(e.to_string())))
            }
        };

        Self {
            bridge,
            session: FundingSession::default(),
            eth_amount: String::new(),
            replies: Arc::new(Mutex::new(Vec::new())),
            in_flight: 0,
            status,
        }
    }

    fn check_replies(&mut self) {
        let finished = match self.replies.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(e) => {
                tracing::error!("reply queue poisoned: {e}");
                return;
            }
        };
        for reply in finished {
            self.in_flight = self.in_flight.saturating_sub(1);
            if let Err(e) = &reply.result {
                tracing::warn!("command failed: {e}");
            }
            if let Some(status) = apply_reply(&mut self.session, reply) {
                self.status = Some(status);
            }
        }
    }

    /// Runs `op` off the UI thread. Overlapping clicks are not coalesced.
    fn dispatch(&mut self, ctx: &egui::Context, op: Operation) {
        let Some(bridge) = self.bridge.clone() else {
            return;
        };
        let session = self.session.clone();
        let replies = Arc::clone(&self.replies);
        let ctx = ctx.clone();
        self.in_flight += 1;

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let reply = match op {
                    Operation::Connect => bridge.connect_runtime_async(session).await,
                    Operation::Fund(amount) => bridge.fund_runtime_async(session, amount).await,
                };
                push_reply(&replies, reply);
                ctx.request_repaint();
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            std::thread::spawn(move || {
                let reply = match op {
                    Operation::Connect => bridge.connect(session),
                    Operation::Fund(amount) => bridge.fund(session, amount),
                };
                push_reply(&replies, reply);
                ctx.request_repaint();
            });
        }
    }

    fn render_funding_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui::styled_heading(ui, "Fund Me");
        ui.label("Connect your wallet, then simulate funding the contract.");
        ui.add_space(15.0);

        let enabled = self.bridge.is_some();
        let connect_label = self.session.button_label.clone();
        if ui::primary_button(ui, &connect_label, enabled).clicked() {
            self.dispatch(ctx, Operation::Connect);
        }

        if let Some(account) = self.session.account {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Account:").strong());
                ui::copyable_value(ui, &account.to_string());
            });
        }

        ui.add_space(15.0);
        ui.horizontal(|ui| {
            ui.label("ETH amount:");
            ui::amount_input(ui, &mut self.eth_amount);
        });
        ui.add_space(8.0);
        if ui::primary_button(ui, "Fund", enabled).clicked() {
            let amount = self.eth_amount.clone();
            self.dispatch(ctx, Operation::Fund(amount));
        }

        ui.add_space(15.0);
        if self.in_flight > 0 {
            ui::loading_spinner(ui, "Waiting for wallet...");
        }
        match &self.status {
            Some(StatusLine::Success(message)) => ui::success_message(ui, message),
            Some(StatusLine::Error(message)) => ui::error_message(ui, message),
            None => {}
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if let Some(bridge) = &self.bridge {
                ui.label(
                    egui::RichText::new(format!(
                        "provider: {}{}  ·  contract: {}",
                        bridge.provider_mode(),
                        if bridge.provider_available() { "" } else { " (absent)" },
                        bridge.contract_address()
                    ))
                    .small()
                    .weak(),
                );
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{} · built {}",
                        env!("GIT_HASH"),
                        env!("BUILD_TIME")
                    ))
                    .small()
                    .weak(),
                );
            });
        });
    }
}

fn push_reply(replies: &Mutex<Vec<BridgeReply>>, reply: BridgeReply) {
    match replies.lock() {
        Ok(mut guard) => guard.push(reply),
        Err(e) => tracing::error!("reply queue poisoned, dropping result: {e}"),
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        // Apply finished provider interactions
        self.check_replies();

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_footer(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(10.0);
            self.render_funding_panel(ui, ctx);
        });
    }
}
