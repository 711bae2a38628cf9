mod backup;
pub mod confirm_dialog;
pub mod customer_detail;
pub mod customer_form;
mod customers;
mod dashboard;
mod dialogs;
pub mod input;
pub mod measurement_form;
pub mod order_form;
mod orders;
pub mod settings_form;
mod status_bar;
pub mod worker_form;
mod workers;

use ratatui::prelude::*;

use crate::app::{App, AppMode, Page};

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: content area + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.page {
        Page::Dashboard => dashboard::render(frame, app, main_chunks[0]),
        Page::Customers => customers::render(frame, app, main_chunks[0]),
        Page::CustomerDetail => customer_detail::render(frame, app, main_chunks[0]),
        Page::Orders => orders::render(frame, app, main_chunks[0]),
        Page::Workers => workers::render(frame, app, main_chunks[0]),
        Page::Backup => backup::render(frame, app, main_chunks[0]),
    }

    status_bar::render(frame, app, main_chunks[1]);

    // Dialog overlays
    match app.mode {
        AppMode::CustomerForm => {
            if let Some(ref dialog) = app.customer_form {
                customer_form::render(frame, dialog, area);
            }
        }
        AppMode::OrderForm => {
            if let Some(ref dialog) = app.order_form {
                order_form::render(frame, dialog, area);
            }
        }
        AppMode::MeasurementForm => {
            let save_status = app.autosave_status().indicator().to_string();
            if let Some(ref mut dialog) = app.measurement_form {
                measurement_form::render(frame, dialog, area, &save_status);
            }
        }
        AppMode::WorkerForm => {
            if let Some(ref dialog) = app.worker_form {
                worker_form::render(frame, dialog, area);
            }
        }
        AppMode::SettingsForm => {
            if let Some(ref dialog) = app.settings_form {
                settings_form::render(frame, dialog, area);
            }
        }
        AppMode::Confirming => {
            if let Some(ref dialog) = app.confirm_dialog {
                confirm_dialog::render(frame, dialog, area);
            }
        }
        AppMode::Help => dialogs::render_help(frame, area),
        AppMode::Normal | AppMode::Searching => {}
    }
}
