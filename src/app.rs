use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::autosave::{AutosaveController, SaveStatus};
use crate::backup;
use crate::config::Config;
use crate::db::{
    Customer, CustomerMeasurement, Database, Order, OrderStatus, Settings, StatusPolicyError,
    Worker, WorkerRole,
};
use crate::format::{today_display, today_ymd};
use crate::shell::ShellBridge;
use crate::slip::{self, SlipOrder};
use crate::ui;
use crate::ui::confirm_dialog::{ConfirmAction, ConfirmDialog};
use crate::ui::customer_form::CustomerForm;
use crate::ui::measurement_form::MeasurementForm;
use crate::ui::order_form::OrderForm;
use crate::ui::settings_form::SettingsForm;
use crate::ui::worker_form::WorkerForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Customers,
    CustomerDetail,
    Orders,
    Workers,
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Searching,
    CustomerForm,
    OrderForm,
    MeasurementForm,
    WorkerForm,
    SettingsForm,
    Confirming,
    Help,
}

/// Counters shown on the dashboard and backup pages.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub customers: i64,
    pub total_orders: i64,
    pub by_status: Vec<(OrderStatus, i64)>,
    pub due_today: Vec<(Order, String)>,
}

/// What the measurement autosave worker persists: customer id plus the
/// form's field and option maps.
pub type MeasurementSnapshot = (i64, BTreeMap<String, String>, BTreeMap<String, bool>);

pub struct App {
    pub config: Config,
    pub db: Database,
    pub shell: Box<dyn ShellBridge>,
    pub page: Page,
    pub mode: AppMode,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub settings: Settings,
    pub stats: DashboardStats,
    // Customers page
    pub customers: Vec<Customer>,
    pub customer_index: usize,
    pub search_query: String,
    // Customer detail page
    pub detail_customer: Option<Customer>,
    pub detail_orders: Vec<Order>,
    pub detail_order_index: usize,
    pub detail_measurement: Option<CustomerMeasurement>,
    // Orders page
    pub orders: Vec<Order>,
    pub order_index: usize,
    pub order_filter: Option<OrderStatus>,
    pub order_customer_names: HashMap<i64, String>,
    // Workers page
    pub workers: Vec<Worker>,
    pub worker_index: usize,
    // Dialogs
    pub customer_form: Option<CustomerForm>,
    pub order_form: Option<OrderForm>,
    pub measurement_form: Option<MeasurementForm>,
    pub worker_form: Option<WorkerForm>,
    pub settings_form: Option<SettingsForm>,
    pub confirm_dialog: Option<ConfirmDialog>,
    autosave: Option<AutosaveController<MeasurementSnapshot>>,
    /// Customer whose detail view needs a re-read once a closed
    /// measurement form's final write lands.
    pending_measurement_refresh: Option<i64>,
}

impl App {
    pub fn new(config: Config, db: Database, shell: Box<dyn ShellBridge>) -> Result<Self> {
        let settings = db.get_settings()?;
        let mut app = Self {
            config,
            db,
            shell,
            page: Page::Dashboard,
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            settings,
            stats: DashboardStats::default(),
            customers: Vec::new(),
            customer_index: 0,
            search_query: String::new(),
            detail_customer: None,
            detail_orders: Vec::new(),
            detail_order_index: 0,
            detail_measurement: None,
            orders: Vec::new(),
            order_index: 0,
            order_filter: None,
            order_customer_names: HashMap::new(),
            workers: Vec::new(),
            worker_index: 0,
            customer_form: None,
            order_form: None,
            measurement_form: None,
            worker_form: None,
            settings_form: None,
            confirm_dialog: None,
            autosave: None,
            pending_measurement_refresh: None,
        };
        app.refresh_customers()?;
        app.refresh_orders()?;
        app.refresh_workers()?;
        app.refresh_stats()?;
        Ok(app)
    }

    pub fn autosave_status(&self) -> SaveStatus {
        self.autosave
            .as_ref()
            .map(|a| a.status())
            .unwrap_or(SaveStatus::Idle)
    }

    /// Retire the autosave worker once a closed measurement form's final
    /// write has finished, and report the outcome. Until then the status
    /// bar keeps showing the worker's live state.
    pub fn poll_autosave(&mut self) -> Result<()> {
        if self.mode == AppMode::MeasurementForm {
            return Ok(());
        }
        let Some(autosave) = &self.autosave else {
            return Ok(());
        };
        if !autosave.settled() {
            return Ok(());
        }
        let status = autosave.status();
        self.autosave = None;
        match status {
            SaveStatus::Error => {
                self.pending_measurement_refresh = None;
                self.status_message = Some("Saving measurements failed".to_string());
            }
            _ => {
                self.status_message = Some("Measurements saved".to_string());
                if let Some(id) = self.pending_measurement_refresh.take() {
                    if self.page == Page::CustomerDetail {
                        self.detail_measurement = self.db.measurement_for_customer(id)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        while !self.should_quit {
            self.poll_autosave()?;
            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // A keypress consumes the previous status message
        if self.mode == AppMode::Normal {
            self.status_message = None;
        }

        match self.mode {
            AppMode::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.mode = AppMode::Normal;
                }
                Ok(())
            }
            AppMode::Searching => self.handle_search_key(key),
            AppMode::CustomerForm => self.handle_customer_form_key(key),
            AppMode::OrderForm => self.handle_order_form_key(key),
            AppMode::MeasurementForm => self.handle_measurement_form_key(key),
            AppMode::WorkerForm => self.handle_worker_form_key(key),
            AppMode::SettingsForm => self.handle_settings_form_key(key),
            AppMode::Confirming => self.handle_confirm_key(key),
            AppMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global keys
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('?') => {
                self.mode = AppMode::Help;
                return Ok(());
            }
            KeyCode::Char('s') => {
                self.settings_form = Some(SettingsForm::from_settings(&self.settings));
                self.mode = AppMode::SettingsForm;
                return Ok(());
            }
            KeyCode::Char('1') if self.page != Page::Orders => {
                self.page = Page::Dashboard;
                self.refresh_stats()?;
                return Ok(());
            }
            KeyCode::Char('2') if self.page != Page::Orders => {
                self.page = Page::Customers;
                self.refresh_customers()?;
                return Ok(());
            }
            KeyCode::Char('3') if self.page != Page::Orders => {
                self.page = Page::Orders;
                self.refresh_orders()?;
                return Ok(());
            }
            KeyCode::Char('4') if self.page != Page::Orders => {
                self.page = Page::Workers;
                self.refresh_workers()?;
                return Ok(());
            }
            KeyCode::Char('5') if self.page != Page::Orders => {
                self.page = Page::Backup;
                self.refresh_stats()?;
                return Ok(());
            }
            _ => {}
        }

        match self.page {
            Page::Dashboard => self.handle_dashboard_key(key),
            Page::Customers => self.handle_customers_key(key),
            Page::CustomerDetail => self.handle_detail_key(key),
            Page::Orders => self.handle_orders_key(key),
            Page::Workers => self.handle_workers_key(key),
            Page::Backup => self.handle_backup_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.should_quit = true;
        }
        Ok(())
    }

    // ---- Customers page ----

    fn handle_customers_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.customer_index + 1 < self.customers.len() {
                    self.customer_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.customer_index = self.customer_index.saturating_sub(1);
            }
            KeyCode::Char('/') => {
                self.mode = AppMode::Searching;
            }
            KeyCode::Char('n') => {
                self.customer_form = Some(CustomerForm::new());
                self.mode = AppMode::CustomerForm;
            }
            KeyCode::Char('e') => {
                if let Some(customer) = self.customers.get(self.customer_index) {
                    self.customer_form = Some(CustomerForm::edit(customer));
                    self.mode = AppMode::CustomerForm;
                }
            }
            KeyCode::Char('d') => {
                if let Some(customer) = self.customers.get(self.customer_index) {
                    if let Some(id) = customer.id {
                        self.confirm_dialog = Some(ConfirmDialog::new(
                            "Delete Customer",
                            &format!(
                                "Delete {} and keep their orders on file?",
                                customer.name
                            ),
                            ConfirmAction::DeleteCustomer(id),
                        ));
                        self.mode = AppMode::Confirming;
                    }
                }
            }
            KeyCode::Char('m') => {
                if let Some(customer) = self.selected_customer().cloned() {
                    self.open_measurement_form(&customer)?;
                }
            }
            KeyCode::Char('p') => {
                if let Some(customer) = self.selected_customer().cloned() {
                    self.print_slip(&customer, None)?;
                }
            }
            KeyCode::Enter => {
                if let Some(customer) = self.selected_customer().cloned() {
                    self.open_detail(&customer)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.search_query.clear();
                self.mode = AppMode::Normal;
                self.refresh_customers()?;
            }
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Backspace => {
                self.search_query.pop();
                self.refresh_customers()?;
            }
            KeyCode::Char(c) => {
                self.search_query.push(c);
                self.refresh_customers()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_customer_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.customer_form.as_mut() else {
            self.mode = AppMode::Normal;
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.customer_form = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => self.submit_customer_form()?,
            KeyCode::Char(c) => form.focused_input_mut().handle_char(c),
            KeyCode::Backspace => form.focused_input_mut().backspace(),
            KeyCode::Delete => form.focused_input_mut().delete(),
            KeyCode::Left => form.focused_input_mut().move_cursor_left(),
            KeyCode::Right => form.focused_input_mut().move_cursor_right(),
            KeyCode::Home => form.focused_input_mut().move_cursor_home(),
            KeyCode::End => form.focused_input_mut().move_cursor_end(),
            _ => {}
        }
        Ok(())
    }

    fn submit_customer_form(&mut self) -> Result<()> {
        let Some(mut form) = self.customer_form.take() else {
            return Ok(());
        };
        if !form.validate() {
            self.customer_form = Some(form);
            return Ok(());
        }
        let phone = form.phone.value.trim().to_string();
        if self.db.phone_in_use(&phone, form.editing)? {
            form.error = Some("Phone number already registered".to_string());
            self.customer_form = Some(form);
            return Ok(());
        }
        let name = form.name.value.trim().to_string();
        let address = form.address_value().map(str::to_string);
        match form.editing {
            Some(id) => {
                self.db
                    .update_customer(id, &name, &phone, address.as_deref())?;
                self.status_message = Some(format!("Updated {}", name));
            }
            None => {
                self.db.create_customer(&name, &phone, address.as_deref())?;
                self.status_message = Some(format!("Added {}", name));
            }
        }
        self.mode = AppMode::Normal;
        self.refresh_customers()?;
        self.refresh_stats()?;
        // Keep an open detail page in sync
        if self.page == Page::CustomerDetail {
            if let Some(id) = self.detail_customer.as_ref().and_then(|c| c.id) {
                if let Some(customer) = self.db.get_customer(id)? {
                    self.open_detail(&customer)?;
                }
            }
        }
        Ok(())
    }

    // ---- Customer detail page ----

    fn open_detail(&mut self, customer: &Customer) -> Result<()> {
        let Some(id) = customer.id else {
            return Ok(());
        };
        self.detail_customer = Some(customer.clone());
        self.detail_orders = self.db.orders_for_customer(id)?;
        self.detail_order_index = 0;
        self.detail_measurement = self.db.measurement_for_customer(id)?;
        self.page = Page::CustomerDetail;
        Ok(())
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.page = Page::Customers;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.detail_order_index + 1 < self.detail_orders.len() {
                    self.detail_order_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.detail_order_index = self.detail_order_index.saturating_sub(1);
            }
            KeyCode::Char('o') => {
                if let Some(customer) = self.detail_customer.clone() {
                    if let Some(id) = customer.id {
                        self.order_form = Some(OrderForm::new(
                            id,
                            &customer.name,
                            self.db.active_workers_by_role(WorkerRole::Cutter)?,
                            self.db.active_workers_by_role(WorkerRole::Checker)?,
                            self.db.active_workers_by_role(WorkerRole::Karigar)?,
                        ));
                        self.mode = AppMode::OrderForm;
                    }
                }
            }
            KeyCode::Char('e') => {
                if let Some(order) = self.detail_orders.get(self.detail_order_index).cloned() {
                    let name = self
                        .detail_customer
                        .as_ref()
                        .map(|c| c.name.clone())
                        .unwrap_or_default();
                    self.open_order_edit(&order, &name)?;
                }
            }
            KeyCode::Char('m') => {
                if let Some(customer) = self.detail_customer.clone() {
                    self.open_measurement_form(&customer)?;
                }
            }
            KeyCode::Char('p') => {
                if let Some(customer) = self.detail_customer.clone() {
                    let order = self.detail_orders.get(self.detail_order_index).cloned();
                    self.print_slip(&customer, order.as_ref())?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ---- Orders page ----

    fn handle_orders_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Digits set the order status here, so Esc leaves the page
            KeyCode::Esc => {
                self.page = Page::Dashboard;
                self.refresh_stats()?;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.order_index + 1 < self.orders.len() {
                    self.order_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.order_index = self.order_index.saturating_sub(1);
            }
            KeyCode::Tab => {
                self.order_filter = match self.order_filter {
                    None => Some(OrderStatus::ALL[0]),
                    Some(status) => {
                        let i = OrderStatus::ALL.iter().position(|s| *s == status).unwrap_or(0);
                        if i + 1 < OrderStatus::ALL.len() {
                            Some(OrderStatus::ALL[i + 1])
                        } else {
                            None
                        }
                    }
                };
                self.refresh_orders()?;
            }
            KeyCode::Char(c @ '1'..='5') => {
                let target = OrderStatus::ALL[c as usize - '1' as usize];
                self.set_selected_order_status(target)?;
            }
            KeyCode::Char(']') => {
                if let Some(order) = self.orders.get(self.order_index) {
                    let rank = OrderStatus::ALL
                        .iter()
                        .position(|s| *s == order.status)
                        .unwrap_or(0);
                    if rank + 1 < OrderStatus::ALL.len() {
                        self.set_selected_order_status(OrderStatus::ALL[rank + 1])?;
                    }
                }
            }
            KeyCode::Char('[') => {
                if let Some(order) = self.orders.get(self.order_index) {
                    let rank = OrderStatus::ALL
                        .iter()
                        .position(|s| *s == order.status)
                        .unwrap_or(0);
                    if rank > 0 {
                        self.set_selected_order_status(OrderStatus::ALL[rank - 1])?;
                    }
                }
            }
            KeyCode::Char('e') => {
                if let Some(order) = self.orders.get(self.order_index).cloned() {
                    let name = self
                        .order_customer_names
                        .get(&order.customer_id)
                        .cloned()
                        .unwrap_or_default();
                    self.open_order_edit(&order, &name)?;
                }
            }
            KeyCode::Char('d') => {
                if let Some(order) = self.orders.get(self.order_index) {
                    if let Some(id) = order.id {
                        self.confirm_dialog = Some(ConfirmDialog::new(
                            "Delete Order",
                            &format!("Delete order #{}?", id),
                            ConfirmAction::DeleteOrder(id),
                        ));
                        self.mode = AppMode::Confirming;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn set_selected_order_status(&mut self, to: OrderStatus) -> Result<()> {
        let Some(id) = self.orders.get(self.order_index).and_then(|o| o.id) else {
            return Ok(());
        };
        match self
            .db
            .update_order_status(id, to, self.config.orders.status_policy)
        {
            Ok(()) => {
                self.status_message =
                    Some(format!("Order #{} -> {}", id, to.display_name()));
            }
            Err(e) if e.downcast_ref::<StatusPolicyError>().is_some() => {
                self.status_message = Some(e.to_string());
            }
            Err(e) => return Err(e),
        }
        self.refresh_orders()?;
        self.refresh_stats()?;
        Ok(())
    }

    fn open_order_edit(&mut self, order: &Order, customer_name: &str) -> Result<()> {
        self.order_form = Some(OrderForm::edit(
            order,
            customer_name,
            self.db.active_workers_by_role(WorkerRole::Cutter)?,
            self.db.active_workers_by_role(WorkerRole::Checker)?,
            self.db.active_workers_by_role(WorkerRole::Karigar)?,
        ));
        self.mode = AppMode::OrderForm;
        Ok(())
    }

    fn handle_order_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.order_form.as_mut() else {
            self.mode = AppMode::Normal;
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.order_form = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => self.submit_order_form()?,
            KeyCode::Left => {
                if let Some(input) = form.focused_input_mut() {
                    input.move_cursor_left();
                } else {
                    form.cycle(-1);
                }
            }
            KeyCode::Right => {
                if let Some(input) = form.focused_input_mut() {
                    input.move_cursor_right();
                } else {
                    form.cycle(1);
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = form.focused_input_mut() {
                    input.handle_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = form.focused_input_mut() {
                    input.backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = form.focused_input_mut() {
                    input.delete();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_order_form(&mut self) -> Result<()> {
        let Some(mut form) = self.order_form.take() else {
            return Ok(());
        };
        if !form.validate() {
            self.order_form = Some(form);
            return Ok(());
        }
        let order = form.to_order();
        match order.id {
            Some(id) => {
                self.db.update_order(id, &order)?;
                self.status_message = Some(format!("Updated order #{}", id));
            }
            None => {
                let id = self.db.create_order(&order)?;
                self.status_message = Some(format!("Created order #{}", id));
            }
        }
        self.mode = AppMode::Normal;
        self.refresh_orders()?;
        self.refresh_stats()?;
        if self.page == Page::CustomerDetail {
            if let Some(customer) = self.detail_customer.clone() {
                self.open_detail(&customer)?;
            }
        }
        Ok(())
    }

    // ---- Measurement form ----

    fn open_measurement_form(&mut self, customer: &Customer) -> Result<()> {
        let Some(id) = customer.id else {
            return Ok(());
        };
        let existing = self
            .db
            .measurement_for_customer(id)?
            .unwrap_or_else(|| CustomerMeasurement::empty(id));
        self.measurement_form = Some(MeasurementForm::new(id, &customer.name, &existing));

        // The autosave worker writes through its own connection so saves
        // never block the UI thread's handle.
        let worker_db = Database::open(&self.config.db_path)?;
        let debounce = Duration::from_millis(self.config.autosave.debounce_ms);
        self.autosave = Some(AutosaveController::new(
            debounce,
            move |(customer_id, fields, options): MeasurementSnapshot| {
                worker_db.upsert_measurement(customer_id, &fields, &options)?;
                Ok(())
            },
        ));
        self.pending_measurement_refresh = None;
        self.mode = AppMode::MeasurementForm;
        Ok(())
    }

    fn push_measurement_snapshot(&self) {
        if let (Some(form), Some(autosave)) = (&self.measurement_form, &self.autosave) {
            let (fields, options) = form.snapshot();
            autosave.update((form.customer_id, fields, options));
        }
    }

    fn handle_measurement_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.measurement_form.as_mut() else {
            self.mode = AppMode::Normal;
            return Ok(());
        };
        let mut changed = false;
        match key.code {
            KeyCode::Esc => {
                // The flush is asynchronous; the controller stays alive
                // until poll_autosave sees the final write land, so a
                // failed persist is never reported as saved
                self.push_measurement_snapshot();
                if let Some(autosave) = &self.autosave {
                    autosave.flush();
                }
                self.pending_measurement_refresh =
                    self.measurement_form.take().map(|f| f.customer_id);
                self.mode = AppMode::Normal;
                return Ok(());
            }
            KeyCode::Down | KeyCode::Tab => form.next_row(),
            KeyCode::Up | KeyCode::BackTab => form.prev_row(),
            KeyCode::Left => changed = form.handle_left(),
            KeyCode::Right => changed = form.handle_right(),
            KeyCode::Backspace => changed = form.backspace(),
            KeyCode::Char(c) => changed = form.handle_char(c),
            _ => {}
        }
        if changed {
            self.push_measurement_snapshot();
        }
        Ok(())
    }

    // ---- Workers page ----

    fn handle_workers_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.worker_index + 1 < self.workers.len() {
                    self.worker_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.worker_index = self.worker_index.saturating_sub(1);
            }
            KeyCode::Char('n') => {
                self.worker_form = Some(WorkerForm::new());
                self.mode = AppMode::WorkerForm;
            }
            KeyCode::Char('e') => {
                if let Some(worker) = self.workers.get(self.worker_index) {
                    self.worker_form = Some(WorkerForm::edit(worker));
                    self.mode = AppMode::WorkerForm;
                }
            }
            KeyCode::Char('a') => {
                if let Some(worker) = self.workers.get(self.worker_index) {
                    if let Some(id) = worker.id {
                        self.db.set_worker_active(id, !worker.is_active)?;
                        self.refresh_workers()?;
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(worker) = self.workers.get(self.worker_index) {
                    if let Some(id) = worker.id {
                        self.confirm_dialog = Some(ConfirmDialog::new(
                            "Delete Worker",
                            &format!("Delete {}?", worker.name),
                            ConfirmAction::DeleteWorker(id),
                        ));
                        self.mode = AppMode::Confirming;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_worker_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.worker_form.as_mut() else {
            self.mode = AppMode::Normal;
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.worker_form = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => self.submit_worker_form()?,
            KeyCode::Left => {
                if let Some(input) = form.focused_input_mut() {
                    input.move_cursor_left();
                } else {
                    form.cycle_role(-1);
                }
            }
            KeyCode::Right => {
                if let Some(input) = form.focused_input_mut() {
                    input.move_cursor_right();
                } else {
                    form.cycle_role(1);
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = form.focused_input_mut() {
                    input.handle_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = form.focused_input_mut() {
                    input.backspace();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn submit_worker_form(&mut self) -> Result<()> {
        let Some(mut form) = self.worker_form.take() else {
            return Ok(());
        };
        if !form.validate() {
            self.worker_form = Some(form);
            return Ok(());
        }
        let name = form.name.value.trim().to_string();
        match form.editing {
            Some(id) => {
                self.db
                    .update_worker(id, &name, form.phone_value(), form.role())?;
                self.status_message = Some(format!("Updated {}", name));
            }
            None => {
                self.db
                    .create_worker(&name, form.phone_value(), form.role())?;
                self.status_message = Some(format!("Added {}", name));
            }
        }
        self.mode = AppMode::Normal;
        self.refresh_workers()?;
        Ok(())
    }

    // ---- Settings ----

    fn handle_settings_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(form) = self.settings_form.as_mut() else {
            self.mode = AppMode::Normal;
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.settings_form = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => {
                if form.validate() {
                    let settings = form.to_settings();
                    self.db.save_settings(&settings)?;
                    self.settings = settings;
                    self.settings_form = None;
                    self.mode = AppMode::Normal;
                    self.status_message = Some("Settings saved".to_string());
                }
            }
            KeyCode::Char(c) => form.focused_input_mut().handle_char(c),
            KeyCode::Backspace => form.focused_input_mut().backspace(),
            KeyCode::Delete => form.focused_input_mut().delete(),
            KeyCode::Left => form.focused_input_mut().move_cursor_left(),
            KeyCode::Right => form.focused_input_mut().move_cursor_right(),
            KeyCode::Home => form.focused_input_mut().move_cursor_home(),
            KeyCode::End => form.focused_input_mut().move_cursor_end(),
            _ => {}
        }
        Ok(())
    }

    // ---- Backup page ----

    fn handle_backup_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('e') => {
                let json = backup::export_backup(&self.db)?;
                match self.shell.save_file(
                    &backup::backup_filename(),
                    "JSON backup",
                    &["json"],
                    json.as_bytes(),
                )? {
                    Some(path) => {
                        self.status_message =
                            Some(format!("Backup saved to {}", path.display()));
                    }
                    None => {
                        self.status_message = Some("Export cancelled".to_string());
                    }
                }
            }
            KeyCode::Char('i') => {
                match self.shell.open_file("JSON backup", &["json"])? {
                    Some(bytes) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        self.confirm_dialog = Some(ConfirmDialog::new(
                            "Restore Backup",
                            "Importing overwrites every customer, order and measurement named in the file. Continue?",
                            ConfirmAction::ImportBackup(text),
                        ));
                        self.mode = AppMode::Confirming;
                    }
                    None => {
                        self.status_message = Some("Import cancelled".to_string());
                    }
                }
            }
            KeyCode::Char('c') => {
                let csv = backup::customers_csv(&self.db)?;
                match self.shell.save_file(
                    &backup::csv_filename(),
                    "CSV",
                    &["csv"],
                    &csv,
                )? {
                    Some(path) => {
                        self.status_message =
                            Some(format!("Customer list saved to {}", path.display()));
                    }
                    None => {
                        self.status_message = Some("Export cancelled".to_string());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ---- Confirmation ----

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.confirm_dialog = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Enter => {
                if let Some(dialog) = self.confirm_dialog.take() {
                    self.mode = AppMode::Normal;
                    self.execute_confirm(dialog.action)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn execute_confirm(&mut self, action: ConfirmAction) -> Result<()> {
        match action {
            ConfirmAction::DeleteCustomer(id) => {
                self.db.delete_customer(id)?;
                self.status_message = Some("Customer deleted".to_string());
                self.refresh_customers()?;
            }
            ConfirmAction::DeleteOrder(id) => {
                self.db.delete_order(id)?;
                self.status_message = Some(format!("Order #{} deleted", id));
                self.refresh_orders()?;
                if self.page == Page::CustomerDetail {
                    if let Some(customer) = self.detail_customer.clone() {
                        self.open_detail(&customer)?;
                    }
                }
            }
            ConfirmAction::DeleteWorker(id) => {
                self.db.delete_worker(id)?;
                self.status_message = Some("Worker deleted".to_string());
                self.refresh_workers()?;
            }
            ConfirmAction::ImportBackup(json) => match backup::import_backup(&self.db, &json) {
                Ok(summary) => {
                    self.status_message = Some(format!(
                        "Restored {} customers, {} orders, {} measurements",
                        summary.customers, summary.orders, summary.measurements
                    ));
                    self.refresh_customers()?;
                    self.refresh_orders()?;
                }
                Err(e) => {
                    self.status_message = Some(format!("Import failed: {}", e));
                }
            },
        }
        self.refresh_stats()?;
        Ok(())
    }

    // ---- Printing ----

    fn print_slip(&mut self, customer: &Customer, order: Option<&Order>) -> Result<()> {
        let Some(id) = customer.id else {
            return Ok(());
        };
        let measurement = self
            .db
            .measurement_for_customer(id)?
            .unwrap_or_else(|| CustomerMeasurement::empty(id));
        let worker_name = |wid: Option<i64>| -> Result<Option<String>> {
            Ok(match wid {
                Some(wid) => self.db.get_worker(wid)?.map(|w| w.name),
                None => None,
            })
        };
        let names = match order {
            Some(o) => Some((
                worker_name(o.cutter_id)?,
                worker_name(o.checker_id)?,
                worker_name(o.karigar_id)?,
            )),
            None => None,
        };
        let slip_order = order.zip(names.as_ref()).map(|(o, (c, ch, k))| SlipOrder {
            order: o,
            cutter: c.as_deref(),
            checker: ch.as_deref(),
            karigar: k.as_deref(),
        });
        let html = slip::render_slip(
            customer,
            &measurement,
            &self.settings,
            slip_order.as_ref(),
            &today_display(),
            &self.config.print.font_url,
        );
        match self
            .shell
            .print_html(&html, self.settings.default_printer.as_deref())
        {
            Ok(()) => {
                self.status_message = Some(format!("Slip sent for {}", customer.name));
            }
            Err(e) => {
                self.status_message = Some(format!("Print failed: {}", e));
            }
        }
        Ok(())
    }

    // ---- Data refresh ----

    fn selected_customer(&self) -> Option<&Customer> {
        self.customers.get(self.customer_index)
    }

    fn refresh_customers(&mut self) -> Result<()> {
        self.customers = if self.search_query.trim().is_empty() {
            self.db.list_customers()?
        } else {
            self.db.search_customers(self.search_query.trim())?
        };
        if self.customer_index >= self.customers.len() {
            self.customer_index = self.customers.len().saturating_sub(1);
        }
        Ok(())
    }

    fn refresh_orders(&mut self) -> Result<()> {
        self.orders = self.db.list_orders(self.order_filter)?;
        if self.order_index >= self.orders.len() {
            self.order_index = self.orders.len().saturating_sub(1);
        }
        self.order_customer_names = self
            .db
            .list_customers()?
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c.name)))
            .collect();
        Ok(())
    }

    fn refresh_workers(&mut self) -> Result<()> {
        self.workers = self.db.list_workers()?;
        if self.worker_index >= self.workers.len() {
            self.worker_index = self.workers.len().saturating_sub(1);
        }
        Ok(())
    }

    fn refresh_stats(&mut self) -> Result<()> {
        let by_status = OrderStatus::ALL
            .iter()
            .map(|status| Ok((*status, self.db.count_orders_by_status(*status)?)))
            .collect::<Result<Vec<_>>>()?;
        let names: HashMap<i64, String> = self
            .db
            .list_customers()?
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c.name)))
            .collect();
        let due_today = self
            .db
            .orders_due_on(&today_ymd())?
            .into_iter()
            .map(|order| {
                let name = names
                    .get(&order.customer_id)
                    .cloned()
                    .unwrap_or_else(|| "?".to_string());
                (order, name)
            })
            .collect();
        self.stats = DashboardStats {
            customers: self.db.count_customers()?,
            total_orders: self.db.count_orders()?,
            by_status,
            due_today,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::mock::MockShell;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    struct Fixture {
        app: App,
        shell: Arc<MockShell>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("darzi.db");
        let db = Database::open(&db_path).unwrap();
        db.initialize().unwrap();
        let config = Config {
            db_path,
            ..Config::default()
        };
        let shell = Arc::new(MockShell::default());
        let app = App::new(config, db, Box::new(SharedShell(shell.clone()))).unwrap();
        Fixture {
            app,
            shell,
            _dir: dir,
        }
    }

    /// Forwards to a shared mock so tests can inspect calls after handing
    /// the bridge to the app.
    struct SharedShell(Arc<MockShell>);

    impl ShellBridge for SharedShell {
        fn save_file(
            &self,
            suggested_name: &str,
            filter_name: &str,
            extensions: &[&str],
            contents: &[u8],
        ) -> Result<Option<std::path::PathBuf>> {
            self.0.save_file(suggested_name, filter_name, extensions, contents)
        }
        fn open_file(
            &self,
            filter_name: &str,
            extensions: &[&str],
        ) -> Result<Option<Vec<u8>>> {
            self.0.open_file(filter_name, extensions)
        }
        fn print_html(&self, html: &str, printer: Option<&str>) -> Result<()> {
            self.0.print_html(html, printer)
        }
        fn app_version(&self) -> &'static str {
            self.0.app_version()
        }
    }

    fn add_customer(app: &mut App, name: &str, phone: &str) {
        app.page = Page::Customers;
        app.handle_key(ch('n')).unwrap();
        for c in name.chars() {
            app.handle_key(ch(c)).unwrap();
        }
        app.handle_key(key(KeyCode::Tab)).unwrap();
        for c in phone.chars() {
            app.handle_key(ch(c)).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();
    }

    #[test]
    fn test_customer_create_via_form() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        assert_eq!(f.app.mode, AppMode::Normal);
        assert_eq!(f.app.customers.len(), 1);
        assert_eq!(f.app.customers[0].name, "Bilal");
    }

    #[test]
    fn test_duplicate_phone_keeps_form_open() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        add_customer(&mut f.app, "Imran", "0313-9001122");
        assert_eq!(f.app.mode, AppMode::CustomerForm);
        let form = f.app.customer_form.as_ref().unwrap();
        assert!(form.error.as_deref().unwrap().contains("already registered"));
        assert_eq!(f.app.customers.len(), 1);
    }

    #[test]
    fn test_search_filters_list() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        add_customer(&mut f.app, "Imran", "0300-5556677");

        f.app.handle_key(ch('/')).unwrap();
        assert_eq!(f.app.mode, AppMode::Searching);
        for c in "imr".chars() {
            f.app.handle_key(ch(c)).unwrap();
        }
        assert_eq!(f.app.customers.len(), 1);
        assert_eq!(f.app.customers[0].name, "Imran");

        f.app.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(f.app.customers.len(), 2);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");

        f.app.handle_key(ch('d')).unwrap();
        assert_eq!(f.app.mode, AppMode::Confirming);
        f.app.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(f.app.customers.len(), 1);

        f.app.handle_key(ch('d')).unwrap();
        f.app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(f.app.customers.is_empty());
    }

    #[test]
    fn test_print_slip_goes_through_shell() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        f.app.handle_key(ch('p')).unwrap();

        let printed = f.shell.printed.borrow();
        assert_eq!(printed.len(), 1);
        assert!(printed[0].0.contains("Bilal"));
        // no printer configured, preview path
        assert_eq!(printed[0].1, None);
    }

    #[test]
    fn test_backup_export_writes_through_shell() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        f.app.page = Page::Backup;
        f.app.handle_key(ch('e')).unwrap();

        let saved = f.shell.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].0.ends_with(".json"));
        let text = String::from_utf8(saved[0].1.clone()).unwrap();
        assert!(text.contains("Bilal"));
    }

    #[test]
    fn test_status_filter_cycles_back_to_all() {
        let mut f = fixture();
        f.app.page = Page::Orders;
        assert_eq!(f.app.order_filter, None);
        for expected in OrderStatus::ALL {
            f.app.handle_key(key(KeyCode::Tab)).unwrap();
            assert_eq!(f.app.order_filter, Some(expected));
        }
        f.app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(f.app.order_filter, None);
    }

    #[tokio::test]
    async fn test_measurement_form_autosaves_on_close() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        let customer = f.app.customers[0].clone();
        let cid = customer.id.unwrap();

        f.app.open_measurement_form(&customer).unwrap();
        assert_eq!(f.app.mode, AppMode::MeasurementForm);
        for c in "42".chars() {
            f.app.handle_key(ch(c)).unwrap();
        }
        f.app.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(f.app.mode, AppMode::Normal);

        // Wait for the worker to drain the flush
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            if let Some(m) = f.app.db.measurement_for_customer(cid).unwrap() {
                assert_eq!(m.field("length"), "42");
                break;
            }
            assert!(std::time::Instant::now() < deadline, "autosave never landed");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    #[tokio::test]
    async fn test_close_reports_saved_only_after_write_lands() {
        let mut f = fixture();
        add_customer(&mut f.app, "Bilal", "0313-9001122");
        let customer = f.app.customers[0].clone();
        let cid = customer.id.unwrap();

        f.app.open_measurement_form(&customer).unwrap();
        for c in "42".chars() {
            f.app.handle_key(ch(c)).unwrap();
        }
        f.app.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(f.app.mode, AppMode::Normal);
        // Nothing claimed yet; the flush is still in flight
        assert_eq!(f.app.status_message, None);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while f.app.status_message.is_none() {
            assert!(std::time::Instant::now() < deadline, "close was never reported");
            tokio::time::sleep(Duration::from_millis(20)).await;
            f.app.poll_autosave().unwrap();
        }
        assert_eq!(f.app.status_message.as_deref(), Some("Measurements saved"));

        // The write it reported really is on disk
        let m = f.app.db.measurement_for_customer(cid).unwrap().unwrap();
        assert_eq!(m.field("length"), "42");
    }
}
