pub const SCHEMA: &str = r#"
-- Customers: core contact records
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    address TEXT,
    photo BLOB,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(name);

-- Orders: one garment order per row, linked to a customer
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'new',  -- 'new', 'in_progress', 'ready', 'delivered', 'completed'
    due_date TEXT NOT NULL,
    advance_payment TEXT,
    delivery_notes TEXT,
    cutter_id INTEGER,
    checker_id INTEGER,
    karigar_id INTEGER,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (customer_id) REFERENCES customers(id),
    FOREIGN KEY (cutter_id) REFERENCES workers(id),
    FOREIGN KEY (checker_id) REFERENCES workers(id),
    FOREIGN KEY (karigar_id) REFERENCES workers(id)
);

CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id);
CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_orders_due_date ON orders(due_date);

-- Legacy order-scoped measurements, kept only for backup import
CREATE TABLE IF NOT EXISTS measurements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL,
    fields TEXT NOT NULL DEFAULT '{}'  -- JSON map of field key -> value
);

CREATE INDEX IF NOT EXISTS idx_measurements_order ON measurements(order_id);

-- Customer-level measurements, one record per customer
CREATE TABLE IF NOT EXISTS customer_measurements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL,
    fields TEXT NOT NULL DEFAULT '{}',          -- JSON map of field key -> value
    design_options TEXT NOT NULL DEFAULT '{}',  -- JSON map of option key -> bool
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (customer_id) REFERENCES customers(id)
);

-- Shop settings, singleton row with id 1
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY,
    shop_name TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    phone1 TEXT NOT NULL DEFAULT '',
    phone2 TEXT NOT NULL DEFAULT '',
    default_printer TEXT,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Workshop staff
CREATE TABLE IF NOT EXISTS workers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT,
    role TEXT NOT NULL,  -- 'cutter', 'checker', 'karigar'
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_workers_role ON workers(role);
"#;

/// Follow-up migrations applied after the base schema. Each statement is
/// idempotent so re-running against an existing database is harmless.
pub const MIGRATIONS: &[&str] = &[
    // Phone uniqueness
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_customers_phone ON customers(phone)",
    // One measurement record per customer; closes the create-if-absent race
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_customer_measurements_customer ON customer_measurements(customer_id)",
];
