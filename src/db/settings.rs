//! Shop settings singleton.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::format::now_iso;

/// Fixed row id of the settings record.
const SETTINGS_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub shop_name: String,
    pub address: String,
    pub phone1: String,
    pub phone2: String,
    /// Printer name for silent printing; `None` falls back to the
    /// system preview path.
    #[serde(default)]
    pub default_printer: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shop_name: "M.R.S Tailors & Fabrics".to_string(),
            address: String::new(),
            phone1: String::new(),
            phone2: String::new(),
            default_printer: None,
        }
    }
}

impl Settings {
    /// Phone numbers joined for the slip header.
    pub fn phones_line(&self) -> String {
        [self.phone1.as_str(), self.phone2.as_str()]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Database {
    /// Load shop settings, falling back to defaults when none are saved.
    pub fn get_settings(&self) -> Result<Settings> {
        let result = self.conn.query_row(
            "SELECT shop_name, address, phone1, phone2, default_printer FROM settings WHERE id = ?",
            [SETTINGS_ID],
            |row| {
                Ok(Settings {
                    shop_name: row.get(0)?,
                    address: row.get(1)?,
                    phone1: row.get(2)?,
                    phone2: row.get(3)?,
                    default_printer: row.get(4)?,
                })
            },
        );
        match result {
            Ok(s) => Ok(s),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO settings (id, shop_name, address, phone1, phone2, default_printer, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                shop_name = excluded.shop_name,
                address = excluded.address,
                phone1 = excluded.phone1,
                phone2 = excluded.phone2,
                default_printer = excluded.default_printer,
                updated_at = excluded.updated_at
            "#,
            rusqlite::params![
                SETTINGS_ID,
                settings.shop_name,
                settings.address,
                settings.phone1,
                settings.phone2,
                settings.default_printer,
                now_iso(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[test]
    fn test_settings_default_when_unset() {
        let db = test_db();
        let settings = db.get_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_save_and_overwrite() {
        let db = test_db();
        let mut settings = Settings {
            shop_name: "Al-Noor Tailors".to_string(),
            address: "Main Bazaar".to_string(),
            phone1: "0313-9003733".to_string(),
            phone2: String::new(),
            default_printer: Some("EPSON-L3150".to_string()),
        };
        db.save_settings(&settings).unwrap();
        assert_eq!(db.get_settings().unwrap().shop_name, "Al-Noor Tailors");

        settings.default_printer = None;
        db.save_settings(&settings).unwrap();
        assert_eq!(db.get_settings().unwrap().default_printer, None);
    }

    #[test]
    fn test_phones_line_skips_empty() {
        let settings = Settings {
            phone1: "0313-9003733".to_string(),
            phone2: String::new(),
            ..Settings::default()
        };
        assert_eq!(settings.phones_line(), "0313-9003733");
    }
}
