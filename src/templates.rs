//! Static measurement field and design option tables.
//!
//! These drive the measurement form, the printed slip and the CSV export.
//! Labels are bilingual; the Urdu label is what appears on printed slips.

/// A free-text measurement field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub key: &'static str,
    pub label_en: &'static str,
    pub label_ur: &'static str,
}

/// One selectable value in a dropdown field.
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    pub value: &'static str,
    pub label_en: &'static str,
    pub label_ur: &'static str,
}

/// A dropdown field with a fixed choice table.
#[derive(Debug, Clone, Copy)]
pub struct SelectDef {
    pub key: &'static str,
    pub label_en: &'static str,
    pub label_ur: &'static str,
    pub choices: &'static [Choice],
}

/// Core measurements, always rendered on the slip (right column).
pub const MEASUREMENT_FIELDS: &[FieldDef] = &[
    FieldDef { key: "length", label_en: "Length", label_ur: "لمبائی" },
    FieldDef { key: "sleeve", label_en: "Sleeve", label_ur: "بازو" },
    FieldDef { key: "chest", label_en: "Chest", label_ur: "چھاتی" },
    FieldDef { key: "tera", label_en: "Tera", label_ur: "تیرا" },
    FieldDef { key: "kalar", label_en: "Collar", label_ur: "کالر" },
    FieldDef { key: "daaman", label_en: "Daman", label_ur: "دامن" },
    FieldDef { key: "shalwar", label_en: "Shalwar", label_ur: "شلوار" },
    FieldDef { key: "pancha", label_en: "Pancha", label_ur: "پانچہ" },
];

/// Additional free-text fields, rendered on the slip only when filled in
/// (left column, below the dropdown rows).
pub const EXTRA_FIELDS: &[FieldDef] = &[
    FieldDef { key: "shalwar_width", label_en: "Shalwar Width", label_ur: "شلوار چوڑائی" },
    FieldDef { key: "aasan", label_en: "Aasan", label_ur: "آسن" },
    FieldDef { key: "bazu_center", label_en: "Bazu Center", label_ur: "بازو سینٹر" },
];

pub const COLLAR_NOK_CHOICES: &[Choice] = &[
    Choice { value: "round", label_en: "Round", label_ur: "گول نوک" },
    Choice { value: "sharp", label_en: "Sharp", label_ur: "نوکدار" },
    Choice { value: "cut", label_en: "Cut", label_ur: "کٹ نوک" },
];

pub const BAN_PATTI_CHOICES: &[Choice] = &[
    Choice { value: "simple", label_en: "Simple", label_ur: "سادہ" },
    Choice { value: "double", label_en: "Double", label_ur: "ڈبل" },
];

pub const CUFF_CHOICES: &[Choice] = &[
    Choice { value: "single", label_en: "Single", label_ur: "سنگل کف" },
    Choice { value: "double", label_en: "Double", label_ur: "ڈبل کف" },
    Choice { value: "round", label_en: "Round", label_ur: "گول کف" },
    Choice { value: "square", label_en: "Square", label_ur: "چوکور کف" },
];

pub const FRONT_POCKET_CHOICES: &[Choice] = &[
    Choice { value: "none", label_en: "None", label_ur: "بغیر جیب" },
    Choice { value: "single", label_en: "Single", label_ur: "ایک جیب" },
    Choice { value: "double", label_en: "Double", label_ur: "دو جیب" },
];

pub const SIDE_POCKET_CHOICES: &[Choice] = &[
    Choice { value: "none", label_en: "None", label_ur: "بغیر" },
    Choice { value: "single", label_en: "Single", label_ur: "ایک طرف" },
    Choice { value: "double", label_en: "Both sides", label_ur: "دونوں طرف" },
];

pub const FRONT_STRIP_CHOICES: &[Choice] = &[
    Choice { value: "simple", label_en: "Simple", label_ur: "سادہ پٹی" },
    Choice { value: "hidden", label_en: "Hidden", label_ur: "چھپی پٹی" },
    Choice { value: "design", label_en: "Design", label_ur: "ڈیزائن پٹی" },
];

pub const HEM_STYLE_CHOICES: &[Choice] = &[
    Choice { value: "round", label_en: "Round", label_ur: "گول دامن" },
    Choice { value: "straight", label_en: "Straight", label_ur: "سیدھا دامن" },
];

pub const SHALWAR_FARMAISH_CHOICES: &[Choice] = &[
    Choice { value: "simple", label_en: "Simple", label_ur: "سادہ شلوار" },
    Choice { value: "trouser", label_en: "Trouser", label_ur: "ٹراؤزر شلوار" },
    Choice { value: "pocket", label_en: "With pocket", label_ur: "جیب والی شلوار" },
];

/// Dropdown fields, rendered on the slip (left column) only when a value
/// is selected.
pub const SELECT_FIELDS: &[SelectDef] = &[
    SelectDef { key: "collar_nok", label_en: "Collar Nok", label_ur: "کالر نوک", choices: COLLAR_NOK_CHOICES },
    SelectDef { key: "ban_patti", label_en: "Ban Patti", label_ur: "بین پٹی", choices: BAN_PATTI_CHOICES },
    SelectDef { key: "cuff", label_en: "Cuff", label_ur: "کف", choices: CUFF_CHOICES },
    SelectDef { key: "front_pocket", label_en: "Front Pocket", label_ur: "سامنے جیب", choices: FRONT_POCKET_CHOICES },
    SelectDef { key: "side_pocket", label_en: "Side Pocket", label_ur: "سائیڈ جیب", choices: SIDE_POCKET_CHOICES },
    SelectDef { key: "front_strip", label_en: "Front Strip", label_ur: "سامنے کی پٹی", choices: FRONT_STRIP_CHOICES },
    SelectDef { key: "hem_style", label_en: "Hem Style", label_ur: "دامن", choices: HEM_STYLE_CHOICES },
    SelectDef { key: "shalwar_farmaish", label_en: "Shalwar Farmaish", label_ur: "شلوار فرمائش", choices: SHALWAR_FARMAISH_CHOICES },
];

/// Farmaish checkboxes (boolean design options).
pub const DESIGN_OPTIONS: &[FieldDef] = &[
    FieldDef { key: "front_patti_kaj", label_en: "Front Strip Buttonholes", label_ur: "سامنے پٹی کاج" },
    FieldDef { key: "double_silai", label_en: "Double Stitch", label_ur: "ڈبل سلائی" },
    FieldDef { key: "zip_shalwar", label_en: "Zip Shalwar", label_ur: "زپ شلوار" },
    FieldDef { key: "mobile_pocket", label_en: "Mobile Pocket", label_ur: "موبائل جیب" },
    FieldDef { key: "kandha_patti", label_en: "Shoulder Strap", label_ur: "کندھا پٹی" },
    FieldDef { key: "gol_asteen", label_en: "Round Sleeve", label_ur: "گول آستین" },
];

/// CSV export columns: header text paired with the measurement field key.
pub const CSV_MEASUREMENT_COLUMNS: &[(&str, &str)] = &[
    ("Length", "length"),
    ("Sleeve", "sleeve"),
    ("Bazu Center", "bazu_center"),
    ("Chest", "chest"),
    ("Tera", "tera"),
    ("Collar", "kalar"),
    ("Daman", "daaman"),
    ("Shalwar", "shalwar"),
    ("Aasan", "aasan"),
    ("Pancha", "pancha"),
];

/// Look up the Urdu label for a stored dropdown value.
pub fn choice_label_ur(choices: &[Choice], value: &str) -> Option<&'static str> {
    choices.iter().find(|c| c.value == value).map(|c| c.label_ur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_label_lookup() {
        assert_eq!(choice_label_ur(CUFF_CHOICES, "double"), Some("ڈبل کف"));
        assert_eq!(choice_label_ur(CUFF_CHOICES, "bogus"), None);
    }

    #[test]
    fn test_field_keys_unique() {
        let mut keys: Vec<&str> = MEASUREMENT_FIELDS
            .iter()
            .chain(EXTRA_FIELDS)
            .map(|f| f.key)
            .chain(SELECT_FIELDS.iter().map(|s| s.key))
            .collect();
        keys.sort_unstable();
        let len = keys.len();
        keys.dedup();
        assert_eq!(len, keys.len());
    }

    #[test]
    fn test_csv_columns_reference_known_fields() {
        for (_, key) in CSV_MEASUREMENT_COLUMNS {
            let known = MEASUREMENT_FIELDS.iter().chain(EXTRA_FIELDS).any(|f| f.key == *key);
            assert!(known, "unknown CSV measurement key: {}", key);
        }
    }
}
