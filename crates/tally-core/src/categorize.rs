//! Rule-based categorization of statement rows
//!
//! Maps the bank's raw (category, subcategory) labels plus the recipient text
//! to a normalized (primary, secondary) pair. All rules are plain data held in
//! [`CategoryRules`] and evaluated in list order, so the first matching rule
//! always wins:
//!
//! 1. Primary: exact match of the raw category against `primary`. A rule either
//!    names a fixed category, defers to the recipient rules, or branches on a
//!    marker substring in the recipient.
//! 2. Secondary: exact match of the raw subcategory against `secondary`, except
//!    labels listed in `secondary_via_recipient`, which use the recipient rules.
//! 3. Recipient rules: ordered substring rules over the recipient text, ending
//!    in the literal `fallback` category.
//! 4. Anything still unmatched goes through [`sanitize_label`].

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Normalized category pair for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub primary: String,
    pub secondary: String,
}

/// How a matched primary label resolves to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolve {
    /// Always the given category
    Fixed { category: String },
    /// Use the recipient substring rules
    ByRecipient,
    /// `matched` if the recipient contains `marker`, else `otherwise`
    RecipientMarker {
        marker: String,
        matched: String,
        otherwise: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryRule {
    /// Raw category label as exported by the bank
    pub label: String,
    pub resolve: Resolve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub label: String,
    pub category: String,
}

/// Substring rule over the recipient text; matches if any needle is contained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRule {
    pub any_of: Vec<String>,
    pub category: String,
}

impl RecipientRule {
    fn matches(&self, recipient: &str) -> bool {
        self.any_of.iter().any(|needle| recipient.contains(needle.as_str()))
    }
}

/// Complete rule set for a [`Categorizer`]
///
/// Rule order is significant everywhere. A config file may replace the
/// built-in tables wholesale via a `[rules]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    #[serde(default)]
    pub primary: Vec<PrimaryRule>,
    #[serde(default)]
    pub secondary: Vec<Translation>,
    #[serde(default)]
    pub secondary_via_recipient: Vec<String>,
    #[serde(default)]
    pub recipient_rules: Vec<RecipientRule>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    "Other".to_string()
}

fn fixed(label: &str, category: &str) -> PrimaryRule {
    PrimaryRule {
        label: label.to_string(),
        resolve: Resolve::Fixed {
            category: category.to_string(),
        },
    }
}

fn by_recipient(label: &str) -> PrimaryRule {
    PrimaryRule {
        label: label.to_string(),
        resolve: Resolve::ByRecipient,
    }
}

fn marker(label: &str, marker: &str, matched: &str, otherwise: &str) -> PrimaryRule {
    PrimaryRule {
        label: label.to_string(),
        resolve: Resolve::RecipientMarker {
            marker: marker.to_string(),
            matched: matched.to_string(),
            otherwise: otherwise.to_string(),
        },
    }
}

fn translate(label: &str, category: &str) -> Translation {
    Translation {
        label: label.to_string(),
        category: category.to_string(),
    }
}

fn recipient(any_of: &[&str], category: &str) -> RecipientRule {
    RecipientRule {
        any_of: any_of.iter().map(|s| s.to_string()).collect(),
        category: category.to_string(),
    }
}

impl Default for CategoryRules {
    /// Built-in tables for C24 Bank exports
    fn default() -> Self {
        Self {
            primary: vec![
                fixed("Finanzen & Steuern", "Finance_Taxes"),
                fixed("DSL & Mobilfunk", "DSL_Mobile"),
                fixed("Einkommen", "Income"),
                fixed("Energie", "Energy"),
                fixed("Lebensmittel", "Groceries"),
                fixed("Mobilität", "Mobility"),
                fixed("Restaurant/ Café/ Bar", "Restaurant_Cafe"),
                marker("Umbuchung", "Haushalt", "Rent", "Savings"),
                fixed("Versicherungen", "Insurance"),
                by_recipient("Freizeit & Unterhaltung"),
                by_recipient("Weitere Ausgaben"),
                fixed("Weitere Einnahmen", "Other_Income"),
                marker("Wohnen & Haushalt", "Norbert", "Rent", "Housing"),
                fixed("Wellness & Beauty", "Beauty"),
            ],
            secondary: vec![
                translate("Bäckerei", "Bakery"),
                translate("Drogerie", "Drugstore"),
                translate("Einrichtung & Haushaltswaren", "Household_goods"),
                translate("Elektrohandel", "Electronics_store"),
                translate("Festnetz, Internet und TV", "Internet_tv"),
                translate("Kapitalerträge", "Capital_income"),
                translate("Lohn/ Gehalt", "Salary"),
                translate("Miete", "Rent"),
                translate("Mobilfunk", "Mobile_phone"),
                translate("Restaurant/ Café/ Bar", "Restaurant_cafe"),
                translate("Rundfunkgebühren", "Broadcast_fees"),
                translate("Sonstige Versicherung", "Other_insurance"),
                translate("Sport Shop", "Sports_shop"),
                translate("Steuern und Abgaben", "Taxes_and_fees"),
                translate("Strom", "Electricity"),
                translate("Supermarkt", "Supermarket"),
                translate("Umbuchung", "Saving"),
                translate("Weitere Einnahmen", "Other_income"),
                translate("Öffentlicher Nahverkehr", "Public_transport"),
                translate("friseur", "Haircut"),
                translate("Behörden", "Authorities"),
                translate("Erstattung", "Refund"),
                translate("Bonus Energievertrag", "Energy_bonus"),
                translate("Getränkehandel", "Supermarket"),
                translate("Heimwerken & Garten", "Building_garden"),
                translate("hotel_urlaubswohnungen", "Hotel_vacation"),
            ],
            secondary_via_recipient: vec!["Weitere Ausgaben".to_string(), "Saving".to_string()],
            recipient_rules: vec![
                recipient(&["Espresso House"], "Restaurant_Cafe"),
                recipient(&["reisen_urlaub"], "Travel_Vacation"),
                recipient(&["GITHUB"], "Work"),
                recipient(&["Fahrschule"], "Driving_Lessons"),
                recipient(&["Viethouse"], "Restaurant_Cafe"),
                recipient(&["Asia Mark"], "Groceries"),
                recipient(&["JUICE FACTORY"], "Restaurant_Cafe"),
                recipient(&["HYUNDAI", "Hyundai"], "Mobility"),
                recipient(&["Anastasiia", "ANASTASIIA"], "Nastya"),
                recipient(&["SIHOO"], "Housing"),
                recipient(&["Herzensbackere"], "Restaurant_Cafe"),
                recipient(&["OVHcloud"], "Housing"),
                recipient(&["DOMKELLER"], "Restaurant_Cafe"),
                recipient(&["WEINBAUER"], "Travel_Vacation"),
                recipient(&["Vinothek"], "Restaurant_Cafe"),
                recipient(&["DATART"], "Housing"),
                recipient(&["METZGEREI"], "Groceries"),
                recipient(&["Richter Erz"], "Groceries"),
                recipient(&["Solntcev", "Haushalt"], "Rent"),
                recipient(&["Norbert"], "Rent"),
                recipient(&["KLIVER"], "Groceries"),
            ],
            fallback: default_fallback(),
        }
    }
}

/// Applies a [`CategoryRules`] set to statement rows
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: CategoryRules,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(CategoryRules::default())
    }
}

impl Categorizer {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }

    /// Classify one row into a (primary, secondary) pair
    pub fn classify(
        &self,
        raw_category: &str,
        raw_subcategory: &str,
        recipient: &str,
    ) -> Classification {
        Classification {
            primary: self.primary(raw_category, recipient),
            secondary: self.secondary(raw_subcategory, recipient),
        }
    }

    /// Primary category for a raw category label
    pub fn primary(&self, raw_category: &str, recipient: &str) -> String {
        let rule = self.rules.primary.iter().find(|r| r.label == raw_category);

        match rule.map(|r| &r.resolve) {
            Some(Resolve::Fixed { category }) => category.clone(),
            Some(Resolve::ByRecipient) => self.by_recipient(recipient),
            Some(Resolve::RecipientMarker {
                marker,
                matched,
                otherwise,
            }) => {
                if recipient.contains(marker.as_str()) {
                    matched.clone()
                } else {
                    otherwise.clone()
                }
            }
            None => sanitize_label(raw_category),
        }
    }

    /// Secondary category for a raw subcategory label
    pub fn secondary(&self, raw_subcategory: &str, recipient: &str) -> String {
        if self
            .rules
            .secondary_via_recipient
            .iter()
            .any(|label| label == raw_subcategory)
        {
            return self.by_recipient(recipient);
        }

        self.rules
            .secondary
            .iter()
            .find(|t| t.label == raw_subcategory)
            .map(|t| t.category.clone())
            .unwrap_or_else(|| sanitize_label(raw_subcategory))
    }

    /// First recipient rule that matches, or the literal fallback category
    pub fn by_recipient(&self, recipient: &str) -> String {
        self.rules
            .recipient_rules
            .iter()
            .find(|rule| rule.matches(recipient))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| self.rules.fallback.clone())
    }
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s&/-]+").expect("valid regex"))
}

fn disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]").expect("valid regex"))
}

/// Turn an unknown label into a lowercase snake_case identifier
///
/// Runs of whitespace, `&`, `/` and `-` collapse into one underscore, every
/// other non-ASCII-alphanumeric character is dropped. Input without any
/// alphanumeric character can come back empty (`"&"` → `"_"`, `"ä"` → `""`).
pub fn sanitize_label(input: &str) -> String {
    let collapsed = separator_re().replace_all(input, "_");
    disallowed_re().replace_all(&collapsed, "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_fixed_labels() {
        let categorizer = Categorizer::default();
        let cases = [
            ("Finanzen & Steuern", "Finance_Taxes"),
            ("DSL & Mobilfunk", "DSL_Mobile"),
            ("Einkommen", "Income"),
            ("Energie", "Energy"),
            ("Lebensmittel", "Groceries"),
            ("Mobilität", "Mobility"),
            ("Restaurant/ Café/ Bar", "Restaurant_Cafe"),
            ("Versicherungen", "Insurance"),
            ("Weitere Einnahmen", "Other_Income"),
            ("Wellness & Beauty", "Beauty"),
        ];
        for (raw, expected) in cases {
            assert_eq!(categorizer.primary(raw, "Someone"), expected, "{}", raw);
        }
    }

    #[test]
    fn test_primary_other_expenses_uses_recipient() {
        let categorizer = Categorizer::default();
        assert_eq!(
            categorizer.primary("Weitere Ausgaben", "GITHUB, INC."),
            "Work"
        );
        assert_eq!(
            categorizer.primary("Weitere Ausgaben", "Unknown Shop GmbH"),
            "Other"
        );
        assert_eq!(
            categorizer.primary("Freizeit & Unterhaltung", "Espresso House Dresden"),
            "Restaurant_Cafe"
        );
    }

    #[test]
    fn test_primary_rebooking_marker() {
        let categorizer = Categorizer::default();
        assert_eq!(categorizer.primary("Umbuchung", "Pocket Haushalt"), "Rent");
        assert_eq!(categorizer.primary("Umbuchung", "Pocket Urlaub"), "Savings");
        assert_eq!(categorizer.primary("Umbuchung", ""), "Savings");
    }

    #[test]
    fn test_primary_housing_marker() {
        let categorizer = Categorizer::default();
        assert_eq!(
            categorizer.primary("Wohnen & Haushalt", "Norbert Vermieter"),
            "Rent"
        );
        assert_eq!(categorizer.primary("Wohnen & Haushalt", "IKEA"), "Housing");
    }

    #[test]
    fn test_primary_unknown_is_sanitized() {
        let categorizer = Categorizer::default();
        assert_eq!(
            categorizer.primary("Unexpected Category", "x"),
            "unexpected_category"
        );
        assert_eq!(categorizer.primary("Shopping", "x"), "shopping");
    }

    #[test]
    fn test_secondary_translations() {
        let categorizer = Categorizer::default();
        let cases = [
            ("Bäckerei", "Bakery"),
            ("Drogerie", "Drugstore"),
            ("Festnetz, Internet und TV", "Internet_tv"),
            ("Lohn/ Gehalt", "Salary"),
            ("Miete", "Rent"),
            ("Strom", "Electricity"),
            ("Supermarkt", "Supermarket"),
            ("Umbuchung", "Saving"),
            ("Öffentlicher Nahverkehr", "Public_transport"),
            ("Getränkehandel", "Supermarket"),
        ];
        for (raw, expected) in cases {
            assert_eq!(categorizer.secondary(raw, "Someone"), expected, "{}", raw);
        }
    }

    #[test]
    fn test_secondary_redirects_to_recipient_rules() {
        let categorizer = Categorizer::default();
        assert_eq!(
            categorizer.secondary("Weitere Ausgaben", "METZGEREI SCHULZE"),
            "Groceries"
        );
        assert_eq!(categorizer.secondary("Saving", "Depot"), "Other");
    }

    #[test]
    fn test_secondary_unknown_is_sanitized() {
        let categorizer = Categorizer::default();
        assert_eq!(
            categorizer.secondary("Unbekannte Unterkategorie", "x"),
            "unbekannte_unterkategorie"
        );
    }

    #[test]
    fn test_recipient_rules_first_match_wins() {
        // "Haushalt" appears in the rent rule, which sits after the grocery rules
        let categorizer = Categorizer::default();
        assert_eq!(
            categorizer.by_recipient("KLIVER Haushalt"),
            "Rent",
            "earlier rent rule must win over later KLIVER rule"
        );
        assert_eq!(
            categorizer.by_recipient("METZGEREI Norbert"),
            "Groceries",
            "earlier METZGEREI rule must win over later Norbert rule"
        );
        assert_eq!(categorizer.by_recipient("hyundai"), "Other");
        assert_eq!(categorizer.by_recipient("Hyundai Service"), "Mobility");
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let rules = CategoryRules {
            primary: vec![fixed("Lebensmittel", "food")],
            secondary: vec![],
            secondary_via_recipient: vec![],
            recipient_rules: vec![recipient(&["ACME"], "Tools")],
            fallback: "Misc".to_string(),
        };
        let categorizer = Categorizer::new(rules);

        let c = categorizer.classify("Lebensmittel", "Supermarkt", "ACME Corp");
        assert_eq!(c.primary, "food");
        assert_eq!(c.secondary, "supermarkt");
        assert_eq!(categorizer.by_recipient("nobody"), "Misc");
        assert_eq!(categorizer.primary("Energie", "x"), "energie");
    }

    #[test]
    fn test_classify_pair() {
        let categorizer = Categorizer::default();
        let c = categorizer.classify("Lebensmittel", "Supermarkt", "REWE");
        assert_eq!(
            c,
            Classification {
                primary: "Groceries".to_string(),
                secondary: "Supermarket".to_string(),
            }
        );
    }

    #[test]
    fn test_sanitize_label() {
        let cases = [
            ("Finanzen & Steuern", "finanzen_steuern"),
            ("DSL & Mobilfunk", "dsl_mobilfunk"),
            ("Einkommen", "einkommen"),
            ("Mobilität", "mobilitt"),
            ("Restaurant/ Café/ Bar", "restaurant_caf_bar"),
            ("Wohnen & Haushalt", "wohnen_haushalt"),
            ("Heimwerken - Garten", "heimwerken_garten"),
            ("Unbekannte Kategorie", "unbekannte_kategorie"),
        ];
        for (input, expected) in cases {
            assert_eq!(sanitize_label(input), expected, "{}", input);
        }
    }

    #[test]
    fn test_sanitize_label_without_alphanumerics() {
        assert_eq!(sanitize_label(""), "");
        assert_eq!(sanitize_label("äöü"), "");
        assert_eq!(sanitize_label(" & "), "_");
    }

    #[test]
    fn test_rules_from_toml() {
        let toml_str = r#"
            fallback = "Misc"
            secondary_via_recipient = ["Weitere Ausgaben"]

            [[primary]]
            label = "Umbuchung"
            resolve = { kind = "recipient_marker", marker = "WG", matched = "Rent", otherwise = "Savings" }

            [[primary]]
            label = "Weitere Ausgaben"
            resolve = { kind = "by_recipient" }

            [[primary]]
            label = "Energie"
            resolve = { kind = "fixed", category = "Energy" }

            [[secondary]]
            label = "Strom"
            category = "Electricity"

            [[recipient_rules]]
            any_of = ["GITHUB", "GitHub"]
            category = "Work"
        "#;

        let rules: CategoryRules = toml::from_str(toml_str).unwrap();
        let categorizer = Categorizer::new(rules);

        assert_eq!(categorizer.primary("Umbuchung", "WG Konto"), "Rent");
        assert_eq!(categorizer.primary("Weitere Ausgaben", "GitHub"), "Work");
        assert_eq!(categorizer.primary("Weitere Ausgaben", "else"), "Misc");
        assert_eq!(categorizer.primary("Energie", ""), "Energy");
        assert_eq!(categorizer.secondary("Strom", ""), "Electricity");
    }
}
