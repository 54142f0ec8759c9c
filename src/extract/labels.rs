use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use super::normalize::normalize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelConcept {
    OrderTotal,
    OrderNumber,
    SoldBy,
}

impl LabelConcept {
    pub const ALL: [LabelConcept; 3] = [
        LabelConcept::OrderTotal,
        LabelConcept::OrderNumber,
        LabelConcept::SoldBy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrderTotal => "order_total",
            Self::OrderNumber => "order_number",
            Self::SoldBy => "sold_by",
        }
    }

    pub fn variants(self) -> &'static [&'static str] {
        match self {
            Self::OrderTotal => &[
                "Order total",
                "Celkem objednávky",
                "Gesamtsumme",
                "Total del pedido",
                "Total de la commande",
                "Totale ordine",
            ],
            Self::OrderNumber => &[
                "Order number",
                "Číslo objednávky",
                "Bestellnummer",
                "Número de pedido",
                "Numéro de commande",
                "Numero ordine",
            ],
            Self::SoldBy => &[
                "Sold by",
                "Prodává",
                "Verkauft von",
                "Vendido por",
                "Vendu par",
                "Venduto da",
            ],
        }
    }

    fn value_pattern(self) -> &'static str {
        match self {
            Self::OrderTotal => r"([£$€]\s*[0-9.,]+)",
            Self::OrderNumber => r"([0-9A-Za-z\-]+)",
            Self::SoldBy => r"([^|·\n\r]+?)\s*(?:\||·|$)",
        }
    }
}

impl fmt::Display for LabelConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Currency {
    Pound,
    Dollar,
    Euro,
}

impl Currency {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '£' => Some(Self::Pound),
            '$' => Some(Self::Dollar),
            '€' => Some(Self::Euro),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Pound => '£',
            Self::Dollar => '$',
            Self::Euro => '€',
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

pub fn currency_symbol(amount: &str) -> Option<Currency> {
    let mut chars = amount.trim_start().chars();
    let currency = Currency::from_symbol(chars.next()?)?;

    let first_amount_char = chars.find(|ch| !ch.is_whitespace())?;
    if first_amount_char.is_ascii_digit() || first_amount_char == '.' || first_amount_char == ',' {
        Some(currency)
    } else {
        None
    }
}

#[derive(Debug)]
struct LabelRule {
    concept: LabelConcept,
    pattern: Regex,
}

#[derive(Debug)]
pub struct LabelMatcher {
    rules: Vec<LabelRule>,
}

impl LabelMatcher {
    pub fn new() -> Result<Self> {
        let rules = LabelConcept::ALL
            .into_iter()
            .map(|concept| {
                let pattern = Regex::new(&label_pattern(concept))
                    .with_context(|| format!("failed to compile {concept} label regex"))?;
                Ok(LabelRule { concept, pattern })
            })
            .collect::<Result<Vec<LabelRule>>>()?;

        Ok(Self { rules })
    }

    /// Value of the leftmost `<label> : <value>` occurrence for `concept`.
    pub fn find_value(&self, concept: LabelConcept, text: &str) -> Option<String> {
        let rule = self.rules.iter().find(|rule| rule.concept == concept)?;
        let captures = rule.pattern.captures(text)?;
        let value = captures.get(1)?.as_str();

        let value = match concept {
            LabelConcept::SoldBy => normalize(value),
            LabelConcept::OrderTotal | LabelConcept::OrderNumber => value.to_string(),
        };

        if value.is_empty() { None } else { Some(value) }
    }

    pub fn order_total(&self, text: &str) -> Option<String> {
        self.find_value(LabelConcept::OrderTotal, text)
    }

    pub fn order_number(&self, text: &str) -> Option<String> {
        self.find_value(LabelConcept::OrderNumber, text)
    }

    pub fn seller(&self, text: &str) -> Option<String> {
        self.find_value(LabelConcept::SoldBy, text)
    }

    pub fn extract_currency_symbol(&self, amount: &str) -> Option<Currency> {
        currency_symbol(amount)
    }
}

fn label_pattern(concept: LabelConcept) -> String {
    let alternation = concept
        .variants()
        .iter()
        .map(|variant| regex::escape(variant))
        .collect::<Vec<String>>()
        .join("|");

    format!(r"(?i)(?:{alternation})\s*:\s*{}", concept.value_pattern())
}
