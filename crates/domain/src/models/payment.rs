//! Card payment authorization.

use common::Money;
use serde::{Deserialize, Serialize};

const MAX_CARD_DIGITS: usize = 19;
const MAX_CVC_DIGITS: usize = 4;

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Card fields as typed by the shopper.
#[derive(Clone, Default)]
pub struct CardDetails {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub cvc: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}

/// Card fields in the form the payment service accepts.
#[derive(Clone, PartialEq, Eq)]
pub struct NormalizedCard {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub cvc: String,
}

impl std::fmt::Debug for NormalizedCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedCard")
            .field("last4", &last4(&self.number))
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}

fn last4(number: &str) -> &str {
    &number[number.len().saturating_sub(4)..]
}

/// Normalizes an expiry to `MM/YY`.
///
/// Accepts `MM/YY`, `M/YY`, `MM/YYYY` and bare digit runs such as `1228`.
pub fn normalize_expiry(input: &str) -> String {
    let (month, year) = match input.split_once('/') {
        Some((month, year)) => {
            let month = digits(month);
            let month = if month.len() == 1 {
                format!("0{month}")
            } else {
                month
            };
            let year = digits(year);
            let year = year[year.len().saturating_sub(2)..].to_string();
            (month, year)
        }
        None => {
            let all = digits(input);
            let month: String = all.chars().take(2).collect();
            let year: String = all.chars().skip(2).take(2).collect();
            (month, year)
        }
    };

    if year.is_empty() {
        month
    } else {
        format!("{month}/{year}")
    }
}

impl CardDetails {
    /// Normalizes the card fields.
    ///
    /// The number keeps at most 19 digits, the CVC at most 4. An empty number or
    /// holder, or a CVC shorter than 3 digits, is rejected with a shopper-facing message.
    pub fn normalize(&self) -> Result<NormalizedCard, String> {
        let number: String = digits(&self.number).chars().take(MAX_CARD_DIGITS).collect();
        if number.is_empty() {
            return Err("Card number is required".to_string());
        }

        let holder = self.holder.trim().to_string();
        if holder.is_empty() {
            return Err("Card holder is required".to_string());
        }

        let expiry = normalize_expiry(&self.expiry);
        if expiry.len() != 5 {
            return Err("Expiry must be in MM/YY format".to_string());
        }

        let cvc: String = digits(&self.cvc).chars().take(MAX_CVC_DIGITS).collect();
        if cvc.len() < 3 {
            return Err("CVC must be 3 or 4 digits".to_string());
        }

        Ok(NormalizedCard {
            number,
            holder,
            expiry,
            cvc,
        })
    }
}

/// Body of `POST /api/payments/charge`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Money,
    pub currency: String,
    pub card_number: String,
    pub card_holder: String,
    pub expiry: String,
    pub cvc: String,
    pub email: String,
    pub reference: String,
}

impl PaymentRequest {
    pub fn new(
        amount: Money,
        currency: impl Into<String>,
        card: NormalizedCard,
        email: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency: currency.into(),
            card_number: card.number,
            card_holder: card.holder,
            expiry: card.expiry,
            cvc: card.cvc,
            email: email.into(),
            reference: reference.into(),
        }
    }
}

impl std::fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("card_last4", &last4(&self.card_number))
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// Response of `POST /api/payments/charge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    #[serde(default)]
    pub payment_id: Option<String>,
    pub approved: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub card_last4: Option<String>,
}

impl PaymentResult {
    /// Message explaining a decline.
    pub fn decline_reason(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Payment was declined.".to_string())
    }
}
