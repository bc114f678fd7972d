//! Simulated payment gateway collaborator
//!
//! Issues payment tokens and URLs for bookings and sales, and interprets
//! the status string the gateway posts back. The callback is untrusted:
//! anything other than `"success"` leaves the record untouched.

use uuid::Uuid;

pub const DEFAULT_BOOKING_URL_BASE: &str = "https://payment.example.com/pay";
pub const DEFAULT_SALE_URL_BASE: &str = "https://payment.example.com/sale";

/// Status value that confirms a payment
pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub token: String,
    pub url: String,
}

/// Builds payment links from the configured base URLs.
#[derive(Debug, Clone)]
pub struct PaymentLinks {
    booking_url_base: String,
    sale_url_base: String,
}

impl PaymentLinks {
    pub fn new(booking_url_base: impl Into<String>, sale_url_base: impl Into<String>) -> Self {
        Self {
            booking_url_base: trim_base(booking_url_base.into()),
            sale_url_base: trim_base(sale_url_base.into()),
        }
    }

    pub fn for_booking(&self, booking_id: Uuid) -> PaymentLink {
        Self::link(&self.booking_url_base, "BOOK", booking_id)
    }

    pub fn for_sale(&self, transaction_id: Uuid) -> PaymentLink {
        Self::link(&self.sale_url_base, "SALE", transaction_id)
    }

    fn link(base: &str, prefix: &str, id: Uuid) -> PaymentLink {
        let nonce: [u8; 8] = rand::random();
        let token = format!("{}-{}-{}", prefix, id.simple(), hex::encode(nonce));
        let url = format!("{}?token={}", base, token);
        PaymentLink { token, url }
    }
}

impl Default for PaymentLinks {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKING_URL_BASE, DEFAULT_SALE_URL_BASE)
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches(['/', '?']).to_string()
}

/// Interpreted gateway callback status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    /// Any other status; carried for logging only
    NotSucceeded(String),
}

impl PaymentOutcome {
    pub fn from_status(status: &str) -> Self {
        if status == SUCCESS_STATUS {
            Self::Succeeded
        } else {
            Self::NotSucceeded(status.to_string())
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "success",
            Self::NotSucceeded(_) => "ignored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_link_embeds_token() {
        let links = PaymentLinks::new("https://pay.test/booking/", "https://pay.test/sale");
        let id = Uuid::new_v4();
        let link = links.for_booking(id);

        assert!(link.token.starts_with("BOOK-"));
        assert!(link.token.contains(&id.simple().to_string()));
        assert_eq!(link.url, format!("https://pay.test/booking?token={}", link.token));
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let links = PaymentLinks::default();
        let id = Uuid::new_v4();
        assert_ne!(links.for_sale(id).token, links.for_sale(id).token);
        assert!(links.for_sale(id).url.starts_with(DEFAULT_SALE_URL_BASE));
    }

    #[test]
    fn only_exact_success_confirms() {
        assert_eq!(PaymentOutcome::from_status("success"), PaymentOutcome::Succeeded);
        assert!(matches!(
            PaymentOutcome::from_status("SUCCESS"),
            PaymentOutcome::NotSucceeded(_)
        ));
        assert_eq!(PaymentOutcome::from_status("failed").label(), "ignored");
    }
}
