use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::error::TrackerError;
use crate::services::deals::Deal;
use crate::services::mailer::Mailer;
use crate::services::store::ProductStore;

/// Renders and dispatches one alert message per user, then writes one
/// AlertRecord per delivered deal. Records are written only after the send
/// succeeded; a failed send leaves no trace beyond the log line.
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    store: Arc<dyn ProductStore>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, store: Arc<dyn ProductStore>) -> Self {
        Self { mailer, store }
    }

    /// Sends the user's deal summary and records each deal. Returns how many
    /// alert records were written.
    pub async fn notify_user(
        &self,
        user_id: ObjectId,
        email: &str,
        deals: &[Deal],
    ) -> Result<usize, TrackerError> {
        let subject = render_subject(deals.len());
        let body = render_alert_html(deals);

        self.mailer.send(email, &subject, &body).await?;

        let sent_at = Utc::now().timestamp();
        let mut recorded = 0;

        for deal in deals {
            let message = deal_message(deal);
            match self
                .store
                .create_alert_record(user_id, deal.product_id, &message, sent_at)
                .await
            {
                Ok(()) => recorded += 1,
                Err(e) => {
                    // Data-loss risk: surface it, but the alert itself went out.
                    tracing::error!(
                        product = %deal.product_id,
                        error = %e,
                        "failed to record delivered alert"
                    );
                }
            }
        }

        Ok(recorded)
    }
}

pub fn render_subject(deal_count: usize) -> String {
    let plural = if deal_count == 1 { "" } else { "s" };
    format!("Price Alert: {deal_count} Deal{plural} Found!")
}

fn deal_message(deal: &Deal) -> String {
    format!(
        "{} is ₹{:.2}, below your target of ₹{:.2}",
        deal.title, deal.current_price, deal.target_price
    )
}

pub fn render_alert_html(deals: &[Deal]) -> String {
    let mut html = String::from(
        "<html><body>\
         <div style=\"max-width:600px;margin:0 auto;font-family:Arial,sans-serif\">\
         <h1>Price Alert - Deals Found!</h1>\
         <p>Great news! The following items are now below your target price:</p>",
    );

    for deal in deals {
        html.push_str(&format!(
            "<div style=\"border:1px solid #ddd;margin:15px 0;padding:15px\">\
             <div style=\"font-weight:bold\">{}</div>\
             <div style=\"font-size:24px;color:#b12704\">₹{:.2}</div>\
             <p>Target Price: ₹{:.2}</p>\
             <p style=\"color:#007600\">You Save: ₹{:.2}</p>\
             <a href=\"{}\">View Product</a>\
             </div>",
            deal.title,
            deal.current_price,
            deal.target_price,
            deal.savings(),
            deal.url,
        ));
    }

    html.push_str(
        "<p style=\"margin-top:30px;color:#666;font-size:12px\">\
         This email was sent because you subscribed to price alerts.\
         </p></div></body></html>",
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(title: &str, price: f64, target: f64) -> Deal {
        Deal {
            product_id: ObjectId::new(),
            user_id: ObjectId::new(),
            title: title.to_string(),
            url: "https://www.amazon.in/dp/TEST".to_string(),
            current_price: price,
            target_price: target,
        }
    }

    #[test]
    fn subject_pluralizes_deal_count() {
        assert_eq!(render_subject(1), "Price Alert: 1 Deal Found!");
        assert_eq!(render_subject(3), "Price Alert: 3 Deals Found!");
    }

    #[test]
    fn body_lists_every_deal_with_prices_and_savings() {
        let html = render_alert_html(&[
            deal("Electric Kettle", 799.0, 1000.0),
            deal("Desk Lamp", 450.5, 600.0),
        ]);

        assert!(html.contains("Electric Kettle"));
        assert!(html.contains("₹799.00"));
        assert!(html.contains("₹1000.00"));
        assert!(html.contains("₹201.00"));
        assert!(html.contains("Desk Lamp"));
        assert!(html.contains("₹149.50"));
        assert!(html.contains("https://www.amazon.in/dp/TEST"));
    }

    #[test]
    fn message_names_the_product_and_both_prices() {
        let msg = deal_message(&deal("Electric Kettle", 799.0, 1000.0));
        assert!(msg.contains("Electric Kettle"));
        assert!(msg.contains("799.00"));
        assert!(msg.contains("1000.00"));
    }
}
