use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::SmtpConfig;

/// Everything the confirmation template needs, already decrypted.
#[derive(Debug, Clone)]
pub struct OrderEmail {
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub post_code: String,
    pub street: String,
    pub house: String,
    pub phone_code: String,
    pub phone: String,
    pub email: String,
    pub items: Vec<OrderEmailItem>,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct OrderEmailItem {
    pub name: String,
    pub quantity: i32,
}

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(creds)
            .build();
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("invalid SMTP_FROM address: {e}"))?;
        Ok(Self { transport, from })
    }

    /// Delivery outcome is the caller's problem only insofar as logging it;
    /// order state is never rolled back over a failed mail.
    pub async fn send_order_paid(&self, to: &str, order: &OrderEmail) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid recipient address: {e}"))?)
            .subject("Your order has been successfully paid")
            .header(ContentType::TEXT_HTML)
            .body(order_paid_html(order))?;
        self.transport.send(message).await?;
        Ok(())
    }

    pub async fn send_reset_token(&self, to: &str, token: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid recipient address: {e}"))?)
            .subject("Password reset")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your password reset token is {token}. It expires in 15 minutes."
            ))?;
        self.transport.send(message).await?;
        Ok(())
    }
}

pub fn format_cents(amount: i64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

pub fn order_paid_html(order: &OrderEmail) -> String {
    let mut items_html = String::from("<li><b>Purchased Items:</b><ul>");
    for item in &order.items {
        items_html.push_str(&format!(
            "<li>{} (Quantity: {})</li>",
            item.name, item.quantity
        ));
    }
    items_html.push_str("</ul></li>");

    format!(
        r#"<div style="font-family: 'Roboto', sans-serif; color: rgba(0, 0, 0, 0.87); max-width: 500px; margin: auto;">
<h2 style="background-color: #a08750; color: #fff; margin: 0; padding: 16px;">Order Successfully Paid</h2>
<div style="padding: 16px; border: 1px solid rgba(0, 0, 0, 0.12);">
    <strong>Hello {first_name} {last_name},</strong>
    <p style="border-bottom:1px solid #a08750;padding-bottom: 10px;">Your order has been successfully processed and paid. Here are the details of your order:</p>
    <ul style="list-style-type: none; padding: 0; border-bottom: 1px solid #a08750;padding-bottom: 10px;">
        <li><strong>Country:</strong> {country}</li>
        <li><strong>State:</strong> {state}</li>
        <li><strong>City:</strong> {city}</li>
        <li><strong>Postal Code:</strong> {post_code}</li>
        <li><strong>Street:</strong> {street}</li>
        <li><strong>House:</strong> {house}</li>
        <li><strong>Phone:</strong> {phone_code} {phone}</li>
        <li><strong>Email:</strong> {email}</li>
        <li><strong>Items:</strong> {items_html}</li>
        <li><strong>Total:</strong> {total}$</li>
    </ul>
    <p>If there are any issues or if you have any questions, please contact us.</p>
    <p>Best Regards, <strong>DeskCulture</strong></p>
</div>
</div>"#,
        first_name = order.first_name,
        last_name = order.last_name,
        country = order.country,
        state = order.state,
        city = order.city,
        post_code = order.post_code,
        street = order.street,
        house = order.house,
        phone_code = order.phone_code,
        phone = order.phone,
        email = order.email,
        items_html = items_html,
        total = format_cents(order.total),
    )
}

#[cfg(test)]
mod tests {
    use super::{OrderEmail, OrderEmailItem, format_cents, order_paid_html};

    fn sample() -> OrderEmail {
        OrderEmail {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            country: "UK".into(),
            state: "London".into(),
            city: "London".into(),
            post_code: "EC1".into(),
            street: "Analytical St".into(),
            house: "1".into(),
            phone_code: "+44".into(),
            phone: "5550101".into(),
            email: "ada@example.com".into(),
            items: vec![
                OrderEmailItem {
                    name: "Standing Desk".into(),
                    quantity: 2,
                },
                OrderEmailItem {
                    name: "Monitor Arm".into(),
                    quantity: 1,
                },
            ],
            total: 2500,
        }
    }

    #[test]
    fn cents_render_as_dollars() {
        assert_eq!(format_cents(2500), "25.00");
        assert_eq!(format_cents(1005), "10.05");
        assert_eq!(format_cents(99), "0.99");
    }

    #[test]
    fn template_inlines_shipping_and_items() {
        let html = order_paid_html(&sample());
        assert!(html.contains("Hello Ada Lovelace"));
        assert!(html.contains("Standing Desk (Quantity: 2)"));
        assert!(html.contains("Monitor Arm (Quantity: 1)"));
        assert!(html.contains("25.00$"));
        assert!(html.contains("+44 5550101"));
    }
}
