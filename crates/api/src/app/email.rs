//! Transactional email bodies.

use taskhub_notify::PRODUCT_NAME;

pub const VERIFICATION_SUBJECT: &str = "Verify your email";

/// HTML body for the sign-up verification email.
pub fn verification_email(name: &str, link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 560px; margin: 0 auto;">
  <h2>Welcome to {product}, {name}!</h2>
  <p>Please confirm your email address to activate your account.</p>
  <p><a href="{link}" style="display: inline-block; padding: 10px 18px; background: #2563eb; color: #ffffff; text-decoration: none; border-radius: 4px;">Verify email</a></p>
  <p>If the button does not work, paste this link into your browser:</p>
  <p><a href="{link}">{link}</a></p>
  <p>If you did not create an account, you can ignore this email.</p>
</div>"#,
        product = PRODUCT_NAME,
        name = escape_html(name),
        link = escape_html(link),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
