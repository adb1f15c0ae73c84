use mailer::{Mailbox, OutboundEmail};
use shared::domain::Submission;

const SITE_FOOTER: &str = "This email was sent from the contact form on www.port24.tech";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn compose_email(submission: &Submission, from: &str, to: &str) -> OutboundEmail {
    OutboundEmail {
        from: Mailbox::new(from),
        to: Mailbox::new(to),
        reply_to: Mailbox::new(&submission.email),
        subject: format!("New Contact Form Submission from {}", submission.name),
        text: render_text(submission),
        html: render_html(submission),
    }
}

fn render_text(submission: &Submission) -> String {
    format!(
        "New Contact Form Submission\n\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\n\
         Message:\n\
         {message}\n\n\
         ---\n\
         {SITE_FOOTER}\n",
        name = submission.name,
        email = submission.email,
        phone = submission.phone_or_placeholder(),
        message = submission.message,
    )
}

fn render_html(submission: &Submission) -> String {
    let name = escape_html(&submission.name);
    let email = escape_html(&submission.email);
    let phone = escape_html(submission.phone_or_placeholder());
    let message = escape_html(&submission.message).replace('\n', "<br>");

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb; border-bottom: 2px solid #2563eb; padding-bottom: 10px;">New Contact Form Submission</h2>
  <div style="background-color: #f9fafb; padding: 20px; border-radius: 8px; margin-top: 20px;">
    <p style="margin: 10px 0;"><strong style="color: #374151;">Name:</strong> <span style="color: #111827;">{name}</span></p>
    <p style="margin: 10px 0;"><strong style="color: #374151;">Email:</strong> <a href="mailto:{email}" style="color: #2563eb; text-decoration: none;">{email}</a></p>
    <p style="margin: 10px 0;"><strong style="color: #374151;">Phone:</strong> <span style="color: #111827;">{phone}</span></p>
  </div>
  <div style="margin-top: 20px;">
    <h3 style="color: #374151; margin-bottom: 10px;">Message:</h3>
    <div style="background-color: #ffffff; padding: 15px; border-left: 4px solid #2563eb; border-radius: 4px;">
      <p style="color: #111827; white-space: pre-wrap; line-height: 1.6;">{message}</p>
    </div>
  </div>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 12px;">
    <p>{SITE_FOOTER}</p>
  </div>
</div>
"#
    )
}

#[cfg(test)]
#[path = "tests/compose_tests.rs"]
mod tests;
