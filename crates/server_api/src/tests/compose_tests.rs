use super::*;

fn submission(message: &str, phone: Option<&str>) -> Submission {
    Submission {
        name: "Jane <b>Doe</b>".into(),
        email: "jane@example.com".into(),
        phone: phone.map(str::to_string),
        message: message.into(),
    }
}

#[test]
fn escapes_every_markup_character() {
    assert_eq!(
        escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
    );
}

#[test]
fn script_in_message_renders_as_text() {
    let email = compose_email(
        &submission("<script>alert('x')</script>", None),
        "sales@port24.tech",
        "inbox@port24.tech",
    );

    assert!(!email.html.contains("<script>"));
    assert!(email
        .html
        .contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
    assert!(email.html.contains("Jane &lt;b&gt;Doe&lt;/b&gt;"));
}

#[test]
fn plain_text_keeps_raw_values() {
    let email = compose_email(
        &submission("line one\nline two", Some("555-0100")),
        "sales@port24.tech",
        "inbox@port24.tech",
    );

    assert!(email.text.contains("Name: Jane <b>Doe</b>"));
    assert!(email.text.contains("Phone: 555-0100"));
    assert!(email.text.contains("line one\nline two"));
}

#[test]
fn newlines_become_breaks_in_html() {
    let email = compose_email(
        &submission("line one\nline two", None),
        "sales@port24.tech",
        "inbox@port24.tech",
    );
    assert!(email.html.contains("line one<br>line two"));
    assert!(email.html.contains("Not provided"));
}

#[test]
fn addresses_and_subject_come_from_inputs() {
    let email = compose_email(
        &submission("Hello", None),
        "sender@port24.tech",
        "inbox@port24.tech",
    );
    assert_eq!(email.from, Mailbox::new("sender@port24.tech"));
    assert_eq!(email.to, Mailbox::new("inbox@port24.tech"));
    assert_eq!(email.reply_to, Mailbox::new("jane@example.com"));
    assert_eq!(
        email.subject,
        "New Contact Form Submission from Jane <b>Doe</b>"
    );
}
